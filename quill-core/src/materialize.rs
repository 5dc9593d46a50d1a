//! Row decoding.
//!
//! A [`RowDecoder`] is compiled once per (target type, dialect, plan, column labels) and cached
//! for the process lifetime. It holds a tree of [`BuildNode`] interpreted by a pure recursive
//! function consuming a column cursor, so decoding a row involves no lookup of any kind.
use crate::{
    AsValue, Cache, Entity, EntityMapper, EntityParts, FieldKind, QuillError, ReaderFieldPlan,
    Result, RowLabeled, RowNames, Value, hash_of,
    stream::{Stream, StreamExt},
};
use anyhow::Context as _;
use async_stream::try_stream;
use rust_decimal::Decimal;
use std::{
    any::{Any, TypeId, type_name},
    mem,
    pin::pin,
    sync::{Arc, LazyLock},
};
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Intermediate result of decoding one node.
pub enum Built {
    Value(Value),
    /// `None` when an optional entity had only NULL columns.
    Entity(Option<Box<dyn Any + Send>>),
    Tuple(Vec<Built>),
}

impl Built {
    pub fn into_value(self) -> Result<Value> {
        match self {
            Built::Value(v) => Ok(v),
            _ => Err(QuillError::SchemaMismatch {
                expected: "a single column".into(),
                found: "an entity or a tuple".into(),
                message: "the result shape does not match the target type".into(),
            }
            .into()),
        }
    }

    pub fn into_entity<E: Entity>(self) -> Result<Option<E>> {
        match self {
            Built::Entity(Some(v)) => v.downcast::<E>().map(|v| Some(*v)).map_err(|_| {
                QuillError::Internal(format!("decoded entity is not a `{}`", type_name::<E>()))
                    .into()
            }),
            Built::Entity(None) => Ok(None),
            _ => Err(QuillError::SchemaMismatch {
                expected: format!("the columns of `{}`", type_name::<E>()),
                found: "a single column or a tuple".into(),
                message: "the result shape does not match the target type".into(),
            }
            .into()),
        }
    }

    /// Entity that must be present, an optional entity with only NULL columns is an error.
    pub fn into_required_entity<E: Entity>(self) -> Result<E> {
        self.into_entity::<E>()?.ok_or_else(|| {
            QuillError::SchemaMismatch {
                expected: format!("a `{}`", type_name::<E>()),
                found: "only NULL columns".into(),
                message: "decode into `Option` to accept a missing entity".into(),
            }
            .into()
        })
    }

    pub fn into_tuple(self) -> Result<Vec<Built>> {
        match self {
            Built::Tuple(v) => Ok(v),
            _ => Err(QuillError::SchemaMismatch {
                expected: "a tuple".into(),
                found: "a single column or an entity".into(),
                message: "the result shape does not match the target type".into(),
            }
            .into()),
        }
    }
}

/// Structure the target type expects from a row.
pub enum Shape {
    Scalar,
    Entity(fn() -> &'static EntityMapper),
    Tuple(Vec<Shape>),
}

/// Type a row decodes into: a scalar, an entity or a tuple of those.
pub trait FromRow: Send + Sized + 'static {
    fn shape() -> Shape;
    fn from_built(built: Built) -> Result<Self>;
}

macro_rules! impl_from_row_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FromRow for $ty {
                fn shape() -> Shape {
                    Shape::Scalar
                }
                fn from_built(built: Built) -> Result<Self> {
                    <$ty as AsValue>::try_from_value(built.into_value()?)
                }
            }
            impl FromRow for Option<$ty> {
                fn shape() -> Shape {
                    Shape::Scalar
                }
                fn from_built(built: Built) -> Result<Self> {
                    <Option<$ty> as AsValue>::try_from_value(built.into_value()?)
                }
            }
        )+
    };
}

impl_from_row_scalar!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    Decimal,
    char,
    String,
    Box<[u8]>,
    Date,
    Time,
    PrimitiveDateTime,
    OffsetDateTime,
    Duration,
    Uuid,
);

impl<E: Entity> FromRow for Option<E> {
    fn shape() -> Shape {
        Shape::Entity(E::mapper)
    }
    fn from_built(built: Built) -> Result<Self> {
        built.into_entity::<E>()
    }
}

impl FromRow for Value {
    fn shape() -> Shape {
        Shape::Scalar
    }
    fn from_built(built: Built) -> Result<Self> {
        built.into_value()
    }
}

fn next_item(items: &mut impl Iterator<Item = Built>) -> Result<Built> {
    items.next().ok_or_else(|| {
        QuillError::Internal("tuple decoded with fewer items than expected".into()).into()
    })
}

macro_rules! impl_from_row_tuple {
    ($($name:ident),+) => {
        impl<$($name: FromRow),+> FromRow for ($($name,)+) {
            fn shape() -> Shape {
                Shape::Tuple(vec![$($name::shape()),+])
            }
            fn from_built(built: Built) -> Result<Self> {
                let mut items = built.into_tuple()?.into_iter();
                Ok(($($name::from_built(next_item(&mut items)?)?,)+))
            }
        }
    };
}

impl_from_row_tuple!(A, B);
impl_from_row_tuple!(A, B, C);
impl_from_row_tuple!(A, B, C, D);
impl_from_row_tuple!(A, B, C, D, F);

/// Construction step derived from the plan.
#[derive(Debug)]
pub enum BuildNode {
    /// Column read and discarded.
    Skip,
    Value,
    Entity {
        mapper: &'static EntityMapper,
        members: Vec<(Option<usize>, BuildNode)>,
        optional: bool,
    },
    Tuple(Vec<BuildNode>),
}

impl BuildNode {
    /// Build the node starting at `cursor`, returns the value and the next cursor.
    pub fn build(&self, row: &mut [Value], cursor: usize) -> Result<(Built, usize)> {
        match self {
            BuildNode::Skip => Ok((Built::Value(Value::Null), cursor + 1)),
            BuildNode::Value => {
                let Some(value) = row.get_mut(cursor) else {
                    return Err(QuillError::SchemaMismatch {
                        expected: format!("at least {} columns", cursor + 1),
                        found: format!("{}", row.len()),
                        message: "the row is shorter than the plan".into(),
                    }
                    .into());
                };
                Ok((Built::Value(mem::take(value)), cursor + 1))
            }
            BuildNode::Entity {
                mapper,
                members,
                optional,
            } => {
                let mut parts = EntityParts::new(*mapper);
                let mut cursor = cursor;
                let mut present = false;
                for (member, node) in members {
                    let (built, next) = node.build(row, cursor)?;
                    cursor = next;
                    if let (BuildNode::Value, Built::Value(v)) = (node, &built) {
                        present |= !v.is_null();
                    }
                    if let Some(member) = member {
                        parts.set(*member, built);
                    }
                }
                if *optional && !present {
                    return Ok((Built::Entity(None), cursor));
                }
                let entity = (mapper.assemble)(&mut parts)
                    .with_context(|| format!("While building `{}`", mapper.name()))?;
                Ok((Built::Entity(Some(entity)), cursor))
            }
            BuildNode::Tuple(items) => {
                let mut cursor = cursor;
                let mut result = Vec::with_capacity(items.len());
                for item in items {
                    let (built, next) = item.build(row, cursor)?;
                    cursor = next;
                    result.push(built);
                }
                Ok((Built::Tuple(result), cursor))
            }
        }
    }
}

static DECODERS: LazyLock<Cache<u64, Arc<RowDecoder>>> = LazyLock::new(Cache::new);

/// Compiled row to object function.
#[derive(Debug)]
pub struct RowDecoder {
    root: BuildNode,
    columns: usize,
}

impl RowDecoder {
    /// Cached decoder of `T` for a result with the given labels.
    pub fn get<T: FromRow>(
        dialect: &str,
        plan: &ReaderFieldPlan,
        labels: &[String],
    ) -> Result<Arc<RowDecoder>> {
        let key = hash_of(&(TypeId::of::<T>(), dialect, plan.fingerprint(), labels));
        DECODERS.get_or_insert_with(key, || {
            let decoder = Self::compile::<T>(plan, labels)?;
            log::debug!(
                "Compiled the row decoder of `{}` for {} columns ({})",
                type_name::<T>(),
                labels.len(),
                dialect
            );
            Ok(Arc::new(decoder))
        })
    }

    pub fn compile<T: FromRow>(plan: &ReaderFieldPlan, labels: &[String]) -> Result<RowDecoder> {
        if labels.len() != plan.column_count {
            return Err(QuillError::SchemaMismatch {
                expected: format!("{} columns", plan.column_count),
                found: format!("{} columns ({})", labels.len(), labels.join(", ")),
                message: format!("cannot decode `{}`", type_name::<T>()),
            }
            .into());
        }
        let top = plan.top_level().collect::<Vec<_>>();
        let root = match T::shape() {
            Shape::Tuple(shapes) => {
                if shapes.len() != top.len() {
                    return Err(QuillError::SchemaMismatch {
                        expected: format!("{} items", shapes.len()),
                        found: format!("{} items", top.len()),
                        message: format!("cannot decode the tuple `{}`", type_name::<T>()),
                    }
                    .into());
                }
                BuildNode::Tuple(
                    top.iter()
                        .zip(&shapes)
                        .map(|(position, shape)| single(plan, *position, shape))
                        .collect::<Result<_>>()?,
                )
            }
            Shape::Entity(mapper) if top.iter().all(|v| plan.fields[*v].kind == FieldKind::Anonymous) => {
                by_name(plan, &top, mapper())?
            }
            shape => match top.as_slice() {
                [position] => single(plan, *position, &shape)?,
                _ => {
                    return Err(QuillError::SchemaMismatch {
                        expected: "a single item".into(),
                        found: format!("{} items", top.len()),
                        message: format!("cannot decode `{}`", type_name::<T>()),
                    }
                    .into());
                }
            },
        };
        Ok(RowDecoder {
            root,
            columns: plan.column_count,
        })
    }

    pub fn decode<T: FromRow>(&self, row: RowLabeled) -> Result<T> {
        let mut values = row.values;
        if values.len() != self.columns {
            return Err(QuillError::SchemaMismatch {
                expected: format!("{} columns", self.columns),
                found: format!("{} columns", values.len()),
                message: format!("cannot decode `{}`", type_name::<T>()),
            }
            .into());
        }
        let (built, _) = self.root.build(&mut values, 0)?;
        T::from_built(built)
    }

    /// Decode rows synchronously, with the same decoder the async path uses.
    pub fn decode_all<'a, T: FromRow>(
        &'a self,
        rows: impl IntoIterator<Item = RowLabeled> + 'a,
    ) -> impl Iterator<Item = Result<T>> + 'a {
        rows.into_iter().map(|row| self.decode(row))
    }
}

fn single(plan: &ReaderFieldPlan, position: usize, shape: &Shape) -> Result<BuildNode> {
    let field = &plan.fields[position];
    match (field.kind, shape) {
        (FieldKind::Entity, Shape::Entity(mapper)) => {
            let expected = mapper();
            match field.mapper {
                Some(found) if found.type_id == expected.type_id => entity(plan, position),
                _ => Err(QuillError::SchemaMismatch {
                    expected: format!("`{}`", expected.name()),
                    found: format!("`{}`", field.name),
                    message: "the result entity is not the target one".into(),
                }
                .into()),
            }
        }
        (FieldKind::Field | FieldKind::Anonymous, Shape::Scalar) => Ok(BuildNode::Value),
        (FieldKind::Entity, _) => Err(QuillError::SchemaMismatch {
            expected: "a single column".into(),
            found: format!("the entity `{}`", field.name),
            message: "an entity cannot be decoded as a scalar".into(),
        }
        .into()),
        _ => Err(QuillError::SchemaMismatch {
            expected: "an entity".into(),
            found: format!("the column `{}`", field.name),
            message: "a single column cannot build an entity".into(),
        }
        .into()),
    }
}

fn entity(plan: &ReaderFieldPlan, position: usize) -> Result<BuildNode> {
    let field = &plan.fields[position];
    let Some(mapper) = field.mapper else {
        return Err(QuillError::Internal(format!("entity entry `{}` without mapper", field.name)).into());
    };
    let members = plan
        .children(position)
        .map(|child| {
            let entry = &plan.fields[child];
            let node = match (entry.kind, entry.member) {
                (FieldKind::Entity, ..) => entity(plan, child)?,
                (_, Some(..)) => BuildNode::Value,
                (_, None) => BuildNode::Skip,
            };
            Ok((entry.member, node))
        })
        .collect::<Result<_>>()?;
    Ok(BuildNode::Entity {
        mapper,
        members,
        optional: field.optional,
    })
}

/// Entity out of named projection columns, every name must match a member.
fn by_name(
    plan: &ReaderFieldPlan,
    positions: &[usize],
    mapper: &'static EntityMapper,
) -> Result<BuildNode> {
    let members = positions
        .iter()
        .map(|position| {
            let name = &plan.fields[*position].name;
            match mapper.member(name) {
                Some((i, member)) if member.is_column() => Ok((Some(i), BuildNode::Value)),
                _ => Err(QuillError::SchemaMismatch {
                    expected: format!("a member of `{}`", mapper.name()),
                    found: format!("`{}`", name),
                    message: "projection columns must be named after the members".into(),
                }
                .into()),
            }
        })
        .collect::<Result<_>>()?;
    Ok(BuildNode::Entity {
        mapper,
        members,
        optional: false,
    })
}

/// Lazily decode a row stream. The decoder is resolved on the first row and again whenever the
/// labels change.
pub fn materialize<T, S>(
    dialect: &'static str,
    plan: Arc<ReaderFieldPlan>,
    rows: S,
) -> impl Stream<Item = Result<T>> + Send
where
    T: FromRow,
    S: Stream<Item = Result<RowLabeled>> + Send,
{
    try_stream! {
        let mut rows = pin!(rows);
        let mut current: Option<(RowNames, Arc<RowDecoder>)> = None;
        while let Some(row) = rows.next().await.transpose()? {
            let decoder = match &current {
                Some((labels, decoder)) if *labels == row.labels => decoder.clone(),
                _ => {
                    let decoder = RowDecoder::get::<T>(dialect, &plan, &row.labels)?;
                    current = Some((row.labels.clone(), decoder.clone()));
                    decoder
                }
            };
            yield decoder.decode::<T>(row)?;
        }
    }
}
