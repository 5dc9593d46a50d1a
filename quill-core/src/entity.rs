use crate::{AsValue, Built, DbType, QueryBuilder, QuillError, Result, Value};
use anyhow::Context as _;
use std::{
    any::{Any, TypeId, type_name},
    fmt::{self, Debug},
};

/// Persistent type, usually implemented with `#[derive(Entity)]`.
pub trait Entity: Send + 'static {
    /// Metadata of the entity, built once and cached for the process lifetime.
    fn mapper() -> &'static EntityMapper
    where
        Self: Sized;

    /// Build the entity out of the values collected by the materializer.
    fn assemble(parts: &mut EntityParts) -> Result<Self>
    where
        Self: Sized;

    /// One value per member of the mapper, `Value::Null` for navigations.
    fn values(&self) -> Vec<Value>;

    /// Query selecting every column of the entity.
    fn query() -> QueryBuilder<Self>
    where
        Self: Sized,
    {
        QueryBuilder::new()
    }

    fn assemble_any(parts: &mut EntityParts) -> Result<Box<dyn Any + Send>>
    where
        Self: Sized,
    {
        Ok(Box::new(Self::assemble(parts)?))
    }
}

/// Custom serialization of a member, applied both to bound parameters and to values read back.
pub trait TypeHandler: Send + Sync {
    /// Prototype of the value stored in the database.
    fn prototype(&self) -> Value;
    fn to_db(&self, value: Value) -> Result<Value>;
    fn from_db(&self, value: Value) -> Result<Value>;
}

/// Relation to another entity loaded through an include.
#[derive(Clone, Copy)]
pub struct Navigation {
    pub target: fn() -> &'static EntityMapper,
    /// Member of the declaring entity holding the key of the target.
    pub foreign_key: &'static str,
}

#[derive(Clone)]
pub struct MemberMapper {
    pub name: &'static str,
    pub field_name: String,
    pub prototype: Value,
    pub nullable: bool,
    pub is_enum: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub navigation: Option<Navigation>,
    pub handler: Option<&'static dyn TypeHandler>,
    renamed: bool,
}

impl MemberMapper {
    pub fn column<T: AsValue>(name: &'static str) -> Self {
        Self {
            name,
            field_name: name.into(),
            prototype: T::as_empty_value(),
            nullable: T::is_nullable(),
            is_enum: T::is_enum(),
            primary_key: false,
            auto_increment: false,
            navigation: None,
            handler: None,
            renamed: false,
        }
    }

    pub fn navigation(
        name: &'static str,
        target: fn() -> &'static EntityMapper,
        foreign_key: &'static str,
    ) -> Self {
        Self {
            name,
            field_name: name.into(),
            prototype: Value::Null,
            nullable: true,
            is_enum: false,
            primary_key: false,
            auto_increment: false,
            navigation: Some(Navigation {
                target,
                foreign_key,
            }),
            handler: None,
            renamed: false,
        }
    }

    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self.renamed = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn handler(mut self, handler: &'static dyn TypeHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn is_column(&self) -> bool {
        self.navigation.is_none()
    }

    pub fn is_string(&self) -> bool {
        matches!(self.stored_prototype(), Value::Varchar(..) | Value::Char(..))
    }

    /// Prototype of the stored value, the handler's one when present.
    pub fn stored_prototype(&self) -> Value {
        match self.handler {
            Some(handler) => handler.prototype(),
            None => self.prototype.clone(),
        }
    }

    pub fn db_type(&self) -> Result<DbType> {
        if self.navigation.is_some() {
            return Err(QuillError::TypeMapping {
                declaring: String::new(),
                member: self.name.into(),
                message: "a navigation has no database type".into(),
            }
            .into());
        }
        DbType::of(&self.stored_prototype()).map_err(|_| {
            QuillError::TypeMapping {
                declaring: String::new(),
                member: self.name.into(),
                message: format!(
                    "{} has no corresponding database type",
                    self.prototype.type_name()
                ),
            }
            .into()
        })
    }

    /// Value as it is sent to the database.
    pub fn to_db(&self, value: Value) -> Result<Value> {
        match self.handler {
            Some(handler) => handler.to_db(value),
            None => Ok(value),
        }
    }
}

impl Debug for MemberMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberMapper")
            .field("name", &self.name)
            .field("field_name", &self.field_name)
            .field("prototype", &self.prototype)
            .field("nullable", &self.nullable)
            .field("primary_key", &self.primary_key)
            .field("navigation", &self.navigation.map(|v| v.foreign_key))
            .finish()
    }
}

pub struct EntityMapper {
    pub type_name: &'static str,
    pub type_id: TypeId,
    pub table: String,
    pub schema: String,
    pub field_prefix: String,
    pub members: Vec<MemberMapper>,
    pub primary_keys: Vec<usize>,
    pub assemble: fn(&mut EntityParts) -> Result<Box<dyn Any + Send>>,
}

impl EntityMapper {
    pub fn new<E: Entity>(
        table: impl Into<String>,
        schema: impl Into<String>,
        field_prefix: impl Into<String>,
        members: Vec<MemberMapper>,
    ) -> Self {
        let field_prefix = field_prefix.into();
        let members = members
            .into_iter()
            .map(|mut member| {
                if !member.renamed && member.is_column() {
                    member.field_name = format!("{}{}", field_prefix, member.name);
                }
                member
            })
            .collect::<Vec<_>>();
        let primary_keys = members
            .iter()
            .enumerate()
            .filter_map(|(i, v)| if v.primary_key { Some(i) } else { None })
            .collect();
        Self {
            type_name: type_name::<E>(),
            type_id: TypeId::of::<E>(),
            table: table.into(),
            schema: schema.into(),
            field_prefix,
            members,
            primary_keys,
            assemble: E::assemble_any,
        }
    }

    /// Short name of the entity type, without the module path.
    pub fn name(&self) -> &'static str {
        self.type_name
            .rsplit("::")
            .next()
            .unwrap_or(self.type_name)
    }

    pub fn member(&self, name: &str) -> Option<(usize, &MemberMapper)> {
        self.members.iter().enumerate().find(|(_, v)| v.name == name)
    }

    pub fn columns(&self) -> impl Iterator<Item = (usize, &MemberMapper)> {
        self.members.iter().enumerate().filter(|(_, v)| v.is_column())
    }

    /// The primary key when it is a single auto increment column.
    pub fn identity(&self) -> Option<(usize, &MemberMapper)> {
        match self.primary_keys.as_slice() {
            [i] if self.members[*i].auto_increment => Some((*i, &self.members[*i])),
            _ => None,
        }
    }

    /// Key on the target side of a navigation: the single primary key of the target.
    pub fn navigation_key(&self, member: usize) -> Result<(usize, usize, &'static EntityMapper)> {
        let declared = &self.members[member];
        let Some(navigation) = declared.navigation else {
            return Err(QuillError::unsupported(
                "the member is not a navigation",
                self.name(),
                declared.name,
            )
            .into());
        };
        let target = (navigation.target)();
        let Some((local, _)) = self.member(navigation.foreign_key) else {
            return Err(QuillError::TypeMapping {
                declaring: self.name().into(),
                member: declared.name.into(),
                message: format!("foreign key `{}` is not a member", navigation.foreign_key),
            }
            .into());
        };
        match target.primary_keys.as_slice() {
            [key] => Ok((local, *key, target)),
            _ => Err(QuillError::TypeMapping {
                declaring: self.name().into(),
                member: declared.name.into(),
                message: format!(
                    "`{}` must have exactly one primary key to be included",
                    target.name()
                ),
            }
            .into()),
        }
    }
}

impl Debug for EntityMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMapper")
            .field("type_name", &self.type_name)
            .field("table", &self.table)
            .field("members", &self.members)
            .finish()
    }
}

/// Values collected for one entity, indexed by member.
pub struct EntityParts {
    mapper: &'static EntityMapper,
    parts: Vec<Option<Built>>,
}

impl EntityParts {
    pub fn new(mapper: &'static EntityMapper) -> Self {
        Self {
            mapper,
            parts: (0..mapper.members.len()).map(|_| None).collect(),
        }
    }

    pub fn mapper(&self) -> &'static EntityMapper {
        self.mapper
    }

    pub fn set(&mut self, member: usize, value: Built) {
        self.parts[member] = Some(value);
    }

    /// Take a column value, a member that was not selected reads as NULL.
    pub fn take<T: AsValue>(&mut self, member: usize) -> Result<T> {
        let declared = &self.mapper.members[member];
        let value = match self.parts[member].take() {
            Some(Built::Value(v)) => v,
            None => Value::Null,
            Some(..) => {
                return Err(QuillError::SchemaMismatch {
                    expected: "a column value".into(),
                    found: "an entity".into(),
                    message: format!("member `{}::{}`", self.mapper.name(), declared.name),
                }
                .into());
            }
        };
        let value = match declared.handler {
            Some(handler) if !value.is_null() => handler.from_db(value)?,
            _ => value,
        };
        T::try_from_value(value).with_context(|| {
            format!(
                "While reading member `{}::{}`",
                self.mapper.name(),
                declared.name
            )
        })
    }

    pub fn take_nested_optional<E: Entity>(&mut self, member: usize) -> Result<Option<E>> {
        match self.parts[member].take() {
            Some(Built::Entity(Some(entity))) => match entity.downcast::<E>() {
                Ok(v) => Ok(Some(*v)),
                Err(..) => Err(QuillError::Internal(format!(
                    "member `{}::{}` was built with a different entity type",
                    self.mapper.name(),
                    self.mapper.members[member].name
                ))
                .into()),
            },
            Some(Built::Entity(None)) | None => Ok(None),
            Some(..) => Err(QuillError::SchemaMismatch {
                expected: "an entity".into(),
                found: "a column value".into(),
                message: format!(
                    "member `{}::{}`",
                    self.mapper.name(),
                    self.mapper.members[member].name
                ),
            }
            .into()),
        }
    }

    pub fn take_nested<E: Entity>(&mut self, member: usize) -> Result<E> {
        self.take_nested_optional(member)?.ok_or_else(|| {
            QuillError::TypeMapping {
                declaring: self.mapper.name().into(),
                member: self.mapper.members[member].name.into(),
                message: "the navigation is not optional but it was not loaded, include it in the query or make it Option".into(),
            }
            .into()
        })
    }
}

/// Enumeration stored through its integral code.
pub trait DbEnum: Sized {
    fn code(&self) -> i64;
    fn variant_name(&self) -> &'static str;
    fn from_code(code: i64) -> Option<Self>;
    fn from_name(name: &str) -> Option<Self>;
}

/// Read an enum from either its integral code or its variant name.
pub fn enum_from_value<E: DbEnum>(value: Value) -> Result<E> {
    let found = match &value {
        Value::Varchar(Some(name)) => match name.trim().parse::<i64>() {
            Ok(code) => E::from_code(code),
            Err(..) => E::from_name(name.trim()),
        },
        Value::Char(Some(c)) => E::from_name(&c.to_string()),
        _ => match crate::convert(value.clone(), &Value::Int64(None))? {
            Value::Int64(Some(code)) => E::from_code(code),
            _ => None,
        },
    };
    found.ok_or_else(|| {
        QuillError::Conversion {
            from: value.type_name().into(),
            to: type_name::<E>().into(),
            value: format!("{:?}", value),
        }
        .into()
    })
}
