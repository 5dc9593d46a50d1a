use crate::{
    ATOMIC, Command, CompileOptions, Context, Deferred, Entity, Expr, FromRow, Fragment,
    JoinType, Lambda, Order, Parameter, QuillError, ReaderFieldPlan, Result, RowDecoder,
    SegmentKind, SelectColumn, SelectStatement, SqlSegment, SqlWriter, TableGraph, TypeKey,
    Visitor,
};
use std::{marker::PhantomData, sync::Arc};

/// Typed SELECT under construction.
///
/// Lambdas bind positionally to the root table and then to the explicitly joined tables, in
/// the order they were joined. Nothing is compiled until [`QueryBuilder::compile`].
///
/// ```ignore
/// let query = Order::query()
///     .filter(expr!(|o: Order| o.customer_id == 7 && o.total > dec!(100)))
///     .order_by(expr!(|o: Order| o.id))
///     .page(2, 10);
/// ```
pub struct QueryBuilder<T> {
    graph: TableGraph,
    joins: Vec<(usize, Lambda)>,
    includes: Vec<String>,
    filters: Vec<Lambda>,
    group_by: Vec<Lambda>,
    having: Vec<Lambda>,
    order_by: Vec<(Lambda, Order)>,
    projection: Option<Lambda>,
    distinct: bool,
    skip: Option<u64>,
    take: Option<u64>,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for QueryBuilder<T> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            joins: self.joins.clone(),
            includes: self.includes.clone(),
            filters: self.filters.clone(),
            group_by: self.group_by.clone(),
            having: self.having.clone(),
            order_by: self.order_by.clone(),
            projection: self.projection.clone(),
            distinct: self.distinct,
            skip: self.skip,
            take: self.take,
            _type: PhantomData,
        }
    }
}

impl<E: Entity> QueryBuilder<E> {
    /// Query selecting every column of `E`.
    pub fn new() -> Self {
        Self {
            graph: TableGraph::new(E::mapper()),
            joins: Vec::new(),
            includes: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            projection: None,
            distinct: false,
            skip: None,
            take: None,
            _type: PhantomData,
        }
    }
}

impl<E: Entity> Default for QueryBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueryBuilder<T> {
    fn join<J: Entity>(mut self, join: JoinType, on: Lambda) -> Self {
        let table = self.graph.join(J::mapper(), join);
        self.joins.push((table, on));
        self
    }

    pub fn inner_join<J: Entity>(self, on: Lambda) -> Self {
        self.join::<J>(JoinType::Inner, on)
    }

    pub fn left_join<J: Entity>(self, on: Lambda) -> Self {
        self.join::<J>(JoinType::Left, on)
    }

    pub fn right_join<J: Entity>(self, on: Lambda) -> Self {
        self.join::<J>(JoinType::Right, on)
    }

    /// Eagerly load a navigation of the root entity, nested navigations are separated by dots
    /// (`"customer.address"`).
    pub fn include(mut self, path: impl Into<String>) -> Self {
        self.includes.push(path.into());
        self
    }

    /// Add a predicate, all of them must hold.
    pub fn filter(mut self, predicate: Lambda) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn group_by(mut self, key: Lambda) -> Self {
        self.group_by.push(key);
        self
    }

    pub fn having(mut self, predicate: Lambda) -> Self {
        self.having.push(predicate);
        self
    }

    pub fn order_by(mut self, key: Lambda) -> Self {
        self.order_by.push((key, Order::Asc));
        self
    }

    pub fn order_by_desc(mut self, key: Lambda) -> Self {
        self.order_by.push((key, Order::Desc));
        self
    }

    /// Secondary ordering, same as another `order_by`.
    pub fn then_by(self, key: Lambda) -> Self {
        self.order_by(key)
    }

    pub fn then_by_desc(self, key: Lambda) -> Self {
        self.order_by_desc(key)
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Replace the selected columns, `U` is what each row decodes into.
    pub fn select<U>(self, projection: Lambda) -> QueryBuilder<U> {
        QueryBuilder {
            graph: self.graph,
            joins: self.joins,
            includes: self.includes,
            filters: self.filters,
            group_by: self.group_by,
            having: self.having,
            order_by: self.order_by,
            projection: Some(projection),
            distinct: self.distinct,
            skip: self.skip,
            take: self.take,
            _type: PhantomData,
        }
    }

    /// Back to every column of the root entity and of its includes.
    pub fn select_all(mut self) -> Self {
        self.projection = None;
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: u64) -> Self {
        self.take = Some(take);
        self
    }

    /// Page `index` (starting from 1) of `size` rows.
    pub fn page(self, index: u64, size: u64) -> Self {
        self.skip(index.saturating_sub(1).saturating_mul(size)).take(size)
    }

    pub fn compile(&self, writer: &dyn SqlWriter) -> Result<CompiledQuery<T>> {
        self.compile_with(writer, &Default::default())
    }

    pub fn compile_with(
        &self,
        writer: &dyn SqlWriter,
        options: &CompileOptions,
    ) -> Result<CompiledQuery<T>> {
        let (select, params, plan) = self.assemble(writer, options)?;
        let mut sql = String::new();
        writer.write_select(&mut sql, &select)?;
        log::debug!("Compiled query ({}):\n{}", writer.name(), sql);
        Ok(CompiledQuery::new(sql, params, plan, writer.name()))
    }

    /// Count of the rows the query returns, paging ignored.
    pub fn compile_count(&self, writer: &dyn SqlWriter) -> Result<CompiledQuery<i64>> {
        self.compile_count_with(writer, &Default::default())
    }

    pub fn compile_count_with(
        &self,
        writer: &dyn SqlWriter,
        options: &CompileOptions,
    ) -> Result<CompiledQuery<i64>> {
        let (select, params, _) = self.assemble(writer, options)?;
        let mut sql = String::new();
        writer.write_count(&mut sql, &select)?;
        let mut plan = ReaderFieldPlan::new();
        plan.push_anonymous("count");
        Ok(CompiledQuery::new(sql, params, plan, writer.name()))
    }

    fn assemble(
        &self,
        writer: &dyn SqlWriter,
        options: &CompileOptions,
    ) -> Result<(SelectStatement, Vec<Parameter>, ReaderFieldPlan)> {
        let mut graph = self.graph.clone();
        for path in &self.includes {
            include_path(&mut graph, path)?;
        }
        let declared = graph.declared.clone();
        let mut select = SelectStatement {
            distinct: self.distinct,
            skip: self.skip,
            take: self.take,
            ..Default::default()
        };
        let mut plan = ReaderFieldPlan::new();
        let mut ons = Vec::with_capacity(self.joins.len());
        let params = {
            let mut visitor = Visitor::new(writer, &graph, options);
            for (table, on) in &self.joins {
                visitor.context = Context::new(Fragment::SqlJoin, true);
                let visible = declared
                    .iter()
                    .position(|v| v == table)
                    .map_or(declared.len(), |v| v + 1);
                ons.push((*table, visitor.predicate(on, &declared[..visible])?));
            }
            visitor.context = Context::new(Fragment::SqlSelect, true);
            match &self.projection {
                None => push_entity(&visitor, &mut plan, &mut select.columns, 0, None, None),
                Some(lambda) => {
                    project(&mut visitor, lambda, &declared, &mut plan, &mut select.columns)?
                }
            }
            select.filter =
                conjunction(&mut visitor, &self.filters, Fragment::SqlSelectWhere, &declared)?;
            visitor.context = Context::new(Fragment::SqlSelectGroupBy, true);
            for lambda in &self.group_by {
                for segment in keys(&mut visitor, lambda, &declared)? {
                    select.group_by.push(visitor.render(&segment)?);
                }
            }
            select.having =
                conjunction(&mut visitor, &self.having, Fragment::SqlSelectHaving, &declared)?;
            visitor.context = Context::new(Fragment::SqlSelectOrderBy, true);
            for (lambda, order) in &self.order_by {
                for segment in keys(&mut visitor, lambda, &declared)? {
                    select.order_by.push((visitor.render(&segment)?, *order));
                }
            }
            visitor.params
        };
        for (table, on) in ons {
            graph.tables[table].on = Some(on);
        }
        graph.write_from(writer, &mut select.from)?;
        Ok((select, params, plan))
    }
}

/// Register the tables of a dotted navigation path starting from the root.
fn include_path(graph: &mut TableGraph, path: &str) -> Result<()> {
    let mut table = 0;
    for name in path.split('.') {
        let mapper = graph.tables[table].mapper;
        match mapper.member(name) {
            Some((member, declared)) if !declared.is_column() => {
                table = graph.include(table, member)?;
            }
            Some(..) => {
                return Err(QuillError::unsupported(
                    format!("`{}` is a column, only navigations can be included", path),
                    mapper.name(),
                    name,
                )
                .into());
            }
            None => {
                return Err(QuillError::unsupported(
                    format!("unknown member in the include path `{}`", path),
                    mapper.name(),
                    name,
                )
                .into());
            }
        }
    }
    Ok(())
}

/// Columns of the entity at `table` followed by the entities included from it.
fn push_entity(
    visitor: &Visitor<'_>,
    plan: &mut ReaderFieldPlan,
    columns: &mut Vec<SelectColumn>,
    table: usize,
    parent: Option<usize>,
    member: Option<usize>,
) {
    let segment = &visitor.graph.tables[table];
    let optional = !matches!(segment.join, JoinType::From | JoinType::Inner);
    let entry = plan.push_entity(parent, Some(table), member, segment.mapper, optional);
    for (i, declared) in segment.mapper.columns() {
        let column = visitor.column(table, i);
        columns.push(SelectColumn {
            sql: column.text().unwrap_or_default().to_string(),
            alias: None,
        });
        plan.push_field(entry, Some(table), Some(i), declared.field_name.as_str());
    }
    for (child, included) in visitor.graph.children(table) {
        push_entity(
            visitor,
            plan,
            columns,
            child,
            Some(entry),
            included.included_from.map(|(_, member)| member),
        );
    }
}

fn project(
    visitor: &mut Visitor<'_>,
    lambda: &Lambda,
    tables: &[usize],
    plan: &mut ReaderFieldPlan,
    columns: &mut Vec<SelectColumn>,
) -> Result<()> {
    visitor.bind(lambda, tables)?;
    let items = match &lambda.body {
        Expr::New(fields) => fields
            .iter()
            .map(|(name, v)| (Some(name.to_string()), v))
            .collect::<Vec<_>>(),
        Expr::Tuple(items) => items.iter().map(|v| (None, v)).collect(),
        body => vec![(None, body)],
    };
    for (name, expr) in items {
        let segment = visitor.visit(expr, &Deferred::none())?;
        if segment.kind == SegmentKind::Entity {
            let table = segment.table.unwrap_or_default();
            push_entity(visitor, plan, columns, table, None, None);
            continue;
        }
        let segment = as_value(visitor, segment)?;
        let sql = visitor.render(&segment)?;
        let label = name.clone().unwrap_or_else(|| format!("c{}", plan.column_count));
        columns.push(SelectColumn { sql, alias: name });
        plan.push_anonymous(label);
    }
    Ok(())
}

/// A condition used where a value is expected becomes `CASE WHEN .. THEN true ELSE false END`.
fn as_value(visitor: &mut Visitor<'_>, segment: SqlSegment) -> Result<SqlSegment> {
    if !segment.kind.is_predicate() && segment.deferred.is_empty() {
        return Ok(segment);
    }
    let condition = visitor.as_predicate(segment)?;
    if condition.is_constant() {
        return Ok(condition);
    }
    let text = visitor.render(&condition)?;
    let mut out = format!("CASE WHEN {} THEN ", text);
    visitor
        .writer
        .write_value_bool(&visitor.context, &mut out, true);
    out.push_str(" ELSE ");
    visitor
        .writer
        .write_value_bool(&visitor.context, &mut out, false);
    out.push_str(" END");
    Ok(condition
        .change(SegmentKind::Conditional, out, ATOMIC)
        .typed(TypeKey::Bool))
}

/// Grouping or ordering keys, a tuple body yields one key per item.
fn keys(visitor: &mut Visitor<'_>, lambda: &Lambda, tables: &[usize]) -> Result<Vec<SqlSegment>> {
    visitor.bind(lambda, tables)?;
    let items = match &lambda.body {
        Expr::Tuple(items) => items.iter().collect::<Vec<_>>(),
        body => vec![body],
    };
    items
        .into_iter()
        .map(|item| {
            let segment = visitor.visit(item, &Deferred::none())?;
            if segment.kind == SegmentKind::Entity {
                return Err(QuillError::unsupported(
                    "an entity cannot be used as a key, select one of its members",
                    "Lambda",
                    "key",
                )
                .into());
            }
            as_value(visitor, segment)
        })
        .collect()
}

/// Conjunction of predicates, `None` when it always holds.
fn conjunction(
    visitor: &mut Visitor<'_>,
    predicates: &[Lambda],
    fragment: Fragment,
    tables: &[usize],
) -> Result<Option<String>> {
    visitor.context = Context::new(fragment, true);
    let mark = visitor.params.len();
    let mut parts = Vec::with_capacity(predicates.len());
    for lambda in predicates {
        visitor.bind(lambda, tables)?;
        let segment = visitor.visit_predicate(&lambda.body, &Deferred::none())?;
        match segment.constant_bool() {
            Some(true) => continue,
            Some(false) => {
                visitor.params.truncate(mark);
                return Ok(Some(visitor.finish_predicate(&segment)?));
            }
            None => parts.push(segment),
        }
    }
    match parts.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(visitor.render(single)?)),
        _ => {
            let rendered = parts
                .iter()
                .map(|v| visitor.render_operand(v, ATOMIC))
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(rendered.join(" AND ")))
        }
    }
}

/// Output of the compilation: SQL text, bindings and the plan that decodes its rows.
#[derive(Debug)]
pub struct CompiledQuery<T> {
    pub sql: String,
    pub params: Vec<Parameter>,
    pub plan: Arc<ReaderFieldPlan>,
    pub dialect: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for CompiledQuery<T> {
    fn clone(&self) -> Self {
        Self {
            sql: self.sql.clone(),
            params: self.params.clone(),
            plan: self.plan.clone(),
            dialect: self.dialect,
            _type: PhantomData,
        }
    }
}

impl<T> CompiledQuery<T> {
    pub fn new(
        sql: String,
        params: Vec<Parameter>,
        plan: ReaderFieldPlan,
        dialect: &'static str,
    ) -> Self {
        Self {
            sql,
            params,
            plan: Arc::new(plan),
            dialect,
            _type: PhantomData,
        }
    }

    pub fn command(&self) -> Command {
        Command::new(self.sql.clone(), self.params.clone())
    }

    pub fn into_command(self) -> Command {
        Command::new(self.sql, self.params)
    }
}

impl<T: FromRow> CompiledQuery<T> {
    /// Decoder of the rows of this query for the given result labels.
    pub fn decoder(&self, labels: &[String]) -> Result<Arc<RowDecoder>> {
        RowDecoder::get::<T>(self.dialect, &self.plan, labels)
    }
}
