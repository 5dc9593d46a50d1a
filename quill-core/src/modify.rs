//! Commands writing entities: INSERT, UPDATE, DELETE and the fixture DDL.
//!
//! Parameters are named after the members. Commands holding several rows suffix every name with
//! the row position inside the command (`total_0`, `total_1`, ...) and are split so that none
//! binds more parameters than the dialect accepts.
use crate::{
    Command, CompileOptions, Context, DeleteStatement, Entity, EntityMapper, Fragment,
    InsertStatement, Lambda, MemberMapper, Parameter, QuillError, Result, SqlWriter, TableGraph,
    UpdateStatement, Value, Visitor,
};
use anyhow::Context as _;

fn prefix<'a>(writer: &'a dyn SqlWriter, options: &'a CompileOptions) -> &'a str {
    options
        .parameter_prefix_override
        .as_deref()
        .unwrap_or_else(|| writer.parameter_prefix())
}

/// Bind `value` for `member` and return the placeholder.
fn bind(
    writer: &dyn SqlWriter,
    prefix: &str,
    member: &MemberMapper,
    row: Option<usize>,
    value: Value,
    params: &mut Vec<Parameter>,
) -> Result<String> {
    let name = match row {
        Some(row) => format!("{}_{}", member.name, row),
        None => member.name.to_string(),
    };
    let value = member
        .to_db(value)
        .with_context(|| format!("While binding member `{}`", member.name))?;
    let mut out = String::new();
    writer.write_parameter(
        &Context::new(Fragment::SqlInsertIntoValues, false),
        &mut out,
        prefix,
        &name,
    );
    params.push(Parameter::new(name, value));
    Ok(out)
}

fn values_of<E: Entity>(mapper: &EntityMapper, entity: &E) -> Result<Vec<Value>> {
    let values = entity.values();
    if values.len() != mapper.members.len() {
        return Err(QuillError::Internal(format!(
            "`{}` produced {} values for {} members",
            mapper.name(),
            values.len(),
            mapper.members.len()
        ))
        .into());
    }
    Ok(values)
}

fn insert_statement(
    writer: &dyn SqlWriter,
    prefix: &str,
    mapper: &EntityMapper,
    mut values: Vec<Value>,
    row: Option<usize>,
    returning: bool,
    params: &mut Vec<Parameter>,
) -> Result<String> {
    let identity = mapper.identity().map(|(i, _)| i);
    let mut columns = Vec::new();
    let mut placeholders = Vec::new();
    for (i, member) in mapper.columns() {
        // Generated by the database
        if Some(i) == identity {
            continue;
        }
        let value = std::mem::take(&mut values[i]);
        placeholders.push(bind(writer, prefix, member, row, value, params)?);
        columns.push(i);
    }
    let statement = InsertStatement {
        mapper,
        columns,
        values: placeholders,
        returning: if returning { identity } else { None },
    };
    let mut out = String::new();
    writer.write_insert(&mut out, &statement)?;
    Ok(out)
}

fn update_statement(
    writer: &dyn SqlWriter,
    prefix: &str,
    mapper: &EntityMapper,
    mut values: Vec<Value>,
    row: Option<usize>,
    params: &mut Vec<Parameter>,
) -> Result<String> {
    let mut assignments = Vec::new();
    let mut keys = Vec::new();
    for (i, member) in mapper.columns() {
        let value = std::mem::take(&mut values[i]);
        let placeholder = bind(writer, prefix, member, row, value, params)?;
        if member.primary_key {
            keys.push((i, placeholder));
        } else {
            assignments.push((i, placeholder));
        }
    }
    let statement = UpdateStatement {
        mapper,
        assignments,
        keys,
    };
    let mut out = String::new();
    writer.write_update(&mut out, &statement)?;
    Ok(out)
}

/// Rows per command given the parameters each row binds.
fn rows_per_command(writer: &dyn SqlWriter, options: &CompileOptions, per_row: usize) -> usize {
    let limit = options.max_parameters.unwrap_or_else(|| writer.max_parameters());
    (limit / per_row.max(1)).max(1)
}

fn batches<'a, E, It, F>(
    writer: &dyn SqlWriter,
    options: &CompileOptions,
    per_row: usize,
    entities: It,
    mut statement: F,
) -> Result<Vec<Command>>
where
    E: Entity + 'a,
    It: IntoIterator<Item = &'a E>,
    F: FnMut(&E, Option<usize>, &mut Vec<Parameter>) -> Result<String>,
{
    let chunk = rows_per_command(writer, options, per_row);
    let mut result = Vec::new();
    let mut statements = Vec::new();
    let mut params = Vec::new();
    for entity in entities {
        if statements.len() == chunk {
            result.push(batch_command(writer, &mut statements, &mut params));
        }
        let row = statements.len();
        statements.push(statement(entity, Some(row), &mut params)?);
    }
    if !statements.is_empty() {
        result.push(batch_command(writer, &mut statements, &mut params));
    }
    Ok(result)
}

fn batch_command(
    writer: &dyn SqlWriter,
    statements: &mut Vec<String>,
    params: &mut Vec<Parameter>,
) -> Command {
    let mut sql = String::new();
    writer.write_batch(&mut sql, statements);
    statements.clear();
    Command::new(sql, std::mem::take(params))
}

/// INSERT of one entity, `returning` appends the retrieval of the generated identity.
pub fn insert_command<E: Entity>(
    writer: &dyn SqlWriter,
    options: &CompileOptions,
    entity: &E,
    returning: bool,
) -> Result<Command> {
    let mapper = E::mapper();
    let mut params = Vec::new();
    let sql = insert_statement(
        writer,
        prefix(writer, options),
        mapper,
        values_of(mapper, entity)?,
        None,
        returning,
        &mut params,
    )?;
    Ok(Command::new(sql, params))
}

/// INSERT of many entities, one statement per row joined in batches.
pub fn insert_commands<'a, E, It>(
    writer: &dyn SqlWriter,
    options: &CompileOptions,
    entities: It,
) -> Result<Vec<Command>>
where
    E: Entity + 'a,
    It: IntoIterator<Item = &'a E>,
{
    let mapper = E::mapper();
    let identity = mapper.identity().map(|(i, _)| i);
    let per_row = mapper.columns().filter(|(i, _)| Some(*i) != identity).count();
    let prefix = prefix(writer, options);
    batches(writer, options, per_row, entities, |entity, row, params| {
        insert_statement(
            writer,
            prefix,
            mapper,
            values_of(mapper, entity)?,
            row,
            false,
            params,
        )
    })
}

/// UPDATE of every column of an entity, matched by primary key.
pub fn update_command<E: Entity>(
    writer: &dyn SqlWriter,
    options: &CompileOptions,
    entity: &E,
) -> Result<Command> {
    let mapper = E::mapper();
    let mut params = Vec::new();
    let sql = update_statement(
        writer,
        prefix(writer, options),
        mapper,
        values_of(mapper, entity)?,
        None,
        &mut params,
    )?;
    Ok(Command::new(sql, params))
}

pub fn update_commands<'a, E, It>(
    writer: &dyn SqlWriter,
    options: &CompileOptions,
    entities: It,
) -> Result<Vec<Command>>
where
    E: Entity + 'a,
    It: IntoIterator<Item = &'a E>,
{
    let mapper = E::mapper();
    let per_row = mapper.columns().count();
    let prefix = prefix(writer, options);
    batches(writer, options, per_row, entities, |entity, row, params| {
        update_statement(writer, prefix, mapper, values_of(mapper, entity)?, row, params)
    })
}

/// DELETE of one entity by primary key.
pub fn delete_command<E: Entity>(
    writer: &dyn SqlWriter,
    options: &CompileOptions,
    entity: &E,
) -> Result<Command> {
    let mapper = E::mapper();
    if mapper.primary_keys.is_empty() {
        return Err(QuillError::unsupported(
            "delete of an entity without primary key",
            mapper.name(),
            "delete",
        )
        .into());
    }
    let mut values = values_of(mapper, entity)?;
    let prefix = prefix(writer, options);
    let mut params = Vec::new();
    let keys = mapper
        .primary_keys
        .iter()
        .map(|i| {
            let value = std::mem::take(&mut values[*i]);
            Ok((*i, bind(writer, prefix, &mapper.members[*i], None, value, &mut params)?))
        })
        .collect::<Result<Vec<_>>>()?;
    let mut filter = String::new();
    writer.write_key_filter(
        &Context::new(Fragment::SqlDeleteFromWhere, false),
        &mut filter,
        mapper,
        &keys,
    );
    let mut sql = String::new();
    writer.write_delete(
        &mut sql,
        &DeleteStatement {
            mapper,
            filter: Some(filter),
        },
    )?;
    Ok(Command::new(sql, params))
}

/// DELETE of the rows matching a predicate over `E`, columns are not qualified.
pub fn delete_where_command<E: Entity>(
    writer: &dyn SqlWriter,
    options: &CompileOptions,
    predicate: &Lambda,
) -> Result<Command> {
    let mapper = E::mapper();
    let graph = TableGraph::new(mapper).unaliased();
    let mut visitor = Visitor::new(writer, &graph, options);
    visitor.context = Context::new(Fragment::SqlDeleteFromWhere, false);
    let filter = visitor.predicate(predicate, &graph.declared)?;
    let mut sql = String::new();
    writer.write_delete(
        &mut sql,
        &DeleteStatement {
            mapper,
            filter: Some(filter),
        },
    )?;
    log::debug!("Compiled delete ({}):\n{}", writer.name(), sql);
    Ok(Command::new(sql, visitor.params))
}

pub fn create_table_command<E: Entity>(
    writer: &dyn SqlWriter,
    if_not_exists: bool,
) -> Result<Command> {
    let mut sql = String::new();
    writer.write_create_table(&mut sql, E::mapper(), if_not_exists)?;
    Ok(sql.into())
}

pub fn drop_table_command<E: Entity>(writer: &dyn SqlWriter, if_exists: bool) -> Command {
    let mut sql = String::new();
    writer.write_drop_table(&mut sql, E::mapper(), if_exists);
    sql.into()
}
