use crate::{
    AsValue, Command, CompileOptions, CompiledQuery, Driver, Entity, EntityMapper, FromRow,
    Lambda, QueryBuilder, QueryResult, ReaderFieldPlan, Result, RowDecoder, RowLabeled, RowNames,
    RowsAffected, Shape, SqlWriter, create_table_command, delete_command, delete_where_command,
    drop_table_command, insert_command, insert_commands, materialize,
    stream::{Stream, StreamExt, TryStreamExt},
    update_command, update_commands,
};
use async_stream::try_stream;
use futures::future::Either;
use std::{future::Future, pin::pin, sync::Arc};

/// One page of a query together with the total count of its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub total: u64,
    /// Starting from 1.
    pub page_index: u64,
    pub page_size: u64,
}

impl<T> PagedList<T> {
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }
}

/// Runs commands. Drivers implement [`Executor::run`], everything else is derived from it:
/// queries are compiled synchronously before any I/O, rows are decoded through the cached
/// decoders while they stream in.
pub trait Executor: Send + Sized {
    type Driver: Driver;

    fn driver(&self) -> &Self::Driver;

    fn compile_options(&self) -> CompileOptions {
        CompileOptions::default()
    }

    /// General method to send any command and return any result type (either row or count).
    fn run(&mut self, command: Command) -> impl Stream<Item = Result<QueryResult>> + Send;

    /// Execute the command and returns the rows.
    fn fetch(&mut self, command: Command) -> impl Stream<Item = Result<RowLabeled>> + Send {
        self.run(command).filter_map(|v| async move {
            match v {
                Ok(QueryResult::Row(v)) => Some(Ok(v)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

    /// Execute the command and return the total number of rows affected.
    fn execute(&mut self, command: Command) -> impl Future<Output = Result<RowsAffected>> + Send {
        self.run(command)
            .filter_map(|v| async move {
                match v {
                    Ok(QueryResult::Affected(v)) => Some(Ok(v)),
                    Err(e) => Some(Err(e)),
                    _ => None,
                }
            })
            .try_collect()
    }

    /// Compile and run a query, decoding every row into `T`.
    fn query<T: FromRow>(
        &mut self,
        query: &QueryBuilder<T>,
    ) -> impl Stream<Item = Result<T>> + Send {
        let writer = self.driver().sql_writer();
        let compiled = query.compile_with(&writer, &self.compile_options());
        self.query_compiled(compiled)
    }

    /// Run an already compiled query.
    fn query_compiled<T: FromRow>(
        &mut self,
        compiled: Result<CompiledQuery<T>>,
    ) -> impl Stream<Item = Result<T>> + Send {
        match compiled {
            Ok(compiled) => {
                let dialect = compiled.dialect;
                let plan = compiled.plan.clone();
                Either::Left(materialize(dialect, plan, self.fetch(compiled.into_command())))
            }
            Err(e) => Either::Right(futures::stream::once(async move { Err(e) })),
        }
    }

    fn query_all<T: FromRow>(
        &mut self,
        query: &QueryBuilder<T>,
    ) -> impl Future<Output = Result<Vec<T>>> + Send {
        self.query(query).try_collect()
    }

    /// First row of the query, the query is limited to one row.
    fn query_first<T: FromRow>(
        &mut self,
        query: &QueryBuilder<T>,
    ) -> impl Future<Output = Result<Option<T>>> + Send {
        let writer = self.driver().sql_writer();
        let compiled = query
            .clone()
            .take(1)
            .compile_with(&writer, &self.compile_options());
        let stream = self.query_compiled(compiled);
        async move { pin!(stream).try_next().await }
    }

    /// Count of all the rows and page `page_index` (from 1) of `page_size` rows.
    fn query_page<T: FromRow>(
        &mut self,
        query: &QueryBuilder<T>,
        page_index: u64,
        page_size: u64,
    ) -> impl Future<Output = Result<PagedList<T>>> + Send {
        let writer = self.driver().sql_writer();
        let options = self.compile_options();
        let compiled = query.compile_count_with(&writer, &options).and_then(|count| {
            let page = query
                .clone()
                .page(page_index, page_size)
                .compile_with(&writer, &options)?;
            Ok((count, page))
        });
        async move {
            let (count, page) = compiled?;
            let total = {
                let stream = materialize::<i64, _>(
                    count.dialect,
                    count.plan.clone(),
                    self.fetch(count.command()),
                );
                pin!(stream).try_next().await?.unwrap_or_default()
            };
            let items = materialize::<T, _>(
                page.dialect,
                page.plan.clone(),
                self.fetch(page.into_command()),
            )
            .try_collect()
            .await?;
            Ok(PagedList {
                items,
                total: total.max(0) as u64,
                page_index: page_index.max(1),
                page_size,
            })
        }
    }

    /// Run raw SQL decoding the rows by column name: entity members are matched against the
    /// labels, anything else reads the columns in order.
    fn query_raw<T: FromRow>(&mut self, command: Command) -> impl Stream<Item = Result<T>> + Send {
        let dialect = self.driver().sql_writer().name();
        let sql = command.sql.clone();
        let rows = self.fetch(command);
        try_stream! {
            let mut rows = pin!(rows);
            let mut current: Option<(RowNames, Arc<RowDecoder>)> = None;
            while let Some(row) = rows.next().await.transpose()? {
                let decoder = match &current {
                    Some((labels, decoder)) if *labels == row.labels => decoder.clone(),
                    _ => {
                        let plan = ReaderFieldPlan::for_labels(&sql, raw_target::<T>(), &row.labels)?;
                        let decoder = RowDecoder::get::<T>(dialect, &plan, &row.labels)?;
                        current = Some((row.labels.clone(), decoder.clone()));
                        decoder
                    }
                };
                yield decoder.decode::<T>(row)?;
            }
        }
    }

    /// Insert one entity, with `returning` the generated identity is in `last_affected_id`.
    fn insert<E: Entity>(
        &mut self,
        entity: &E,
        returning: bool,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        let writer = self.driver().sql_writer();
        let command = insert_command(&writer, &self.compile_options(), entity, returning);
        async move {
            let command = command?;
            if !returning || E::mapper().identity().is_none() {
                return self.execute(command).await;
            }
            let mut result = RowsAffected::default();
            let mut stream = pin!(self.run(command));
            while let Some(item) = stream.try_next().await? {
                match item {
                    QueryResult::Affected(affected) => result.extend([affected]),
                    QueryResult::Row(row) => {
                        let id = row.values.first().cloned().unwrap_or_default();
                        result.last_affected_id = Option::<i64>::try_from_value(id)?;
                    }
                }
            }
            Ok(result)
        }
    }

    /// Insert many entities in as few commands as the parameter limit allows.
    fn insert_many<'a, E, It>(
        &mut self,
        entities: It,
    ) -> impl Future<Output = Result<RowsAffected>> + Send
    where
        E: Entity + 'a,
        It: IntoIterator<Item = &'a E>,
    {
        let writer = self.driver().sql_writer();
        let commands = insert_commands(&writer, &self.compile_options(), entities);
        self.execute_all(commands)
    }

    fn update<E: Entity>(&mut self, entity: &E) -> impl Future<Output = Result<RowsAffected>> + Send {
        let writer = self.driver().sql_writer();
        let command = update_command(&writer, &self.compile_options(), entity);
        async move { self.execute(command?).await }
    }

    fn update_many<'a, E, It>(
        &mut self,
        entities: It,
    ) -> impl Future<Output = Result<RowsAffected>> + Send
    where
        E: Entity + 'a,
        It: IntoIterator<Item = &'a E>,
    {
        let writer = self.driver().sql_writer();
        let commands = update_commands(&writer, &self.compile_options(), entities);
        self.execute_all(commands)
    }

    fn delete<E: Entity>(&mut self, entity: &E) -> impl Future<Output = Result<RowsAffected>> + Send {
        let writer = self.driver().sql_writer();
        let command = delete_command(&writer, &self.compile_options(), entity);
        async move { self.execute(command?).await }
    }

    fn delete_where<E: Entity>(
        &mut self,
        predicate: &Lambda,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        let writer = self.driver().sql_writer();
        let command = delete_where_command::<E>(&writer, &self.compile_options(), predicate);
        async move { self.execute(command?).await }
    }

    fn create_table<E: Entity>(
        &mut self,
        if_not_exists: bool,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        let writer = self.driver().sql_writer();
        let command = create_table_command::<E>(&writer, if_not_exists);
        async move { self.execute(command?).await }
    }

    fn drop_table<E: Entity>(
        &mut self,
        if_exists: bool,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        let writer = self.driver().sql_writer();
        let command = drop_table_command::<E>(&writer, if_exists);
        self.execute(command)
    }

    #[doc(hidden)]
    fn execute_all(
        &mut self,
        commands: Result<Vec<Command>>,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        async move {
            let mut result = RowsAffected::default();
            for command in commands? {
                result.extend([self.execute(command).await?]);
            }
            Ok(result)
        }
    }
}

/// Entity metadata when `T` decodes into an entity.
fn raw_target<T: FromRow>() -> Option<&'static EntityMapper> {
    match T::shape() {
        Shape::Entity(mapper) => Some(mapper()),
        _ => None,
    }
}
