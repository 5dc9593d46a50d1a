use crate::{
    Context, EntityMapper, Fragment, QuillError, Result, SqlWriter, separated_by, table_alias,
};
use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    From,
    Inner,
    Left,
    Right,
}

/// One table participating in a query.
#[derive(Debug, Clone)]
pub struct TableSegment {
    pub mapper: &'static EntityMapper,
    pub alias: String,
    pub join: JoinType,
    /// Table and navigation member this table was included from.
    pub included_from: Option<(usize, usize)>,
    pub on: Option<String>,
    pub used: Cell<bool>,
}

/// Tables of one query, in declaration order.
///
/// `declared` lists the root and the explicitly joined tables, the ones lambda parameters bind
/// to. Included tables are reachable only through navigations.
#[derive(Debug, Clone)]
pub struct TableGraph {
    pub tables: Vec<TableSegment>,
    pub declared: Vec<usize>,
}

impl TableGraph {
    pub fn new(root: &'static EntityMapper) -> Self {
        let mut result = Self {
            tables: Vec::new(),
            declared: Vec::new(),
        };
        let root = result.push(root, JoinType::From, None);
        result.declared.push(root);
        result
    }

    fn push(
        &mut self,
        mapper: &'static EntityMapper,
        join: JoinType,
        included_from: Option<(usize, usize)>,
    ) -> usize {
        let index = self.tables.len();
        self.tables.push(TableSegment {
            mapper,
            alias: table_alias(index),
            join,
            included_from,
            on: None,
            used: Cell::new(false),
        });
        index
    }

    pub fn root(&self) -> &TableSegment {
        &self.tables[0]
    }

    /// Register an explicitly joined table, its ON clause is set once compiled.
    pub fn join(&mut self, mapper: &'static EntityMapper, join: JoinType) -> usize {
        let index = self.push(mapper, join, None);
        self.declared.push(index);
        index
    }

    /// Table loaded through the navigation `member` of `parent`, registered on first use.
    pub fn include(&mut self, parent: usize, member: usize) -> Result<usize> {
        if let Some(index) = self.included(parent, member) {
            return Ok(index);
        }
        let Some(segment) = self.tables.get(parent) else {
            return Err(QuillError::Internal(format!("table {} is not registered", parent)).into());
        };
        let (.., target) = segment.mapper.navigation_key(member)?;
        Ok(self.push(target, JoinType::Left, Some((parent, member))))
    }

    pub fn included(&self, parent: usize, member: usize) -> Option<usize> {
        self.tables
            .iter()
            .position(|v| v.included_from == Some((parent, member)))
    }

    /// Tables included from `parent`, in registration order.
    pub fn children(&self, parent: usize) -> impl Iterator<Item = (usize, &TableSegment)> {
        self.tables
            .iter()
            .enumerate()
            .filter(move |(_, v)| matches!(v.included_from, Some((p, _)) if p == parent))
    }

    /// Drop the aliases, a single table statement references its columns unqualified.
    pub fn unaliased(mut self) -> Self {
        for table in &mut self.tables {
            table.alias.clear();
        }
        self
    }

    /// Render the table list with its joins, without the `FROM` keyword.
    pub fn write_from(&self, writer: &dyn SqlWriter, out: &mut String) -> Result<()> {
        let context = Context::new(Fragment::SqlSelectFrom, true);
        let mut result = Ok(());
        separated_by(
            out,
            self.tables.iter().enumerate(),
            |out, (i, table)| {
                if result.is_err() {
                    return;
                }
                match table.join {
                    JoinType::From => {
                        writer.write_table_ref(&context, out, table.mapper, &table.alias)
                    }
                    join => {
                        let context = context.switch_fragment(Fragment::SqlJoin);
                        out.push_str(match join {
                            JoinType::Inner => "INNER JOIN ",
                            JoinType::Right => "RIGHT JOIN ",
                            _ => "LEFT JOIN ",
                        });
                        writer.write_table_ref(&context, out, table.mapper, &table.alias);
                        out.push_str(" ON ");
                        match (&table.on, table.included_from) {
                            (Some(on), ..) => out.push_str(on),
                            (None, Some((parent, member))) => {
                                result = self.write_include_on(writer, &context, out, i, parent, member)
                            }
                            (None, None) => out.push_str("1 = 1"),
                        }
                    }
                }
            },
            "\n",
        );
        result
    }

    fn write_include_on(
        &self,
        writer: &dyn SqlWriter,
        context: &Context,
        out: &mut String,
        table: usize,
        parent: usize,
        member: usize,
    ) -> Result<()> {
        let declaring = &self.tables[parent];
        let (local, key, target) = declaring.mapper.navigation_key(member)?;
        writer.write_column_ref(
            context,
            out,
            &self.tables[table].alias,
            &target.members[key].field_name,
        );
        out.push_str(" = ");
        writer.write_column_ref(
            context,
            out,
            &declaring.alias,
            &declaring.mapper.members[local].field_name,
        );
        Ok(())
    }
}
