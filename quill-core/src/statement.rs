use crate::EntityMapper;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectColumn {
    pub sql: String,
    pub alias: Option<String>,
}

/// Rendered parts of a SELECT, assembled by the dialect writer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectStatement {
    pub distinct: bool,
    pub columns: Vec<SelectColumn>,
    /// Table list including the joins, without the `FROM` keyword.
    pub from: String,
    pub filter: Option<String>,
    pub group_by: Vec<String>,
    pub having: Option<String>,
    pub order_by: Vec<(String, Order)>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

impl SelectStatement {
    pub fn is_paged(&self) -> bool {
        self.skip.is_some() || self.take.is_some()
    }

    /// Same statement without ordering and paging, used as the source of counts.
    pub fn unordered(&self) -> SelectStatement {
        SelectStatement {
            order_by: Vec::new(),
            skip: None,
            take: None,
            ..self.clone()
        }
    }
}

/// Single row INSERT, `values` are rendered placeholders aligned with `columns`.
#[derive(Debug)]
pub struct InsertStatement<'a> {
    pub mapper: &'a EntityMapper,
    pub columns: Vec<usize>,
    pub values: Vec<String>,
    /// Member receiving the generated identity.
    pub returning: Option<usize>,
}

#[derive(Debug)]
pub struct UpdateStatement<'a> {
    pub mapper: &'a EntityMapper,
    pub assignments: Vec<(usize, String)>,
    pub keys: Vec<(usize, String)>,
}

#[derive(Debug)]
pub struct DeleteStatement<'a> {
    pub mapper: &'a EntityMapper,
    pub filter: Option<String>,
}
