#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    #[default]
    None,
    SqlCreateTable,
    SqlDeleteFrom,
    SqlDeleteFromWhere,
    SqlDropTable,
    SqlInsertInto,
    SqlInsertIntoValues,
    SqlJoin,
    SqlSelect,
    SqlSelectFrom,
    SqlSelectGroupBy,
    SqlSelectHaving,
    SqlSelectOrderBy,
    SqlSelectWhere,
    SqlUpdate,
    SqlUpdateWhere,
    Casting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub fragment: Fragment,
    pub qualify_columns: bool,
}

impl Context {
    pub fn new(fragment: Fragment, qualify_columns: bool) -> Self {
        Self {
            fragment,
            qualify_columns,
        }
    }

    /// Copy of the context positioned in another part of the statement.
    pub fn switch_fragment(&self, fragment: Fragment) -> Context {
        Context { fragment, ..*self }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new(Fragment::None, true)
    }
}
