//! Reader field plan: what every column of a result set is for.
//!
//! Entries are kept in pre-order, an entity entry is followed by its own columns and then by the
//! entities included from it. Only field and anonymous entries consume a column, an entity entry
//! records the range of columns of its subtree.
use crate::{Cache, EntityMapper, Result, hash_of};
use std::{
    hash::{Hash, Hasher},
    sync::{Arc, LazyLock},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Column of a mapped entity member.
    Field,
    /// Entity built out of the columns that follow.
    Entity,
    /// Computed projection column.
    Anonymous,
}

#[derive(Debug, Clone)]
pub struct ReaderField {
    /// First column covered by the entry.
    pub index: usize,
    pub kind: FieldKind,
    /// Position of the enclosing entity entry.
    pub parent: Option<usize>,
    /// Table of the query graph the entry reads from.
    pub table: Option<usize>,
    /// Member of the parent entity receiving the value.
    pub member: Option<usize>,
    pub name: String,
    /// Columns covered, nested entities included.
    pub field_count: usize,
    pub has_nested: bool,
    /// Entity entries whose columns may all be NULL (outer joins).
    pub optional: bool,
    pub mapper: Option<&'static EntityMapper>,
}

impl Hash for ReaderField {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.kind.hash(state);
        self.parent.hash(state);
        self.table.hash(state);
        self.member.hash(state);
        self.name.hash(state);
        self.field_count.hash(state);
        self.optional.hash(state);
        self.mapper.map(|v| v.type_id).hash(state);
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReaderFieldPlan {
    pub fields: Vec<ReaderField>,
    pub column_count: usize,
}

static RAW_PLANS: LazyLock<Cache<u64, Arc<ReaderFieldPlan>>> = LazyLock::new(Cache::new);

impl ReaderFieldPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_entity(
        &mut self,
        parent: Option<usize>,
        table: Option<usize>,
        member: Option<usize>,
        mapper: &'static EntityMapper,
        optional: bool,
    ) -> usize {
        if let Some(parent) = parent {
            self.fields[parent].has_nested = true;
        }
        let position = self.fields.len();
        self.fields.push(ReaderField {
            index: self.column_count,
            kind: FieldKind::Entity,
            parent,
            table,
            member,
            name: mapper.name().into(),
            field_count: 0,
            has_nested: false,
            optional,
            mapper: Some(mapper),
        });
        position
    }

    /// Column bound to `member` of the entity at `parent`, `None` when no member matches it.
    pub fn push_field(
        &mut self,
        parent: usize,
        table: Option<usize>,
        member: Option<usize>,
        name: impl Into<String>,
    ) -> usize {
        self.push_column(FieldKind::Field, Some(parent), table, member, name.into())
    }

    pub fn push_anonymous(&mut self, name: impl Into<String>) -> usize {
        self.push_column(FieldKind::Anonymous, None, None, None, name.into())
    }

    fn push_column(
        &mut self,
        kind: FieldKind,
        parent: Option<usize>,
        table: Option<usize>,
        member: Option<usize>,
        name: String,
    ) -> usize {
        let position = self.fields.len();
        self.fields.push(ReaderField {
            index: self.column_count,
            kind,
            parent,
            table,
            member,
            name,
            field_count: 1,
            has_nested: false,
            optional: false,
            mapper: None,
        });
        self.column_count += 1;
        let mut ancestor = parent;
        while let Some(current) = ancestor {
            self.fields[current].field_count += 1;
            ancestor = self.fields[current].parent;
        }
        position
    }

    /// Positions of the entries not nested in any entity.
    pub fn top_level(&self) -> impl Iterator<Item = usize> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, v)| v.parent.is_none())
            .map(|(i, _)| i)
    }

    pub fn children(&self, position: usize) -> impl Iterator<Item = usize> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(move |(_, v)| v.parent == Some(position))
            .map(|(i, _)| i)
    }

    /// Stable hash of the layout, part of the decoder cache key.
    pub fn fingerprint(&self) -> u64 {
        hash_of(&(&self.fields, self.column_count))
    }

    /// Plan of a raw result, derived from its column labels.
    ///
    /// With a target entity every label is matched against the member field names, case
    /// insensitively; labels matching nothing are read and discarded. Without one every column
    /// is anonymous.
    pub fn for_labels(
        sql: &str,
        mapper: Option<&'static EntityMapper>,
        labels: &[String],
    ) -> Result<Arc<ReaderFieldPlan>> {
        let key = hash_of(&(sql, mapper.map(|v| v.type_id), labels));
        RAW_PLANS.get_or_insert_with(key, || {
            let mut plan = ReaderFieldPlan::new();
            let Some(mapper) = mapper else {
                for label in labels {
                    plan.push_anonymous(label.as_str());
                }
                return Ok(Arc::new(plan));
            };
            let root = plan.push_entity(None, None, None, mapper, false);
            for label in labels {
                let member = mapper
                    .columns()
                    .find(|(_, v)| v.field_name.eq_ignore_ascii_case(label))
                    .map(|(i, _)| i);
                if member.is_none() {
                    log::warn!(
                        "Column `{}` does not match any member of `{}`, it will be ignored",
                        label,
                        mapper.name()
                    );
                }
                plan.push_field(root, None, member, label.as_str());
            }
            log::debug!(
                "Built the reader plan of `{}` for {} columns",
                mapper.name(),
                labels.len()
            );
            Ok(Arc::new(plan))
        })
    }
}
