use crate::{TypeKey, Value};

/// Pending unary operation recorded while descending into a sub-tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredOp {
    Not,
}

/// Immutable list of pending operators, each visitor call receives its own copy so nothing
/// leaks across sibling branches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deferred(Vec<DeferredOp>);

impl Deferred {
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn not() -> Self {
        Self(vec![DeferredOp::Not])
    }

    pub fn with(&self, op: DeferredOp) -> Self {
        let mut ops = self.0.clone();
        ops.push(op);
        Self(ops)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Odd number of pending NOT.
    pub fn negated(&self) -> bool {
        self.0.iter().filter(|v| **v == DeferredOp::Not).count() % 2 == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    None,
    Field,
    Entity,
    Constant,
    Parameter,
    And,
    Or,
    Not,
    Comparison,
    Predicate,
    Arithmetic,
    Concat,
    Coalesce,
    Call,
    Convert,
    Conditional,
    List,
}

impl SegmentKind {
    /// The segment renders as a boolean condition rather than a boolean value.
    pub fn is_predicate(&self) -> bool {
        matches!(
            self,
            SegmentKind::And
                | SegmentKind::Or
                | SegmentKind::Not
                | SegmentKind::Comparison
                | SegmentKind::Predicate
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SegmentValue {
    Constant(Value),
    Sql(String),
}

/// Column of a table participating in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberRef {
    pub table: usize,
    pub member: usize,
}

pub const ATOMIC: i32 = i32::MAX;

/// Compiled state of one expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlSegment {
    pub kind: SegmentKind,
    pub has_field: bool,
    pub is_parameter: bool,
    pub is_expression: bool,
    pub parameter_name: Option<String>,
    pub member: Option<MemberRef>,
    pub table: Option<usize>,
    pub value: SegmentValue,
    pub value_type: TypeKey,
    pub precedence: i32,
    pub deferred: Deferred,
}

impl SqlSegment {
    pub fn constant(value: Value) -> Self {
        Self {
            kind: SegmentKind::Constant,
            has_field: false,
            is_parameter: false,
            is_expression: false,
            parameter_name: None,
            member: None,
            table: None,
            value_type: value.type_key(),
            value: SegmentValue::Constant(value),
            precedence: ATOMIC,
            deferred: Deferred::none(),
        }
    }

    pub fn sql(kind: SegmentKind, text: String, value_type: TypeKey, precedence: i32) -> Self {
        Self {
            kind,
            has_field: false,
            is_parameter: false,
            is_expression: true,
            parameter_name: None,
            member: None,
            table: None,
            value: SegmentValue::Sql(text),
            value_type,
            precedence,
            deferred: Deferred::none(),
        }
    }

    /// Call like fragment, `UPPER(x)`, never needs parentheses.
    pub fn call(text: String, value_type: TypeKey) -> Self {
        Self::sql(SegmentKind::Call, text, value_type, ATOMIC)
    }

    pub fn predicate(text: String, precedence: i32) -> Self {
        Self::sql(SegmentKind::Predicate, text, TypeKey::Bool, precedence)
    }

    pub fn field(member: MemberRef, text: String, value_type: TypeKey) -> Self {
        Self {
            kind: SegmentKind::Field,
            has_field: true,
            is_parameter: false,
            is_expression: false,
            parameter_name: None,
            member: Some(member),
            table: Some(member.table),
            value: SegmentValue::Sql(text),
            value_type,
            precedence: ATOMIC,
            deferred: Deferred::none(),
        }
    }

    pub fn entity(table: usize) -> Self {
        Self {
            kind: SegmentKind::Entity,
            has_field: true,
            is_parameter: false,
            is_expression: false,
            parameter_name: None,
            member: None,
            table: Some(table),
            value: SegmentValue::Sql(String::new()),
            value_type: TypeKey::Entity,
            precedence: ATOMIC,
            deferred: Deferred::none(),
        }
    }

    pub fn parameter(name: String, text: String, value_type: TypeKey) -> Self {
        Self {
            kind: SegmentKind::Parameter,
            has_field: false,
            is_parameter: true,
            is_expression: false,
            parameter_name: Some(name),
            member: None,
            table: None,
            value: SegmentValue::Sql(text),
            value_type,
            precedence: ATOMIC,
            deferred: Deferred::none(),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.value, SegmentValue::Constant(..))
    }

    pub fn constant_value(&self) -> Option<&Value> {
        match &self.value {
            SegmentValue::Constant(v) => Some(v),
            _ => None,
        }
    }

    pub fn constant_bool(&self) -> Option<bool> {
        self.constant_value().and_then(Value::as_bool)
    }

    pub fn text(&self) -> Option<&str> {
        match &self.value {
            SegmentValue::Sql(v) => Some(v),
            _ => None,
        }
    }

    /// Fold the flags of the operands into a segment built out of them.
    pub fn merge(mut self, other: &SqlSegment) -> Self {
        self.has_field |= other.has_field;
        if self.member.is_none() {
            self.member = other.member;
        }
        if self.table.is_none() {
            self.table = other.table;
        }
        self
    }

    pub fn merge_all<'a>(self, others: impl IntoIterator<Item = &'a SqlSegment>) -> Self {
        others.into_iter().fold(self, |acc, v| acc.merge(v))
    }

    /// Attach the pending operators the segment could not apply itself.
    pub fn defer(mut self, deferred: &Deferred) -> Self {
        self.deferred = deferred.clone();
        self
    }

    pub fn typed(mut self, value_type: TypeKey) -> Self {
        self.value_type = value_type;
        self
    }

    /// Replace the rendered text keeping the flags.
    pub fn change(mut self, kind: SegmentKind, text: String, precedence: i32) -> Self {
        self.kind = kind;
        self.value = SegmentValue::Sql(text);
        self.is_expression = true;
        self.precedence = precedence;
        self
    }
}
