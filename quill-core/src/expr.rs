use crate::{AsValue, Entity, EntityMapper, TypeKey, Value};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    Coalesce,
}

impl BinaryOp {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Less
                | BinaryOp::LessEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Subtract
                | BinaryOp::Multiply
                | BinaryOp::Divide
                | BinaryOp::Remainder
        )
    }

    /// Comparison with the opposite outcome, `a < b` becomes `a >= b`.
    pub fn negated(&self) -> Option<BinaryOp> {
        Some(match self {
            BinaryOp::Equal => BinaryOp::NotEqual,
            BinaryOp::NotEqual => BinaryOp::Equal,
            BinaryOp::Less => BinaryOp::GreaterEqual,
            BinaryOp::LessEqual => BinaryOp::Greater,
            BinaryOp::Greater => BinaryOp::LessEqual,
            BinaryOp::GreaterEqual => BinaryOp::Less,
            _ => return None,
        })
    }

    /// Binding strength, higher binds tighter.
    pub fn precedence(&self) -> i32 {
        match self {
            BinaryOp::Or => 10,
            BinaryOp::And => 20,
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::Less
            | BinaryOp::LessEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterEqual => 40,
            BinaryOp::BitOr => 50,
            BinaryOp::BitXor => 51,
            BinaryOp::BitAnd => 52,
            BinaryOp::ShiftLeft | BinaryOp::ShiftRight => 55,
            BinaryOp::Add | BinaryOp::Subtract => 60,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Remainder => 70,
            BinaryOp::Coalesce => 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negate,
}

/// Expression tree over the tables of a query.
///
/// Lambda parameters are positional, `Parameter(0)` is the first table the lambda binds to.
/// Host values captured by a closure are plain constants.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Value),
    Parameter(usize),
    Member {
        target: Box<Expr>,
        name: Cow<'static, str>,
    },
    StaticMember {
        declaring: TypeKey,
        name: Cow<'static, str>,
    },
    Call {
        target: Box<Expr>,
        name: Cow<'static, str>,
        args: Vec<Expr>,
    },
    StaticCall {
        declaring: TypeKey,
        name: Cow<'static, str>,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Convert {
        operand: Box<Expr>,
        to: Value,
    },
    New(Vec<(Cow<'static, str>, Expr)>),
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
}

impl Expr {
    pub fn constant(value: impl Into<Value>) -> Expr {
        Expr::Constant(value.into())
    }

    /// Host value captured by a closure.
    pub fn captured<T: AsValue + Clone>(value: &T) -> Expr {
        Expr::Constant(value.clone().as_value())
    }

    pub fn null() -> Expr {
        Expr::Constant(Value::Null)
    }

    pub fn param(index: usize) -> Expr {
        Expr::Parameter(index)
    }

    pub fn member(self, name: impl Into<Cow<'static, str>>) -> Expr {
        Expr::Member {
            target: Box::new(self),
            name: name.into(),
        }
    }

    pub fn call(self, name: impl Into<Cow<'static, str>>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            target: Box::new(self),
            name: name.into(),
            args,
        }
    }

    pub fn static_member(declaring: TypeKey, name: impl Into<Cow<'static, str>>) -> Expr {
        Expr::StaticMember {
            declaring,
            name: name.into(),
        }
    }

    pub fn static_call(
        declaring: TypeKey,
        name: impl Into<Cow<'static, str>>,
        args: Vec<Expr>,
    ) -> Expr {
        Expr::StaticCall {
            declaring,
            name: name.into(),
            args,
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn not(self) -> Expr {
        Expr::unary(UnaryOp::Not, self)
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn and(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::And, self, rhs)
    }

    pub fn or(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Or, self, rhs)
    }

    pub fn eq(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Equal, self, rhs)
    }

    pub fn conditional(test: Expr, then: Expr, otherwise: Expr) -> Expr {
        Expr::Conditional {
            test: Box::new(test),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn convert(self, to: Value) -> Expr {
        Expr::Convert {
            operand: Box::new(self),
            to,
        }
    }

    /// Whether any lambda parameter appears in the tree.
    pub fn references_parameters(&self) -> bool {
        match self {
            Expr::Parameter(..) => true,
            Expr::Constant(..) | Expr::StaticMember { .. } => false,
            Expr::Member { target, .. } => target.references_parameters(),
            Expr::Call { target, args, .. } => {
                target.references_parameters() || args.iter().any(Expr::references_parameters)
            }
            Expr::StaticCall { args, .. } | Expr::Tuple(args) | Expr::List(args) => {
                args.iter().any(Expr::references_parameters)
            }
            Expr::Unary { operand, .. } | Expr::Convert { operand, .. } => {
                operand.references_parameters()
            }
            Expr::Binary { lhs, rhs, .. } => {
                lhs.references_parameters() || rhs.references_parameters()
            }
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => {
                test.references_parameters()
                    || then.references_parameters()
                    || otherwise.references_parameters()
            }
            Expr::New(fields) => fields.iter().any(|(_, v)| v.references_parameters()),
        }
    }
}

/// Parameter of a lambda, optionally typed with the entity it expects to bind to.
#[derive(Debug, Clone, Copy)]
pub struct LambdaParam {
    pub name: &'static str,
    pub entity: Option<fn() -> &'static EntityMapper>,
}

impl PartialEq for LambdaParam {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.entity.map(|v| v().type_id) == other.entity.map(|v| v().type_id)
    }
}

impl LambdaParam {
    pub fn of<E: Entity>(name: &'static str) -> Self {
        Self {
            name,
            entity: Some(E::mapper),
        }
    }

    pub fn any(name: &'static str) -> Self {
        Self { name, entity: None }
    }
}

/// Predicate, projection or key selector, usually produced by `expr!`.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: Vec<LambdaParam>,
    pub body: Expr,
}

impl Lambda {
    pub fn new(params: Vec<LambdaParam>, body: Expr) -> Self {
        Self { params, body }
    }
}
