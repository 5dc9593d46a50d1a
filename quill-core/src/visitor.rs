use crate::{
    ATOMIC, BinaryOp, CompileOptions, Context, Deferred, DeferredOp, Expr, FormatCall,
    FormatterEntry, Fragment, Lambda, MemberInfo, MemberRef, MethodInfo, QuillError, Result,
    SegmentKind, SqlSegment, SqlWriter, TableGraph, TypeKey, UnaryOp, Value, convert,
    eval_binary, eval_call, eval_convert, eval_member, eval_static, eval_unary,
};
use anyhow::Context as _;
use std::borrow::Cow;

/// Value bound to a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Name without the dialect prefix.
    pub name: String,
    pub value: Value,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Compiles expression trees into SQL segments for one query.
///
/// Parameters are accumulated in visiting order and named `p0`, `p1`, ...
pub struct Visitor<'a> {
    pub writer: &'a dyn SqlWriter,
    pub graph: &'a TableGraph,
    pub options: &'a CompileOptions,
    pub context: Context,
    pub params: Vec<Parameter>,
    prefix: String,
    bindings: Vec<usize>,
}

impl<'a> Visitor<'a> {
    pub fn new(writer: &'a dyn SqlWriter, graph: &'a TableGraph, options: &'a CompileOptions) -> Self {
        Self {
            writer,
            graph,
            options,
            context: Context::new(Fragment::SqlSelectWhere, true),
            params: Vec::new(),
            prefix: options
                .parameter_prefix_override
                .clone()
                .unwrap_or_else(|| writer.parameter_prefix().into()),
            bindings: Vec::new(),
        }
    }

    /// Bind the lambda parameters positionally to `tables`.
    pub fn bind(&mut self, lambda: &Lambda, tables: &[usize]) -> Result<()> {
        if lambda.params.len() > tables.len() {
            let extra = &lambda.params[tables.len()];
            return Err(QuillError::unsupported(
                format!(
                    "the lambda declares {} parameters but the query has {} tables",
                    lambda.params.len(),
                    tables.len()
                ),
                "Lambda",
                extra.name,
            )
            .into());
        }
        for (param, table) in lambda.params.iter().zip(tables) {
            let mapper = self.graph.tables[*table].mapper;
            if let Some(entity) = param.entity
                && entity().type_id != mapper.type_id
            {
                return Err(QuillError::unsupported(
                    format!(
                        "parameter `{}` is declared as `{}` but binds to `{}`",
                        param.name,
                        entity().name(),
                        mapper.name()
                    ),
                    "Lambda",
                    param.name,
                )
                .into());
            }
        }
        self.bindings = tables[..lambda.params.len()].to_vec();
        Ok(())
    }

    /// Compile a predicate lambda into condition text.
    pub fn predicate(&mut self, lambda: &Lambda, tables: &[usize]) -> Result<String> {
        self.bind(lambda, tables)?;
        let segment = self.visit_predicate(&lambda.body, &Deferred::none())?;
        self.finish_predicate(&segment)
    }

    /// Compile a value lambda (key selector, projection column).
    pub fn expression(&mut self, lambda: &Lambda, tables: &[usize]) -> Result<SqlSegment> {
        self.bind(lambda, tables)?;
        self.visit(&lambda.body, &Deferred::none())
    }

    /// Condition text of a predicate segment, constants become always true or false conditions.
    pub fn finish_predicate(&mut self, segment: &SqlSegment) -> Result<String> {
        match segment.constant_value() {
            Some(v) => {
                let mut out = String::new();
                self.writer
                    .write_bool_predicate(&self.context, &mut out, v.as_bool().unwrap_or(false));
                Ok(out)
            }
            None => self.render(segment),
        }
    }

    /// Final SQL text of a segment, constants become parameters or literals.
    pub fn render(&mut self, segment: &SqlSegment) -> Result<String> {
        if !segment.deferred.is_empty() {
            return Err(QuillError::Internal(format!(
                "{} pending operators were not applied to {:?}",
                segment.deferred.len(),
                segment.value
            ))
            .into());
        }
        match segment.constant_value() {
            Some(v) => Ok(self.render_constant(v.clone())),
            None => Ok(segment.text().unwrap_or_default().to_string()),
        }
    }

    /// Render parenthesizing when the segment binds looser than `precedence`.
    pub fn render_operand(&mut self, segment: &SqlSegment, precedence: i32) -> Result<String> {
        let text = self.render(segment)?;
        Ok(if segment.precedence < precedence {
            format!("({})", text)
        } else {
            text
        })
    }

    pub fn render_constant(&mut self, value: Value) -> String {
        let mut out = String::new();
        match value {
            v if v.is_null() => self.writer.write_value_none(&self.context, &mut out),
            Value::List(Some(items), ..) => {
                let items = items
                    .into_iter()
                    .map(|v| self.render_constant(v))
                    .collect::<Vec<_>>();
                out.push_str(&items.join(", "));
            }
            v if self.options.inline_constants => self.writer.write_value(&self.context, &mut out, &v),
            v => out = self.add_parameter(v),
        }
        out
    }

    /// Bind a new parameter and return its placeholder.
    pub fn add_parameter(&mut self, value: Value) -> String {
        let name = format!("p{}", self.params.len());
        let mut out = String::new();
        self.writer
            .write_parameter(&self.context, &mut out, &self.prefix, &name);
        self.params.push(Parameter::new(name, value));
        out
    }

    /// Convert a constant compared with a column to the column type and its handler
    /// representation.
    pub fn coerce(&self, value: Value, target: &SqlSegment) -> Result<Value> {
        if value.is_null() || target.kind != SegmentKind::Field {
            return Ok(value);
        }
        let Some(member) = target.member else {
            return Ok(value);
        };
        let declared = &self.graph.tables[member.table].mapper.members[member.member];
        convert(value, &declared.prototype)
            .and_then(|v| declared.to_db(v))
            .with_context(|| {
                format!(
                    "While converting a constant for `{}::{}`",
                    self.graph.tables[member.table].mapper.name(),
                    declared.name
                )
            })
    }

    /// Column reference segment.
    pub fn column(&self, table: usize, member: usize) -> SqlSegment {
        let segment = &self.graph.tables[table];
        segment.used.set(true);
        let declared = &segment.mapper.members[member];
        let mut out = String::new();
        self.writer
            .write_column_ref(&self.context, &mut out, &segment.alias, &declared.field_name);
        SqlSegment::field(
            MemberRef { table, member },
            out,
            declared.stored_prototype().type_key(),
        )
    }

    pub fn visit(&mut self, expr: &Expr, deferred: &Deferred) -> Result<SqlSegment> {
        let result = match expr {
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => return self.visit_not(operand, deferred),
            Expr::Binary { op, lhs, rhs } if op.is_logical() => {
                return self.visit_logical(*op, lhs, rhs, deferred);
            }
            Expr::Binary { op, lhs, rhs } if op.is_comparison() => {
                return self.visit_comparison(*op, lhs, rhs, deferred);
            }
            Expr::Call { target, name, args } => {
                return self.visit_call(target, name, args, deferred);
            }
            Expr::StaticCall {
                declaring,
                name,
                args,
            } => return self.visit_static(*declaring, name, args, deferred),
            Expr::StaticMember { declaring, name } => {
                return self.visit_static(*declaring, name, &[], deferred);
            }
            Expr::Constant(v) => SqlSegment::constant(v.clone()),
            Expr::Parameter(i) => {
                let Some(table) = self.bindings.get(*i) else {
                    return Err(QuillError::Internal(format!(
                        "lambda parameter {} is not bound to any table",
                        i
                    ))
                    .into());
                };
                self.graph.tables[*table].used.set(true);
                SqlSegment::entity(*table)
            }
            Expr::Member { target, name } => self.visit_member(target, name)?,
            Expr::Unary {
                op: UnaryOp::Negate,
                operand,
            } => self.visit_negate(operand)?,
            Expr::Binary { op, lhs, rhs } => self.visit_binary(*op, lhs, rhs)?,
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => return self.visit_conditional(test, then, otherwise, deferred),
            Expr::Convert { operand, to } => self.visit_convert(operand, to)?,
            Expr::List(items) => self.visit_list(items)?,
            Expr::New(..) | Expr::Tuple(..) => {
                return Err(QuillError::unsupported(
                    "a tuple or struct literal is allowed only as a projection",
                    "Expr",
                    "new",
                )
                .into());
            }
        };
        Ok(result.defer(deferred))
    }

    /// Visit and turn the result into a condition, draining the pending operators.
    pub fn visit_predicate(&mut self, expr: &Expr, deferred: &Deferred) -> Result<SqlSegment> {
        let segment = self.visit(expr, deferred)?;
        self.as_predicate(segment)
    }

    /// Apply the pending operators of a segment used as a condition.
    pub fn as_predicate(&mut self, mut segment: SqlSegment) -> Result<SqlSegment> {
        let negated = segment.deferred.negated();
        segment.deferred = Deferred::none();
        if let Some(value) = segment.constant_value() {
            return match value {
                Value::Boolean(Some(v)) => Ok(SqlSegment::constant(Value::Boolean(Some(*v != negated)))),
                v if v.is_null() => Ok(SqlSegment::constant(Value::Boolean(Some(false)))),
                v => Err(QuillError::unsupported(
                    format!("{} is not a condition", v.type_name()),
                    "Expr",
                    "constant",
                )
                .into()),
            };
        }
        if !segment.kind.is_predicate() && segment.value_type == TypeKey::Bool {
            let text = self.render_operand(&segment, BinaryOp::Equal.precedence() + 1)?;
            let mut out = text;
            out.push_str(" = ");
            self.writer.write_value_bool(&self.context, &mut out, !negated);
            return Ok(segment.change(SegmentKind::Comparison, out, BinaryOp::Equal.precedence()));
        }
        if negated {
            let text = self.render(&segment)?;
            return Ok(segment.change(SegmentKind::Not, format!("NOT ({})", text), 30));
        }
        Ok(segment)
    }

    fn visit_not(&mut self, operand: &Expr, deferred: &Deferred) -> Result<SqlSegment> {
        let segment = self.visit(operand, &deferred.with(DeferredOp::Not))?;
        if segment.deferred.is_empty() {
            return Ok(segment);
        }
        let negated = segment.deferred.negated();
        if let Some(value) = segment.constant_value() {
            let value = if negated {
                eval_unary(UnaryOp::Not, value)?
            } else {
                value.clone()
            };
            return Ok(SqlSegment::constant(value));
        }
        if matches!(segment.value_type, TypeKey::Int | TypeKey::UInt) {
            let mut segment = segment;
            segment.deferred = Deferred::none();
            if !negated {
                return Ok(segment);
            }
            let text = self.render_operand(&segment, ATOMIC)?;
            let mut out = String::new();
            self.writer.write_bitwise_not(&self.context, &mut out, &text)?;
            return Ok(segment.change(SegmentKind::Arithmetic, out, 80));
        }
        self.as_predicate(segment)
    }

    fn visit_logical(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        deferred: &Deferred,
    ) -> Result<SqlSegment> {
        let negated = deferred.negated();
        // De Morgan, the negation moves to the operands
        let (op, inner) = match (op, negated) {
            (BinaryOp::And, true) => (BinaryOp::Or, Deferred::not()),
            (BinaryOp::Or, true) => (BinaryOp::And, Deferred::not()),
            (op, _) => (op, Deferred::none()),
        };
        let mark = self.params.len();
        let lhs = self.visit_predicate(lhs, &inner)?;
        let rhs = self.visit_predicate(rhs, &inner)?;
        let is_and = op == BinaryOp::And;
        match (lhs.constant_bool(), rhs.constant_bool()) {
            (Some(v), _) | (_, Some(v)) if v != is_and => {
                // Parameters of the discarded operand
                self.params.truncate(mark);
                return Ok(SqlSegment::constant(Value::Boolean(Some(v))));
            }
            (Some(..), _) => return Ok(rhs),
            (_, Some(..)) => return Ok(lhs),
            _ => {}
        }
        let l = self.render_operand(&lhs, ATOMIC)?;
        let r = self.render_operand(&rhs, ATOMIC)?;
        let mut out = String::new();
        self.writer.write_binary(&self.context, &mut out, op, &l, &r)?;
        Ok(SqlSegment::sql(
            if is_and { SegmentKind::And } else { SegmentKind::Or },
            out,
            TypeKey::Bool,
            op.precedence(),
        )
        .merge(&lhs)
        .merge(&rhs))
    }

    /// Primary key column of an entity segment, used when comparing navigations with NULL.
    fn entity_key(&self, segment: SqlSegment) -> Result<SqlSegment> {
        if segment.kind != SegmentKind::Entity {
            return Ok(segment);
        }
        let table = segment.table.unwrap_or_default();
        let mapper = self.graph.tables[table].mapper;
        match mapper.primary_keys.as_slice() {
            [key] => Ok(self.column(table, *key)),
            _ => Err(QuillError::unsupported(
                "comparison of an entity without a single primary key",
                mapper.name(),
                "eq",
            )
            .into()),
        }
    }

    fn visit_comparison(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        deferred: &Deferred,
    ) -> Result<SqlSegment> {
        let lhs = self.visit(lhs, &Deferred::none())?;
        let lhs = self.entity_key(lhs)?;
        let rhs = self.visit(rhs, &Deferred::none())?;
        let rhs = self.entity_key(rhs)?;
        let negated = deferred.negated();
        if let (Some(l), Some(r)) = (lhs.constant_value(), rhs.constant_value()) {
            let value = eval_binary(op, l, r)?;
            let value = if negated {
                eval_unary(UnaryOp::Not, &value)?
            } else {
                value
            };
            return Ok(SqlSegment::constant(value));
        }
        let op = if negated {
            op.negated().unwrap_or(op)
        } else {
            op
        };
        let null_check = |v: &SqlSegment| v.constant_value().is_some_and(Value::is_null);
        if matches!(op, BinaryOp::Equal | BinaryOp::NotEqual)
            && (null_check(&lhs) || null_check(&rhs))
        {
            let operand = if null_check(&lhs) { &rhs } else { &lhs };
            let text = self.render_operand(operand, op.precedence() + 1)?;
            let text = format!(
                "{} {}",
                text,
                if op == BinaryOp::Equal {
                    "IS NULL"
                } else {
                    "IS NOT NULL"
                }
            );
            return Ok(SqlSegment::sql(
                SegmentKind::Comparison,
                text,
                TypeKey::Bool,
                op.precedence(),
            )
            .merge(operand));
        }
        let lhs = self.coerce_segment(lhs, &rhs)?;
        let rhs = self.coerce_segment(rhs, &lhs)?;
        let l = self.render_operand(&lhs, op.precedence() + 1)?;
        let r = self.render_operand(&rhs, op.precedence() + 1)?;
        let mut out = String::new();
        self.writer.write_binary(&self.context, &mut out, op, &l, &r)?;
        Ok(
            SqlSegment::sql(SegmentKind::Comparison, out, TypeKey::Bool, op.precedence())
                .merge(&lhs)
                .merge(&rhs),
        )
    }

    /// Coerce `segment` when it is a constant and `other` is a column.
    pub fn coerce_segment(&self, segment: SqlSegment, other: &SqlSegment) -> Result<SqlSegment> {
        match segment.constant_value() {
            Some(v) if other.kind == SegmentKind::Field => {
                Ok(SqlSegment::constant(self.coerce(v.clone(), other)?))
            }
            _ => Ok(segment),
        }
    }

    fn visit_member(&mut self, target: &Expr, name: &Cow<'static, str>) -> Result<SqlSegment> {
        let receiver = self.visit(target, &Deferred::none())?;
        if receiver.kind == SegmentKind::Entity {
            return self.entity_member(receiver, name);
        }
        if let Some(value) = receiver.constant_value()
            && let Some(result) = eval_member(name, value)
        {
            return Ok(SqlSegment::constant(result.with_context(|| {
                format!("While evaluating `{}.{}`", value.type_name(), name)
            })?));
        }
        let info = MemberInfo {
            declaring: receiver.value_type,
            name: name.clone(),
            is_static: false,
        };
        match self.writer.formatters().try_get_member_access_formatter(&info) {
            Some(entry) => self.apply(
                entry,
                FormatCall {
                    name: name.clone(),
                    receiver: Some(receiver),
                    args: Vec::new(),
                    deferred: Deferred::none(),
                },
            ),
            None => Err(QuillError::unsupported(
                format!("no formatter for member `{}` in {}", name, self.writer.name()),
                receiver.value_type,
                name.as_ref(),
            )
            .into()),
        }
    }

    fn entity_member(&mut self, receiver: SqlSegment, name: &str) -> Result<SqlSegment> {
        let table = receiver.table.unwrap_or_default();
        let mapper = self.graph.tables[table].mapper;
        let Some((member, declared)) = mapper.member(name) else {
            return Err(QuillError::unsupported("unknown member", mapper.name(), name).into());
        };
        if declared.is_column() {
            return Ok(self.column(table, member));
        }
        match self.graph.included(table, member) {
            Some(included) => {
                self.graph.tables[included].used.set(true);
                Ok(SqlSegment::entity(included))
            }
            None => Err(QuillError::unsupported(
                "the navigation is not included in the query",
                mapper.name(),
                name,
            )
            .into()),
        }
    }

    fn visit_call(
        &mut self,
        target: &Expr,
        name: &Cow<'static, str>,
        args: &[Expr],
        deferred: &Deferred,
    ) -> Result<SqlSegment> {
        let receiver = self.visit(target, &Deferred::none())?;
        if receiver.kind == SegmentKind::Entity && args.is_empty() {
            return Ok(self.entity_member(receiver, name)?.defer(deferred));
        }
        let args = args
            .iter()
            .map(|v| self.visit(v, &Deferred::none()))
            .collect::<Result<Vec<_>>>()?;
        if let Some(value) = receiver.constant_value()
            && let Some(values) = args
                .iter()
                .map(|v| v.constant_value().cloned())
                .collect::<Option<Vec<_>>>()
            && let Some(result) = eval_call(name, value, &values)
        {
            let result = result
                .with_context(|| format!("While evaluating `{}.{}`", value.type_name(), name))?;
            return Ok(SqlSegment::constant(result).defer(deferred));
        }
        let info = MethodInfo {
            declaring: receiver.value_type,
            name: name.clone(),
            is_static: false,
            params: args.iter().map(|v| v.value_type).collect(),
        };
        match self.writer.formatters().try_get_method_call_formatter(&info) {
            Some(entry) => self.apply(
                entry,
                FormatCall {
                    name: name.clone(),
                    receiver: Some(receiver),
                    args,
                    deferred: deferred.clone(),
                },
            ),
            None => Err(QuillError::unsupported(
                format!("no formatter for method `{}` in {}", name, self.writer.name()),
                info.declaring,
                name.as_ref(),
            )
            .into()),
        }
    }

    fn visit_static(
        &mut self,
        declaring: TypeKey,
        name: &Cow<'static, str>,
        args: &[Expr],
        deferred: &Deferred,
    ) -> Result<SqlSegment> {
        let args = args
            .iter()
            .map(|v| self.visit(v, &Deferred::none()))
            .collect::<Result<Vec<_>>>()?;
        if let Some(values) = args
            .iter()
            .map(|v| v.constant_value().cloned())
            .collect::<Option<Vec<_>>>()
            && let Some(result) = eval_static(declaring, name, &values)
        {
            let result = result.with_context(|| format!("While evaluating `{}::{}`", declaring, name))?;
            return Ok(SqlSegment::constant(result).defer(deferred));
        }
        let info = MethodInfo {
            declaring,
            name: name.clone(),
            is_static: true,
            params: args.iter().map(|v| v.value_type).collect(),
        };
        match self.writer.formatters().try_get_method_call_formatter(&info) {
            Some(entry) => self.apply(
                entry,
                FormatCall {
                    name: name.clone(),
                    receiver: None,
                    args,
                    deferred: deferred.clone(),
                },
            ),
            None => Err(QuillError::unsupported(
                format!("no formatter for `{}::{}` in {}", declaring, name, self.writer.name()),
                declaring,
                name.as_ref(),
            )
            .into()),
        }
    }

    fn apply(&mut self, entry: &FormatterEntry, mut call: FormatCall) -> Result<SqlSegment> {
        let deferred = std::mem::take(&mut call.deferred);
        if entry.negatable {
            call.deferred = deferred;
            (entry.format)(self, call)
        } else {
            Ok((entry.format)(self, call)?.defer(&deferred))
        }
    }

    fn visit_negate(&mut self, operand: &Expr) -> Result<SqlSegment> {
        let segment = self.visit(operand, &Deferred::none())?;
        if let Some(value) = segment.constant_value() {
            return Ok(SqlSegment::constant(eval_unary(UnaryOp::Negate, value)?));
        }
        let text = self.render_operand(&segment, ATOMIC)?;
        Ok(segment.change(SegmentKind::Arithmetic, format!("-{}", text), 80))
    }

    fn visit_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<SqlSegment> {
        let lhs = self.visit(lhs, &Deferred::none())?;
        let rhs = self.visit(rhs, &Deferred::none())?;
        if let (Some(l), Some(r)) = (lhs.constant_value(), rhs.constant_value()) {
            return Ok(SqlSegment::constant(eval_binary(op, l, r)?));
        }
        let (lt, rt) = (lhs.value_type, rhs.value_type);
        if op == BinaryOp::Coalesce {
            let rhs = self.coerce_segment(rhs, &lhs)?;
            let l = self.render(&lhs)?;
            let r = self.render(&rhs)?;
            let mut out = String::new();
            self.writer.write_binary(&self.context, &mut out, op, &l, &r)?;
            let value_type = if lt == TypeKey::Null { rt } else { lt };
            return Ok(SqlSegment::sql(SegmentKind::Coalesce, out, value_type, ATOMIC)
                .merge(&lhs)
                .merge(&rhs));
        }
        if op == BinaryOp::Add && (lt.is_textual() || rt.is_textual()) {
            let precedence = op.precedence();
            let parts = [
                self.render_operand(&lhs, precedence)?,
                self.render_operand(&rhs, precedence + 1)?,
            ];
            let mut out = String::new();
            self.writer.write_concat(&self.context, &mut out, &parts);
            return Ok(SqlSegment::sql(SegmentKind::Concat, out, TypeKey::Str, precedence)
                .merge(&lhs)
                .merge(&rhs));
        }
        if lt.is_temporal() && rt == TypeKey::Interval {
            if !matches!(op, BinaryOp::Add | BinaryOp::Subtract) {
                return Err(QuillError::unsupported(
                    format!("operator {:?} between a date and an interval", op),
                    lt,
                    "interval",
                )
                .into());
            }
            let date = self.render_operand(&lhs, ATOMIC)?;
            let interval = self.render(&rhs)?;
            let mut out = String::new();
            self.writer.write_date_add(
                &self.context,
                &mut out,
                &date,
                lt,
                &interval,
                op == BinaryOp::Subtract,
            );
            return Ok(SqlSegment::sql(SegmentKind::Call, out, lt, BinaryOp::Add.precedence())
                .merge(&lhs)
                .merge(&rhs));
        }
        if lt == TypeKey::Interval || rt == TypeKey::Interval {
            if !matches!(op, BinaryOp::Add | BinaryOp::Subtract)
                || !(lt == rt || lt == TypeKey::Null || rt == TypeKey::Null)
            {
                return Err(QuillError::unsupported(
                    format!("operator {:?} on intervals", op),
                    TypeKey::Interval,
                    "arithmetic",
                )
                .into());
            }
        } else if lt.is_temporal() || rt.is_temporal() {
            return Err(QuillError::unsupported(
                format!("operator {:?} between {} and {}", op, lt, rt),
                lt,
                "arithmetic",
            )
            .into());
        }
        let precedence = op.precedence();
        let l = self.render_operand(&lhs, precedence)?;
        let r = self.render_operand(&rhs, precedence + 1)?;
        let mut out = String::new();
        self.writer.write_binary(&self.context, &mut out, op, &l, &r)?;
        let value_type = match (lt, rt) {
            (TypeKey::Decimal, _) | (_, TypeKey::Decimal) => TypeKey::Decimal,
            (TypeKey::Float, _) | (_, TypeKey::Float) => TypeKey::Float,
            (TypeKey::Null, v) => v,
            (v, _) => v,
        };
        Ok(SqlSegment::sql(SegmentKind::Arithmetic, out, value_type, precedence)
            .merge(&lhs)
            .merge(&rhs))
    }

    fn visit_conditional(
        &mut self,
        test: &Expr,
        then: &Expr,
        otherwise: &Expr,
        deferred: &Deferred,
    ) -> Result<SqlSegment> {
        let test = self.visit_predicate(test, &Deferred::none())?;
        if let Some(v) = test.constant_bool() {
            return self.visit(if v { then } else { otherwise }, deferred);
        }
        let then = self.visit(then, &Deferred::none())?;
        let otherwise = self.visit(otherwise, &Deferred::none())?;
        let t = self.render(&test)?;
        let a = self.render(&then)?;
        let b = self.render(&otherwise)?;
        let value_type = if then.value_type == TypeKey::Null {
            otherwise.value_type
        } else {
            then.value_type
        };
        Ok(SqlSegment::sql(
            SegmentKind::Conditional,
            format!("CASE WHEN {} THEN {} ELSE {} END", t, a, b),
            value_type,
            ATOMIC,
        )
        .merge(&test)
        .merge(&then)
        .merge(&otherwise)
        .defer(deferred))
    }

    fn visit_convert(&mut self, operand: &Expr, to: &Value) -> Result<SqlSegment> {
        let segment = self.visit(operand, &Deferred::none())?;
        if let Some(value) = segment.constant_value() {
            return Ok(SqlSegment::constant(eval_convert(value, to)?));
        }
        let text = self.render(&segment)?;
        let mut out = String::new();
        self.writer.write_cast(&self.context, &mut out, &text, to);
        Ok(segment.change(SegmentKind::Convert, out, ATOMIC).typed(to.type_key()))
    }

    fn visit_list(&mut self, items: &[Expr]) -> Result<SqlSegment> {
        let items = items
            .iter()
            .map(|v| self.visit(v, &Deferred::none()))
            .collect::<Result<Vec<_>>>()?;
        if let Some(values) = items
            .iter()
            .map(|v| v.constant_value().cloned())
            .collect::<Option<Vec<_>>>()
        {
            let prototype = values.first().map(Value::as_null).unwrap_or_default();
            return Ok(SqlSegment::constant(Value::List(
                Some(values),
                Box::new(prototype),
            )));
        }
        let rendered = items
            .iter()
            .map(|v| self.render(v))
            .collect::<Result<Vec<_>>>()?;
        Ok(
            SqlSegment::sql(SegmentKind::List, rendered.join(", "), TypeKey::List, ATOMIC)
                .merge_all(&items),
        )
    }
}
