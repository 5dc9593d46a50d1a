#[cfg(test)]
mod tests {
    use quill_core::{
        AsValue, BinaryOp, Entity, EntityMapper, EntityParts, Expr, GenericSqlWriter, Lambda,
        LambdaParam, MemberMapper, MySqlSqlWriter, OracleSqlWriter, PostgresSqlWriter,
        QueryBuilder, Result, SqlServerSqlWriter, SqlWriter, SqliteSqlWriter, TypeKey, Value,
    };
    use std::sync::LazyLock;
    use time::{Duration, PrimitiveDateTime, macros::datetime};

    #[derive(Debug, Clone, PartialEq)]
    struct Event {
        id: i32,
        at: PrimitiveDateTime,
        name: String,
    }

    impl Entity for Event {
        fn mapper() -> &'static EntityMapper {
            static MAPPER: LazyLock<EntityMapper> = LazyLock::new(|| {
                EntityMapper::new::<Event>(
                    "events",
                    "",
                    "",
                    vec![
                        MemberMapper::column::<i32>("id").primary_key(),
                        MemberMapper::column::<PrimitiveDateTime>("at"),
                        MemberMapper::column::<String>("name"),
                    ],
                )
            });
            &MAPPER
        }

        fn assemble(parts: &mut EntityParts) -> Result<Self> {
            Ok(Self {
                id: parts.take(0)?,
                at: parts.take(1)?,
                name: parts.take(2)?,
            })
        }

        fn values(&self) -> Vec<Value> {
            vec![
                self.id.as_value(),
                self.at.as_value(),
                self.name.clone().as_value(),
            ]
        }
    }

    fn writers() -> Vec<Box<dyn SqlWriter>> {
        vec![
            Box::new(GenericSqlWriter::new()),
            Box::new(SqliteSqlWriter::new()),
            Box::new(PostgresSqlWriter::new()),
            Box::new(MySqlSqlWriter::new()),
            Box::new(SqlServerSqlWriter::new()),
            Box::new(OracleSqlWriter::new()),
        ]
    }

    fn member(name: &'static str) -> Expr {
        Expr::param(0).member(name)
    }

    fn days(amount: i32) -> Expr {
        Expr::static_call(TypeKey::Interval, "days", vec![Expr::constant(amount)])
    }

    /// Filter of `Event` compiled by every dialect, keyed by dialect name.
    fn filters(body: Expr) -> Vec<(&'static str, String, Vec<Value>)> {
        let query = Event::query().filter(Lambda::new(vec![LambdaParam::of::<Event>("e")], body));
        writers()
            .iter()
            .map(|writer| {
                let compiled = query
                    .compile(writer.as_dyn())
                    .expect("The query should compile");
                let filter = compiled
                    .sql
                    .split_once("\nWHERE ")
                    .map(|(_, v)| v.trim_end_matches(';').to_string())
                    .unwrap_or_default();
                let params = compiled.params.into_iter().map(|v| v.value).collect();
                (writer.name(), filter, params)
            })
            .collect()
    }

    #[test]
    fn date_plus_interval() {
        let at = datetime!(2024-01-02 10:00:00);
        let compiled = filters(Expr::binary(
            BinaryOp::Greater,
            Expr::binary(BinaryOp::Add, member("at"), days(1)),
            Expr::constant(at),
        ));
        let expected = [
            (
                "generic",
                r#"a."at" + (@p0) * INTERVAL '1' MICROSECOND > @p1"#,
            ),
            (
                "sqlite",
                r#"RTRIM(RTRIM(strftime('%Y-%m-%d %H:%M:%f', a."at", (((@p0) / 1000000.0) || ' seconds')), '0'), '.') > @p1"#,
            ),
            ("postgres", r#"a."at" + (@p0) > @p1"#),
            (
                "mysql",
                "DATE_ADD(a.`at`, INTERVAL (@p0) MICROSECOND) > @p1",
            ),
            (
                "sqlserver",
                r#"DATEADD(SECOND, (@p0) / 1000000, DATEADD(MICROSECOND, (@p0) % 1000000, a."at")) > @p1"#,
            ),
            (
                "oracle",
                r#"a."at" + NUMTODSINTERVAL((:p0) / 1000000, 'SECOND') > :p1"#,
            ),
        ];
        assert_eq!(compiled.len(), expected.len());
        for ((dialect, filter, params), (name, sql)) in compiled.into_iter().zip(expected) {
            assert_eq!(dialect, name);
            assert_eq!(filter, sql, "{}", dialect);
            assert_eq!(
                params,
                [
                    Value::Interval(Some(Duration::days(1))),
                    Value::Timestamp(Some(at))
                ],
                "{}",
                dialect
            );
        }
    }

    #[test]
    fn subtracting_a_folded_interval() {
        let hour_and_half = Expr::binary(
            BinaryOp::Add,
            Expr::static_call(TypeKey::Interval, "hours", vec![Expr::constant(1)]),
            Expr::static_call(TypeKey::Interval, "minutes", vec![Expr::constant(30)]),
        );
        let compiled = filters(Expr::binary(
            BinaryOp::LessEqual,
            Expr::binary(BinaryOp::Subtract, member("at"), hour_and_half),
            Expr::constant(datetime!(2024-01-01 00:00:00)),
        ));
        let (_, filter, params) = &compiled[2];
        assert_eq!(filter, r#"a."at" - (@p0) <= @p1"#);
        assert_eq!(params[0], Value::Interval(Some(Duration::minutes(90))));
        let (_, filter, _) = &compiled[3];
        assert_eq!(filter, "DATE_SUB(a.`at`, INTERVAL (@p0) MICROSECOND) <= @p1");
    }

    #[test]
    fn constant_dates_fold() {
        let compiled = filters(Expr::binary(
            BinaryOp::Equal,
            member("at"),
            Expr::binary(
                BinaryOp::Subtract,
                Expr::constant(datetime!(2024-03-01 08:30:00)),
                days(1),
            ),
        ));
        for (dialect, filter, params) in compiled {
            let expected = match dialect {
                "mysql" => "a.`at` = @p0",
                "oracle" => r#"a."at" = :p0"#,
                _ => r#"a."at" = @p0"#,
            };
            assert_eq!(filter, expected, "{}", dialect);
            assert_eq!(
                params,
                [Value::Timestamp(Some(datetime!(2024-02-29 08:30:00)))],
                "{}",
                dialect
            );
        }
    }

    #[test]
    fn now_per_dialect() {
        let compiled = filters(Expr::binary(
            BinaryOp::Less,
            member("at"),
            Expr::static_member(TypeKey::DateTime, "now"),
        ));
        let expected = [
            r#"a."at" < CURRENT_TIMESTAMP"#,
            r#"a."at" < RTRIM(RTRIM(strftime('%Y-%m-%d %H:%M:%f', 'now', 'localtime'), '0'), '.')"#,
            r#"a."at" < LOCALTIMESTAMP"#,
            "a.`at` < NOW()",
            r#"a."at" < GETDATE()"#,
            r#"a."at" < LOCALTIMESTAMP"#,
        ];
        for ((dialect, filter, params), sql) in compiled.into_iter().zip(expected) {
            assert_eq!(filter, sql, "{}", dialect);
            assert!(params.is_empty(), "{}", dialect);
        }
    }

    #[test]
    fn format_mixes_fields_and_constants() {
        let compiled = filters(Expr::binary(
            BinaryOp::Equal,
            Expr::static_call(
                TypeKey::Str,
                "format",
                vec![
                    Expr::constant("{} ({})"),
                    member("name"),
                    Expr::constant("vip"),
                ],
            ),
            Expr::constant("Bob (vip)"),
        ));
        let expected = [
            r#"a."name" || ' (' || @p0 || ')' = @p1"#,
            r#"a."name" || ' (' || @p0 || ')' = @p1"#,
            r#"a."name" || ' (' || @p0 || ')' = @p1"#,
            "CONCAT(a.`name`, ' (', @p0, ')') = @p1",
            r#"a."name" + ' (' + @p0 + ')' = @p1"#,
            r#"a."name" || ' (' || :p0 || ')' = :p1"#,
        ];
        for ((dialect, filter, params), sql) in compiled.into_iter().zip(expected) {
            assert_eq!(filter, sql, "{}", dialect);
            assert_eq!(
                params,
                [
                    Value::Varchar(Some("vip".into())),
                    Value::Varchar(Some("Bob (vip)".into()))
                ],
                "{}",
                dialect
            );
        }

        // Every argument constant, evaluated on the host
        let compiled = filters(Expr::binary(
            BinaryOp::Equal,
            member("name"),
            Expr::static_call(
                TypeKey::Str,
                "concat",
                vec![Expr::constant("event-"), Expr::constant(7)],
            ),
        ));
        let (_, filter, params) = &compiled[0];
        assert_eq!(filter, r#"a."name" = @p0"#);
        assert_eq!(params, &[Value::Varchar(Some("event-7".into()))]);
    }

    #[test]
    fn concat_with_a_field() {
        let compiled = filters(Expr::binary(
            BinaryOp::NotEqual,
            Expr::static_call(
                TypeKey::Str,
                "concat",
                vec![Expr::constant("#"), member("name")],
            ),
            Expr::constant("#"),
        ));
        let (_, filter, _) = &compiled[0];
        assert_eq!(filter, r#"@p0 || a."name" <> @p1"#);
        let (_, filter, _) = &compiled[3];
        assert_eq!(filter, "CONCAT(@p0, a.`name`) <> @p1");
        let (_, filter, _) = &compiled[4];
        assert_eq!(filter, r#"@p0 + a."name" <> @p1"#);
    }

    #[test]
    fn static_sequence_contains() {
        let ids = Expr::constant(Value::List(
            Some(vec![Value::Int64(Some(1)), Value::Int64(Some(2))]),
            Box::new(Value::Int64(None)),
        ));
        let compiled = filters(Expr::static_call(
            TypeKey::Seq,
            "contains",
            vec![ids.clone(), member("id")],
        ));
        let (_, filter, params) = &compiled[0];
        assert_eq!(filter, r#"a."id" IN (@p0, @p1)"#);
        // Converted to the column type
        assert_eq!(params, &[Value::Int32(Some(1)), Value::Int32(Some(2))]);
        let (_, filter, params) = &compiled[2];
        assert_eq!(filter, r#"a."id" = ANY(@p0)"#);
        assert_eq!(params.len(), 1);

        let compiled = filters(
            Expr::static_call(TypeKey::Seq, "contains", vec![ids.clone(), member("id")]).not(),
        );
        let (_, filter, _) = &compiled[0];
        assert_eq!(filter, r#"a."id" NOT IN (@p0, @p1)"#);

        // Constant membership folds, the filter disappears
        let query = Event::query().filter(Lambda::new(
            vec![LambdaParam::of::<Event>("e")],
            Expr::static_call(TypeKey::Seq, "contains", vec![ids, Expr::constant(2i64)]),
        ));
        let compiled = query
            .compile(&GenericSqlWriter::new())
            .expect("The query should compile");
        assert!(!compiled.sql.contains("WHERE"), "{}", compiled.sql);
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn compiling_twice_is_stable() {
        let query: QueryBuilder<Event> = Event::query()
            .filter(Lambda::new(
                vec![LambdaParam::of::<Event>("e")],
                Expr::binary(
                    BinaryOp::Greater,
                    Expr::binary(BinaryOp::Add, member("at"), days(2)),
                    Expr::constant(datetime!(2024-01-01 00:00:00)),
                )
                .and(
                    member("name")
                        .call("starts_with", vec![Expr::constant("a")])
                        .not(),
                ),
            ))
            .order_by(Lambda::new(vec![LambdaParam::of::<Event>("e")], member("at")))
            .page(2, 10);
        for writer in writers() {
            let first = query
                .compile(writer.as_dyn())
                .expect("The query should compile");
            let second = query
                .compile(writer.as_dyn())
                .expect("The query should compile");
            assert_eq!(first.sql, second.sql, "{}", writer.name());
            assert_eq!(first.params, second.params, "{}", writer.name());
            assert_eq!(first.params.len(), 3, "{}", writer.name());
        }
    }
}
