#[cfg(test)]
mod tests {
    use quill_core::{AsValue, QuillError, TypeKey, Value, convert, write_temporal};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::{Duration, macros::datetime};
    use uuid::Uuid;

    fn conversion_fails(value: Value, target: Value) {
        let error = convert(value, &target).expect_err("The conversion should fail");
        assert!(
            matches!(
                error.downcast_ref::<QuillError>(),
                Some(QuillError::Conversion { .. })
            ),
            "Unexpected error: {:#}",
            error
        );
    }

    #[test]
    fn integers() {
        assert_eq!(
            convert(Value::Int64(Some(42)), &Value::Int32(None)).unwrap(),
            Value::Int32(Some(42))
        );
        assert_eq!(
            convert(Value::Varchar(Some(" 17 ".into())), &Value::UInt8(None)).unwrap(),
            Value::UInt8(Some(17))
        );
        assert_eq!(
            convert(Value::Float64(Some(3.0)), &Value::Int16(None)).unwrap(),
            Value::Int16(Some(3))
        );
        assert_eq!(
            convert(Value::Decimal(Some(Decimal::new(1200, 2))), &Value::Int64(None)).unwrap(),
            Value::Int64(Some(12))
        );
        conversion_fails(Value::Int64(Some(300)), Value::Int8(None));
        conversion_fails(Value::Int32(Some(-1)), Value::UInt32(None));
        conversion_fails(Value::Float64(Some(2.5)), Value::Int32(None));
        conversion_fails(Value::Varchar(Some("many".into())), Value::Int32(None));
    }

    #[test]
    fn null_takes_the_target_type() {
        assert_eq!(
            convert(Value::Null, &Value::Decimal(None)).unwrap(),
            Value::Decimal(None)
        );
        assert_eq!(
            convert(Value::Varchar(None), &Value::Int32(None)).unwrap(),
            Value::Int32(None)
        );
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert!(i32::try_from_value(Value::Null).is_err());
    }

    #[test]
    fn decimals_and_floats() {
        assert_eq!(
            convert(Value::Varchar(Some("12.50".into())), &Value::Decimal(None)).unwrap(),
            Value::Decimal(Some(Decimal::from_str("12.50").unwrap()))
        );
        assert_eq!(
            convert(Value::Int32(Some(10)), &Value::Decimal(None)).unwrap(),
            Value::Decimal(Some(Decimal::from(10)))
        );
        assert_eq!(
            convert(Value::Decimal(Some(Decimal::new(25, 1))), &Value::Float64(None)).unwrap(),
            Value::Float64(Some(2.5))
        );
        assert_eq!(
            Decimal::try_from_value(Value::Float64(Some(150.5))).unwrap(),
            Decimal::new(1505, 1)
        );
    }

    #[test]
    fn text() {
        let uuid = Uuid::from_str("6f1ae1a4-8ba1-4a8e-9d8c-2b1f3c0c7e11").unwrap();
        assert_eq!(
            convert(
                Value::Varchar(Some("6F1AE1A4-8BA1-4A8E-9D8C-2B1F3C0C7E11".into())),
                &Value::Uuid(None)
            )
            .unwrap(),
            Value::Uuid(Some(uuid))
        );
        assert_eq!(
            convert(Value::Uuid(Some(uuid)), &Value::Varchar(None)).unwrap(),
            Value::Varchar(Some("6f1ae1a4-8ba1-4a8e-9d8c-2b1f3c0c7e11".into()))
        );
        assert_eq!(
            convert(Value::Varchar(Some("x".into())), &Value::Char(None)).unwrap(),
            Value::Char(Some('x'))
        );
        conversion_fails(Value::Varchar(Some("xy".into())), Value::Char(None));
        assert_eq!(
            convert(Value::Varchar(Some("T".into())), &Value::Boolean(None)).unwrap(),
            Value::Boolean(Some(true))
        );
        conversion_fails(Value::Varchar(Some("maybe".into())), Value::Boolean(None));
    }

    #[test]
    fn temporals() {
        let timestamp = datetime!(2025-03-01 10:30:15.25);
        assert_eq!(
            convert(
                Value::Varchar(Some("2025-03-01 10:30:15.25".into())),
                &Value::Timestamp(None)
            )
            .unwrap(),
            Value::Timestamp(Some(timestamp))
        );
        assert_eq!(
            convert(
                Value::Varchar(Some("2025-03-01T10:30:15.25".into())),
                &Value::Timestamp(None)
            )
            .unwrap(),
            Value::Timestamp(Some(timestamp))
        );
        assert_eq!(
            convert(Value::Timestamp(Some(timestamp)), &Value::Date(None)).unwrap(),
            Value::Date(Some(timestamp.date()))
        );
        let mut out = String::new();
        write_temporal(&mut out, &Value::Timestamp(Some(timestamp)));
        assert_eq!(out, "2025-03-01 10:30:15.25");
        let mut out = String::new();
        write_temporal(&mut out, &Value::TimestampWithTimezone(Some(datetime!(2024-12-31 23:59:00 -05:30))));
        assert_eq!(out, "2024-12-31 23:59:00-05:30");
    }

    #[test]
    fn intervals_are_microseconds() {
        assert_eq!(
            convert(Value::Int64(Some(1_500_000)), &Value::Interval(None)).unwrap(),
            Value::Interval(Some(Duration::milliseconds(1500)))
        );
        assert_eq!(
            convert(Value::Interval(Some(Duration::days(1))), &Value::Int64(None)).unwrap(),
            Value::Int64(Some(86_400_000_000))
        );
    }

    #[test]
    fn lists_convert_every_item() {
        let list = Value::List(
            Some(vec![Value::Int32(Some(1)), Value::Int32(Some(2))]),
            Box::new(Value::Int32(None)),
        );
        assert_eq!(
            convert(list, &Value::List(None, Box::new(Value::Int64(None)))).unwrap(),
            Value::List(
                Some(vec![Value::Int64(Some(1)), Value::Int64(Some(2))]),
                Box::new(Value::Int64(None))
            )
        );
    }

    #[test]
    fn temporal_namespaces() {
        assert_eq!(TypeKey::namespace("Time"), Some(TypeKey::Time));
        assert_eq!(TypeKey::namespace("Date"), Some(TypeKey::Date));
        assert_eq!(TypeKey::namespace("DateTime"), Some(TypeKey::DateTime));
        assert_eq!(TypeKey::namespace("Interval"), Some(TypeKey::Interval));
        assert_eq!(TypeKey::namespace("Clock"), None);
        assert_eq!(Value::Time(None).type_key(), TypeKey::Time);
    }
}
