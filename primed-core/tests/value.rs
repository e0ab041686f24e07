#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use primed_core::{AsValue, GenericSqlWriter, SqlWriter, Value};
    use time::macros::{date, datetime, time};
    use uuid::Uuid;

    const WRITER: GenericSqlWriter = GenericSqlWriter {};

    fn literal(value: impl Into<Value>) -> String {
        let mut out = String::new();
        WRITER.write_value(&mut Default::default(), &mut out, &value.into());
        out
    }

    #[test]
    fn value_null() {
        assert_eq!(Value::Null, Value::Null);
        assert_eq!(Value::Int32(None), Value::Int32(Some(3)).as_null());
        assert_ne!(Value::Float32(Some(1.0)), Value::Null);
        assert!(Value::Varchar(None).is_null());
        assert!(!Value::Varchar(Some("".into())).is_null());
        let val: Value = Option::<i64>::None.into();
        assert_eq!(val, Value::Int64(None));
        assert_eq!(Option::<i64>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i64>::try_from_value(Value::Int64(Some(5))).unwrap(),
            Some(5)
        );
    }

    #[test]
    fn value_integers() {
        let val: Value = (-32768i16).into();
        assert_eq!(val, Value::Int16(Some(-32768)));
        assert_ne!(val, Value::Int32(Some(-32768)));
        assert_eq!(i16::try_from_value(Value::Int32(Some(12))).unwrap(), 12);
        assert!(i16::try_from_value(Value::Int32(Some(70000))).is_err());
        assert_eq!(i32::try_from_value(Value::Int16(Some(-1))).unwrap(), -1);
        assert!(i32::try_from_value(Value::Int64(Some(i64::MAX))).is_err());
        assert_eq!(
            i32::try_from_value(Value::Decimal(Some(Decimal::new(4200, 2)))).unwrap(),
            42
        );
        assert!(i32::try_from_value(Value::Decimal(Some(Decimal::new(4250, 2)))).is_err());
        assert_eq!(i64::try_from_value(Value::Int32(Some(7))).unwrap(), 7);
        assert!(i64::try_from_value(Value::Varchar(Some("7".into()))).is_err());
    }

    #[test]
    fn value_decimal_and_floats() {
        let val: Value = Decimal::new(19255, 2).into();
        assert_eq!(val, Value::Decimal(Some(Decimal::new(19255, 2))));
        assert_eq!(
            Decimal::try_from_value(Value::Int64(Some(3))).unwrap(),
            Decimal::new(3, 0)
        );
        assert_eq!(
            f64::try_from_value(Value::Decimal(Some(Decimal::new(25, 1)))).unwrap(),
            2.5
        );
        assert_eq!(f64::try_from_value(Value::Float32(Some(0.5))).unwrap(), 0.5);
    }

    #[test]
    fn value_time() {
        let val: Value = datetime!(2025-06-07 16:35:00 +02:00).into();
        assert!(matches!(val, Value::TimestampWithTimezone(Some(..))));
        let naive = time::PrimitiveDateTime::try_from_value(val).unwrap();
        assert_eq!(naive, datetime!(2025-06-07 14:35:00));
        let aware =
            time::OffsetDateTime::try_from_value(Value::Timestamp(Some(naive))).unwrap();
        assert_eq!(aware, datetime!(2025-06-07 14:35:00 UTC));
    }

    #[test]
    fn value_list() {
        let val: Value = vec![1i64, 2, 3].into();
        assert_eq!(
            val.as_list(),
            Some(&[1i64, 2, 3].map(|v| Value::Int64(Some(v)))[..])
        );
        assert_ne!(val, Value::from(vec![1i32, 2, 3]));
        assert_eq!(Vec::<i64>::try_from_value(val).unwrap(), [1, 2, 3]);
        let empty: Value = Vec::<String>::new().into();
        assert_eq!(empty.as_list(), Some(&[] as &[Value]));
        assert_eq!(
            Vec::<String>::try_from_value(Value::List(None, Box::new(Value::Varchar(None))))
                .unwrap(),
            Vec::<String>::new()
        );
    }

    #[test]
    fn literals() {
        assert_eq!(literal(true), "true");
        assert_eq!(literal(-42i64), "-42");
        assert_eq!(literal(0.25f64), "0.25");
        assert_eq!(literal(f64::NAN), "'NaN'");
        assert_eq!(literal(f64::NEG_INFINITY), "'-Infinity'");
        assert_eq!(literal(Decimal::new(19255, 2)), "192.55");
        assert_eq!(literal("it's"), "'it''s'");
        assert_eq!(literal(Value::Varchar(None)), "NULL");
        assert_eq!(literal(Box::<[u8]>::from([0xde, 0xad])), "'\\xdead'");
        assert_eq!(literal(date!(2025-06-07)), "'2025-06-07'");
        assert_eq!(literal(time!(14:32:05)), "'14:32:05.0'");
        assert_eq!(
            literal(datetime!(2025-06-07 16:32:00 +02:00)),
            "'2025-06-07T14:32:00.0+00:00'"
        );
        assert_eq!(
            literal(Uuid::nil()),
            "'00000000-0000-0000-0000-000000000000'"
        );
        assert_eq!(literal(vec![1, 2]), "[1,2]");
    }
}
