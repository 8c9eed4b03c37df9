use super::*;

fn bind(value: &Value, ty: &Type) -> Result<(bool, Vec<u8>), String> {
    let mut out = BytesMut::new();
    value
        .to_sql(ty, &mut out)
        .map(|is_null| (matches!(is_null, IsNull::Yes), out.to_vec()))
        .map_err(|e| e.to_string())
}

#[test]
fn null_binds_as_sql_null() {
    let (is_null, bytes) = bind(&Value::Null, &Type::INT4).unwrap();
    assert!(is_null);
    assert!(bytes.is_empty());
}

#[test]
fn int_narrows_to_int4() {
    let (_, bytes) = bind(&Value::Int(5), &Type::INT4).unwrap();
    assert_eq!(bytes, 5i32.to_be_bytes());
}

#[test]
fn int_out_of_range_for_int2_is_rejected() {
    assert!(bind(&Value::Int(100_000), &Type::INT2).is_err());
}

#[test]
fn text_parses_into_integer_columns() {
    let (_, bytes) = bind(&Value::from("42"), &Type::INT8).unwrap();
    assert_eq!(bytes, 42i64.to_be_bytes());
}

#[test]
fn non_numeric_text_into_integer_column_fails() {
    assert!(bind(&Value::from("abc"), &Type::INT4).is_err());
}

#[test]
fn integral_float_binds_to_integer_column() {
    let (_, bytes) = bind(&Value::Float(7.0), &Type::INT4).unwrap();
    assert_eq!(bytes, 7i32.to_be_bytes());
    assert!(bind(&Value::Float(7.5), &Type::INT4).is_err());
}

#[test]
fn integral_float_outside_i64_range_is_rejected() {
    let huge = Value::from(serde_json::json!(1e19));
    assert!(bind(&huge, &Type::INT8).is_err());
    assert!(bind(&Value::Float(-1e19), &Type::INT8).is_err());
    assert!(bind(&Value::Float(9_223_372_036_854_775_808.0), &Type::INT8).is_err());

    let (_, bytes) = bind(&Value::Float(-9_223_372_036_854_775_808.0), &Type::INT8).unwrap();
    assert_eq!(bytes, i64::MIN.to_be_bytes());
    assert!(bind(&Value::Float(f64::INFINITY), &Type::INT8).is_err());
}

#[test]
fn out_of_range_float_still_binds_as_text() {
    let (_, bytes) = bind(&Value::Float(1e19), &Type::TEXT).unwrap();
    assert_eq!(bytes, b"10000000000000000000");
}

#[test]
fn text_binds_to_bool_column() {
    let (_, bytes) = bind(&Value::from("true"), &Type::BOOL).unwrap();
    assert_eq!(bytes, vec![1]);
    assert!(bind(&Value::from("maybe"), &Type::BOOL).is_err());
}

#[test]
fn bool_into_int_column_is_a_mismatch() {
    let err = bind(&Value::Bool(true), &Type::INT4).unwrap_err();
    assert!(err.contains("cannot bind"));
}

#[test]
fn numeric_coercion_rules() {
    assert_eq!(Value::Int(3).to_numeric(), Some(Numeric::Int(3)));
    assert_eq!(Value::from(" 12 ").to_numeric(), Some(Numeric::Int(12)));
    assert_eq!(Value::from("1.5").to_numeric(), Some(Numeric::Float(1.5)));
    assert_eq!(Value::from("").to_numeric(), None);
    assert_eq!(Value::from("ten").to_numeric(), None);
    assert_eq!(Value::Null.to_numeric(), None);
    assert_eq!(Value::Bool(true).to_numeric(), None);
    assert_eq!(Value::Float(f64::NAN).to_numeric(), None);
}

#[test]
fn json_scalars_map_to_variants() {
    let v: Value = serde_json::from_str("5").unwrap();
    assert_eq!(v, Value::Int(5));
    let v: Value = serde_json::from_str("\"x\"").unwrap();
    assert_eq!(v, Value::Text("x".into()));
    let v: Value = serde_json::from_str("null").unwrap();
    assert_eq!(v, Value::Null);
    let v: Value = serde_json::from_str("{\"a\":1}").unwrap();
    assert!(matches!(v, Value::Json(_)));
}

#[test]
fn serializes_to_plain_json() {
    let ts = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let out = serde_json::to_string(&vec![
        Value::Int(1),
        Value::from("a"),
        Value::Null,
        Value::Timestamp(ts),
    ])
    .unwrap();
    assert_eq!(out, r#"[1,"a",null,"2024-05-01T10:00:00+00:00"]"#);
}

#[test]
fn option_conversion() {
    assert_eq!(Value::from(None::<i32>), Value::Null);
    assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
}
