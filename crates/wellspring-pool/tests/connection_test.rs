//! Tests for the wellspring-pool connection module

use wellspring_pool::prelude::*;

#[test]
fn conn_params_carry_all_fields() {
    let params = ConnParams::new("db.internal", "web", "secret", "app").with_port(3307);

    assert_eq!(params.host, "db.internal");
    assert_eq!(params.user, "web");
    assert_eq!(params.password, "secret");
    assert_eq!(params.database, "app");
    assert_eq!(params.port, 3307);
}

#[test]
fn conn_params_default_to_mysql_port() {
    let params = ConnParams::new("localhost", "web", "secret", "app");
    assert_eq!(params.port, 3306);
}

#[test]
fn conn_params_debug_never_prints_credential() {
    let params = ConnParams::new("localhost", "web", "s3cr3t-credential", "app");
    let rendered = format!("{:?}", params);

    assert!(!rendered.contains("s3cr3t-credential"));
    assert!(rendered.contains("***"));
}

#[test]
fn conn_params_deserialize_with_default_port() {
    let params: ConnParams = serde_json::from_str(
        r#"{"host":"localhost","user":"web","password":"secret","database":"app"}"#,
    )
    .expect("deserializes");

    assert_eq!(params.port, 3306);
    assert_eq!(params.database, "app");
}

#[test]
fn conn_params_serde_round_trip() {
    let params = ConnParams::new("localhost", "web", "secret", "app").with_port(3310);

    let json = serde_json::to_string(&params).expect("serializes");
    let back: ConnParams = serde_json::from_str(&json).expect("deserializes");

    assert_eq!(back.host, params.host);
    assert_eq!(back.port, 3310);
}
