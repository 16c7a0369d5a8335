use clocksy::protocol::messages::{from_json, to_json, Request, Response};
use clocksy::EstimatorConfig;
use serde_json::json;
use std::time::Duration;

#[test]
fn test_request_serialization() {
    let req = Request::new(1000.0).with_field("room", "lobby");
    let json = to_json(&req).unwrap();

    assert!(json.contains("\"tTx\":1000.0"));
    assert!(json.contains("\"room\":\"lobby\""));
}

#[test]
fn test_response_deserialization() {
    let json = r#"{
        "tTx": 1000,
        "tServer": 1050.5,
        "seq": 7
    }"#;

    let rsp: Response = from_json(json).unwrap();

    assert_eq!(rsp.t_tx(), 1000.0);
    assert_eq!(rsp.t_server, 1050.5);
    assert_eq!(rsp.request.extra["seq"], json!(7));
    assert!(!rsp.request.extra.contains_key("tTx"));
}

#[test]
fn test_response_missing_server_time_rejected() {
    let result: clocksy::Result<Response> = from_json(r#"{ "tTx": 1000 }"#);
    assert!(matches!(result, Err(clocksy::error::Error::Protocol(_))));
}

#[test]
fn test_config_from_json() {
    let config: EstimatorConfig = from_json(r#"{ "alpha": 0.5, "updatePeriod": 2500 }"#).unwrap();
    assert_eq!(config.alpha, 0.5);
    assert_eq!(config.update_period, Duration::from_millis(2500));

    let partial: EstimatorConfig = from_json(r#"{ "alpha": 0.5 }"#).unwrap();
    assert_eq!(partial.update_period, Duration::from_secs(10));

    let json = to_json(&EstimatorConfig::default()).unwrap();
    assert!(json.contains("\"updatePeriod\":10000"));
}
