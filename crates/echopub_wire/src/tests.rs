use super::envelope::*;
use serde_json::json;

#[test]
fn parse_subscribe_with_all_fields() {
    let text = json!({
        "type": "subscribe",
        "topic": "news",
        "client_id": "c1",
        "last_n": 5,
        "request_id": "r-1"
    })
    .to_string();

    match serde_json::from_str::<ClientEnvelope>(&text).unwrap() {
        ClientEnvelope::Subscribe {
            topic,
            client_id,
            last_n,
            request_id,
        } => {
            assert_eq!(topic, "news");
            assert_eq!(client_id, "c1");
            assert_eq!(last_n, Some(5));
            assert_eq!(request_id.as_deref(), Some("r-1"));
        }
        other => panic!("expected subscribe, got {other:?}"),
    }
}

#[test]
fn parse_subscribe_optional_fields_default_to_none() {
    let text = json!({"type": "subscribe", "topic": "news", "client_id": "c1"}).to_string();
    match serde_json::from_str::<ClientEnvelope>(&text).unwrap() {
        ClientEnvelope::Subscribe {
            last_n, request_id, ..
        } => {
            assert_eq!(last_n, None);
            assert_eq!(request_id, None);
        }
        other => panic!("expected subscribe, got {other:?}"),
    }
}

#[test]
fn parse_subscribe_without_client_id_fails() {
    let text = json!({"type": "subscribe", "topic": "news"}).to_string();
    assert!(serde_json::from_str::<ClientEnvelope>(&text).is_err());
}

#[test]
fn parse_publish_passes_payload_through() {
    let text = json!({
        "type": "publish",
        "topic": "sensors",
        "message": {"id": "m1", "payload": {"temp": 21.5, "tags": ["a", "b"]}}
    })
    .to_string();

    match serde_json::from_str::<ClientEnvelope>(&text).unwrap() {
        ClientEnvelope::Publish { message, .. } => {
            assert_eq!(message.id, "m1");
            assert_eq!(message.payload["temp"], 21.5);
            assert_eq!(message.payload["tags"][0], "a");
        }
        other => panic!("expected publish, got {other:?}"),
    }
}

#[test]
fn unknown_type_is_rejected() {
    let text = json!({"type": "bogus", "topic": "t"}).to_string();
    assert!(serde_json::from_str::<ClientEnvelope>(&text).is_err());
}

#[test]
fn ack_serializes_expected_shape() {
    let env = ServerEnvelope::ack("news", timestamp(), Some("r-9".to_string()));
    let value = serde_json::to_value(&env).unwrap();
    assert_eq!(value["type"], "ack");
    assert_eq!(value["topic"], "news");
    assert_eq!(value["status"], "ok");
    assert_eq!(value["request_id"], "r-9");
    assert!(value["ts"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn ack_omits_absent_request_id() {
    let env = ServerEnvelope::ack("news", timestamp(), None);
    let value = serde_json::to_value(&env).unwrap();
    assert!(value.get("request_id").is_none());
}

#[test]
fn error_codes_serialize_screaming_snake() {
    let env = ServerEnvelope::error(ErrorCode::TopicNotFound, "no such topic", None);
    let value = serde_json::to_value(&env).unwrap();
    assert_eq!(value["type"], "error");
    assert_eq!(value["error"]["code"], "TOPIC_NOT_FOUND");
    assert_eq!(value["error"]["message"], "no such topic");

    assert_eq!(
        serde_json::to_value(ErrorCode::BadRequest).unwrap(),
        "BAD_REQUEST"
    );
    assert_eq!(
        serde_json::to_value(ErrorCode::SlowConsumer).unwrap(),
        "SLOW_CONSUMER"
    );
    assert_eq!(
        serde_json::to_value(ErrorCode::Unauthorized).unwrap(),
        "UNAUTHORIZED"
    );
    assert_eq!(serde_json::to_value(ErrorCode::Internal).unwrap(), "INTERNAL");
}

#[test]
fn event_round_trips() {
    let env = ServerEnvelope::event(
        "news",
        PayloadEnvelope {
            id: "m0".to_string(),
            payload: json!({"seq": 0}),
        },
    );
    let text = serde_json::to_string(&env).unwrap();
    match serde_json::from_str::<ServerEnvelope>(&text).unwrap() {
        ServerEnvelope::Event { topic, message, .. } => {
            assert_eq!(topic, "news");
            assert_eq!(message.id, "m0");
            assert_eq!(message.payload["seq"], 0);
        }
        other => panic!("expected event, got {other:?}"),
    }
}

#[test]
fn info_carries_optional_topic() {
    let value = serde_json::to_value(ServerEnvelope::info("topic_deleted", Some("news"))).unwrap();
    assert_eq!(value["type"], "info");
    assert_eq!(value["msg"], "topic_deleted");
    assert_eq!(value["topic"], "news");

    let value = serde_json::to_value(ServerEnvelope::info("ping", None)).unwrap();
    assert!(value.get("topic").is_none());
}
