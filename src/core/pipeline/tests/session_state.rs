use crate::core::pipeline::SessionState;
use crate::core::pipeline::types::{
    KEY_CONSTRUCTION_RISK_REPORT, KEY_FIRE_RISK_REPORT, KEY_MIME_TYPE, KEY_RISK_TYPE,
};

#[test]
fn new_state_carries_mime_and_risk_type() {
    let state = SessionState::new("video/mp4", "fire");
    assert_eq!(state.get(KEY_MIME_TYPE), Some("video/mp4"));
    assert_eq!(state.get(KEY_RISK_TYPE), Some("fire"));
    assert_eq!(state.fire_risk_report(), None);
    assert_eq!(state.construction_risk_report(), None);
}

#[test]
fn report_keys_are_distinct() {
    let mut state = SessionState::new("video/mp4", "construction");
    state.set(KEY_FIRE_RISK_REPORT, "fire findings".to_string());
    state.set(KEY_CONSTRUCTION_RISK_REPORT, "site findings".to_string());

    assert_eq!(state.fire_risk_report(), Some("fire findings"));
    assert_eq!(state.construction_risk_report(), Some("site findings"));
}

#[test]
fn serializes_as_plain_key_value_map() {
    let state = SessionState::new("video/mp4", "fire");
    let json: serde_json::Value = serde_json::to_value(&state).unwrap();
    assert_eq!(json[KEY_MIME_TYPE], "video/mp4");
    assert_eq!(json[KEY_RISK_TYPE], "fire");
}
