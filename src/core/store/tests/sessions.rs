use crate::core::pipeline::{RunState, SessionState};
use crate::core::store::Store;

fn store() -> Store {
    Store::open_in_memory().expect("in-memory store")
}

#[tokio::test]
async fn create_session_starts_in_created_with_state_snapshot() {
    let store = store();
    let state = SessionState::new("video/mp4", "fire");
    let session = store.create_session("u1", &state).await.unwrap();

    assert_eq!(session.user_id, "u1");
    assert_eq!(session.status, "created");
    let parsed: SessionState = serde_json::from_str(&session.state_json).unwrap();
    assert_eq!(parsed.mime_type(), Some("video/mp4"));
    assert_eq!(parsed.risk_type(), Some("fire"));
}

#[tokio::test]
async fn happy_path_transitions_persist() {
    let store = store();
    let session = store
        .create_session("u1", &SessionState::new("video/mp4", "fire"))
        .await
        .unwrap();

    for to in [
        RunState::ParallelRunning,
        RunState::ParallelJoined,
        RunState::Summarizing,
        RunState::Complete,
    ] {
        store.transition_session(&session.id, to).await.unwrap();
    }

    let record = store.get_session(&session.id).await.unwrap().unwrap();
    assert_eq!(record.status, "complete");
}

#[tokio::test]
async fn illegal_transition_is_rejected() {
    let store = store();
    let session = store
        .create_session("u1", &SessionState::new("video/mp4", "fire"))
        .await
        .unwrap();

    let err = store
        .transition_session(&session.id, RunState::Summarizing)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("illegal session transition"));

    // The row is unchanged after the rejected write.
    let record = store.get_session(&session.id).await.unwrap().unwrap();
    assert_eq!(record.status, "created");
}

#[tokio::test]
async fn record_failure_moves_to_failed_with_error() {
    let store = store();
    let session = store
        .create_session("u1", &SessionState::new("video/mp4", "fire"))
        .await
        .unwrap();
    store
        .transition_session(&session.id, RunState::ParallelRunning)
        .await
        .unwrap();

    store
        .record_session_failure(&session.id, "stage exploded")
        .await
        .unwrap();

    let record = store.get_session(&session.id).await.unwrap().unwrap();
    assert_eq!(record.status, "failed");
    assert_eq!(record.error.as_deref(), Some("stage exploded"));
}

#[tokio::test]
async fn terminal_states_absorb() {
    let store = store();
    let session = store
        .create_session("u1", &SessionState::new("video/mp4", "fire"))
        .await
        .unwrap();
    store
        .record_session_failure(&session.id, "boom")
        .await
        .unwrap();

    let err = store
        .transition_session(&session.id, RunState::ParallelRunning)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("illegal session transition"));
}

#[tokio::test]
async fn save_session_state_replaces_snapshot() {
    let store = store();
    let mut state = SessionState::new("video/mp4", "fire");
    let session = store.create_session("u1", &state).await.unwrap();

    state.set("fire_risk_report", "no open flames".to_string());
    store
        .save_session_state(&session.id, &state)
        .await
        .unwrap();

    let record = store.get_session(&session.id).await.unwrap().unwrap();
    let parsed: SessionState = serde_json::from_str(&record.state_json).unwrap();
    assert_eq!(parsed.fire_risk_report(), Some("no open flames"));
}

#[tokio::test]
async fn events_are_returned_in_append_order() {
    let store = store();
    let session = store
        .create_session("u1", &SessionState::new("video/mp4", "fire"))
        .await
        .unwrap();

    for (stage, phase) in [
        ("fire_risk_agent", "entered"),
        ("fire_risk_agent", "finished"),
        ("risk_summary_agent", "entered"),
    ] {
        store
            .append_session_event(&session.id, stage, phase, "")
            .await
            .unwrap();
    }

    let events = store.get_session_events(&session.id).await.unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].phase, "entered");
    assert_eq!(events[1].phase, "finished");
    assert_eq!(events[2].stage, "risk_summary_agent");
}

#[tokio::test]
async fn unknown_session_lookup_is_absent() {
    let store = store();
    assert!(store.get_session("nope").await.unwrap().is_none());
}
