use crate::{Complete, Completable, Fail, Failure, Outcome};

#[test]
fn test_completed_serialization() {
    let serialized = serde_json::to_string(&Outcome::Completed).unwrap();
    let deserialized: Outcome = serde_json::from_str(&serialized).unwrap();
    assert!(deserialized.is_completed());
}

#[test]
fn test_failed_serialization_keeps_message() {
    let outcome = Outcome::Failed(Failure::msg("disk error"));
    let serialized = serde_json::to_string(&outcome).unwrap();
    let deserialized: Outcome = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized.failure().unwrap().to_string(), "disk error");
}

#[test]
fn test_composite_failure_serializes_as_text() {
    let outcome = Fail(Failure::msg("disk error"))
        .on_error_resume_next(|_| Err(Failure::msg("config missing")))
        .blocking_await()
        .unwrap();
    let serialized = serde_json::to_string(&outcome).unwrap();
    let deserialized: Outcome = serde_json::from_str(&serialized).unwrap();
    assert_eq!(
        deserialized.failure().unwrap().to_string(),
        "2 failures occurred: config missing; disk error"
    );
}

#[test]
fn test_outcome_list_serialization() {
    let outcomes = vec![
        Complete.blocking_await().unwrap(),
        Fail(Failure::msg("boom")).blocking_await().unwrap(),
    ];
    let serialized = serde_json::to_string(&outcomes).unwrap();
    let deserialized: Vec<Outcome> = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized.len(), 2);
    assert!(deserialized[0].is_completed());
    assert_eq!(deserialized[1].failure().unwrap().to_string(), "boom");
}
