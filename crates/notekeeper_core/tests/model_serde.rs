use notekeeper_core::{AccessLevel, Grant, Identity, Resource, Role};

#[test]
fn identity_serializes_with_snake_case_role() {
    let identity = Identity {
        username: "alice".to_string(),
        password_hash: None,
        role: Role::User,
        is_active: false,
        created_at: 1_700_000_000_000,
    };

    let json = serde_json::to_value(&identity).unwrap();
    assert_eq!(json["username"], "alice");
    assert_eq!(json["role"], "user");
    assert_eq!(json["is_active"], false);
}

#[test]
fn grant_round_trips_through_json() {
    let grant = Grant::new(Resource::Task, AccessLevel::Change);
    let json = serde_json::to_string(&grant).unwrap();
    assert!(json.contains("\"task\""));
    assert!(json.contains("\"change\""));

    let back: Grant = serde_json::from_str(&json).unwrap();
    assert_eq!(back, grant);
}
