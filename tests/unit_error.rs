use acts::error::{exit_codes, Error, JsonError};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let missing = Error::NoSuchActivity("abc".to_string());
    assert_eq!(missing.exit_code(), exit_codes::USER_ERROR);

    let op = Error::Io(std::io::Error::other("disk full"));
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);
    assert_ne!(op.exit_code(), exit_codes::SUCCESS);
}

#[test]
fn json_error_includes_code() {
    let err = Error::NoSuchActivity("zzz".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert_eq!(json.kind, "user_error");
    assert!(json.message.contains("No activities found with index zzz"));
    assert_eq!(json.details, Some(serde_json::json!({ "id": "zzz" })));
}

#[test]
fn ambiguous_message_lists_every_candidate() {
    let err = Error::AmbiguousIdentifier {
        id: "abc".to_string(),
        candidates: vec![
            "[abc] 2030-01-01 10:00 one".to_string(),
            "[abc] 2030-01-02 10:00 two".to_string(),
        ],
    };
    let message = err.to_string();
    assert!(message.contains("matches 2 activities"));
    assert!(message.contains("10:00 one"));
    assert!(message.contains("10:00 two"));
}

#[test]
fn unknown_unit_names_legal_units() {
    let message = Error::UnknownUnit("fortnight".to_string()).to_string();
    assert!(message.contains("'fortnight'"));
    assert!(message.contains("'month','week','day','hour','minute'"));
}
