use chrono::{DateTime, TimeZone, Utc};
use snippetbox::{
    models::{Snippet, User},
    templates::{capitalize, human_date},
};

fn sample_user() -> User {
    User {
        id: 1,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        hashed_password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        created: Utc::now(),
    }
}

#[test]
fn test_user_json_never_includes_password_hash() {
    let json_output = serde_json::to_string(&sample_user()).unwrap();

    assert!(json_output.contains(r#""email":"alice@example.com""#));
    assert!(!json_output.contains("hashed_password"));
    assert!(!json_output.contains("$argon2id"));
}

#[test]
fn test_snippet_serialization_uses_rfc3339_timestamps() {
    let created = Utc.with_ymd_and_hms(2024, 3, 17, 10, 15, 0).unwrap();
    let snippet = Snippet {
        id: 3,
        title: "t".to_string(),
        content: "c".to_string(),
        created,
        expires: created,
    };

    let json_output = serde_json::to_string(&snippet).unwrap();
    assert!(json_output.contains(r#""created":"2024-03-17T10:15:00Z""#));
}

#[test]
fn test_human_date_format() {
    let t = Utc.with_ymd_and_hms(2024, 3, 17, 10, 15, 0).unwrap();
    assert_eq!(human_date(t), "17 Mar 2024 at 10:15");
}

#[test]
fn test_human_date_zero_time_is_empty() {
    assert_eq!(human_date(DateTime::<Utc>::UNIX_EPOCH), "");
}

#[test]
fn test_capitalize_title_cases_each_word() {
    assert_eq!(capitalize("alice"), "Alice");
    assert_eq!(capitalize("aLICE vAN dyke"), "Alice Van Dyke");
    assert_eq!(capitalize(""), "");
}
