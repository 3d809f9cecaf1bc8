use regex::Regex;
use snippetbox::forms::{EMAIL_RX, Form};

fn form(pairs: &[(&str, &str)]) -> Form {
    Form::new(pairs.iter().copied())
}

#[test]
fn test_required_whitespace_value_records_one_error() {
    for blank in ["", " ", "\t\n", "    "] {
        let mut f = form(&[("title", blank)]);
        f.required(&["title"]);
        assert_eq!(f.errors.all("title"), ["This field cannot be blank"], "{blank:?}");
    }
}

#[test]
fn test_required_non_whitespace_value_records_nothing() {
    let mut f = form(&[("title", "  x  ")]);
    f.required(&["title"]);
    assert!(f.valid());
}

#[test]
fn test_required_missing_field_is_blank() {
    let mut f = form(&[]);
    f.required(&["title", "content"]);
    assert_eq!(f.errors.get("title"), Some("This field cannot be blank"));
    assert_eq!(f.errors.get("content"), Some("This field cannot be blank"));
}

#[test]
fn test_max_length_boundary_counts_code_points() {
    let mut exact = form(&[("title", "é".repeat(100).as_str())]);
    exact.max_length("title", 100);
    assert!(exact.valid());

    let mut over = form(&[("title", "é".repeat(101).as_str())]);
    over.max_length("title", 100);
    assert_eq!(
        over.errors.all("title"),
        ["This field is too long (maximum is 100 characters)"]
    );
}

#[test]
fn test_min_length() {
    let mut short = form(&[("password", "123456789")]);
    short.min_length("password", 10);
    assert_eq!(
        short.errors.get("password"),
        Some("This field is too short (minimum is 10 characters)")
    );

    let mut ok = form(&[("password", "1234567890")]);
    ok.min_length("password", 10);
    assert!(ok.valid());
}

#[test]
fn test_permitted_values() {
    let mut ok = form(&[("expires", "7")]);
    ok.permitted_values("expires", &["365", "7", "1"]);
    assert!(ok.valid());

    let mut bad = form(&[("expires", "30")]);
    bad.permitted_values("expires", &["365", "7", "1"]);
    assert_eq!(bad.errors.get("expires"), Some("This field is invalid"));
}

#[test]
fn test_matches_pattern() {
    let mut ok = form(&[("email", "alice@example.com")]);
    ok.matches_pattern("email", &EMAIL_RX);
    assert!(ok.valid());

    let mut bad = form(&[("email", "alice@")]);
    bad.matches_pattern("email", &EMAIL_RX);
    assert_eq!(bad.errors.get("email"), Some("This field is invalid"));
}

#[test]
fn test_optional_rules_skip_empty_values() {
    let digits = Regex::new(r"^\d+$").unwrap();
    let mut f = form(&[("field", "")]);
    f.max_length("field", 0);
    f.min_length("field", 5);
    f.permitted_values("field", &["a"]);
    f.matches_pattern("field", &digits);
    assert!(f.valid());
}

#[test]
fn test_rules_accumulate_in_invocation_order() {
    let mut f = form(&[("expires", "this is far too long")]);
    f.required(&["expires"]);
    f.max_length("expires", 5);
    f.permitted_values("expires", &["365", "7", "1"]);

    assert_eq!(
        f.errors.all("expires"),
        [
            "This field is too long (maximum is 5 characters)",
            "This field is invalid",
        ]
    );
    // Only the first message is shown.
    assert_eq!(
        f.errors.get("expires"),
        Some("This field is too long (maximum is 5 characters)")
    );
}

#[test]
fn test_blank_field_is_reported_once() {
    let mut f = form(&[("expires", "   ")]);
    f.required(&["expires"]);
    f.permitted_values("expires", &["365", "7", "1"]);
    // Whitespace is not empty, so permitted_values still fires.
    assert_eq!(f.errors.all("expires").len(), 2);

    let mut f = form(&[("expires", "")]);
    f.required(&["expires"]);
    f.permitted_values("expires", &["365", "7", "1"]);
    assert_eq!(f.errors.all("expires"), ["This field cannot be blank"]);
}

#[test]
fn test_valid_tracks_error_map() {
    let mut f = form(&[("title", "fine"), ("content", "")]);
    assert!(f.valid());
    f.required(&["title"]);
    assert!(f.valid());
    f.required(&["content"]);
    assert!(!f.valid());
    f.max_length("title", 100);
    assert!(!f.valid());
}

#[test]
fn test_get_returns_first_submitted_value() {
    let f = form(&[("tag", "first"), ("tag", "second")]);
    assert_eq!(f.get("tag"), "first");
    assert_eq!(f.get("missing"), "");
}
