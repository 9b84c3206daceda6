use rust_decimal::Decimal;
use serde_json::json;

use super::*;

// =============================================================================
// normalize_email
// =============================================================================

#[test]
fn normalize_email_lowercases_and_trims() {
    assert_eq!(normalize_email("  Ann@Example.COM "), Some("ann@example.com".to_owned()));
}

#[test]
fn normalize_email_rejects_malformed() {
    for raw in ["", "ann", "@example.com", "ann@", "ann@example", "a b@example.com", "a@b@c.com", "ann@.com"] {
        assert_eq!(normalize_email(raw), None, "expected rejection for {raw:?}");
    }
}

// =============================================================================
// ValidationErrors
// =============================================================================

#[test]
fn message_uses_first_error() {
    let errors = ValidationErrors::single("email", "The email field is required.");
    assert_eq!(errors.message(), "The email field is required.");
}

#[test]
fn message_counts_remaining_errors() {
    let mut errors = ValidationErrors::default();
    errors.add("name", "one");
    errors.add("email", "two");
    assert_eq!(errors.message(), "one (and 1 more error)");
    errors.add("password", "three");
    assert_eq!(errors.message(), "one (and 2 more errors)");
}

#[test]
fn to_map_groups_messages_by_field() {
    let mut errors = ValidationErrors::default();
    errors.add("name", "a");
    errors.add("name", "b");
    let map = errors.to_map();
    assert_eq!(map["name"], json!(["a", "b"]));
}

// =============================================================================
// Validator rules
// =============================================================================

#[test]
fn required_string_reports_missing_and_blank() {
    let mut v = Validator::new();
    v.required_string("name", None, 25);
    v.required_string("source", Some(&json!("   ")), 25);
    let errors = v.finish().unwrap_err();
    assert_eq!(errors.messages("name").unwrap(), ["The name field is required."]);
    assert_eq!(errors.messages("source").unwrap(), ["The source field is required."]);
}

#[test]
fn required_string_enforces_max_chars() {
    let mut v = Validator::new();
    v.required_string("name", Some(&json!("a".repeat(26))), 25);
    let errors = v.finish().unwrap_err();
    assert_eq!(errors.messages("name").unwrap(), ["The name field must not be greater than 25 characters."]);
}

#[test]
fn required_string_rejects_non_strings() {
    let mut v = Validator::new();
    v.required_string("name", Some(&json!(42)), 25);
    let errors = v.finish().unwrap_err();
    assert_eq!(errors.messages("name").unwrap(), ["The name field must be a string."]);
}

#[test]
fn required_string_trims_valid_values() {
    let mut v = Validator::new();
    let name = v.required_string("name", Some(&json!("  Food ")), 25);
    assert!(v.finish().is_ok());
    assert_eq!(name, "Food");
}

#[test]
fn optional_string_maps_blank_to_none() {
    let mut v = Validator::new();
    assert_eq!(v.optional_string("description", Some(&json!("")), 255), None);
    assert_eq!(v.optional_string("description", None, 255), None);
    assert_eq!(v.optional_string("description", Some(&json!("lunch")), 255), Some("lunch".to_owned()));
    assert!(v.finish().is_ok());
}

#[test]
fn email_rule_messages() {
    let mut v = Validator::new();
    v.email("email", Some(&json!("nope")));
    let errors = v.finish().unwrap_err();
    assert_eq!(errors.messages("email").unwrap(), ["The email field must be a valid email address."]);
}

#[test]
fn password_rule_enforces_minimum() {
    let mut v = Validator::new();
    v.password("password", Some(&json!("short")), 8);
    let errors = v.finish().unwrap_err();
    assert_eq!(errors.messages("password").unwrap(), ["The password field must be at least 8 characters."]);
}

#[test]
fn password_rule_keeps_whitespace() {
    let mut v = Validator::new();
    let pw = v.password("password", Some(&json!(" secret123 ")), 8);
    assert!(v.finish().is_ok());
    assert_eq!(pw, " secret123 ");
}

#[test]
fn amount_accepts_numbers_and_numeric_strings() {
    let mut v = Validator::new();
    assert_eq!(v.amount("amount", Some(&json!(12.5))), Decimal::new(1250, 2));
    assert_eq!(v.amount("amount", Some(&json!("3000"))), Decimal::new(3000, 0));
    assert_eq!(v.amount("amount", Some(&json!(0))), Decimal::ZERO);
    assert_eq!(v.amount("amount", Some(&json!("3000"))).to_string(), "3000.00");
    assert!(v.finish().is_ok());
}

#[test]
fn amount_rounds_to_cents() {
    let mut v = Validator::new();
    assert_eq!(v.amount("amount", Some(&json!("1.004"))), Decimal::new(100, 2));
    assert_eq!(v.amount("amount", Some(&json!("1.006"))), Decimal::new(101, 2));
}

#[test]
fn amount_max_fits_the_column() {
    assert_eq!(AMOUNT_MAX.to_string(), "9999999999.99");
    let mut v = Validator::new();
    v.amount("amount", Some(&json!("9999999999.99")));
    assert!(v.finish().is_ok());
    let mut v = Validator::new();
    v.amount("amount", Some(&json!("10000000000")));
    assert!(v.finish().is_err());
}

#[test]
fn amount_rejects_negative_and_garbage() {
    let mut v = Validator::new();
    v.amount("amount", Some(&json!(-1)));
    v.amount("other_amount", Some(&json!("ten")));
    let errors = v.finish().unwrap_err();
    assert_eq!(errors.messages("amount").unwrap(), ["The amount field must be at least 0."]);
    assert_eq!(errors.messages("other_amount").unwrap(), ["The other amount field must be a number."]);
}

#[test]
fn id_rule_messages() {
    let mut v = Validator::new();
    v.id("category_id", None);
    v.id("other_id", Some(&json!("abc")));
    let errors = v.finish().unwrap_err();
    assert_eq!(errors.messages("category_id").unwrap(), ["The category id field is required."]);
    assert_eq!(errors.messages("other_id").unwrap(), ["The other id field must be an integer."]);
}

#[test]
fn id_rule_accepts_numeric_string() {
    let mut v = Validator::new();
    assert_eq!(v.id("category_id", Some(&json!("5"))), 5);
    assert!(v.finish().is_ok());
}
