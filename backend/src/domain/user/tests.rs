//! Validation rules for account fields.

use super::*;
use crate::domain::ErrorCode;
use rstest::rstest;

#[rstest]
#[case("cook@Example.COM", "cook@example.com")]
#[case("  chef@kitchen.ru  ", "chef@kitchen.ru")]
fn email_is_trimmed_and_domain_lowercased(#[case] raw: &str, #[case] expected: &str) {
    let email = Email::new(raw).expect("valid email");
    assert_eq!(email.as_ref(), expected);
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::MalformedEmail)]
#[case("@example.com", UserValidationError::MalformedEmail)]
#[case("cook@", UserValidationError::MalformedEmail)]
fn email_rejects_malformed_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Email::new(raw), Err(expected));
}

#[rstest]
fn email_rejects_overlong_values() {
    let raw = format!("{}@example.com", "a".repeat(EMAIL_MAX));
    assert_eq!(
        Email::new(raw),
        Err(UserValidationError::EmailTooLong { max: EMAIL_MAX })
    );
}

#[rstest]
#[case("vasya.pupkin")]
#[case("chef+1@home")]
#[case("повар_42")]
fn username_accepts_word_characters_and_symbols(#[case] raw: &str) {
    assert!(Username::new(raw).is_ok());
}

#[rstest]
#[case("with space", UserValidationError::UsernameInvalidCharacters)]
#[case("semi;colon", UserValidationError::UsernameInvalidCharacters)]
#[case("   ", UserValidationError::EmptyUsername)]
fn username_rejects_invalid_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Username::new(raw), Err(expected));
}

#[rstest]
fn person_name_reports_its_field() {
    let error = PersonName::new("last_name", "").expect_err("blank rejected");
    assert_eq!(error.field(), "last_name");
}

#[rstest]
fn validation_errors_become_field_errors() {
    let error: Error = UserValidationError::UsernameTooLong { max: USERNAME_MAX }.into();
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("details present");
    assert_eq!(details["field"], "username");
    assert_eq!(details["code"], "max_length");
}
