//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every failure is an `invalid_request` domain error whose details name the
//! offending field, matching the shape the domain uses for its own checks.

use serde_json::{Value, json};

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    Required,
    InvalidImage,
    InvalidChoice,
    Invalid,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Required => "required",
            ErrorCode::InvalidImage => "invalid_image",
            ErrorCode::InvalidChoice => "invalid_choice",
            ErrorCode::Invalid => "invalid",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

pub(crate) fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(field, ErrorCode::Required, "Обязательное поле.")
}

pub(crate) fn invalid_image_error(field: FieldName, reason: &str) -> Error {
    field_error(
        field,
        ErrorCode::InvalidImage,
        format!("Загрузите правильное изображение: {reason}."),
    )
}

pub(crate) fn invalid_field_error(field: FieldName, message: impl Into<String>) -> Error {
    field_error(field, ErrorCode::Invalid, message)
}

pub(crate) fn unknown_choice_error(field: FieldName) -> Error {
    field_error(
        field,
        ErrorCode::InvalidChoice,
        "Выберите корректный вариант. Этого варианта нет среди допустимых значений.",
    )
}

/// Collects field errors so one response reports every invalid field.
///
/// A single failure is returned unchanged; several are merged into one
/// error whose details hold an `errors` array of `{field, code, message}`.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors {
    errors: Vec<Error>,
}

impl FieldErrors {
    /// Record the error of a failed check; the value of a passing one.
    pub(crate) fn check<T>(&mut self, result: Result<T, Error>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.errors.push(error);
                None
            }
        }
    }

    /// `Ok` when every check passed.
    pub(crate) fn finish(self) -> Result<(), Error> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    /// The collected failures as one error.
    pub(crate) fn into_error(self) -> Error {
        match <[Error; 1]>::try_from(self.errors) {
            Ok([error]) => error,
            Err(errors) => merge(&errors),
        }
    }
}

fn merge(errors: &[Error]) -> Error {
    let fields: Vec<&str> = errors
        .iter()
        .filter_map(|error| error.details()?.get("field")?.as_str())
        .collect();
    let message = if fields.is_empty() {
        "Некорректные данные.".to_owned()
    } else {
        format!("Исправьте ошибки в полях: {}.", fields.join(", "))
    };
    let entries: Vec<Value> = errors
        .iter()
        .map(|error| {
            let mut entry = error.details().cloned().unwrap_or_else(|| json!({}));
            if let Some(object) = entry.as_object_mut() {
                object.insert("message".to_owned(), json!(error.message()));
            }
            entry
        })
        .collect();
    Error::invalid_request(message).with_details(json!({ "errors": entries }))
}

/// Unwrap a field that must be present.
pub(crate) fn required<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Parse a boolean query flag written as `1`/`0` or `true`/`false`.
pub(crate) fn parse_flag(value: Option<&str>, field: FieldName) -> Result<bool, Error> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("0") | Some("false") => Ok(false),
        Some("1") | Some("true") => Ok(true),
        Some(other) => Err(field_error(
            field,
            ErrorCode::InvalidChoice,
            format!("Выберите правильный вариант. {other} нет среди допустимых значений."),
        )),
    }
}
