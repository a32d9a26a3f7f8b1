//! Reusable field validators
//!
//! These plug into `#[validate(custom(function = ...))]` on input structs.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use validator::ValidationError;

use super::{GENDERS, MARITAL_STATUSES, SERVICE_UNITS};

/// Validator: phone number made of digits with optional separators
///
/// A leading `+` is allowed; spaces, dashes and parentheses may separate
/// digit groups.
pub fn phone(value: &str) -> Result<(), ValidationError> {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX
        .get_or_init(|| Regex::new(r"^\+?[0-9(][0-9 ()\-]*[0-9]$").expect("phone pattern is valid"));

    if regex.is_match(value) {
        Ok(())
    } else {
        Err(error("phone", "Phone number may only contain digits and separators"))
    }
}

/// Validator: value is one of the configured service units
pub fn service_unit(value: &str) -> Result<(), ValidationError> {
    in_list(value, SERVICE_UNITS, "Please select a service unit")
}

/// Validator: value is one of the configured genders
pub fn gender(value: &str) -> Result<(), ValidationError> {
    in_list(value, GENDERS, "Please select a gender")
}

/// Validator: value is one of the configured marital statuses
pub fn marital_status(value: &str) -> Result<(), ValidationError> {
    in_list(value, MARITAL_STATUSES, "Please select marital status")
}

/// Validator: value must be in allowed list
fn in_list(
    value: &str,
    allowed: &'static [&'static str],
    message: &'static str,
) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        let mut err = error("in_list", message);
        err.add_param(Cow::Borrowed("value"), &value);
        Err(err)
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}
