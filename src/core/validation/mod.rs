//! Input validation
//!
//! Write inputs derive [`validator::Validate`]; the custom rules and the
//! closed option lists they check against live here. [`validate_input`]
//! turns a failed check into a [`ValidationError`](crate::core::error::ValidationError)
//! before anything reaches a data provider.

pub mod validators;

use crate::core::error::ValidationError;
use validator::Validate;

/// Service units a member can belong to
pub const SERVICE_UNITS: &[&str] = &[
    "Ushering",
    "Choir",
    "Media",
    "Children",
    "Security",
    "Hospitality",
];

/// Accepted gender values
pub const GENDERS: &[&str] = &["Male", "Female"];

/// Accepted marital status values
pub const MARITAL_STATUSES: &[&str] = &["Single", "Married", "Divorced", "Widowed"];

/// Run derive-based validation and convert the failures
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ValidationError> {
    input.validate().map_err(ValidationError::from)
}
