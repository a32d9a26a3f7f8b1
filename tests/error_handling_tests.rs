//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors carry stable codes for user-facing messaging
//! - Error responses are properly formatted
//! - Error conversions work correctly
//! - Error matching allows callers to handle specific cases

use shepherd::core::error::{ErrorResponse, FieldValidationError};
use shepherd::core::validation::validate_input;
use shepherd::prelude::*;

fn valid_member() -> CreateMemberInput {
    CreateMemberInput {
        full_name: "Jane Smith".to_string(),
        phone: "+1234567891".to_string(),
        email: "jane@example.com".to_string(),
        center_id: "2".to_string(),
        service_unit: "Choir".to_string(),
        gender: "Female".to_string(),
        marital_status: "Married".to_string(),
        dob: NaiveDate::from_ymd_opt(1985, 8, 22).unwrap(),
    }
}

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_paging_errors() {
        let err = ShepherdError::from(ValidationError::InvalidPage { page: 0 });
        assert_eq!(err.error_code(), "INVALID_PAGE");

        let err = ShepherdError::from(ValidationError::InvalidPageSize { page_size: 0 });
        assert_eq!(err.error_code(), "INVALID_PAGE_SIZE");
    }

    #[test]
    fn test_fetch_errors() {
        let err = ShepherdError::from(FetchError::EmptyInsert {
            table: "members".to_string(),
        });
        assert_eq!(err.error_code(), "FETCH_EMPTY_INSERT");

        let err = ShepherdError::from(FetchError::Store {
            message: "poisoned".to_string(),
        });
        assert_eq!(err.error_code(), "FETCH_STORE_ERROR");
    }

    #[test]
    fn test_config_and_internal_errors() {
        let err = ShepherdError::from(ConfigError::MissingField {
            field: "provider".to_string(),
            context: "AdminServiceBuilder".to_string(),
        });
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert_eq!(
            ShepherdError::Internal("oops".to_string()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_only_transport_failures_are_retryable() {
        let http = ShepherdError::from(FetchError::Http {
            table: "centers".to_string(),
            message: "timed out".to_string(),
        });
        let decode = ShepherdError::from(FetchError::Decode {
            table: "centers".to_string(),
            message: "missing field `name`".to_string(),
        });
        let invalid = ShepherdError::from(ValidationError::InvalidPage { page: 0 });

        assert!(http.is_retryable());
        assert!(!decode.is_retryable());
        assert!(!invalid.is_retryable());
    }
}

// =============================================================================
// Error Response Tests
// =============================================================================

mod response_tests {
    use super::*;

    #[test]
    fn test_status_error_response_has_details() {
        let response: ErrorResponse = ShepherdError::from(FetchError::Status {
            table: "messages".to_string(),
            status: 503,
            message: "unavailable".to_string(),
        })
        .to_response();

        assert_eq!(response.code, "FETCH_STATUS_ERROR");
        assert!(response.message.contains("503"));
        let details = response.details.unwrap();
        assert_eq!(details["table"], "messages");
        assert_eq!(details["status"], 503);
    }

    #[test]
    fn test_unknown_filter_response_names_record_and_field() {
        let response = ShepherdError::from(ValidationError::UnknownFilterField {
            record: "member".to_string(),
            field: "shoe_size".to_string(),
        })
        .to_response();

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["code"], "UNKNOWN_FILTER_FIELD");
        assert_eq!(json["details"]["field"], "shoe_size");
    }

    #[test]
    fn test_response_without_details_omits_the_key() {
        let response = ShepherdError::Internal("oops".to_string()).to_response();
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("details").is_none());
    }
}

// =============================================================================
// Input Validation Tests
// =============================================================================

mod input_validation_tests {
    use super::*;

    #[test]
    fn test_valid_member_passes() {
        assert!(validate_input(&valid_member()).is_ok());
    }

    #[test]
    fn test_field_errors_are_sorted_by_field() {
        let input = CreateMemberInput {
            full_name: "J".to_string(),
            email: "jane".to_string(),
            gender: "Unknown".to_string(),
            ..valid_member()
        };

        let ValidationError::FieldErrors(errors) = validate_input(&input).unwrap_err() else {
            panic!("expected field errors");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "full_name", "gender"]);
        assert_eq!(
            errors[1],
            FieldValidationError::new("full_name", "Full name must be at least 2 characters")
        );
    }

    #[test]
    fn test_field_errors_in_response_details() {
        let input = CreateMemberInput {
            center_id: String::new(),
            ..valid_member()
        };
        let err = ShepherdError::from(validate_input(&input).unwrap_err());

        let details = err.to_response().details.unwrap();
        assert_eq!(details["fields"][0]["field"], "center_id");
        assert_eq!(details["fields"][0]["message"], "Please select a center");
    }

    #[test]
    fn test_message_without_channels_rejected() {
        let input = SendMessageInput {
            channels: Vec::new(),
            ..SendMessageInput::new(RecipientGroup::All, "Hello")
        };
        let err = validate_input(&input).unwrap_err();
        assert!(err.to_string().contains("Please select at least one channel."));
    }
}

// =============================================================================
// Error Matching Tests
// =============================================================================

mod matching_tests {
    use super::*;

    #[tokio::test]
    async fn test_match_on_validation_category() {
        let service = AdminService::builder()
            .with_provider(FixtureProvider::new().unwrap())
            .build()
            .unwrap();

        let result = service
            .list_members(&ListQuery::new(1, 10).filter("favourite_hymn", "Amazing Grace"))
            .await;

        match result {
            Err(ShepherdError::Validation(ValidationError::UnknownFilterField { field, .. })) => {
                assert_eq!(field, "favourite_hymn");
            }
            other => panic!("expected unknown filter field, got {other:?}"),
        }
    }
}
