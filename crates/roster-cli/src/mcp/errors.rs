//! Mapping from booking errors to MCP error responses

use roster_core::{BookingError, ErrorKind};
use rmcp::ErrorData;
use serde_json::json;

/// Convert a booking error into an MCP error.
///
/// The JSON-RPC error class follows the error kind, and the stable reason
/// code travels in `data.code` so clients can branch without parsing text.
pub fn to_mcp_error(context: &str, error: &BookingError) -> ErrorData {
    let message = format!("{context}: {error}");
    let data = Some(json!({ "code": error.code() }));
    match error.kind() {
        ErrorKind::Validation => ErrorData::invalid_params(message, data),
        ErrorKind::NotFound => ErrorData::resource_not_found(message, data),
        ErrorKind::Conflict | ErrorKind::Authorization => {
            ErrorData::invalid_request(message, data)
        }
        ErrorKind::TransientStore | ErrorKind::Internal => {
            ErrorData::internal_error(message, data)
        }
    }
}

#[cfg(test)]
mod tests {
    use rmcp::model::ErrorCode;

    use super::*;

    #[test]
    fn test_validation_maps_to_invalid_params() {
        let err = to_mcp_error(
            "Failed to book",
            &BookingError::MissingFields {
                fields: vec!["date".to_string()],
            },
        );
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.data, Some(json!({ "code": "MISSING_FIELDS" })));
        assert!(err.message.starts_with("Failed to book: "));
    }

    #[test]
    fn test_conflict_and_not_found() {
        let conflict = to_mcp_error(
            "Failed to book",
            &BookingError::SlotAlreadyBooked {
                slot_id: 1,
                date: "2025-01-06".to_string(),
            },
        );
        assert_eq!(conflict.code, ErrorCode::INVALID_REQUEST);
        assert_eq!(conflict.data, Some(json!({ "code": "SLOT_ALREADY_BOOKED" })));

        let missing = to_mcp_error(
            "Failed to get slot",
            &BookingError::NotFound {
                entity: "Slot",
                id: 4,
            },
        );
        assert_eq!(missing.code, ErrorCode::RESOURCE_NOT_FOUND);
    }
}
