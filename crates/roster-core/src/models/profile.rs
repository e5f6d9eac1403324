//! Minimal identity records for customers and providers.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Identity details the engine needs from an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Account identifier
    pub id: u64,

    /// Full legal name
    pub full_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Location used for distance ranking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl Profile {
    /// Same natural person behind two accounts.
    ///
    /// Names must match ignoring case and surrounding whitespace, and at
    /// least one contact channel must match as well. Emails compare
    /// case-insensitively, phones on their digits only.
    pub fn same_person_as(&self, other: &Profile) -> bool {
        let name = |p: &Profile| p.full_name.trim().to_lowercase();
        if name(self).is_empty() || name(self) != name(other) {
            return false;
        }

        let email = |p: &Profile| {
            p.email
                .as_deref()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
        };
        let phone = |p: &Profile| {
            p.phone
                .as_deref()
                .map(|ph| ph.chars().filter(char::is_ascii_digit).collect::<String>())
                .filter(|ph| !ph.is_empty())
        };

        let email_matches = matches!((email(self), email(other)), (Some(a), Some(b)) if a == b);
        let phone_matches = matches!((phone(self), phone(other)), (Some(a), Some(b)) if a == b);
        email_matches || phone_matches
    }
}
