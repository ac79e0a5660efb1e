//! Mosque records as returned to API clients.
//!
//! Field names serialize in camelCase to match the stored documents.

use musala_geo::{Coordinate, Located};
use serde::{Deserialize, Serialize};

/// A mosque and everything the lookup returns about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mosque {
    /// Document id in the store
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub location: Location,
    pub community_name: String,
    pub last_updated_at: String,
    pub thumbnail: Photo,
    pub donation_link: String,
    pub is_debug: bool,
    pub verification_status: String,
    pub photos: Vec<Photo>,
    /// Passed through untouched; prayer times are computed by clients
    pub calculation_parameters: CalculationParameters,
}

impl Located for Mosque {
    fn coordinate(&self) -> Coordinate {
        self.location.coordinate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

impl Located for Location {
    fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub url: String,
    pub storage_reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationParameters {
    pub method: String,
    pub madhab_type: String,
    pub iqamah_calculation_rules: IqamahCalculationRules,
    pub advanced_settings: AdvancedSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IqamahCalculationRules {
    pub fajr: IqamahRule,
    pub dhuhr: IqamahRule,
    pub asr: IqamahRule,
    pub maghrib: IqamahRule,
    pub isha: IqamahRule,
}

/// When the congregational prayer starts relative to the prayer time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IqamahRule {
    pub prayer_type: String,
    /// "Variable" or "Fixed"
    #[serde(rename = "type")]
    pub rule_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes_after: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_rule: Option<String>,
    pub fajr_angle: f64,
    pub isha_angle: f64,
    pub prayer_adjustments: PrayerAdjustments,
}

/// Per-prayer offsets in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrayerAdjustments {
    pub fajr: i32,
    pub sunrise: i32,
    pub dhuhr: i32,
    pub asr: i32,
    pub maghrib: i32,
    pub isha: i32,
}

/// Body of a successful nearby lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyMosquesResponse {
    pub mosques: Vec<Mosque>,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }

    /// An error with no detail message, as the 404 fallback sends.
    pub fn bare(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }
}
