//! Data models for Flare.
//!
//! Two families of types live here:
//!
//! - **API shapes**: the request/response bodies spoken over HTTP. Their
//!   enums are closed sets, so an unknown incident type, severity, or status
//!   is rejected during deserialization before any handler runs.
//! - **The stored record**: [`IncidentRecord`], the canonical row persisted
//!   by the storage layer. Enum-valued fields are kept as their canonical
//!   strings there, mirroring what the database holds; the mapping layer
//!   re-validates them on the way back out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo::Coordinate;

/// Category of a reported incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentType {
    Fire,
    Flood,
    Earthquake,
    Criminal,
    Other,
}

impl IncidentType {
    /// Canonical string form, as persisted by storage.
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentType::Fire => "Fire",
            IncidentType::Flood => "Flood",
            IncidentType::Earthquake => "Earthquake",
            IncidentType::Criminal => "Criminal",
            IncidentType::Other => "Other",
        }
    }

    /// Parse a canonical string back into the closed set.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Fire" => Some(IncidentType::Fire),
            "Flood" => Some(IncidentType::Flood),
            "Earthquake" => Some(IncidentType::Earthquake),
            "Criminal" => Some(IncidentType::Criminal),
            "Other" => Some(IncidentType::Other),
            _ => None,
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity level of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Low" => Some(Severity::Low),
            "Medium" => Some(Severity::Medium),
            "High" => Some(Severity::High),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an incident.
///
/// Every incident starts as `Reported`. Any validated status may follow any
/// other; there is no enforced transition graph (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentStatus {
    Reported,
    #[serde(rename = "Verification in Progress")]
    VerificationInProgress,
    Duplicate,
    Verified,
    Resolved,
}

impl IncidentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentStatus::Reported => "Reported",
            IncidentStatus::VerificationInProgress => "Verification in Progress",
            IncidentStatus::Duplicate => "Duplicate",
            IncidentStatus::Verified => "Verified",
            IncidentStatus::Resolved => "Resolved",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Reported" => Some(IncidentStatus::Reported),
            "Verification in Progress" => Some(IncidentStatus::VerificationInProgress),
            "Duplicate" => Some(IncidentStatus::Duplicate),
            "Verified" => Some(IncidentStatus::Verified),
            "Resolved" => Some(IncidentStatus::Resolved),
            _ => None,
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geographic location of an incident, in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IncidentLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Request body for POST /api/incident/report.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportIncidentRequest {
    /// Where the incident occurred.
    pub location: IncidentLocation,

    /// The category of the incident (e.g. Fire, Flood).
    #[serde(rename = "type")]
    pub incident_type: IncidentType,

    /// How severe the incident is.
    pub severity: Severity,

    /// Identifier of the reporting user. Must be non-empty.
    pub user_id: String,
}

/// Request body for PATCH /api/incident/{incident_id}.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    /// The new status for the incident.
    pub status: IncidentStatus,
}

/// Full incident detail returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentDetail {
    pub incident_id: String,
    pub location: IncidentLocation,
    #[serde(rename = "type")]
    pub incident_type: IncidentType,
    pub severity: Severity,
    pub user_id: String,
    pub status: IncidentStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The stored representation of an incident.
///
/// Owned exclusively by the storage layer once persisted; everything else
/// works on transient copies. `incident_id`, the coordinates, the type, the
/// severity, and `user_id` are immutable after creation. Only the status
/// update touches `status` and `updated_at`; `updated_at` stays absent until
/// the first update.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRecord {
    pub incident_id: String,
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub incident_type: String,
    pub severity: String,
    pub user_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
