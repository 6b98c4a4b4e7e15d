//! Mapping between API shapes and the stored incident record.
//!
//! These are pure functions: no I/O, no shared state. Identifier and
//! timestamp generation in [`to_record`] are the only sources of
//! non-determinism.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::geo::Coordinate;
use crate::model::{
    IncidentDetail, IncidentLocation, IncidentRecord, IncidentStatus, IncidentType,
    ReportIncidentRequest, Severity,
};

/// Build a fresh storage record from a creation request.
///
/// Generates a new UUID v4 identifier, quantizes both coordinates to four
/// fractional digits, initializes the status to `Reported`, and stamps
/// `created_at` with the current UTC time. `updated_at` stays absent until
/// the first status update.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the reporter id is empty (after
/// trimming) or a coordinate is not a finite number.
pub fn to_record(request: &ReportIncidentRequest) -> Result<IncidentRecord, Error> {
    if request.user_id.trim().is_empty() {
        return Err(Error::Validation("user_id cannot be empty".to_string()));
    }

    Ok(IncidentRecord {
        incident_id: Uuid::new_v4().to_string(),
        latitude: Coordinate::quantize(request.location.latitude)?,
        longitude: Coordinate::quantize(request.location.longitude)?,
        incident_type: request.incident_type.as_str().to_string(),
        severity: request.severity.as_str().to_string(),
        user_id: request.user_id.clone(),
        status: IncidentStatus::Reported.as_str().to_string(),
        created_at: Utc::now(),
        updated_at: None,
    })
}

/// Convert a stored record into the API detail shape.
///
/// Stored enum fields are re-validated against their closed sets; a row whose
/// type, severity, or status has drifted outside the known values is reported
/// as [`Error::Mapping`] instead of being returned.
pub fn to_detail(record: &IncidentRecord) -> Result<IncidentDetail, Error> {
    let incident_type = IncidentType::parse(&record.incident_type).ok_or_else(|| {
        Error::Mapping(format!(
            "incident {} has unknown type {:?}",
            record.incident_id, record.incident_type
        ))
    })?;
    let severity = Severity::parse(&record.severity).ok_or_else(|| {
        Error::Mapping(format!(
            "incident {} has unknown severity {:?}",
            record.incident_id, record.severity
        ))
    })?;
    let status = IncidentStatus::parse(&record.status).ok_or_else(|| {
        Error::Mapping(format!(
            "incident {} has unknown status {:?}",
            record.incident_id, record.status
        ))
    })?;

    Ok(IncidentDetail {
        incident_id: record.incident_id.clone(),
        location: IncidentLocation {
            latitude: record.latitude.to_f64(),
            longitude: record.longitude.to_f64(),
        },
        incident_type,
        severity,
        user_id: record.user_id.clone(),
        status,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

/// Apply a status change to a record, in memory.
///
/// Replaces `status` and sets `updated_at` to `now`; every other field is
/// copied unchanged. The storage layer's atomic update performs exactly this
/// transform server-side, so the two stay in agreement on which fields a
/// status update touches.
pub fn apply_status(
    record: &IncidentRecord,
    status: IncidentStatus,
    now: DateTime<Utc>,
) -> IncidentRecord {
    IncidentRecord {
        status: status.as_str().to_string(),
        updated_at: Some(now),
        ..record.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IncidentLocation, Severity};

    fn sample_request() -> ReportIncidentRequest {
        ReportIncidentRequest {
            location: IncidentLocation {
                latitude: 53.3498,
                longitude: -6.2603,
            },
            incident_type: IncidentType::Fire,
            severity: Severity::High,
            user_id: "user123".to_string(),
        }
    }

    #[test]
    fn to_record_sets_creation_invariants() {
        let record = to_record(&sample_request()).unwrap();

        assert!(!record.incident_id.is_empty());
        assert!(Uuid::parse_str(&record.incident_id).is_ok());
        assert_eq!(record.status, "Reported");
        assert_eq!(record.updated_at, None);
        assert_eq!(record.latitude.scaled(), 533_498);
        assert_eq!(record.longitude.scaled(), -62_603);
        assert_eq!(record.incident_type, "Fire");
        assert_eq!(record.severity, "High");
        assert_eq!(record.user_id, "user123");
    }

    #[test]
    fn to_record_generates_distinct_ids() {
        let a = to_record(&sample_request()).unwrap();
        let b = to_record(&sample_request()).unwrap();
        assert_ne!(a.incident_id, b.incident_id);
    }

    #[test]
    fn to_record_rejects_empty_user_id() {
        let mut request = sample_request();
        request.user_id = String::new();
        assert!(matches!(to_record(&request), Err(Error::Validation(_))));

        request.user_id = "   ".to_string();
        assert!(matches!(to_record(&request), Err(Error::Validation(_))));
    }

    #[test]
    fn to_record_rejects_non_finite_coordinates() {
        let mut request = sample_request();
        request.location.latitude = f64::NAN;
        assert!(matches!(to_record(&request), Err(Error::Validation(_))));

        let mut request = sample_request();
        request.location.longitude = f64::INFINITY;
        assert!(matches!(to_record(&request), Err(Error::Validation(_))));
    }

    #[test]
    fn to_detail_round_trips_a_fresh_record() {
        let record = to_record(&sample_request()).unwrap();
        let detail = to_detail(&record).unwrap();

        assert_eq!(detail.incident_id, record.incident_id);
        assert!((detail.location.latitude - 53.3498).abs() < 1e-9);
        assert!((detail.location.longitude - -6.2603).abs() < 1e-9);
        assert_eq!(detail.incident_type, IncidentType::Fire);
        assert_eq!(detail.severity, Severity::High);
        assert_eq!(detail.status, IncidentStatus::Reported);
        assert_eq!(detail.created_at, record.created_at);
        assert_eq!(detail.updated_at, None);
    }

    #[test]
    fn to_detail_flags_drifted_type() {
        let mut record = to_record(&sample_request()).unwrap();
        record.incident_type = "Volcano".to_string();
        assert!(matches!(to_detail(&record), Err(Error::Mapping(_))));
    }

    #[test]
    fn to_detail_flags_drifted_status() {
        let mut record = to_record(&sample_request()).unwrap();
        record.status = "Closed".to_string();
        assert!(matches!(to_detail(&record), Err(Error::Mapping(_))));
    }

    #[test]
    fn apply_status_touches_only_status_and_updated_at() {
        let record = to_record(&sample_request()).unwrap();
        let now = Utc::now();

        let updated = apply_status(&record, IncidentStatus::Resolved, now);

        assert_eq!(updated.status, "Resolved");
        assert_eq!(updated.updated_at, Some(now));
        assert_eq!(updated.incident_id, record.incident_id);
        assert_eq!(updated.latitude, record.latitude);
        assert_eq!(updated.longitude, record.longitude);
        assert_eq!(updated.incident_type, record.incident_type);
        assert_eq!(updated.severity, record.severity);
        assert_eq!(updated.user_id, record.user_id);
        assert_eq!(updated.created_at, record.created_at);
    }
}
