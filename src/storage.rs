//! SQLite storage layer for Flare.
//!
//! Incidents live in a single `incidents` table keyed by `incident_id`; every
//! operation is a point read or write on that primary key. Coordinates are
//! persisted as scaled integers (degrees × 10⁴) and timestamps as RFC 3339
//! text, so a row round-trips byte-for-byte.
//!
//! The status update is a single `UPDATE … RETURNING` statement: the backend
//! sets the new status and the refreshed `updated_at` and hands back the
//! complete post-update row in one round trip, with no read-modify-write on
//! the caller's side. A missing key surfaces as [`Error::NotFound`], never as
//! a backend failure.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};

use crate::error::Error;
use crate::geo::Coordinate;
use crate::model::IncidentRecord;

/// Database connection pool wrapper.
///
/// Constructed once at startup and cloned into the application state; the
/// pool is safe for concurrent use across request handlers.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Create a new storage instance and initialize the schema.
    ///
    /// # Arguments
    ///
    /// * `database_url` - SQLite connection string (e.g., "sqlite:flare.db" or "sqlite::memory:")
    pub async fn new(database_url: &str) -> Result<Self, Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let storage = Self { pool };
        storage.initialize_schema().await?;

        Ok(storage)
    }

    /// Create the incidents table if it doesn't exist.
    async fn initialize_schema(&self) -> Result<(), Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS incidents (
                incident_id TEXT PRIMARY KEY,
                latitude INTEGER NOT NULL,
                longitude INTEGER NOT NULL,
                incident_type TEXT NOT NULL,
                severity TEXT NOT NULL,
                user_id TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persist a new incident record.
    ///
    /// Unconditional insert-or-overwrite by primary key. There is no
    /// pre-existence check; callers hand in freshly generated identifiers.
    pub async fn create_incident(&self, record: &IncidentRecord) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO incidents
                (incident_id, latitude, longitude, incident_type, severity,
                 user_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.incident_id)
        .bind(record.latitude.scaled())
        .bind(record.longitude.scaled())
        .bind(&record.incident_type)
        .bind(&record.severity)
        .bind(&record.user_id)
        .bind(&record.status)
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Point lookup by incident id.
    ///
    /// Returns `None` when the key does not exist; that is a normal outcome,
    /// not an error. [`Error::Storage`] is reserved for backend failure,
    /// including a stored row that no longer decodes.
    pub async fn get_incident(&self, incident_id: &str) -> Result<Option<IncidentRecord>, Error> {
        let row = sqlx::query(
            r#"
            SELECT incident_id, latitude, longitude, incident_type, severity,
                   user_id, status, created_at, updated_at
            FROM incidents
            WHERE incident_id = ?
            "#,
        )
        .bind(incident_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| record_from_row(&r)).transpose()
    }

    /// Atomically set an incident's status and refresh its update timestamp.
    ///
    /// A single conditional statement performs the whole mutation and returns
    /// the post-update row; `updated_at` is computed here, at execution time.
    /// All other fields are untouched.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when no incident with this id exists at update
    /// time; [`Error::Storage`] on backend failure.
    pub async fn update_status(
        &self,
        incident_id: &str,
        status: &str,
    ) -> Result<IncidentRecord, Error> {
        let updated_at = Utc::now();

        let row = sqlx::query(
            r#"
            UPDATE incidents
            SET status = ?, updated_at = ?
            WHERE incident_id = ?
            RETURNING incident_id, latitude, longitude, incident_type, severity,
                      user_id, status, created_at, updated_at
            "#,
        )
        .bind(status)
        .bind(updated_at.to_rfc3339())
        .bind(incident_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => record_from_row(&row),
            None => Err(Error::NotFound(incident_id.to_string())),
        }
    }
}

/// Decode a database row into an [`IncidentRecord`].
fn record_from_row(row: &SqliteRow) -> Result<IncidentRecord, Error> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: Option<String> = row.try_get("updated_at")?;

    Ok(IncidentRecord {
        incident_id: row.try_get("incident_id")?,
        latitude: Coordinate::from_scaled(row.try_get("latitude")?),
        longitude: Coordinate::from_scaled(row.try_get("longitude")?),
        incident_type: row.try_get("incident_type")?,
        severity: row.try_get("severity")?,
        user_id: row.try_get("user_id")?,
        status: row.try_get("status")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: updated_at.as_deref().map(parse_timestamp).transpose()?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("malformed timestamp {raw:?}: {e}")))
}
