use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use futures_util::TryStreamExt;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::value::{CqlValue, Row};
use uuid::Uuid;

use crate::domain::registration::Email;
use crate::models::{sort_newest_first, NewRegistration, Registration};

use super::{RegistrationStore, StoreError};

// ============================================================================
// ScyllaDB Registration Store
// ============================================================================
//
// One row per registration, partitioned by normalized email:
// - find_by_email is a single partition read
// - create is a lightweight transaction (INSERT ... IF NOT EXISTS), so the
//   table itself rejects a second row for the same email
// - list_all pages through the table and orders newest first in process
//
// ============================================================================

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS registrations (
        email text PRIMARY KEY,
        id uuid,
        name text,
        created_at timestamp,
        updated_at timestamp
    )";

const SELECT_BY_EMAIL: &str = "SELECT id, name, email, created_at, updated_at
     FROM registrations
     WHERE email = ?";

const SELECT_ALL: &str = "SELECT id, name, email, created_at, updated_at FROM registrations";

const INSERT_IF_NOT_EXISTS: &str = "INSERT INTO registrations (
        email, id, name, created_at, updated_at
    ) VALUES (?, ?, ?, ?, ?) IF NOT EXISTS";

type RegistrationRow = (Uuid, String, String, DateTime<Utc>, DateTime<Utc>);

pub struct ScyllaRegistrationStore {
    session: Arc<Session>,
}

impl ScyllaRegistrationStore {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Connect to `uri`, creating the keyspace and table when missing.
    ///
    /// `keyspace` is interpolated into CQL and must already be a validated
    /// identifier.
    pub async fn connect(uri: &str, keyspace: &str) -> anyhow::Result<Self> {
        tracing::info!(uri = %uri, "Connecting to ScyllaDB...");
        let session: Session = SessionBuilder::new().known_node(uri).build().await?;

        session
            .query_unpaged(
                format!(
                    "CREATE KEYSPACE IF NOT EXISTS {keyspace} WITH REPLICATION = \
                     {{'class': 'SimpleStrategy', 'replication_factor': 1}}"
                ),
                (),
            )
            .await?;

        session.use_keyspace(keyspace, false).await?;
        session.query_unpaged(CREATE_TABLE, ()).await?;

        tracing::info!(keyspace = %keyspace, "✅ Registration table ready");

        Ok(Self::new(Arc::new(session)))
    }
}

/// CQL `timestamp` keeps milliseconds; the returned record must match what a
/// later read yields.
fn storage_timestamp(now: DateTime<Utc>) -> DateTime<Utc> {
    now.trunc_subsecs(3)
}

/// LWT results lead with an `[applied]` column; when the insert lost, the
/// existing row's columns follow it.
fn lwt_applied(row: Option<Row>) -> bool {
    row.and_then(|row| row.columns.into_iter().next().flatten())
        .is_some_and(|value| matches!(value, CqlValue::Boolean(true)))
}

fn into_registration(row: RegistrationRow) -> Registration {
    let (id, name, email, created_at, updated_at) = row;
    Registration {
        id,
        name,
        email,
        created_at,
        updated_at,
    }
}

#[async_trait]
impl RegistrationStore for ScyllaRegistrationStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Registration>, StoreError> {
        let result = self
            .session
            .query_unpaged(SELECT_BY_EMAIL, (email.as_str(),))
            .await
            .map_err(StoreError::backend)?;

        let rows = result.into_rows_result().map_err(StoreError::backend)?;
        let row = rows
            .maybe_first_row::<RegistrationRow>()
            .map_err(StoreError::backend)?;

        Ok(row.map(into_registration))
    }

    async fn create(&self, registration: NewRegistration) -> Result<Registration, StoreError> {
        let record = Registration::create(registration, storage_timestamp(Utc::now()));

        let result = self
            .session
            .query_unpaged(
                INSERT_IF_NOT_EXISTS,
                (
                    record.email.as_str(),
                    record.id,
                    record.name.as_str(),
                    record.created_at,
                    record.updated_at,
                ),
            )
            .await
            .map_err(StoreError::backend)?;

        let rows = result.into_rows_result().map_err(StoreError::backend)?;
        let first = rows.maybe_first_row::<Row>().map_err(StoreError::backend)?;

        if !lwt_applied(first) {
            return Err(StoreError::ConstraintViolation {
                email: record.email,
            });
        }

        tracing::info!(
            registration_id = %record.id,
            "✅ Registration stored"
        );

        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<Registration>, StoreError> {
        let mut rows = self
            .session
            .query_iter(SELECT_ALL, ())
            .await
            .map_err(StoreError::backend)?
            .rows_stream::<RegistrationRow>()
            .map_err(StoreError::backend)?;

        let mut registrations = Vec::new();
        while let Some(row) = rows.try_next().await.map_err(StoreError::backend)? {
            registrations.push(into_registration(row));
        }

        sort_newest_first(&mut registrations);

        tracing::debug!("Loaded {} registrations", registrations.len());
        Ok(registrations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_storage_timestamp_keeps_milliseconds_only() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);

        let stored = storage_timestamp(now);

        assert_eq!(stored.nanosecond(), 123_000_000);
        assert_eq!(stored.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_lwt_applied() {
        let applied = Row {
            columns: vec![Some(CqlValue::Boolean(true))],
        };
        let lost = Row {
            columns: vec![
                Some(CqlValue::Boolean(false)),
                Some(CqlValue::Text("jo@x.com".to_string())),
            ],
        };
        let null = Row { columns: vec![None] };

        assert!(lwt_applied(Some(applied)));
        assert!(!lwt_applied(Some(lost)));
        assert!(!lwt_applied(Some(null)));
        assert!(!lwt_applied(Some(Row { columns: vec![] })));
        assert!(!lwt_applied(None));
    }
}
