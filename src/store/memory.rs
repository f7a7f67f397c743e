use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::registration::Email;
use crate::models::{sort_newest_first, NewRegistration, Registration};

use super::{RegistrationStore, StoreError};

/// Registrations held in process memory, keyed by normalized email.
#[derive(Default)]
pub struct InMemoryRegistrationStore {
    records: RwLock<HashMap<String, Registration>>,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Registration>, StoreError> {
        Ok(self.records.read().await.get(email.as_str()).cloned())
    }

    async fn create(&self, registration: NewRegistration) -> Result<Registration, StoreError> {
        let mut records = self.records.write().await;

        if records.contains_key(registration.email.as_str()) {
            return Err(StoreError::ConstraintViolation {
                email: registration.email.into_inner(),
            });
        }

        let record = Registration::create(registration, Utc::now());
        records.insert(record.email.clone(), record.clone());

        tracing::debug!(
            registration_id = %record.id,
            total = records.len(),
            "Stored registration in memory"
        );

        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<Registration>, StoreError> {
        let mut all: Vec<Registration> = self.records.read().await.values().cloned().collect();
        sort_newest_first(&mut all);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registration::PersonName;
    use std::time::Duration;

    fn candidate(name: &str, email: &str) -> NewRegistration {
        NewRegistration {
            name: PersonName::parse(name).unwrap(),
            email: Email::parse(email).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let store = InMemoryRegistrationStore::new();
        let created = store.create(candidate("Jo", "jo@x.com")).await.unwrap();

        let found = store
            .find_by_email(&Email::parse("JO@x.com").unwrap())
            .await
            .unwrap();

        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_duplicate_create_is_constraint_violation() {
        let store = InMemoryRegistrationStore::new();
        store.create(candidate("Jo", "jo@x.com")).await.unwrap();

        let result = store.create(candidate("Other", "jo@x.com")).await;

        assert!(matches!(result, Err(StoreError::ConstraintViolation { email }) if email == "jo@x.com"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let store = InMemoryRegistrationStore::new();
        for (name, email) in [("A", "a@x.com"), ("B", "b@x.com"), ("C", "c@x.com")] {
            store.create(candidate(name, email)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let all = store.list_all().await.unwrap();

        let names: Vec<&str> = all.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
        assert!(all.windows(2).all(|pair| pair[0].created_at > pair[1].created_at));
    }
}
