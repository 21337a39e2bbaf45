//! Process-local implementation of ProfileRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::ProfileRepository;
use crate::domain::entities::{SubjectContact, VerificationType, VerifiedStatus};

#[derive(Default)]
pub struct InMemoryProfileRepository {
    verified: RwLock<HashMap<(String, VerificationType), VerifiedStatus>>,
    contacts: RwLock<HashMap<String, SubjectContact>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_contact(&self, subject_id: &str, contact: SubjectContact) {
        self.contacts
            .write()
            .await
            .insert(subject_id.to_string(), contact);
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn get_verified(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
    ) -> Result<Option<VerifiedStatus>, String> {
        Ok(self
            .verified
            .read()
            .await
            .get(&(subject_id.to_string(), verification_type))
            .copied())
    }

    async fn set_verified(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
        status: Option<VerifiedStatus>,
    ) -> Result<(), String> {
        let key = (subject_id.to_string(), verification_type);
        let mut verified = self.verified.write().await;
        match status {
            Some(status) => {
                verified.insert(key, status);
            }
            None => {
                verified.remove(&key);
            }
        }
        Ok(())
    }

    async fn get_contact(&self, subject_id: &str) -> Result<Option<SubjectContact>, String> {
        Ok(self.contacts.read().await.get(subject_id).cloned())
    }

    async fn set_contact(&self, subject_id: &str, contact: SubjectContact) -> Result<(), String> {
        self.upsert_contact(subject_id, contact).await;
        Ok(())
    }
}
