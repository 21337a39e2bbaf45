use async_trait::async_trait;

use crate::domain::entities::{SubjectContact, VerificationType, VerifiedStatus};

/// Verified flag storage owned by the host.
///
/// Written only by the verification core; read by anything that checks status.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_verified(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
    ) -> Result<Option<VerifiedStatus>, String>;

    /// `None` clears the flag and its timestamp
    async fn set_verified(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
        status: Option<VerifiedStatus>,
    ) -> Result<(), String>;

    async fn get_contact(&self, subject_id: &str) -> Result<Option<SubjectContact>, String>;

    /// Host-side sync of the subject's name and address
    async fn set_contact(&self, subject_id: &str, contact: SubjectContact) -> Result<(), String>;
}
