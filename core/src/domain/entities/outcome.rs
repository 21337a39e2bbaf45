//! Results handed back to the host for each user-facing operation.

use serde::{Deserialize, Serialize};

/// Reason code returned by the confirmation API, plus internal terminal reasons
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DenialReason {
    PersonNotFound,
    NotTitle38,
    MoreResearchRequired,
    /// Upstream could not decide; the only retryable reason
    Error,
    MaxRetriesExceeded,
    Other(String),
}

impl DenialReason {
    pub fn as_str(&self) -> &str {
        match self {
            Self::PersonNotFound => "PERSON_NOT_FOUND",
            Self::NotTitle38 => "NOT_TITLE_38",
            Self::MoreResearchRequired => "MORE_RESEARCH_REQUIRED",
            Self::Error => "ERROR",
            Self::MaxRetriesExceeded => "MAX_RETRIES_EXCEEDED",
            Self::Other(code) => code,
        }
    }

    pub fn parse(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "PERSON_NOT_FOUND" => Self::PersonNotFound,
            "NOT_TITLE_38" => Self::NotTitle38,
            "MORE_RESEARCH_REQUIRED" => Self::MoreResearchRequired,
            "ERROR" | "" => Self::Error,
            "MAX_RETRIES_EXCEEDED" => Self::MaxRetriesExceeded,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::PersonNotFound => "We could not find a veteran record matching the information provided.",
            Self::NotTitle38 => "The service record found does not meet the Title 38 definition of a veteran.",
            Self::MoreResearchRequired => "Your record requires additional research before it can be confirmed.",
            Self::Error => "The verification service could not complete the request.",
            Self::MaxRetriesExceeded => "We were unable to complete your verification after several attempts.",
            Self::Other(_) => "Your veteran status could not be confirmed.",
        }
    }
}

impl From<String> for DenialReason {
    fn from(code: String) -> Self {
        Self::parse(&code)
    }
}

impl From<DenialReason> for String {
    fn from(reason: DenialReason) -> Self {
        reason.as_str().to_string()
    }
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict of one confirmation API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Confirmed,
    NotConfirmed(DenialReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmissionOutcome {
    Approved,
    /// Persisted for the scheduler to retry
    Queued,
    Denied { reason: DenialReason, message: String },
}

impl SubmissionOutcome {
    pub fn denied(reason: DenialReason) -> Self {
        let message = reason.description().to_string();
        Self::Denied { reason, message }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpVerifyOutcome {
    Approved,
    Invalid,
}

/// Acknowledgement that a code was issued and handed to the mail transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpReceipt {
    pub expires_in_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,
}
