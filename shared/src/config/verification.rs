//! Settings surface consumed by the verification core
//!
//! Every group is injected into the component that needs it at construction time.
//! Defaults mirror what a fresh installation ships with.

use serde::{Deserialize, Serialize};

/// All verification settings grouped by concern
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VerificationSettings {
    #[serde(default)]
    pub general: GeneralSettings,

    #[serde(default)]
    pub va_api: VaApiSettings,

    #[serde(default)]
    pub military_otp: MilitaryOtpSettings,

    #[serde(default)]
    pub queue: QueueSettings,

    #[serde(default)]
    pub security: SecuritySettings,

    #[serde(default)]
    pub audit: AuditSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Days a verification stays valid; 0 never expires
    #[serde(default = "default_reverification_interval_days")]
    pub reverification_interval_days: u32,

    /// UNSAFE: stores pending payloads as plain base64. Testing only.
    #[serde(default)]
    pub disable_encryption: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            reverification_interval_days: default_reverification_interval_days(),
            disable_encryption: false,
        }
    }
}

/// Veteran confirmation API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VaApiSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub api_key: String,

    /// Custom endpoint, used only when `sandbox` is off
    #[serde(default)]
    pub api_url: String,

    #[serde(default = "default_true")]
    pub sandbox: bool,

    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VaApiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            api_url: String::new(),
            sandbox: true,
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

/// How strictly an email local part must correlate with the subject's name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NameMatchMode {
    #[default]
    None,
    First,
    Both,
}

impl NameMatchMode {
    pub fn is_required(&self) -> bool {
        !matches!(self, NameMatchMode::None)
    }
}

/// Email OTP settings for active-duty military verification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawMilitaryOtpSettings")]
pub struct MilitaryOtpSettings {
    pub enabled: bool,

    /// Comma-separated glob patterns an address must match
    pub whitelist: String,

    /// Comma-separated glob patterns that always reject an address
    pub blacklist: String,

    pub otp_expiry_minutes: u32,

    pub name_match: NameMatchMode,
}

impl Default for MilitaryOtpSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            whitelist: default_whitelist(),
            blacklist: default_blacklist(),
            otp_expiry_minutes: default_otp_expiry_minutes(),
            name_match: NameMatchMode::None,
        }
    }
}

/// Wire shape that still accepts the legacy `require_name_match` flag
#[derive(Deserialize)]
struct RawMilitaryOtpSettings {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_whitelist")]
    whitelist: String,
    #[serde(default = "default_blacklist")]
    blacklist: String,
    #[serde(default = "default_otp_expiry_minutes")]
    otp_expiry_minutes: u32,
    #[serde(default)]
    name_match: Option<NameMatchMode>,
    #[serde(default)]
    require_name_match: Option<bool>,
}

impl From<RawMilitaryOtpSettings> for MilitaryOtpSettings {
    fn from(raw: RawMilitaryOtpSettings) -> Self {
        let name_match = match (raw.name_match, raw.require_name_match) {
            (Some(mode), _) => mode,
            (None, Some(true)) => NameMatchMode::Both,
            (None, _) => NameMatchMode::None,
        };

        Self {
            enabled: raw.enabled,
            whitelist: raw.whitelist,
            blacklist: raw.blacklist,
            otp_expiry_minutes: raw.otp_expiry_minutes,
            name_match,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueSettings {
    /// Minimum hours between two retries of the same record
    #[serde(default = "default_retry_interval_hours")]
    pub retry_interval_hours: u32,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Period of the scheduled sweep
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            retry_interval_hours: default_retry_interval_hours(),
            max_retries: default_max_retries(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Lockout thresholds per verification type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecuritySettings {
    #[serde(default = "default_true")]
    pub enable_lockout: bool,

    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_veteran_attempts: u32,

    #[serde(default = "default_lockout_minutes")]
    pub veteran_lockout_minutes: u32,

    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_military_attempts: u32,

    #[serde(default = "default_lockout_minutes")]
    pub military_lockout_minutes: u32,

    #[serde(default = "default_true")]
    pub send_lockout_notification: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            enable_lockout: true,
            max_failed_veteran_attempts: default_max_failed_attempts(),
            veteran_lockout_minutes: default_lockout_minutes(),
            max_failed_military_attempts: default_max_failed_attempts(),
            military_lockout_minutes: default_lockout_minutes(),
            send_lockout_notification: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditSettings {
    /// Entries older than this are pruned; 0 keeps everything
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_reverification_interval_days() -> u32 {
    365
}

fn default_api_timeout_secs() -> u64 {
    30
}

fn default_whitelist() -> String {
    String::from("*.mil")
}

fn default_blacklist() -> String {
    String::from("*ctr.mil,*civ.mil")
}

fn default_otp_expiry_minutes() -> u32 {
    15
}

fn default_retry_interval_hours() -> u32 {
    1
}

fn default_max_retries() -> u32 {
    5
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_max_failed_attempts() -> u32 {
    5
}

fn default_lockout_minutes() -> u32 {
    60
}

fn default_retention_days() -> u32 {
    30
}

fn default_max_entries() -> usize {
    500
}
