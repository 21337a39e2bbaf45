//! Outbound mail configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    /// Write messages to the log instead of delivering them
    Log,
    /// POST messages to an HTTP mail relay
    Http,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    #[serde(default = "default_provider")]
    pub provider: MailProvider,

    /// Relay endpoint, required for the HTTP provider
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_from_address")]
    pub from_address: String,

    /// Substituted for `{site_title}` in every template
    #[serde(default = "default_site_title")]
    pub site_title: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: String::new(),
            api_key: String::new(),
            from_address: default_from_address(),
            site_title: default_site_title(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_provider() -> MailProvider {
    MailProvider::Log
}

fn default_from_address() -> String {
    String::from("no-reply@localhost")
}

fn default_site_title() -> String {
    String::from("Store")
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}
