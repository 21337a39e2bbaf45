//! Message templates and placeholder substitution

use crate::domain::entities::{DenialReason, VerificationType};

/// A message the core sends on its own initiative
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Approved {
        verification_type: VerificationType,
    },
    Denied {
        verification_type: VerificationType,
        reason: DenialReason,
    },
    Lockout {
        verification_type: VerificationType,
        minutes: u32,
    },
    Otp {
        code: String,
        expiry_minutes: u32,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct EmailTemplate {
    pub subject: &'static str,
    pub body: &'static str,
}

const APPROVED: EmailTemplate = EmailTemplate {
    subject: "Your {verification_type} status has been verified!",
    body: "Hi {customer_name},\n\n\
Your {verification_type} status has been verified. Your discount is now available on {site_title}.\n\n\
Thank you for your service.",
};

const DENIED: EmailTemplate = EmailTemplate {
    subject: "[{site_title}] {verification_type} verification update",
    body: "Hi {customer_name},\n\n\
We were unable to verify your {verification_type} status.\n\n\
Reason: {denial_reason}\n\n\
If you believe this is a mistake, please contact {site_title} support.",
};

const LOCKOUT: EmailTemplate = EmailTemplate {
    subject: "[{site_title}] Verification Lockout",
    body: "Hi {customer_name},\n\n\
Due to multiple failed {verification_type} verification attempts, further attempts are blocked for {lockout_duration} minutes.\n\n\
If this was not you, please contact {site_title} support.",
};

const OTP: EmailTemplate = EmailTemplate {
    subject: "[{site_title}] Your Military Verification Code",
    body: "Your verification code is: {otp_code}\n\n\
This code expires in {otp_expiry} minutes. If you did not request it, you can ignore this email.",
};

impl Notification {
    pub fn template(&self) -> EmailTemplate {
        match self {
            Notification::Approved { .. } => APPROVED,
            Notification::Denied { .. } => DENIED,
            Notification::Lockout { .. } => LOCKOUT,
            Notification::Otp { .. } => OTP,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Approved { .. } => "approved",
            Notification::Denied { .. } => "denied",
            Notification::Lockout { .. } => "lockout",
            Notification::Otp { .. } => "otp",
        }
    }

    /// Values specific to this message
    pub fn placeholders(&self) -> Vec<(&'static str, String)> {
        match self {
            Notification::Approved { verification_type } => {
                vec![("verification_type", verification_type.label().to_string())]
            }
            Notification::Denied {
                verification_type,
                reason,
            } => vec![
                ("verification_type", verification_type.label().to_string()),
                ("denial_reason", reason.description().to_string()),
            ],
            Notification::Lockout {
                verification_type,
                minutes,
            } => vec![
                ("verification_type", verification_type.label().to_string()),
                ("lockout_duration", minutes.to_string()),
            ],
            Notification::Otp {
                code,
                expiry_minutes,
            } => vec![
                ("otp_code", code.clone()),
                ("otp_expiry", expiry_minutes.to_string()),
            ],
        }
    }
}

/// Replace every `{name}` with its value; unknown placeholders are left as-is
pub fn render(template: &str, values: &[(&str, String)]) -> String {
    values.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{}}}", name), value)
    })
}
