//! Templated notifications delivered through the host's mail transport

mod memory;
mod notifier;
mod templates;
mod traits;

pub use memory::{RecordingMailService, SentMail};
pub use notifier::Notifier;
pub use templates::{render, EmailTemplate, Notification};
pub use traits::MailService;
