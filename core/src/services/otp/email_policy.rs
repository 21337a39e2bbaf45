//! Which addresses may receive a military verification code

use mv_shared::config::{MilitaryOtpSettings, NameMatchMode};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{DomainError, DomainResult};

static LOCAL_PART_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[._\-]+").expect("separator regex is valid"));

/// Compile a `*`/`?` glob into an anchored, case-insensitive regex
pub fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let escaped = regex::escape(pattern.trim());
    let translated = escaped.replace(r"\*", ".*").replace(r"\?", ".");
    Regex::new(&format!("(?i)^{}$", translated))
}

fn compile_list(csv: &str) -> DomainResult<Vec<Regex>> {
    csv.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            glob_to_regex(p).map_err(|e| {
                DomainError::configuration(format!("Invalid email pattern '{}': {}", p, e))
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct EmailPolicy {
    whitelist: Vec<Regex>,
    blacklist: Vec<Regex>,
    name_match: NameMatchMode,
}

impl EmailPolicy {
    pub fn from_settings(settings: &MilitaryOtpSettings) -> DomainResult<Self> {
        Ok(Self {
            whitelist: compile_list(&settings.whitelist)?,
            blacklist: compile_list(&settings.blacklist)?,
            name_match: settings.name_match,
        })
    }

    pub fn name_match(&self) -> NameMatchMode {
        self.name_match
    }

    /// Deny-list first, then allow-list; anything unmatched is ineligible
    pub fn is_eligible_email(&self, email: &str) -> bool {
        let email = email.trim();
        if self.blacklist.iter().any(|re| re.is_match(email)) {
            return false;
        }
        self.whitelist.iter().any(|re| re.is_match(email))
    }

    /// Loose correlation between the address local part and the subject's name.
    /// Tokens match when either contains the other, so initials and suffixes pass.
    pub fn matches_identity(&self, email: &str, first_name: &str, last_name: &str) -> bool {
        if self.name_match == NameMatchMode::None {
            return true;
        }

        let local_part = match email.trim().split_once('@') {
            Some((local, _)) => local.to_lowercase(),
            None => return false,
        };
        let first_name = first_name.trim().to_lowercase();
        let last_name = last_name.trim().to_lowercase();

        match self.name_match {
            NameMatchMode::Both if first_name.is_empty() || last_name.is_empty() => return false,
            NameMatchMode::First if first_name.is_empty() => return false,
            _ => {}
        }

        let without_digits: String = local_part.chars().filter(|c| !c.is_ascii_digit()).collect();
        let tokens: Vec<&str> = LOCAL_PART_SEPARATORS
            .split(&without_digits)
            .filter(|t| !t.is_empty())
            .collect();

        let correlates = |name: &str| {
            !name.is_empty()
                && tokens
                    .iter()
                    .any(|token| token.contains(name) || name.contains(token))
        };

        match self.name_match {
            NameMatchMode::Both => correlates(&first_name) && correlates(&last_name),
            NameMatchMode::First => correlates(&first_name),
            NameMatchMode::None => true,
        }
    }
}
