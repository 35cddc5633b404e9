// src/target.rs
use std::fmt;
use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{OsintError, OsintResult};

#[cfg(test)]
use mockall::automock;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern is valid")
});

/// The kind of identifier a run is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Email,
    Ip,
    Username,
}

impl TargetKind {
    pub const ALL: [TargetKind; 3] = [TargetKind::Email, TargetKind::Ip, TargetKind::Username];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Email => "email",
            TargetKind::Ip => "ip",
            TargetKind::Username => "username",
        }
    }

    /// Folder used when a session is not given an output destination.
    pub fn default_output_dir(&self) -> &'static str {
        match self {
            TargetKind::Email => "email_results",
            TargetKind::Ip => "trace_results",
            TargetKind::Username => "username_results",
        }
    }

    /// Leading component of artifact filenames.
    pub fn artifact_prefix(&self) -> &'static str {
        match self {
            TargetKind::Email => "EmailLog",
            TargetKind::Ip => "TraceLog",
            TargetKind::Username => "UsernameLog",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated reconnaissance target. Immutable once accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Email(String),
    Ip(IpAddr),
    Username(String),
}

impl Target {
    /// Parse and validate a raw value for the given kind.
    pub fn parse(kind: TargetKind, raw: &str) -> OsintResult<Self> {
        let value = raw.trim();
        let invalid = || OsintError::Validation {
            kind,
            value: raw.to_string(),
        };

        match kind {
            TargetKind::Email => {
                if EMAIL_PATTERN.is_match(value) {
                    Ok(Target::Email(value.to_string()))
                } else {
                    Err(invalid())
                }
            }
            TargetKind::Ip => value.parse::<IpAddr>().map(Target::Ip).map_err(|_| invalid()),
            TargetKind::Username => {
                if is_plausible_username(value) {
                    Ok(Target::Username(value.to_string()))
                } else {
                    Err(invalid())
                }
            }
        }
    }

    /// Wrap a value whose format was already accepted by a [`Validator`].
    ///
    /// Only IP values still need to parse; `None` when they do not.
    pub fn from_validated(kind: TargetKind, raw: &str) -> Option<Self> {
        let value = raw.trim();
        match kind {
            TargetKind::Email => Some(Target::Email(value.to_string())),
            TargetKind::Ip => value.parse().ok().map(Target::Ip),
            TargetKind::Username => Some(Target::Username(value.to_string())),
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            Target::Email(_) => TargetKind::Email,
            Target::Ip(_) => TargetKind::Ip,
            Target::Username(_) => TargetKind::Username,
        }
    }

    /// The raw identifier as text.
    pub fn value(&self) -> String {
        match self {
            Target::Email(email) => email.clone(),
            Target::Ip(ip) => ip.to_string(),
            Target::Username(name) => name.clone(),
        }
    }

    /// Domain part of an email target.
    pub fn email_domain(&self) -> Option<&str> {
        match self {
            Target::Email(email) => email.rsplit_once('@').map(|(_, domain)| domain),
            _ => None,
        }
    }

    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            Target::Ip(ip) => Some(*ip),
            _ => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.value())
    }
}

fn is_plausible_username(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(|c| c.is_whitespace() || c == '/')
}

/// Format check run before any dispatch.
#[cfg_attr(test, automock)]
pub trait Validator: Send + Sync {
    fn is_valid(&self, kind: TargetKind, raw: &str) -> bool;
}

/// Default syntactic validator
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatValidator;

impl Validator for FormatValidator {
    fn is_valid(&self, kind: TargetKind, raw: &str) -> bool {
        Target::parse(kind, raw).is_ok()
    }
}
