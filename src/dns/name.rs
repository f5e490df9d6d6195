//! Normalized domain names.
//!
//! Every name handled by the store is kept in its fully-qualified form:
//! lowercase, trailing dot, no empty labels. Two spellings of the same name
//! (`WWW.Example.com` and `www.example.com.`) therefore compare equal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error_handling::DomainNameError;

/// Maximum length of a single label in octets (RFC 1035).
const MAX_LABEL_LEN: usize = 63;

/// Maximum length of a full name in octets, without the trailing dot.
const MAX_NAME_LEN: usize = 253;

/// A fully-qualified, lowercase domain name ending with a dot.
///
/// The root zone is represented as `"."`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainName(String);

impl DomainName {
    /// Parses and normalizes a domain name.
    ///
    /// Surrounding whitespace is ignored, letters are lowercased and a trailing
    /// dot is appended when missing.
    ///
    /// # Errors
    ///
    /// Returns a `DomainNameError` if the input is empty, contains an empty
    /// label (`a..b`), or exceeds the label or name length limits.
    pub fn new(raw: &str) -> Result<Self, DomainNameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainNameError::Empty);
        }
        if trimmed == "." {
            return Ok(Self::root());
        }

        let lowered = trimmed.to_ascii_lowercase();
        let without_dot = lowered.strip_suffix('.').unwrap_or(lowered.as_str());
        if without_dot.len() > MAX_NAME_LEN {
            return Err(DomainNameError::TooLong(trimmed.to_string()));
        }
        for label in without_dot.split('.') {
            if label.is_empty() {
                return Err(DomainNameError::EmptyLabel(trimmed.to_string()));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DomainNameError::LabelTooLong(trimmed.to_string()));
            }
            if label.chars().any(|c| c.is_whitespace()) {
                return Err(DomainNameError::InvalidCharacter(trimmed.to_string()));
            }
        }

        Ok(Self(format!("{without_dot}.")))
    }

    /// The root name `"."`.
    pub fn root() -> Self {
        Self(".".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "."
    }

    /// Number of labels, the root having zero.
    pub fn label_count(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.trim_end_matches('.').split('.').count()
        }
    }

    /// Returns `true` for top-level domains such as `com.`.
    pub fn is_tld(&self) -> bool {
        self.label_count() == 1
    }

    /// The name without its leftmost label, or `None` for the root.
    pub fn parent(&self) -> Option<DomainName> {
        if self.is_root() {
            return None;
        }
        match self.0.split_once('.') {
            Some((_, rest)) if !rest.is_empty() => Some(Self(rest.to_string())),
            _ => Some(Self::root()),
        }
    }

    /// All names of the hierarchy from the root down to this name (inclusive).
    ///
    /// `www.example.com.` yields `.`, `com.`, `example.com.`, `www.example.com.`.
    pub fn ancestors(&self) -> Vec<DomainName> {
        let mut chain = vec![self.clone()];
        let mut current = self.parent();
        while let Some(name) = current {
            current = name.parent();
            chain.push(name);
        }
        chain.reverse();
        chain
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DomainName {
    type Err = DomainNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for DomainName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DomainName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DomainName::new(&raw).map_err(serde::de::Error::custom)
    }
}
