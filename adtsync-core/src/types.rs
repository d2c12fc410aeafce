//! Domain types shared by every adtsync crate.
//!
//! Locators are held as parsed [`Url`]s once resolved; raw user input stays a `String`
//! until it passes through [`crate::resolver`].

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Filesystem-safe display name derived from an object URL.
///
/// Not unique across a run; used for output naming and logs only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label(pub String);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Transport request number (`corrNr`) grouping the changes of a writeback run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransportRequest(pub String);

impl TransportRequest {
    /// Returns `None` for an empty or whitespace-only value.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What a run does with the normalized source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Save the normalized source into the output directory.
    #[default]
    Test,
    /// Write the normalized source back and activate it.
    Writeback,
    /// Write the normalized source back, leave it inactive.
    WritebackNoact,
}

impl RunMode {
    /// Whether the mode sends state-changing requests (and so needs a CSRF token).
    pub fn writes(self) -> bool {
        matches!(self, RunMode::Writeback | RunMode::WritebackNoact)
    }

    pub fn activates(self) -> bool {
        matches!(self, RunMode::Writeback)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Test => write!(f, "test"),
            RunMode::Writeback => write!(f, "writeback"),
            RunMode::WritebackNoact => write!(f, "writeback-noact"),
        }
    }
}

/// Which of the two activation endpoints to call after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationProtocol {
    /// Central `/sap/bc/adt/activation` service with an object-reference envelope.
    #[default]
    Service,
    /// Per-object `<object>/activation` endpoint.
    Direct,
}

impl fmt::Display for ActivationProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationProtocol::Service => write!(f, "service"),
            ActivationProtocol::Direct => write!(f, "direct"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One object text endpoint to process. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Absolute URL of the object's text endpoint (usually `.../source/main`).
    pub url: Url,
    pub label: Label,
    /// The URL as reported in logs and retry lists: an absolute locator
    /// exactly as written, otherwise the resolved URL.
    pub locator: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(Label::from("Z_TEST1").to_string(), "Z_TEST1");
        assert_eq!(
            TransportRequest::parse("DEVK900123").unwrap().to_string(),
            "DEVK900123"
        );
    }

    #[test]
    fn blank_transport_request_is_none() {
        assert!(TransportRequest::parse("").is_none());
        assert!(TransportRequest::parse("   ").is_none());
        assert_eq!(
            TransportRequest::parse(" DEVK900123 ").unwrap().as_str(),
            "DEVK900123"
        );
    }

    #[test]
    fn only_writeback_modes_write() {
        assert!(!RunMode::Test.writes());
        assert!(RunMode::Writeback.writes());
        assert!(RunMode::WritebackNoact.writes());
        assert!(RunMode::Writeback.activates());
        assert!(!RunMode::WritebackNoact.activates());
    }

    #[test]
    fn enum_display_matches_serde_names() {
        assert_eq!(RunMode::WritebackNoact.to_string(), "writeback-noact");
        let yaml = serde_yaml::to_string(&RunMode::WritebackNoact).unwrap();
        assert_eq!(yaml.trim(), "writeback-noact");
        assert_eq!(ActivationProtocol::Direct.to_string(), "direct");
    }
}
