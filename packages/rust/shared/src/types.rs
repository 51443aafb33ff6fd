//! Core domain types: company identity, session ids and the compiled report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SalesIntelError};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Normalized company key: surrounding whitespace trimmed, case-folded.
///
/// Two inputs differing only in case or surrounding whitespace map to the
/// same identity, and therefore to the same stored record.
///
/// Deserialization goes through [`Identity::parse`], so a hand-edited store
/// file cannot smuggle in an unnormalized or blank key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Derive the identity for a raw company name. Blank input is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SalesIntelError::validation(
                "company name must not be blank",
            ));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identity {
    type Error = SalesIntelError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display form of a company name: surrounding whitespace removed, case kept.
pub fn display_name(raw: &str) -> String {
    raw.trim().to_string()
}

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome tag carried by every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Success,
    Failed,
}

/// The compiled sales-outreach report. Immutable once compiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub identity: Identity,
    /// Company name as the user typed it (trimmed).
    pub display_name: String,
    pub generated_at: DateTime<Utc>,
    pub status: ReportStatus,
    /// Run that produced this report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Stage names in execution order.
    #[serde(default)]
    pub stages_used: Vec<String>,
    #[serde(default)]
    pub sections: ReportSections,
    /// Present only when `status` is `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl Report {
    /// A failure report: empty sections, `failed` status, and the reason.
    pub fn failed(
        identity: Identity,
        display_name: impl Into<String>,
        session_id: Option<SessionId>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            display_name: display_name.into(),
            generated_at: Utc::now(),
            status: ReportStatus::Failed,
            session_id,
            stages_used: Vec::new(),
            sections: ReportSections::default(),
            failure_reason: Some(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ReportStatus::Success
    }
}

/// Report body, one field per pipeline concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSections {
    pub company_profile: CompanyProfile,
    pub recent_news: Vec<String>,
    pub challenges: Vec<String>,
    pub opportunities: Vec<String>,
    pub approach: String,
    /// Raw analysis text as returned by the generator.
    pub full_analysis: String,
    pub total_contacts_found: usize,
    /// Highest-priority contacts, best first.
    pub contacts: Vec<Contact>,
    pub outreach: Vec<OutreachDraft>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    pub industry: String,
    pub size: String,
    pub founded: String,
    pub location: String,
    pub website: String,
    pub overview: String,
    pub key_facts: Vec<String>,
}

/// A ranked decision-maker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub name: String,
    pub title: String,
    pub department: String,
    pub linkedin: String,
    pub email: String,
    pub priority_score: i64,
    pub priority_reason: String,
}

/// A drafted outreach email for one contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutreachDraft {
    pub recipient: String,
    pub title: String,
    pub email_address: String,
    pub subject: String,
    pub body: String,
    pub priority_score: i64,
    /// Set when generating this particular draft failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_normalizes_case_and_whitespace() {
        let a = Identity::parse("Acme Corp").unwrap();
        let b = Identity::parse("  acme corp  ").unwrap();
        let c = Identity::parse("\tACME CORP\n").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.as_str(), "acme corp");
    }

    #[test]
    fn identity_keeps_inner_whitespace() {
        let a = Identity::parse("Acme  Corp").unwrap();
        assert_eq!(a.as_str(), "acme  corp");
    }

    #[test]
    fn identity_rejects_blank() {
        let err = Identity::parse("   ").unwrap_err();
        assert!(matches!(err, SalesIntelError::Validation { .. }));
        assert!(Identity::parse("").is_err());
    }

    #[test]
    fn identity_deserializes_through_parse() {
        let id: Identity = serde_json::from_str(r#""  Acme Corp ""#).unwrap();
        assert_eq!(id.as_str(), "acme corp");
        assert!(serde_json::from_str::<Identity>(r#""   ""#).is_err());
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""acme corp""#);
    }

    #[test]
    fn display_name_keeps_case() {
        assert_eq!(display_name("  Acme Corp "), "Acme Corp");
    }

    #[test]
    fn session_id_roundtrip() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().expect("parse SessionId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn failed_report_has_reason_and_empty_sections() {
        let report = Report::failed(
            Identity::parse("TestCo").unwrap(),
            "TestCo",
            None,
            "analysis failed: quota",
        );
        assert_eq!(report.status, ReportStatus::Failed);
        assert!(!report.is_success());
        assert_eq!(report.failure_reason.as_deref(), Some("analysis failed: quota"));
        assert!(report.sections.challenges.is_empty());
    }

    #[test]
    fn report_serialization_roundtrip_is_exact() {
        let report = Report {
            identity: Identity::parse("TestCo").unwrap(),
            display_name: "TestCo".into(),
            generated_at: Utc::now(),
            status: ReportStatus::Success,
            session_id: Some(SessionId::new()),
            stages_used: vec!["research".into(), "analysis".into()],
            sections: ReportSections {
                challenges: vec!["A".into(), "B".into()],
                contacts: vec![Contact {
                    name: "P".into(),
                    title: "CTO".into(),
                    priority_score: 15,
                    ..Default::default()
                }],
                ..Default::default()
            },
            failure_reason: None,
        };

        let json = serde_json::to_string_pretty(&report).expect("serialize");
        assert!(json.contains(r#""status": "success""#));
        assert!(!json.contains("failure_reason"));
        let parsed: Report = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, report);
    }

    #[test]
    fn draft_error_is_omitted_when_absent() {
        let draft = OutreachDraft {
            recipient: "P".into(),
            body: "...".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&draft).unwrap();
        assert!(!json.contains("error"));
    }
}
