//! The stage capability: one step of the fixed four-step pipeline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pipeline positions, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Research,
    Analysis,
    Contacts,
    Outreach,
}

impl StageKind {
    /// Every stage, in the only order the orchestrator runs them.
    pub const ALL: [StageKind; 4] = [
        StageKind::Research,
        StageKind::Analysis,
        StageKind::Contacts,
        StageKind::Outreach,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Analysis => "analysis",
            Self::Contacts => "contacts",
            Self::Outreach => "outreach",
        }
    }

    /// 1-based position in the pipeline.
    pub fn position(&self) -> usize {
        match self {
            Self::Research => 1,
            Self::Analysis => 2,
            Self::Contacts => 3,
            Self::Outreach => 4,
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged result of one stage invocation.
///
/// The orchestrator decides whether to continue from this tag alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutput {
    Success { payload: Value },
    Failure { reason: String },
}

impl StageOutput {
    pub fn success(payload: Value) -> Self {
        Self::Success { payload }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    /// Failure for a stage handed an input meant for another position.
    pub fn unexpected_input(kind: StageKind, input: &StageInput<'_>) -> Self {
        Self::failure(format!("{kind} stage received {} input", input.kind()))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success { payload } => Some(payload),
            Self::Failure { .. } => None,
        }
    }
}

/// Input handed to a stage; each variant carries exactly what its position may read.
#[derive(Debug, Clone, Copy)]
pub enum StageInput<'a> {
    Research { company_name: &'a str },
    Analysis { research: &'a Value },
    /// `analysis` is available for scoring even if a ranking stage ignores it.
    Contacts {
        company_name: &'a str,
        analysis: &'a Value,
    },
    Outreach {
        company_name: &'a str,
        analysis: &'a Value,
        contacts: &'a Value,
    },
}

impl StageInput<'_> {
    /// The stage position this input belongs to.
    pub fn kind(&self) -> StageKind {
        match self {
            Self::Research { .. } => StageKind::Research,
            Self::Analysis { .. } => StageKind::Analysis,
            Self::Contacts { .. } => StageKind::Contacts,
            Self::Outreach { .. } => StageKind::Outreach,
        }
    }

    /// Short human-readable description for observers and logs.
    pub fn summary(&self) -> String {
        match self {
            Self::Research { company_name } => format!("company={company_name}"),
            Self::Analysis { research } => format!("research fields={}", field_count(research)),
            Self::Contacts { company_name, .. } => format!("company={company_name}"),
            Self::Outreach {
                company_name,
                contacts,
                ..
            } => format!(
                "company={company_name} contacts={}",
                contacts
                    .get("prioritized_contacts")
                    .and_then(Value::as_array)
                    .or_else(|| contacts.as_array())
                    .map(Vec::len)
                    .unwrap_or(0)
            ),
        }
    }
}

/// Short description of a success payload.
pub fn payload_summary(payload: &Value) -> String {
    match payload {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("fields=[{}]", keys.join(", "))
        }
        Value::Array(items) => format!("items={}", items.len()),
        other => format!("value={other}"),
    }
}

fn field_count(value: &Value) -> usize {
    value.as_object().map(|m| m.len()).unwrap_or(0)
}

/// One pipeline step.
///
/// Implementations never panic or return errors to the orchestrator: every
/// internal failure, including a failed text generation call, is reported as
/// [`StageOutput::Failure`].
#[async_trait]
pub trait Stage: Send + Sync {
    /// The position this stage fills.
    fn kind(&self) -> StageKind;

    async fn execute(&self, input: StageInput<'_>) -> StageOutput;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stage_order_is_fixed() {
        let positions: Vec<usize> = StageKind::ALL.iter().map(StageKind::position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
        assert!(StageKind::Research < StageKind::Analysis);
        assert!(StageKind::Contacts < StageKind::Outreach);
    }

    #[test]
    fn stage_output_serializes_with_status_tag() {
        let ok = StageOutput::success(json!({"industry": "X"}));
        let json = serde_json::to_string(&ok).unwrap();
        assert!(json.contains(r#""status":"success""#));

        let failed = StageOutput::failure("quota exhausted");
        let json = serde_json::to_string(&failed).unwrap();
        assert_eq!(json, r#"{"status":"failure","reason":"quota exhausted"}"#);
    }

    #[test]
    fn payload_accessor() {
        assert!(StageOutput::failure("x").payload().is_none());
        let out = StageOutput::success(json!([1, 2]));
        assert_eq!(out.payload(), Some(&json!([1, 2])));
        assert!(out.is_success());
    }

    #[test]
    fn input_kind_and_summary() {
        let analysis = json!({});
        let contacts = json!([{"name": "P"}, {"name": "Q"}]);
        let input = StageInput::Outreach {
            company_name: "TestCo",
            analysis: &analysis,
            contacts: &contacts,
        };
        assert_eq!(input.kind(), StageKind::Outreach);
        assert_eq!(input.summary(), "company=TestCo contacts=2");
    }

    #[test]
    fn unexpected_input_names_both_positions() {
        let input = StageInput::Research {
            company_name: "TestCo",
        };
        let out = StageOutput::unexpected_input(StageKind::Analysis, &input);
        match out {
            StageOutput::Failure { reason } => {
                assert_eq!(reason, "analysis stage received research input");
            }
            _ => panic!("expected Failure"),
        }
    }

    #[test]
    fn payload_summary_shapes() {
        assert_eq!(payload_summary(&json!([1, 2, 3])), "items=3");
        assert_eq!(payload_summary(&json!({"a": 1})), "fields=[a]");
    }
}
