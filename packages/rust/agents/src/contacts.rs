//! Contact stage: find decision makers and rank them by title.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use salesintel_core::{Stage, StageInput, StageKind, StageOutput};

use crate::search::{ContactRecord, SearchTool};

/// Title keywords marking a senior contact. Only the first match scores.
const SENIOR_TITLES: [&str; 5] = ["cto", "vp", "chief", "director", "head"];
const SENIOR_SCORE: i64 = 10;

/// Title keywords marking a technical department.
const TECHNICAL_TITLES: [&str; 2] = ["technology", "engineering"];
const TECHNICAL_SCORE: i64 = 5;

/// A contact with its ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedContact {
    #[serde(flatten)]
    pub contact: ContactRecord,
    pub priority_score: i64,
    pub priority_reason: String,
}

pub struct ContactStage {
    search: SearchTool,
}

impl ContactStage {
    pub fn new(search: SearchTool) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Stage for ContactStage {
    fn kind(&self) -> StageKind {
        StageKind::Contacts
    }

    // The analysis payload is part of this position's input but ranking is
    // title-based only.
    async fn execute(&self, input: StageInput<'_>) -> StageOutput {
        let StageInput::Contacts { company_name, .. } = input else {
            return StageOutput::unexpected_input(self.kind(), &input);
        };

        let found = self.search.company_contacts(company_name);
        let total = found.len();
        let ranked = prioritize(found);
        info!(company = company_name, contacts = total, "contacts ranked");

        StageOutput::success(json!({
            "company_name": company_name,
            "total_contacts_found": total,
            "prioritized_contacts": ranked,
        }))
    }
}

/// Score each contact and sort best first. Ties keep search order.
pub fn prioritize(contacts: Vec<ContactRecord>) -> Vec<RankedContact> {
    let mut ranked: Vec<RankedContact> = contacts
        .into_iter()
        .map(|contact| RankedContact {
            priority_score: priority_score(&contact.title),
            priority_reason: priority_reason(&contact.title).to_string(),
            contact,
        })
        .collect();
    ranked.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));
    ranked
}

pub fn priority_score(title: &str) -> i64 {
    let title = title.to_lowercase();
    let mut score = 0;
    if SENIOR_TITLES.iter().any(|kw| title.contains(kw)) {
        score += SENIOR_SCORE;
    }
    if TECHNICAL_TITLES.iter().any(|kw| title.contains(kw)) {
        score += TECHNICAL_SCORE;
    }
    score
}

/// Human-readable reason; matching is case-sensitive on the title.
pub fn priority_reason(title: &str) -> &'static str {
    if title.contains("CTO") || title.contains("Chief Technology") {
        "Senior technology decision maker - high influence on tech purchases"
    } else if title.contains("VP") {
        "Executive level contact - can champion solutions internally"
    } else if title.contains("Director") {
        "Department leader - involved in solution evaluation"
    } else {
        "Key stakeholder in decision process"
    }
}
