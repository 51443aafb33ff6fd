//! Outreach stage: one drafted email per top-ranked contact.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{info, warn};

use salesintel_core::{Stage, StageInput, StageKind, StageOutput};
use salesintel_shared::{GenerationRequest, OutreachDraft, TextGenerator};

use crate::payload::{contact_list, str_field, string_list};
use crate::prompts;

/// Words of the top challenge used in a subject line.
const SUBJECT_WORDS: usize = 4;

pub const FALLBACK_SUBJECT_TOPIC: &str = "Your Technology Needs";

pub struct OutreachStage {
    generator: Arc<dyn TextGenerator>,
    temperature: f32,
    max_output_tokens: u32,
    max_emails: usize,
}

impl OutreachStage {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        temperature: f32,
        max_output_tokens: u32,
        max_emails: usize,
    ) -> Self {
        Self {
            generator,
            temperature,
            max_output_tokens,
            max_emails,
        }
    }

    async fn draft_for(
        &self,
        contact: &Value,
        analysis: &Value,
        company_name: &str,
    ) -> OutreachDraft {
        let mut draft = draft_header(contact);
        draft.subject = subject_line(company_name, analysis);

        let request = GenerationRequest::new(
            prompts::outreach_prompt(contact, analysis, company_name),
            self.temperature,
            self.max_output_tokens,
        );
        match self.generator.generate(&request).await {
            Ok(body) => draft.body = body.trim().to_string(),
            Err(e) => {
                warn!(recipient = %draft.recipient, error = %e, "email generation failed");
                draft.error = Some(e.to_string());
            }
        }
        draft
    }
}

#[async_trait]
impl Stage for OutreachStage {
    fn kind(&self) -> StageKind {
        StageKind::Outreach
    }

    async fn execute(&self, input: StageInput<'_>) -> StageOutput {
        let StageInput::Outreach {
            company_name,
            analysis,
            contacts,
        } = input
        else {
            return StageOutput::unexpected_input(self.kind(), &input);
        };

        // One contact at a time; a failed draft does not stop the others
        let mut drafts = Vec::new();
        for contact in contact_list(contacts).iter().take(self.max_emails) {
            drafts.push(self.draft_for(contact, analysis, company_name).await);
        }

        let failed = drafts.iter().filter(|d| d.error.is_some()).count();
        info!(
            company = company_name,
            emails = drafts.len(),
            failed,
            "outreach drafted"
        );
        outreach_payload(company_name, drafts)
    }
}

/// Recipient fields copied from a ranked contact.
pub(crate) fn draft_header(contact: &Value) -> OutreachDraft {
    OutreachDraft {
        recipient: str_field(contact, "name"),
        title: str_field(contact, "title"),
        email_address: str_field(contact, "email"),
        priority_score: contact
            .get("priority_score")
            .and_then(Value::as_i64)
            .unwrap_or(0),
        ..Default::default()
    }
}

pub(crate) fn outreach_payload(company_name: &str, drafts: Vec<OutreachDraft>) -> StageOutput {
    StageOutput::success(json!({
        "company_name": company_name,
        "emails_generated": drafts.len(),
        "outreach_emails": drafts,
    }))
}

/// `Helping {company} with {first words of the top challenge}`.
pub fn subject_line(company_name: &str, analysis: &Value) -> String {
    let topic = string_list(analysis, "key_challenges")
        .first()
        .map(|challenge| {
            let words: Vec<&str> = challenge.split_whitespace().collect();
            let mut topic = words
                .iter()
                .take(SUBJECT_WORDS)
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            if words.len() > SUBJECT_WORDS {
                topic.push_str("...");
            }
            topic
        })
        .filter(|topic| !topic.is_empty())
        .unwrap_or_else(|| FALLBACK_SUBJECT_TOPIC.to_string());
    format!("Helping {company_name} with {topic}")
}
