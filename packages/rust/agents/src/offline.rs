//! Offline stages: canned analysis and template outreach, no remote calls.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;

use salesintel_core::{Stage, StageInput, StageKind, StageOutput};

use crate::outreach::{draft_header, outreach_payload};
use crate::payload::{contact_list, str_field, string_list};

const CANNED_CHALLENGES: [&str; 5] = [
    "Scaling infrastructure while maintaining performance and reliability",
    "Managing technical debt accumulated during rapid growth phases",
    "Integrating AI and machine learning into existing product offerings",
    "Attracting and retaining top engineering talent in competitive market",
    "Ensuring data security and compliance across global operations",
];

const CANNED_OPPORTUNITIES: [&str; 4] = [
    "Automation tools can reduce operational overhead by 40%",
    "AI-powered analytics can improve decision-making speed",
    "Cloud-native solutions enable faster time-to-market",
    "Modern DevOps practices can improve deployment frequency",
];

const CANNED_APPROACH: &str = "Emphasize proven ROI in similar enterprise environments. \
Focus on quick wins and scalability. \
Lead with technical credibility and case studies from comparable companies.";

/// Analysis stage returning the same pre-written assessment for every company.
#[derive(Debug, Default)]
pub struct CannedAnalysisStage;

#[async_trait]
impl Stage for CannedAnalysisStage {
    fn kind(&self) -> StageKind {
        StageKind::Analysis
    }

    async fn execute(&self, input: StageInput<'_>) -> StageOutput {
        let StageInput::Analysis { research } = input else {
            return StageOutput::unexpected_input(self.kind(), &input);
        };

        let company_name = str_field(research, "company_name");
        info!(company = %company_name, "canned analysis");

        StageOutput::success(json!({
            "company_name": company_name,
            "analysis": format!(
                "Analysis of {company_name}: The company faces typical enterprise challenges \
                 including scaling infrastructure, managing technical debt, and integrating modern \
                 AI capabilities. Key opportunities exist in automation and digital transformation."
            ),
            "key_challenges": CANNED_CHALLENGES,
            "opportunities": CANNED_OPPORTUNITIES,
            "recommended_approach": CANNED_APPROACH,
        }))
    }
}

/// Outreach stage filling a fixed email template.
#[derive(Debug)]
pub struct TemplateOutreachStage {
    max_emails: usize,
}

impl TemplateOutreachStage {
    pub fn new(max_emails: usize) -> Self {
        Self { max_emails }
    }
}

#[async_trait]
impl Stage for TemplateOutreachStage {
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

        let drafts = contact_list(contacts)
            .iter()
            .take(self.max_emails)
            .map(|contact| {
                let mut draft = draft_header(contact);
                draft.subject = format!("Helping {company_name} scale infrastructure efficiently");
                draft.body = template_body(contact, analysis, company_name);
                draft
            })
            .collect();

        outreach_payload(company_name, drafts)
    }
}

fn template_body(contact: &Value, analysis: &Value, company_name: &str) -> String {
    let name = str_field(contact, "name");
    let first_name = name.split_whitespace().next().unwrap_or("there");
    let challenge = string_list(analysis, "key_challenges")
        .into_iter()
        .next()
        .unwrap_or_else(|| "infrastructure scaling".to_string());

    format!(
        "Hi {first_name},\n\n\
         I hope this message finds you well. I've been following {company_name}'s impressive \
         growth and recent initiatives, particularly your focus on scaling operations and \
         technology innovation.\n\n\
         Many engineering leaders I work with in similar positions face challenges around \
         {challenge}. I noticed {company_name} has been expanding rapidly, which often brings \
         these types of technical challenges to the forefront.\n\n\
         We've helped companies like yours reduce operational overhead by 40% while improving \
         system reliability through automated infrastructure management and intelligent \
         monitoring solutions.\n\n\
         Would you be open to a brief 15-minute conversation to explore whether our approach \
         might be relevant for {company_name}? I'd be happy to share specific case studies \
         from companies at a similar stage.\n\n\
         Best regards,\n\
         [Your Name]"
    )
}
