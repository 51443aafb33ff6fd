//! Prompt templates for the generative stages.

use serde_json::Value;

use crate::payload::{str_field, string_list};

/// Instructions for the analysis stage. `{context}` is replaced.
const ANALYSIS_TEMPLATE: &str = r#"You are a business intelligence analyst helping a sales team understand a potential client.

Based on the following company information, provide a detailed analysis:

{context}

Respond with a JSON object with exactly these fields:
- "key_challenges": array of 3-5 strings, the main business challenges this company likely faces
- "opportunities": array of strings, how our solutions could help address these challenges
- "recommended_approach": string, what angles to emphasize in outreach

If you cannot produce JSON, use three sections titled KEY BUSINESS CHALLENGES, OPPORTUNITIES and RECOMMENDED SALES APPROACH instead.
Be specific and actionable. Focus on insights that would help a sales team engage effectively."#;

/// Company facts block fed into [`analysis_prompt`].
pub fn analysis_context(company_name: &str, info: &Value, news: &[String]) -> String {
    let field = |key: &str| {
        let value = str_field(info, key);
        if value.is_empty() {
            "N/A".to_string()
        } else {
            value
        }
    };
    let bullets = |items: &[String]| {
        items
            .iter()
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Company: {company_name}\n\n\
         Company Information:\n\
         - Industry: {}\n\
         - Size: {}\n\
         - Founded: {}\n\
         - Location: {}\n\
         - Overview: {}\n\n\
         Recent News:\n{}\n\n\
         Key Facts:\n{}",
        field("industry"),
        field("size"),
        field("founded"),
        field("location"),
        field("overview"),
        bullets(news),
        bullets(&string_list(info, "key_facts")),
    )
}

pub fn analysis_prompt(context: &str) -> String {
    ANALYSIS_TEMPLATE.replace("{context}", context)
}

/// Prompt for one outreach email body.
pub fn outreach_prompt(contact: &Value, analysis: &Value, company_name: &str) -> String {
    let name = str_field(contact, "name");
    let title = str_field(contact, "title");
    let challenges: Vec<String> = string_list(analysis, "key_challenges")
        .into_iter()
        .take(3)
        .map(|c| format!("- {c}"))
        .collect();
    let opportunities: Vec<String> = string_list(analysis, "opportunities")
        .into_iter()
        .take(2)
        .map(|o| format!("- {o}"))
        .collect();
    let approach = str_field(analysis, "recommended_approach");

    format!(
        "You are writing a personalized sales outreach email.\n\n\
         TARGET CONTACT:\n\
         - Name: {name}\n\
         - Title: {title}\n\
         - Company: {company_name}\n\n\
         COMPANY CHALLENGES IDENTIFIED:\n{}\n\n\
         OPPORTUNITIES FOR OUR SOLUTION:\n{}\n\n\
         RECOMMENDED APPROACH:\n{approach}\n\n\
         Write a professional, personalized sales email that:\n\
         1. Opens with a relevant insight or observation about their company\n\
         2. Mentions 1-2 specific challenges they likely face\n\
         3. Briefly explains how our solution addresses these challenges\n\
         4. Includes a clear, low-pressure call-to-action\n\
         5. Is concise (150-200 words)\n\
         6. Sounds natural and human, not robotic\n\n\
         Do not include [placeholders]. Write the complete email body only (no subject line, no signature).\n\
         Make it specific to {company_name} and {title}.",
        challenges.join("\n"),
        opportunities.join("\n"),
    )
}
