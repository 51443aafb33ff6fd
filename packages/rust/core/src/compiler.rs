//! Report compilation: four stage payloads in, one normalized [`Report`] out.
//!
//! Compilation never fails. Missing fields, wrong shapes and unreadable list
//! elements degrade to empty strings, empty lists and zero counts.

use chrono::Utc;
use salesintel_shared::{
    CompanyProfile, Contact, Identity, OutreachDraft, Report, ReportSections, ReportStatus,
    SessionId,
};
use serde_json::{Map, Value};

use crate::stage::StageKind;

/// Contacts kept in the report, best first.
pub const PRIORITY_CONTACT_LIMIT: usize = 3;

/// Success payloads of one run, in pipeline order.
#[derive(Debug, Clone, Copy)]
pub struct StagePayloads<'a> {
    pub research: &'a Value,
    pub analysis: &'a Value,
    pub contacts: &'a Value,
    pub outreach: &'a Value,
}

/// Assemble the report for a completed run.
pub fn compile(
    identity: &Identity,
    display_name: &str,
    session_id: &SessionId,
    payloads: StagePayloads<'_>,
) -> Report {
    let StagePayloads {
        research,
        analysis,
        contacts,
        outreach,
    } = payloads;

    // Research payloads either wrap the profile in `company_info` or are the profile.
    let info = research
        .get("company_info")
        .filter(|v| v.is_object())
        .unwrap_or(research);

    let mut recent_news = text_list(research, "recent_news");
    if recent_news.is_empty() {
        recent_news = text_list(info, "recent_news");
    }

    let ranked: Vec<Contact> = records(contacts, "prioritized_contacts")
        .into_iter()
        .map(contact)
        .collect();
    let total_contacts_found = count(contacts, "total_contacts_found").unwrap_or(ranked.len());

    let outreach = records(outreach, "outreach_emails")
        .into_iter()
        .map(draft)
        .collect();

    Report {
        identity: identity.clone(),
        display_name: display_name.to_string(),
        generated_at: Utc::now(),
        status: ReportStatus::Success,
        session_id: Some(session_id.clone()),
        stages_used: StageKind::ALL.iter().map(ToString::to_string).collect(),
        sections: ReportSections {
            company_profile: company_profile(info),
            recent_news,
            challenges: text_list(analysis, "key_challenges"),
            opportunities: text_list(analysis, "opportunities"),
            approach: text(analysis, "recommended_approach"),
            full_analysis: text(analysis, "analysis"),
            total_contacts_found,
            contacts: ranked.into_iter().take(PRIORITY_CONTACT_LIMIT).collect(),
            outreach,
        },
        failure_reason: None,
    }
}

fn company_profile(info: &Value) -> CompanyProfile {
    CompanyProfile {
        industry: text(info, "industry"),
        size: text(info, "size"),
        founded: text(info, "founded"),
        location: text(info, "location"),
        website: text(info, "website"),
        overview: text(info, "overview"),
        key_facts: text_list(info, "key_facts"),
    }
}

fn contact(map: &Map<String, Value>) -> Contact {
    Contact {
        name: field_text(map, "name"),
        title: field_text(map, "title"),
        department: field_text(map, "department"),
        linkedin: field_text(map, "linkedin"),
        email: field_text(map, "email"),
        priority_score: field_int(map, "priority_score"),
        priority_reason: field_text(map, "priority_reason"),
    }
}

fn draft(map: &Map<String, Value>) -> OutreachDraft {
    OutreachDraft {
        recipient: field_text(map, "recipient"),
        title: field_text(map, "title"),
        email_address: field_text(map, "email_address"),
        subject: field_text(map, "subject"),
        body: field_text(map, "body"),
        priority_score: field_int(map, "priority_score"),
        error: map.get("error").and_then(Value::as_str).map(str::to_string),
    }
}

// ---------------------------------------------------------------------------
// Lenient field access
// ---------------------------------------------------------------------------

/// Object elements of a list that is either the payload itself or `payload[key]`.
fn records<'a>(payload: &'a Value, key: &str) -> Vec<&'a Map<String, Value>> {
    let list = match payload {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get(key).and_then(Value::as_array),
        _ => None,
    };
    list.map(|items| items.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default()
}

fn text(value: &Value, key: &str) -> String {
    value.get(key).map(scalar_text).unwrap_or_default()
}

fn field_text(map: &Map<String, Value>, key: &str) -> String {
    map.get(key).map(scalar_text).unwrap_or_default()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn text_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(scalar_text)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn count(value: &Value, key: &str) -> Option<usize> {
    value
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}

fn field_int(map: &Map<String, Value>, key: &str) -> i64 {
    match map.get(key) {
        Some(v) => v
            .as_i64()
            .or_else(|| v.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile_fixture(
        research: Value,
        analysis: Value,
        contacts: Value,
        outreach: Value,
    ) -> Report {
        compile(
            &Identity::parse("TestCo").unwrap(),
            "TestCo",
            &SessionId::new(),
            StagePayloads {
                research: &research,
                analysis: &analysis,
                contacts: &contacts,
                outreach: &outreach,
            },
        )
    }

    #[test]
    fn compiles_bare_fixtures() {
        let report = compile_fixture(
            json!({"industry": "X"}),
            json!({"key_challenges": ["A", "B"]}),
            json!([{"name": "P", "title": "CTO"}]),
            json!([{"recipient": "P", "body": "..."}]),
        );

        assert_eq!(report.status, ReportStatus::Success);
        assert_eq!(report.sections.company_profile.industry, "X");
        assert_eq!(report.sections.challenges, vec!["A", "B"]);
        assert_eq!(report.sections.contacts[0].name, "P");
        assert_eq!(report.sections.contacts[0].title, "CTO");
        assert_eq!(report.sections.total_contacts_found, 1);
        assert_eq!(report.sections.outreach[0].recipient, "P");
        assert_eq!(report.sections.outreach[0].body, "...");
        assert!(report.failure_reason.is_none());
        assert_eq!(
            report.stages_used,
            vec!["research", "analysis", "contacts", "outreach"]
        );
    }

    #[test]
    fn missing_opportunities_is_empty_not_failure() {
        let report = compile_fixture(
            json!({}),
            json!({"key_challenges": ["A"]}),
            json!({}),
            json!({}),
        );
        assert!(report.sections.opportunities.is_empty());
        assert!(report.sections.approach.is_empty());
        assert_eq!(report.sections.total_contacts_found, 0);
        assert!(report.sections.outreach.is_empty());
    }

    #[test]
    fn compiles_wrapped_payloads() {
        let report = compile_fixture(
            json!({
                "company_name": "TestCo",
                "company_info": {
                    "industry": "Technology",
                    "size": "1000-5000 employees",
                    "key_facts": ["Fact 1", "Fact 2"]
                },
                "recent_news": ["Launch"]
            }),
            json!({
                "analysis": "full text",
                "key_challenges": ["A"],
                "opportunities": ["O"],
                "recommended_approach": "Lead with ROI"
            }),
            json!({
                "total_contacts_found": 7,
                "prioritized_contacts": [
                    {"name": "A", "priority_score": 15},
                    {"name": "B", "priority_score": 10},
                    {"name": "C", "priority_score": 5},
                    {"name": "D", "priority_score": 0}
                ]
            }),
            json!({
                "emails_generated": 1,
                "outreach_emails": [{"recipient": "A", "subject": "Hi", "error": "timeout"}]
            }),
        );

        let s = &report.sections;
        assert_eq!(s.company_profile.industry, "Technology");
        assert_eq!(s.company_profile.key_facts, vec!["Fact 1", "Fact 2"]);
        assert_eq!(s.recent_news, vec!["Launch"]);
        assert_eq!(s.full_analysis, "full text");
        assert_eq!(s.opportunities, vec!["O"]);
        assert_eq!(s.approach, "Lead with ROI");
        assert_eq!(s.total_contacts_found, 7);
        assert_eq!(s.contacts.len(), PRIORITY_CONTACT_LIMIT);
        assert_eq!(s.contacts[0].priority_score, 15);
        assert_eq!(s.outreach[0].error.as_deref(), Some("timeout"));
    }

    #[test]
    fn unreadable_elements_are_skipped() {
        let report = compile_fixture(
            json!("not an object"),
            json!({"key_challenges": ["A", null, 3, {"x": 1}], "opportunities": "O"}),
            json!([{"name": "P", "priority_score": "high"}, "junk", 4]),
            json!(null),
        );

        let s = &report.sections;
        assert_eq!(s.company_profile, CompanyProfile::default());
        assert_eq!(s.challenges, vec!["A", "3"]);
        assert!(s.opportunities.is_empty());
        assert_eq!(s.contacts.len(), 1);
        assert_eq!(s.contacts[0].priority_score, 0);
        assert!(s.outreach.is_empty());
    }
}
