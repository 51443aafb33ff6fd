//! Simulated company search.
//!
//! Returns deterministic demo data derived from the company name. No network
//! access is involved.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Headlines available to [`SearchTool::company_news`].
const NEWS_TEMPLATES: [&str; 5] = [
    "announces Q4 earnings beat expectations",
    "launches new AI-powered platform",
    "partners with major enterprise clients",
    "wins industry award for innovation",
    "expands team with key executive hires",
];

/// Company overview as returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub company_name: String,
    pub overview: String,
    pub industry: String,
    pub size: String,
    pub founded: String,
    pub location: String,
    pub website: String,
    pub key_facts: Vec<String>,
}

/// A person found at the target company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub name: String,
    pub title: String,
    pub department: String,
    pub linkedin: String,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct SearchTool;

impl SearchTool {
    pub fn new() -> Self {
        Self
    }

    pub fn company_info(&self, company_name: &str) -> CompanyInfo {
        debug!(company = company_name, "searching company info");
        CompanyInfo {
            company_name: company_name.to_string(),
            overview: format!("Research results for {company_name}"),
            industry: "Technology/SaaS".into(),
            size: "100-500 employees".into(),
            founded: "2015".into(),
            location: "San Francisco, CA".into(),
            website: format!("www.{}.com", domain_label(company_name)),
            key_facts: vec![
                format!("{company_name} is a leading provider in their industry"),
                "Focuses on enterprise customers".into(),
                "Known for innovative solutions".into(),
            ],
        }
    }

    /// Up to `limit` recent headlines.
    pub fn company_news(&self, company_name: &str, limit: usize) -> Vec<String> {
        debug!(company = company_name, limit, "searching company news");
        NEWS_TEMPLATES
            .iter()
            .take(limit)
            .map(|headline| format!("{company_name} {headline}"))
            .collect()
    }

    pub fn company_contacts(&self, company_name: &str) -> Vec<ContactRecord> {
        debug!(company = company_name, "searching company contacts");
        let domain = domain_label(company_name);
        [
            ("John", "Smith", "Chief Technology Officer", "Technology"),
            ("Sarah", "Johnson", "VP of Engineering", "Engineering"),
            ("Michael", "Chen", "Director of Product", "Product"),
        ]
        .into_iter()
        .map(|(first, last, title, department)| {
            let handle = format!("{first}{last}").to_lowercase();
            ContactRecord {
                name: format!("{first} {last}"),
                title: title.into(),
                department: department.into(),
                linkedin: format!("linkedin.com/in/{handle}"),
                email: format!(
                    "{}.{}@{domain}.com",
                    first.to_lowercase(),
                    last.to_lowercase()
                ),
            }
        })
        .collect()
    }
}

/// Company name lower-cased with spaces removed.
fn domain_label(company_name: &str) -> String {
    company_name.to_lowercase().replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contacts_use_company_domain() {
        let contacts = SearchTool::new().company_contacts("Acme Corp");
        assert_eq!(contacts.len(), 3);
        assert_eq!(contacts[0].name, "John Smith");
        assert_eq!(contacts[0].email, "john.smith@acmecorp.com");
        assert_eq!(contacts[1].linkedin, "linkedin.com/in/sarahjohnson");
        assert_eq!(contacts[2].title, "Director of Product");
    }

    #[test]
    fn news_respects_limit() {
        let tool = SearchTool::new();
        assert_eq!(tool.company_news("TestCo", 2).len(), 2);
        assert_eq!(tool.company_news("TestCo", 50).len(), 5);
        assert!(tool.company_news("TestCo", 0).is_empty());
        assert_eq!(
            tool.company_news("TestCo", 1)[0],
            "TestCo announces Q4 earnings beat expectations"
        );
    }

    #[test]
    fn company_info_website() {
        let info = SearchTool::new().company_info("Big Data Co");
        assert_eq!(info.website, "www.bigdataco.com");
        assert_eq!(info.key_facts.len(), 3);
    }
}
