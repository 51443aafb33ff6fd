//! Report artifacts: JSON files on disk and the terminal summary.

use std::fmt::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use color_eyre::eyre::{Result, eyre};
use salesintel_shared::Report;
use serde::Serialize;
use tracing::info;

/// `{Company_Name}_{YYYYmmdd_HHMMSS}.json`
pub(crate) fn report_file_name(display_name: &str, at: DateTime<Local>) -> String {
    let company: String = display_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("{company}_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Write `value` as pretty JSON into `dir`, returning the file path.
pub(crate) fn save_report<T: Serialize>(
    dir: &Path,
    display_name: &str,
    value: &T,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .map_err(|e| eyre!("cannot create reports directory {}: {e}", dir.display()))?;

    let path = dir.join(report_file_name(display_name, Local::now()));
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, content)
        .map_err(|e| eyre!("cannot write report {}: {e}", path.display()))?;

    info!(path = %path.display(), "report saved");
    Ok(path)
}

fn or_na(value: &str) -> &str {
    if value.is_empty() { "N/A" } else { value }
}

/// Human-readable summary with a sample email.
pub(crate) fn render_summary(report: &Report) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_summary(&mut out, report);
    out
}

fn write_summary(out: &mut impl Write, report: &Report) -> fmt::Result {
    let s = &report.sections;
    let rule = "=".repeat(60);

    writeln!(out, "\n{rule}")?;
    writeln!(out, "SALES INTELLIGENCE: {}", report.display_name)?;
    writeln!(out, "{rule}")?;

    writeln!(out, "\nCompany Overview:")?;
    writeln!(out, "   Industry: {}", or_na(&s.company_profile.industry))?;
    writeln!(out, "   Size:     {}", or_na(&s.company_profile.size))?;
    writeln!(out, "   Location: {}", or_na(&s.company_profile.location))?;

    writeln!(out, "\nKey Challenges ({}):", s.challenges.len())?;
    for (i, challenge) in s.challenges.iter().take(3).enumerate() {
        writeln!(out, "   {}. {challenge}", i + 1)?;
    }

    writeln!(
        out,
        "\nPriority Contacts ({} of {} found):",
        s.contacts.len(),
        s.total_contacts_found
    )?;
    for contact in &s.contacts {
        writeln!(
            out,
            "   - {} - {} (score {})",
            contact.name, contact.title, contact.priority_score
        )?;
    }

    writeln!(out, "\nEmails Generated: {}", s.outreach.len())?;

    if let Some(email) = s.outreach.first() {
        writeln!(out, "\n{rule}")?;
        writeln!(out, "SAMPLE EMAIL")?;
        writeln!(out, "{rule}")?;
        writeln!(out, "To: {} ({})", email.recipient, email.title)?;
        writeln!(out, "Subject: {}\n", email.subject)?;
        match &email.error {
            Some(error) => writeln!(out, "Error generating email: {error}")?,
            None => writeln!(out, "{}", email.body)?,
        }
    }
    writeln!(out, "{rule}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use salesintel_shared::{
        CompanyProfile, Contact, Identity, OutreachDraft, ReportSections, ReportStatus,
    };
    use uuid::Uuid;

    fn sample_report() -> Report {
        Report {
            identity: Identity::parse("Acme Corp").unwrap(),
            display_name: "Acme Corp".into(),
            generated_at: chrono::Utc::now(),
            status: ReportStatus::Success,
            session_id: None,
            stages_used: Vec::new(),
            sections: ReportSections {
                company_profile: CompanyProfile {
                    industry: "Technology/SaaS".into(),
                    ..Default::default()
                },
                challenges: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                total_contacts_found: 3,
                contacts: vec![Contact {
                    name: "John Smith".into(),
                    title: "Chief Technology Officer".into(),
                    priority_score: 15,
                    ..Default::default()
                }],
                outreach: vec![OutreachDraft {
                    recipient: "John Smith".into(),
                    title: "Chief Technology Officer".into(),
                    subject: "Helping Acme Corp with A".into(),
                    body: "Hi John,".into(),
                    ..Default::default()
                }],
                ..Default::default()
            },
            failure_reason: None,
        }
    }

    #[test]
    fn file_name_uses_underscores_and_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 10, 15, 9, 5, 7).unwrap();
        assert_eq!(
            report_file_name("  Acme Corp ", at),
            "Acme_Corp_20241015_090507.json"
        );
        assert_eq!(report_file_name("A/B", at), "A_B_20241015_090507.json");
    }

    #[test]
    fn summary_lists_top_three_challenges_and_sample_email() {
        let text = render_summary(&sample_report());
        assert!(text.contains("SALES INTELLIGENCE: Acme Corp"));
        assert!(text.contains("Industry: Technology/SaaS"));
        assert!(text.contains("Size:     N/A"));
        assert!(text.contains("Key Challenges (4):"));
        assert!(text.contains("   3. C"));
        assert!(!text.contains("   4. D"));
        assert!(text.contains("John Smith - Chief Technology Officer (score 15)"));
        assert!(text.contains("Subject: Helping Acme Corp with A"));
        assert!(text.contains("Hi John,"));
    }

    #[test]
    fn save_writes_pretty_json() {
        let dir = std::env::temp_dir().join(format!("si_reports_{}", Uuid::now_v7()));
        let report = sample_report();

        let path = save_report(&dir, &report.display_name, &report).expect("save");
        assert!(path.starts_with(&dir));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("Acme_Corp_"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"identity\": \"acme corp\""));
        let parsed: Report = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, report);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
