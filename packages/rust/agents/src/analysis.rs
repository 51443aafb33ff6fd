//! Analysis stage: asks the text generator for challenges, opportunities and
//! a recommended sales approach.
//!
//! The generator is asked for a JSON object. Replies that are not JSON are
//! parsed by their section headers instead.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use salesintel_core::{Stage, StageInput, StageKind, StageOutput};
use salesintel_shared::{GenerationRequest, TextGenerator};

use crate::payload::{str_field, string_list};
use crate::prompts;

/// Entries kept per list.
pub const MAX_LIST_ITEMS: usize = 5;

pub const DEFAULT_APPROACH: &str = "Approach with value-focused messaging";

const CHALLENGES_HEADER: &str = "KEY BUSINESS CHALLENGES";
const OPPORTUNITIES_HEADER: &str = "OPPORTUNITIES";
const APPROACH_HEADER: &str = "RECOMMENDED SALES APPROACH";

/// Leading bullets, numbering and emphasis on a list line.
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•#]+\s*|\d+[.)]\s*)+").expect("valid regex"));

/// Structured sections extracted from a generator reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisSections {
    pub key_challenges: Vec<String>,
    pub opportunities: Vec<String>,
    pub recommended_approach: String,
}

pub struct AnalysisStage {
    generator: Arc<dyn TextGenerator>,
    temperature: f32,
    max_output_tokens: u32,
}

impl AnalysisStage {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            generator,
            temperature,
            max_output_tokens,
        }
    }
}

#[async_trait]
impl Stage for AnalysisStage {
    fn kind(&self) -> StageKind {
        StageKind::Analysis
    }

    async fn execute(&self, input: StageInput<'_>) -> StageOutput {
        let StageInput::Analysis { research } = input else {
            return StageOutput::unexpected_input(self.kind(), &input);
        };

        let company_name = str_field(research, "company_name");
        let info = research.get("company_info").unwrap_or(&Value::Null);
        let news = string_list(research, "recent_news");

        let context = prompts::analysis_context(&company_name, info, &news);
        let request = GenerationRequest::new(
            prompts::analysis_prompt(&context),
            self.temperature,
            self.max_output_tokens,
        )
        .json();

        info!(company = %company_name, model = self.generator.model(), "requesting analysis");
        let text = match self.generator.generate(&request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(company = %company_name, error = %e, "analysis generation failed");
                return StageOutput::failure(format!("analysis generation failed: {e}"));
            }
        };

        let sections = parse_analysis(&text);
        info!(
            company = %company_name,
            challenges = sections.key_challenges.len(),
            opportunities = sections.opportunities.len(),
            "analysis complete"
        );

        StageOutput::success(json!({
            "company_name": company_name,
            "analysis": text,
            "key_challenges": sections.key_challenges,
            "opportunities": sections.opportunities,
            "recommended_approach": sections.recommended_approach,
        }))
    }
}

/// Read a generator reply as JSON when possible, else by section headers.
pub fn parse_analysis(text: &str) -> AnalysisSections {
    if let Some(structured) = parse_structured(text) {
        return structured;
    }
    debug!("analysis reply is not JSON, parsing section headers");
    AnalysisSections {
        key_challenges: section_items(text, CHALLENGES_HEADER, Some(OPPORTUNITIES_HEADER)),
        opportunities: section_items(text, OPPORTUNITIES_HEADER, Some("RECOMMENDED")),
        recommended_approach: approach(text),
    }
}

fn parse_structured(text: &str) -> Option<AnalysisSections> {
    // Tolerate code fences and prose around the object
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let parsed: AnalysisSections = serde_json::from_str(&text[start..=end]).ok()?;
    if parsed == AnalysisSections::default() {
        return None;
    }

    let clean = |items: Vec<String>| -> Vec<String> {
        items
            .iter()
            .map(|s| clean_line(s))
            .filter(|s| !s.is_empty())
            .take(MAX_LIST_ITEMS)
            .collect()
    };
    let approach = parsed.recommended_approach.trim();
    Some(AnalysisSections {
        key_challenges: clean(parsed.key_challenges),
        opportunities: clean(parsed.opportunities),
        recommended_approach: if approach.is_empty() {
            DEFAULT_APPROACH.to_string()
        } else {
            approach.to_string()
        },
    })
}

/// List lines between `header` and the next `until` marker.
fn section_items(text: &str, header: &str, until: Option<&str>) -> Vec<String> {
    section_lines(text, header, until)
        .into_iter()
        .take(MAX_LIST_ITEMS)
        .collect()
}

fn section_lines(text: &str, header: &str, until: Option<&str>) -> Vec<String> {
    let Some((_, after)) = text.split_once(header) else {
        return Vec::new();
    };
    let body = match until.and_then(|marker| after.split_once(marker)) {
        Some((body, _)) => body,
        None => after,
    };
    body.lines()
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .collect()
}

fn approach(text: &str) -> String {
    let lines = section_lines(text, APPROACH_HEADER, None);
    if lines.is_empty() {
        return DEFAULT_APPROACH.to_string();
    }
    lines.into_iter().take(3).collect::<Vec<_>>().join(" ")
}

/// Strip list markers, emphasis and a stray header colon.
fn clean_line(line: &str) -> String {
    let stripped = LIST_MARKER.replace(line.trim(), "");
    stripped
        .trim_matches(|c: char| c == '*' || c == ':' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubGenerator;

    const PROSE_REPLY: &str = "\
## 1. KEY BUSINESS CHALLENGES
1. Scaling infrastructure
2. Managing technical debt
- Hiring engineers
* Data compliance
5) Legacy integrations
6. Sixth challenge

## 2. OPPORTUNITIES
- Automation tools
- Cloud migration

## 3. RECOMMENDED SALES APPROACH
Lead with ROI.
Emphasize quick wins.
Bring case studies.
Follow up in a week.
";

    #[test]
    fn parses_section_headers() {
        let sections = parse_analysis(PROSE_REPLY);
        assert_eq!(
            sections.key_challenges,
            vec![
                "Scaling infrastructure",
                "Managing technical debt",
                "Hiring engineers",
                "Data compliance",
                "Legacy integrations",
            ]
        );
        assert_eq!(sections.opportunities, vec!["Automation tools", "Cloud migration"]);
        assert_eq!(
            sections.recommended_approach,
            "Lead with ROI. Emphasize quick wins. Bring case studies."
        );
    }

    #[test]
    fn missing_sections_use_defaults() {
        let sections = parse_analysis("The company is doing fine.");
        assert!(sections.key_challenges.is_empty());
        assert!(sections.opportunities.is_empty());
        assert_eq!(sections.recommended_approach, DEFAULT_APPROACH);
    }

    #[test]
    fn parses_fenced_json() {
        let reply = "```json\n{\"key_challenges\": [\"1. A\", \"B\", \"\"], \"opportunities\": [\"O\"], \"recommended_approach\": \"Lead with ROI\"}\n```";
        let sections = parse_analysis(reply);
        assert_eq!(sections.key_challenges, vec!["A", "B"]);
        assert_eq!(sections.opportunities, vec!["O"]);
        assert_eq!(sections.recommended_approach, "Lead with ROI");
    }

    #[test]
    fn json_lists_are_capped() {
        let reply = r#"{"key_challenges": ["a","b","c","d","e","f","g"], "opportunities": []}"#;
        let sections = parse_analysis(reply);
        assert_eq!(sections.key_challenges.len(), MAX_LIST_ITEMS);
        assert_eq!(sections.recommended_approach, DEFAULT_APPROACH);
    }

    #[tokio::test]
    async fn builds_payload_from_generator_reply() {
        let generator = Arc::new(StubGenerator::ok(
            r#"{"key_challenges": ["A", "B"], "opportunities": ["O"], "recommended_approach": "R"}"#,
        ));
        let stage = AnalysisStage::new(generator.clone(), 0.7, 2000);
        let research = &json!({
            "company_name": "TestCo",
            "company_info": {"industry": "Technology/SaaS"},
            "recent_news": ["TestCo launches"]
        });

        let out = stage.execute(StageInput::Analysis { research }).await;
        let payload = out.payload().expect("success");
        assert_eq!(payload["company_name"], "TestCo");
        assert_eq!(payload["key_challenges"], json!(["A", "B"]));
        assert_eq!(payload["recommended_approach"], "R");
        assert!(payload["analysis"].as_str().unwrap().contains("key_challenges"));

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].json_response);
        assert_eq!(seen[0].max_output_tokens, 2000);
        assert!(seen[0].prompt.contains("TestCo launches"));
    }

    #[tokio::test]
    async fn generator_error_becomes_failure() {
        let generator = Arc::new(StubGenerator::failing("HTTP 429: quota"));
        let stage = AnalysisStage::new(generator, 0.7, 2000);
        let research = &json!({"company_name": "TestCo"});
        let out = stage.execute(StageInput::Analysis { research }).await;
        match out {
            StageOutput::Failure { reason } => assert!(reason.contains("quota"), "got: {reason}"),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
