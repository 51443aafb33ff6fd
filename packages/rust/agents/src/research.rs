//! Research stage: company overview plus recent news.

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use salesintel_core::{Stage, StageInput, StageKind, StageOutput};

use crate::search::SearchTool;

pub struct ResearchStage {
    search: SearchTool,
    news_limit: usize,
}

impl ResearchStage {
    pub fn new(search: SearchTool, news_limit: usize) -> Self {
        Self { search, news_limit }
    }
}

#[async_trait]
impl Stage for ResearchStage {
    fn kind(&self) -> StageKind {
        StageKind::Research
    }

    async fn execute(&self, input: StageInput<'_>) -> StageOutput {
        let StageInput::Research { company_name } = input else {
            return StageOutput::unexpected_input(self.kind(), &input);
        };

        let company_info = self.search.company_info(company_name);
        let recent_news = self.search.company_news(company_name, self.news_limit);
        info!(
            company = company_name,
            headlines = recent_news.len(),
            "research gathered"
        );

        StageOutput::success(json!({
            "company_name": company_name,
            "company_info": company_info,
            "recent_news": recent_news,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn research_payload_shape() {
        let stage = ResearchStage::new(SearchTool::new(), 3);
        let out = stage
            .execute(StageInput::Research {
                company_name: "TestCo",
            })
            .await;

        let payload = out.payload().expect("success");
        assert_eq!(payload["company_name"], "TestCo");
        assert_eq!(payload["company_info"]["industry"], "Technology/SaaS");
        assert_eq!(payload["recent_news"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn wrong_input_is_a_failure() {
        let stage = ResearchStage::new(SearchTool::new(), 5);
        let research = &serde_json::json!({});
        let out = stage.execute(StageInput::Analysis { research }).await;
        assert!(!out.is_success());
    }
}
