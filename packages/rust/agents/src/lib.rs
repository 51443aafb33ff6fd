//! Concrete pipeline stages for SalesIntel.
//!
//! Research and contact ranking use the simulated [`SearchTool`]. Analysis
//! and outreach call a [`TextGenerator`], or use canned content in offline
//! mode.

pub mod analysis;
pub mod contacts;
pub mod offline;
pub mod outreach;
pub mod payload;
pub mod prompts;
pub mod research;
pub mod search;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use salesintel_core::StageSet;
use salesintel_shared::{Result, StagesConfig, TextGenerator};

pub use analysis::AnalysisStage;
pub use contacts::ContactStage;
pub use offline::{CannedAnalysisStage, TemplateOutreachStage};
pub use outreach::OutreachStage;
pub use research::ResearchStage;
pub use search::SearchTool;

/// Stages backed by a live text generator.
pub fn live_stages(config: &StagesConfig, generator: Arc<dyn TextGenerator>) -> Result<StageSet> {
    StageSet::new(
        Box::new(ResearchStage::new(SearchTool::new(), config.news_limit)),
        Box::new(AnalysisStage::new(
            generator.clone(),
            config.analysis_temperature,
            config.analysis_max_tokens,
        )),
        Box::new(ContactStage::new(SearchTool::new())),
        Box::new(OutreachStage::new(
            generator,
            config.outreach_temperature,
            config.outreach_max_tokens,
            config.max_outreach_emails,
        )),
    )
}

/// Stages that make no remote calls.
pub fn offline_stages(config: &StagesConfig) -> Result<StageSet> {
    StageSet::new(
        Box::new(ResearchStage::new(SearchTool::new(), config.news_limit)),
        Box::new(CannedAnalysisStage),
        Box::new(ContactStage::new(SearchTool::new())),
        Box::new(TemplateOutreachStage::new(config.max_outreach_emails)),
    )
}
