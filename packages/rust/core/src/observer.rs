//! Progress notifications emitted by the orchestrator.

use salesintel_shared::Identity;

use crate::stage::StageKind;

/// Receives pipeline events. Calls are fire-and-forget: implementations must
/// return quickly and cannot influence control flow.
pub trait Observer: Send + Sync {
    /// A stage is about to run.
    fn on_stage_start(&self, stage: StageKind, input_summary: &str);
    /// A stage returned `Success`.
    fn on_stage_complete(&self, stage: StageKind, output_summary: &str);
    /// A stage returned `Failure`; the run stops after this event.
    fn on_stage_failed(&self, stage: StageKind, reason: &str);
    /// A cached report was served; no stage runs.
    fn on_cache_hit(&self, identity: &Identity);
    /// All four stages succeeded and the report was compiled.
    fn on_pipeline_complete(&self, identity: &Identity);
}

/// No-op observer for headless/test usage.
pub struct SilentObserver;

impl Observer for SilentObserver {
    fn on_stage_start(&self, _stage: StageKind, _input_summary: &str) {}
    fn on_stage_complete(&self, _stage: StageKind, _output_summary: &str) {}
    fn on_stage_failed(&self, _stage: StageKind, _reason: &str) {}
    fn on_cache_hit(&self, _identity: &Identity) {}
    fn on_pipeline_complete(&self, _identity: &Identity) {}
}
