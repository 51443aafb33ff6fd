//! Pipeline orchestration for SalesIntel.
//!
//! This crate owns the stage contract, per-run sessions, report compilation
//! and the cache-aware orchestrator that ties them to the result store.

pub mod compiler;
pub mod observer;
pub mod pipeline;
pub mod session;
pub mod stage;

pub use compiler::{PRIORITY_CONTACT_LIMIT, StagePayloads, compile};
pub use observer::{Observer, SilentObserver};
pub use pipeline::{FailedRun, PipelineOrchestrator, RunOutcome, StageSet};
pub use session::{SessionContext, SessionError, SessionSnapshot};
pub use stage::{Stage, StageInput, StageKind, StageOutput, payload_summary};
