//! Per-run session state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use salesintel_shared::SessionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stage::{StageKind, StageOutput};

/// An error noted during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionError {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Mutable state for one pipeline run. Owned by the orchestrator for the
/// duration of `run` and discarded afterwards.
#[derive(Debug)]
pub struct SessionContext {
    session_id: SessionId,
    company_name: String,
    started_at: DateTime<Utc>,
    stage_outputs: BTreeMap<StageKind, StageOutput>,
    errors: Vec<SessionError>,
}

impl SessionContext {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            session_id: SessionId::new(),
            company_name: company_name.into(),
            started_at: Utc::now(),
            stage_outputs: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    /// Store a stage's output. A second write for the same stage overwrites.
    pub fn record(&mut self, stage: StageKind, output: StageOutput) {
        self.stage_outputs.insert(stage, output);
    }

    pub fn output(&self, stage: StageKind) -> Option<&StageOutput> {
        self.stage_outputs.get(&stage)
    }

    /// Success payload of `stage`, if it ran and succeeded.
    pub fn payload(&self, stage: StageKind) -> Option<&Value> {
        self.output(stage).and_then(StageOutput::payload)
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(SessionError {
            message: message.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn errors(&self) -> &[SessionError] {
        &self.errors
    }

    /// Immutable copy of the current state, for diagnostics.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            company_name: self.company_name.clone(),
            started_at: self.started_at,
            stage_outputs: self.stage_outputs.clone(),
            errors: self.errors.clone(),
        }
    }
}

/// Read-only view of a session, returned with failed runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub company_name: String,
    pub started_at: DateTime<Utc>,
    pub stage_outputs: BTreeMap<StageKind, StageOutput>,
    pub errors: Vec<SessionError>,
}
