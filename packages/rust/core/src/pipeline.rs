//! The pipeline orchestrator: cache check, four stages in fixed order,
//! compile, store.

use std::sync::Arc;
use std::time::Instant;

use salesintel_shared::{Identity, Report, Result, SalesIntelError, display_name};
use salesintel_storage::ResultStore;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::compiler::{self, StagePayloads};
use crate::observer::Observer;
use crate::session::{SessionContext, SessionSnapshot};
use crate::stage::{Stage, StageInput, StageKind, StageOutput, payload_summary};

/// The four stage implementations, one per pipeline position.
pub struct StageSet {
    research: Box<dyn Stage>,
    analysis: Box<dyn Stage>,
    contacts: Box<dyn Stage>,
    outreach: Box<dyn Stage>,
}

impl StageSet {
    /// Bundle the stages, rejecting any placed at the wrong position.
    pub fn new(
        research: Box<dyn Stage>,
        analysis: Box<dyn Stage>,
        contacts: Box<dyn Stage>,
        outreach: Box<dyn Stage>,
    ) -> Result<Self> {
        for (expected, stage) in [
            (StageKind::Research, &research),
            (StageKind::Analysis, &analysis),
            (StageKind::Contacts, &contacts),
            (StageKind::Outreach, &outreach),
        ] {
            if stage.kind() != expected {
                return Err(SalesIntelError::validation(format!(
                    "{} stage supplied for the {expected} position",
                    stage.kind()
                )));
            }
        }
        Ok(Self {
            research,
            analysis,
            contacts,
            outreach,
        })
    }
}

/// What a call to [`PipelineOrchestrator::run`] produced.
#[derive(Debug)]
pub enum RunOutcome {
    /// Served from the store; no stage ran.
    Cached(Report),
    /// All stages succeeded. `persist_warning` is set when the report could
    /// not be written to disk (it is still cached in memory).
    Completed {
        report: Report,
        persist_warning: Option<String>,
    },
    /// A stage failed; nothing was stored.
    Failed(FailedRun),
}

impl RunOutcome {
    pub fn report(&self) -> &Report {
        match self {
            Self::Cached(report) => report,
            Self::Completed { report, .. } => report,
            Self::Failed(failed) => &failed.report,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Diagnostics for a run that stopped at a failing stage.
#[derive(Debug, Clone, Serialize)]
pub struct FailedRun {
    pub stage: StageKind,
    /// Failure report: identity, `failed` status and the reason.
    pub report: Report,
    /// Everything the session recorded up to the failure.
    pub session: SessionSnapshot,
}

/// Runs companies through the pipeline, serving repeats from the store.
pub struct PipelineOrchestrator {
    stages: StageSet,
    store: ResultStore,
    observer: Arc<dyn Observer>,
}

impl PipelineOrchestrator {
    pub fn new(stages: StageSet, store: ResultStore, observer: Arc<dyn Observer>) -> Self {
        Self {
            stages,
            store,
            observer,
        }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ResultStore {
        &mut self.store
    }

    /// Produce the report for `company_name`.
    ///
    /// Blank names are rejected with a validation error before anything runs.
    /// Stage failures are not errors: they come back as [`RunOutcome::Failed`].
    #[instrument(skip_all, fields(company = %company_name.trim(), use_cache = use_cache))]
    pub async fn run(&mut self, company_name: &str, use_cache: bool) -> Result<RunOutcome> {
        let identity = Identity::parse(company_name)?;
        let display = display_name(company_name);

        if use_cache {
            if let Some(report) = self.store.lookup(&identity) {
                info!(%identity, "cache hit");
                self.observer.on_cache_hit(&identity);
                return Ok(RunOutcome::Cached(report));
            }
            debug!(%identity, "cache miss");
        }

        let start = Instant::now();
        let mut session = SessionContext::new(display.as_str());
        info!(%identity, session_id = %session.session_id(), "starting pipeline");

        let research = match self
            .run_stage(
                &mut session,
                self.stages.research.as_ref(),
                StageInput::Research {
                    company_name: &display,
                },
            )
            .await
        {
            Ok(payload) => payload,
            Err(reason) => return Ok(failed(identity, &session, StageKind::Research, &reason)),
        };

        let analysis = match self
            .run_stage(
                &mut session,
                self.stages.analysis.as_ref(),
                StageInput::Analysis {
                    research: &research,
                },
            )
            .await
        {
            Ok(payload) => payload,
            Err(reason) => return Ok(failed(identity, &session, StageKind::Analysis, &reason)),
        };

        let contacts = match self
            .run_stage(
                &mut session,
                self.stages.contacts.as_ref(),
                StageInput::Contacts {
                    company_name: &display,
                    analysis: &analysis,
                },
            )
            .await
        {
            Ok(payload) => payload,
            Err(reason) => return Ok(failed(identity, &session, StageKind::Contacts, &reason)),
        };

        let outreach = match self
            .run_stage(
                &mut session,
                self.stages.outreach.as_ref(),
                StageInput::Outreach {
                    company_name: &display,
                    analysis: &analysis,
                    contacts: &contacts,
                },
            )
            .await
        {
            Ok(payload) => payload,
            Err(reason) => return Ok(failed(identity, &session, StageKind::Outreach, &reason)),
        };

        let report = compiler::compile(
            &identity,
            &display,
            session.session_id(),
            StagePayloads {
                research: &research,
                analysis: &analysis,
                contacts: &contacts,
                outreach: &outreach,
            },
        );

        let persist_warning = match self.store.put(&identity, &display, &report) {
            Ok(()) => None,
            Err(e) => {
                warn!(%identity, error = %e, "report not persisted; kept in memory only");
                session.add_error(format!("failed to persist report: {e}"));
                Some(e.to_string())
            }
        };

        self.observer.on_pipeline_complete(&identity);
        info!(
            %identity,
            contacts = report.sections.contacts.len(),
            drafts = report.sections.outreach.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "pipeline complete"
        );

        Ok(RunOutcome::Completed {
            report,
            persist_warning,
        })
    }

    /// Invoke one stage and record its output. Returns the success payload or
    /// the failure reason.
    async fn run_stage(
        &self,
        session: &mut SessionContext,
        stage: &dyn Stage,
        input: StageInput<'_>,
    ) -> std::result::Result<Value, String> {
        let kind = input.kind();
        let summary = input.summary();
        self.observer.on_stage_start(kind, &summary);
        debug!(stage = %kind, input = %summary, "stage starting");

        let start = Instant::now();
        let output = stage.execute(input).await;
        session.record(kind, output.clone());

        match output {
            StageOutput::Success { payload } => {
                self.observer.on_stage_complete(kind, &payload_summary(&payload));
                info!(
                    stage = %kind,
                    elapsed_ms = start.elapsed().as_millis(),
                    "stage complete"
                );
                Ok(payload)
            }
            StageOutput::Failure { reason } => {
                self.observer.on_stage_failed(kind, &reason);
                warn!(stage = %kind, %reason, "stage failed");
                session.add_error(format!("{kind} stage failed: {reason}"));
                Err(reason)
            }
        }
    }
}

fn failed(
    identity: Identity,
    session: &SessionContext,
    stage: StageKind,
    reason: &str,
) -> RunOutcome {
    let report = Report::failed(
        identity,
        session.company_name(),
        Some(session.session_id().clone()),
        format!("{stage} stage failed: {reason}"),
    );
    RunOutcome::Failed(FailedRun {
        stage,
        report,
        session: session.snapshot(),
    })
}
