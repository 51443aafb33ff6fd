//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use salesintel_agents::{live_stages, offline_stages};
use salesintel_core::{Observer, PipelineOrchestrator, RunOutcome, StageKind};
use salesintel_gemini::GeminiClient;
use salesintel_shared::{
    AppConfig, Identity, config_file_path, init_config, load_config, resolve_api_key,
};
use salesintel_storage::ResultStore;
use tracing::{info, warn};

use crate::report;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SalesIntel: research a company, rank its decision makers and draft outreach.
#[derive(Parser)]
#[command(
    name = "salesintel",
    version,
    about = "Research companies, rank decision makers and draft outreach emails.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Research a company and build its sales report.
    Research {
        /// Company name (several words are joined with spaces).
        #[arg(required = true, num_args = 1..)]
        company: Vec<String>,

        /// Ignore any cached report and run every stage.
        #[arg(long)]
        no_cache: bool,

        /// Use canned analysis and template emails; no API key needed.
        #[arg(long)]
        offline: bool,

        /// Gemini model override.
        #[arg(long, env = "MODEL_NAME")]
        model: Option<String>,

        /// Result store file (defaults to the configured store_path).
        #[arg(long)]
        store: Option<PathBuf>,

        /// Directory for report JSON files.
        #[arg(long)]
        reports_dir: Option<PathBuf>,

        /// Do not write a report file.
        #[arg(long)]
        no_save: bool,

        /// Print the full report as JSON instead of the summary.
        #[arg(long)]
        json: bool,

        /// Abort if the whole run takes longer than this.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Inspect or evict cached reports.
    Cache {
        /// Result store file (defaults to the configured store_path).
        #[arg(long, global = true)]
        store: Option<PathBuf>,

        #[command(subcommand)]
        action: CacheAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Cache subcommands.
#[derive(Subcommand)]
pub(crate) enum CacheAction {
    /// List cached companies.
    List,
    /// Print a cached report as JSON.
    Show { company: String },
    /// Remove one company's cached report.
    Forget { company: String },
    /// Remove every cached report.
    Clear,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "salesintel=warn",
        1 => "salesintel=info",
        2 => "salesintel=debug",
        _ => "salesintel=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Options for one `research` invocation.
pub(crate) struct ResearchArgs {
    pub company: String,
    pub no_cache: bool,
    pub offline: bool,
    pub model: Option<String>,
    pub store: Option<PathBuf>,
    pub reports_dir: Option<PathBuf>,
    pub no_save: bool,
    pub json: bool,
    pub timeout_secs: Option<u64>,
}

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Research {
            company,
            no_cache,
            offline,
            model,
            store,
            reports_dir,
            no_save,
            json,
            timeout_secs,
        } => {
            let args = ResearchArgs {
                company: company.join(" "),
                no_cache,
                offline,
                model,
                store,
                reports_dir,
                no_save,
                json,
                timeout_secs,
            };
            cmd_research(args).await
        }
        Command::Cache { store, action } => {
            let config = load_config()?;
            let path = store.unwrap_or_else(|| PathBuf::from(&config.defaults.store_path));
            let mut store = ResultStore::open(path);
            match action {
                CacheAction::List => cmd_cache_list(&store),
                CacheAction::Show { company } => cmd_cache_show(&store, &company),
                CacheAction::Forget { company } => cmd_cache_forget(&mut store, &company),
                CacheAction::Clear => cmd_cache_clear(&mut store),
            }
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// research
// ---------------------------------------------------------------------------

fn build_orchestrator(
    config: &AppConfig,
    args: &ResearchArgs,
    observer: Arc<dyn Observer>,
) -> Result<PipelineOrchestrator> {
    let stages = if args.offline {
        info!("offline mode: canned analysis and template outreach");
        offline_stages(&config.stages)?
    } else {
        let api_key = resolve_api_key(config)?;
        let model = args.model.as_deref().unwrap_or(&config.gemini.model);
        let client = GeminiClient::new(
            &api_key,
            model,
            &config.gemini.base_url,
            config.gemini.timeout_secs,
        )?;
        info!(model, endpoint = %client.endpoint(), "using Gemini");
        live_stages(&config.stages, Arc::new(client))?
    };

    let store_path = args
        .store
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.defaults.store_path));
    Ok(PipelineOrchestrator::new(
        stages,
        ResultStore::open(store_path),
        observer,
    ))
}

async fn cmd_research(args: ResearchArgs) -> Result<()> {
    // Reject blank names before touching config or credentials
    Identity::parse(&args.company)?;

    let config = load_config()?;
    let progress = Arc::new(CliProgress::new());
    let mut orchestrator = build_orchestrator(&config, &args, progress.clone())?;
    let use_cache = config.defaults.use_cache && !args.no_cache;

    info!(company = %args.company, use_cache, "researching company");

    let run = orchestrator.run(&args.company, use_cache);
    let result: Result<RunOutcome> = match args.timeout_secs {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), run).await {
            Ok(inner) => inner.map_err(Into::into),
            Err(_) => Err(eyre!(
                "research for '{}' did not finish within {secs}s",
                args.company
            )),
        },
        None => run.await.map_err(Into::into),
    };
    progress.finish();
    let outcome = result?;

    let reports_dir = args
        .reports_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.defaults.reports_dir));

    match &outcome {
        RunOutcome::Cached(report) => {
            println!("Using cached report for {}", report.display_name);
            print_report(report, args.json)?;
        }
        RunOutcome::Completed {
            report,
            persist_warning,
        } => {
            if let Some(warning) = persist_warning {
                eprintln!("warning: report was not cached and will be lost on exit: {warning}");
            }
            print_report(report, args.json)?;
        }
        RunOutcome::Failed(failed) => {
            let reason = failed.report.failure_reason.as_deref().unwrap_or("unknown");
            println!("Research for {} failed: {reason}", failed.report.display_name);
            if args.json {
                println!("{}", serde_json::to_string_pretty(failed)?);
            }
        }
    }

    if !args.no_save {
        let display_name = &outcome.report().display_name;
        let saved = match &outcome {
            RunOutcome::Failed(failed) => report::save_report(&reports_dir, display_name, failed),
            _ => report::save_report(&reports_dir, display_name, outcome.report()),
        };
        match saved {
            Ok(path) => println!("Full report saved to: {}", path.display()),
            Err(e) => {
                warn!(error = %e, "report file not written");
                eprintln!("warning: {e}");
            }
        }
    }

    Ok(())
}

fn print_report(report: &salesintel_shared::Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report::render_summary(report));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress observer
// ---------------------------------------------------------------------------

/// Pipeline observer drawing an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Observer for CliProgress {
    fn on_stage_start(&self, stage: StageKind, input_summary: &str) {
        self.spinner.set_message(format!(
            "[{}/{}] {stage} ({input_summary})",
            stage.position(),
            StageKind::ALL.len()
        ));
    }

    fn on_stage_complete(&self, stage: StageKind, _output_summary: &str) {
        self.spinner.println(format!("  ok   {stage}"));
    }

    fn on_stage_failed(&self, stage: StageKind, reason: &str) {
        self.spinner.println(format!("  FAIL {stage}: {reason}"));
    }

    fn on_cache_hit(&self, identity: &Identity) {
        self.spinner.set_message(format!("cache hit for {identity}"));
    }

    fn on_pipeline_complete(&self, _identity: &Identity) {
        self.spinner.set_message("report compiled");
    }
}

// ---------------------------------------------------------------------------
// cache
// ---------------------------------------------------------------------------

fn cmd_cache_list(store: &ResultStore) -> Result<()> {
    if store.is_empty() {
        println!("No cached reports in {}", store.path().display());
        return Ok(());
    }

    println!("{} cached report(s) in {}", store.len(), store.path().display());
    for (_, record) in store.records() {
        println!(
            "  {:<30} created {}  last used {}",
            record.display_name,
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.last_accessed_at.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

fn cmd_cache_show(store: &ResultStore, company: &str) -> Result<()> {
    let identity = Identity::parse(company)?;
    match store.peek(&identity) {
        Some(record) => println!("{}", serde_json::to_string_pretty(&record.report)?),
        None => return Err(eyre!("no cached report for '{company}'")),
    }
    Ok(())
}

fn cmd_cache_forget(store: &mut ResultStore, company: &str) -> Result<()> {
    let identity = Identity::parse(company)?;
    if store.remove(&identity)? {
        println!("Removed cached report for {company}");
    } else {
        println!("No cached report for {company}");
    }
    Ok(())
}

fn cmd_cache_clear(store: &mut ResultStore) -> Result<()> {
    let removed = store.clear()?;
    println!("Removed {removed} cached report(s)");
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("# {}", config_file_path()?.display());
    println!("{toml_str}");
    Ok(())
}
