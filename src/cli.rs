use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use plotpass_core::{AbortSignal, Layer};
use plotpass_engine::{PassPlan, PlanOptions};
use plotpass_settings::Config;
use plotpass_worker::caps::layers_from_records;
use plotpass_worker::{
    LayerRecord, LocalWorkerFactory, RenderRequest, RenderResponse, RenderSummary, WorkerClient,
};

#[derive(Debug, Parser)]
#[command(
    name = "plotpass",
    about = "Plan pen-plotter passes under a per-pass drawing budget",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")")
)]
pub struct Cli {
    /// Configuration file (.toml or .json), defaults to the platform config path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Optimize and split a layer file into passes.
    Plan(PlanArgs),

    /// Print the effective configuration as TOML.
    Config,
}

/// Which adapter runs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Realized layer tree on the calling thread
    Inline,
    /// Supervised background worker
    Worker,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Layer records as JSON
    #[arg(long)]
    pub input: PathBuf,

    /// Output file, stdout when omitted
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Per-pass drawing budget in meters, overrides the configuration
    #[arg(long)]
    pub budget_meters: Option<f64>,

    /// Keep the generated path order
    #[arg(long)]
    pub no_optimize: bool,

    #[arg(long, value_enum, default_value_t = Mode::Inline)]
    pub mode: Mode,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match Config::default_path() {
            Ok(path) => Config::load_or_default(&path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            Err(_) => Ok(Config::default()),
        },
    }
}

pub fn read_layer_records(path: &Path) -> anyhow::Result<Vec<LayerRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid layer file {}", path.display()))
}

/// Runs the inline adapter and shapes its output like a worker response.
pub fn plan_inline(
    config: &Config,
    records: Vec<LayerRecord>,
    budget_meters: Option<f64>,
    options: PlanOptions,
) -> anyhow::Result<RenderResponse> {
    let mut warnings = Vec::new();
    let layers: Vec<Layer> = layers_from_records(records, &config.worker.caps(), &mut warnings);
    let budget = plotpass_core::TravelBudget::from_meters(budget_meters);

    let (_, plan) = plotpass_layers::render_layers(
        &layers,
        budget,
        options,
        config.engine.flatten_tolerance,
        AbortSignal::new(),
    )?;
    Ok(response_from_plan(plan, warnings))
}

fn response_from_plan(plan: PassPlan, warnings: Vec<String>) -> RenderResponse {
    RenderResponse {
        summary: RenderSummary {
            limit_meters: plan.limit_meters,
            split_layers: plan.split_layers,
            total_layers: plan.total_layers,
            warnings,
        },
        passes: plan.passes,
    }
}

/// Runs the pipeline through a supervised background worker.
pub async fn plan_worker(
    config: &Config,
    records: Vec<LayerRecord>,
    budget_meters: Option<f64>,
    options: PlanOptions,
) -> anyhow::Result<RenderResponse> {
    let client = WorkerClient::new(
        config.worker.client_config(),
        LocalWorkerFactory::new(config.worker.worker_options()),
    );
    let request = RenderRequest::from_records(records, budget_meters, options.optimize);
    Ok(client.render_request(request, &AbortSignal::new()).await?)
}

pub async fn run_plan(config: &Config, args: PlanArgs) -> anyhow::Result<()> {
    let records = read_layer_records(&args.input)?;
    let budget_meters = args
        .budget_meters
        .or(config.engine.max_travel_per_layer_meters);
    let options = PlanOptions {
        optimize: config.engine.optimize_travel && !args.no_optimize,
    };

    tracing::info!(
        layers = records.len(),
        mode = ?args.mode,
        budget_meters = ?budget_meters,
        "Planning passes"
    );

    let response = match args.mode {
        Mode::Inline => plan_inline(config, records, budget_meters, options)?,
        Mode::Worker => plan_worker(config, records, budget_meters, options).await?,
    };

    for warning in &response.summary.warnings {
        tracing::warn!("{}", warning);
    }
    tracing::info!(
        passes = response.summary.total_layers,
        split_layers = response.summary.split_layers,
        "Passes planned"
    );

    let json = serde_json::to_string_pretty(&response)?;
    match args.output {
        Some(path) => std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    crate::init_logging(cli.json_logs || config.logging.json)?;

    match cli.command {
        Commands::Plan(args) => run_plan(&config, args).await,
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
