//! Grater - downstream regression testing for library releases
//!
//! The `grater` command finds the projects that import a library, ranks them
//! by trust score, and re-runs their tests against two library refs.
//!
//! ## Commands
//!
//! - `prepare`: Create the workspace directory and an empty module list
//! - `find`: Discover and rank importers, writing the module list
//! - `run`: Test every listed module against base and head
//! - `report`: Summarize the last run and gate on regressions

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};

use grater_core::obs::emit_verdict_computed;
use grater_core::{
    init_tracing, render_human, render_json, FsScoreStore, GraterConfig, PassSpan, RefOutcome,
    ReportSummary, Workspace,
};
use grater_discovery::{
    discover_and_rank, resolve_library, PkgGoDevImporter, RankingConfig, RankingEngine,
    ScorecardFactory,
};
use grater_runner::{DockerExecutor, ModuleRecord, Orchestrator, RunObserver, RunTarget};

#[derive(Parser)]
#[command(name = "grater")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Downstream regression testing for library releases", long_about = None)]
struct Cli {
    /// Enable verbose output (debug logs, detailed report)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Workspace directory (default: .grater)
    #[arg(long, global = true, env = "GRATER_WORKSPACE")]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the workspace and an empty module list
    Prepare,

    /// Find importers of the library and rank them by score
    Find {
        /// Keep only the N highest-ranked modules (0 keeps all)
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        limit: i64,

        /// Library module path (default: git origin of the current directory)
        #[arg(short, long)]
        repo: Option<String>,

        /// Number of concurrent scoring workers
        #[arg(long, env = "GRATER_CONCURRENCY")]
        concurrency: Option<usize>,
    },

    /// Test every listed module against the base and head refs
    Run {
        /// Library repository under test
        #[arg(short, long, env = "GRATER_REPO")]
        repo: String,

        /// Baseline library ref
        #[arg(long, default_value = "main")]
        base: String,

        /// Candidate library ref
        #[arg(long, default_value = "HEAD")]
        head: String,

        /// Executor image name
        #[arg(long, env = "GRATER_IMAGE")]
        image: Option<String>,

        /// Dockerfile used to build the executor image
        #[arg(long, default_value = "docker/dockerfile")]
        dockerfile: PathBuf,

        /// Build context for the executor image
        #[arg(long, default_value = "docker")]
        context: PathBuf,

        /// Use an existing image instead of building one
        #[arg(long)]
        skip_build: bool,
    },

    /// Summarize the last run
    Report {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Simple)]
        format: ReportFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Simple,
    Json,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let mut config = GraterConfig::from_env().context("Invalid grater configuration")?;
    if let Some(workspace) = cli.workspace {
        config.workspace = workspace;
    }

    match cli.command {
        Commands::Prepare => cmd_prepare(&config.workspace).map(|_| ExitCode::SUCCESS),
        Commands::Find {
            limit,
            repo,
            concurrency,
        } => {
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency;
                config.validate()?;
            }
            cmd_find(&config, repo.as_deref(), limit)
                .await
                .map(|_| ExitCode::SUCCESS)
        }
        Commands::Run {
            repo,
            base,
            head,
            image,
            dockerfile,
            context,
            skip_build,
        } => {
            if let Some(image) = image {
                config.image = image;
            }
            let build = (!skip_build).then_some((dockerfile.as_path(), context.as_path()));
            cmd_run(&config, RunTarget::new(repo, base, head), build)
                .await
                .map(|_| ExitCode::SUCCESS)
        }
        Commands::Report { format } => {
            cmd_report(&config.workspace, format, cli.verbose).map(ExitCode::from)
        }
    }
}

/// Create the workspace directory and an empty module list
fn cmd_prepare(root: &Path) -> Result<()> {
    let workspace = Workspace::ensure(root)
        .with_context(|| format!("Failed to create workspace at {:?}", root))?;
    let created = workspace.init_modules()?;

    println!("Workspace ready at {:?}", workspace.root());
    if created {
        println!("Created empty module list at {:?}", workspace.modules_path());
    } else {
        println!(
            "Kept existing module list at {:?}",
            workspace.modules_path()
        );
    }
    Ok(())
}

/// Discover importers, rank them and write the module list
async fn cmd_find(config: &GraterConfig, repo: Option<&str>, limit: i64) -> Result<()> {
    let _span = PassSpan::enter("find");

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let library = resolve_library(repo, &cwd).context("Failed to resolve library path")?;
    info!("Finding importers of {}", library);

    let workspace = Workspace::ensure(&config.workspace)
        .with_context(|| format!("Failed to create workspace at {:?}", config.workspace))?;
    let mut store = FsScoreStore::open(workspace.cache_path());

    let importer = PkgGoDevImporter::new(config.importer_url.clone(), config.http_timeout())?;
    let engine = RankingEngine::new(
        ScorecardFactory::new(config.scorecard_url.clone(), config.http_timeout()),
        RankingConfig {
            concurrency: config.concurrency,
            limit,
            request_delay: config.request_delay(),
        },
    );

    let outcome = discover_and_rank(&importer, &engine, &library, &mut store)
        .await
        .with_context(|| format!("Failed to rank importers of {}", library))?;

    let path = workspace.write_modules(&outcome.paths())?;
    println!(
        "Successfully saved {} modules to {:?}",
        outcome.ranked.len(),
        path
    );
    if outcome.failed > 0 {
        println!(
            "{} modules could not be scored and were ranked last",
            outcome.failed
        );
    }
    Ok(())
}

/// Prints a per-module summary as the run progresses.
struct ConsoleObserver;

fn describe_ref(outcome: &RefOutcome) -> String {
    if outcome.skipped {
        format!("SKIPPED - {}", outcome.error)
    } else if outcome.passed {
        "PASS".to_string()
    } else if outcome.error.is_empty() {
        "FAIL".to_string()
    } else {
        format!("FAIL - {}", outcome.error)
    }
}

impl RunObserver for ConsoleObserver {
    fn module_started(&mut self, index: usize, total: usize, module: &str) {
        println!();
        println!("========================================");
        println!("Testing module [{}/{}]: {}", index, total, module);
        println!("========================================");
    }

    fn module_finished(&mut self, _index: usize, _total: usize, record: &ModuleRecord) {
        if let Some(error) = &record.invocation_error {
            println!("Test failed: {}", error);
            println!("   Status: {}", record.status);
            return;
        }
        let result = &record.result;
        println!("Results for {}:", result.module);
        println!("   Base ({}): {}", result.base.git_ref, describe_ref(&result.base));
        println!("   Head ({}): {}", result.head.git_ref, describe_ref(&result.head));
        println!("   Status: {}", record.status);
    }
}

/// Test every listed module against base and head, then persist results
async fn cmd_run(
    config: &GraterConfig,
    target: RunTarget,
    build: Option<(&Path, &Path)>,
) -> Result<()> {
    let _span = PassSpan::enter("run");

    let workspace = Workspace::ensure(&config.workspace)
        .with_context(|| format!("Failed to create workspace at {:?}", config.workspace))?;
    let modules = workspace.read_modules()?;

    let executor = DockerExecutor::new(config.image.clone());
    if let Some((dockerfile, context)) = build {
        println!("Building image {}...", config.image);
        executor
            .build_image(dockerfile, context)
            .await
            .context("Failed to build executor image")?;
    }

    let orchestrator = Orchestrator::new(executor, target);
    let outcome = orchestrator.run(&modules, &mut ConsoleObserver).await;
    let (results, detailed) = outcome.persist(&workspace)?;

    println!();
    println!("Tested {} modules", outcome.records.len());
    println!("Results saved to {:?}", results);
    println!("Detailed results saved to {:?}", detailed);
    Ok(())
}

/// Render the report; returns the process exit code.
fn cmd_report(root: &Path, format: ReportFormat, verbose: bool) -> Result<u8> {
    let workspace = Workspace::at(root);
    let results = workspace
        .read_detailed_results()
        .context("Failed to load detailed results")?;

    let summary = ReportSummary::from_results(&results);
    emit_verdict_computed(summary.total_modules, summary.status.as_str());

    match format {
        ReportFormat::Json => println!("{}", render_json(&summary)?),
        ReportFormat::Simple => print!("{}", render_human(&summary, verbose)),
    }
    Ok(summary.status.exit_code())
}
