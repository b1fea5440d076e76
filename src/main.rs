use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use ftsmind::analysis::{analyze, ModelStatistics};
use ftsmind::builder::Document;
use ftsmind::checkpoint::Checkpoint;
use ftsmind::config::EngineConfig;
use ftsmind::core::{FeaturedTransitionSystem, StateHistory};
use ftsmind::coverage::{
    ActionCoverage, CoverageCriteria, StateCoverage, TransitionCoverage, TransitionPairCoverage,
};
use ftsmind::effects::{Executor, ResolutionPolicy, Scenario};
use ftsmind::fexpr::Configuration;
use ftsmind::io::{self, dot, xml, Format};
use ftsmind::validation::ValidationRules;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ftsmind")]
#[command(version)]
#[command(about = "Validate, analyse and execute featured transition systems", long_about = None)]
struct Cli {
    /// JSON engine configuration
    #[arg(short, long, value_name = "FILE", env = "FTSMIND_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a model and list every violation
    Validate { model: PathBuf },

    /// Report ambiguous, blocking and dead transitions
    Analyze {
        model: PathBuf,

        /// Only consider configurations satisfying this formula
        #[arg(long, value_name = "FEXPR")]
        constraint: Option<String>,

        #[arg(long, value_name = "NUM")]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Print model statistics
    Stats {
        model: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Export a model as Graphviz DOT
    Dot {
        model: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print a model in canonical XML
    Fmt {
        model: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Execute a model under a fixed signal configuration
    Run {
        model: PathBuf,

        /// Signal values, e.g. `mapping=true,lidar=false`
        #[arg(short, long, default_value = "", env = "FTSMIND_SIGNALS")]
        signals: String,

        #[arg(long, value_name = "NUM")]
        steps: Option<usize>,

        #[arg(long, env = "FTSMIND_POLICY")]
        policy: Option<ResolutionPolicy>,

        /// Write a checkpoint when the run stops
        #[arg(long, value_name = "FILE")]
        checkpoint: Option<PathBuf>,

        /// Continue from a checkpoint instead of the start state
        #[arg(long, value_name = "FILE")]
        resume: Option<PathBuf>,
    },

    /// Replay a sequence of actions and report coverage
    Replay {
        model: PathBuf,

        /// Comma-separated actions, e.g. `map,move,clean`
        #[arg(short, long)]
        actions: String,

        #[arg(short, long, default_value = "", env = "FTSMIND_SIGNALS")]
        signals: String,

        #[arg(long, env = "FTSMIND_POLICY")]
        policy: Option<ResolutionPolicy>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    ftsmind::logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path).context("Failed to load configuration")?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Validate { model } => cmd_validate(&config, &model),
        Commands::Analyze {
            model,
            constraint,
            limit,
            json,
        } => {
            let config = config
                .with_analysis_overrides(constraint, limit)
                .context("Invalid analysis options")?;
            cmd_analyze(&config, &model, json)
        }
        Commands::Stats { model, json } => cmd_stats(&config, &model, json),
        Commands::Dot { model, output } => {
            let fts = load(&config, &model)?;
            emit(&dot::to_dot(&fts), output.as_deref())
        }
        Commands::Fmt { model, output } => {
            let fts = load(&config, &model)?;
            emit(&xml::to_string(&fts), output.as_deref())
        }
        Commands::Run {
            model,
            signals,
            steps,
            policy,
            checkpoint,
            resume,
        } => {
            let options = RunOptions {
                signals: Configuration::parse_assignments(&signals)
                    .context("Invalid --signals")?,
                steps: steps.unwrap_or(config.max_steps),
                policy,
                checkpoint,
                resume,
            };
            cmd_run(&config, &model, options).await
        }
        Commands::Replay {
            model,
            actions,
            signals,
            policy,
        } => {
            let signals = Configuration::parse_assignments(&signals).context("Invalid --signals")?;
            let scenario = Scenario::new(
                "cli",
                actions.split(',').map(str::trim).filter(|a| !a.is_empty()),
            );
            cmd_replay(&config, &model, &scenario, &signals, policy.unwrap_or(config.policy))
        }
    }
}

fn read_document(path: &Path) -> Result<Document> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read model '{}'", path.display()))?;
    let doc = match Format::of(path) {
        Format::Dot => dot::parse_document(&text)?,
        Format::Xml => xml::parse_document(&text)?,
    };
    Ok(doc)
}

fn load(config: &EngineConfig, path: &Path) -> Result<FeaturedTransitionSystem> {
    let fts = io::load_path(path, &config.rules())
        .with_context(|| format!("Failed to load model '{}'", path.display()))?;
    info!(
        states = fts.state_count(),
        transitions = fts.transition_count(),
        "loaded model"
    );
    Ok(fts)
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Cannot write '{}'", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn cmd_validate(config: &EngineConfig, path: &Path) -> Result<()> {
    let rules: ValidationRules = config.rules();
    let doc = read_document(path)?;

    let violations = rules.violations(&doc);
    for v in &violations {
        println!("{}: {v}", if v.is_fatal() { "error" } else { "warning" });
    }

    let fts = doc.build(&rules)?;
    println!(
        "{}: {} states, {} transitions, start '{}'",
        path.display(),
        fts.state_count(),
        fts.transition_count(),
        fts.start()
    );
    Ok(())
}

fn cmd_analyze(config: &EngineConfig, path: &Path, json: bool) -> Result<()> {
    let fts = load(config, path)?;
    let report = analyze(&fts, &config.analysis_options()?)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn cmd_stats(config: &EngineConfig, path: &Path, json: bool) -> Result<()> {
    let fts = load(config, path)?;
    let stats = ModelStatistics::compute(&fts);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{stats}");
    }
    Ok(())
}

struct RunOptions {
    signals: Configuration,
    steps: usize,
    /// Explicit `--policy`; a resumed run otherwise keeps the checkpoint's.
    policy: Option<ResolutionPolicy>,
    checkpoint: Option<PathBuf>,
    resume: Option<PathBuf>,
}

async fn cmd_run(config: &EngineConfig, path: &Path, options: RunOptions) -> Result<()> {
    let fts = Arc::new(load(config, path)?);

    let mut executor = match &options.resume {
        Some(file) => {
            let checkpoint = Checkpoint::load(file)?;
            Executor::resume_with_policy(Arc::clone(&fts), checkpoint, options.policy)?
        }
        None => Executor::new(Arc::clone(&fts)).with_policy(options.policy.unwrap_or(config.policy)),
    };
    let already = executor.history().len();

    let outcome = executor.run(&options.signals, options.steps).await;

    for step in &executor.history().transitions()[already..] {
        println!("{}: {} --{}--> {}", step.step, step.from, step.action, step.to);
    }

    if let Some(file) = &options.checkpoint {
        executor.checkpoint().save(file)?;
        println!("checkpoint written to {}", file.display());
    }

    let fired = outcome?;
    if executor.is_sink() {
        println!("halted in sink state {}", executor.current_state());
    } else {
        warn!(fired, "step budget exhausted");
        println!(
            "stopped in {} after {} step(s)",
            executor.current_state(),
            fired
        );
    }
    print_coverage(&fts, std::slice::from_ref(executor.history()));
    Ok(())
}

fn cmd_replay(
    config: &EngineConfig,
    path: &Path,
    scenario: &Scenario,
    signals: &Configuration,
    policy: ResolutionPolicy,
) -> Result<()> {
    if scenario.is_empty() {
        bail!("--actions names no action");
    }
    let fts = Arc::new(load(config, path)?);
    let history = scenario.replay(Arc::clone(&fts), signals, policy)?;
    let path: Vec<&str> = history.get_path().into_iter().map(|s| s.as_str()).collect();
    println!("{scenario}");
    println!("{}", path.join(" -> "));
    print_coverage(&fts, std::slice::from_ref(&history));
    Ok(())
}

fn print_coverage(fts: &FeaturedTransitionSystem, histories: &[StateHistory]) {
    let state = StateCoverage::new(fts);
    let transition = TransitionCoverage::new(fts);
    let action = ActionCoverage::new(fts);
    let pair = TransitionPairCoverage::new(fts);
    for (name, value) in [
        (state.name(), state.coverage(histories)),
        (transition.name(), transition.coverage(histories)),
        (action.name(), action.coverage(histories)),
        (pair.name(), pair.coverage(histories)),
    ] {
        println!("{name}: {:.1}%", value * 100.0);
    }
}
