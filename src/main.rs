use std::collections::HashMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use braid_config::{WorkflowDef, convert_n8n};
use braid_engine::{Engine, EngineConfig};
use braid_resolver::{Resolver, StandardResolver};
use braid_step::{Batch, Context, Record, Value};
use braid_telemetry::{Metrics, Registry, encode_text};

/// Braid - a workflow engine for record batches
#[derive(Parser)]
#[command(name = "braid")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a workflow, reading the start step's input from stdin
  Run {
    /// Path to the workflow file (JSON or YAML)
    workflow_file: PathBuf,

    /// Step to start from (default: the definition's start, or its only
    /// entry point)
    #[arg(long)]
    start: Option<String>,

    /// Environment value made available to steps, as KEY=VALUE
    #[arg(long = "env", value_parser = parse_env_pair)]
    env: Vec<(String, String)>,

    /// Maximum step invocations in the run
    #[arg(long)]
    max_invocations: Option<usize>,

    /// Print step metrics to stderr when the run ends
    #[arg(long)]
    metrics: bool,
  },

  /// Check that a workflow file parses and resolves
  Validate {
    /// Path to the workflow file (JSON or YAML)
    workflow_file: PathBuf,
  },

  /// List the registered step types
  Steps,

  /// Convert an n8n flow export into a braid workflow (YAML on stdout)
  Convert {
    /// Path to the n8n JSON export
    flow_file: PathBuf,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Run {
      workflow_file,
      start,
      env,
      max_invocations,
      metrics,
    }) => {
      let config = EngineConfig {
        max_invocations: max_invocations.or(EngineConfig::default().max_invocations),
      };
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(run_workflow(
        workflow_file,
        start,
        env.into_iter().collect(),
        config,
        metrics,
      ))?;
    }
    Some(Commands::Validate { workflow_file }) => validate(workflow_file)?,
    Some(Commands::Steps) => {
      let resolver = resolver()?;
      for step_type in resolver.registry().types() {
        println!("{}", step_type);
      }
    }
    Some(Commands::Convert { flow_file }) => convert(flow_file)?,
    None => {
      println!("braid - use --help to see available commands");
    }
  }

  Ok(())
}

fn resolver() -> Result<StandardResolver> {
  let registry = braid_steps::builtin_registry().context("failed to register built-in steps")?;
  Ok(StandardResolver::new(registry))
}

fn load(workflow_file: &Path) -> Result<WorkflowDef> {
  WorkflowDef::load(workflow_file)
    .with_context(|| format!("failed to load workflow file: {}", workflow_file.display()))
}

async fn run_workflow(
  workflow_file: PathBuf,
  start: Option<String>,
  env: HashMap<String, String>,
  config: EngineConfig,
  print_metrics: bool,
) -> Result<()> {
  let def = load(&workflow_file)?;
  let start = def.start_step(start.as_deref())?;
  let workflow = resolver()?
    .resolve(&def)
    .context("failed to resolve workflow")?;

  let input = read_input_from_stdin()?;
  info!(workflow = %def.name, start = %start, records = input.len(), "workflow_loaded");

  let registry = Registry::new();
  let metrics = Metrics::register(&registry).context("failed to register metrics")?;

  let cancel = CancellationToken::new();
  let ctx = Context::new(Arc::new(metrics))
    .with_env(env)
    .with_cancellation(cancel.clone());

  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      cancel.cancel();
    }
  });

  let engine = Engine::new(config);
  let result = engine.run(&ctx, &workflow, &start, input).await;

  if print_metrics {
    eprint!("{}", encode_text(&registry)?);
  }

  let result = result.context("workflow run failed")?;
  println!("{}", serde_json::to_string_pretty(&result)?);

  Ok(())
}

fn validate(workflow_file: PathBuf) -> Result<()> {
  let def = load(&workflow_file)?;
  let workflow = resolver()?
    .resolve(&def)
    .context("failed to resolve workflow")?;

  println!(
    "{}: {} steps, entry points: {}",
    workflow.name(),
    workflow.step_names().len(),
    workflow.graph().entry_points().join(", ")
  );
  if let Some(cycle) = workflow.find_cycle() {
    println!("cycle: {}", cycle.join(" -> "));
  }

  Ok(())
}

fn convert(flow_file: PathBuf) -> Result<()> {
  let content = std::fs::read_to_string(&flow_file)
    .with_context(|| format!("failed to read flow file: {}", flow_file.display()))?;
  let def = convert_n8n(&content)
    .with_context(|| format!("failed to convert flow file: {}", flow_file.display()))?;

  print!("{}", def.to_yaml_string()?);
  Ok(())
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
  match raw.split_once('=') {
    Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
    _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
  }
}

/// Read the run input from stdin: a JSON array of objects, a single
/// object, or nothing at all.
fn read_input_from_stdin() -> Result<Batch> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    return Ok(Vec::new());
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read input from stdin")?;

  if input.trim().is_empty() {
    return Ok(Vec::new());
  }

  let value: Value = serde_json::from_str(&input).context("failed to parse input JSON from stdin")?;
  match value {
    Value::Array(items) => items
      .into_iter()
      .map(|item| Record::try_from(item).context("input array must contain only objects"))
      .collect(),
    Value::Object(object) => Ok(vec![Record::from(object)]),
    other => bail!("input must be a JSON array or object, got {}", other),
  }
}
