use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quorum_config::WorkflowDef;
use quorum_engine::{
  EngineConfig, ExecutionOptions, ExecutionStatus, NodeInput, NodeInputs, WorkflowEngine,
};
use quorum_provider::{
  Credentials, DEFAULT_OLLAMA_URL, DEFAULT_OPENAI_URL, EchoGateway, OllamaGateway, OpenAiGateway,
  ProviderGateway, RoutingGateway,
};

/// Quorum - run multi-model workflows and compare what the models say
#[derive(Parser)]
#[command(name = "quorum")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Engine config file (JSON)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Base URL of the Ollama server
  #[arg(long, global = true, env = "QUORUM_OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL)]
  ollama_url: String,

  /// Base URL of the OpenAI-compatible endpoint
  #[arg(long, global = true, env = "QUORUM_OPENAI_URL", default_value = DEFAULT_OPENAI_URL)]
  openai_url: String,

  #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
  openai_api_key: Option<String>,

  /// Provider for model names without a `provider/` prefix
  #[arg(long, global = true)]
  default_provider: Option<String>,

  /// Echo prompts back instead of calling any provider
  #[arg(long, global = true)]
  dry_run: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a workflow, or a single node of it
  Run {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,

    /// Run only this node, with stdin as its `input1`
    #[arg(long)]
    node: Option<String>,

    /// Write the execution as JSON to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
  },

  /// Check a workflow file without running it
  Validate {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },

  /// Print the effective engine config
  CheckConfig,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  let config = load_config(cli.config.as_deref())?;

  match &cli.command {
    Some(Commands::Run {
      workflow_file,
      node,
      output,
    }) => {
      let rt = tokio::runtime::Runtime::new()?;
      match node {
        Some(node_id) => rt.block_on(run_node(&cli, config, workflow_file, node_id)),
        None => rt.block_on(run_workflow(&cli, config, workflow_file, output.as_deref())),
      }
    }
    Some(Commands::Validate { workflow_file }) => validate_workflow(workflow_file),
    Some(Commands::CheckConfig) => {
      println!("{}", serde_json::to_string_pretty(&config)?);
      Ok(())
    }
    None => {
      println!("quorum - use --help to see available commands");
      Ok(())
    }
  }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
  match path {
    Some(path) => Ok(EngineConfig::load(path)?),
    None => Ok(EngineConfig::default()),
  }
}

fn load_workflow(workflow_file: &Path) -> Result<WorkflowDef> {
  let content = std::fs::read_to_string(workflow_file)
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))
}

fn validate_workflow(workflow_file: &Path) -> Result<()> {
  let workflow = load_workflow(workflow_file)?;
  match quorum_workflow::validate(&workflow.nodes, &workflow.edges) {
    Ok(()) => {
      println!("{}: ok ({} nodes, {} edges)", workflow.name, workflow.nodes.len(), workflow.edges.len());
      Ok(())
    }
    Err(e) => {
      for reason in e.reasons() {
        println!("- {}", reason);
      }
      bail!("workflow '{}' is invalid", workflow.name)
    }
  }
}

fn build_engine(cli: &Cli, mut config: EngineConfig) -> (WorkflowEngine, Credentials) {
  if let Some(provider) = &cli.default_provider {
    config.default_provider = Some(provider.clone());
  }

  let mut credentials = Credentials::new();
  let gateway: Arc<dyn ProviderGateway> = if cli.dry_run {
    Arc::new(EchoGateway)
  } else {
    let mut openai = OpenAiGateway::new("openai", &cli.openai_url);
    if let Some(key) = &cli.openai_api_key {
      openai = openai.with_api_key(key);
      credentials.insert("openai", key);
    }
    let default_provider = config.default_provider.as_deref().unwrap_or("ollama");
    Arc::new(
      RoutingGateway::new()
        .register("ollama", Arc::new(OllamaGateway::new(&cli.ollama_url)))
        .register("openai", Arc::new(openai))
        .with_default_provider(default_provider),
    )
  };

  (WorkflowEngine::with_config(gateway, config), credentials)
}

async fn run_workflow(cli: &Cli, config: EngineConfig, workflow_file: &Path, output: Option<&Path>) -> Result<()> {
  let workflow = load_workflow(workflow_file)?;
  info!(workflow_id = %workflow.workflow_id, nodes = workflow.nodes.len(), "workflow_loaded");

  let (engine, credentials) = build_engine(cli, config);
  let options = ExecutionOptions::new().with_credentials(credentials);

  let cancel = options.cancel_token();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupt received, cancelling after the current node");
      cancel.cancel();
    }
  });

  let execution = engine.execute_workflow(&workflow, options).await;
  let json = serde_json::to_string_pretty(&execution)?;

  match output {
    Some(path) => std::fs::write(path, &json)
      .with_context(|| format!("failed to write execution to {}", path.display()))?,
    None => println!("{}", json),
  }

  match execution.status {
    ExecutionStatus::Completed => Ok(()),
    ExecutionStatus::Cancelled => bail!("workflow cancelled after {} nodes", execution.results.len()),
    _ => bail!("workflow failed: {}", execution.failed_nodes().join(", ")),
  }
}

async fn run_node(cli: &Cli, config: EngineConfig, workflow_file: &Path, node_id: &str) -> Result<()> {
  let workflow = load_workflow(workflow_file)?;
  let node = workflow
    .get_node(node_id)
    .with_context(|| format!("node '{}' not found in workflow", node_id))?;

  let inputs = match read_stdin()? {
    Some(data) => NodeInputs::new(vec![NodeInput {
      key: "input1".to_string(),
      source: "stdin".to_string(),
      data,
    }]),
    None => NodeInputs::default(),
  };

  let (engine, credentials) = build_engine(cli, config);
  let options = ExecutionOptions::new().with_credentials(credentials);
  let result = engine.execute_node(node, inputs, &options).await;

  println!("{}", serde_json::to_string_pretty(&result)?);
  if !result.success {
    bail!("node '{}' failed", node_id);
  }
  Ok(())
}

/// Read stdin as JSON, falling back to a plain string. `None` when stdin is
/// a terminal or empty.
fn read_stdin() -> Result<Option<serde_json::Value>> {
  let mut stdin = io::stdin();
  if stdin.is_terminal() {
    return Ok(None);
  }

  let mut buffer = String::new();
  stdin
    .read_to_string(&mut buffer)
    .context("failed to read stdin")?;

  let trimmed = buffer.trim();
  if trimmed.is_empty() {
    return Ok(None);
  }
  Ok(Some(
    serde_json::from_str(trimmed).unwrap_or_else(|_| serde_json::Value::String(trimmed.to_string())),
  ))
}
