//! Quill CLI binary: research, write and edit an article from the command line.
//!
//! Subcommands: `run` (the full pipeline), `graph` (print the workflow topology).

mod capabilities;
mod display;
mod logging;
mod settings;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quill::prompts::{self, EditorStyle};
use quill::{generate_dot, generate_text, ArticleWorkflow, WorkflowOutput};
use quill_config::ProviderSettings;
use tokio::sync::mpsc;

use settings::{Overrides, APP_NAME};

/// Max chars per field in the stderr state summary.
const SUMMARY_MAX_LEN: usize = 120;

#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Quill: research, write and edit an article with LLM agents")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Verbose: progress lines on stderr (-v), debug logs (-vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run researcher → writer → editor for a topic
    Run(RunArgs),
    /// Print the workflow graph without calling any model or tool
    Graph(GraphArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Article topic (several words are joined with spaces)
    #[arg(required = true, value_name = "TOPIC")]
    topic: Vec<String>,

    /// Target length in words (default 800)
    #[arg(short, long, value_name = "N", allow_negative_numbers = true)]
    words: Option<i64>,

    #[command(flatten)]
    workflow: WorkflowArgs,

    /// Attempts per call (at least 1)
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// Per-call timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Node execution budget per attempt
    #[arg(long, value_name = "N")]
    max_steps: Option<usize>,

    /// Sampling temperature for all three agents (0-2)
    #[arg(long, value_name = "T")]
    temperature: Option<f32>,

    /// Web search results per query
    #[arg(long, value_name = "N")]
    search_results: Option<u32>,

    /// Do not log node enter/exit
    #[arg(long)]
    no_node_logs: bool,

    /// Print JSON instead of plain text
    #[arg(long)]
    json: bool,

    /// Return the whole final state (JSON with --json, summary on stderr otherwise)
    #[arg(long)]
    full_state: bool,

    /// With --json, pretty-print
    #[arg(long)]
    pretty: bool,
}

#[derive(clap::Args, Debug)]
struct GraphArgs {
    #[command(flatten)]
    workflow: WorkflowArgs,

    /// Graphviz DOT instead of the text listing
    #[arg(long)]
    dot: bool,
}

/// Options shared by `run` and `graph`.
#[derive(clap::Args, Debug)]
struct WorkflowArgs {
    /// Editor style: General, Emotional, Hilarious or Critical
    #[arg(short, long, value_name = "STYLE")]
    style: Option<EditorStyle>,

    /// Disable image generation
    #[arg(long)]
    no_images: bool,

    /// Workflow config file (TOML); default: [workflow] in the XDG config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory with researcher.yaml, writer.yaml and editor.yaml (default: $QUILL_PROMPTS_DIR, ./prompts)
    #[arg(long, value_name = "DIR")]
    prompts: Option<PathBuf>,
}

impl WorkflowArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            style: self.style,
            no_images: self.no_images,
            ..Overrides::default()
        }
    }
}

fn write_json(value: &serde_json::Value, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let s = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", s);
    Ok(())
}

async fn run_article(args: RunArgs, verbose: u8) -> Result<(), Box<dyn std::error::Error>> {
    let overrides = Overrides {
        retries: args.retries,
        timeout_seconds: args.timeout,
        max_steps: args.max_steps,
        quiet_nodes: args.no_node_logs,
        ..args.workflow.overrides()
    };
    let config = settings::resolve(args.workflow.config.as_deref(), &overrides)?;
    let prompt_set = prompts::load_or_default(args.workflow.prompts.as_deref())?;
    let provider = ProviderSettings::from_env();
    tracing::debug!(?provider, ?config, "starting run");

    let tuning = capabilities::Tuning {
        temperature: args.temperature,
        search_results: args.search_results,
    };
    let workflow = ArticleWorkflow::new(capabilities::from_settings(&provider, &tuning), prompt_set);
    let topic = args.topic.join(" ");

    let output = if verbose > 0 {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                eprintln!("{}", display::progress_line(&event));
            }
        });
        let result = workflow
            .main_workflow_with_progress(&topic, args.words, &config, args.full_state, tx)
            .await;
        let _ = printer.await;
        result?
    } else {
        workflow
            .main_workflow(&topic, args.words, &config, args.full_state)
            .await?
    };

    match (&output, args.json) {
        (WorkflowOutput::Article(text), true) => {
            write_json(&serde_json::json!({ "topic": topic, "article": text }), args.pretty)?
        }
        (WorkflowOutput::FullState(state), true) => {
            write_json(&serde_json::to_value(state)?, args.pretty)?
        }
        (WorkflowOutput::Article(text), false) => println!("{}", text),
        (WorkflowOutput::FullState(state), false) => {
            eprintln!("{}", display::state_summary(state, SUMMARY_MAX_LEN));
            println!("{}", output.article().unwrap_or_default());
        }
    }
    Ok(())
}

async fn print_graph(args: GraphArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = settings::resolve(args.workflow.config.as_deref(), &args.workflow.overrides())?;
    let prompt_set = prompts::load_or_default(args.workflow.prompts.as_deref())?;
    let graph = ArticleWorkflow::new(capabilities::placeholders(), prompt_set)
        .graph(&config)
        .await?;
    if args.dot {
        print!("{}", generate_dot(&graph));
    } else {
        print!("{}", generate_text(&graph));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if let Err(e) = quill_config::load_and_apply(APP_NAME, None) {
        eprintln!("quill: config: {}", e);
    }
    logging::init(args.verbose)?;

    let result = match args.cmd {
        Command::Run(run) => run_article(run, args.verbose).await,
        Command::Graph(graph) => print_graph(graph).await,
    };
    if let Err(e) = result {
        eprintln!("quill: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
