//! The `pixelpipe run` command.

use clap::Args;
use pixelpipe_core::pipeline::load_operations;
use pixelpipe_core::{
    Config, ConfigError, OperationSpec, PipelineExecutor, PipelineResult, PipelineStatus,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Image to read
    pub input: PathBuf,

    /// Where to write the result; the extension picks the format
    pub output: PathBuf,

    /// Pipeline document (.json or .toml) with the operation list
    #[arg(short, long, value_name = "FILE")]
    pub pipeline: Option<PathBuf>,

    /// Inline operation, e.g. `resize:width=800,height=600` (repeatable, appended after --pipeline)
    #[arg(long = "op", value_name = "SPEC")]
    pub ops: Vec<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Run per-pixel loops on all cores
    #[arg(long)]
    pub parallel: bool,
}

/// Execute the run command.
pub fn execute(args: RunArgs, mut config: Config) -> anyhow::Result<ExitCode> {
    if args.parallel {
        config.processing.parallel = true;
    }
    if config.processing.parallel {
        init_thread_pool(config.processing.threads);
    }

    let result = match collect_operations(&args, &config) {
        Ok(ops) => {
            tracing::info!(
                "Running {} operation(s) on {:?}",
                ops.len(),
                args.input
            );
            PipelineExecutor::new(&config).process_image(&args.input, &args.output, &ops)
        }
        Err(e) => PipelineResult {
            status: PipelineStatus::ConfigError,
            message: e.to_string(),
        },
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.is_success() {
        println!("{}", result.message);
    } else {
        eprintln!("{}: {}", result.status, result.message);
    }

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Document operations first, then `--op` entries in command-line order.
fn collect_operations(args: &RunArgs, config: &Config) -> Result<Vec<OperationSpec>, ConfigError> {
    let document = args
        .pipeline
        .clone()
        .or_else(|| config.default_pipeline_file());

    let mut ops = match document {
        Some(path) => read_document(&path)?,
        None => Vec::new(),
    };
    for spec in &args.ops {
        ops.push(spec.parse()?);
    }
    Ok(ops)
}

fn read_document(path: &Path) -> Result<Vec<OperationSpec>, ConfigError> {
    tracing::debug!("Reading pipeline document {:?}", path);
    load_operations(path)
}

fn init_thread_pool(threads: Option<usize>) {
    let Some(threads) = threads else {
        return;
    };
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        tracing::warn!("Could not size the thread pool to {threads}: {e}");
    }
}
