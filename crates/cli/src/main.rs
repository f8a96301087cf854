use crate::{
    commands::Commands,
    env::EnvManager,
    error::CliError,
    io::{JsonLinesOutbound, json_lines_inbound, parse_envelope},
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use engine_config::settings::loader::load_settings;
use engine_core::{
    connectors::store::MemoryStore, context::process::ProcessContext,
};
use engine_processing::envelope::decode;
use engine_runtime::{channel::OutboundChannel, worker::Worker};
use std::{path::PathBuf, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod io;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(name = "shard-worker", version = "0.1.0", about = "Remote-partitioning shard worker")]
struct Cli {
    #[arg(long, global = true, help = "Emit logs as JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let code = match execute(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "shard-worker failed");
            ExitCode::GeneralError
        }
    };

    // Exit directly: a stdin reader may still be parked on a blocking read.
    std::process::exit(code.as_i32());
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr; stdout may carry status reports.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn execute(command: Commands) -> Result<ExitCode, CliError> {
    match command {
        Commands::Run {
            config,
            env_file,
            input,
            output,
            chunk_size,
            dump_store,
        } => {
            run(RunArgs {
                config,
                env_file,
                input,
                output,
                chunk_size,
                dump_store,
            })
            .await
        }
        Commands::Inspect { file } => {
            let text = tokio::fs::read_to_string(&file).await?;
            let shard = decode(&parse_envelope(text.trim()))?;
            output::print_shard_summary(&shard)?;
            Ok(ExitCode::Success)
        }
    }
}

struct RunArgs {
    config: Option<PathBuf>,
    env_file: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    chunk_size: Option<usize>,
    dump_store: Option<PathBuf>,
}

async fn run(args: RunArgs) -> Result<ExitCode, CliError> {
    let mut env = EnvManager::new();
    if let Some(path) = &args.env_file {
        env.load_from_file(path)?;
    }
    debug!(vars = ?env.worker_vars_redacted(), "Worker environment");

    let mut builder = load_settings(args.config.as_deref(), env.all())?;
    if let Some(chunk_size) = args.chunk_size {
        builder = builder.chunk_size(chunk_size);
    }
    let settings = builder.build()?;

    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let outbound: Arc<dyn OutboundChannel> = match &args.output {
        Some(path) => Arc::new(JsonLinesOutbound::file(settings.outbound_channel(), path).await?),
        None => Arc::new(JsonLinesOutbound::stdout(settings.outbound_channel())),
    };

    let inbound = match &args.input {
        Some(path) => json_lines_inbound(
            settings.inbound_channel(),
            tokio::fs::File::open(path).await?,
            settings.mailbox_capacity(),
            shutdown.cancel_token(),
        ),
        None => json_lines_inbound(
            settings.inbound_channel(),
            tokio::io::stdin(),
            settings.mailbox_capacity(),
            shutdown.cancel_token(),
        ),
    };

    let store = MemoryStore::new();
    let ctx = Arc::new(ProcessContext::new(format!(
        "shard-worker-{}",
        std::process::id()
    )));
    let worker = Worker::new(settings, Arc::new(store.clone()), outbound, ctx);

    let report = worker.run(inbound, shutdown.cancel_token()).await?;
    output::print_report(&report)?;

    if let Some(path) = &args.dump_store {
        let count = output::dump_store(&store, path).await?;
        info!(path = %path.display(), entities = count, "Store written");
    }

    Ok(ExitCode::for_run(shutdown.stop_signal(), &report))
}
