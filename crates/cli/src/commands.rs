use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Process shard requests until the input ends or a shutdown signal arrives
    Run {
        #[arg(long, help = "JSON settings file")]
        config: Option<PathBuf>,

        #[arg(long, help = "A .env file whose SHARD_WORKER_* entries override the environment")]
        env_file: Option<PathBuf>,

        #[arg(
            long,
            help = "Read inbound envelopes (one JSON object per line) from this file instead of stdin"
        )]
        input: Option<PathBuf>,

        #[arg(
            long,
            help = "Append status reports (one JSON object per line) to this file instead of stdout"
        )]
        output: Option<PathBuf>,

        #[arg(long, help = "Records per chunk, overrides config and environment")]
        chunk_size: Option<usize>,

        #[arg(long, help = "Write the stored entities to this file as JSON on exit")]
        dump_store: Option<PathBuf>,
    },
    /// Decode one inbound envelope and print what the worker would process
    Inspect {
        /// File holding a single envelope
        file: PathBuf,
    },
}
