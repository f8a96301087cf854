pub mod components;
pub mod config;
pub mod engine;
pub mod execution;

pub use components::{reader::ShardReader, transformer::ItemTransformer, writer::ChunkWriter};
pub use config::StepConfig;
pub use engine::{ChunkedStep, StepState};
pub use execution::StepExecution;
