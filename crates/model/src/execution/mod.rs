pub mod failure;
pub mod shard;
pub mod status;
