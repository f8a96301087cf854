pub mod connectors;
pub mod context;
pub mod error;
pub mod event_bus;
pub mod metrics;
pub mod retry;
