pub mod actor;
pub mod channel;
pub mod error;
pub mod processor;
pub mod worker;

#[cfg(test)]
mod tests;
