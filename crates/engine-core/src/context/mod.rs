pub mod identity;
pub mod process;
