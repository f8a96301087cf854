pub mod reader;
pub mod transformer;
pub mod writer;
