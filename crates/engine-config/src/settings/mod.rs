pub mod error;
pub mod loader;
pub mod validated;
pub mod validator;
