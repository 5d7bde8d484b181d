//! CLI command implementations.

pub mod build;
pub mod init;
pub mod list;
pub mod saved;
pub mod take;
pub mod validate;
