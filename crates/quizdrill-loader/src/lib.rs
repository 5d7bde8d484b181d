//! quizdrill-loader — content loading and quiz composition.
//!
//! Fetches question-set documents from an HTTP or directory source through a
//! shared cache, pools them in cancellable batch windows, and composes
//! runnable quizzes for the session layer. Also persists custom quizzes
//! between runs.

pub mod batch;
pub mod cache;
pub mod composer;
pub mod config;
pub mod controller;
pub mod error;
pub mod fetcher;
pub mod mock;
pub mod source;
pub mod store;

pub use config::{create_source, load_config, QuizdrillConfig, SourceConfig};
pub use error::{LoadError, SourceError, StoreError};
