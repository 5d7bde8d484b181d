//! quizdrill-core — Quiz data model, session engine, and scoring.
//!
//! This crate defines the catalogue manifest, the question and quiz
//! types, the session state machine, and the scoring logic that the
//! whole quizdrill system builds on.

pub mod error;
pub mod manifest;
pub mod model;
pub mod report;
pub mod score;
pub mod session;
