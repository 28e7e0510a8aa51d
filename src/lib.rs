//! Stage-aware task generation and cached rule explanations.
//!
//! [`service::MethodologyService`] is the entry point; [`api`] exposes it
//! over HTTP.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod models;
pub mod prompt;
pub mod rules;
pub mod schema;
pub mod service;

pub use error::{Error, Result};
