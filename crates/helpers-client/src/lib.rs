//! Helpers Client - HTTP adapters for agent tools
//!
//! This crate provides clients for:
//!
//! - [`brave`] - Brave Search web API
//! - [`ollama`] - a local Ollama language model server
//! - [`eudata`] - the data.europa.eu open-data catalog (SPARQL and REST)
//!
//! # Overview
//!
//! Each client builds requests from its config, maps transport failures and
//! non-2xx responses onto [`helpers_core::AppError`], and normalizes the
//! provider payload into the record types of [`helpers_core::models`].

pub mod brave;
pub mod eudata;
mod http;
pub mod ollama;

// Re-export main client types
pub use brave::BraveSearchClient;
pub use eudata::EuDataClient;
pub use ollama::OllamaClient;
