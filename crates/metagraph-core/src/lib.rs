//! Core infrastructure for metagraph.
//!
//! This crate provides the language-level vocabulary the inference engine
//! works on:
//! - Declaration model (types, methods, annotations, type references)
//! - In-memory declaration store and JSON snapshots
//! - Naming conventions and their configuration
//! - Error types and error codes

pub mod config;
pub mod decl;
pub mod error;
pub mod names;
