//! metagraph: meta-model inference over typed declarations
//!
//! Derives a graph of logical entity types, their properties and their
//! generalization edges from a declaration model of interfaces and
//! implementation classes, guided only by naming and annotation conventions.

// Declaration model and conventions - re-exported from metagraph-core
pub use metagraph_core::config;
pub use metagraph_core::decl;
pub use metagraph_core::error;
pub use metagraph_core::names;

// Inference engine - re-exported from metagraph-infer
pub use metagraph_infer::builder;
pub use metagraph_infer::field;
pub use metagraph_infer::fingerprint;
pub use metagraph_infer::hierarchy;
pub use metagraph_infer::meta_type;
pub use metagraph_infer::pairing;
pub use metagraph_infer::roles;
pub use metagraph_infer::value_type;

pub use metagraph_core::config::MetaModelConfig;
pub use metagraph_core::decl::{DeclSnapshot, DeclStore, DeclarationModel};
pub use metagraph_core::error::{ErrorCode, MetaModelError, MetaModelResult};
pub use metagraph_infer::{MetaField, MetaModel, MetaType, MetaTypeId, ValueType};
