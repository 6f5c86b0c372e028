//! Meta-model inference for metagraph.
//!
//! This crate derives a graph of logical entity types from a declaration
//! model, using only naming and annotation conventions:
//! - Supertype closures over the declaration hierarchy
//! - Role classification of accessor methods (annotation inheritance)
//! - Field merging, best-match ranking and value-type detection
//! - Interface/implementation pairing and graph construction
//! - Deterministic graph fingerprints

pub mod builder;
pub mod field;
pub mod fingerprint;
pub mod hierarchy;
pub mod meta_type;
pub mod pairing;
pub mod roles;
pub mod value_type;

#[cfg(test)]
mod test_helpers;

pub use builder::{MetaModel, MetaModelBuilder};
pub use field::{Accessor, MetaField};
pub use fingerprint::GraphFingerprint;
pub use meta_type::{MetaType, MetaTypeId};
pub use roles::{role_of_method, AccessorKind, RoleBinding, RoleClassifier};
pub use value_type::{ContainerKind, ValueType};
