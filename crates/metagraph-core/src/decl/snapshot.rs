//! Serializable description of a declaration model.
//!
//! A [`DeclSnapshot`] lists packages and types in JSON form, with type
//! references written in their textual syntax (see [`TypeRef`]):
//!
//! ```json
//! {
//!   "packages": ["spoon.support.reflect.code"],
//!   "types": [
//!     {
//!       "kind": "interface",
//!       "name": "spoon.reflect.code.CtBlock",
//!       "interfaces": ["spoon.reflect.code.CtStatement"],
//!       "methods": [
//!         {
//!           "name": "getStatements",
//!           "returns": "java.util.List<spoon.reflect.code.CtStatement>",
//!           "annotations": [
//!             { "type": "spoon.reflect.annotations.PropertyGetter", "role": "STATEMENT" }
//!           ]
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Supertype references may name types that are absent from the snapshot;
//! whether that is acceptable is decided by the consumer, not here.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{Annotation, DeclStore, MethodDecl, TypeDecl, TypeKind, TypeRef};
use crate::error::{MetaModelError, MetaModelResult};

/// A whole declaration model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclSnapshot {
    /// Packages that exist even if no type in the snapshot lives in them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,
    #[serde(default)]
    pub types: Vec<TypeEntry>,
}

/// One type declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeEntry {
    pub kind: TypeKind,
    /// Fully qualified name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodEntry>,
}

/// One method declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodEntry {
    pub name: String,
    /// Return type text; absent means `void`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationEntry>,
}

/// One annotation instance; every key besides `type` is an element value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationEntry {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, String>,
}

impl From<&AnnotationEntry> for Annotation {
    fn from(entry: &AnnotationEntry) -> Self {
        Annotation {
            type_name: entry.type_name.clone(),
            values: entry.values.clone(),
        }
    }
}

impl DeclSnapshot {
    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> MetaModelResult<DeclSnapshot> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a [`DeclStore`] holding every declaration of this snapshot.
    ///
    /// Types receive IDs in snapshot order, then their methods in
    /// declaration order.
    pub fn to_store(&self) -> MetaModelResult<DeclStore> {
        let mut store = DeclStore::new();
        for package in &self.packages {
            store.insert_package(package);
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for entry in &self.types {
            if entry.name.trim().is_empty() {
                return Err(MetaModelError::invalid_snapshot("type with empty name"));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(MetaModelError::invalid_snapshot(format!(
                    "duplicate type {}",
                    entry.name
                )));
            }

            let id = store.next_type_id();
            let mut decl = TypeDecl::new(id, entry.kind, entry.name.clone());
            decl.type_params = entry.type_params.clone();
            decl.superclass = entry.superclass.as_deref().map(TypeRef::parse).transpose()?;
            decl.super_interfaces = entry
                .interfaces
                .iter()
                .map(|text| TypeRef::parse(text))
                .collect::<MetaModelResult<Vec<_>>>()?;
            decl.annotations = entry.annotations.iter().map(Annotation::from).collect();
            store.insert_type(decl);

            for method in &entry.methods {
                let return_type = match &method.returns {
                    Some(text) => TypeRef::parse(text)?,
                    None => TypeRef::void(),
                };
                let method_id = store.next_method_id();
                let mut decl = MethodDecl::new(method_id, id, method.name.clone(), return_type);
                decl.params = method
                    .params
                    .iter()
                    .map(|text| TypeRef::parse(text))
                    .collect::<MetaModelResult<Vec<_>>>()?;
                decl.annotations = method.annotations.iter().map(Annotation::from).collect();
                store.insert_method(decl);
            }
        }

        tracing::debug!(
            "Loaded declaration snapshot: {} types, {} methods",
            store.type_count(),
            store.method_count()
        );
        Ok(store)
    }
}

impl DeclStore {
    /// Parse a JSON snapshot straight into a store.
    pub fn from_snapshot_json(json: &str) -> MetaModelResult<DeclStore> {
        DeclSnapshot::from_json(json)?.to_store()
    }
}
