//! Declaration model: the typed source declarations the meta-model is inferred from.
//!
//! This module provides the input vocabulary for metagraph:
//! - [`TypeDecl`]: interfaces and classes with their supertypes and members
//! - [`MethodDecl`]: method signatures and their annotations
//! - [`Annotation`] and [`Role`]: annotation instances and the role tokens they carry
//! - [`TypeRef`]: declared (unresolved) types
//!
//! The [`DeclarationModel`] trait is the boundary to whatever built the
//! declarations. Inference only ever reads through it. [`DeclStore`] is the
//! in-memory implementation, filled either through its insert API or from a
//! [`DeclSnapshot`].
//!
//! # Identity
//!
//! Declarations are identified by [`TypeDeclId`] and [`MethodId`], never by
//! structural equality. Two methods with the same name and signature on
//! different types are different methods.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::names;

pub mod snapshot;
pub mod store;
pub mod type_ref;

pub use snapshot::{AnnotationEntry, DeclSnapshot, MethodEntry, TypeEntry};
pub use store::DeclStore;
pub use type_ref::{TypeRef, WildcardBound, PRIMITIVES};

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a type declaration within a declaration model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TypeDeclId(pub u32);

impl TypeDeclId {
    /// Create a new type declaration ID.
    pub fn new(id: u32) -> Self {
        TypeDeclId(id)
    }
}

impl fmt::Display for TypeDeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type_{}", self.0)
    }
}

/// Unique identifier for a method declaration within a declaration model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct MethodId(pub u32);

impl MethodId {
    /// Create a new method ID.
    pub fn new(id: u32) -> Self {
        MethodId(id)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method_{}", self.0)
    }
}

// ============================================================================
// Enums and Tokens
// ============================================================================

/// Kind of type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Interface,
    Class,
    Enum,
    Annotation,
}

impl TypeKind {
    /// Lowercase keyword for messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Interface => "interface",
            TypeKind::Class => "class",
            TypeKind::Enum => "enum",
            TypeKind::Annotation => "annotation",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role identifier naming a logical property (`NAME`, `STATEMENT`, ...).
///
/// Roles are opaque tokens taken verbatim from annotation values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Create a role token.
    pub fn new(name: impl Into<String>) -> Self {
        Role(name.into())
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// An annotation instance on a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Qualified name of the annotation type.
    pub type_name: String,
    /// Element values, rendered as text.
    pub values: BTreeMap<String, String>,
}

impl Annotation {
    /// Create an annotation without element values.
    pub fn new(type_name: impl Into<String>) -> Self {
        Annotation {
            type_name: type_name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Create an annotation carrying a `role` element.
    pub fn with_role(type_name: impl Into<String>, role: impl Into<String>) -> Self {
        Annotation::new(type_name).with_value("role", role)
    }

    /// Set an element value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// The `role` element, if present.
    pub fn role(&self) -> Option<Role> {
        self.values.get("role").map(Role::new)
    }
}

/// A type declaration (interface, class, enum or annotation type).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub id: TypeDeclId,
    pub kind: TypeKind,
    /// Fully qualified name (`spoon.reflect.code.CtBlock`).
    pub qualified_name: String,
    /// Declared type parameters (`T`, `R`).
    pub type_params: Vec<String>,
    /// Declared superclass (classes only).
    pub superclass: Option<TypeRef>,
    /// Declared super-interfaces, in declaration order.
    pub super_interfaces: Vec<TypeRef>,
    pub annotations: Vec<Annotation>,
    /// Declared methods, in declaration order.
    pub methods: Vec<MethodId>,
}

impl TypeDecl {
    /// Create a type declaration without supertypes or members.
    pub fn new(id: TypeDeclId, kind: TypeKind, qualified_name: impl Into<String>) -> Self {
        TypeDecl {
            id,
            kind,
            qualified_name: qualified_name.into(),
            type_params: Vec::new(),
            superclass: None,
            super_interfaces: Vec::new(),
            annotations: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Set the superclass.
    pub fn with_superclass(mut self, superclass: TypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Append a super-interface.
    pub fn with_super_interface(mut self, iface: TypeRef) -> Self {
        self.super_interfaces.push(iface);
        self
    }

    /// Append a type parameter.
    pub fn with_type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    /// Append an annotation.
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Simple name (last segment of the qualified name).
    pub fn simple_name(&self) -> &str {
        names::simple_name_of(&self.qualified_name)
    }

    /// Qualified name of the enclosing package.
    pub fn package(&self) -> &str {
        names::package_of(&self.qualified_name)
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_class(&self) -> bool {
        self.kind == TypeKind::Class
    }

    /// Superclass followed by super-interfaces.
    pub fn supertypes(&self) -> impl Iterator<Item = &TypeRef> {
        self.superclass.iter().chain(self.super_interfaces.iter())
    }
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub id: MethodId,
    /// The type that declares this method.
    pub declaring_type: TypeDeclId,
    pub name: String,
    pub return_type: TypeRef,
    pub params: Vec<TypeRef>,
    pub annotations: Vec<Annotation>,
}

impl MethodDecl {
    /// Create a method declaration without parameters or annotations.
    pub fn new(
        id: MethodId,
        declaring_type: TypeDeclId,
        name: impl Into<String>,
        return_type: TypeRef,
    ) -> Self {
        MethodDecl {
            id,
            declaring_type,
            name: name.into(),
            return_type,
            params: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Append a parameter type.
    pub fn with_param(mut self, param: TypeRef) -> Self {
        self.params.push(param);
        self
    }

    /// Append an annotation.
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// The annotation of the given type, if declared directly on this method.
    pub fn annotation(&self, type_name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.type_name == type_name)
    }

    /// `name(T1, T2)` rendering of the signature.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

// ============================================================================
// Declaration Model Boundary
// ============================================================================

/// Read-only access to a fully built declaration model.
///
/// IDs passed to [`type_decl`](Self::type_decl) and [`method`](Self::method)
/// must have been handed out by the same model.
pub trait DeclarationModel {
    /// True if a package with this qualified name exists.
    fn package_exists(&self, qualified_name: &str) -> bool;

    /// Interfaces declared directly in `package`, in a deterministic order.
    fn interfaces_in_package(&self, package: &str) -> Vec<TypeDeclId>;

    /// Look up a type by qualified name.
    fn find_type(&self, qualified_name: &str) -> Option<TypeDeclId>;

    /// The declaration behind `id`.
    fn type_decl(&self, id: TypeDeclId) -> &TypeDecl;

    /// The method behind `id`.
    fn method(&self, id: MethodId) -> &MethodDecl;

    /// Resolve a declared type to its declaration through its erasure.
    fn resolve(&self, type_ref: &TypeRef) -> Option<TypeDeclId> {
        type_ref
            .erasure_name()
            .and_then(|name| self.find_type(name))
    }

    /// True if `b` has a signature that `a` overrides or implements (or vice versa).
    ///
    /// Names and arity must match; parameters are compared by erasure, with
    /// type variables matching any reference type.
    fn is_same_signature(&self, a: MethodId, b: MethodId) -> bool {
        let (a, b) = (self.method(a), self.method(b));
        a.name == b.name
            && a.params.len() == b.params.len()
            && a
                .params
                .iter()
                .zip(&b.params)
                .all(|(x, y)| x.is_override_compatible(y))
    }

    /// `Type#name(params)` rendering for diagnostics.
    fn method_label(&self, id: MethodId) -> String {
        let method = self.method(id);
        format!(
            "{}#{}",
            self.type_decl(method.declaring_type).qualified_name,
            method.signature()
        )
    }
}
