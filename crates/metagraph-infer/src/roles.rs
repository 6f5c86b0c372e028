//! Role classification of accessor methods.
//!
//! A method is a property accessor if it carries the getter or setter
//! annotation, or if it overrides/implements a method that does. The
//! annotation's `role` element names the logical property.
//!
//! Lookup order for a method `m` declared on type `T`:
//! 1. getter annotation on `m`
//! 2. setter annotation on `m`
//! 3. the supertype closure of `T`, nearest first: the first method with the
//!    same signature as `m` that carries the getter annotation, or failing
//!    that the setter annotation

use std::collections::HashMap;
use std::fmt;

use metagraph_core::config::MetaModelConfig;
use metagraph_core::decl::{DeclarationModel, MethodDecl, MethodId, Role};

use crate::hierarchy::HierarchyIndex;

/// Whether an accessor reads or writes its property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessorKind {
    Getter,
    Setter,
}

impl fmt::Display for AccessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessorKind::Getter => write!(f, "getter"),
            AccessorKind::Setter => write!(f, "setter"),
        }
    }
}

/// Outcome of classifying one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBinding {
    pub role: Role,
    pub kind: AccessorKind,
    /// The method that actually carries the annotation.
    pub annotated: MethodId,
}

/// Classifies methods by role, caching hierarchy walks.
pub struct RoleClassifier<'m, M: DeclarationModel + ?Sized> {
    config: &'m MetaModelConfig,
    hierarchy: HierarchyIndex<'m, M>,
    bindings: HashMap<MethodId, Option<RoleBinding>>,
}

impl<'m, M: DeclarationModel + ?Sized> RoleClassifier<'m, M> {
    pub fn new(model: &'m M, config: &'m MetaModelConfig) -> Self {
        RoleClassifier {
            config,
            hierarchy: HierarchyIndex::new(model),
            bindings: HashMap::new(),
        }
    }

    /// The hierarchy index shared with callers that rank declaring types.
    pub fn hierarchy(&mut self) -> &mut HierarchyIndex<'m, M> {
        &mut self.hierarchy
    }

    /// Classify `method`, or `None` if it is not a property accessor.
    pub fn role_of(&mut self, method: MethodId) -> Option<RoleBinding> {
        if let Some(cached) = self.bindings.get(&method) {
            return cached.clone();
        }
        let binding = self.classify(method);
        match &binding {
            Some(b) => tracing::trace!(
                "{} is the {} of role {}",
                self.hierarchy.model().method_label(method),
                b.kind,
                b.role
            ),
            None => tracing::trace!(
                "{} has no role",
                self.hierarchy.model().method_label(method)
            ),
        }
        self.bindings.insert(method, binding.clone());
        binding
    }

    fn classify(&mut self, method: MethodId) -> Option<RoleBinding> {
        let model = self.hierarchy.model();
        let decl = model.method(method);

        if let Some(binding) = self.direct_binding(decl) {
            return Some(binding);
        }

        let closure = self.hierarchy.closure(decl.declaring_type);
        for &super_type in closure.iter() {
            for &candidate in &model.type_decl(super_type).methods {
                if candidate == method || !model.is_same_signature(method, candidate) {
                    continue;
                }
                if let Some(binding) = self.direct_binding(model.method(candidate)) {
                    return Some(binding);
                }
            }
        }
        None
    }

    /// Binding from annotations declared on `decl` itself.
    fn direct_binding(&self, decl: &MethodDecl) -> Option<RoleBinding> {
        let kinds = [
            (self.config.getter_annotation.as_str(), AccessorKind::Getter),
            (self.config.setter_annotation.as_str(), AccessorKind::Setter),
        ];
        kinds.into_iter().find_map(|(annotation, kind)| {
            decl.annotation(annotation)
                .and_then(|a| a.role())
                .map(|role| RoleBinding {
                    role,
                    kind,
                    annotated: decl.id,
                })
        })
    }
}

/// Role of a single method, without keeping a classifier around.
pub fn role_of_method<M>(model: &M, config: &MetaModelConfig, method: MethodId) -> Option<Role>
where
    M: DeclarationModel + ?Sized,
{
    RoleClassifier::new(model, config)
        .role_of(method)
        .map(|binding| binding.role)
}
