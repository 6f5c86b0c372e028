//! Meta-model fields: one logical property of one meta type.
//!
//! A [`MetaField`] collects every accessor classified under its role, from
//! the owner's interface and class and from all of the owner's supertypes.
//! Once collection is complete the accessors are ranked so the best match
//! comes first, and the field's [`ValueType`] is derived from it.
//!
//! # Best-match order
//!
//! Accessors are ordered by, in turn:
//! 1. getters before setters
//! 2. most-derived declaring type first
//! 3. more specific value type first
//! 4. collection order
//!
//! A getter always declares the whole property value, while a setter may be
//! an element-wise mutator (`addStatement(CtStatement)` on a list role), so a
//! field with any getter takes its value type from its most-derived getter.

use std::cmp::Reverse;

use metagraph_core::config::MetaModelConfig;
use metagraph_core::decl::{DeclarationModel, MethodId, Role, TypeRef};
use metagraph_core::error::{MetaModelError, MetaModelResult};

use crate::roles::AccessorKind;
use crate::value_type::{ContainerKind, ValueType};

/// One accessor method of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accessor {
    pub method: MethodId,
    pub kind: AccessorKind,
    /// True if the method is declared on a supertype rather than on the
    /// owner's own interface or class.
    pub inherited: bool,
}

/// Ranking inputs for one accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchRank {
    /// Supertype count of the declaring type.
    pub declaring_depth: usize,
    /// How specific the accessor's item type is (0 for type variables and
    /// unresolved types).
    pub value_specificity: usize,
}

/// A logical property of a meta type.
#[derive(Debug, Clone)]
pub struct MetaField {
    role: Role,
    methods: Vec<Accessor>,
    value_type: Option<ValueType>,
}

impl MetaField {
    /// Create an empty field for `role`.
    pub fn new(role: Role) -> Self {
        MetaField {
            role,
            methods: Vec::new(),
            value_type: None,
        }
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Append an accessor declared on the owner itself.
    ///
    /// Returns `false` if the method is already part of this field.
    pub fn add_method(&mut self, method: MethodId, kind: AccessorKind) -> bool {
        self.push(Accessor {
            method,
            kind,
            inherited: false,
        })
    }

    /// Append an accessor declared on a supertype.
    pub fn add_inherited(&mut self, method: MethodId, kind: AccessorKind) -> bool {
        self.push(Accessor {
            method,
            kind,
            inherited: true,
        })
    }

    fn push(&mut self, accessor: Accessor) -> bool {
        if self.methods.iter().any(|a| a.method == accessor.method) {
            return false;
        }
        self.methods.push(accessor);
        true
    }

    /// All accessors, best match first once the field is finished.
    pub fn methods(&self) -> &[Accessor] {
        &self.methods
    }

    /// Accessors declared on the owner's own interface or class.
    pub fn declared_methods(&self) -> impl Iterator<Item = &Accessor> {
        self.methods.iter().filter(|a| !a.inherited)
    }

    /// The best-matching accessor.
    pub fn best_method(&self) -> Option<&Accessor> {
        self.methods.first()
    }

    /// The best-matching getter.
    pub fn getter(&self) -> Option<&Accessor> {
        self.methods.iter().find(|a| a.kind == AccessorKind::Getter)
    }

    /// All setters, in best-match order.
    pub fn setters(&self) -> impl Iterator<Item = &Accessor> {
        self.methods
            .iter()
            .filter(|a| a.kind == AccessorKind::Setter)
    }

    /// The effective value type, once derived.
    pub fn value_type(&self) -> Option<&ValueType> {
        self.value_type.as_ref()
    }

    /// Container kind of the effective value type, once derived.
    pub fn container_kind(&self) -> Option<ContainerKind> {
        self.value_type.as_ref().map(ValueType::container_kind)
    }

    /// Order accessors so the best match comes first.
    pub fn sort_by_best_match<F>(&mut self, mut rank: F)
    where
        F: FnMut(&Accessor) -> MatchRank,
    {
        let mut keyed: Vec<_> = self
            .methods
            .iter()
            .enumerate()
            .map(|(index, accessor)| {
                let r = rank(accessor);
                (
                    (
                        accessor.kind,
                        Reverse(r.declaring_depth),
                        Reverse(r.value_specificity),
                        index,
                    ),
                    *accessor,
                )
            })
            .collect();
        keyed.sort_by_key(|(key, _)| *key);
        self.methods = keyed.into_iter().map(|(_, accessor)| accessor).collect();
    }

    /// Derive the value type from the best-matching accessor.
    ///
    /// Getters with a concrete declared type must all agree on the container
    /// kind, and the derived value type must have that kind too. Setters are
    /// not checked: element-wise mutators such as `addStatement(CtStatement)`
    /// take one element of a list-valued role.
    pub fn detect_value_type<M>(
        &self,
        model: &M,
        config: &MetaModelConfig,
        owner: &str,
    ) -> MetaModelResult<ValueType>
    where
        M: DeclarationModel + ?Sized,
    {
        let best = self
            .methods
            .first()
            .ok_or_else(|| MetaModelError::InvalidAccessor {
                method: format!("{}.{}", owner, self.role),
                reason: "field has no accessors".to_string(),
            })?;
        let best_type = declared_type(model, best)?;
        let value_type = ValueType::classify(config, best_type);

        let mut expected: Option<ContainerKind> = None;
        for getter in self
            .methods
            .iter()
            .filter(|a| a.kind == AccessorKind::Getter)
        {
            let declared = declared_type(model, getter)?;
            if declared.is_type_variable() {
                continue;
            }
            let kind = ValueType::classify(config, declared).container_kind();
            match expected {
                None => expected = Some(kind),
                Some(exp) if exp != kind => {
                    return Err(MetaModelError::InconsistentFieldShape {
                        meta_type: owner.to_string(),
                        role: self.role.to_string(),
                        expected: exp.to_string(),
                        found: kind.to_string(),
                        method: model.method_label(getter.method),
                    });
                }
                Some(_) => {}
            }
        }

        if let Some(exp) = expected.filter(|_| !best_type.is_type_variable()) {
            if value_type.container_kind() != exp {
                return Err(MetaModelError::InconsistentFieldShape {
                    meta_type: owner.to_string(),
                    role: self.role.to_string(),
                    expected: exp.to_string(),
                    found: value_type.container_kind().to_string(),
                    method: model.method_label(best.method),
                });
            }
        }

        Ok(value_type)
    }

    /// Record the derived value type. Called once per field.
    pub fn set_value_type(&mut self, value_type: ValueType) {
        debug_assert!(
            self.value_type.is_none(),
            "value type of {} is already set",
            self.role
        );
        self.value_type = Some(value_type);
    }
}

/// The type an accessor reads or writes: a getter's return type, or a
/// setter's last parameter type.
pub fn declared_type<'a, M>(model: &'a M, accessor: &Accessor) -> MetaModelResult<&'a TypeRef>
where
    M: DeclarationModel + ?Sized,
{
    let method = model.method(accessor.method);
    let invalid = |reason: &str| MetaModelError::InvalidAccessor {
        method: model.method_label(accessor.method),
        reason: reason.to_string(),
    };
    match accessor.kind {
        AccessorKind::Getter if method.return_type.is_void() => Err(invalid("getter returns void")),
        AccessorKind::Getter => Ok(&method.return_type),
        AccessorKind::Setter => method
            .params
            .last()
            .ok_or_else(|| invalid("setter takes no parameter")),
    }
}
