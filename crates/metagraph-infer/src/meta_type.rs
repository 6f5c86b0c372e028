//! Logical entity types of the meta-model.

use std::collections::BTreeMap;
use std::fmt;

use metagraph_core::decl::{MethodId, Role, TypeDeclId};

use crate::field::MetaField;

/// Identifier of a meta type within one [`MetaModel`](crate::builder::MetaModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetaTypeId(pub u32);

impl MetaTypeId {
    /// Create a new meta type ID.
    pub fn new(id: u32) -> Self {
        MetaTypeId(id)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MetaTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "meta_{}", self.0)
    }
}

/// One logical entity type: an interface and (usually) its implementation class.
#[derive(Debug, Clone)]
pub struct MetaType {
    id: MetaTypeId,
    name: String,
    model_interface: Option<TypeDeclId>,
    model_class: Option<TypeDeclId>,
    fields: BTreeMap<Role, MetaField>,
    super_types: Vec<MetaTypeId>,
    other_methods: Vec<MethodId>,
}

impl MetaType {
    /// Create an empty meta type.
    pub fn new(id: MetaTypeId, name: impl Into<String>) -> Self {
        MetaType {
            id,
            name: name.into(),
            model_interface: None,
            model_class: None,
            fields: BTreeMap::new(),
            super_types: Vec::new(),
            other_methods: Vec::new(),
        }
    }

    pub fn id(&self) -> MetaTypeId {
        self.id
    }

    /// Logical name, unique within the graph.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The interface this type represents.
    pub fn model_interface(&self) -> Option<TypeDeclId> {
        self.model_interface
    }

    /// The implementation class, absent for interface-only types.
    pub fn model_class(&self) -> Option<TypeDeclId> {
        self.model_class
    }

    pub fn set_model_interface(&mut self, iface: TypeDeclId) {
        debug_assert!(
            self.model_interface.is_none() || self.model_interface == Some(iface),
            "interface of {} is already set",
            self.name
        );
        self.model_interface = Some(iface);
    }

    pub fn set_model_class(&mut self, class: TypeDeclId) {
        debug_assert!(
            self.model_class.is_none() || self.model_class == Some(class),
            "class of {} is already set",
            self.name
        );
        self.model_class = Some(class);
    }

    /// The backing declarations: class first, then interface.
    pub fn declarations(&self) -> impl Iterator<Item = TypeDeclId> {
        self.model_class.into_iter().chain(self.model_interface)
    }

    /// The field for `role`, created on first use.
    pub fn get_or_create_field(&mut self, role: Role) -> &mut MetaField {
        self.fields
            .entry(role)
            .or_insert_with_key(|role| MetaField::new(role.clone()))
    }

    pub fn field(&self, role: &Role) -> Option<&MetaField> {
        self.fields.get(role)
    }

    /// Fields in role order.
    pub fn fields(&self) -> impl Iterator<Item = &MetaField> {
        self.fields.values()
    }

    pub(crate) fn fields_mut(&mut self) -> impl Iterator<Item = &mut MetaField> {
        self.fields.values_mut()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Add a generalization edge. Self-edges and duplicates are ignored.
    pub fn add_super_type(&mut self, other: MetaTypeId) -> bool {
        if other == self.id || self.super_types.contains(&other) {
            return false;
        }
        self.super_types.push(other);
        true
    }

    /// Direct supertypes, in discovery order.
    pub fn super_types(&self) -> &[MetaTypeId] {
        &self.super_types
    }

    /// Record a method that is not a property accessor.
    pub fn add_other_method(&mut self, method: MethodId) -> bool {
        if self.other_methods.contains(&method) {
            return false;
        }
        self.other_methods.push(method);
        true
    }

    /// Declared methods that did not classify into any role.
    pub fn other_methods(&self) -> &[MethodId] {
        &self.other_methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::AccessorKind;

    #[test]
    fn test_get_or_create_field_is_idempotent() {
        let mut ty = MetaType::new(MetaTypeId::new(0), "CtBlock");
        ty.get_or_create_field(Role::new("STATEMENT"))
            .add_method(MethodId::new(1), AccessorKind::Getter);
        ty.get_or_create_field(Role::new("STATEMENT"))
            .add_method(MethodId::new(2), AccessorKind::Setter);

        assert_eq!(ty.field_count(), 1);
        let field = ty.field(&Role::new("STATEMENT")).unwrap();
        assert_eq!(field.methods().len(), 2);
        assert!(ty.field(&Role::new("NAME")).is_none());
    }

    #[test]
    fn test_super_types_reject_self_and_duplicates() {
        let mut ty = MetaType::new(MetaTypeId::new(3), "CtBlock");
        assert!(!ty.add_super_type(MetaTypeId::new(3)));
        assert!(ty.add_super_type(MetaTypeId::new(1)));
        assert!(!ty.add_super_type(MetaTypeId::new(1)));
        assert!(ty.add_super_type(MetaTypeId::new(0)));
        assert_eq!(ty.super_types(), &[MetaTypeId::new(1), MetaTypeId::new(0)]);
    }

    #[test]
    fn test_declarations_class_first() {
        let mut ty = MetaType::new(MetaTypeId::new(0), "Foo");
        assert_eq!(ty.declarations().count(), 0);
        ty.set_model_interface(TypeDeclId::new(4));
        ty.set_model_class(TypeDeclId::new(7));
        let decls: Vec<_> = ty.declarations().collect();
        assert_eq!(decls, vec![TypeDeclId::new(7), TypeDeclId::new(4)]);
    }

    #[test]
    fn test_other_methods_keep_order() {
        let mut ty = MetaType::new(MetaTypeId::new(0), "Foo");
        ty.add_other_method(MethodId::new(5));
        ty.add_other_method(MethodId::new(2));
        assert!(!ty.add_other_method(MethodId::new(5)));
        assert_eq!(ty.other_methods(), &[MethodId::new(5), MethodId::new(2)]);
        assert_eq!(MetaTypeId::new(2).to_string(), "meta_2");
    }
}
