//! Declaration fixtures shared by unit tests.

use metagraph_core::config::{DEFAULT_GETTER_ANNOTATION, DEFAULT_SETTER_ANNOTATION};
use metagraph_core::decl::{Annotation, DeclStore, MethodId, TypeDeclId, TypeKind, TypeRef};

/// A [`DeclStore`] with shorthand builders for interfaces, classes and accessors.
#[derive(Default)]
pub struct ModelFixture {
    pub store: DeclStore,
}

fn ty(text: &str) -> TypeRef {
    TypeRef::parse(text).unwrap_or_else(|e| panic!("bad type `{}`: {}", text, e))
}

impl ModelFixture {
    /// Empty store.
    pub fn new() -> Self {
        ModelFixture::default()
    }

    /// Store with the default API and implementation packages registered.
    pub fn spoon() -> Self {
        let mut fx = ModelFixture::new();
        for package in [
            "spoon.reflect.code",
            "spoon.reflect.declaration",
            "spoon.reflect.reference",
            "spoon.support.reflect.code",
            "spoon.support.reflect.declaration",
            "spoon.support.reflect.reference",
        ] {
            fx.store.insert_package(package);
        }
        fx
    }

    /// Add an interface extending `supers`.
    pub fn iface(&mut self, qualified_name: &str, supers: &[&str]) -> TypeDeclId {
        let id = self.store.add_type(TypeKind::Interface, qualified_name);
        if let Some(decl) = self.store.type_decl_mut(id) {
            decl.super_interfaces.extend(supers.iter().map(|s| ty(s)));
        }
        id
    }

    /// Add a class with an optional superclass and implemented interfaces.
    pub fn class(
        &mut self,
        qualified_name: &str,
        superclass: Option<&str>,
        ifaces: &[&str],
    ) -> TypeDeclId {
        let id = self.store.add_type(TypeKind::Class, qualified_name);
        if let Some(decl) = self.store.type_decl_mut(id) {
            decl.superclass = superclass.map(ty);
            decl.super_interfaces.extend(ifaces.iter().map(|s| ty(s)));
        }
        id
    }

    /// Add an unannotated method.
    pub fn method(
        &mut self,
        owner: TypeDeclId,
        name: &str,
        returns: &str,
        params: &[&str],
    ) -> MethodId {
        let params = params.iter().map(|p| ty(p)).collect();
        self.store.add_method(owner, name, ty(returns), params)
    }

    /// Add a no-argument method annotated as the getter of `role`.
    pub fn getter(&mut self, owner: TypeDeclId, name: &str, returns: &str, role: &str) -> MethodId {
        let id = self.method(owner, name, returns, &[]);
        self.annotate(id, DEFAULT_GETTER_ANNOTATION, role);
        id
    }

    /// Add a one-argument void method annotated as the setter of `role`.
    pub fn setter(&mut self, owner: TypeDeclId, name: &str, param: &str, role: &str) -> MethodId {
        let id = self.method(owner, name, "void", &[param]);
        self.annotate(id, DEFAULT_SETTER_ANNOTATION, role);
        id
    }

    /// Mark an existing method as a setter of `role`.
    pub fn annotate_setter(&mut self, method: MethodId, role: &str) {
        self.annotate(method, DEFAULT_SETTER_ANNOTATION, role);
    }

    fn annotate(&mut self, method: MethodId, annotation: &str, role: &str) {
        if let Some(decl) = self.store.method_mut(method) {
            decl.annotations.push(Annotation::with_role(annotation, role));
        }
    }
}
