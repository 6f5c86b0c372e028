//! In-memory declaration store.
//!
//! [`DeclStore`] follows an allocate-then-insert protocol: reserve an ID with
//! `next_*_id`, build the declaration, then `insert_*` it. Indexes are kept
//! up to date on insert:
//! - qualified name → type
//! - package → types declared in it (sorted by ID for determinism)
//! - every package prefix of an inserted type is registered as existing

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{DeclarationModel, MethodDecl, MethodId, TypeDecl, TypeDeclId, TypeKind, TypeRef};

/// Declarations held in memory.
#[derive(Debug, Default)]
pub struct DeclStore {
    // Primary storage (BTreeMap for deterministic iteration)
    types: BTreeMap<TypeDeclId, TypeDecl>,
    methods: BTreeMap<MethodId, MethodDecl>,

    // Secondary indexes
    /// Qualified name → type.
    types_by_name: HashMap<String, TypeDeclId>,
    /// Package → type IDs declared directly in it.
    types_by_package: HashMap<String, Vec<TypeDeclId>>,
    /// All known packages, including ancestors of populated ones.
    packages: BTreeSet<String>,

    // ID generators
    next_type_id: u32,
    next_method_id: u32,
}

impl DeclStore {
    /// Create an empty store.
    pub fn new() -> Self {
        DeclStore::default()
    }

    // ========================================================================
    // ID Generation
    // ========================================================================

    /// Generate the next TypeDeclId.
    pub fn next_type_id(&mut self) -> TypeDeclId {
        let id = TypeDeclId::new(self.next_type_id);
        self.next_type_id += 1;
        id
    }

    /// Generate the next MethodId.
    pub fn next_method_id(&mut self) -> MethodId {
        let id = MethodId::new(self.next_method_id);
        self.next_method_id += 1;
        id
    }

    // ========================================================================
    // Insert Operations
    // ========================================================================

    /// Register a package (and all of its parent packages).
    pub fn insert_package(&mut self, qualified_name: &str) {
        let mut end = 0;
        for segment in qualified_name.split('.') {
            end += segment.len();
            self.packages.insert(qualified_name[..end].to_string());
            end += 1;
        }
    }

    /// Insert a type declaration.
    ///
    /// The type's package is registered. A later type with the same
    /// qualified name shadows the earlier one in name lookups.
    pub fn insert_type(&mut self, decl: TypeDecl) {
        let package = decl.package().to_string();
        if !package.is_empty() {
            self.insert_package(&package);
        }

        self.types_by_name
            .insert(decl.qualified_name.clone(), decl.id);

        let in_package = self.types_by_package.entry(package).or_default();
        if let Err(pos) = in_package.binary_search(&decl.id) {
            in_package.insert(pos, decl.id);
        }

        self.types.insert(decl.id, decl);
    }

    /// Insert a method and append it to its declaring type's members.
    pub fn insert_method(&mut self, method: MethodDecl) {
        if let Some(owner) = self.types.get_mut(&method.declaring_type) {
            if !owner.methods.contains(&method.id) {
                owner.methods.push(method.id);
            }
        }
        self.methods.insert(method.id, method);
    }

    // ========================================================================
    // Convenience Builders
    // ========================================================================

    /// Allocate and insert a bare type, returning its ID.
    pub fn add_type(&mut self, kind: TypeKind, qualified_name: &str) -> TypeDeclId {
        let id = self.next_type_id();
        self.insert_type(TypeDecl::new(id, kind, qualified_name));
        id
    }

    /// Allocate and insert a method on `owner`, returning its ID.
    pub fn add_method(
        &mut self,
        owner: TypeDeclId,
        name: &str,
        return_type: TypeRef,
        params: Vec<TypeRef>,
    ) -> MethodId {
        let id = self.next_method_id();
        let mut method = MethodDecl::new(id, owner, name, return_type);
        method.params = params;
        self.insert_method(method);
        id
    }

    /// Mutable access to a type, for wiring supertypes after insertion.
    pub fn type_decl_mut(&mut self, id: TypeDeclId) -> Option<&mut TypeDecl> {
        self.types.get_mut(&id)
    }

    /// Mutable access to a method, for attaching annotations after insertion.
    pub fn method_mut(&mut self, id: MethodId) -> Option<&mut MethodDecl> {
        self.methods.get_mut(&id)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Iterate all types in ID order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.values()
    }

    /// Iterate all methods in ID order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.methods.values()
    }

    /// Look up a type, returning `None` for unknown IDs.
    pub fn get_type(&self, id: TypeDeclId) -> Option<&TypeDecl> {
        self.types.get(&id)
    }

    /// Look up a method, returning `None` for unknown IDs.
    pub fn get_method(&self, id: MethodId) -> Option<&MethodDecl> {
        self.methods.get(&id)
    }

    /// Iterate all known packages in name order.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(String::as_str)
    }

    /// Number of types.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Number of methods.
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

impl DeclarationModel for DeclStore {
    fn package_exists(&self, qualified_name: &str) -> bool {
        self.packages.contains(qualified_name)
    }

    fn interfaces_in_package(&self, package: &str) -> Vec<TypeDeclId> {
        self.types_by_package
            .get(package)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|id| self.types.get(id).is_some_and(|t| t.is_interface()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn find_type(&self, qualified_name: &str) -> Option<TypeDeclId> {
        self.types_by_name.get(qualified_name).copied()
    }

    fn type_decl(&self, id: TypeDeclId) -> &TypeDecl {
        &self.types[&id]
    }

    fn method(&self, id: MethodId) -> &MethodDecl {
        &self.methods[&id]
    }
}
