//! Meta-model graph construction.
//!
//! [`MetaModelBuilder`] materializes one [`MetaType`] per logical name
//! reachable from the interfaces of the configured API packages:
//!
//! 1. Check that every API package and its implementation counterpart exist.
//! 2. For each interface of each API package (packages in name order), get or
//!    create its meta type.
//! 3. Getting a meta type first *reserves* it under its logical name, then
//!    *populates* it: pair interface and class, classify the members of both
//!    into fields or other methods, and recurse into every direct supertype.
//!    A name that is already reserved is returned as is, which is what stops
//!    cyclic hierarchies from recursing forever.
//! 4. Once every type is populated, each type inherits the accessors declared
//!    by its transitive meta supertypes.
//! 5. Every field is finalized: accessors ranked, value type derived.
//!
//! Any error aborts the build; no partial graph is returned.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use metagraph_core::config::MetaModelConfig;
use metagraph_core::decl::{DeclarationModel, TypeDeclId, TypeKind, TypeRef};
use metagraph_core::error::{MetaModelError, MetaModelResult};

use crate::field::{declared_type, Accessor, MatchRank};
use crate::hierarchy::HierarchyIndex;
use crate::meta_type::{MetaType, MetaTypeId};
use crate::pairing::{meta_type_name, pair_of};
use crate::roles::RoleClassifier;
use crate::value_type::ValueType;

/// Construction progress of one meta type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitState {
    /// Registered under its name; members not yet scanned.
    Reserved,
    /// Members and direct supertypes collected.
    Populated,
    /// Fields ranked and value types derived.
    Initialized,
}

/// Single-use builder for a [`MetaModel`].
pub struct MetaModelBuilder<'m, M: DeclarationModel + ?Sized> {
    model: &'m M,
    config: &'m MetaModelConfig,
    classifier: RoleClassifier<'m, M>,
    types: Vec<MetaType>,
    states: Vec<InitState>,
    by_name: BTreeMap<String, MetaTypeId>,
}

impl<'m, M: DeclarationModel + ?Sized> MetaModelBuilder<'m, M> {
    pub fn new(model: &'m M, config: &'m MetaModelConfig) -> Self {
        MetaModelBuilder {
            model,
            config,
            classifier: RoleClassifier::new(model, config),
            types: Vec::new(),
            states: Vec::new(),
            by_name: BTreeMap::new(),
        }
    }

    /// Run the whole construction.
    pub fn build(mut self) -> MetaModelResult<MetaModel> {
        self.validate_packages()?;

        let (model, config) = (self.model, self.config);
        for package in &config.api_packages {
            for iface in model.interfaces_in_package(package) {
                self.get_or_create(iface)?;
            }
        }

        self.inherit_fields();
        self.finalize()?;

        tracing::info!(
            "built meta-model with {} types from {} API packages",
            self.types.len(),
            config.api_packages.len()
        );
        Ok(MetaModel::new(self.types, self.by_name))
    }

    // ========================================================================
    // Package Validation
    // ========================================================================

    fn validate_packages(&self) -> MetaModelResult<()> {
        for package in &self.config.api_packages {
            if !self.model.package_exists(package) {
                return Err(MetaModelError::missing_api_package(package.as_str()));
            }
            let impl_package = self.config.impl_package_of(package)?;
            if !self.model.package_exists(&impl_package) {
                return Err(MetaModelError::missing_impl_package(impl_package));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Reserve / Populate
    // ========================================================================

    /// The meta type backed by `decl`, reserving and populating it if new.
    pub fn get_or_create(&mut self, decl: TypeDeclId) -> MetaModelResult<MetaTypeId> {
        let (id, reserved) = self.reserve(decl);
        if reserved {
            self.populate(id, decl)?;
        }
        Ok(id)
    }

    /// Register the logical name of `decl`. Returns `true` if newly reserved.
    fn reserve(&mut self, decl: TypeDeclId) -> (MetaTypeId, bool) {
        let model = self.model;
        let type_decl = model.type_decl(decl);
        let name = meta_type_name(self.config, type_decl);
        if let Some(&id) = self.by_name.get(name) {
            return (id, false);
        }

        let id = MetaTypeId::new(self.types.len() as u32);
        tracing::debug!(
            "reserved meta type {} ({}) for {}",
            name,
            id,
            type_decl.qualified_name
        );
        self.types.push(MetaType::new(id, name));
        self.states.push(InitState::Reserved);
        self.by_name.insert(name.to_string(), id);
        (id, true)
    }

    fn populate(&mut self, id: MetaTypeId, decl: TypeDeclId) -> MetaModelResult<()> {
        debug_assert_eq!(self.states[id.index()], InitState::Reserved);
        let model = self.model;
        let pairing = pair_of(model, self.config, decl)?;

        let ty = &mut self.types[id.index()];
        ty.set_model_interface(pairing.interface);
        if let Some(class) = pairing.class {
            ty.set_model_class(class);
        }

        // Class members first, then interface members; both feed the same fields
        for owner in pairing.declarations() {
            for &method in &model.type_decl(owner).methods {
                let ty = &mut self.types[id.index()];
                match self.classifier.role_of(method) {
                    Some(binding) => {
                        ty.get_or_create_field(binding.role)
                            .add_method(method, binding.kind);
                    }
                    None => {
                        ty.add_other_method(method);
                    }
                }
            }
        }

        for owner in pairing.declarations() {
            for super_ref in model.type_decl(owner).supertypes() {
                let Some(super_decl) = self.resolve_supertype(owner, super_ref)? else {
                    continue;
                };
                let super_id = self.get_or_create(super_decl)?;
                self.types[id.index()].add_super_type(super_id);
            }
        }

        self.states[id.index()] = InitState::Populated;
        Ok(())
    }

    /// Resolve a direct supertype of `owner`.
    ///
    /// Returns `None` for allow-listed unresolvable supertypes.
    fn resolve_supertype(
        &self,
        owner: TypeDeclId,
        super_ref: &TypeRef,
    ) -> MetaModelResult<Option<TypeDeclId>> {
        if let Some(super_decl) = self.model.resolve(super_ref) {
            let found = self.model.type_decl(super_decl);
            return match found.kind {
                TypeKind::Interface | TypeKind::Class => Ok(Some(super_decl)),
                other => Err(MetaModelError::UnexpectedDeclarationKind {
                    qualified_name: found.qualified_name.clone(),
                    expected: "interface or class".to_string(),
                    found: other.to_string(),
                }),
            };
        }

        let name = super_ref
            .erasure_name()
            .map(str::to_string)
            .unwrap_or_else(|| super_ref.to_string());
        if self.config.is_expected_unresolvable(&name) {
            tracing::trace!(
                "skipping unresolvable supertype {} of {}",
                name,
                self.model.type_decl(owner).qualified_name
            );
            return Ok(None);
        }
        Err(MetaModelError::UnresolvableSupertype {
            qualified_name: name,
            subtype: self.model.type_decl(owner).qualified_name.clone(),
        })
    }

    // ========================================================================
    // Inheritance and Finalization
    // ========================================================================

    /// Copy accessors declared by each type's meta supertypes into its fields.
    fn inherit_fields(&mut self) {
        for index in 0..self.types.len() {
            let id = MetaTypeId::new(index as u32);
            for super_id in super_type_closure(&self.types, id) {
                let inherited: Vec<_> = self.types[super_id.index()]
                    .fields()
                    .flat_map(|field| {
                        field
                            .declared_methods()
                            .map(move |accessor| (field.role().clone(), *accessor))
                    })
                    .collect();
                let ty = &mut self.types[index];
                for (role, accessor) in inherited {
                    ty.get_or_create_field(role)
                        .add_inherited(accessor.method, accessor.kind);
                }
            }
        }
    }

    fn finalize(&mut self) -> MetaModelResult<()> {
        let (model, config) = (self.model, self.config);
        let hierarchy = self.classifier.hierarchy();

        for (index, ty) in self.types.iter_mut().enumerate() {
            debug_assert_eq!(self.states[index], InitState::Populated);
            let owner = ty.name().to_string();
            for field in ty.fields_mut() {
                field.sort_by_best_match(|accessor| rank_accessor(hierarchy, config, accessor));
                let value_type = field.detect_value_type(model, config, &owner)?;
                field.set_value_type(value_type);
            }
            self.states[index] = InitState::Initialized;
            tracing::debug!(
                "initialized meta type {} with {} fields and {} supertypes",
                owner,
                ty.field_count(),
                ty.super_types().len()
            );
        }
        Ok(())
    }
}

/// Best-match ranking inputs for one accessor.
fn rank_accessor<M>(
    hierarchy: &mut HierarchyIndex<'_, M>,
    config: &MetaModelConfig,
    accessor: &Accessor,
) -> MatchRank
where
    M: DeclarationModel + ?Sized,
{
    let model = hierarchy.model();
    let declaring_depth = hierarchy.depth(model.method(accessor.method).declaring_type);
    let value_specificity = declared_type(model, accessor)
        .ok()
        .and_then(|declared| {
            let value_type = ValueType::classify(config, declared);
            model.resolve(value_type.item_type())
        })
        .map(|item| hierarchy.depth(item) + 1)
        .unwrap_or(0);
    MatchRank {
        declaring_depth,
        value_specificity,
    }
}

/// Transitive meta supertypes of `id`, nearest first, without `id` itself.
fn super_type_closure(types: &[MetaType], id: MetaTypeId) -> Vec<MetaTypeId> {
    let mut visited = HashSet::new();
    visited.insert(id);
    let mut closure = Vec::new();
    let mut queue = VecDeque::from([id]);

    while let Some(current) = queue.pop_front() {
        for &super_id in types[current.index()].super_types() {
            if visited.insert(super_id) {
                closure.push(super_id);
                queue.push_back(super_id);
            }
        }
    }
    closure
}

// ============================================================================
// Finished Graph
// ============================================================================

/// The finished, read-only meta-model graph.
#[derive(Debug, Clone)]
pub struct MetaModel {
    types: Vec<MetaType>,
    by_name: BTreeMap<String, MetaTypeId>,
    by_decl: HashMap<TypeDeclId, MetaTypeId>,
}

impl MetaModel {
    fn new(types: Vec<MetaType>, by_name: BTreeMap<String, MetaTypeId>) -> Self {
        let by_decl = types
            .iter()
            .flat_map(|ty| ty.declarations().map(move |decl| (decl, ty.id())))
            .collect();
        MetaModel {
            types,
            by_name,
            by_decl,
        }
    }

    /// Build the graph for `model` under `config`.
    pub fn build<M>(model: &M, config: &MetaModelConfig) -> MetaModelResult<MetaModel>
    where
        M: DeclarationModel + ?Sized,
    {
        MetaModelBuilder::new(model, config).build()
    }

    /// All meta types, in creation order.
    pub fn types(&self) -> &[MetaType] {
        &self.types
    }

    /// Look up a meta type by logical name.
    pub fn get(&self, name: &str) -> Option<&MetaType> {
        self.by_name.get(name).and_then(|&id| self.get_by_id(id))
    }

    pub fn get_by_id(&self, id: MetaTypeId) -> Option<&MetaType> {
        self.types.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Logical names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Transitive supertypes of `id`, nearest first.
    pub fn all_super_types(&self, id: MetaTypeId) -> Vec<MetaTypeId> {
        if id.index() >= self.types.len() {
            return Vec::new();
        }
        super_type_closure(&self.types, id)
    }

    /// The meta type backed by an interface or class declaration.
    pub fn type_of_declaration(&self, decl: TypeDeclId) -> Option<&MetaType> {
        self.by_decl.get(&decl).and_then(|&id| self.get_by_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::AccessorKind;
    use crate::test_helpers::ModelFixture;
    use crate::value_type::ContainerKind;
    use metagraph_core::decl::Role;
    use metagraph_core::error::ErrorCode;

    /// `Foo`/`FooImpl` with an annotated `getName` overridden by the class.
    fn foo_fixture() -> ModelFixture {
        let mut fx = ModelFixture::spoon();
        let foo = fx.iface("spoon.reflect.declaration.Foo", &[]);
        fx.getter(foo, "getName", "java.lang.String", "NAME");
        fx.method(foo, "accept", "void", &["spoon.reflect.visitor.CtVisitor"]);
        let foo_impl = fx.class(
            "spoon.support.reflect.declaration.FooImpl",
            None,
            &["spoon.reflect.declaration.Foo", "java.io.Serializable"],
        );
        fx.method(foo_impl, "getName", "java.lang.String", &[]);
        fx
    }

    #[test]
    fn test_interface_and_class_merge_into_one_field() {
        let fx = foo_fixture();
        let config = MetaModelConfig::default();
        let graph = MetaModel::build(&fx.store, &config).unwrap();

        assert_eq!(graph.len(), 1);
        let foo = graph.get("Foo").unwrap();
        assert_eq!(foo.field_count(), 1);
        let name = foo.field(&Role::new("NAME")).unwrap();
        assert_eq!(name.methods().len(), 2);
        assert_eq!(
            name.value_type(),
            Some(&ValueType::Single(TypeRef::named("java.lang.String")))
        );

        // class override ranks first
        let best = name.best_method().unwrap();
        let class = fx.store.find_type("spoon.support.reflect.declaration.FooImpl");
        assert_eq!(
            Some(fx.store.method(best.method).declaring_type),
            class
        );
        assert_eq!(foo.other_methods().len(), 1);
        assert!(foo.super_types().is_empty());
    }

    #[test]
    fn test_allow_listed_supertype_is_skipped() {
        let mut fx = foo_fixture();
        fx.iface(
            "spoon.reflect.declaration.Bar",
            &["java.lang.Cloneable", "spoon.reflect.declaration.Foo"],
        );

        let config = MetaModelConfig::default();
        let graph = MetaModel::build(&fx.store, &config).unwrap();
        let bar = graph.get("Bar").unwrap();
        let foo = graph.get("Foo").unwrap();
        assert_eq!(bar.super_types(), &[foo.id()]);
        assert!(bar.model_class().is_none());

        // Bar inherits Foo's NAME accessors
        let name = bar.field(&Role::new("NAME")).unwrap();
        assert!(name.methods().iter().all(|a| a.inherited));
        assert_eq!(name.container_kind(), Some(ContainerKind::Single));
    }

    #[test]
    fn test_unlisted_missing_supertype_fails() {
        let mut fx = ModelFixture::spoon();
        fx.iface("spoon.reflect.code.Foo", &["com.example.Missing"]);

        let config = MetaModelConfig::default();
        let err = MetaModel::build(&fx.store, &config).unwrap_err();
        match &err {
            MetaModelError::UnresolvableSupertype {
                qualified_name,
                subtype,
            } => {
                assert_eq!(qualified_name, "com.example.Missing");
                assert_eq!(subtype, "spoon.reflect.code.Foo");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(err.error_code(), ErrorCode::Resolution);
    }

    #[test]
    fn test_missing_impl_package_fails_first() {
        let mut fx = ModelFixture::new();
        fx.store.insert_package("spoon.reflect.code");
        fx.store.insert_package("spoon.reflect.declaration");
        fx.store.insert_package("spoon.reflect.reference");
        fx.store.insert_package("spoon.support.reflect.code");
        fx.store.insert_package("spoon.support.reflect.reference");
        fx.iface("spoon.reflect.code.Foo", &["com.example.Missing"]);

        let config = MetaModelConfig::default();
        let err = MetaModel::build(&fx.store, &config).unwrap_err();
        match err {
            MetaModelError::MissingPackage { package, .. } => {
                assert_eq!(package, "spoon.support.reflect.declaration");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_cyclic_interfaces_terminate() {
        let mut fx = ModelFixture::spoon();
        fx.iface("spoon.reflect.code.A", &["spoon.reflect.code.B"]);
        fx.iface("spoon.reflect.code.B", &["spoon.reflect.code.A"]);

        let config = MetaModelConfig::default();
        let graph = MetaModel::build(&fx.store, &config).unwrap();
        let a = graph.get("A").unwrap();
        let b = graph.get("B").unwrap();
        assert_eq!(a.super_types(), &[b.id()]);
        assert_eq!(b.super_types(), &[a.id()]);
        assert_eq!(graph.all_super_types(a.id()), vec![b.id()]);
    }

    #[test]
    fn test_supertypes_reached_only_through_hierarchy_are_created() {
        let mut fx = ModelFixture::spoon();
        // CtElement lives outside the scanned packages
        fx.store.insert_package("spoon.reflect.visitor");
        fx.iface("spoon.reflect.visitor.CtElement", &[]);
        fx.iface("spoon.reflect.code.CtBlock", &["spoon.reflect.visitor.CtElement"]);

        let config = MetaModelConfig::default();
        let graph = MetaModel::build(&fx.store, &config).unwrap();
        assert_eq!(graph.names().collect::<Vec<_>>(), vec!["CtBlock", "CtElement"]);
    }

    #[test]
    fn test_class_hierarchy_links_meta_types() {
        let mut fx = ModelFixture::spoon();
        let stmt = fx.iface("spoon.reflect.code.CtStatement", &[]);
        fx.getter(stmt, "getLabel", "java.lang.String", "LABEL");
        fx.class(
            "spoon.support.reflect.code.CtStatementImpl",
            None,
            &["spoon.reflect.code.CtStatement"],
        );
        let block = fx.iface("spoon.reflect.code.CtBlock", &["spoon.reflect.code.CtStatement"]);
        fx.getter(
            block,
            "getStatements",
            "java.util.List<spoon.reflect.code.CtStatement>",
            "STATEMENT",
        );
        let block_impl = fx.class(
            "spoon.support.reflect.code.CtBlockImpl",
            Some("spoon.support.reflect.code.CtStatementImpl"),
            &["spoon.reflect.code.CtBlock"],
        );
        let add = fx.setter(
            block_impl,
            "addStatement",
            "spoon.reflect.code.CtStatement",
            "STATEMENT",
        );
        let get = fx.method(
            block_impl,
            "getStatements",
            "java.util.List<spoon.reflect.code.CtStatement>",
            &[],
        );

        let config = MetaModelConfig::default();
        let graph = MetaModel::build(&fx.store, &config).unwrap();
        let block_ty = graph.get("CtBlock").unwrap();
        let stmt_ty = graph.get("CtStatement").unwrap();
        assert_eq!(block_ty.super_types(), &[stmt_ty.id()]);
        assert_eq!(
            graph.type_of_declaration(block_impl).map(|t| t.id()),
            Some(block_ty.id())
        );

        let statements = block_ty.field(&Role::new("STATEMENT")).unwrap();
        assert_eq!(statements.methods().len(), 3);
        // class getter beats class setter at equal depth
        assert_eq!(statements.best_method().unwrap().method, get);
        assert_eq!(statements.setters().next().unwrap().method, add);
        assert_eq!(statements.container_kind(), Some(ContainerKind::List));
        assert_eq!(
            statements.value_type().unwrap().item_type(),
            &TypeRef::named("spoon.reflect.code.CtStatement")
        );

        let label = block_ty.field(&Role::new("LABEL")).unwrap();
        assert_eq!(label.getter().unwrap().kind, AccessorKind::Getter);
        assert!(label.methods().iter().all(|a| a.inherited));
    }

    #[test]
    fn test_class_adder_override_keeps_interface_getter_value() {
        let mut fx = ModelFixture::spoon();
        let block = fx.iface("spoon.reflect.code.CtBlock", &[]);
        let get = fx.getter(
            block,
            "getStatements",
            "java.util.List<spoon.reflect.code.CtStatement>",
            "STATEMENT",
        );
        fx.setter(block, "addStatement", "spoon.reflect.code.CtStatement", "STATEMENT");
        let block_impl = fx.class(
            "spoon.support.reflect.code.CtBlockImpl",
            None,
            &["spoon.reflect.code.CtBlock"],
        );
        // only the element adder is overridden
        let add = fx.method(
            block_impl,
            "addStatement",
            "void",
            &["spoon.reflect.code.CtStatement"],
        );

        let config = MetaModelConfig::default();
        let graph = MetaModel::build(&fx.store, &config).unwrap();
        let statements = graph
            .get("CtBlock")
            .unwrap()
            .field(&Role::new("STATEMENT"))
            .unwrap();
        assert_eq!(statements.best_method().unwrap().method, get);
        assert!(statements.setters().any(|a| a.method == add));
        assert_eq!(statements.container_kind(), Some(ContainerKind::List));
        assert_eq!(
            statements.value_type().unwrap().item_type(),
            &TypeRef::named("spoon.reflect.code.CtStatement")
        );
    }

    #[test]
    fn test_enum_supertype_is_rejected() {
        let mut fx = ModelFixture::spoon();
        fx.store.add_type(TypeKind::Enum, "spoon.reflect.code.CtKind");
        fx.iface("spoon.reflect.code.CtBlock", &["spoon.reflect.code.CtKind"]);

        let config = MetaModelConfig::default();
        let err = MetaModel::build(&fx.store, &config).unwrap_err();
        match &err {
            MetaModelError::UnexpectedDeclarationKind {
                qualified_name,
                expected,
                found,
            } => {
                assert_eq!(qualified_name, "spoon.reflect.code.CtKind");
                assert_eq!(expected, "interface or class");
                assert_eq!(found, "enum");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(err.error_code(), ErrorCode::ModelInconsistency);
    }

    #[test]
    fn test_badly_named_superclass_is_rejected() {
        let mut fx = ModelFixture::spoon();
        fx.class("spoon.support.reflect.code.BlockSupport", None, &[]);
        fx.iface("spoon.reflect.code.CtBlock", &[]);
        fx.class(
            "spoon.support.reflect.code.CtBlockImpl",
            Some("spoon.support.reflect.code.BlockSupport"),
            &["spoon.reflect.code.CtBlock"],
        );

        let config = MetaModelConfig::default();
        let err = MetaModel::build(&fx.store, &config).unwrap_err();
        match err {
            MetaModelError::InvalidImplementationNaming { qualified_name, .. } => {
                assert_eq!(qualified_name, "spoon.support.reflect.code.BlockSupport");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_class_without_interface_in_hierarchy_fails() {
        let mut fx = ModelFixture::spoon();
        fx.class("spoon.support.reflect.code.CtBaseImpl", None, &[]);
        fx.iface("spoon.reflect.code.CtBlock", &[]);
        fx.class(
            "spoon.support.reflect.code.CtBlockImpl",
            Some("spoon.support.reflect.code.CtBaseImpl"),
            &["spoon.reflect.code.CtBlock"],
        );

        let config = MetaModelConfig::default();
        let err = MetaModel::build(&fx.store, &config).unwrap_err();
        assert!(matches!(err, MetaModelError::MissingInterface { .. }));
    }
}
