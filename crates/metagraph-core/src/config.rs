//! Naming conventions that tie the declaration model to the meta-model.
//!
//! [`MetaModelConfig::default`] describes the Spoon AST model: interfaces in
//! `spoon.reflect.{code,declaration,reference}`, implementations with the
//! same relative path under `spoon.support.reflect` and an `Impl` suffix,
//! accessors marked by `@PropertyGetter` / `@PropertySetter`.
//!
//! A configuration is fixed for the duration of a build.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{MetaModelError, MetaModelResult};
use crate::names;

/// Default implementation-class suffix.
pub const DEFAULT_IMPL_SUFFIX: &str = "Impl";

/// Default root of the API packages.
pub const DEFAULT_API_ROOT: &str = "spoon.reflect";

/// Default root of the implementation packages.
pub const DEFAULT_IMPL_ROOT: &str = "spoon.support.reflect";

/// Packages whose interfaces make up the model surface.
pub const DEFAULT_API_PACKAGES: &[&str] = &[
    "spoon.reflect.code",
    "spoon.reflect.declaration",
    "spoon.reflect.reference",
];

/// Supertypes that model types extend but that are not part of the declarations.
pub const DEFAULT_EXPECTED_UNRESOLVABLE: &[&str] = &[
    "java.lang.Cloneable",
    "spoon.processing.FactoryAccessor",
    "spoon.reflect.visitor.CtVisitable",
    "spoon.reflect.visitor.chain.CtQueryable",
    "spoon.template.TemplateParameter",
    "java.lang.Iterable",
    "java.io.Serializable",
];

/// Annotation marking a property getter.
pub const DEFAULT_GETTER_ANNOTATION: &str = "spoon.reflect.annotations.PropertyGetter";

/// Annotation marking a property setter.
pub const DEFAULT_SETTER_ANNOTATION: &str = "spoon.reflect.annotations.PropertySetter";

/// How many values a property holds and how they are organized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContainerKind {
    /// One value.
    Single,
    /// An ordered sequence.
    List,
    /// An unordered set.
    Set,
    /// A keyed mapping.
    Map,
}

impl ContainerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Single => "single",
            ContainerKind::List => "list",
            ContainerKind::Set => "set",
            ContainerKind::Map => "map",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_container_shapes() -> BTreeMap<String, ContainerKind> {
    let list = [
        "java.util.List",
        "java.util.ArrayList",
        "java.util.LinkedList",
        "java.util.Collection",
    ];
    let set = [
        "java.util.Set",
        "java.util.HashSet",
        "java.util.LinkedHashSet",
        "java.util.SortedSet",
        "java.util.NavigableSet",
        "java.util.TreeSet",
        "java.util.EnumSet",
    ];
    let map = [
        "java.util.Map",
        "java.util.HashMap",
        "java.util.LinkedHashMap",
        "java.util.SortedMap",
        "java.util.NavigableMap",
        "java.util.TreeMap",
    ];

    let mut shapes = BTreeMap::new();
    for (members, kind) in [
        (&list[..], ContainerKind::List),
        (&set[..], ContainerKind::Set),
        (&map[..], ContainerKind::Map),
    ] {
        for name in members {
            shapes.insert(name.to_string(), kind);
        }
    }
    shapes
}

/// Conventions used to pair declarations and classify accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaModelConfig {
    /// Suffix appended to an interface's simple name to name its implementation.
    pub impl_suffix: String,
    /// Package root of the API interfaces.
    pub api_root: String,
    /// Package root of the implementation classes.
    pub impl_root: String,
    /// Packages whose interfaces seed the graph.
    pub api_packages: BTreeSet<String>,
    /// Supertypes that may legitimately be missing from the declarations.
    pub expected_unresolvable: BTreeSet<String>,
    /// Qualified name of the getter annotation.
    pub getter_annotation: String,
    /// Qualified name of the setter annotation.
    pub setter_annotation: String,
    /// Erased container type name → container kind.
    pub container_shapes: BTreeMap<String, ContainerKind>,
}

impl Default for MetaModelConfig {
    fn default() -> Self {
        MetaModelConfig {
            impl_suffix: DEFAULT_IMPL_SUFFIX.to_string(),
            api_root: DEFAULT_API_ROOT.to_string(),
            impl_root: DEFAULT_IMPL_ROOT.to_string(),
            api_packages: DEFAULT_API_PACKAGES.iter().map(|s| s.to_string()).collect(),
            expected_unresolvable: DEFAULT_EXPECTED_UNRESOLVABLE
                .iter()
                .map(|s| s.to_string())
                .collect(),
            getter_annotation: DEFAULT_GETTER_ANNOTATION.to_string(),
            setter_annotation: DEFAULT_SETTER_ANNOTATION.to_string(),
            container_shapes: default_container_shapes(),
        }
    }
}

impl MetaModelConfig {
    /// The Spoon conventions.
    pub fn new() -> Self {
        MetaModelConfig::default()
    }

    /// Use a different implementation suffix.
    pub fn with_impl_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.impl_suffix = suffix.into();
        self
    }

    /// Use different API and implementation package roots.
    pub fn with_roots(mut self, api_root: impl Into<String>, impl_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self.impl_root = impl_root.into();
        self
    }

    /// Replace the set of API packages.
    pub fn with_api_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api_packages = packages.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the allow-list of unresolvable supertypes.
    pub fn with_expected_unresolvable<I, S>(mut self, qualified_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_unresolvable = qualified_names.into_iter().map(Into::into).collect();
        self
    }

    /// Use different accessor annotations.
    pub fn with_accessor_annotations(
        mut self,
        getter: impl Into<String>,
        setter: impl Into<String>,
    ) -> Self {
        self.getter_annotation = getter.into();
        self.setter_annotation = setter.into();
        self
    }

    /// Register an additional container type.
    pub fn with_container_shape(mut self, name: impl Into<String>, kind: ContainerKind) -> Self {
        self.container_shapes.insert(name.into(), kind);
        self
    }

    // ========================================================================
    // Naming Rules
    // ========================================================================

    /// Logical meta-type name of a declaration's simple name.
    pub fn meta_type_name<'a>(&self, simple_name: &'a str) -> &'a str {
        names::strip_suffix(simple_name, &self.impl_suffix)
    }

    /// Map an API-side qualified name onto the implementation packages.
    pub fn impl_package_of(&self, api_qualified_name: &str) -> MetaModelResult<String> {
        names::replace_prefix(api_qualified_name, &self.api_root, &self.impl_root).ok_or_else(
            || MetaModelError::OutsideApiRoot {
                qualified_name: api_qualified_name.to_string(),
                api_root: self.api_root.clone(),
            },
        )
    }

    /// Qualified name of the implementation class expected for an interface.
    pub fn impl_class_name_of(&self, iface_qualified_name: &str) -> MetaModelResult<String> {
        Ok(format!(
            "{}{}",
            self.impl_package_of(iface_qualified_name)?,
            self.impl_suffix
        ))
    }

    /// Qualified name of the interface expected for an implementation class.
    pub fn interface_name_of_impl(&self, class_qualified_name: &str) -> MetaModelResult<String> {
        let invalid = |reason: String| MetaModelError::InvalidImplementationNaming {
            qualified_name: class_qualified_name.to_string(),
            reason,
        };

        let stem = class_qualified_name
            .strip_suffix(self.impl_suffix.as_str())
            .filter(|stem| !stem.is_empty() && !stem.ends_with('.'))
            .ok_or_else(|| invalid(format!("name does not end with '{}'", self.impl_suffix)))?;

        names::replace_prefix(stem, &self.impl_root, &self.api_root)
            .ok_or_else(|| invalid(format!("not inside a package below {}", self.impl_root)))
    }

    /// True if `qualified_name` is allowed to be missing from the declarations.
    pub fn is_expected_unresolvable(&self, qualified_name: &str) -> bool {
        self.expected_unresolvable.contains(qualified_name)
    }

    /// Container kind of an erased type name; unknown names hold a single value.
    pub fn container_kind_of(&self, erased_name: &str) -> ContainerKind {
        self.container_shapes
            .get(erased_name)
            .copied()
            .unwrap_or(ContainerKind::Single)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MetaModelConfig::default();
        assert_eq!(config.impl_suffix, "Impl");
        assert_eq!(config.api_packages.len(), 3);
        assert!(config.is_expected_unresolvable("java.lang.Cloneable"));
        assert!(config.is_expected_unresolvable("java.io.Serializable"));
        assert!(!config.is_expected_unresolvable("java.lang.Object"));
    }

    #[test]
    fn test_meta_type_name() {
        let config = MetaModelConfig::default();
        assert_eq!(config.meta_type_name("CtBlockImpl"), "CtBlock");
        assert_eq!(config.meta_type_name("CtBlock"), "CtBlock");
    }

    #[test]
    fn test_impl_class_name_of() {
        let config = MetaModelConfig::default();
        assert_eq!(
            config.impl_class_name_of("spoon.reflect.code.CtBlock").unwrap(),
            "spoon.support.reflect.code.CtBlockImpl"
        );
        let err = config.impl_class_name_of("java.lang.Runnable").unwrap_err();
        assert!(matches!(err, MetaModelError::OutsideApiRoot { .. }));
    }

    #[test]
    fn test_interface_name_of_impl() {
        let config = MetaModelConfig::default();
        assert_eq!(
            config
                .interface_name_of_impl("spoon.support.reflect.code.CtBlockImpl")
                .unwrap(),
            "spoon.reflect.code.CtBlock"
        );
    }

    #[test]
    fn test_interface_name_of_impl_rejects_bad_names() {
        let config = MetaModelConfig::default();
        for bad in [
            "spoon.support.reflect.code.CtBlockHelper",
            "spoon.reflect.code.CtBlockImpl",
            "spoon.support.reflect.code.Impl",
        ] {
            let err = config.interface_name_of_impl(bad).unwrap_err();
            assert!(
                matches!(err, MetaModelError::InvalidImplementationNaming { .. }),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_container_kinds() {
        let config = MetaModelConfig::default();
        assert_eq!(config.container_kind_of("java.util.List"), ContainerKind::List);
        assert_eq!(config.container_kind_of("java.util.Collection"), ContainerKind::List);
        assert_eq!(config.container_kind_of("java.util.Set"), ContainerKind::Set);
        assert_eq!(config.container_kind_of("java.util.Map"), ContainerKind::Map);
        assert_eq!(
            config.container_kind_of("java.lang.String"),
            ContainerKind::Single
        );

        let config = config.with_container_shape("a.Bag", ContainerKind::Set);
        assert_eq!(config.container_kind_of("a.Bag"), ContainerKind::Set);
    }

    #[test]
    fn test_builder_overrides() {
        let config = MetaModelConfig::new()
            .with_impl_suffix("Node")
            .with_roots("model.api", "model.impl")
            .with_api_packages(["model.api.core"])
            .with_expected_unresolvable(Vec::<String>::new())
            .with_accessor_annotations("model.meta.Reads", "model.meta.Writes");
        assert_eq!(
            config.impl_class_name_of("model.api.core.Expr").unwrap(),
            "model.impl.core.ExprNode"
        );
        assert!(config.expected_unresolvable.is_empty());
        assert_eq!(config.getter_annotation, "model.meta.Reads");
        assert_eq!(config.setter_annotation, "model.meta.Writes");
    }
}
