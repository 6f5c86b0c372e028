//! Effective value types of meta-model fields.
//!
//! An accessor's declared type is either a recognized container (by erased
//! qualified name, see [`MetaModelConfig::container_shapes`]), an array, or
//! anything else, which holds a single value. Containers contribute their
//! element type; raw containers fall back to `java.lang.Object`.

use std::fmt;

pub use metagraph_core::config::ContainerKind;
use metagraph_core::config::MetaModelConfig;
use metagraph_core::decl::TypeRef;

/// Type used for the elements of raw (unparameterized) containers.
pub const RAW_ELEMENT_TYPE: &str = "java.lang.Object";

/// The semantic type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// One value of the given type.
    Single(TypeRef),
    /// An ordered sequence of the given element type.
    List(TypeRef),
    /// An unordered set of the given element type.
    Set(TypeRef),
    /// A mapping from key type to value type.
    Map { key: TypeRef, value: TypeRef },
}

impl ValueType {
    /// Classify a declared type.
    pub fn classify(config: &MetaModelConfig, declared: &TypeRef) -> ValueType {
        if let TypeRef::Array { component } = declared {
            return ValueType::List((**component).clone());
        }

        let kind = declared
            .erasure_name()
            .map(|name| config.container_kind_of(name))
            .unwrap_or(ContainerKind::Single);
        let arg = |i: usize| {
            declared
                .args()
                .get(i)
                .map(|t| t.unwrap_wildcard().clone())
                .unwrap_or_else(|| TypeRef::named(RAW_ELEMENT_TYPE))
        };

        match kind {
            ContainerKind::Single => ValueType::Single(declared.clone()),
            ContainerKind::List => ValueType::List(arg(0)),
            ContainerKind::Set => ValueType::Set(arg(0)),
            ContainerKind::Map => ValueType::Map {
                key: arg(0),
                value: arg(1),
            },
        }
    }

    /// The container kind of this value type.
    pub fn container_kind(&self) -> ContainerKind {
        match self {
            ValueType::Single(_) => ContainerKind::Single,
            ValueType::List(_) => ContainerKind::List,
            ValueType::Set(_) => ContainerKind::Set,
            ValueType::Map { .. } => ContainerKind::Map,
        }
    }

    /// The item type: the value itself, the element type, or the map's value type.
    pub fn item_type(&self) -> &TypeRef {
        match self {
            ValueType::Single(t) | ValueType::List(t) | ValueType::Set(t) => t,
            ValueType::Map { value, .. } => value,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Single(t) => write!(f, "single value of {}", t),
            ValueType::List(t) => write!(f, "list of {}", t),
            ValueType::Set(t) => write!(f, "set of {}", t),
            ValueType::Map { key, value } => write!(f, "map of {} to {}", key, value),
        }
    }
}
