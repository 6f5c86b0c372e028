//! Type references as written in declarations.
//!
//! A [`TypeRef`] is the declared (not resolved) form of a type: a method's
//! return type, a parameter type, a supertype. Resolution to a
//! [`TypeDecl`](super::TypeDecl) goes through the erased qualified name.
//!
//! ## Textual form
//!
//! ```text
//! <type>     := <base> ("[" "]")*
//! <base>     := "?" [("extends" | "super") <type>]
//!             | <name> ["<" <type> ("," <type>)* ">"]
//! <name>     := ident ("." ident)*
//! ```
//!
//! A name without dots is a primitive if it is one of the Java primitive
//! keywords, otherwise a type variable when it has no type arguments.
//! Declared class and interface types must therefore be fully qualified.

use std::fmt;
use std::str::FromStr;

use winnow::ascii::{multispace0, multispace1};
use winnow::combinator::{alt, delimited, opt, preceded, repeat, separated};
use winnow::prelude::*;
use winnow::token::take_while;
use winnow::ModalResult;

use crate::error::{MetaModelError, MetaModelResult};

/// Java primitive keywords (including `void`).
pub const PRIMITIVES: &[&str] = &[
    "void", "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

/// Bound of a wildcard type argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    /// `?`
    Unbounded,
    /// `? extends T`
    Extends(Box<TypeRef>),
    /// `? super T`
    Super(Box<TypeRef>),
}

/// A declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A primitive type or `void`.
    Primitive { name: String },
    /// A class or interface type, possibly parameterized.
    Named { name: String, args: Vec<TypeRef> },
    /// A type variable (`T`, `E`).
    Variable { name: String },
    /// A wildcard type argument.
    Wildcard(WildcardBound),
    /// An array type.
    Array { component: Box<TypeRef> },
}

impl TypeRef {
    /// Create a named type without arguments.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: vec![],
        }
    }

    /// Create a named type with arguments.
    pub fn named_with_args(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args,
        }
    }

    /// Create a type variable.
    pub fn variable(name: impl Into<String>) -> Self {
        TypeRef::Variable { name: name.into() }
    }

    /// Create a primitive type.
    pub fn primitive(name: impl Into<String>) -> Self {
        TypeRef::Primitive { name: name.into() }
    }

    /// Create an array type.
    pub fn array(component: TypeRef) -> Self {
        TypeRef::Array {
            component: Box::new(component),
        }
    }

    /// `void`.
    pub fn void() -> Self {
        TypeRef::primitive("void")
    }

    /// Parse the textual form of a type reference.
    pub fn parse(input: &str) -> MetaModelResult<TypeRef> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MetaModelError::InvalidTypeRef {
                input: input.to_string(),
                message: "empty type reference".to_string(),
            });
        }

        parse_type
            .parse(trimmed)
            .map_err(|e| MetaModelError::InvalidTypeRef {
                input: input.to_string(),
                message: format!("{:?}", e),
            })
    }

    /// The qualified name of the erasure, if it names a class, interface or primitive.
    ///
    /// Upper-bounded wildcards erase to their bound; type variables, arrays
    /// and other wildcards have no declaration name.
    pub fn erasure_name(&self) -> Option<&str> {
        match self {
            TypeRef::Primitive { name } | TypeRef::Named { name, .. } => Some(name),
            TypeRef::Wildcard(WildcardBound::Extends(bound)) => bound.erasure_name(),
            TypeRef::Wildcard(_) | TypeRef::Variable { .. } | TypeRef::Array { .. } => None,
        }
    }

    /// Type arguments of a parameterized type (empty otherwise).
    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Named { args, .. } => args,
            _ => &[],
        }
    }

    /// True for a bare type variable.
    pub fn is_type_variable(&self) -> bool {
        matches!(self, TypeRef::Variable { .. })
    }

    /// True for `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Primitive { name } if name == "void")
    }

    /// Strip a wildcard down to the type it stands for.
    ///
    /// `? extends T` and `? super T` yield `T`; `?` stays as is.
    pub fn unwrap_wildcard(&self) -> &TypeRef {
        match self {
            TypeRef::Wildcard(WildcardBound::Extends(bound))
            | TypeRef::Wildcard(WildcardBound::Super(bound)) => bound,
            other => other,
        }
    }

    /// Erasure-level compatibility used for override matching.
    ///
    /// Type variables match any reference type, since a subtype may
    /// specialize a generic parameter of its supertype.
    pub fn is_override_compatible(&self, other: &TypeRef) -> bool {
        match (self, other) {
            (TypeRef::Variable { .. }, b) | (b, TypeRef::Variable { .. }) => {
                !matches!(b, TypeRef::Primitive { .. })
            }
            (TypeRef::Array { component: a }, TypeRef::Array { component: b }) => {
                a.is_override_compatible(b)
            }
            (TypeRef::Primitive { name: a }, TypeRef::Primitive { name: b }) => a == b,
            (TypeRef::Named { name: a, .. }, TypeRef::Named { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl FromStr for TypeRef {
    type Err = MetaModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeRef::parse(s)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive { name } | TypeRef::Variable { name } => write!(f, "{}", name),
            TypeRef::Named { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Wildcard(WildcardBound::Unbounded) => write!(f, "?"),
            TypeRef::Wildcard(WildcardBound::Extends(bound)) => write!(f, "? extends {}", bound),
            TypeRef::Wildcard(WildcardBound::Super(bound)) => write!(f, "? super {}", bound),
            TypeRef::Array { component } => write!(f, "{}[]", component),
        }
    }
}

// ============================================================================
// Parser implementation using winnow
// ============================================================================

/// Parse a full type, including trailing array dimensions.
fn parse_type(input: &mut &str) -> ModalResult<TypeRef> {
    let _ = multispace0.parse_next(input)?;

    let base = alt((parse_wildcard, parse_named)).parse_next(input)?;

    let dims: usize = repeat(0.., (multispace0, '[', multispace0, ']')).parse_next(input)?;
    let _ = multispace0.parse_next(input)?;

    let mut ty = base;
    for _ in 0..dims {
        ty = TypeRef::array(ty);
    }
    Ok(ty)
}

/// Parse `?`, `? extends T` or `? super T`.
fn parse_wildcard(input: &mut &str) -> ModalResult<TypeRef> {
    let _ = '?'.parse_next(input)?;

    let bound = opt(preceded(
        multispace1,
        alt((
            preceded(("extends", multispace1), parse_type)
                .map(|t| WildcardBound::Extends(Box::new(t))),
            preceded(("super", multispace1), parse_type).map(|t| WildcardBound::Super(Box::new(t))),
        )),
    ))
    .parse_next(input)?;

    Ok(TypeRef::Wildcard(bound.unwrap_or(WildcardBound::Unbounded)))
}

/// Parse a dotted name with optional type arguments.
fn parse_named(input: &mut &str) -> ModalResult<TypeRef> {
    let segments: Vec<&str> = separated(1.., parse_ident, '.').parse_next(input)?;
    let name = segments.join(".");

    let args: Option<Vec<TypeRef>> = opt(delimited(
        (multispace0, '<'),
        separated(1.., parse_type, ','),
        '>',
    ))
    .parse_next(input)?;
    let args = args.unwrap_or_default();

    if segments.len() == 1 && args.is_empty() {
        if PRIMITIVES.contains(&name.as_str()) {
            return Ok(TypeRef::Primitive { name });
        }
        return Ok(TypeRef::Variable { name });
    }
    Ok(TypeRef::Named { name, args })
}

/// Parse a Java identifier segment.
fn parse_ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '$').parse_next(input)
}
