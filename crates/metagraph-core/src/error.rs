//! Error types and error code constants for metagraph.
//!
//! Every failure during meta-model construction is fatal: the build aborts
//! and no partial graph is returned. [`MetaModelError`] carries enough
//! context to explain which declaration broke which convention, and
//! [`ErrorCode`] groups the variants into stable numeric classes for callers
//! that need to map them onto their own exit codes.
//!
//! ## Error Code Mapping
//!
//! - `2`: Configuration errors (required package missing)
//! - `3`: Resolution errors (supertype or interface cannot be found)
//! - `4`: Model inconsistency (naming conventions broken, accessor shapes disagree)
//! - `5`: Input errors (malformed type references or snapshots)

use std::fmt;

use thiserror::Error;

// ============================================================================
// Error Codes
// ============================================================================

/// Stable error classes for [`MetaModelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// The declaration model does not contain what the configuration requires.
    Configuration = 2,
    /// A referenced declaration cannot be resolved.
    Resolution = 3,
    /// The declarations break the interface/implementation conventions.
    ModelInconsistency = 4,
    /// Input text or snapshot data is malformed.
    Input = 5,
}

impl ErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Which half of an API/implementation package pair is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageSide {
    Api,
    Implementation,
}

impl fmt::Display for PackageSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageSide::Api => write!(f, "API"),
            PackageSide::Implementation => write!(f, "implementation"),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// Errors raised while building or querying the meta-model.
#[derive(Debug, Error)]
pub enum MetaModelError {
    /// A required API or implementation package is absent.
    #[error("declaration model is missing {side} package {package}")]
    MissingPackage { package: String, side: PackageSide },

    /// A supertype reference cannot be resolved and is not allow-listed.
    #[error("cannot resolve supertype {qualified_name} of {subtype}: missing from the declaration model")]
    UnresolvableSupertype {
        qualified_name: String,
        subtype: String,
    },

    /// A declaration has a different kind than the one required.
    #[error("unexpected declaration kind for {qualified_name}: expected {expected}, found {found}")]
    UnexpectedDeclarationKind {
        qualified_name: String,
        expected: String,
        found: String,
    },

    /// An implementation class does not follow the package/suffix convention.
    #[error("unexpected implementation class {qualified_name}: {reason}")]
    InvalidImplementationNaming {
        qualified_name: String,
        reason: String,
    },

    /// An interface lives outside the API package root.
    #[error("{qualified_name} does not belong to the model API package {api_root}")]
    OutsideApiRoot {
        qualified_name: String,
        api_root: String,
    },

    /// An implementation class has no governing interface.
    #[error("implementation class {class} has no governing interface")]
    MissingInterface { class: String },

    /// Accessors of one role disagree on container shape.
    #[error("inconsistent shape of {meta_type}.{role}: expected {expected}, but {method} yields {found}")]
    InconsistentFieldShape {
        meta_type: String,
        role: String,
        expected: String,
        found: String,
        method: String,
    },

    /// A role-annotated method cannot act as an accessor.
    #[error("invalid accessor {method}: {reason}")]
    InvalidAccessor { method: String, reason: String },

    /// Type reference text could not be parsed.
    #[error("invalid type reference '{input}': {message}")]
    InvalidTypeRef { input: String, message: String },

    /// A declaration snapshot is malformed.
    #[error("invalid declaration snapshot: {message}")]
    InvalidSnapshot { message: String },
}

/// Result type for metagraph operations.
pub type MetaModelResult<T> = Result<T, MetaModelError>;

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&MetaModelError> for ErrorCode {
    fn from(err: &MetaModelError) -> Self {
        match err {
            MetaModelError::MissingPackage { .. } => ErrorCode::Configuration,
            MetaModelError::UnresolvableSupertype { .. } => ErrorCode::Resolution,
            MetaModelError::MissingInterface { .. } => ErrorCode::Resolution,
            MetaModelError::UnexpectedDeclarationKind { .. } => ErrorCode::ModelInconsistency,
            MetaModelError::InvalidImplementationNaming { .. } => ErrorCode::ModelInconsistency,
            MetaModelError::OutsideApiRoot { .. } => ErrorCode::ModelInconsistency,
            MetaModelError::InconsistentFieldShape { .. } => ErrorCode::ModelInconsistency,
            MetaModelError::InvalidAccessor { .. } => ErrorCode::ModelInconsistency,
            MetaModelError::InvalidTypeRef { .. } => ErrorCode::Input,
            MetaModelError::InvalidSnapshot { .. } => ErrorCode::Input,
        }
    }
}

impl From<MetaModelError> for ErrorCode {
    fn from(err: MetaModelError) -> Self {
        ErrorCode::from(&err)
    }
}

impl From<serde_json::Error> for MetaModelError {
    fn from(err: serde_json::Error) -> Self {
        MetaModelError::InvalidSnapshot {
            message: err.to_string(),
        }
    }
}

impl MetaModelError {
    /// The error class of this error.
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::from(self)
    }

    /// Create a missing-package error for an API package.
    pub fn missing_api_package(package: impl Into<String>) -> Self {
        MetaModelError::MissingPackage {
            package: package.into(),
            side: PackageSide::Api,
        }
    }

    /// Create a missing-package error for an implementation package.
    pub fn missing_impl_package(package: impl Into<String>) -> Self {
        MetaModelError::MissingPackage {
            package: package.into(),
            side: PackageSide::Implementation,
        }
    }

    /// Create an invalid-snapshot error.
    pub fn invalid_snapshot(message: impl Into<String>) -> Self {
        MetaModelError::InvalidSnapshot {
            message: message.into(),
        }
    }
}
