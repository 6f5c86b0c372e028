//! Deterministic digests of finished graphs.
//!
//! The canonical text lists every meta type in name order with its backing
//! declarations, supertype names, other methods and fields (role, value
//! type, accessors in best-match order). Two builds over the same
//! declarations yield the same text and therefore the same digest.

use std::fmt;
use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use crate::builder::MetaModel;

/// SHA-256 digest of a graph's canonical rendering, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphFingerprint(pub String);

impl GraphFingerprint {
    /// Compute the digest of the given bytes.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        GraphFingerprint(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for GraphFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl MetaModel {
    /// Canonical text rendering used for fingerprinting.
    pub fn canonical_text(&self) -> String {
        let mut out = String::new();
        for name in self.names() {
            let Some(ty) = self.get(name) else {
                continue;
            };
            let _ = writeln!(out, "type {}", ty.name());
            if let Some(iface) = ty.model_interface() {
                let _ = writeln!(out, "  interface {}", iface);
            }
            if let Some(class) = ty.model_class() {
                let _ = writeln!(out, "  class {}", class);
            }

            let mut supers: Vec<&str> = ty
                .super_types()
                .iter()
                .filter_map(|&id| self.get_by_id(id))
                .map(|s| s.name())
                .collect();
            supers.sort_unstable();
            for s in supers {
                let _ = writeln!(out, "  super {}", s);
            }

            for method in ty.other_methods() {
                let _ = writeln!(out, "  other {}", method);
            }

            for field in ty.fields() {
                let _ = write!(out, "  field {}", field.role());
                if let Some(value_type) = field.value_type() {
                    let _ = write!(out, ": {}", value_type);
                }
                out.push('\n');
                for accessor in field.methods() {
                    let _ = writeln!(
                        out,
                        "    {} {}{}",
                        accessor.kind,
                        accessor.method,
                        if accessor.inherited { " inherited" } else { "" }
                    );
                }
            }
        }
        out
    }

    /// Digest of [`canonical_text`](Self::canonical_text).
    pub fn fingerprint(&self) -> GraphFingerprint {
        GraphFingerprint::compute(self.canonical_text().as_bytes())
    }
}
