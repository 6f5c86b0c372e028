//! Qualified-name helpers.
//!
//! Names are dotted Java-style paths (`spoon.reflect.code.CtBlock`). Nested
//! types are not modeled separately; a qualified name is split at its last
//! dot only.

/// The package part of a qualified name (empty for the default package).
pub fn package_of(qualified_name: &str) -> &str {
    match qualified_name.rfind('.') {
        Some(idx) => &qualified_name[..idx],
        None => "",
    }
}

/// The simple name part of a qualified name.
pub fn simple_name_of(qualified_name: &str) -> &str {
    match qualified_name.rfind('.') {
        Some(idx) => &qualified_name[idx + 1..],
        None => qualified_name,
    }
}

/// True if `name` equals `package` or lives somewhere below it.
///
/// Matching is segment-wise: `spoon.reflectx.Foo` is not under `spoon.reflect`.
pub fn is_under(name: &str, package: &str) -> bool {
    if package.is_empty() {
        return true;
    }
    match name.strip_prefix(package) {
        Some("") => true,
        Some(rest) => rest.starts_with('.'),
        None => false,
    }
}

/// Replace the package prefix `from` of `name` with `to`.
///
/// Returns `None` if `name` is not under `from`.
pub fn replace_prefix(name: &str, from: &str, to: &str) -> Option<String> {
    if !is_under(name, from) {
        return None;
    }
    Some(format!("{}{}", to, &name[from.len()..]))
}

/// Strip `suffix` from `name` if present.
pub fn strip_suffix<'a>(name: &'a str, suffix: &str) -> &'a str {
    name.strip_suffix(suffix).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_and_simple_name() {
        assert_eq!(package_of("spoon.reflect.code.CtBlock"), "spoon.reflect.code");
        assert_eq!(simple_name_of("spoon.reflect.code.CtBlock"), "CtBlock");
        assert_eq!(package_of("CtBlock"), "");
        assert_eq!(simple_name_of("CtBlock"), "CtBlock");
    }

    #[test]
    fn test_is_under_is_segment_wise() {
        assert!(is_under("spoon.reflect.code.CtBlock", "spoon.reflect"));
        assert!(is_under("spoon.reflect", "spoon.reflect"));
        assert!(!is_under("spoon.reflectx.CtBlock", "spoon.reflect"));
        assert!(!is_under("spoon.support.reflect.code", "spoon.reflect"));
    }

    #[test]
    fn test_replace_prefix() {
        assert_eq!(
            replace_prefix(
                "spoon.reflect.code.CtBlock",
                "spoon.reflect",
                "spoon.support.reflect"
            )
            .as_deref(),
            Some("spoon.support.reflect.code.CtBlock")
        );
        assert_eq!(replace_prefix("java.lang.Object", "spoon.reflect", "x"), None);
    }

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip_suffix("CtBlockImpl", "Impl"), "CtBlock");
        assert_eq!(strip_suffix("CtBlock", "Impl"), "CtBlock");
    }
}
