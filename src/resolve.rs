//! Qualified-name resolution.
//!
//! Turns a name as written in source (possibly relative, possibly aliased
//! through a `use` import) into a fully-qualified name with no leading
//! separator.
//!
//! Passing an empty [`ImportTable`] gives plain namespace-prefixing
//! behaviour with no alias awareness.

use crate::imports::ImportTable;

/// Resolve `raw` against the current namespace and the file's imports.
///
/// Rules, in order:
/// 1. Empty after trimming a leading separator → `None`.
/// 2. Leading `\` → already fully qualified; returned without the `\`.
/// 3. `namespace\Rest` → current namespace + `Rest`.
/// 4. Single segment → imported name if aliased, else namespace-prefixed.
/// 5. Multi-segment → if the first segment is an import alias, it is
///    replaced by the imported name; otherwise the whole name is
///    namespace-prefixed.
pub fn resolve_name(raw: &str, namespace: &str, imports: &ImportTable) -> Option<String> {
    let trimmed = raw.strip_prefix('\\').unwrap_or(raw);
    if trimmed.is_empty() {
        return None;
    }

    if raw.starts_with('\\') {
        return Some(trimmed.to_string());
    }

    if let Some(rest) = strip_namespace_operator(trimmed) {
        if rest.is_empty() {
            return None;
        }
        return Some(prefix_namespace(namespace, rest));
    }

    match trimmed.split_once('\\') {
        None => {
            if let Some(fqn) = imports.get(trimmed) {
                return Some(fqn.trim_start_matches('\\').to_string());
            }
            Some(prefix_namespace(namespace, trimmed))
        }
        Some((first, rest)) => {
            if let Some(base) = imports.get(first) {
                let base = base.trim_start_matches('\\').trim_end_matches('\\');
                return Some(format!("{}\\{}", base, rest));
            }
            Some(prefix_namespace(namespace, trimmed))
        }
    }
}

fn prefix_namespace(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}\\{}", namespace, name)
    }
}

/// Strip a leading `namespace\` relative-name operator (case-insensitive).
fn strip_namespace_operator(name: &str) -> Option<&str> {
    const OPERATOR: &str = "namespace\\";
    name.get(..OPERATOR.len())
        .filter(|head| head.eq_ignore_ascii_case(OPERATOR))
        .map(|_| &name[OPERATOR.len()..])
}
