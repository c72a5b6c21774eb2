//! Small name helpers shared across the crate.

/// The last segment of a (possibly qualified) name.
///
/// `short_name("App\\Models\\User")` is `"User"`; a trailing separator
/// yields an empty string.
pub fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

/// Canonical form used for comparing fully-qualified names: no leading
/// separator, ASCII-lowercased (PHP class names are case-insensitive in
/// the ASCII range only).
pub fn normalize_fqn(name: &str) -> String {
    name.trim_start_matches('\\').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("App\\Models\\User"), "User");
        assert_eq!(short_name("User"), "User");
        assert_eq!(short_name("\\User"), "User");
        assert_eq!(short_name("App\\"), "");
    }

    #[test]
    fn test_normalize_fqn() {
        assert_eq!(normalize_fqn("\\App\\BaseClass"), "app\\baseclass");
        assert_eq!(normalize_fqn("app\\baseclass"), "app\\baseclass");
        assert_eq!(normalize_fqn(""), "");
    }
}
