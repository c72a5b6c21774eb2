//! Data types produced by the scanner and returned by searches.
//!
//! All data is owned so records outlive the token stream and source text
//! they were extracted from.

use serde::{Deserialize, Serialize};

/// What kind of class-like declaration a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl DeclarationKind {
    /// Whether in-body `use` statements of this kind import traits.
    /// Interfaces cannot use traits.
    pub fn uses_traits(self) -> bool {
        !matches!(self, DeclarationKind::Interface)
    }
}

/// One named class-like declaration discovered in a PHP file.
///
/// Serialises with the field names `class`, `file`, `namespace`,
/// `short_name`, `extends`, `implements`, `traits` and `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationRecord {
    /// Fully-qualified name, no leading separator (e.g. `App\ChildOne`).
    #[serde(rename = "class")]
    pub fqcn: String,
    /// Path of the file the declaration was found in.
    pub file: String,
    /// Namespace in effect at the declaration; empty for the global namespace.
    pub namespace: String,
    /// The bare declared identifier (e.g. `ChildOne`).
    pub short_name: String,
    /// Resolved parent from an `extends` clause, if any.  For interfaces
    /// extending several interfaces only the first is recorded.
    #[serde(rename = "extends")]
    pub parent: Option<String>,
    /// Resolved names from the `implements` clause, in source order.
    #[serde(rename = "implements")]
    pub interfaces: Vec<String>,
    /// Resolved names of traits used in the body, in source order.
    pub traits: Vec<String>,
    #[serde(default = "default_kind")]
    pub kind: DeclarationKind,
}

fn default_kind() -> DeclarationKind {
    DeclarationKind::Class
}

/// Which relationship a search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// The `extends` parent.
    Parent,
    /// Any entry of the `implements` list.
    Interface,
    /// Any used trait.
    Trait,
}

impl Relation {
    /// The resolved names of `record` this relation compares against.
    pub fn names<'r>(self, record: &'r DeclarationRecord) -> &'r [String] {
        match self {
            Relation::Parent => record.parent.as_slice(),
            Relation::Interface => &record.interfaces,
            Relation::Trait => &record.traits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DeclarationRecord {
        DeclarationRecord {
            fqcn: "App\\ChildOne".to_string(),
            file: "src/ChildOne.php".to_string(),
            namespace: "App".to_string(),
            short_name: "ChildOne".to_string(),
            parent: Some("App\\BaseClass".to_string()),
            interfaces: vec!["App\\A".to_string(), "App\\B".to_string()],
            traits: vec![],
            kind: DeclarationKind::Class,
        }
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["class"], "App\\ChildOne");
        assert_eq!(json["file"], "src/ChildOne.php");
        assert_eq!(json["namespace"], "App");
        assert_eq!(json["short_name"], "ChildOne");
        assert_eq!(json["extends"], "App\\BaseClass");
        assert_eq!(json["implements"][1], "App\\B");
        assert_eq!(json["traits"], serde_json::json!([]));
        assert_eq!(json["kind"], "class");
    }

    #[test]
    fn test_missing_parent_serializes_as_null() {
        let mut r = record();
        r.parent = None;
        let json = serde_json::to_value(&r).unwrap();
        assert!(json["extends"].is_null());
    }

    #[test]
    fn test_relation_names() {
        let r = record();
        assert_eq!(Relation::Parent.names(&r), ["App\\BaseClass".to_string()]);
        assert_eq!(Relation::Interface.names(&r).len(), 2);
        assert!(Relation::Trait.names(&r).is_empty());
    }

    #[test]
    fn test_interfaces_do_not_use_traits() {
        assert!(DeclarationKind::Class.uses_traits());
        assert!(DeclarationKind::Trait.uses_traits());
        assert!(DeclarationKind::Enum.uses_traits());
        assert!(!DeclarationKind::Interface.uses_traits());
    }
}
