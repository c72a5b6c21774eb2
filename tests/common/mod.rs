#![allow(dead_code)]

use std::fs;
use std::path::Path;

use phpantom_finder::DeclarationRecord;

/// Helper: create a temp workspace containing the given PHP files.
pub fn create_workspace(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    for (rel_path, content) in files {
        write_file(dir.path(), rel_path, content);
    }
    dir
}

pub fn write_file(root: &Path, rel_path: &str, content: &str) {
    let full = root.join(rel_path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).expect("failed to create dirs");
    }
    fs::write(&full, content).expect("failed to write PHP file");
}

/// The fully-qualified names of `records`, in order.
pub fn class_names(records: &[DeclarationRecord]) -> Vec<&str> {
    records.iter().map(|r| r.fqcn.as_str()).collect()
}
