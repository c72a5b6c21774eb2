//! Static PHP class finder.
//!
//! Discovers class, interface, trait and enum declarations in PHP source
//! trees and their inheritance relationships (`extends`, `implements`,
//! trait `use`) by tokenizing files, without executing or loading any PHP.
//!
//! Modules:
//! - [`lexer`] / [`token`]: PHP tokenizer and the token model it produces
//! - [`imports`]: per-file `use` import table
//! - [`resolve`]: qualified-name resolution against namespace and imports
//! - [`scanner`]: the declaration-extracting token walk
//! - [`finder`]: directory-wide searches by parent, interface or trait
//! - [`fs`]: the filesystem boundary and its error model
//! - [`config`]: TOML configuration

pub mod config;
mod cursor;
pub mod finder;
pub mod fs;
pub mod imports;
pub mod lexer;
pub mod resolve;
pub mod scanner;
pub mod token;
pub mod types;
pub mod util;

pub use config::Config;
pub use finder::{Finder, find_by_interface, find_by_parent, find_by_trait};
pub use fs::{FileSystem, FsError, LocalFileSystem};
pub use imports::ImportTable;
pub use scanner::{scan_declarations, scan_declarations_with, scan_source};
pub use types::{DeclarationKind, DeclarationRecord, Relation};
