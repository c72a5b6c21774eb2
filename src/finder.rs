//! Directory-wide searches for subclasses, implementors and trait users.
//!
//! # Search strategy
//!
//! 1. **Normalise the target**: strip a leading `\` and lowercase it.
//! 2. **Enumerate candidates**: every file under the root whose extension
//!    is one of the configured source extensions, in walk order.
//! 3. **Pre-filter**: optionally skip files whose text never mentions the
//!    target's short name.  Any way of referring to a class (relative,
//!    aliased, grouped import, fully qualified) leaves that segment in the
//!    source, so this never drops a match.
//! 4. **Scan**: tokenize, build the import table, extract declarations.
//! 5. **Filter**: keep declarations whose parent, or any interface or
//!    trait, normalises to the target.
//!
//! Results keep enumeration order, then declaration order within a file,
//! whether or not files are scanned in parallel.

use std::path::{Path, PathBuf};

use memchr::memmem;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::Config;
use crate::fs::{FileSystem, FsError, LocalFileSystem};
use crate::imports::ImportTable;
use crate::lexer::tokenize;
use crate::scanner::scan_declarations_with;
use crate::types::{DeclarationRecord, Relation};
use crate::util::{normalize_fqn, short_name};

/// Find every declaration extending `fqcn` under `dir`, with default settings.
pub fn find_by_parent(
    dir: impl AsRef<Path>,
    fqcn: &str,
) -> Result<Vec<DeclarationRecord>, FsError> {
    Finder::default().find(dir.as_ref(), fqcn, Relation::Parent)
}

/// Find every declaration implementing `fqcn` under `dir`, with default settings.
pub fn find_by_interface(
    dir: impl AsRef<Path>,
    fqcn: &str,
) -> Result<Vec<DeclarationRecord>, FsError> {
    Finder::default().find(dir.as_ref(), fqcn, Relation::Interface)
}

/// Find every declaration using the trait `fqcn` under `dir`, with default settings.
pub fn find_by_trait(
    dir: impl AsRef<Path>,
    fqcn: &str,
) -> Result<Vec<DeclarationRecord>, FsError> {
    Finder::default().find(dir.as_ref(), fqcn, Relation::Trait)
}

/// Searches PHP source trees through a [`FileSystem`].
#[derive(Debug, Clone)]
pub struct Finder<F: FileSystem = LocalFileSystem> {
    fs: F,
    config: Config,
}

impl Default for Finder<LocalFileSystem> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Finder<LocalFileSystem> {
    /// A finder over the local disk, walking it as `config` describes.
    pub fn new(config: Config) -> Self {
        Self {
            fs: config.file_system(),
            config,
        }
    }
}

/// The normalised target of one search.
struct Query {
    relation: Relation,
    target: String,
    /// Lowercased short name used by the pre-filter.
    needle: String,
}

impl Query {
    fn new(fqcn: &str, relation: Relation) -> Self {
        let target = normalize_fqn(fqcn);
        let needle = short_name(&target).to_string();
        Self {
            relation,
            target,
            needle,
        }
    }

    fn matches(&self, record: &DeclarationRecord) -> bool {
        self.relation
            .names(record)
            .iter()
            .any(|name| normalize_fqn(name) == self.target)
    }

    fn mentioned_in(&self, text: &str) -> bool {
        let haystack = text.to_ascii_lowercase();
        memmem::find(haystack.as_bytes(), self.needle.as_bytes()).is_some()
    }
}

impl<F: FileSystem> Finder<F> {
    pub fn with_file_system(fs: F, config: Config) -> Self {
        Self { fs, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn find_by_parent(
        &self,
        dir: &Path,
        fqcn: &str,
    ) -> Result<Vec<DeclarationRecord>, FsError> {
        self.find(dir, fqcn, Relation::Parent)
    }

    pub fn find_by_interface(
        &self,
        dir: &Path,
        fqcn: &str,
    ) -> Result<Vec<DeclarationRecord>, FsError> {
        self.find(dir, fqcn, Relation::Interface)
    }

    pub fn find_by_trait(
        &self,
        dir: &Path,
        fqcn: &str,
    ) -> Result<Vec<DeclarationRecord>, FsError> {
        self.find(dir, fqcn, Relation::Trait)
    }

    /// Every declaration under `dir` whose `relation` names include `fqcn`.
    ///
    /// Fails only when the directory cannot be listed, or a file exists
    /// but cannot be read.  Files removed mid-search are skipped.
    pub fn find(
        &self,
        dir: &Path,
        fqcn: &str,
        relation: Relation,
    ) -> Result<Vec<DeclarationRecord>, FsError> {
        let query = Query::new(fqcn, relation);
        let files = self.source_files(dir)?;
        let results = self.scan_files(&files, Some(&query))?;
        info!(
            dir = %dir.display(),
            target = fqcn,
            relation = ?relation,
            files = files.len(),
            matches = results.len(),
            "search finished"
        );
        Ok(results)
    }

    /// Every declaration found under `dir`, unfiltered.
    pub fn scan_directory(&self, dir: &Path) -> Result<Vec<DeclarationRecord>, FsError> {
        let files = self.source_files(dir)?;
        self.scan_files(&files, None)
    }

    /// Every declaration in one file.  A missing file yields no records.
    pub fn scan_file(&self, path: &Path) -> Result<Vec<DeclarationRecord>, FsError> {
        self.scan_one(path, None)
    }

    /// Declarations of `text` as if read from `path`, resolved according
    /// to the configuration.
    pub fn scan_text(&self, text: &str, path: &Path) -> Vec<DeclarationRecord> {
        let tokens = tokenize(text);
        let imports = if self.config.resolve_imports {
            ImportTable::build(&tokens)
        } else {
            ImportTable::default()
        };
        scan_declarations_with(&tokens, &path.to_string_lossy(), &imports)
    }

    fn source_files(&self, dir: &Path) -> Result<Vec<PathBuf>, FsError> {
        let mut files = self.fs.list_files(dir, true)?;
        files.retain(|path| self.config.matches_extension(path));
        debug!(dir = %dir.display(), count = files.len(), "enumerated source files");
        Ok(files)
    }

    fn scan_files(
        &self,
        files: &[PathBuf],
        query: Option<&Query>,
    ) -> Result<Vec<DeclarationRecord>, FsError> {
        let per_file: Vec<Vec<DeclarationRecord>> = if self.config.parallel {
            files
                .par_iter()
                .map(|path| self.scan_one(path, query))
                .collect::<Result<_, _>>()?
        } else {
            files
                .iter()
                .map(|path| self.scan_one(path, query))
                .collect::<Result<_, _>>()?
        };
        Ok(per_file.into_iter().flatten().collect())
    }

    fn scan_one(
        &self,
        path: &Path,
        query: Option<&Query>,
    ) -> Result<Vec<DeclarationRecord>, FsError> {
        let text = match self.fs.read_text(path) {
            Ok(text) => text,
            Err(FsError::FileNotFound { .. }) => {
                debug!(path = %path.display(), "file vanished before it could be read");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let Some(query) = query else {
            return Ok(self.scan_text(&text, path));
        };

        if self.config.prefilter && !query.mentioned_in(&text) {
            return Ok(Vec::new());
        }

        let mut records = self.scan_text(&text, path);
        records.retain(|record| query.matches(record));
        Ok(records)
    }
}
