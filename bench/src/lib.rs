//! Key-Set Benchmark Files
//!
//! Turns generated key sets into the three plain-text inputs of an
//! insert/search/delete benchmark run, and reads them back for checking.
//!
//! # Architecture
//!
//! ```text
//! bench
//! ├── keyfile   # key file format (write, parse, headers)
//! └── main.rs   # keyset-gen CLI
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use keyset_bench::generate_to_files;
//! use keyset_engine::GeneratorConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = GeneratorConfig::default();
//!     let paths = generate_to_files(&config)?;
//!     println!("{}", paths.insert.display());
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use keyset_engine::{generate, GeneratorConfig, KeySets, MembershipSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub mod keyfile;

pub use keyfile::{parse_keys, read_key_file, write_key_file, write_keys};

/// Output locations derived from an output prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFilePaths {
    pub insert: PathBuf,
    pub search: PathBuf,
    pub delete: PathBuf,
}

impl KeyFilePaths {
    pub fn from_prefix(prefix: &str) -> Self {
        Self {
            insert: PathBuf::from(format!("{}_insert.txt", prefix)),
            search: PathBuf::from(format!("{}_search.txt", prefix)),
            delete: PathBuf::from(format!("{}_delete.txt", prefix)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        [&self.insert, &self.search, &self.delete].into_iter()
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(".tmp");
    PathBuf::from(staged)
}

/// Write already generated key sets using the config's output settings.
///
/// Each file is first written next to its target as `<name>.tmp`; targets
/// are only replaced once all three have been written. If a write fails the
/// staged files are removed and no target is touched. A failure while
/// renaming can still leave the earlier targets replaced.
pub fn write_key_sets(config: &GeneratorConfig, sets: &KeySets) -> Result<KeyFilePaths> {
    let paths = KeyFilePaths::from_prefix(&config.output.out_prefix);
    let per_line = config.output.per_line;

    let files = [
        (&paths.insert, keyfile::insert_header(config), &sets.insert),
        (&paths.search, keyfile::search_header(config, sets), &sets.search),
        (&paths.delete, keyfile::delete_header(config, sets), &sets.delete),
    ];

    let mut staged = Vec::with_capacity(files.len());
    for (target, header, keys) in &files {
        let tmp = staging_path(target);
        if let Err(e) = write_key_file(&tmp, header, keys, per_line) {
            for written in staged.iter().chain(std::iter::once(&tmp)) {
                let _ = fs::remove_file(written);
            }
            return Err(e);
        }
        staged.push(tmp);
    }

    for (tmp, (target, _, _)) in staged.iter().zip(&files) {
        fs::rename(tmp, target).with_context(|| {
            format!("Failed to move {} to {}", tmp.display(), target.display())
        })?;
    }

    tracing::info!(
        insert = %paths.insert.display(),
        search = %paths.search.display(),
        delete = %paths.delete.display(),
        per_line,
        "wrote key files"
    );
    Ok(paths)
}

/// Generate all three sequences, then write them. A failed generation or a
/// failed write leaves no files behind.
pub fn generate_to_files(config: &GeneratorConfig) -> Result<KeyFilePaths> {
    let sets = generate(config).context("Key generation failed")?;
    write_key_sets(config, &sets)
}

/// Counts recovered from an existing set of key files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub n_insert: usize,
    pub n_distinct_insert: usize,
    pub n_search: usize,
    pub n_delete: usize,
    /// Search keys present in the insert file
    pub found: usize,
    /// Delete keys present in the insert file
    pub deletable: usize,
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "insert: {} keys ({} distinct)",
            self.n_insert, self.n_distinct_insert
        )?;
        writeln!(f, "search: {} keys, found_count={}", self.n_search, self.found)?;
        write!(
            f,
            "delete: {} keys, {} present in insert",
            self.n_delete, self.deletable
        )
    }
}

/// Read the three files of `prefix` back and count hits against the insert file.
pub fn verify_prefix(prefix: &str) -> Result<VerifyReport> {
    let paths = KeyFilePaths::from_prefix(prefix);
    let insert = read_key_file(&paths.insert)?;
    let search = read_key_file(&paths.search)?;
    let delete = read_key_file(&paths.delete)?;

    let set = MembershipSet::from_keys(&insert);
    Ok(VerifyReport {
        n_insert: insert.len(),
        n_distinct_insert: set.len(),
        n_search: search.len(),
        n_delete: delete.len(),
        found: search.iter().filter(|&&k| set.contains(k)).count(),
        deletable: delete.iter().filter(|&&k| set.contains(k)).count(),
    })
}
