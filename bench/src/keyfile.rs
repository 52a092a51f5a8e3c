//! Plain-text key files.
//!
//! A key file is an optional block of `# ` comment lines followed by decimal
//! integers separated by single spaces, `per_line` values per line. The
//! benchmark harness reads these with `fscanf`-style parsing, so the format
//! stays deliberately simple.

use anyhow::{bail, Context, Result};
use keyset_engine::{GeneratorConfig, Key, KeySets};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header of the insert file
pub fn insert_header(config: &GeneratorConfig) -> Vec<String> {
    let mut lines = vec!["INSERT keys".to_string()];
    lines.extend(common_header(config));
    lines.push(format!("n_insert={}", config.n_insert));
    lines.push(format!(
        "insert_dist={}, mean={:?}, std={:?}, lambd={:?}, alpha={:?}, centers={}, swap_frac={:?}",
        config.insert_dist,
        config.mean,
        config.std,
        config.lambd,
        config.alpha,
        config.centers_csv(),
        config.swap_frac
    ));
    lines
}

/// Header of the search file
pub fn search_header(config: &GeneratorConfig, sets: &KeySets) -> Vec<String> {
    let mut lines = vec!["SEARCH keys".to_string()];
    lines.extend(common_header(config));
    lines.push(format!("n_search={}", config.n_search));
    lines.push(format!(
        "hit_ratio={:?} (expected_hits~{})",
        config.hit_ratio, sets.expected_hits
    ));
    lines.push(format!("miss_dist={}", config.search_miss_dist));
    lines
}

/// Header of the delete file. `n_delete` is the realized length.
pub fn delete_header(config: &GeneratorConfig, sets: &KeySets) -> Vec<String> {
    let mut lines = vec!["DELETE keys".to_string()];
    lines.extend(common_header(config));
    lines.push(format!("n_delete={}", sets.delete.len()));
    lines.push(format!("delete_mode={}", config.delete_mode));
    lines
}

fn common_header(config: &GeneratorConfig) -> [String; 2] {
    [
        format!("seed={}", config.seed),
        format!("key_range=[{},{}]", config.key_min, config.key_max),
    ]
}

/// Write `header` as comment lines, then `keys` wrapped at `per_line`.
pub fn write_keys<W: Write>(
    out: &mut W,
    header: &[String],
    keys: &[Key],
    per_line: usize,
) -> Result<()> {
    if per_line == 0 {
        bail!("per_line must be > 0");
    }
    for line in header {
        for part in line.lines() {
            writeln!(out, "# {}", part.trim_end())?;
        }
    }
    for chunk in keys.chunks(per_line) {
        let mut first = true;
        for key in chunk {
            if !first {
                out.write_all(b" ")?;
            }
            write!(out, "{}", key)?;
            first = false;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Create (or truncate) `path` and write a key file into it.
pub fn write_key_file(
    path: &Path,
    header: &[String],
    keys: &[Key],
    per_line: usize,
) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create key file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_keys(&mut out, header, keys, per_line)
        .with_context(|| format!("Failed to write key file {}", path.display()))?;
    out.flush()
        .with_context(|| format!("Failed to flush key file {}", path.display()))?;
    Ok(())
}

/// Parse key file text. Comment lines (first non-blank char `#`) and blank
/// lines are skipped.
pub fn parse_keys(text: &str) -> Result<Vec<Key>> {
    let mut keys = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        for token in trimmed.split_whitespace() {
            let key = token
                .parse::<Key>()
                .with_context(|| format!("line {}: invalid key '{}'", idx + 1, token))?;
            keys.push(key);
        }
    }
    Ok(keys)
}

pub fn read_key_file(path: &Path) -> Result<Vec<Key>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read key file {}", path.display()))?;
    parse_keys(&text).with_context(|| format!("Malformed key file {}", path.display()))
}
