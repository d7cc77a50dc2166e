//! Cache path expansion and validation
//!
//! Turns the user-supplied, newline-delimited path specification into the
//! list of absolute paths that end up in the cache archive. Entries may be
//! literal paths (with `~` and `$VAR` references) or glob patterns; a `*`
//! anywhere in the entry marks it as a pattern.
//!
//! Resolution never fails because of a single bad entry. Every per-entry
//! problem (a pattern with no matches, a malformed pattern, an
//! unresolvable reference, a path that does not exist) is logged at WARN
//! level, recorded as a [`Skipped`] entry on the [`Resolution`], and the
//! entry contributes nothing. Callers must not re-validate the survivors.

mod error;

pub use error::{Error, Result};

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Why a spec entry contributed nothing to the resolved set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A glob pattern matched nothing.
    NoMatches,
    /// A glob pattern could not be compiled.
    InvalidPattern(String),
    /// A `~` or `$VAR` reference could not be expanded.
    Expansion(String),
    /// The candidate path does not exist.
    DoesNotExist,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatches => write!(f, "pattern matched no paths"),
            Self::InvalidPattern(msg) => write!(f, "invalid pattern: {msg}"),
            Self::Expansion(msg) => write!(f, "failed to expand: {msg}"),
            Self::DoesNotExist => write!(f, "path doesn't exist"),
        }
    }
}

/// A spec entry that was dropped during resolution, with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// The raw spec entry as the user wrote it.
    pub entry: String,
    /// Why it was dropped.
    pub reason: SkipReason,
}

/// The outcome of resolving a path specification.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Absolute, existence-verified paths in encounter order.
    ///
    /// Duplicates are preserved; archiving tolerates repeated members.
    pub resolved: Vec<PathBuf>,
    /// Entries that were dropped, in encounter order.
    pub skipped: Vec<Skipped>,
}

impl Resolution {
    /// True when nothing survived resolution.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    fn skip(&mut self, entry: &str, reason: SkipReason) {
        tracing::warn!(entry, %reason, "skipping cache path");
        self.skipped.push(Skipped {
            entry: entry.to_string(),
            reason,
        });
    }
}

/// Resolve a newline-delimited path specification against `working_dir`.
///
/// Entries are processed in input order. Blank lines are ignored. Pattern
/// entries (containing `*`) expand with recursive glob semantics; `**`
/// spans directory separators. Literal entries get `~`/`$VAR` expansion,
/// absolutization against `working_dir`, and lexical normalization.
/// Candidates that do not exist at resolution time are dropped with a
/// warning; existence may still change before archiving, which downstream
/// treats as a benign race.
///
/// # Errors
///
/// Only for conditions outside per-entry recovery, currently a
/// `working_dir` that is not absolute.
pub fn resolve(spec: &str, working_dir: &Path) -> Result<Resolution> {
    if !working_dir.is_absolute() {
        return Err(Error::working_dir(format!(
            "'{}' is not absolute",
            working_dir.display()
        )));
    }

    let mut resolution = Resolution::default();

    for entry in spec.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let expanded = match shellexpand::full(entry) {
            Ok(expanded) => expanded.into_owned(),
            Err(err) => {
                resolution.skip(entry, SkipReason::Expansion(err.to_string()));
                continue;
            }
        };

        if expanded.contains('*') {
            expand_pattern(&expanded, entry, working_dir, &mut resolution);
        } else {
            resolve_literal(&expanded, entry, working_dir, &mut resolution);
        }
    }

    Ok(resolution)
}

/// Expand one glob pattern entry into the resolution.
fn expand_pattern(pattern: &str, entry: &str, working_dir: &Path, resolution: &mut Resolution) {
    let absolute = absolutize(Path::new(pattern), working_dir);
    let pattern = absolute.to_string_lossy();

    let matches = match glob::glob(&pattern) {
        Ok(matches) => matches,
        Err(err) => {
            resolution.skip(entry, SkipReason::InvalidPattern(err.to_string()));
            return;
        }
    };

    let mut matched_any = false;
    for candidate in matches {
        match candidate {
            Ok(path) => {
                matched_any = true;
                resolution.resolved.push(path);
            }
            Err(err) => {
                // An unreadable directory along the walk; the rest of the
                // pattern's matches are still usable.
                tracing::warn!(entry, error = %err, "pattern match not readable");
            }
        }
    }

    if !matched_any {
        resolution.skip(entry, SkipReason::NoMatches);
    }
}

/// Resolve one literal path entry into the resolution.
fn resolve_literal(path: &str, entry: &str, working_dir: &Path, resolution: &mut Resolution) {
    let absolute = absolutize(Path::new(path), working_dir);
    if absolute.exists() {
        resolution.resolved.push(absolute);
    } else {
        resolution.skip(entry, SkipReason::DoesNotExist);
    }
}

/// Make `path` absolute relative to `working_dir` and fold `.`/`..`
/// components lexically. Symlinks are deliberately not resolved so the
/// archived member names match what the user wrote.
fn absolutize(path: &Path, working_dir: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` above the root folds away; the root cannot be popped.
                if !normalized.pop() && !joined.has_root() {
                    normalized.push(Component::ParentDir);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
