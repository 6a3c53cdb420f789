//! Best-effort path resolution with home and environment expansion.

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Resolve `path` to an absolute path, optionally relative to `base_dir`.
///
/// Both arguments have `~` and `$VAR`/`${VAR}` references expanded first.
/// When `base_dir` is non-empty and `base_dir/path` exists, that candidate
/// wins. Otherwise the expanded `path` is absolutized against the current
/// working directory and returned even when nothing exists there; existence
/// is the caller's concern.
pub fn resolve_path(path: &str, base_dir: &str) -> PathBuf {
    let expanded = expand(path);
    if !base_dir.is_empty() {
        let base = expand(base_dir);
        let candidate = absolutize(&base.join(&expanded));
        if candidate.exists() {
            debug!(candidate = %candidate.display(), "resolved via base_dir");
            return candidate;
        }
    }
    let resolved = absolutize(&expanded);
    if !resolved.exists() {
        debug!(
            original = path,
            resolved = %resolved.display(),
            base_dir,
            "resolved path does not exist"
        );
    }
    resolved
}

/// Expand a leading `~` and any `$VAR`/`${VAR}` references.
///
/// Unknown variables are left verbatim, matching shell-less expansion
/// semantics where resolution must never fail.
pub fn expand(path: &str) -> PathBuf {
    let with_vars = expand_env_vars(path);
    if let Some(rest) = with_vars
        .strip_prefix("~/")
        .or_else(|| with_vars.strip_prefix("~\\"))
    {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if with_vars == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(with_vars)
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('{') => {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    name.push(inner);
                }
                match env::var(&name) {
                    Ok(value) if closed => out.push_str(&value),
                    _ => {
                        out.push('$');
                        out.push('{');
                        out.push_str(&name);
                        if closed {
                            out.push('}');
                        }
                    }
                }
            }
            Some(next) if next.is_ascii_alphanumeric() || *next == '_' => {
                let mut name = String::new();
                while let Some(next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || *next == '_' {
                        name.push(*next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match env::var(&name) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => {
                        out.push('$');
                        out.push_str(&name);
                    }
                }
            }
            _ => out.push('$'),
        }
    }
    out
}
