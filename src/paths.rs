//! Path expansion for storage locations and key/identity files.
//!
//! Supported forms:
//! - `~` / `~/sub`: the user's home directory
//! - `$VAR` / `$VAR/sub`: the value of an environment variable
//! - absolute paths: used as-is
//! - anything else: relative to the current working directory
//!
//! Expanded paths must not traverse upwards (`..`) and must not point
//! into system directories.

use std::path::{Component, Path, PathBuf};

use crate::errors::{Result, VaultError};

/// System directories that vault data and key files may never live in.
const DISALLOWED_PREFIXES: &[&str] = &[
    "/etc", "/proc", "/sys", "/dev", "/boot", "/bin", "/sbin", "/usr/bin", "/usr/sbin",
];

/// Expand `raw` into an absolute path and check that it is safe to use.
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(not_secure(raw, "path is empty"));
    }

    let expanded = if raw == "~" || raw.starts_with("~/") {
        let home = dirs::home_dir().ok_or_else(|| not_secure(raw, "home directory is unknown"))?;
        join_rest(home, &raw[1..])
    } else if let Some(stripped) = raw.strip_prefix('$') {
        let (var, rest) = match stripped.find('/') {
            Some(idx) => stripped.split_at(idx),
            None => (stripped, ""),
        };
        let value = std::env::var(var)
            .map_err(|_| not_secure(raw, &format!("environment variable {var} is not set")))?;
        let base = PathBuf::from(value);
        let base = if base.is_absolute() {
            base
        } else {
            std::env::current_dir()?.join(base)
        };
        join_rest(base, rest)
    } else {
        let path = PathBuf::from(raw);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir()?.join(path)
        }
    };

    check_secure(raw, &expanded)?;
    Ok(normalize(&expanded))
}

fn join_rest(base: PathBuf, rest: &str) -> PathBuf {
    let rest = rest.trim_start_matches('/');
    if rest.is_empty() {
        base
    } else {
        base.join(rest)
    }
}

fn check_secure(raw: &str, path: &Path) -> Result<()> {
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(not_secure(raw, "path traversal is not allowed"));
    }

    let normalized = normalize(path);
    for prefix in DISALLOWED_PREFIXES {
        if normalized.starts_with(prefix) {
            return Err(not_secure(
                raw,
                &format!("access to {prefix} is not allowed"),
            ));
        }
    }
    Ok(())
}

/// Drop `.` components; `..` is already rejected by `check_secure`.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn not_secure(raw: &str, reason: &str) -> VaultError {
    VaultError::PathNotSecure {
        path: raw.to_string(),
        reason: reason.to_string(),
    }
}
