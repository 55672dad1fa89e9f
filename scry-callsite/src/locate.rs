//! Source file lookup for caller locations.
//!
//! Compiled-in paths may be absolute, relative to the build workspace,
//! or stale; the probe tries the path as given and then against each
//! ancestor of the current directory before giving up.

use std::fs;
use std::path::{Path, PathBuf};

use crate::CallSiteError;

/// A located source file: canonical path plus its full contents,
/// read eagerly in one shot.
#[derive(Debug, Clone)]
pub struct Located {
    pub path: PathBuf,
    pub source: String,
}

pub fn locate(file: &str) -> Result<Located, CallSiteError> {
    let mut last_error = String::from("not found");
    for candidate in candidate_paths(file) {
        match fs::read_to_string(&candidate) {
            Ok(source) => {
                let path = candidate.canonicalize().unwrap_or(candidate);
                return Ok(Located { path, source });
            }
            Err(err) => last_error = err.to_string(),
        }
    }
    Err(CallSiteError::SourceUnavailable {
        file: file.to_string(),
        reason: last_error,
    })
}

fn candidate_paths(file: &str) -> Vec<PathBuf> {
    let given = PathBuf::from(file);
    let mut out = vec![given.clone()];
    if given.is_relative() {
        if let Ok(cwd) = std::env::current_dir() {
            let mut dir: Option<&Path> = cwd.parent();
            while let Some(d) = dir {
                out.push(d.join(&given));
                dir = d.parent();
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reports_unavailable() {
        let err = locate("definitely/not/here.rs").unwrap_err();
        assert!(matches!(err, CallSiteError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_absolute_path_reads_and_canonicalizes() {
        let dir = std::env::temp_dir().join("scry-locate-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sample.rs");
        fs::write(&path, "fn main() {}\n").unwrap();

        let located = locate(&path.to_string_lossy()).unwrap();
        assert_eq!(located.source, "fn main() {}\n");
        assert!(located.path.is_absolute());

        fs::remove_file(&path).ok();
    }
}
