use thiserror::Error;

mod locate;
mod recover;
mod segment;
mod spellings;

pub use locate::{locate, Located};
pub use recover::{recover, RecoveredCall};
pub use segment::{segment_args, segment_tokens};
pub use spellings::discover;

/// The function/macro names a call-site lookup searches for.
///
/// `names` are all the public entry points callers may have invoked;
/// spelling discovery expands them through the file's `use` aliases.
#[derive(Debug, Clone, Copy)]
pub struct CallTarget {
    pub crate_name: &'static str,
    pub names: &'static [&'static str],
}

/// One resolved call expression.
///
/// `args` holds the literal argument-expression strings in call order.
/// It is either as long as the number of values passed at the call, or
/// empty when the call text could not be resolved; it is never a guess.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    pub file: String,
    pub start_line: usize,
    pub stop_line: usize,
    pub call: String,
    pub args: Vec<String>,
}

impl CallSite {
    pub fn unknown() -> Self {
        Self {
            file: "<unknown>".to_string(),
            start_line: 0,
            stop_line: 0,
            call: String::new(),
            args: Vec::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.file == "<unknown>"
    }

    /// `file:line` form for output suffixes.
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.start_line)
    }
}

impl std::fmt::Display for CallSite {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.start_line)
    }
}

#[derive(Debug, Error)]
pub enum CallSiteError {
    #[error("Source unavailable for {file}: {reason}")]
    SourceUnavailable { file: String, reason: String },
}

/// Resolve the call site for a caller location.
///
/// Every failure mode short of a bug degrades: unreadable source gives
/// the unknown sentinel, an unresolvable call text gives an empty
/// argument list. This function never returns an error.
pub fn resolve(file: &str, line: usize, target: &CallTarget) -> CallSite {
    let located = match locate::locate(file) {
        Ok(located) => located,
        Err(err) => {
            log::debug!("call-site lookup degraded: {err}");
            return CallSite::unknown();
        }
    };

    let spellings = spellings::discover(&located.source, target);
    log::trace!("call spellings in {}: {:?}", file, spellings);

    let file_display = located.path.to_string_lossy().into_owned();
    match recover::recover(&located.source, line, &spellings) {
        Some(found) => CallSite {
            file: file_display,
            start_line: found.start_line,
            stop_line: found.stop_line,
            call: found.call,
            args: found.args,
        },
        None => CallSite {
            file: file_display,
            start_line: line,
            stop_line: line,
            call: String::new(),
            args: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sentinel() {
        let site = CallSite::unknown();
        assert!(site.is_unknown());
        assert!(site.args.is_empty());
    }

    #[test]
    fn test_resolve_missing_file_degrades() {
        let target = CallTarget {
            crate_name: "scry_inspect",
            names: &["scry"],
        };
        let site = resolve("/no/such/path/lib.rs", 3, &target);
        assert!(site.is_unknown());
    }

    #[test]
    fn test_location_format() {
        let site = CallSite {
            file: "/tmp/demo.rs".to_string(),
            start_line: 14,
            stop_line: 14,
            call: "scry!(x)".to_string(),
            args: vec!["x".to_string()],
        };
        assert_eq!(site.location(), "/tmp/demo.rs:14");
    }
}
