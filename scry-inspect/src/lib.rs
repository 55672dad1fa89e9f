//! Call-site-aware value inspection.
//!
//! `scry!(a, b)` renders each value through the classifier/renderer
//! stack and labels it with the literal argument expression recovered
//! from the calling source file, then writes the block plus a
//! `(file:line)` suffix to the configured sink. `scry_str!` returns the
//! same text instead of writing it.
//!
//! Every failure mode except the zero-value usage error degrades to a
//! best-effort rendering; the one job of a debugging aid is to never
//! crash the program it is inspecting.

use std::panic::Location;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use thiserror::Error;

mod sink;

pub use scry_callsite::{CallSite, CallTarget};
pub use scry_render::{RenderConfig, Renderer};
pub use scry_value::{
    CallableValue, ErrorValue, Inspect, IterValue, ObjectValue, ProbeError, SeqKind, ToValue,
    Value,
};
pub use sink::{FileSink, Sink, StderrSink, VecSink};

/// Entry points a call-site lookup searches for.
pub const TARGET: CallTarget = CallTarget {
    crate_name: "scry_inspect",
    names: &[
        "scry",
        "scry_str",
        "inspect",
        "try_inspect",
        "try_inspect_to",
        "inspect_str",
        "try_inspect_str",
        "try_inspect_str_with",
    ],
};

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("at least one value is required")]
    NoValues,
    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),
}

static DEFAULTS: Lazy<RwLock<RenderConfig>> = Lazy::new(|| RwLock::new(RenderConfig::default()));

/// Replace the process-wide default configuration.
pub fn set_defaults(config: RenderConfig) {
    if let Ok(mut guard) = DEFAULTS.write() {
        *guard = config;
    }
}

/// Snapshot of the process-wide default configuration. Taken once per
/// entry-point call; a render never observes a mid-flight change.
pub fn defaults() -> RenderConfig {
    DEFAULTS
        .read()
        .map(|guard| guard.clone())
        .unwrap_or_default()
}

/// Inspect values with at least one value required; panics otherwise.
///
/// This is the macro's landing point. Zero values cannot come from the
/// macro (that is a compile error); a direct zero-value call is a
/// usage error and fails loudly. Sink failures are logged, not raised.
#[track_caller]
pub fn inspect(values: &[Value]) {
    match try_inspect(values) {
        Ok(()) => {}
        Err(InspectError::NoValues) => panic!("scry: at least one value is required"),
        Err(err) => log::error!("scry: {err}"),
    }
}

#[track_caller]
pub fn try_inspect(values: &[Value]) -> Result<(), InspectError> {
    let config = defaults();
    try_inspect_to(values, &config, &mut StderrSink)
}

/// Inspect into an explicit sink with an explicit configuration.
#[track_caller]
pub fn try_inspect_to(
    values: &[Value],
    config: &RenderConfig,
    sink: &mut dyn Sink,
) -> Result<(), InspectError> {
    let location = Location::caller();
    for line in lines_for(location, values, config)? {
        sink.write_line(&line)?;
    }
    Ok(())
}

/// Like [`inspect`] but returns the composed text. Byte-identical to
/// what the write path emits.
#[track_caller]
pub fn inspect_str(values: &[Value]) -> String {
    match try_inspect_str(values) {
        Ok(text) => text,
        Err(InspectError::NoValues) => panic!("scry: at least one value is required"),
        Err(err) => {
            log::error!("scry: {err}");
            String::new()
        }
    }
}

#[track_caller]
pub fn try_inspect_str(values: &[Value]) -> Result<String, InspectError> {
    let config = defaults();
    try_inspect_str_with(values, &config)
}

#[track_caller]
pub fn try_inspect_str_with(
    values: &[Value],
    config: &RenderConfig,
) -> Result<String, InspectError> {
    let location = Location::caller();
    let mut out = String::new();
    for line in lines_for(location, values, config)? {
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

fn lines_for(
    location: &Location,
    values: &[Value],
    config: &RenderConfig,
) -> Result<Vec<String>, InspectError> {
    if values.is_empty() {
        return Err(InspectError::NoValues);
    }
    let site = scry_callsite::resolve(location.file(), location.line() as usize, &TARGET);
    Ok(compose(&site, values, config))
}

/// Compose the output lines for a resolved call site. Each value gets
/// its own fresh seen registry; continuation lines of a multi-line
/// rendering indent under their label.
pub fn compose(site: &CallSite, values: &[Value], config: &RenderConfig) -> Vec<String> {
    let renderer = Renderer::new(config);
    let labels = labels_for(site, values.len());
    let mut lines = Vec::new();
    for (value, label) in values.iter().zip(labels) {
        let rendered = renderer.render(value);
        let mut rendered_lines = rendered.lines();
        let first = rendered_lines.next().unwrap_or("");
        match label {
            Some(name) => lines.push(format!("{} = {}", name, first)),
            None => lines.push(first.to_string()),
        }
        for line in rendered_lines {
            lines.push(format!("{}{}", config.indent, line));
        }
    }
    if !site.is_unknown() {
        lines.push(format!("({})", site.location()));
    }
    lines
}

/// Labels for each printed value. A literal-string argument has no
/// name worth displaying; an unresolved call yields no names at all
/// and every value gets a synthesized placeholder.
fn labels_for(site: &CallSite, count: usize) -> Vec<Option<String>> {
    if site.args.len() == count {
        site.args
            .iter()
            .map(|arg| {
                if arg.is_empty() {
                    None
                } else {
                    Some(arg.clone())
                }
            })
            .collect()
    } else {
        (1..=count).map(|i| Some(format!("Unknown {}", i))).collect()
    }
}

/// A reusable inspector carrying its own configuration and sink.
pub struct Inspector {
    config: RenderConfig,
    sink: Box<dyn Sink>,
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            config: defaults(),
            sink: Box::new(StderrSink),
        }
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    #[track_caller]
    pub fn inspect(&mut self, values: &[Value]) -> Result<(), InspectError> {
        let location = Location::caller();
        for line in lines_for(location, values, &self.config)? {
            self.sink.write_line(&line)?;
        }
        Ok(())
    }

    #[track_caller]
    pub fn format(&self, values: &[Value]) -> Result<String, InspectError> {
        try_inspect_str_with(values, &self.config)
    }
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

/// Inspect one or more values, writing to the default sink.
///
/// Zero arguments is a compile error.
#[macro_export]
macro_rules! scry {
    () => {
        ::core::compile_error!("scry! requires at least one value")
    };
    ($($value:expr),+ $(,)?) => {
        $crate::inspect(&[$($crate::ToValue::to_value(&$value)),+])
    };
}

/// Inspect one or more values, returning the composed text.
#[macro_export]
macro_rules! scry_str {
    () => {
        ::core::compile_error!("scry_str! requires at least one value")
    };
    ($($value:expr),+ $(,)?) => {
        $crate::inspect_str(&[$($crate::ToValue::to_value(&$value)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site_with(args: &[&str], file: &str) -> CallSite {
        CallSite {
            file: file.to_string(),
            start_line: 3,
            stop_line: 3,
            call: String::new(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_compose_labels_values() {
        let site = site_with(&["x", "y"], "/tmp/demo.rs");
        let values = [Value::Int(1), Value::Str("two".to_string())];
        let lines = compose(&site, &values, &RenderConfig::default());
        assert_eq!(lines, ["x = 1", "y = 'two'", "(/tmp/demo.rs:3)"]);
    }

    #[test]
    fn test_compose_literal_string_argument_prints_bare() {
        let site = site_with(&["n", ""], "/tmp/demo.rs");
        let values = [Value::Int(1), Value::Str("hello".to_string())];
        let lines = compose(&site, &values, &RenderConfig::default());
        assert_eq!(lines, ["n = 1", "'hello'", "(/tmp/demo.rs:3)"]);
    }

    #[test]
    fn test_compose_unresolved_names_become_placeholders() {
        let site = site_with(&[], "/tmp/demo.rs");
        let values = [Value::Int(1), Value::Int(2)];
        let lines = compose(&site, &values, &RenderConfig::default());
        assert_eq!(lines, ["Unknown 1 = 1", "Unknown 2 = 2", "(/tmp/demo.rs:3)"]);
    }

    #[test]
    fn test_compose_unknown_site_has_no_location_suffix() {
        let site = CallSite::unknown();
        let values = [Value::Int(5)];
        let lines = compose(&site, &values, &RenderConfig::default());
        assert_eq!(lines, ["Unknown 1 = 5"]);
    }

    #[test]
    fn test_compose_multiline_value_indents_continuation() {
        let site = site_with(&["xs"], "/tmp/demo.rs");
        let values = [Value::Seq(SeqKind::List, vec![Value::Int(1)])];
        let lines = compose(&site, &values, &RenderConfig::default());
        assert_eq!(
            lines,
            [
                "xs = list (1)",
                "    [",
                "        0: 1,",
                "    ]",
                "(/tmp/demo.rs:3)"
            ]
        );
    }

    #[test]
    fn test_zero_values_is_the_one_loud_error() {
        assert!(matches!(try_inspect(&[]), Err(InspectError::NoValues)));
        assert!(matches!(try_inspect_str(&[]), Err(InspectError::NoValues)));
    }

    #[test]
    fn test_defaults_snapshot_roundtrip() {
        let before = defaults();
        assert_eq!(before.max_depth, RenderConfig::default().max_depth);
    }
}
