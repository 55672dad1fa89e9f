//! Recursive value rendering.
//!
//! Every value renders either as a single line or as
//! `prefix` / `open` / indented body rows / `close`. Depth limits and
//! the per-call seen registry decide when a nested value collapses to
//! its one-line summary instead of a full body.

use std::collections::HashMap;
use std::rc::Rc;

use colored::Colorize;
use scry_value::{Inspect, SeqKind, Value};

use crate::classify::{classify, rule_for, Category};
use crate::config::RenderConfig;

/// Identity to occurrence-count bookkeeping for one top-level render.
/// Shared by reference down the whole recursive descent and never
/// across independent top-level calls.
#[derive(Debug, Default)]
pub struct Seen {
    counts: HashMap<usize, u32>,
}

impl Seen {
    /// Record a visit; returns the updated count. Counts only grow.
    pub fn visit(&mut self, identity: usize) -> u32 {
        let count = self.counts.entry(identity).or_insert(0);
        *count += 1;
        *count
    }
}

pub struct Renderer<'a> {
    cfg: &'a RenderConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(cfg: &'a RenderConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &RenderConfig {
        self.cfg
    }

    /// Render a value with a fresh seen registry.
    pub fn render(&self, value: &Value) -> String {
        let mut seen = Seen::default();
        self.render_at(value, 0, &mut seen)
    }

    /// Render a nested value. Repeated identities and expansion past
    /// the depth limit both collapse to a one-line summary.
    pub fn render_at(&self, value: &Value, depth: usize, seen: &mut Seen) -> String {
        let rule = rule_for(value);
        if let Some(identity) = value.identity() {
            if seen.visit(identity) > 1 {
                return self.collapsed(value, rule.category, true);
            }
        }
        if rule.category.is_expandable() && depth >= self.cfg.max_depth {
            return self.collapsed(value, rule.category, false);
        }
        (rule.render)(self, value, depth, seen)
    }

    /// One-line summary used for depth-collapsed values and repeated
    /// references.
    pub fn collapsed(&self, value: &Value, category: Category, repeat: bool) -> String {
        let prefix = self
            .prefix_of(value, category)
            .unwrap_or_else(|| category.label().to_string());
        let glyphs = match category {
            Category::List | Category::Iter => "[...]",
            Category::Tuple => "(...)",
            _ => "{...}",
        };
        let mut out = format!("{} {}", self.paint_prefix(&prefix), glyphs);
        if repeat {
            out.push_str(" (ref)");
        }
        out
    }

    fn prefix_of(&self, value: &Value, category: Category) -> Option<String> {
        match (category, value) {
            (Category::Error, Value::Object(obj)) => obj
                .error_info()
                .map(|info| format!("{} (error)", info.kind)),
            (Category::Map, Value::Map(entries)) => Some(format!("map ({})", entries.len())),
            (Category::Map, Value::Object(obj)) => Some(format!("{} (map)", obj.type_name())),
            (Category::List | Category::Tuple | Category::Set, Value::Seq(kind, items)) => {
                Some(format!("{} ({})", kind.label(), items.len()))
            }
            (Category::List, Value::Object(obj)) => Some(format!("{} (seq)", obj.type_name())),
            (Category::Iter, Value::Iter(iter)) => Some(match iter.total {
                Some(total) => format!("iterator ({})", total),
                None => "iterator".to_string(),
            }),
            (Category::Object, Value::Object(obj)) => Some(self.object_prefix(obj)),
            _ => None,
        }
    }

    fn object_prefix(&self, obj: &Rc<dyn Inspect>) -> String {
        let mut prefix = format!("{} (instance)", obj.type_name());
        if self.cfg.show_identity {
            let identity = Rc::as_ptr(obj) as *const () as usize;
            prefix.push_str(&format!(" @0x{:x}", identity));
        }
        prefix
    }

    /// Wrap body rows between delimiters under a prefix line. Rows may
    /// span multiple lines; every line gains one indent unit.
    fn wrap(&self, prefix: &str, open: char, rows: Vec<String>, close: char) -> String {
        let mut out = self.paint_prefix(prefix);
        out.push('\n');
        out.push(open);
        out.push('\n');
        for row in rows {
            for line in row.lines() {
                out.push_str(&self.cfg.indent);
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push(close);
        out
    }

    /// Hook output replaces the body wholesale but keeps the prefix.
    fn attach_body(&self, prefix: &str, body: &str) -> String {
        let mut out = self.paint_prefix(prefix);
        for line in body.lines() {
            out.push('\n');
            out.push_str(&self.cfg.indent);
            out.push_str(line);
        }
        out
    }

    fn truncation_row(&self, remaining: usize, total: usize) -> String {
        self.paint_marker(&format!("... truncated {}/{} ...", remaining, total))
    }

    /// Quote a string, escaping control characters and truncating past
    /// the configured display length.
    pub fn quoted(&self, text: &str) -> String {
        let q = self.cfg.key_quote;
        let total = text.chars().count();
        let limit = self.cfg.max_string;
        let mut shown = String::new();
        for ch in text.chars().take(limit) {
            match ch {
                '\n' => shown.push_str("\\n"),
                '\r' => shown.push_str("\\r"),
                '\t' => shown.push_str("\\t"),
                '\\' => shown.push_str("\\\\"),
                c if c == q => {
                    shown.push('\\');
                    shown.push(c);
                }
                c => shown.push(c),
            }
        }
        let mut out = format!("{q}{shown}{q}");
        if total > limit {
            out.push(' ');
            out.push_str(&self.paint_marker(&format!(
                "... truncated {}/{} chars ...",
                total - limit,
                total
            )));
        }
        out
    }

    /// Single-line rendering for mapping keys: strings stay quoted,
    /// scalars render plainly, anything expandable collapses.
    fn render_key(&self, key: &Value) -> String {
        match key {
            Value::Str(text) => self.quoted(text),
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) => scalar_text(key),
            other => {
                let category = classify(other);
                if category.is_expandable() {
                    self.collapsed(other, category, false)
                } else {
                    let rule = rule_for(other);
                    (rule.render)(self, other, 0, &mut Seen::default())
                }
            }
        }
    }

    fn paint_prefix(&self, text: &str) -> String {
        if self.cfg.color {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_marker(&self, text: &str) -> String {
        if self.cfg.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => format_float(*f),
        _ => format!("{:?}", value),
    }
}

/// Floats keep their full shortest-roundtrip precision; whole values
/// keep a trailing `.0` so they stay visibly floats.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

pub(crate) fn render_scalar(
    _r: &Renderer,
    value: &Value,
    _depth: usize,
    _seen: &mut Seen,
) -> String {
    scalar_text(value)
}

pub(crate) fn render_str(r: &Renderer, value: &Value, _depth: usize, _seen: &mut Seen) -> String {
    match value {
        Value::Str(text) => r.quoted(text),
        _ => fallback_debug(value),
    }
}

pub(crate) fn render_bytes(r: &Renderer, value: &Value, _depth: usize, _seen: &mut Seen) -> String {
    match value {
        // invalid sequences decode to replacement characters
        Value::Bytes(bytes) => format!("b{}", r.quoted(&String::from_utf8_lossy(bytes))),
        _ => fallback_debug(value),
    }
}

pub(crate) fn render_datetime(
    _r: &Renderer,
    value: &Value,
    _depth: usize,
    _seen: &mut Seen,
) -> String {
    match value {
        Value::DateTime(dt) => format!("<datetime {}>", dt),
        _ => fallback_debug(value),
    }
}

pub(crate) fn render_path(_r: &Renderer, value: &Value, _depth: usize, _seen: &mut Seen) -> String {
    match value {
        Value::Path(path) => format!("<path {}>", path.display()),
        _ => fallback_debug(value),
    }
}

pub(crate) fn render_pattern(
    r: &Renderer,
    value: &Value,
    _depth: usize,
    _seen: &mut Seen,
) -> String {
    match value {
        Value::Pattern(pattern) => format!("<regex {}>", r.quoted(&pattern.source)),
        _ => fallback_debug(value),
    }
}

pub(crate) fn render_match(r: &Renderer, value: &Value, _depth: usize, _seen: &mut Seen) -> String {
    match value {
        Value::Match(found) => {
            let mut out = format!(
                "<match {} ({}..{})",
                r.quoted(&found.text),
                found.start,
                found.end
            );
            if found.groups > 0 {
                out.push_str(&format!(" groups={}", found.groups));
            }
            out.push('>');
            out
        }
        _ => fallback_debug(value),
    }
}

pub(crate) fn render_callable(
    _r: &Renderer,
    value: &Value,
    _depth: usize,
    _seen: &mut Seen,
) -> String {
    match value {
        Value::Callable(callable) => {
            let signature = callable.signature.as_deref().unwrap_or("(...)");
            format!(
                "<{} {}{}>",
                callable.kind.label(),
                callable.name,
                signature
            )
        }
        _ => fallback_debug(value),
    }
}

pub(crate) fn render_seq(r: &Renderer, value: &Value, depth: usize, seen: &mut Seen) -> String {
    let (kind, items, prefix): (SeqKind, std::borrow::Cow<'_, [Value]>, String) = match value {
        Value::Seq(kind, items) => (
            *kind,
            std::borrow::Cow::Borrowed(items.as_slice()),
            format!("{} ({})", kind.label(), items.len()),
        ),
        Value::Object(obj) => match obj.items() {
            Some(Ok(items)) => {
                let prefix = format!("{} (seq, {})", obj.type_name(), items.len());
                (SeqKind::List, std::borrow::Cow::Owned(items), prefix)
            }
            Some(Err(err)) => {
                log::debug!("sequence probe failed on {}: {}", obj.type_name(), err);
                return render_object(r, value, depth, seen);
            }
            None => return render_object(r, value, depth, seen),
        },
        _ => return fallback_debug(value),
    };

    if items.is_empty() && r.config().simple_empty {
        return match kind {
            SeqKind::List => "[]".to_string(),
            SeqKind::Tuple => "()".to_string(),
            SeqKind::Set => "set()".to_string(),
        };
    }

    let limit = r.config().max_items;
    let mut rows = Vec::new();
    for (index, item) in items.iter().take(limit).enumerate() {
        let child = r.render_at(item, depth + 1, seen);
        rows.push(match kind {
            SeqKind::Set => format!("{},", child),
            _ => format!("{}: {},", index, child),
        });
    }
    if items.len() > limit {
        rows.push(r.truncation_row(items.len() - limit, items.len()));
    }
    r.wrap(&prefix, kind.open_char(), rows, kind.close_char())
}

pub(crate) fn render_map(r: &Renderer, value: &Value, depth: usize, seen: &mut Seen) -> String {
    let (entries, prefix): (std::borrow::Cow<'_, [(Value, Value)]>, String) = match value {
        Value::Map(entries) => (
            std::borrow::Cow::Borrowed(entries.as_slice()),
            format!("map ({})", entries.len()),
        ),
        Value::Object(obj) => match obj.entries() {
            Some(Ok(entries)) => {
                let prefix = format!("{} (map, {})", obj.type_name(), entries.len());
                (std::borrow::Cow::Owned(entries), prefix)
            }
            Some(Err(err)) => {
                log::debug!("mapping probe failed on {}: {}", obj.type_name(), err);
                return render_object(r, value, depth, seen);
            }
            None => return render_object(r, value, depth, seen),
        },
        _ => return fallback_debug(value),
    };

    if entries.is_empty() && r.config().simple_empty {
        return "{}".to_string();
    }

    let limit = r.config().max_items;
    let mut rows = Vec::new();
    for (key, item) in entries.iter().take(limit) {
        let child = r.render_at(item, depth + 1, seen);
        rows.push(format!("{}: {},", r.render_key(key), child));
    }
    if entries.len() > limit {
        rows.push(r.truncation_row(entries.len() - limit, entries.len()));
    }
    r.wrap(&prefix, '{', rows, '}')
}

pub(crate) fn render_iter(r: &Renderer, value: &Value, depth: usize, seen: &mut Seen) -> String {
    let Value::Iter(iter) = value else {
        return fallback_debug(value);
    };

    if iter.items.is_empty() && iter.exhausted && r.config().simple_empty {
        return "[]".to_string();
    }

    let prefix = match iter.total {
        Some(total) => format!("iterator ({})", total),
        None => "iterator".to_string(),
    };
    let limit = r.config().max_items;
    let mut rows = Vec::new();
    for (index, item) in iter.items.iter().take(limit).enumerate() {
        let child = r.render_at(item, depth + 1, seen);
        rows.push(format!("{}: {},", index, child));
    }
    if iter.items.len() > limit {
        match iter.total {
            Some(total) => rows.push(r.truncation_row(total.saturating_sub(limit), total)),
            None => rows.push(r.paint_marker("...")),
        }
    } else if !iter.exhausted {
        rows.push(r.paint_marker("..."));
    }
    r.wrap(&prefix, '[', rows, ']')
}

pub(crate) fn render_error(r: &Renderer, value: &Value, depth: usize, seen: &mut Seen) -> String {
    let Value::Object(obj) = value else {
        return fallback_debug(value);
    };
    let Some(info) = obj.error_info() else {
        return render_object(r, value, depth, seen);
    };

    let prefix = format!("{} (error)", info.kind);
    let mut rows = vec![format!("message: {},", r.quoted(&info.message))];
    if let Some(source) = &info.source {
        rows.push(format!(
            "caused by: {},",
            r.render_at(source, depth + 1, seen)
        ));
    }
    for line in &info.backtrace {
        rows.push(line.clone());
    }
    r.wrap(&prefix, '{', rows, '}')
}

pub(crate) fn render_object(r: &Renderer, value: &Value, depth: usize, seen: &mut Seen) -> String {
    let Value::Object(obj) = value else {
        return fallback_debug(value);
    };
    let prefix = r.object_prefix(obj);

    if let Some(hook) = obj.debug_render() {
        match hook {
            Ok(body) => return r.attach_body(&prefix, &body),
            Err(err) => {
                log::debug!("debug_render hook failed on {}: {}", obj.type_name(), err);
            }
        }
    }

    let mut rows = Vec::new();
    match obj.fields() {
        Ok(fields) => {
            let limit = r.config().max_items;
            for (name, field) in fields.iter().take(limit) {
                let child = r.render_at(field, depth + 1, seen);
                rows.push(format!("{}: {},", name, child));
            }
            if fields.len() > limit {
                rows.push(r.truncation_row(fields.len() - limit, fields.len()));
            }
        }
        Err(err) => {
            log::debug!("field probe failed on {}: {}", obj.type_name(), err);
            rows.push(r.paint_marker(&format!("<fields unavailable: {}>", err)));
        }
    }
    let methods = obj.methods();
    if !methods.is_empty() {
        rows.push(format!("fn: {},", methods.join(", ")));
    }
    if let Some(text) = obj.display() {
        rows.push(format!("str: {},", r.quoted(&text)));
    }

    if rows.is_empty() && r.config().simple_empty {
        return format!("{} {{}}", r.paint_prefix(&prefix));
    }
    r.wrap(&prefix, '{', rows, '}')
}

fn fallback_debug(value: &Value) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use scry_value::ObjectValue;

    fn render(value: &Value) -> String {
        let cfg = RenderConfig::default();
        Renderer::new(&cfg).render(value)
    }

    #[test]
    fn test_scalars_render_naturally() {
        assert_eq!(render(&Value::Null), "null");
        assert_eq!(render(&Value::Bool(false)), "false");
        assert_eq!(render(&Value::Int(42)), "42");
        assert_eq!(render(&Value::Float(1.0)), "1.0");
        assert_eq!(render(&Value::Float(0.1)), "0.1");
    }

    #[test]
    fn test_seen_counts_only_grow() {
        let mut seen = Seen::default();
        assert_eq!(seen.visit(7), 1);
        assert_eq!(seen.visit(7), 2);
        assert_eq!(seen.visit(7), 3);
    }

    #[test]
    fn test_string_quoting_and_escapes() {
        assert_eq!(render(&Value::Str("a'b\n".to_string())), r"'a\'b\n'");
    }

    #[test]
    fn test_bytes_decode_lossily() {
        let rendered = render(&Value::Bytes(vec![0x61, 0xFF, 0x62]));
        assert!(rendered.starts_with("b'"));
        assert!(rendered.contains('\u{FFFD}'));
    }

    #[test]
    fn test_object_prefix_identity_toggle() {
        let value = ObjectValue::new("Point").field("x", 1i64).into_value();
        let plain = render(&value);
        assert!(plain.starts_with("Point (instance)\n"));

        let cfg = RenderConfig {
            show_identity: true,
            ..RenderConfig::default()
        };
        let with_identity = Renderer::new(&cfg).render(&value);
        assert!(with_identity.contains("@0x"));
    }
}
