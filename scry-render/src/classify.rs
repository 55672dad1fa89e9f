//! Value classification.
//!
//! Categories form a closed set and are decided by an ordered table of
//! (predicate, renderer) rules evaluated top to bottom, most specific
//! first: an object exposing the error protocol is an error before it
//! is an instance, protocol views outrank the generic fallback, and
//! the final rule accepts anything. Classification is pure; probing
//! never mutates the value and the same value always lands in the same
//! category.

use scry_value::{SeqKind, Value};

use crate::render::{self, Renderer, Seen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    List,
    Tuple,
    Set,
    Map,
    Iter,
    DateTime,
    Path,
    Pattern,
    Match,
    Callable,
    Error,
    Object,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Null => "null",
            Category::Bool => "bool",
            Category::Int => "int",
            Category::Float => "float",
            Category::Str => "str",
            Category::Bytes => "bytes",
            Category::List => "list",
            Category::Tuple => "tuple",
            Category::Set => "set",
            Category::Map => "map",
            Category::Iter => "iterator",
            Category::DateTime => "datetime",
            Category::Path => "path",
            Category::Pattern => "regex",
            Category::Match => "match",
            Category::Callable => "callable",
            Category::Error => "error",
            Category::Object => "instance",
        }
    }

    /// Categories whose body expands over multiple lines and is
    /// therefore subject to depth collapsing.
    pub fn is_expandable(self) -> bool {
        matches!(
            self,
            Category::List
                | Category::Tuple
                | Category::Set
                | Category::Map
                | Category::Iter
                | Category::Error
                | Category::Object
        )
    }
}

pub type Predicate = fn(&Value) -> bool;
pub type RenderFn = fn(&Renderer, &Value, usize, &mut Seen) -> String;

pub struct Rule {
    pub category: Category,
    pub applies: Predicate,
    pub render: RenderFn,
}

/// The dispatch table. Order is the priority.
pub static RULES: &[Rule] = &[
    Rule {
        category: Category::Error,
        applies: |v| matches!(v, Value::Object(o) if o.error_info().is_some()),
        render: render::render_error,
    },
    Rule {
        category: Category::Map,
        applies: |v| matches!(v, Value::Object(o) if o.entries().is_some()),
        render: render::render_map,
    },
    Rule {
        category: Category::List,
        applies: |v| matches!(v, Value::Object(o) if o.items().is_some()),
        render: render::render_seq,
    },
    Rule {
        category: Category::Callable,
        applies: |v| matches!(v, Value::Callable(_)),
        render: render::render_callable,
    },
    Rule {
        category: Category::Pattern,
        applies: |v| matches!(v, Value::Pattern(_)),
        render: render::render_pattern,
    },
    Rule {
        category: Category::Match,
        applies: |v| matches!(v, Value::Match(_)),
        render: render::render_match,
    },
    Rule {
        category: Category::DateTime,
        applies: |v| matches!(v, Value::DateTime(_)),
        render: render::render_datetime,
    },
    Rule {
        category: Category::Path,
        applies: |v| matches!(v, Value::Path(_)),
        render: render::render_path,
    },
    Rule {
        category: Category::Bytes,
        applies: |v| matches!(v, Value::Bytes(_)),
        render: render::render_bytes,
    },
    Rule {
        category: Category::Str,
        applies: |v| matches!(v, Value::Str(_)),
        render: render::render_str,
    },
    Rule {
        category: Category::Map,
        applies: |v| matches!(v, Value::Map(_)),
        render: render::render_map,
    },
    Rule {
        category: Category::List,
        applies: |v| matches!(v, Value::Seq(SeqKind::List, _)),
        render: render::render_seq,
    },
    Rule {
        category: Category::Tuple,
        applies: |v| matches!(v, Value::Seq(SeqKind::Tuple, _)),
        render: render::render_seq,
    },
    Rule {
        category: Category::Set,
        applies: |v| matches!(v, Value::Seq(SeqKind::Set, _)),
        render: render::render_seq,
    },
    Rule {
        category: Category::Iter,
        applies: |v| matches!(v, Value::Iter(_)),
        render: render::render_iter,
    },
    Rule {
        category: Category::Null,
        applies: |v| matches!(v, Value::Null),
        render: render::render_scalar,
    },
    Rule {
        category: Category::Bool,
        applies: |v| matches!(v, Value::Bool(_)),
        render: render::render_scalar,
    },
    Rule {
        category: Category::Int,
        applies: |v| matches!(v, Value::Int(_)),
        render: render::render_scalar,
    },
    Rule {
        category: Category::Float,
        applies: |v| matches!(v, Value::Float(_)),
        render: render::render_scalar,
    },
    // catch-all: anything not claimed above renders as an instance
    Rule {
        category: Category::Object,
        applies: |_| true,
        render: render::render_object,
    },
];

/// Classify a value. Total: the final rule accepts anything.
pub fn classify(value: &Value) -> Category {
    RULES
        .iter()
        .find(|rule| (rule.applies)(value))
        .map(|rule| rule.category)
        .unwrap_or(Category::Object)
}

static FALLBACK: Rule = Rule {
    category: Category::Object,
    applies: |_| true,
    render: render::render_object,
};

/// The dispatch rule for a value.
pub(crate) fn rule_for(value: &Value) -> &'static Rule {
    RULES
        .iter()
        .find(|rule| (rule.applies)(value))
        .unwrap_or(&FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scry_value::{ErrorValue, ObjectValue};

    #[test]
    fn test_classification_is_idempotent() {
        let values = vec![
            Value::Null,
            Value::Int(3),
            Value::Str("s".to_string()),
            Value::Seq(SeqKind::Tuple, vec![Value::Int(1)]),
            ObjectValue::new("Point").into_value(),
        ];
        for value in &values {
            assert_eq!(classify(value), classify(value));
        }
    }

    #[test]
    fn test_error_protocol_beats_generic_object() {
        let err = ErrorValue::new("IoError", "boom").into_value();
        assert_eq!(classify(&err), Category::Error);
        let plain = ObjectValue::new("Point").into_value();
        assert_eq!(classify(&plain), Category::Object);
    }

    #[test]
    fn test_seq_kinds_have_distinct_categories() {
        assert_eq!(classify(&Value::Seq(SeqKind::List, vec![])), Category::List);
        assert_eq!(
            classify(&Value::Seq(SeqKind::Tuple, vec![])),
            Category::Tuple
        );
        assert_eq!(classify(&Value::Seq(SeqKind::Set, vec![])), Category::Set);
    }

    #[test]
    fn test_every_value_matches_some_rule() {
        let values = vec![
            Value::Null,
            Value::Bool(true),
            Value::Float(1.5),
            Value::Bytes(vec![1]),
            Value::Map(vec![]),
        ];
        for value in &values {
            assert!(RULES.iter().any(|r| (r.applies)(value)));
        }
    }
}
