//! Conversions from host values into [`Value`] trees.
//!
//! Hash-based containers are sorted by their key's debug form so the
//! same container always renders the same way.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{
    CallableValue, ErrorValue, Inspect, MatchValue, ObjectValue, PatternValue, SeqKind, Value,
};

pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl ToValue for () {
    fn to_value(&self) -> Value {
        Value::Null
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! int_to_value {
    ($($ty:ty),+) => {
        $(impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::Int(*self as i128)
            }
        })+
    };
}

int_to_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl ToValue for u128 {
    fn to_value(&self) -> Value {
        Value::Int(i128::try_from(*self).unwrap_or(i128::MAX))
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Seq(SeqKind::List, self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

macro_rules! tuple_to_value {
    ($(($($name:ident : $idx:tt),+))+) => {
        $(impl<$($name: ToValue),+> ToValue for ($($name,)+) {
            fn to_value(&self) -> Value {
                Value::Seq(SeqKind::Tuple, vec![$(self.$idx.to_value()),+])
            }
        })+
    };
}

tuple_to_value! {
    (A: 0)
    (A: 0, B: 1)
    (A: 0, B: 1, C: 2)
    (A: 0, B: 1, C: 2, D: 3)
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }
}

impl<K: ToValue, V: ToValue, S> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        let mut entries: Vec<(Value, Value)> = self
            .iter()
            .map(|(k, v)| (k.to_value(), v.to_value()))
            .collect();
        entries.sort_by_key(|(k, _)| format!("{:?}", k));
        Value::Map(entries)
    }
}

impl<T: ToValue> ToValue for BTreeSet<T> {
    fn to_value(&self) -> Value {
        Value::Seq(SeqKind::Set, self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue, S> ToValue for HashSet<T, S> {
    fn to_value(&self) -> Value {
        let mut items: Vec<Value> = self.iter().map(ToValue::to_value).collect();
        items.sort_by_key(|v| format!("{:?}", v));
        Value::Seq(SeqKind::Set, items)
    }
}

impl ToValue for Path {
    fn to_value(&self) -> Value {
        Value::Path(self.to_path_buf())
    }
}

impl ToValue for PathBuf {
    fn to_value(&self) -> Value {
        Value::Path(self.clone())
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value {
        Value::DateTime(self.and_utc())
    }
}

impl ToValue for SystemTime {
    fn to_value(&self) -> Value {
        Value::DateTime(DateTime::<Utc>::from(*self))
    }
}

impl ToValue for regex::Regex {
    fn to_value(&self) -> Value {
        Value::Pattern(PatternValue {
            source: self.as_str().to_string(),
        })
    }
}

impl ToValue for regex::Match<'_> {
    fn to_value(&self) -> Value {
        Value::Match(MatchValue {
            text: self.as_str().to_string(),
            start: self.start(),
            end: self.end(),
            groups: 0,
        })
    }
}

impl ToValue for regex::Captures<'_> {
    fn to_value(&self) -> Value {
        let whole = self.get(0);
        Value::Match(MatchValue {
            text: whole.map(|m| m.as_str().to_string()).unwrap_or_default(),
            start: whole.map(|m| m.start()).unwrap_or(0),
            end: whole.map(|m| m.end()).unwrap_or(0),
            groups: self.len().saturating_sub(1),
        })
    }
}

impl ToValue for CallableValue {
    fn to_value(&self) -> Value {
        Value::Callable(self.clone())
    }
}

impl ToValue for ObjectValue {
    fn to_value(&self) -> Value {
        Value::object(self.clone())
    }
}

impl ToValue for ErrorValue {
    fn to_value(&self) -> Value {
        Value::object(self.clone())
    }
}

impl<T: Inspect + 'static> ToValue for Rc<T> {
    fn to_value(&self) -> Value {
        let shared: Rc<dyn Inspect> = self.clone();
        Value::Object(shared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert!(matches!(42i32.to_value(), Value::Int(42)));
        assert!(matches!(true.to_value(), Value::Bool(true)));
        assert!(matches!(().to_value(), Value::Null));
        assert!(matches!("hi".to_value(), Value::Str(s) if s == "hi"));
    }

    #[test]
    fn test_option_flattens() {
        assert!(matches!(Some(3i64).to_value(), Value::Int(3)));
        assert!(matches!(None::<i64>.to_value(), Value::Null));
    }

    #[test]
    fn test_vec_and_tuple_kinds() {
        let list = vec![1i64, 2].to_value();
        assert!(matches!(list, Value::Seq(SeqKind::List, ref items) if items.len() == 2));
        let pair = (1i64, "two").to_value();
        assert!(matches!(pair, Value::Seq(SeqKind::Tuple, ref items) if items.len() == 2));
    }

    #[test]
    fn test_hashmap_entries_are_sorted() {
        let mut map = HashMap::new();
        map.insert("b", 2i64);
        map.insert("a", 1i64);
        let Value::Map(entries) = map.to_value() else {
            panic!("expected a map");
        };
        assert!(matches!(&entries[0].0, Value::Str(s) if s == "a"));
        assert!(matches!(&entries[1].0, Value::Str(s) if s == "b"));
    }

    #[test]
    fn test_reference_passthrough() {
        let n = 7i64;
        let by_ref = (&n).to_value();
        assert!(matches!(by_ref, Value::Int(7)));
    }

    #[test]
    fn test_regex_conversions() {
        let re = regex::Regex::new(r"\d+").unwrap();
        assert!(matches!(re.to_value(), Value::Pattern(p) if p.source == r"\d+"));
        let caps = re.captures("abc 123").unwrap();
        let Value::Match(found) = caps.to_value() else {
            panic!("expected a match");
        };
        assert_eq!(found.text, "123");
        assert_eq!(found.start, 4);
    }

    #[test]
    fn test_shared_rc_keeps_identity() {
        let rc = Rc::new(ObjectValue::new("Node"));
        let a = rc.to_value();
        let b = rc.to_value();
        assert_eq!(a.identity(), b.identity());
    }
}
