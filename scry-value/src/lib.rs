use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::{DateTime, Utc};

mod convert;
pub use convert::ToValue;

/// Failure raised while probing a value's shape or attributes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbeError {
    #[error("attribute `{name}` unavailable: {reason}")]
    Attribute { name: String, reason: String },
    #[error("probe failed: {0}")]
    Failed(String),
}

impl ProbeError {
    pub fn failed(reason: impl Into<String>) -> Self {
        ProbeError::Failed(reason.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqKind {
    List,
    Tuple,
    Set,
}

impl SeqKind {
    pub fn label(self) -> &'static str {
        match self {
            SeqKind::List => "list",
            SeqKind::Tuple => "tuple",
            SeqKind::Set => "set",
        }
    }

    pub fn open_char(self) -> char {
        match self {
            SeqKind::List => '[',
            SeqKind::Tuple => '(',
            SeqKind::Set => '{',
        }
    }

    pub fn close_char(self) -> char {
        match self {
            SeqKind::List => ']',
            SeqKind::Tuple => ')',
            SeqKind::Set => '}',
        }
    }
}

/// A lazy iterator captured at conversion time: a drained prefix plus
/// whether anything remained beyond the probe limit.
#[derive(Debug, Clone)]
pub struct IterValue {
    pub items: Vec<Value>,
    /// Known total length; `None` when the iterator was not exhausted.
    pub total: Option<usize>,
    pub exhausted: bool,
}

impl IterValue {
    /// How many elements conversion will drain before declaring the
    /// iterator unbounded for display purposes.
    pub const PROBE_LIMIT: usize = 256;

    pub fn collect_from<I>(iter: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToValue,
    {
        let mut it = iter.into_iter();
        let mut items = Vec::new();
        for _ in 0..Self::PROBE_LIMIT {
            match it.next() {
                Some(item) => items.push(item.to_value()),
                None => {
                    let total = Some(items.len());
                    return Self {
                        items,
                        total,
                        exhausted: true,
                    };
                }
            }
        }
        match it.next() {
            Some(item) => {
                items.push(item.to_value());
                Self {
                    items,
                    total: None,
                    exhausted: false,
                }
            }
            None => {
                let total = Some(items.len());
                Self {
                    items,
                    total,
                    exhausted: true,
                }
            }
        }
    }
}

/// A compiled regular expression, reduced to its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternValue {
    pub source: String,
}

/// One regex match: the matched text, its span, and how many capture
/// groups the match carries.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchValue {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub groups: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    Function,
    Method,
    Closure,
}

impl CallableKind {
    pub fn label(self) -> &'static str {
        match self {
            CallableKind::Function => "function",
            CallableKind::Method => "method",
            CallableKind::Closure => "closure",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallableValue {
    pub name: String,
    pub kind: CallableKind,
    pub signature: Option<String>,
}

impl CallableValue {
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CallableKind::Function,
            signature: None,
        }
    }

    pub fn method(owner: &str, name: &str) -> Self {
        Self {
            name: format!("{}::{}", owner, name),
            kind: CallableKind::Method,
            signature: None,
        }
    }

    pub fn closure(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CallableKind::Closure,
            signature: None,
        }
    }

    /// Build from a concrete callable type, deriving the role and (for
    /// plain function pointers) the signature from the type's name.
    pub fn of<F>(name: &str) -> Self {
        let ty = std::any::type_name::<F>();
        if let Some(sig) = ty.strip_prefix("fn") {
            Self {
                name: name.to_string(),
                kind: CallableKind::Function,
                signature: Some(sig.to_string()),
            }
        } else if ty.contains("{{closure}}") {
            Self::closure(name)
        } else {
            Self::function(name)
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}

/// Exception-protocol payload surfaced by [`Inspect::error_info`].
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub kind: String,
    pub message: String,
    pub source: Option<Value>,
    pub backtrace: Vec<String>,
}

/// The structural interface an object exposes to the inspector.
///
/// Implementations must be side-effect free: probes may be called in
/// any order, more than once, and their failures are recovered, never
/// propagated. Object identity is the `Rc` allocation a value was
/// wrapped in, so sharing one `Rc` shares identity.
pub trait Inspect: fmt::Debug {
    fn type_name(&self) -> &str;

    /// Plain data attributes, instance values shadowing class-level
    /// ones where the distinction exists.
    fn fields(&self) -> Result<Vec<(String, Value)>, ProbeError>;

    /// Names of callable members.
    fn methods(&self) -> Vec<String> {
        Vec::new()
    }

    /// The object's own string conversion, when it has one.
    fn display(&self) -> Option<String> {
        None
    }

    /// Exception protocol: present only for error-like objects.
    fn error_info(&self) -> Option<ErrorInfo> {
        None
    }

    /// Mapping protocol: key/value entries for dict-like objects.
    fn entries(&self) -> Option<Result<Vec<(Value, Value)>, ProbeError>> {
        None
    }

    /// Sequence protocol: ordered items for list-like objects.
    fn items(&self) -> Option<Result<Vec<Value>, ProbeError>> {
        None
    }

    /// Self-describing hook: a value that wants to control its own
    /// rendering returns the full body here. A failure makes the
    /// renderer fall back to the default object rendering.
    fn debug_render(&self) -> Option<Result<String, ProbeError>> {
        None
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Seq(SeqKind, Vec<Value>),
    Map(Vec<(Value, Value)>),
    Iter(IterValue),
    DateTime(DateTime<Utc>),
    Path(PathBuf),
    Pattern(PatternValue),
    Match(MatchValue),
    Callable(CallableValue),
    Object(Rc<dyn Inspect>),
}

impl Value {
    pub fn object<T: Inspect + 'static>(value: T) -> Self {
        Value::Object(Rc::new(value))
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    pub fn iterator<I>(iter: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToValue,
    {
        Value::Iter(IterValue::collect_from(iter))
    }

    /// Memory identity for repeat/cycle detection. Only `Rc`-backed
    /// objects have identity; everything else is plain data.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Object(obj) => Some(Rc::as_ptr(obj) as *const () as usize),
            _ => None,
        }
    }
}

/// A plain bag-of-fields object for callers that do not want to
/// implement [`Inspect`] themselves.
#[derive(Debug, Clone, Default)]
pub struct ObjectValue {
    type_name: String,
    fields: Vec<(String, Value)>,
    methods: Vec<String>,
    display: Option<String>,
}

impl ObjectValue {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl ToValue) -> Self {
        self.fields.push((name.into(), value.to_value()));
        self
    }

    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.methods.push(name.into());
        self
    }

    pub fn with_display(mut self, text: impl Into<String>) -> Self {
        self.display = Some(text.into());
        self
    }

    pub fn into_value(self) -> Value {
        Value::object(self)
    }
}

impl Inspect for ObjectValue {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn fields(&self) -> Result<Vec<(String, Value)>, ProbeError> {
        Ok(self.fields.clone())
    }

    fn methods(&self) -> Vec<String> {
        self.methods.clone()
    }

    fn display(&self) -> Option<String> {
        self.display.clone()
    }
}

/// An error chain reduced to renderable data.
#[derive(Debug, Clone)]
pub struct ErrorValue {
    kind: String,
    message: String,
    source: Option<Box<ErrorValue>>,
    backtrace: Vec<String>,
}

impl ErrorValue {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            source: None,
            backtrace: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: ErrorValue) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn with_backtrace(mut self, lines: Vec<String>) -> Self {
        self.backtrace = lines;
        self
    }

    /// Capture a `std::error::Error` and its source chain. The chain
    /// elements lose their concrete type names; only the entry point's
    /// type is known.
    pub fn from_error<E: std::error::Error>(err: &E) -> Self {
        let kind = std::any::type_name::<E>()
            .rsplit("::")
            .next()
            .unwrap_or("Error")
            .to_string();
        let mut root = ErrorValue::new(kind, err.to_string());
        let mut cursor = err.source();
        let mut chain: Vec<ErrorValue> = Vec::new();
        while let Some(inner) = cursor {
            chain.push(ErrorValue::new("Error", inner.to_string()));
            cursor = inner.source();
        }
        while let Some(inner) = chain.pop() {
            match chain.last_mut() {
                Some(parent) => parent.source = Some(Box::new(inner)),
                None => root.source = Some(Box::new(inner)),
            }
        }
        root
    }

    pub fn into_value(self) -> Value {
        Value::object(self)
    }
}

impl Inspect for ErrorValue {
    fn type_name(&self) -> &str {
        &self.kind
    }

    fn fields(&self) -> Result<Vec<(String, Value)>, ProbeError> {
        Ok(vec![(
            "message".to_string(),
            Value::Str(self.message.clone()),
        )])
    }

    fn error_info(&self) -> Option<ErrorInfo> {
        Some(ErrorInfo {
            kind: self.kind.clone(),
            message: self.message.clone(),
            source: self
                .source
                .as_ref()
                .map(|inner| Value::object((**inner).clone())),
            backtrace: self.backtrace.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_shared_through_clones() {
        let obj = Rc::new(ObjectValue::new("Point").field("x", 1i64));
        let a = Value::Object(obj.clone());
        let b = Value::Object(obj);
        assert_eq!(a.identity(), b.identity());
        assert!(a.identity().is_some());
    }

    #[test]
    fn test_separate_objects_have_distinct_identity() {
        let a = ObjectValue::new("Point").into_value();
        let b = ObjectValue::new("Point").into_value();
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn test_plain_data_has_no_identity() {
        assert!(Value::Int(1).identity().is_none());
        assert!(Value::Seq(SeqKind::List, vec![]).identity().is_none());
    }

    #[test]
    fn test_iter_value_exhausts_small_iterators() {
        let iter = IterValue::collect_from(0..5i64);
        assert_eq!(iter.items.len(), 5);
        assert_eq!(iter.total, Some(5));
        assert!(iter.exhausted);
    }

    #[test]
    fn test_iter_value_caps_unbounded_iterators() {
        let iter = IterValue::collect_from((0i64..).take(IterValue::PROBE_LIMIT + 10));
        assert_eq!(iter.items.len(), IterValue::PROBE_LIMIT + 1);
        assert_eq!(iter.total, None);
        assert!(!iter.exhausted);
    }

    #[test]
    fn test_error_value_chain() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let captured = ErrorValue::from_error(&err);
        let info = captured.error_info().unwrap();
        assert_eq!(info.kind, "Error");
        assert_eq!(info.message, "missing");
    }

    #[test]
    fn test_callable_of_function_pointer() {
        let callable = CallableValue::of::<fn(i64) -> i64>("double");
        assert_eq!(callable.kind, CallableKind::Function);
        assert_eq!(callable.signature.as_deref(), Some("(i64) -> i64"));
    }
}
