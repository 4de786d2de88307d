//! Request parameters.
//!
//! Bot API methods take loosely typed named parameters. [`Params`] keeps them
//! in insertion order, which is also the order the multipart encoder emits
//! its parts in.

use serde_json::Value;

use crate::input_file::{FileStream, InputFile};

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// An absent value. Skipped by both encoders.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer (chat ids, message ids, offsets, ...).
    Int(i64),
    /// A floating point number (coordinates).
    Float(f64),
    /// A string.
    Str(String),
    /// A structured value sent as compact JSON (keyboards, inline results).
    Json(Value),
    /// A file that still has to be opened.
    File(InputFile),
    /// Opened file contents.
    Stream(FileStream),
}

impl ParamValue {
    /// Returns `true` for [`ParamValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for file values, opened or not.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_) | Self::Stream(_))
    }

    /// Returns the string slice if this is a [`ParamValue::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Renders a scalar value the way it is written to a form body.
    ///
    /// Returns `None` for `Null` and for file values, which have no textual
    /// form.
    pub fn to_form_string(&self) -> Option<String> {
        match self {
            Self::Null | Self::File(_) | Self::Stream(_) => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Str(s) => Some(s.clone()),
            Self::Json(Value::String(s)) => Some(s.clone()),
            Self::Json(v) => Some(v.to_string()),
        }
    }

    /// Converts a structured value into its string form, leaving other values
    /// untouched.
    pub fn into_stringified(self) -> Self {
        match self {
            Self::Json(v) => Self::Str(match v {
                Value::String(s) => s,
                other => other.to_string(),
            }),
            other => other,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(v: $ty) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Value> for ParamValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::String(s) => Self::Str(s),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            other => Self::Json(other),
        }
    }
}

impl From<InputFile> for ParamValue {
    fn from(v: InputFile) -> Self {
        Self::File(v)
    }
}

impl From<FileStream> for ParamValue {
    fn from(v: FileStream) -> Self {
        Self::Stream(v)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// An ordered collection of named parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a value, replacing an existing entry in place so the original
    /// ordering is kept.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut ParamValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns the string value for `key`, if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }

    /// Returns `true` if `key` is present (even when its value is `Null`).
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Removes and returns the value for `key`.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Replaces the value for `key` with `f(value)`, if present.
    pub fn map_value(&mut self, key: &str, f: impl FnOnce(ParamValue) -> ParamValue) {
        if let Some(slot) = self.get_mut(key) {
            let value = std::mem::replace(slot, ParamValue::Null);
            *slot = f(value);
        }
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = std::vec::IntoIter<(String, ParamValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> Extend<(K, V)> for Params {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Builds a [`Params`] from `key => value` pairs.
///
/// ```rust
/// use tgbot_core::params;
///
/// let params = params! {
///     "chat_id" => 42,
///     "text" => "hello",
/// };
/// assert_eq!(params.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => { $crate::Params::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::Params::new();
        $( params.insert($key, $value); )+
        params
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_keeps_original_position() {
        let mut params = Params::new().with("a", 1).with("b", 2).with("c", 3);
        params.insert("a", 10);
        let keys: Vec<_> = params.keys().collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(params.get("a"), Some(&ParamValue::Int(10)));
    }

    #[test]
    fn test_form_strings() {
        assert_eq!(ParamValue::Bool(true).to_form_string().as_deref(), Some("true"));
        assert_eq!(ParamValue::Int(-5).to_form_string().as_deref(), Some("-5"));
        assert_eq!(
            ParamValue::Json(json!({"k": [1, 2]})).to_form_string().as_deref(),
            Some(r#"{"k":[1,2]}"#)
        );
        assert_eq!(ParamValue::Null.to_form_string(), None);
    }

    #[test]
    fn test_option_conversion() {
        assert!(ParamValue::from(None::<i64>).is_null());
        assert_eq!(ParamValue::from(Some("x")), ParamValue::Str("x".into()));
    }

    #[test]
    fn test_json_scalars_collapse() {
        assert_eq!(ParamValue::from(json!(7)), ParamValue::Int(7));
        assert_eq!(ParamValue::from(json!(null)), ParamValue::Null);
        assert!(matches!(ParamValue::from(json!([1])), ParamValue::Json(_)));
    }

    #[test]
    fn test_map_value_and_remove() {
        let mut params = params! { "reply_markup" => json!({"force_reply": true}), "x" => 1 };
        params.map_value("reply_markup", ParamValue::into_stringified);
        assert_eq!(params.get_str("reply_markup"), Some(r#"{"force_reply":true}"#));
        assert_eq!(params.remove("x"), Some(ParamValue::Int(1)));
        assert!(!params.contains("x"));
    }

    #[test]
    fn test_extend_overrides_existing_keys() {
        let mut params = params! { "chat_id" => 1, "text" => "hi" };
        params.extend(params! { "text" => "bye", "parse_mode" => "HTML" });
        let keys: Vec<_> = params.keys().collect();
        assert_eq!(keys, ["chat_id", "text", "parse_mode"]);
        assert_eq!(params.get_str("text"), Some("bye"));
    }
}
