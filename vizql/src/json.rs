//! Navigation helpers for loosely structured server documents.
//!
//! Required lookups fail with [`Error::MissingField`] or
//! [`Error::UnexpectedType`]; optional lookups return `None` for absent,
//! `null` or wrongly typed values.

use serde_json::{Map, Value};

use crate::Error;

/// A JSON object as it appears in server documents. Key order follows the
/// document.
pub type Object = Map<String, Value>;

pub(crate) fn field<'a>(obj: &'a Object, key: &str) -> Result<&'a Value, Error> {
    obj.get(key)
        .ok_or_else(|| Error::MissingField(key.to_string()))
}

pub(crate) fn object<'a>(obj: &'a Object, key: &str) -> Result<&'a Object, Error> {
    field(obj, key)?
        .as_object()
        .ok_or_else(|| unexpected(key, "object"))
}

pub(crate) fn array<'a>(obj: &'a Object, key: &str) -> Result<&'a Vec<Value>, Error> {
    field(obj, key)?
        .as_array()
        .ok_or_else(|| unexpected(key, "array"))
}

pub(crate) fn opt_object<'a>(obj: &'a Object, key: &str) -> Option<&'a Object> {
    obj.get(key).and_then(Value::as_object)
}

pub(crate) fn opt_array<'a>(obj: &'a Object, key: &str) -> Option<&'a Vec<Value>> {
    obj.get(key).and_then(Value::as_array)
}

/// Follows a chain of nested objects. The error names the whole path up to
/// the first key that could not be followed.
pub(crate) fn path<'a>(obj: &'a Object, keys: &[&str]) -> Result<&'a Object, Error> {
    let mut current = obj;
    for (i, key) in keys.iter().enumerate() {
        current = match current.get(*key) {
            Some(Value::Object(inner)) => inner,
            Some(_) => {
                return Err(Error::UnexpectedType {
                    field: keys[..=i].join("."),
                    expected: "object",
                })
            }
            None => return Err(Error::MissingField(keys[..=i].join("."))),
        };
    }
    Ok(current)
}

pub(crate) fn opt_path<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a Object> {
    keys.iter().try_fold(obj, |current, key| opt_object(current, key))
}

/// The textual content of a primitive: strings as-is, numbers and booleans
/// in their JSON spelling.
pub fn content(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn string(obj: &Object, key: &str) -> Result<String, Error> {
    match field(obj, key)? {
        Value::Array(_) | Value::Object(_) => Err(unexpected(key, "primitive")),
        v => Ok(content(v)),
    }
}

pub(crate) fn opt_string(obj: &Object, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        v => Some(content(v)),
    }
}

pub(crate) fn integer(value: &Value, key: &str) -> Result<i64, Error> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| unexpected(key, "integer")),
        Value::String(s) => s.parse().map_err(|_| unexpected(key, "integer")),
        _ => Err(unexpected(key, "integer")),
    }
}

pub(crate) fn integers(obj: &Object, key: &str) -> Result<Vec<i64>, Error> {
    array(obj, key)?
        .iter()
        .map(|v| integer(v, key))
        .collect()
}

pub(crate) fn index(value: &Value, key: &str) -> Result<usize, Error> {
    usize::try_from(integer(value, key)?).map_err(|_| unexpected(key, "non-negative index"))
}

/// `true` only for a boolean `true` (or the string `"true"`); absent and
/// anything else is `false`.
pub(crate) fn flag(obj: &Object, key: &str) -> bool {
    match obj.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

/// Iterates the object-valued entries of a map, skipping `null`s.
pub(crate) fn entries(map: &Object) -> impl Iterator<Item = (&String, &Object)> {
    map.iter()
        .filter_map(|(k, v)| v.as_object().map(|obj| (k, obj)))
}

fn unexpected(key: &str, expected: &'static str) -> Error {
    Error::UnexpectedType {
        field: key.to_string(),
        expected,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Object {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn path_reports_first_missing_key() {
        let doc = obj(json!({ "a": { "b": { "c": {} } } }));
        assert!(path(&doc, &["a", "b", "c"]).is_ok());
        match path(&doc, &["a", "x", "c"]) {
            Err(Error::MissingField(p)) => assert_eq!(p, "a.x"),
            other => panic!("unexpected result: {:?}", other),
        }
        let doc = obj(json!({ "a": [] }));
        assert!(matches!(
            path(&doc, &["a", "b"]),
            Err(Error::UnexpectedType { .. })
        ));
        assert!(opt_path(&doc, &["a", "b"]).is_none());
    }

    #[test]
    fn primitive_content() {
        assert_eq!(content(&json!("x")), "x");
        assert_eq!(content(&json!(3)), "3");
        assert_eq!(content(&json!(true)), "true");
        let doc = obj(json!({ "n": 1.5, "s": null, "a": [1] }));
        assert_eq!(string(&doc, "n").unwrap(), "1.5");
        assert_eq!(opt_string(&doc, "s"), None);
        assert!(string(&doc, "a").is_err());
    }

    #[test]
    fn flags_and_entries() {
        let doc = obj(json!({ "t": true, "s": "true", "f": false, "z": null, "o": { "k": 1 } }));
        assert!(flag(&doc, "t"));
        assert!(flag(&doc, "s"));
        assert!(!flag(&doc, "f"));
        assert!(!flag(&doc, "missing"));
        let keys = entries(&doc).map(|(k, _)| k.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["o"]);
    }

    #[test]
    fn integer_lists() {
        let doc = obj(json!({ "i": [1, -2, "3"], "bad": [1.5] }));
        assert_eq!(integers(&doc, "i").unwrap(), vec![1, -2, 3]);
        assert!(integers(&doc, "bad").is_err());
        assert!(index(&json!(-1), "pane").is_err());
    }
}
