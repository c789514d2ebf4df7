//! Dictionary-encoded column data.
//!
//! The server ships values in segments, each holding per-type arrays
//! (`integer`, `real`, `cstring`, ...). Rendered columns only carry indices
//! into the concatenation of those arrays. Negative indices address the
//! `cstring` array as a 1-based literal pool.

use indexmap::IndexMap;
use log::trace;
use serde::Serialize;
use serde_json::Value;

use crate::columns::IndicesInfo;
use crate::json::{self, Object};
use crate::Error;

/// The data type whose values double as the shared literal pool.
pub const LITERAL_POOL: &str = "cstring";

/// Resolved columns, keyed `{caption}-value` / `{caption}-alias` (or
/// `{caption}-{fn}-value` for a repeated caption), in emission order.
pub type Columns = IndexMap<String, Vec<Value>>;

/// Segments learned over the lifetime of a session.
///
/// Keys are never removed; a key is overwritten only by a non-null segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataDictionary {
    segments: Object,
}

impl DataDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges every non-null segment of `incoming` by key.
    pub fn merge(&mut self, incoming: &Object) {
        for (key, segment) in incoming {
            if segment.is_null() {
                continue;
            }
            trace!("Merging data segment {}", key);
            self.segments.insert(key.clone(), segment.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.segments.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.segments.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.segments.iter()
    }

    pub fn segments(&self) -> &Object {
        &self.segments
    }
}

/// The segments embedded in a bootstrap pres-model map.
pub fn bootstrap_segments(pres_model_map: &Object) -> Option<&Object> {
    json::opt_path(
        pres_model_map,
        &[
            "dataDictionary",
            "presModelHolder",
            "genDataDictionaryPresModel",
            "dataSegments",
        ],
    )
}

/// The segments embedded in a command response's application pres model.
pub fn command_segments(pm: &Object) -> Option<&Object> {
    json::opt_path(pm, &["dataDictionary", "dataSegments"])
}

/// All known values grouped by data type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FullData {
    values: IndexMap<String, Vec<Value>>,
}

impl FullData {
    /// Concatenates the `dataColumns` of `own` segments, then those of the
    /// dictionary's segments whose keys `own` does not carry. A `null` own
    /// segment does not hide the dictionary's segment under that key.
    pub fn build(own: Option<&Object>, dictionary: &DataDictionary) -> Result<Self, Error> {
        let empty = Object::new();
        let own = own.unwrap_or(&empty);
        let fallback = dictionary
            .iter()
            .filter(|(key, _)| own.get(key.as_str()).map_or(true, Value::is_null));

        let mut values: IndexMap<String, Vec<Value>> = IndexMap::new();
        for (key, segment) in own.iter().chain(fallback) {
            let segment = match segment {
                Value::Null => continue,
                Value::Object(obj) => obj,
                _ => {
                    return Err(Error::UnexpectedType {
                        field: format!("dataSegments.{}", key),
                        expected: "object",
                    })
                }
            };
            for column in json::array(segment, "dataColumns")?
                .iter()
                .filter_map(Value::as_object)
            {
                values
                    .entry(json::string(column, "dataType")?)
                    .or_default()
                    .extend(json::array(column, "dataValues")?.iter().cloned());
            }
        }
        Ok(Self { values })
    }

    /// The concatenated values of one data type.
    pub fn typed(&self, data_type: &str) -> Option<&[Value]> {
        self.values.get(data_type).map(Vec::as_slice)
    }

    pub fn pool(&self) -> &[Value] {
        self.typed(LITERAL_POOL).unwrap_or_default()
    }

    pub fn data_types(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Resolves one column's indices against its typed array.
    pub fn resolve(&self, data_type: &str, indices: &[i64]) -> Vec<Value> {
        let pool = self.pool();
        let typed = self.typed(data_type).unwrap_or(pool);
        indices
            .iter()
            .filter_map(|idx| resolve_value(*idx, typed, pool))
            .cloned()
            .collect()
    }
}

/// `typed[index]` for non-negative indices, `pool[|index| - 1]` otherwise.
/// Out-of-range indices resolve to nothing.
pub fn resolve_value<'a>(index: i64, typed: &'a [Value], pool: &'a [Value]) -> Option<&'a Value> {
    if index >= 0 {
        typed.get(usize::try_from(index).ok()?)
    } else {
        pool.get(usize::try_from(index.unsigned_abs()).ok()? - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Value,
    Alias,
}

impl Mode {
    fn suffix(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Alias => "alias",
        }
    }

    fn indices(self, info: &IndicesInfo) -> &[i64] {
        match self {
            Self::Value => &info.value_indices,
            Self::Alias => &info.alias_indices,
        }
    }
}

fn emit(full: &FullData, info: &IndicesInfo, mode: Mode, with_fn: bool, out: &mut Columns) {
    let values = full.resolve(&info.data_type, mode.indices(info));
    if values.is_empty() {
        return;
    }
    let key = if with_fn && !info.function.is_empty() {
        format!("{}-{}-{}", info.caption(), info.function, mode.suffix())
    } else {
        format!("{}-{}", info.caption(), mode.suffix())
    };
    out.insert(key, values);
}

/// Resolves every column into literal values.
///
/// Columns sharing a caption are grouped: the first one with value indices
/// is emitted as `{caption}-value`, and when several have value indices the
/// last one is also emitted as `{caption}-{fn}-value`. Alias indices follow
/// the same rule. Columns resolving to no values are omitted.
pub fn resolve_columns(full: &FullData, columns: &[IndicesInfo]) -> Columns {
    let mut groups: IndexMap<&str, Vec<&IndicesInfo>> = IndexMap::new();
    for info in columns {
        groups.entry(info.caption()).or_default().push(info);
    }

    let mut out = Columns::new();
    for group in groups.values() {
        let with_values = group
            .iter()
            .filter(|info| !info.value_indices.is_empty())
            .collect::<Vec<_>>();
        let with_aliases = group
            .iter()
            .filter(|info| !info.alias_indices.is_empty())
            .collect::<Vec<_>>();
        if let Some(first) = with_values.first() {
            emit(full, first, Mode::Value, false, &mut out);
        }
        if let Some(first) = with_aliases.first() {
            emit(full, first, Mode::Alias, false, &mut out);
        }
        if with_values.len() > 1 {
            if let Some(last) = with_values.last() {
                emit(full, last, Mode::Value, true, &mut out);
            }
        }
        if with_aliases.len() > 1 {
            if let Some(last) = with_aliases.last() {
                emit(full, last, Mode::Alias, true, &mut out);
            }
        }
    }
    out
}
