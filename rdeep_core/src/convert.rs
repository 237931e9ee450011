//! Conversion between JSON/YAML documents and the value model.

use chrono::SecondsFormat;
use rdeep_common::{Object, ObjectId, RDeepError, Result, Value};
use serde_json::{Map, Number, Value as JsonValue};
use serde_yml::Value as YamlValue;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Build a value graph from a JSON document.
///
/// Objects become plain objects with the bare prototype, numbers become
/// `f64`.
pub fn from_json(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::array(items.iter().map(from_json)),
        JsonValue::Object(map) => Value::plain(
            map.iter()
                .map(|(key, value)| (key.as_str(), from_json(value))),
        ),
    }
}

/// Build a value graph from a YAML document.
///
/// Mirrors [`from_json`]; `.nan`, `.inf` and `-.inf` stay non-finite
/// numbers. Non-string mapping keys become their scalar text.
pub fn from_yaml(yaml: YamlValue) -> Value {
    match yaml {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(seq) => Value::array(seq.into_iter().map(from_yaml)),
        YamlValue::Mapping(map) => {
            Value::plain(map.into_iter().map(|(k, v)| (yaml_key(k), from_yaml(v))))
        }
        YamlValue::Tagged(tagged) => from_yaml(tagged.value),
    }
}

/// Render a value graph as JSON.
///
/// Follows host stringification where it has an answer: `undefined`,
/// functions and symbols are dropped from objects and become `null` in
/// arrays, non-finite numbers become `null`, dates become RFC 3339 strings.
/// Maps render as `[key, value]` pairs and sets, typed arrays and boxed
/// primitives as their contents. Cycles, big integers and opaque built-ins
/// are [`RDeepError::Unrepresentable`].
pub fn to_json(value: &Value) -> Result<JsonValue> {
    let mut ancestors = HashSet::new();
    Ok(render(value, &mut ancestors)?.unwrap_or(JsonValue::Null))
}

/// Parse a JSON or YAML file, chosen by extension
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;

    if is_yaml_file(path) {
        debug!("Parsing {} as YAML", path.display());
        let yaml: YamlValue = serde_yml::from_str(&content)
            .map_err(|e| RDeepError::Parse(format!("{}: {}", path.display(), e)))?;
        return Ok(from_yaml(yaml));
    }

    if !is_json_file(path) {
        debug!("Unknown extension for {}, trying JSON", path.display());
    }
    let json: JsonValue = serde_json::from_str(&content)
        .map_err(|e| RDeepError::Parse(format!("{}: {}", path.display(), e)))?;
    Ok(from_json(&json))
}

/// Check if a file path appears to be JSON based on extension
pub fn is_json_file(path: &Path) -> bool {
    if let Some(ext) = path.extension() {
        let ext = ext.to_string_lossy().to_lowercase();
        matches!(ext.as_str(), "json" | "jsonc" | "json5")
    } else {
        false
    }
}

/// Check if a file path appears to be YAML based on extension
pub fn is_yaml_file(path: &Path) -> bool {
    if let Some(ext) = path.extension() {
        let ext = ext.to_string_lossy().to_lowercase();
        matches!(ext.as_str(), "yaml" | "yml")
    } else {
        false
    }
}

/// `None` means "no JSON representation" (dropped from objects)
fn render(value: &Value, ancestors: &mut HashSet<ObjectId>) -> Result<Option<JsonValue>> {
    let object = match value {
        Value::Undefined | Value::Function(_) | Value::Symbol(_) => return Ok(None),
        Value::Null => return Ok(Some(JsonValue::Null)),
        Value::Bool(b) => return Ok(Some(JsonValue::Bool(*b))),
        Value::Number(n) => return Ok(Some(number(*n))),
        Value::BigInt(_) => {
            return Err(RDeepError::Unrepresentable("bigint".to_string()));
        }
        Value::String(s) => return Ok(Some(JsonValue::String(s.clone()))),
        Value::Object(object) => object,
    };

    if !ancestors.insert(object.id()) {
        return Err(RDeepError::Unrepresentable("cyclic structure".to_string()));
    }

    let rendered = {
        let borrowed = object.borrow();
        render_object(&borrowed, ancestors)
    };
    ancestors.remove(&object.id());
    rendered.map(Some)
}

fn render_object(object: &Object, ancestors: &mut HashSet<ObjectId>) -> Result<JsonValue> {
    match object {
        Object::Array(items) => render_items(items.iter(), ancestors),
        Object::Plain(plain) if !crate::is_atomic(object, crate::classify(object)) => {
            let mut map = Map::new();
            for (key, value) in plain.entries() {
                let Some(key) = key.as_str() else { continue };
                if let Some(rendered) = render(value, ancestors)? {
                    map.insert(key.to_string(), rendered);
                }
            }
            Ok(JsonValue::Object(map))
        }
        Object::Map(map) => {
            let mut pairs = Vec::with_capacity(map.len());
            for (key, value) in map.iter() {
                let key = render(key, ancestors)?.unwrap_or(JsonValue::Null);
                let value = render(value, ancestors)?.unwrap_or(JsonValue::Null);
                pairs.push(JsonValue::Array(vec![key, value]));
            }
            Ok(JsonValue::Array(pairs))
        }
        Object::Set(set) => render_items(set.iter(), ancestors),
        Object::Date(date) => Ok(date
            .to_datetime()
            .map(|dt| JsonValue::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)))
            .unwrap_or(JsonValue::Null)),
        Object::Pattern(pattern) => Ok(JsonValue::String(pattern.to_string())),
        Object::Boxed(boxed) => Ok(render(&boxed.primitive(), ancestors)?.unwrap_or(JsonValue::Null)),
        Object::TypedArray(array) => render_items(array.to_values().iter(), ancestors),
        other => Err(RDeepError::Unrepresentable(other.tag().to_string())),
    }
}

fn render_items<'v>(
    items: impl Iterator<Item = &'v Value>,
    ancestors: &mut HashSet<ObjectId>,
) -> Result<JsonValue> {
    let mut rendered = Vec::new();
    for item in items {
        rendered.push(render(item, ancestors)?.unwrap_or(JsonValue::Null));
    }
    Ok(JsonValue::Array(rendered))
}

fn number(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return JsonValue::Number(Number::from(n as i64));
    }
    Number::from_f64(n)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

fn yaml_key(key: YamlValue) -> String {
    match key {
        YamlValue::String(s) => s,
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Tagged(tagged) => yaml_key(tagged.value),
        other => serde_yml::to_string(&other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_default(),
    }
}
