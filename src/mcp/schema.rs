//! Argument handling shared by tools and prompts.

use jsonschema::JSONSchema;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Fill in `default` values declared on top-level properties.
///
/// A `null` argument value is treated as an empty object.
pub fn apply_defaults(schema: &Value, args: Value) -> Value {
    let mut args = match args {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };

    if let (Some(obj), Some(props)) = (
        args.as_object_mut(),
        schema.get("properties").and_then(Value::as_object),
    ) {
        for (name, prop) in props {
            if let Some(default) = prop.get("default") {
                obj.entry(name.clone()).or_insert_with(|| default.clone());
            }
        }
    }
    args
}

/// Check `args` against `schema`, collecting every violation into one error
pub fn validate(schema: &Value, args: &Value) -> Result<()> {
    let compiled = JSONSchema::compile(schema)
        .map_err(|e| Error::SchemaValidation(format!("invalid schema: {}", e)))?;

    if let Err(errors) = compiled.validate(args) {
        let messages: Vec<String> = errors.map(|e| e.to_string()).collect();
        return Err(Error::SchemaValidation(messages.join("; ")));
    }
    Ok(())
}

/// Interpret a textual argument by the JSON type its property declares.
///
/// Only `integer`, `number` and `boolean` properties are converted; text
/// that does not parse stays a string so validation can report it.
pub fn coerce_argument(declared: Option<&str>, raw: &str) -> Value {
    let parsed = match declared {
        Some("integer") => raw.parse::<i64>().ok().map(Value::from),
        Some("number") => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        Some("boolean") => raw.parse::<bool>().ok().map(Value::Bool),
        _ => None,
    };
    parsed.unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Build an argument object from string pairs, typed by `schema`'s
/// top-level properties
pub fn coerce_arguments<I, K, V>(schema: &Value, pairs: I) -> Value
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    let properties = schema.get("properties");
    Value::Object(
        pairs
            .into_iter()
            .map(|(k, v)| {
                let key = k.into();
                let declared = properties
                    .and_then(|p| p.get(&key))
                    .and_then(|p| p.get("type"))
                    .and_then(Value::as_str);
                let value = coerce_argument(declared, v.as_ref());
                (key, value)
            })
            .collect(),
    )
}

/// A resource URI template with `{name}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    template: String,
}

impl UriTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Templates without placeholders match a single URI
    pub fn is_static(&self) -> bool {
        !self.template.contains('{')
    }

    /// Match a concrete URI, returning percent-decoded placeholder values.
    ///
    /// A placeholder matches one or more characters up to the next literal
    /// segment of the template; it never matches `/`.
    pub fn matches(&self, uri: &str) -> Option<HashMap<String, String>> {
        let mut params = HashMap::new();
        let mut rest_template = self.template.as_str();
        let mut rest_uri = uri;

        loop {
            match rest_template.find('{') {
                None => return (rest_template == rest_uri).then_some(params),
                Some(open) => {
                    let literal = &rest_template[..open];
                    rest_uri = rest_uri.strip_prefix(literal)?;

                    let close = rest_template[open..].find('}')? + open;
                    let name = &rest_template[open + 1..close];
                    rest_template = &rest_template[close + 1..];

                    let next_literal_end = rest_template.find('{').unwrap_or(rest_template.len());
                    let next_literal = &rest_template[..next_literal_end];
                    let end = if next_literal.is_empty() {
                        rest_uri.len()
                    } else {
                        rest_uri.find(next_literal)?
                    };

                    let raw = &rest_uri[..end];
                    if raw.is_empty() || raw.contains('/') {
                        return None;
                    }
                    let value = urlencoding::decode(raw).ok()?.into_owned();
                    params.insert(name.to_string(), value);
                    rest_uri = &rest_uri[end..];
                }
            }
        }
    }
}
