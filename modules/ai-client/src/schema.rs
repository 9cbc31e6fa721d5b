use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

/// A type the model can be asked to produce under a strict JSON schema.
///
/// Blanket-implemented for anything that is `JsonSchema + DeserializeOwned`.
/// The generated schema is massaged into the subset OpenAI's structured
/// output accepts: every object closes `additionalProperties`, every property
/// is required, and `$ref`s into `definitions` are inlined.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    fn response_schema() -> serde_json::Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        let definitions = value.get("definitions").cloned();
        conform(&mut value, definitions.as_ref());

        if let serde_json::Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }

        value
    }

    fn schema_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

/// One recursive pass that resolves refs, collapses single-entry `allOf`
/// wrappers, closes object schemas and marks all properties required.
fn conform(value: &mut serde_json::Value, definitions: Option<&serde_json::Value>) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(path)) = map.get("$ref").cloned() {
                if let Some(resolved) = definitions.and_then(|defs| {
                    path.strip_prefix("#/definitions/").and_then(|name| defs.get(name))
                }) {
                    *value = resolved.clone();
                    conform(value, definitions);
                    return;
                }
            }

            if let Some(serde_json::Value::Array(all_of)) = map.get("allOf").cloned() {
                if all_of.len() == 1 {
                    *value = all_of.into_iter().next().unwrap();
                    conform(value, definitions);
                    return;
                }
            }

            if map.get("type") == Some(&serde_json::Value::String("object".into())) {
                map.insert("additionalProperties".into(), serde_json::Value::Bool(false));
                if let Some(serde_json::Value::Object(props)) = map.get("properties") {
                    let required: Vec<serde_json::Value> = props
                        .keys()
                        .map(|k| serde_json::Value::String(k.clone()))
                        .collect();
                    map.insert("required".into(), serde_json::Value::Array(required));
                }
            }

            for (_, v) in map.iter_mut() {
                conform(v, definitions);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items.iter_mut() {
                conform(item, definitions);
            }
        }
        _ => {}
    }
}
