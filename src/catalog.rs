//! Splits a provider's model listing into the two catalogs the client offers.

use serde_json::Value;

pub const TEXT_VISION_PREFIXES: &[&str] = &[
    "gpt", "claude", "llama", "mixtral", "mistral", "llava", "gemma", "phind", "gemini",
];

pub const IMAGE_GEN_PREFIXES: &[&str] = &["dall", "stable", "realistic"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelCatalogs {
    pub text_vision: Vec<String>,
    pub image_gen: Vec<String>,
}

impl ModelCatalogs {
    pub fn is_empty(&self) -> bool {
        self.text_vision.is_empty() && self.image_gen.is_empty()
    }

    fn push(&mut self, id: &str) {
        let target = if has_prefix(id, TEXT_VISION_PREFIXES) {
            &mut self.text_vision
        } else if has_prefix(id, IMAGE_GEN_PREFIXES) {
            &mut self.image_gen
        } else {
            return;
        };
        if !target.iter().any(|existing| existing == id) {
            target.push(id.to_string());
        }
    }
}

fn has_prefix(id: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| id.starts_with(prefix))
}

/// Partitions a `/models` response body.
///
/// Accepts `{"data": [{"id": ...}, ...]}` and the flat `{"<id>": {...}}`
/// shape where only entries whose metadata carries `is_free` or `type`
/// count as models. Anything else yields empty catalogs.
pub fn partition(body: &Value) -> ModelCatalogs {
    let mut catalogs = ModelCatalogs::default();
    let Some(object) = body.as_object() else {
        return catalogs;
    };

    if let Some(data) = object.get("data") {
        if let Some(entries) = data.as_array() {
            for id in entries
                .iter()
                .filter_map(|entry| entry.get("id").and_then(Value::as_str))
            {
                catalogs.push(id);
            }
        }
        return catalogs;
    }

    for (id, metadata) in object {
        let Some(metadata) = metadata.as_object() else {
            continue;
        };
        if metadata.contains_key("is_free") || metadata.contains_key("type") {
            catalogs.push(id);
        }
    }
    catalogs
}

/// Resolves `/model` arguments: a 1-based index into the catalog or a raw id.
pub fn resolve_choice(catalog: &[String], choice: &str) -> String {
    let choice = choice.trim();
    choice
        .parse::<usize>()
        .ok()
        .and_then(|index| index.checked_sub(1))
        .and_then(|index| catalog.get(index))
        .cloned()
        .unwrap_or_else(|| choice.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_array_shape_is_partitioned_by_prefix() {
        let body = json!({
            "object": "list",
            "data": [
                {"id": "gpt-4", "object": "model"},
                {"id": "stable-diffusion-xl"},
                {"id": "foo-bar"},
                {"id": "claude-3-opus"},
                {"id": "dall-e-3"},
                {"object": "model"}
            ]
        });
        let catalogs = partition(&body);
        assert_eq!(catalogs.text_vision, vec!["gpt-4", "claude-3-opus"]);
        assert_eq!(catalogs.image_gen, vec!["stable-diffusion-xl", "dall-e-3"]);
    }

    #[test]
    fn flat_mapping_shape_requires_known_metadata() {
        let body = json!({
            "llama-3-70b": {"is_free": true},
            "realistic-vision": {"type": "image"},
            "mistral-large": {"owner": "someone"},
            "gemini-pro": "not an object"
        });
        let catalogs = partition(&body);
        assert_eq!(catalogs.text_vision, vec!["llama-3-70b"]);
        assert_eq!(catalogs.image_gen, vec!["realistic-vision"]);
    }

    #[test]
    fn prefixes_are_case_sensitive() {
        let body = json!({"data": [{"id": "GPT-4"}, {"id": "Stable-x"}]});
        assert!(partition(&body).is_empty());
    }

    #[test]
    fn malformed_shapes_yield_empty_catalogs() {
        assert!(partition(&json!([{"id": "gpt-4"}])).is_empty());
        assert!(partition(&json!({"data": {"id": "gpt-4"}})).is_empty());
        assert!(partition(&json!("gpt-4")).is_empty());
        assert!(partition(&Value::Null).is_empty());
    }

    #[test]
    fn duplicate_ids_are_listed_once() {
        let body = json!({"data": [{"id": "gpt-4"}, {"id": "gpt-4"}]});
        assert_eq!(partition(&body).text_vision, vec!["gpt-4"]);
    }

    #[test]
    fn resolve_choice_accepts_index_or_id() {
        let catalog = vec!["gpt-4".to_string(), "gpt-4o".to_string()];
        assert_eq!(resolve_choice(&catalog, "2"), "gpt-4o");
        assert_eq!(resolve_choice(&catalog, "0"), "0");
        assert_eq!(resolve_choice(&catalog, " llava-13b "), "llava-13b");
    }
}
