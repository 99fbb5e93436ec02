/// Nested-JSON field decoding for saved objects.
///
/// Older saved objects store several attributes as JSON-encoded strings.
/// These are decoded in place into structured values so the whole document
/// can be indexed as one tree. The vis filter fields go the other way:
/// downstream mappings expect them as strings in every schema generation.
use serde_json::{Map, Value};

use super::access::lookup_mut;

/// Attribute paths whose string values hold encoded JSON objects.
pub const ENCODED_FIELDS: &[&[&str]] = &[
    &["attributes", "uiStateJSON"],
    &["attributes", "visState"],
    &["attributes", "kibanaSavedObjectMeta", "searchSourceJSON"],
];

/// Decode nested JSON fields in place and re-encode vis filters.
///
/// Fields that are absent, already structured, or not valid JSON objects
/// are left untouched. Applying this twice yields the same document as
/// applying it once.
pub fn normalize_document(doc: &mut Value) {
    for path in ENCODED_FIELDS {
        if let Some(field) = lookup_mut(doc, path) {
            decode_in_place(field);
        }
    }

    let Some(Value::Object(vis_state)) = lookup_mut(doc, &["attributes", "visState"]) else {
        return;
    };
    let Some(Value::Object(params)) = vis_state.get_mut("params") else {
        return;
    };

    encode_filter(params);
    if let Some(Value::Array(series)) = params.get_mut("series") {
        for entry in series.iter_mut().filter_map(Value::as_object_mut) {
            encode_filter(entry);
        }
    }
}

/// Replace a string holding a JSON object with the decoded object.
fn decode_in_place(field: &mut Value) {
    let Value::String(raw) = field else {
        return;
    };
    if let Ok(decoded @ Value::Object(_)) = serde_json::from_str::<Value>(raw) {
        *field = decoded;
    }
}

/// Turn a present, non-string `filter` into its JSON text.
fn encode_filter(container: &mut Map<String, Value>) {
    let Some(filter) = container.get_mut("filter") else {
        return;
    };
    if filter.is_string() {
        return;
    }
    *filter = Value::String(filter.to_string());
}
