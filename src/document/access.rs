use serde_json::Value;

/// Follow `path` through nested objects.
///
/// Returns `None` as soon as a segment is missing or the current value is
/// not an object.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
}

/// Mutable counterpart of [`lookup`].
pub fn lookup_mut<'a>(value: &'a mut Value, path: &[&str]) -> Option<&'a mut Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object_mut()?.get_mut(*key))
}

/// String value at `path`, if there is one.
pub fn lookup_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path)?.as_str()
}

/// First non-empty string found among `paths`, in order.
pub fn first_str<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a str> {
    paths
        .iter()
        .filter_map(|path| lookup_str(value, path))
        .find(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested() {
        let doc = json!({"attributes": {"visState": {"type": "line"}}});
        assert_eq!(
            lookup_str(&doc, &["attributes", "visState", "type"]),
            Some("line")
        );
        assert!(lookup(&doc, &["attributes", "missing"]).is_none());
    }

    #[test]
    fn test_lookup_through_non_object() {
        let doc = json!({"attributes": {"visState": "{\"type\":\"line\"}"}});
        assert!(lookup(&doc, &["attributes", "visState", "type"]).is_none());
        assert!(lookup_str(&doc, &["attributes"]).is_none());
    }

    #[test]
    fn test_lookup_empty_path_is_root() {
        let doc = json!([1, 2]);
        assert_eq!(lookup(&doc, &[]), Some(&doc));
    }

    #[test]
    fn test_lookup_mut_replaces() {
        let mut doc = json!({"attributes": {"title": "old"}});
        if let Some(title) = lookup_mut(&mut doc, &["attributes", "title"]) {
            *title = json!("new");
        }
        assert_eq!(lookup_str(&doc, &["attributes", "title"]), Some("new"));
    }

    #[test]
    fn test_first_str_skips_empty() {
        let doc = json!({"title": "", "embeddableConfig": {"title": "Panel"}});
        assert_eq!(
            first_str(&doc, &[&["title"], &["embeddableConfig", "title"]]),
            Some("Panel")
        );
        assert_eq!(first_str(&doc, &[&["nope"]]), None);
    }
}
