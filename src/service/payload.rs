//! Request payloads: plain JSON objects plus the allow/deny-list helpers the
//! operations use to shape them.

use serde_json::{Map, Value};

/// A request object as the page layer hands it to an operation.
pub type Payload = Map<String, Value>;

/// Keeps only the listed keys. Missing keys are simply absent from the result.
#[must_use]
pub fn pick(payload: &Payload, keys: &[&str]) -> Payload {
    keys.iter()
        .filter_map(|key| payload.get(*key).map(|value| ((*key).to_string(), value.clone())))
        .collect()
}

/// Drops the listed keys and keeps everything else.
#[must_use]
pub fn omit(payload: &Payload, keys: &[&str]) -> Payload {
    payload
        .iter()
        .filter(|(key, _)| !keys.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Reads an identifier-like field. Strings and numbers count; empty strings,
/// `null`, booleans and containers do not.
#[must_use]
pub fn id_field(payload: &Payload, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Builds a payload carrying a single `kb_id`, or an empty one.
#[must_use]
pub fn kb_payload(kb_id: Option<&str>) -> Payload {
    let mut payload = Payload::new();
    if let Some(kb_id) = kb_id {
        payload.insert("kb_id".to_string(), Value::String(kb_id.to_string()));
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn pick_ignores_missing_keys() {
        let p = payload(json!({"doc_id": "d1", "status": "0", "kb_id": "k1"}));
        assert_eq!(pick(&p, &["doc_id", "status"]), payload(json!({"doc_id": "d1", "status": "0"})));
        assert_eq!(pick(&p, &["nope"]), Payload::new());
    }

    #[test]
    fn omit_keeps_the_rest() {
        let p = payload(json!({"doc_id": "d1", "name": "b.txt", "kb_id": "k1"}));
        assert_eq!(omit(&p, &["kb_id"]), payload(json!({"doc_id": "d1", "name": "b.txt"})));
    }

    #[test]
    fn id_field_treats_empty_as_absent() {
        let p = payload(json!({"a": "", "b": "kb", "c": 7, "d": null, "e": true}));
        assert_eq!(id_field(&p, "a"), None);
        assert_eq!(id_field(&p, "b").as_deref(), Some("kb"));
        assert_eq!(id_field(&p, "c").as_deref(), Some("7"));
        assert_eq!(id_field(&p, "d"), None);
        assert_eq!(id_field(&p, "e"), None);
        assert_eq!(id_field(&p, "missing"), None);
    }
}
