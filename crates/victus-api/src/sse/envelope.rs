// ── Change-event envelopes ──
//
// Servers announce changes either as named events (`event: CREATED`)
// or as generic messages with the discriminant inline
// (`{"tipo": "CREATED", "data": {...}}`).

use serde_json::Value;

use super::decoder::SseFrame;
use crate::error::Error;

/// The kind of change an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("CREATED") {
            Some(Self::Created)
        } else if raw.eq_ignore_ascii_case("UPDATED") {
            Some(Self::Updated)
        } else if raw.eq_ignore_ascii_case("DELETED") {
            Some(Self::Deleted)
        } else {
            None
        }
    }
}

/// Inline discriminant fields, in priority order.
const DISCRIMINANT_KEYS: &[&str] = &["tipo", "type"];

/// Payload wrapper keys, in priority order. When none is present the
/// whole message is the payload.
const PAYLOAD_KEYS: &[&str] = &["data", "payload", "conjunto", "vivienda"];

/// Interpret a decoded frame.
///
/// Returns `Ok(None)` for frames that are not change events (heartbeats,
/// unknown discriminants, custom event names).
pub(crate) fn parse_frame(frame: &SseFrame) -> Result<Option<(ChangeKind, Value)>, Error> {
    let named = match frame.event.as_deref() {
        None | Some("message") => None,
        Some(name) => match ChangeKind::parse(name) {
            Some(kind) => Some(kind),
            None => return Ok(None),
        },
    };

    let message: Value = serde_json::from_str(&frame.data).map_err(|e| Error::EventParse {
        message: format!("{e} (data: {:?})", frame.data.chars().take(120).collect::<String>()),
    })?;

    let kind = match named {
        Some(kind) => kind,
        None => {
            let inline = DISCRIMINANT_KEYS
                .iter()
                .find_map(|key| message.get(*key).and_then(Value::as_str));
            match inline.and_then(ChangeKind::parse) {
                Some(kind) => kind,
                None => return Ok(None),
            }
        }
    };

    Ok(Some((kind, extract_payload(message))))
}

fn extract_payload(message: Value) -> Value {
    if let Value::Object(ref map) = message {
        for key in PAYLOAD_KEYS {
            if let Some(inner) = map.get(*key).filter(|v| !v.is_null()) {
                return inner.clone();
            }
        }
    }
    message
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(event: Option<&str>, data: &str) -> SseFrame {
        SseFrame {
            event: event.map(String::from),
            data: data.into(),
            id: None,
        }
    }

    #[test]
    fn named_event_unwraps_data() {
        let f = frame(Some("UPDATED"), r#"{"tipo":"UPDATED","data":{"id":"1","nombre":"Antioquia"}}"#);
        let (kind, payload) = parse_frame(&f).unwrap().unwrap();
        assert_eq!(kind, ChangeKind::Updated);
        assert_eq!(payload, json!({ "id": "1", "nombre": "Antioquia" }));
    }

    #[test]
    fn named_event_with_bare_entity() {
        let f = frame(Some("CREATED"), r#"{"id":"9","nombre":"Cali"}"#);
        let (kind, payload) = parse_frame(&f).unwrap().unwrap();
        assert_eq!(kind, ChangeKind::Created);
        assert_eq!(payload["nombre"], "Cali");
    }

    #[test]
    fn generic_message_with_inline_tipo_and_payload() {
        let f = frame(None, r#"{"tipo":"DELETED","payload":{"id":3}}"#);
        let (kind, payload) = parse_frame(&f).unwrap().unwrap();
        assert_eq!(kind, ChangeKind::Deleted);
        assert_eq!(payload, json!({ "id": 3 }));
    }

    #[test]
    fn generic_message_with_type_and_wrapper_key() {
        let f = frame(Some("message"), r#"{"type":"created","conjunto":{"id":"c1"}}"#);
        let (kind, payload) = parse_frame(&f).unwrap().unwrap();
        assert_eq!(kind, ChangeKind::Created);
        assert_eq!(payload, json!({ "id": "c1" }));
    }

    #[test]
    fn deleted_with_bare_id() {
        let f = frame(Some("DELETED"), r#"{"data":"42"}"#);
        let (_, payload) = parse_frame(&f).unwrap().unwrap();
        assert_eq!(payload, json!("42"));
    }

    #[test]
    fn unknown_discriminant_is_ignored() {
        assert!(parse_frame(&frame(None, r#"{"tipo":"PING"}"#)).unwrap().is_none());
        assert!(parse_frame(&frame(None, r#"{"id":1}"#)).unwrap().is_none());
        assert!(parse_frame(&frame(Some("heartbeat"), "not json")).unwrap().is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_frame(&frame(None, "{oops")).unwrap_err();
        assert!(matches!(err, Error::EventParse { .. }));
    }
}
