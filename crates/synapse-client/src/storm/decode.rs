//! Decoder for newline-delimited Storm envelopes.
//!
//! Tolerant reader: a line that cannot be classified or decoded is logged
//! and skipped, it never takes the rest of the stream down with it.

use serde::de::DeserializeOwned;
use serde_json::{Deserializer, Value};
use thiserror::Error;
use tracing::debug;

use super::message::{MessageKind, NodeInfo, NodeMessage, StormMessage, StormResults};
use crate::error::{Error, Result};

/// Why a single line or envelope was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Not JSON, not an array, too short, or the tag is not a string.
    #[error("malformed envelope: {0}")]
    MalformedLine(String),

    /// The tag is a string outside the recognized set.
    #[error("unknown message tag '{0}'")]
    UnknownTag(String),

    /// The payload does not have the shape required by its tag.
    #[error("{kind} payload does not match schema: {reason}")]
    SchemaMismatch { kind: MessageKind, reason: String },
}

/// What to do when a recognized envelope carries a bad payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemaPolicy {
    /// Skip the envelope and keep decoding.
    #[default]
    Skip,
    /// Abort the whole decode with [`Error::Decode`].
    Fail,
}

/// Decode a complete Storm response body.
///
/// Malformed lines, unknown tags and schema mismatches are skipped. The only
/// failure is a body that is not UTF-8.
pub fn decode(raw: &[u8]) -> Result<StormResults> {
    decode_with(raw, SchemaPolicy::Skip)
}

/// Decode a complete Storm response body with an explicit schema policy.
///
/// Malformed lines and unknown tags are skipped under either policy.
pub fn decode_with(raw: &[u8], policy: SchemaPolicy) -> Result<StormResults> {
    let text = std::str::from_utf8(raw)?;
    let mut results = StormResults::default();

    for (index, line) in text.split('\n').enumerate() {
        let line_no = index + 1;
        for decoded in decode_line(line) {
            match decoded {
                Ok(message) => results.push(message),
                Err(source @ DecodeError::SchemaMismatch { .. })
                    if policy == SchemaPolicy::Fail =>
                {
                    return Err(Error::Decode {
                        line: line_no,
                        source,
                    });
                }
                Err(e) => {
                    debug!(line = line_no, error = %e, "Skipping storm message");
                    results.skipped += 1;
                }
            }
        }
    }

    Ok(results)
}

/// Decode every envelope on one line.
///
/// A line normally holds a single envelope, but a chunked transport can
/// glue several together. Decoding stops at the first JSON syntax error.
/// A blank line yields nothing.
pub fn decode_line(line: &str) -> Vec<std::result::Result<StormMessage, DecodeError>> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }

    let mut decoded = Vec::new();
    for value in Deserializer::from_str(line).into_iter::<Value>() {
        match value {
            Ok(value) => decoded.push(decode_envelope(value)),
            Err(e) => {
                decoded.push(Err(DecodeError::MalformedLine(e.to_string())));
                break;
            }
        }
    }
    decoded
}

/// Classify one parsed envelope and decode its payload.
pub fn decode_envelope(value: Value) -> std::result::Result<StormMessage, DecodeError> {
    let (kind, payload) = classify(value)?;
    match kind {
        MessageKind::Init => decode_object(kind, payload).map(StormMessage::Init),
        MessageKind::Node => decode_node(payload).map(StormMessage::Node),
        MessageKind::Print => decode_object(kind, payload).map(StormMessage::Print),
        MessageKind::Fini => decode_object(kind, payload).map(StormMessage::Fini),
    }
}

/// Split `[tag, payload, ...]` into its kind and payload.
fn classify(value: Value) -> std::result::Result<(MessageKind, Value), DecodeError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(DecodeError::MalformedLine(format!(
                "expected an array, found {}",
                describe(&other)
            )));
        }
    };

    if items.len() < 2 {
        return Err(DecodeError::MalformedLine(format!(
            "envelope has {} element(s), expected at least 2",
            items.len()
        )));
    }

    let mut items = items.into_iter();
    let tag = match items.next() {
        Some(Value::String(tag)) => tag,
        Some(other) => {
            return Err(DecodeError::MalformedLine(format!(
                "envelope tag is {}, expected a string",
                describe(&other)
            )));
        }
        None => return Err(DecodeError::MalformedLine("empty envelope".to_string())),
    };

    let Some(kind) = MessageKind::from_tag(&tag) else {
        return Err(DecodeError::UnknownTag(tag));
    };

    Ok((kind, items.next().unwrap_or_default()))
}

/// Decode an object payload into its record type.
fn decode_object<T: DeserializeOwned>(
    kind: MessageKind,
    payload: Value,
) -> std::result::Result<T, DecodeError> {
    if !payload.is_object() {
        return Err(mismatch(
            kind,
            format!("expected an object, found {}", describe(&payload)),
        ));
    }
    serde_json::from_value(payload).map_err(|e| mismatch(kind, e.to_string()))
}

/// Decode a `[pairs, info]` node payload.
fn decode_node(payload: Value) -> std::result::Result<NodeMessage, DecodeError> {
    let parts = match payload {
        Value::Array(parts) if parts.len() >= 2 => parts,
        other => {
            return Err(mismatch(
                MessageKind::Node,
                format!("expected [pairs, info], found {}", describe(&other)),
            ));
        }
    };

    let mut parts = parts.into_iter();
    let pairs = decode_pairs(parts.next().unwrap_or_default())?;
    let info: NodeInfo = decode_object(MessageKind::Node, parts.next().unwrap_or_default())?;

    Ok(NodeMessage { pairs, info })
}

fn decode_pairs(value: Value) -> std::result::Result<Vec<(String, String)>, DecodeError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(mismatch(
                MessageKind::Node,
                format!("expected an array of pairs, found {}", describe(&other)),
            ));
        }
    };

    items
        .into_iter()
        .map(|pair| match pair {
            Value::Array(pair) => match <[Value; 2]>::try_from(pair) {
                Ok([key, value]) => Ok((coerce(key), coerce(value))),
                Err(pair) => Err(mismatch(
                    MessageKind::Node,
                    format!("pair has {} element(s), expected 2", pair.len()),
                )),
            },
            other => Err(mismatch(
                MessageKind::Node,
                format!("expected a pair, found {}", describe(&other)),
            )),
        })
        .collect()
}

/// String form of a loosely typed value.
///
/// Strings pass through, booleans and null read `True`/`False`/`None` as the
/// Python client prints them, and numbers and compound values use their
/// compact JSON text.
pub(crate) fn coerce(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

fn mismatch(kind: MessageKind, reason: String) -> DecodeError {
    DecodeError::SchemaMismatch { kind, reason }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storm::message::{FiniMessage, InitMessage, PrintMessage};

    const INIT: &str =
        r#"["init", {"tick": 1, "text": "t", "abstick": 2, "hash": "h", "task": "tsk"}]"#;
    const NODE: &str = r#"["node", [[["foo", "bar"]], {"iden": "id", "tags": {}, "props": {}, "tagprops": {}, "nodedata": {}, "path": {}}]]"#;
    const FINI: &str = r#"["fini", {"tock": 1, "abstock": 1, "took": 1, "count": 1}]"#;

    fn node_line(iden: &str) -> String {
        format!(
            r#"["node", [[["inet:fqdn", "{iden}"]], {{"iden": "{iden}", "tags": {{}}, "props": {{}}, "tagprops": {{}}, "nodedata": {{}}, "path": {{}}}}]]"#
        )
    }

    #[test]
    fn test_decode_init_node_fini() {
        let body = format!("{INIT}\n{NODE}\n{FINI}\n");
        let results = decode(body.as_bytes()).unwrap();

        assert_eq!(
            results.inits,
            vec![InitMessage {
                tick: 1,
                text: "t".to_string(),
                abstick: 2,
                hash: "h".to_string(),
                task: "tsk".to_string(),
            }]
        );
        assert_eq!(results.nodes.len(), 1);
        assert_eq!(
            results.nodes[0].pairs,
            vec![("foo".to_string(), "bar".to_string())]
        );
        assert_eq!(results.nodes[0].info.iden, "id");
        assert_eq!(
            results.finis,
            vec![FiniMessage {
                tock: 1,
                abstock: 1,
                took: 1,
                count: 1,
            }]
        );
        assert!(results.prints.is_empty());
        assert_eq!(results.skipped, 0);
    }

    #[test]
    fn test_decode_print() {
        let body = b"[\"print\", {\"mesg\":\"hello\"}]\n[\"fini\", {\"tock\":1,\"abstock\":1,\"took\":0,\"count\":0}]\n";
        let results = decode(body).unwrap();

        assert_eq!(
            results.prints,
            vec![PrintMessage {
                message: "hello".to_string()
            }]
        );
        assert_eq!(results.finis[0].count, 0);
    }

    #[test]
    fn test_empty_buffer() {
        let results = decode(b"").unwrap();
        assert!(results.is_empty());
        assert_eq!(results.skipped, 0);
    }

    #[test]
    fn test_non_array_line_is_skipped() {
        let body = format!("{{\"a\":1}}\n{FINI}\n");
        let results = decode(body.as_bytes()).unwrap();

        assert!(results.inits.is_empty());
        assert!(results.nodes.is_empty());
        assert!(results.prints.is_empty());
        assert_eq!(results.finis.len(), 1);
        assert_eq!(results.skipped, 1);
    }

    #[test]
    fn test_skippable_lines_never_fail() {
        let body = [
            "not json at all",
            "[]",
            r#"["init"]"#,
            r#"[1, {}]"#,
            r#"["warn", {"mesg": "careful"}]"#,
            r#"["init", {"tick": "soon"}]"#,
            r#"["node", {"iden": "x"}]"#,
            r#"["print", "bare string"]"#,
            "[\"fini\", {\"tock\": 1",
            FINI,
        ]
        .join("\n");

        let results = decode(body.as_bytes()).unwrap();
        assert_eq!(results.finis.len(), 1);
        assert!(results.inits.is_empty());
        assert!(results.nodes.is_empty());
        assert!(results.prints.is_empty());
        assert_eq!(results.skipped, 9);
    }

    #[test]
    fn test_node_order_preserved_across_kinds() {
        let body = [
            INIT.to_string(),
            node_line("a"),
            r#"["print", {"mesg": "one"}]"#.to_string(),
            node_line("b"),
            "garbage".to_string(),
            node_line("c"),
            r#"["print", {"mesg": "two"}]"#.to_string(),
            node_line("d"),
            FINI.to_string(),
        ]
        .join("\n");

        let results = decode(body.as_bytes()).unwrap();
        let idens: Vec<_> = results.nodes.iter().map(|n| n.info.iden.as_str()).collect();
        assert_eq!(idens, ["a", "b", "c", "d"]);
        let prints: Vec<_> = results.prints.iter().map(|p| p.message.as_str()).collect();
        assert_eq!(prints, ["one", "two"]);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let body = format!("{INIT}\n{NODE}\nnoise\n{FINI}");
        assert_eq!(
            decode(body.as_bytes()).unwrap(),
            decode(body.as_bytes()).unwrap()
        );
    }

    #[test]
    fn test_invalid_utf8_is_a_hard_failure() {
        let err = decode(&[b'[', 0xff, 0xfe, b']']).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_pair_components_are_coerced_to_strings() {
        let line = r#"["node", [[["inet:ipv4", 16909060], ["flag", true], ["none", null], ["comp", [1, "a"]]], {"iden": "x"}]]"#;
        let decoded = decode_line(line);
        let Ok(StormMessage::Node(node)) = &decoded[0] else {
            panic!("expected a node, got {decoded:?}");
        };
        assert_eq!(
            node.pairs,
            vec![
                ("inet:ipv4".to_string(), "16909060".to_string()),
                ("flag".to_string(), "True".to_string()),
                ("none".to_string(), "None".to_string()),
                ("comp".to_string(), r#"[1,"a"]"#.to_string()),
            ]
        );
        assert!(node.info.tags.is_empty());
    }

    #[test]
    fn test_node_info_fields() {
        let line = r#"["node", [[["inet:fqdn", "vertex.link"]], {"iden": "abc", "tags": {"rep.foo": "x"}, "props": {".created": 1700000000000, "zone": "vertex.link"}, "tagprops": {}, "nodedata": {"k": "v"}, "path": {"p": "q"}}]]"#;
        let decoded = decode_line(line);
        let Ok(StormMessage::Node(node)) = &decoded[0] else {
            panic!("expected a node, got {decoded:?}");
        };
        assert_eq!(node.info.tags["rep.foo"], "x");
        assert_eq!(node.info.props[".created"], serde_json::json!(1700000000000i64));
        assert_eq!(node.info.nodedata["k"], "v");
        assert_eq!(node.info.path["p"], "q");
    }

    #[test]
    fn test_tagged_node_is_kept() {
        let body = format!(
            "{}\n{FINI}\n",
            r#"["node", [[["inet:fqdn", "vertex.link"]], {"iden": "x", "tags": {"rep": [null, null], "rep.vt": [1420070400000, 1451606400000]}, "props": {}, "tagprops": {"rep:score": 10}, "nodedata": {"seen": true}, "path": {"vars": {}}}]]"#
        );
        let results = decode(body.as_bytes()).unwrap();

        assert_eq!(results.skipped, 0);
        assert_eq!(results.nodes.len(), 1);
        let info = &results.nodes[0].info;
        assert_eq!(info.tags["rep"], "[null,null]");
        assert_eq!(info.tags["rep.vt"], "[1420070400000,1451606400000]");
        assert_eq!(info.tagprops["rep:score"], "10");
        assert_eq!(info.nodedata["seen"], "True");
        assert_eq!(info.path["vars"], "{}");
    }

    #[test]
    fn test_missing_info_maps_default_to_empty() {
        let body = format!(
            "{}\n{}\n",
            r#"["node", [[["inet:fqdn", "a.link"]], {"iden": "a"}]]"#,
            r#"["node", [[["inet:fqdn", "b.link"]], {"iden": "b", "tags": null, "path": {}}]]"#
        );
        let results = decode(body.as_bytes()).unwrap();

        assert_eq!(results.skipped, 0);
        let idens: Vec<_> = results.nodes.iter().map(|n| n.info.iden.as_str()).collect();
        assert_eq!(idens, ["a", "b"]);
        for node in &results.nodes {
            assert!(node.info.tags.is_empty());
            assert!(node.info.props.is_empty());
            assert!(node.info.tagprops.is_empty());
            assert!(node.info.nodedata.is_empty());
            assert!(node.info.path.is_empty());
        }
    }

    #[test]
    fn test_bad_pair_is_schema_mismatch() {
        let line = r#"["node", [[["only-one"]], {"iden": "x"}]]"#;
        assert!(matches!(
            decode_line(line).as_slice(),
            [Err(DecodeError::SchemaMismatch {
                kind: MessageKind::Node,
                ..
            })]
        ));
    }

    #[test]
    fn test_classifier_errors() {
        assert!(matches!(
            decode_line(r#"{"a": 1}"#).as_slice(),
            [Err(DecodeError::MalformedLine(_))]
        ));
        assert!(matches!(
            decode_line(r#"["print"]"#).as_slice(),
            [Err(DecodeError::MalformedLine(_))]
        ));
        assert!(matches!(
            decode_line(r#"[7, {}]"#).as_slice(),
            [Err(DecodeError::MalformedLine(_))]
        ));
        assert_eq!(
            decode_line(r#"["err", {"mesg": "boom"}]"#),
            vec![Err(DecodeError::UnknownTag("err".to_string()))]
        );
        assert!(decode_line("   ").is_empty());
    }

    #[test]
    fn test_extra_fields_and_elements_are_ignored() {
        let line = r#"["print", {"mesg": "hi", "level": "info"}, "trailing"]"#;
        assert_eq!(
            decode_line(line),
            vec![Ok(StormMessage::Print(PrintMessage {
                message: "hi".to_string()
            }))]
        );
    }

    #[test]
    fn test_positional_payload_is_rejected() {
        let line = r#"["fini", [1, 1, 1, 1]]"#;
        assert!(matches!(
            decode_line(line).as_slice(),
            [Err(DecodeError::SchemaMismatch {
                kind: MessageKind::Fini,
                ..
            })]
        ));
    }

    #[test]
    fn test_concatenated_envelopes_on_one_line() {
        let line = format!("{INIT}{FINI} [\"print\", {{\"mesg\": \"x\"}}]");
        let kinds: Vec<_> = decode_line(&line)
            .into_iter()
            .map(|m| m.unwrap().kind())
            .collect();
        assert_eq!(
            kinds,
            [MessageKind::Init, MessageKind::Fini, MessageKind::Print]
        );
    }

    #[test]
    fn test_crlf_and_trailing_partial_line() {
        let body = format!("{INIT}\r\n{FINI}\r\n[\"node\", [[[\"a\", ");
        let results = decode(body.as_bytes()).unwrap();
        assert_eq!(results.inits.len(), 1);
        assert_eq!(results.finis.len(), 1);
        assert!(results.nodes.is_empty());
        assert_eq!(results.skipped, 1);
    }

    #[test]
    fn test_strict_policy_fails_on_schema_mismatch() {
        let body = format!("{INIT}\n[\"fini\", {{\"tock\": 1}}]\n");
        let err = decode_with(body.as_bytes(), SchemaPolicy::Fail).unwrap_err();
        match err {
            Error::Decode { line, source } => {
                assert_eq!(line, 2);
                assert!(matches!(
                    source,
                    DecodeError::SchemaMismatch {
                        kind: MessageKind::Fini,
                        ..
                    }
                ));
            }
            other => panic!("unexpected error: {other}"),
        }

        let lenient = decode(body.as_bytes()).unwrap();
        assert_eq!(lenient.inits.len(), 1);
        assert_eq!(lenient.skipped, 1);
    }

    #[test]
    fn test_strict_policy_still_skips_unknown_tags() {
        let body = format!("[\"warn\", {{\"mesg\": \"w\"}}]\nnot json\n{FINI}\n");
        let results = decode_with(body.as_bytes(), SchemaPolicy::Fail).unwrap();
        assert_eq!(results.finis.len(), 1);
        assert_eq!(results.skipped, 2);
    }
}
