//! Typed Storm messages.
//!
//! Field names mirror the Cortex wire format exactly; they are the
//! compatibility contract with the server and must not be renamed.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::decode::coerce;

// ─────────────────────────────────────────────────────────────────────────────
// Message kinds
// ─────────────────────────────────────────────────────────────────────────────

/// Envelope tag identifying the payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Init,
    Node,
    Print,
    Fini,
}

impl MessageKind {
    /// Look up a kind by its wire tag. Tags are case-sensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "init" => Some(Self::Init),
            "node" => Some(Self::Node),
            "print" => Some(Self::Print),
            "fini" => Some(Self::Fini),
            _ => None,
        }
    }

    /// The wire tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Node => "node",
            Self::Print => "print",
            Self::Fini => "fini",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// Emitted once when query execution starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitMessage {
    /// Start monotonic timestamp.
    pub tick: i64,
    /// Original query text.
    pub text: String,
    /// Absolute start time.
    pub abstick: i64,
    /// Query hash.
    pub hash: String,
    /// Task identifier.
    pub task: String,
}

/// One matched graph node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMessage {
    /// Primary key/value pairs describing the node's addressable form.
    pub pairs: Vec<(String, String)>,
    /// Node details.
    pub info: NodeInfo,
}

/// Details attached to a node envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub iden: String,
    /// Tag name to value. Tag intervals such as `[null, null]` arrive as
    /// their string form.
    #[serde(default, deserialize_with = "string_map")]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub props: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "string_map")]
    pub tagprops: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "string_map")]
    pub nodedata: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "string_map")]
    pub path: BTreeMap<String, String>,
}

/// A map whose values may be any JSON, stringified with [`coerce`].
/// `null` in place of the map is treated as empty.
fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, coerce(value)))
        .collect())
}

/// A diagnostic line from the query engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintMessage {
    #[serde(rename = "mesg")]
    pub message: String,
}

/// Emitted once when query execution finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiniMessage {
    /// End monotonic timestamp.
    pub tock: i64,
    /// Absolute end time.
    pub abstock: i64,
    /// Duration of the query.
    pub took: i64,
    /// Number of nodes yielded.
    pub count: u64,
}

/// A decoded envelope of any recognized kind.
#[derive(Debug, Clone, PartialEq)]
pub enum StormMessage {
    Init(InitMessage),
    Node(NodeMessage),
    Print(PrintMessage),
    Fini(FiniMessage),
}

impl StormMessage {
    /// The kind of this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Init(_) => MessageKind::Init,
            Self::Node(_) => MessageKind::Node,
            Self::Print(_) => MessageKind::Print,
            Self::Fini(_) => MessageKind::Fini,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────────────────────────────────────

/// Messages from one Storm response, split by kind.
///
/// Each sequence keeps the order in which its envelopes appeared in the
/// stream. Order across kinds is not kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StormResults {
    #[serde(rename = "init")]
    pub inits: Vec<InitMessage>,
    pub nodes: Vec<NodeMessage>,
    pub prints: Vec<PrintMessage>,
    #[serde(rename = "fini")]
    pub finis: Vec<FiniMessage>,
    /// Number of lines or envelopes that were skipped while decoding.
    #[serde(skip)]
    pub skipped: usize,
}

impl StormResults {
    /// Append a message to the sequence for its kind.
    pub fn push(&mut self, message: StormMessage) {
        match message {
            StormMessage::Init(m) => self.inits.push(m),
            StormMessage::Node(m) => self.nodes.push(m),
            StormMessage::Print(m) => self.prints.push(m),
            StormMessage::Fini(m) => self.finis.push(m),
        }
    }

    /// True if no message of any kind was decoded.
    pub fn is_empty(&self) -> bool {
        self.inits.is_empty()
            && self.nodes.is_empty()
            && self.prints.is_empty()
            && self.finis.is_empty()
    }

    /// Split into `(inits, nodes, prints, finis)`.
    pub fn into_parts(
        self,
    ) -> (
        Vec<InitMessage>,
        Vec<NodeMessage>,
        Vec<PrintMessage>,
        Vec<FiniMessage>,
    ) {
        (self.inits, self.nodes, self.prints, self.finis)
    }
}

impl Extend<StormMessage> for StormResults {
    fn extend<I: IntoIterator<Item = StormMessage>>(&mut self, iter: I) {
        for message in iter {
            self.push(message);
        }
    }
}

impl FromIterator<StormMessage> for StormResults {
    fn from_iter<I: IntoIterator<Item = StormMessage>>(iter: I) -> Self {
        let mut results = Self::default();
        results.extend(iter);
        results
    }
}
