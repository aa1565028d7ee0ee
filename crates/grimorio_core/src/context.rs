//! Variable context snapshots and primary variable lookup.

use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// A top-level region of a [`VariableContext`] addressed by the leading
/// segment of a variable path.
///
/// Variants are ordered; fingerprints hash slices in this order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextSlice {
    /// Non-player character being voiced
    Npc,
    /// World record
    World,
    /// Settlement record
    Settlement,
    /// Building record
    Building,
    /// Player character record
    Player,
    /// Play session record
    Session,
    /// Name of the active character
    CharacterName,
    /// Latest message from the user
    UserMessage,
    /// Most recent conversation summary
    LastSummary,
    /// Application-defined slice, by lower-cased name
    Extra(String),
}

impl fmt::Display for ContextSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Npc => "npc",
            Self::World => "world",
            Self::Settlement => "settlement",
            Self::Building => "building",
            Self::Player => "player",
            Self::Session => "session",
            Self::CharacterName => "character_name",
            Self::UserMessage => "user_message",
            Self::LastSummary => "last_summary",
            Self::Extra(name) => name.as_str(),
        };
        f.write_str(name)
    }
}

impl ContextSlice {
    /// Map a path's leading segment to the slice it addresses.
    ///
    /// Matching is case-insensitive and accepts the Spanish names templates
    /// use (`jugador`, `mundo`, `edificio`, ...). Unrecognized names address
    /// an application-defined extra slice.
    pub fn from_segment(segment: &str) -> Self {
        let lowered = segment.trim().to_lowercase();
        match lowered.as_str() {
            "npc" | "personaje" => Self::Npc,
            "world" | "mundo" => Self::World,
            "settlement" | "asentamiento" | "pueblo" => Self::Settlement,
            "building" | "edificio" => Self::Building,
            "player" | "jugador" => Self::Player,
            "session" | "sesion" | "sesión" => Self::Session,
            "character_name" | "nombre_personaje" => Self::CharacterName,
            "user_message" | "mensaje_usuario" => Self::UserMessage,
            "last_summary" | "ultimo_resumen" => Self::LastSummary,
            _ => Self::Extra(lowered),
        }
    }
}

/// Per-request snapshot of game state consulted by templates.
///
/// Built fresh for every resolution by the embedding application and never
/// mutated while a resolution reads it.
///
/// # Example
///
/// ```
/// use grimorio_core::{VariableContext, lookup};
/// use serde_json::json;
///
/// let ctx = VariableContext::default()
///     .with_npc(json!({"nombre": "Gareth", "edad": 52}))
///     .with_character_name("Aria");
///
/// assert_eq!(lookup("npc.nombre", &ctx).as_deref(), Some("Gareth"));
/// assert_eq!(lookup("NPC.edad", &ctx).as_deref(), Some("52"));
/// assert_eq!(lookup("character_name", &ctx).as_deref(), Some("Aria"));
/// assert_eq!(lookup("npc", &ctx), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters, Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct VariableContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    npc: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    world: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    settlement: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    building: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    player: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    character_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_summary: Option<String>,
    /// Application-defined slices keyed by lower-cased name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    extra: BTreeMap<String, JsonValue>,
}

/// Borrowed view of one slice.
enum SliceRef<'a> {
    Tree(&'a JsonValue),
    Scalar(&'a str),
}

impl VariableContext {
    /// Add an application-defined slice.
    pub fn with_slice(mut self, name: impl AsRef<str>, value: JsonValue) -> Self {
        self.extra.insert(name.as_ref().trim().to_lowercase(), value);
        self
    }

    fn slice_ref(&self, slice: &ContextSlice) -> Option<SliceRef<'_>> {
        match slice {
            ContextSlice::Npc => self.npc.as_ref().map(SliceRef::Tree),
            ContextSlice::World => self.world.as_ref().map(SliceRef::Tree),
            ContextSlice::Settlement => self.settlement.as_ref().map(SliceRef::Tree),
            ContextSlice::Building => self.building.as_ref().map(SliceRef::Tree),
            ContextSlice::Player => self.player.as_ref().map(SliceRef::Tree),
            ContextSlice::Session => self.session.as_ref().map(SliceRef::Tree),
            ContextSlice::CharacterName => self.character_name.as_deref().map(SliceRef::Scalar),
            ContextSlice::UserMessage => self.user_message.as_deref().map(SliceRef::Scalar),
            ContextSlice::LastSummary => self.last_summary.as_deref().map(SliceRef::Scalar),
            ContextSlice::Extra(name) => self.extra.get(name).map(SliceRef::Tree),
        }
    }

    /// JSON value of a slice, if present.
    pub fn slice_value(&self, slice: &ContextSlice) -> Option<JsonValue> {
        match self.slice_ref(slice)? {
            SliceRef::Tree(value) => Some(value.clone()),
            SliceRef::Scalar(text) => Some(JsonValue::String(text.to_string())),
        }
    }
}

/// Resolve a dotted variable path against a context.
///
/// The leading segment selects a slice (see [`ContextSlice::from_segment`]);
/// the remaining segments walk object fields by exact name, or array
/// elements by index. Returns `None` for missing slices, missing fields,
/// `null`, and objects or arrays, which templates cannot embed. Numbers and
/// booleans are rendered as JSON renders them.
pub fn lookup(path: &str, ctx: &VariableContext) -> Option<String> {
    let mut segments = path.trim().split('.');
    let head = segments.next()?;
    if head.trim().is_empty() {
        return None;
    }

    match ctx.slice_ref(&ContextSlice::from_segment(head))? {
        SliceRef::Scalar(text) => match segments.next() {
            None => Some(text.to_string()),
            Some(_) => None,
        },
        SliceRef::Tree(root) => {
            let mut current = root;
            for segment in segments {
                current = match current {
                    JsonValue::Object(map) => map.get(segment)?,
                    JsonValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                    _ => return None,
                };
            }
            scalar_text(current)
        }
    }
}

fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}
