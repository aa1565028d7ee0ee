//! Card definitions and card file loading.

use derive_getters::Getters;
use grimorio_error::{CardError, CardErrorKind, GrimorioResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Stable identifier of a card.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Create a card id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Whether a card is a leaf read from context or a composite template.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CardKind {
    /// Value comes directly from a context path; the body is never expanded
    Variable,
    /// Body contains `{{reference}}` tokens expanded recursively
    Template,
}

/// A named template unit.
///
/// # Example
///
/// ```
/// use grimorio_core::{Card, CardKind};
///
/// let card = Card::template("c-1", "saludo", "Hola {{npc.nombre}}")
///     .with_category("dialogo");
/// assert_eq!(card.key(), "saludo");
/// assert_eq!(*card.kind(), CardKind::Template);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Card {
    /// Stable unique identifier
    id: CardId,
    /// Name used to reference this card from other templates
    key: String,
    /// Free-form grouping tag, not used during resolution
    #[serde(default)]
    category: String,
    /// Leaf or composite
    kind: CardKind,
    /// Template text, or the source path of a variable card
    #[serde(default)]
    body: String,
}

impl Card {
    /// Create a card.
    pub fn new(
        id: impl Into<CardId>,
        key: impl Into<String>,
        kind: CardKind,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            category: String::new(),
            kind,
            body: body.into(),
        }
    }

    /// Create a composite template card.
    pub fn template(id: impl Into<CardId>, key: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(id, key, CardKind::Template, body)
    }

    /// Create a variable card reading `source` from the context.
    ///
    /// An empty `source` makes the card read its own key.
    pub fn variable(id: impl Into<CardId>, key: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(id, key, CardKind::Variable, source)
    }

    /// Set the category tag.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Whether the body is expanded recursively.
    pub fn is_template(&self) -> bool {
        self.kind == CardKind::Template
    }

    /// Context path a variable card reads.
    ///
    /// The body, trimmed and with one enclosing `{{ }}` pair removed; the
    /// card's own key when that leaves nothing.
    pub fn source_path(&self) -> &str {
        let trimmed = self.body.trim();
        let inner = trimmed
            .strip_prefix("{{")
            .and_then(|rest| rest.strip_suffix("}}"))
            .map(str::trim)
            .unwrap_or(trimmed);
        if inner.is_empty() {
            self.key.trim()
        } else {
            inner
        }
    }
}

/// On-disk card collection.
///
/// ```toml
/// [[cards]]
/// id = "c-1"
/// key = "saludo"
/// category = "dialogo"
/// kind = "template"
/// body = "Hola {{npc.nombre}}"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardFile {
    /// Cards in file order
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl CardFile {
    /// Parse a card file from a TOML string.
    pub fn from_toml_str(input: &str) -> GrimorioResult<Self> {
        let file: CardFile = toml::from_str(input)
            .map_err(|e| CardError::new(CardErrorKind::Parse(e.to_string())))?;
        debug!(cards = file.cards.len(), "Parsed card file");
        Ok(file)
    }

    /// Load a card file from disk.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> GrimorioResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CardError::new(CardErrorKind::FileRead(format!(
                "{}: {}",
                path.as_ref().display(),
                e
            )))
        })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_path_strips_braces() {
        let card = Card::variable("v-1", "nivel", "{{ jugador.nivel }}");
        assert_eq!(card.source_path(), "jugador.nivel");
    }

    #[test]
    fn test_source_path_falls_back_to_key() {
        let card = Card::variable("v-1", "npc.nombre", "");
        assert_eq!(card.source_path(), "npc.nombre");

        let braces_only = Card::variable("v-2", "world.era", "{{}}");
        assert_eq!(braces_only.source_path(), "world.era");
    }

    #[test]
    fn test_card_kind_names() {
        assert_eq!(CardKind::Template.to_string(), "template");
        assert_eq!("variable".parse::<CardKind>().unwrap(), CardKind::Variable);
    }

    #[test]
    fn test_card_file_parse() {
        let file = CardFile::from_toml_str(
            r#"
[[cards]]
id = "c-1"
key = "saludo"
kind = "template"
body = "Hola {{npc.nombre}}"

[[cards]]
id = "c-2"
key = "nivel"
category = "jugador"
kind = "variable"
body = "player.nivel"
"#,
        )
        .unwrap();

        assert_eq!(file.cards.len(), 2);
        assert_eq!(file.cards[0].category(), "");
        assert_eq!(file.cards[1].id().as_str(), "c-2");
        assert_eq!(*file.cards[1].kind(), CardKind::Variable);
    }

    #[test]
    fn test_card_file_parse_error() {
        assert!(CardFile::from_toml_str("[[cards]]\nid = 3").is_err());
    }
}
