//! Recursive template expansion.

use crate::config::DEFAULT_MAX_DEPTH;
use crate::token::{Segment, tokenize};
use grimorio_core::{
    CardId, CardKind, CardSet, ResolutionStats, VariableContext, VariableOutcome, lookup,
};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Expands template bodies against one context and one card snapshot.
///
/// Each `{{reference}}` is tried as a context path first, then as a card
/// key. Variable cards read their source path from the context; template
/// cards are expanded recursively. Missing values become empty strings.
/// Cycles, depth overflows and malformed spans also become empty (or
/// literal) text and are counted as errors. Resolution never fails.
///
/// Every occurrence of a template card is expanded and counted on its own,
/// so work grows with the expanded output. A card that repeats a reference
/// at every level doubles the output per level, up to `max_depth`.
///
/// # Example
///
/// ```
/// use grimorio_core::{Card, CardSet, VariableContext};
/// use grimorio_resolver::Resolver;
/// use serde_json::json;
///
/// let cards = CardSet::new(vec![
///     Card::template("c-1", "saludo", "Hola {{npc.nombre}}"),
/// ])
/// .unwrap();
/// let ctx = VariableContext::default().with_npc(json!({"nombre": "Gareth"}));
///
/// let (text, stats) = Resolver::new(&ctx, &cards).resolve("{{saludo}}.", None);
/// assert_eq!(text, "Hola Gareth.");
/// assert_eq!(stats.counts(), (2, 0, 0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    ctx: &'a VariableContext,
    cards: &'a CardSet,
    max_depth: u32,
}

impl<'a> Resolver<'a> {
    /// Create a resolver with the default depth bound.
    pub fn new(ctx: &'a VariableContext, cards: &'a CardSet) -> Self {
        Self {
            ctx,
            cards,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the depth bound.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Expand `entry_body`.
    ///
    /// `entry_id` names the card the body belongs to, if any, so a card that
    /// references itself is caught as a cycle.
    pub fn resolve(&self, entry_body: &str, entry_id: Option<&CardId>) -> (String, ResolutionStats) {
        let mut out = String::with_capacity(entry_body.len());
        let mut stats = ResolutionStats::new();
        let mut expanding: HashSet<CardId> = entry_id.cloned().into_iter().collect();

        self.expand(entry_body, 0, &mut expanding, &mut out, &mut stats);

        let (resolved, empty, errors) = stats.counts();
        debug!(
            entry = ?entry_id.map(CardId::as_str),
            resolved,
            empty,
            errors,
            length = out.len(),
            "Resolved template"
        );
        (out, stats)
    }

    fn expand(
        &self,
        body: &str,
        depth: u32,
        expanding: &mut HashSet<CardId>,
        out: &mut String,
        stats: &mut ResolutionStats,
    ) {
        for segment in tokenize(body) {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Malformed(text) => {
                    trace!(text, "Malformed token kept as literal");
                    out.push_str(text);
                    stats.record(text, VariableOutcome::MalformedToken);
                }
                Segment::Reference(name) => self.substitute(name, depth, expanding, out, stats),
            }
        }
    }

    fn substitute(
        &self,
        name: &str,
        depth: u32,
        expanding: &mut HashSet<CardId>,
        out: &mut String,
        stats: &mut ResolutionStats,
    ) {
        if let Some(value) = lookup(name, self.ctx) {
            trace!(name, "Resolved from context");
            out.push_str(&value);
            stats.record(name, VariableOutcome::Resolved);
            return;
        }

        let Some(card) = self.cards.get_by_key(name) else {
            trace!(name, "Unknown variable");
            stats.record(name, VariableOutcome::Unknown);
            return;
        };

        match card.kind() {
            CardKind::Variable => match lookup(card.source_path(), self.ctx) {
                Some(value) => {
                    out.push_str(&value);
                    stats.record(name, VariableOutcome::Resolved);
                }
                None => {
                    trace!(name, source = card.source_path(), "Variable card has no value");
                    stats.record(name, VariableOutcome::Empty);
                }
            },
            CardKind::Template => {
                if expanding.contains(card.id()) {
                    debug!(name, card = %card.id(), "Reference cycle detected");
                    stats.record(name, VariableOutcome::CycleDetected);
                    return;
                }
                let next = depth + 1;
                if next > self.max_depth {
                    debug!(name, max_depth = self.max_depth, "Template depth exceeded");
                    stats.record(name, VariableOutcome::DepthExceeded);
                    return;
                }

                stats.record(name, VariableOutcome::Expanded);
                expanding.insert(card.id().clone());
                self.expand(card.body(), next, expanding, out, stats);
                expanding.remove(card.id());
            }
        }
    }
}

/// Expand `entry_body` against `ctx` and `cards`, bounded by `max_depth`.
///
/// Convenience form of [`Resolver::resolve`].
pub fn resolve(
    entry_body: &str,
    ctx: &VariableContext,
    cards: &CardSet,
    entry_id: Option<&CardId>,
    max_depth: u32,
) -> (String, ResolutionStats) {
    Resolver::new(ctx, cards)
        .with_max_depth(max_depth)
        .resolve(entry_body, entry_id)
}
