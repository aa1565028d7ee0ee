//! Static analysis of card references.
//!
//! Used for cache fingerprint scoping (which cards and context slices an
//! expansion can possibly touch) and for linting card sets.

use crate::token::{Segment, references, tokenize};
use derive_getters::Getters;
use grimorio_core::{Card, CardKind, CardSet, ContextSlice};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Cards a body can reach through template expansion.
///
/// Includes every card named by a reference in `body` and, transitively,
/// in the bodies of reachable template cards. Order is breadth-first
/// discovery order. Variable cards are included but not followed.
pub fn reachable_cards<'a>(body: &str, cards: &'a CardSet) -> Vec<&'a Card> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut found = Vec::new();
    let mut queue: VecDeque<&'a Card> = VecDeque::new();

    let mut discover = |name: &str, queue: &mut VecDeque<&'a Card>, found: &mut Vec<&'a Card>| {
        if let Some(card) = cards.get_by_key(name) {
            if seen.insert(card.id().as_str()) {
                found.push(card);
                if card.is_template() {
                    queue.push_back(card);
                }
            }
        }
    };

    for name in references(body) {
        discover(name, &mut queue, &mut found);
    }
    while let Some(card) = queue.pop_front() {
        for name in references(card.body()) {
            discover(name, &mut queue, &mut found);
        }
    }
    found
}

/// Context slices an expansion of `body` can read.
///
/// Every reference is first tried as a context path, so the leading segment
/// of every reference counts, as does the source path of every reachable
/// variable card.
pub fn reachable_slices(body: &str, cards: &CardSet) -> BTreeSet<ContextSlice> {
    let reachable = reachable_cards(body, cards);
    let template_bodies = reachable
        .iter()
        .filter(|card| card.is_template())
        .map(|card| card.body().as_str());

    let mut slices: BTreeSet<ContextSlice> = std::iter::once(body)
        .chain(template_bodies)
        .flat_map(references)
        .map(leading_slice)
        .collect();

    slices.extend(
        reachable
            .iter()
            .filter(|card| *card.kind() == CardKind::Variable)
            .map(|card| leading_slice(card.source_path())),
    );
    slices
}

fn leading_slice(path: &str) -> ContextSlice {
    ContextSlice::from_segment(path.split('.').next().unwrap_or(path))
}

/// A reference that is neither a card key nor a built-in context slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct UnrecognizedReference {
    /// Key of the card containing the reference
    card: String,
    /// The reference text
    reference: String,
}

/// A malformed `{{ }}` span inside a card body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct MalformedSpan {
    /// Key of the card containing the span
    card: String,
    /// The literal span text
    text: String,
}

/// Findings from [`lint`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Getters)]
pub struct LintReport {
    /// Each cycle as the card keys along it, starting and ending at the
    /// same key
    cycles: Vec<Vec<String>>,
    /// References that only an application-defined slice could satisfy
    unrecognized: Vec<UnrecognizedReference>,
    /// Malformed spans
    malformed: Vec<MalformedSpan>,
}

impl LintReport {
    /// Whether nothing was found.
    pub fn is_clean(&self) -> bool {
        self.cycles.is_empty() && self.unrecognized.is_empty() && self.malformed.is_empty()
    }
}

/// Check a card set for reference cycles, unrecognized references and
/// malformed spans.
///
/// Resolution tolerates all of these; lint exists so authors find them
/// before players do.
pub fn lint(cards: &CardSet) -> LintReport {
    let mut report = LintReport::default();

    for card in cards.iter().filter(|card| card.is_template()) {
        for segment in tokenize(card.body()) {
            match segment {
                Segment::Reference(name) => {
                    if cards.get_by_key(name).is_none()
                        && matches!(leading_slice(name), ContextSlice::Extra(_))
                    {
                        report.unrecognized.push(UnrecognizedReference {
                            card: card.key().clone(),
                            reference: name.to_string(),
                        });
                    }
                }
                Segment::Malformed(text) => report.malformed.push(MalformedSpan {
                    card: card.key().clone(),
                    text: text.to_string(),
                }),
                Segment::Literal(_) => {}
            }
        }
    }

    report.cycles = find_cycles(cards);
    report
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Active,
    Done,
}

/// A card on the current search path and its template references not yet
/// followed.
type Frame<'a> = (&'a str, std::vec::IntoIter<&'a Card>);

/// Reference cycles among template cards, each reported once.
///
/// Depth-first with an explicit stack, so arbitrarily long reference chains
/// are walked without recursion.
pub fn find_cycles(cards: &CardSet) -> Vec<Vec<String>> {
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut cycles = Vec::new();

    for root in cards.iter().filter(|card| card.is_template()) {
        if marks.contains_key(root.key().as_str()) {
            continue;
        }

        let mut stack: Vec<Frame<'_>> = Vec::new();
        enter(root, cards, &mut marks, &mut stack);

        while let Some((_, pending)) = stack.last_mut() {
            let Some(next) = pending.next() else {
                if let Some((key, _)) = stack.pop() {
                    marks.insert(key, Mark::Done);
                }
                continue;
            };

            let next_key = next.key().as_str();
            match marks.get(next_key).copied() {
                Some(Mark::Active) => {
                    if let Some(start) = stack.iter().position(|(key, _)| *key == next_key) {
                        let mut cycle: Vec<String> =
                            stack[start..].iter().map(|(key, _)| key.to_string()).collect();
                        cycle.push(next_key.to_string());
                        cycles.push(cycle);
                    }
                }
                Some(Mark::Done) => {}
                None => enter(next, cards, &mut marks, &mut stack),
            }
        }
    }
    cycles
}

fn enter<'a>(
    card: &'a Card,
    cards: &'a CardSet,
    marks: &mut HashMap<&'a str, Mark>,
    stack: &mut Vec<Frame<'a>>,
) {
    let key = card.key().as_str();
    marks.insert(key, Mark::Active);
    let pending: Vec<&'a Card> = references(card.body())
        .filter_map(|name| cards.get_by_key(name))
        .filter(|next| next.is_template())
        .collect();
    stack.push((key, pending.into_iter()));
}
