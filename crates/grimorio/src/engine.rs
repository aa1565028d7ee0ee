//! The Grimorio engine service.

use crate::GrimorioConfig;
use derive_getters::Getters;
use grimorio_cache::{Fingerprint, FingerprintScope, ResolutionCache};
use grimorio_core::{Card, CardId, CardSet, ResolutionStats, TemplateStore, VariableContext};
use grimorio_error::{GrimorioResult, ResolveError, ResolveErrorKind};
use grimorio_resolver::{MAX_DEPTH_LIMIT, Resolver, reachable_cards, reachable_slices};
use grimorio_stats::StatsCollector;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Per-call resolution options.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct ResolveOptions {
    /// Consult and fill the cache (only for card resolutions)
    use_cache: bool,
    /// Log every variable outcome and return the full variable list
    verbose: bool,
    /// Override the configured depth bound
    #[setters(strip_option)]
    max_depth: Option<u32>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            verbose: false,
            max_depth: None,
        }
    }
}

/// Resolved text and what it took to produce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct Resolution {
    /// Final prompt text
    result: String,
    /// Counters, `from_cache`, and with `verbose` the variable list
    stats: ResolutionStats,
}

impl Resolution {
    /// Split into text and stats.
    pub fn into_parts(self) -> (String, ResolutionStats) {
        (self.result, self.stats)
    }
}

/// Template resolution service.
///
/// Owns the live card store, the resolution cache and the stats collector.
/// Construct one at startup and share it as `Arc<Grimorio>`; every method
/// takes `&self`.
///
/// # Example
///
/// ```
/// use grimorio::{Grimorio, GrimorioConfig, ResolveOptions};
/// use grimorio_core::{Card, CardId, VariableContext};
/// use serde_json::json;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let grimorio = Grimorio::with_cards(
///     GrimorioConfig::default(),
///     vec![Card::template("c-1", "saludo", "Hola {{npc.nombre}}")],
/// )?;
/// let ctx = VariableContext::default().with_npc(json!({"nombre": "Gareth"}));
///
/// let first = grimorio.resolve_card(&CardId::new("c-1"), &ctx, &ResolveOptions::default())?;
/// let second = grimorio.resolve_card(&CardId::new("c-1"), &ctx, &ResolveOptions::default())?;
///
/// assert_eq!(first.result(), "Hola Gareth");
/// assert!(!first.stats().from_cache());
/// assert!(second.stats().from_cache());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Grimorio {
    config: GrimorioConfig,
    store: TemplateStore,
    cache: ResolutionCache,
    stats: StatsCollector,
}

impl Grimorio {
    /// Create an engine with an empty card store.
    pub fn new(config: GrimorioConfig) -> GrimorioResult<Self> {
        Self::with_store(config, TemplateStore::default())
    }

    /// Create an engine holding `cards`.
    pub fn with_cards(config: GrimorioConfig, cards: Vec<Card>) -> GrimorioResult<Self> {
        Self::with_store(config, TemplateStore::from_cards(cards)?)
    }

    /// Create an engine around an existing store.
    pub fn with_store(config: GrimorioConfig, store: TemplateStore) -> GrimorioResult<Self> {
        config.validate()?;
        info!(
            cards = store.snapshot().len(),
            max_depth = config.resolver().max_depth(),
            cache_enabled = config.cache().enabled(),
            "Creating Grimorio engine"
        );
        Ok(Self {
            cache: ResolutionCache::new(config.cache().clone()),
            stats: StatsCollector::new(config.stats().clone()),
            config,
            store,
        })
    }

    /// Configuration in effect.
    pub fn config(&self) -> &GrimorioConfig {
        &self.config
    }

    /// The live card store.
    ///
    /// Mutating it directly skips cache invalidation; prefer
    /// [`upsert_card`](Self::upsert_card) and friends.
    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    /// The resolution cache, for stats, clearing and sweeping.
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// The stats collector, for summaries, logs and top variables.
    pub fn stats(&self) -> &StatsCollector {
        &self.stats
    }

    /// Current point-in-time card set.
    pub fn snapshot(&self) -> Arc<CardSet> {
        self.store.snapshot()
    }

    /// Resolve `template_body` against `ctx` and `cards`.
    ///
    /// `card_id` names the card the body belongs to. It must be part of
    /// `cards`; it seeds cycle detection and, with `use_cache`, keys the
    /// cache. Ad-hoc bodies (`card_id` of `None`) are never cached.
    ///
    /// Unknown variables, cycles and depth overflows never fail the call;
    /// they show up in the returned stats.
    ///
    /// # Errors
    ///
    /// Returns an error if `card_id` is not in `cards`.
    #[instrument(
        skip(self, template_body, ctx, cards, options),
        fields(
            card = card_id.map(CardId::as_str),
            use_cache = options.use_cache,
            verbose = options.verbose
        )
    )]
    pub fn resolve_all_variables_with_cache(
        &self,
        template_body: &str,
        ctx: &VariableContext,
        cards: &CardSet,
        card_id: Option<&CardId>,
        options: &ResolveOptions,
    ) -> GrimorioResult<Resolution> {
        let card_key = match card_id {
            Some(id) => {
                let card = cards.get_by_id(id).ok_or_else(|| {
                    ResolveError::new(ResolveErrorKind::UnknownEntryCard(id.to_string()))
                })?;
                Some(card.key().as_str())
            }
            None => None,
        };

        let max_depth = options
            .max_depth
            .unwrap_or(*self.config.resolver().max_depth())
            .min(MAX_DEPTH_LIMIT);

        let cache_slot = match card_id {
            Some(id) if options.use_cache => {
                Some((id, self.fingerprint(template_body, ctx, cards, max_depth)))
            }
            _ => None,
        };

        if let Some((id, fingerprint)) = &cache_slot
            && let Some(entry) = self.cache.get_fingerprinted(id, fingerprint)
        {
            let mut stats = entry.stats().clone();
            stats.set_from_cache(true);
            debug!("Served from cache");
            return Ok(self.finish(entry.text().clone(), stats, card_id, card_key, options));
        }

        let (result, stats) = Resolver::new(ctx, cards)
            .with_max_depth(max_depth)
            .resolve(template_body, card_id);

        if let Some((id, fingerprint)) = cache_slot {
            self.cache
                .insert_fingerprinted(id, fingerprint, result.clone(), stats.clone());
        }

        Ok(self.finish(result, stats, card_id, card_key, options))
    }

    /// Log, record and trim the stats of a fresh or cached resolution.
    fn finish(
        &self,
        result: String,
        mut stats: ResolutionStats,
        card_id: Option<&CardId>,
        card_key: Option<&str>,
        options: &ResolveOptions,
    ) -> Resolution {
        if options.verbose {
            for variable in stats.variables() {
                debug!(
                    variable = %variable.name(),
                    outcome = %variable.outcome(),
                    "Variable outcome"
                );
            }
        }

        let (resolved, empty, errors) = stats.counts();
        if stats.has_errors() {
            warn!(resolved, empty, errors, "Resolution completed with errors");
        }

        self.stats.record(card_id, card_key, &stats);

        if !options.verbose {
            stats.clear_variables();
        }
        Resolution { result, stats }
    }

    /// Resolve a stored card by id against the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if no card has this id.
    pub fn resolve_card(
        &self,
        card_id: &CardId,
        ctx: &VariableContext,
        options: &ResolveOptions,
    ) -> GrimorioResult<Resolution> {
        let cards = self.store.snapshot();
        let card = cards.get_by_id(card_id).ok_or_else(|| {
            ResolveError::new(ResolveErrorKind::UnknownEntryCard(card_id.to_string()))
        })?;
        self.resolve_all_variables_with_cache(card.body(), ctx, &cards, Some(card.id()), options)
    }

    /// Resolve a stored card by key against the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if no card has this key.
    pub fn resolve_key(
        &self,
        key: &str,
        ctx: &VariableContext,
        options: &ResolveOptions,
    ) -> GrimorioResult<Resolution> {
        let cards = self.store.snapshot();
        let card = cards
            .get_by_key(key)
            .ok_or_else(|| ResolveError::new(ResolveErrorKind::UnknownEntryKey(key.to_string())))?;
        self.resolve_all_variables_with_cache(card.body(), ctx, &cards, Some(card.id()), options)
    }

    /// Resolve an ad-hoc body against the current snapshot, bypassing the
    /// cache.
    pub fn resolve_template(
        &self,
        template_body: &str,
        ctx: &VariableContext,
        options: &ResolveOptions,
    ) -> GrimorioResult<Resolution> {
        let cards = self.store.snapshot();
        self.resolve_all_variables_with_cache(template_body, ctx, &cards, None, options)
    }

    /// Insert or replace a card and drop its cached resolutions.
    ///
    /// Returns the replaced card.
    pub fn upsert_card(&self, card: Card) -> GrimorioResult<Option<Card>> {
        let id = card.id().clone();
        let replaced = self.store.upsert(card)?;
        self.cache.invalidate_card(&id);
        Ok(replaced)
    }

    /// Remove a card and drop its cached resolutions.
    pub fn remove_card(&self, card_id: &CardId) -> GrimorioResult<Card> {
        let removed = self.store.remove(card_id)?;
        self.cache.invalidate_card(card_id);
        Ok(removed)
    }

    /// Replace every card and clear the cache.
    pub fn replace_cards(&self, cards: Vec<Card>) -> GrimorioResult<()> {
        self.store.replace_all(cards)?;
        self.cache.invalidate_all();
        Ok(())
    }

    /// Cache key for a card resolution.
    ///
    /// Combines the context (whole, or only the reachable slices) with a
    /// digest of every card the body can reach and the depth bound, so an
    /// edit to any of them yields a new key.
    fn fingerprint(
        &self,
        template_body: &str,
        ctx: &VariableContext,
        cards: &CardSet,
        max_depth: u32,
    ) -> Fingerprint {
        let reachable = reachable_cards(template_body, cards);
        let mut parts = Vec::with_capacity(reachable.len() + 2);
        parts.push(max_depth.to_string());
        parts.push(template_body.to_string());
        parts.extend(
            reachable
                .iter()
                .map(|card| format!("{}\0{}\0{}", card.key(), card.kind(), card.body())),
        );
        let templates = Fingerprint::of_bodies(parts.iter().map(String::as_str));

        let context = match self.cache.config().fingerprint() {
            FingerprintScope::WholeContext => Fingerprint::of_context(ctx),
            FingerprintScope::ReachableSlices => {
                Fingerprint::of_slices(ctx, &reachable_slices(template_body, cards))
            }
        };
        context.with(&templates)
    }
}
