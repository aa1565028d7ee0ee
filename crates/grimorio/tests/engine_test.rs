//! End-to-end behavior of the Grimorio service.

use grimorio::{
    Card, CardId, FingerprintScope, Grimorio, GrimorioConfig, ResolutionCacheConfig,
    ResolveOptions, VariableContext,
};
use serde_json::json;
use std::sync::Arc;
use std::thread;

fn cards() -> Vec<Card> {
    vec![
        Card::template(
            "c-saludo",
            "saludo",
            "Hola {{npc.nombre}}, hoy es {{player.hora}}",
        ),
        Card::template("c-escena", "escena", "{{lugar}}. {{saludo}}"),
        Card::template("c-lugar", "lugar", "En {{asentamiento.nombre}}"),
        Card::variable("v-nivel", "nivel", "jugador.nivel"),
    ]
}

fn ctx() -> VariableContext {
    VariableContext::default()
        .with_npc(json!({"nombre": "Gareth"}))
        .with_player(json!({"hora": "10:30pm", "nivel": 3}))
        .with_settlement(json!({"nombre": "Villaroble"}))
}

fn engine(config: GrimorioConfig) -> Grimorio {
    Grimorio::with_cards(config, cards()).unwrap()
}

#[test]
fn test_second_resolution_is_served_from_cache() {
    let grimorio = engine(GrimorioConfig::default());
    let id = CardId::new("c-saludo");
    let options = ResolveOptions::default();

    let first = grimorio.resolve_card(&id, &ctx(), &options).unwrap();
    let second = grimorio.resolve_card(&id, &ctx(), &options).unwrap();

    assert!(!first.stats().from_cache());
    assert!(second.stats().from_cache());
    assert_eq!(first.result(), "Hola Gareth, hoy es 10:30pm");
    assert_eq!(second.result(), first.result());
    assert_eq!(second.stats().counts(), first.stats().counts());

    let cache = grimorio.cache().stats();
    assert_eq!((*cache.hit_count(), *cache.miss_count()), (1, 1));

    let summary = grimorio.stats().summary();
    assert_eq!(*summary.total_resolutions(), 2);
    assert_eq!(*summary.cache_served(), 1);
}

#[test]
fn test_cache_hits_reach_variable_stats() {
    let grimorio = engine(GrimorioConfig::default());
    let id = CardId::new("c-saludo");

    for _ in 0..5 {
        grimorio
            .resolve_card(&id, &ctx(), &ResolveOptions::default())
            .unwrap();
    }

    let stats = grimorio.stats();
    assert_eq!(*stats.summary().cache_served(), 4);
    let top = stats.top_variables(1);
    assert_eq!(*top[0].count(), 5);
    assert_eq!(stats.recent_logs(100).len(), 10);
}

#[test]
fn test_verbose_cache_hit_returns_variables() {
    let grimorio = engine(GrimorioConfig::default());
    let id = CardId::new("c-saludo");
    let quiet = ResolveOptions::default();

    grimorio.resolve_card(&id, &ctx(), &quiet).unwrap();
    let hit = grimorio.resolve_card(&id, &ctx(), &quiet).unwrap();
    assert!(hit.stats().from_cache());
    assert!(hit.stats().variables().is_empty());

    let verbose = grimorio
        .resolve_card(&id, &ctx(), &quiet.clone().with_verbose(true))
        .unwrap();
    assert!(verbose.stats().from_cache());
    let names: Vec<_> = verbose
        .stats()
        .variables()
        .iter()
        .map(|variable| variable.name().as_str())
        .collect();
    assert_eq!(names, vec!["npc.nombre", "player.hora"]);
}

#[test]
fn test_unclosed_tokens_do_not_grow_variable_counts() {
    let grimorio = engine(GrimorioConfig::default());
    for i in 0..50 {
        grimorio
            .resolve_template(
                &format!("Hola {{{{ texto libre numero {i} sin cerrar"),
                &ctx(),
                &ResolveOptions::default(),
            )
            .unwrap();
    }

    let stats = grimorio.stats();
    assert_eq!(*stats.summary().distinct_variables(), 0);
    assert!(stats.top_variables(10).is_empty());
    assert_eq!(stats.error_logs(100).len(), 50);
}

#[test]
fn test_cached_text_matches_fresh_resolution() {
    let grimorio = engine(GrimorioConfig::default());
    let id = CardId::new("c-escena");

    let cached = grimorio
        .resolve_card(&id, &ctx(), &ResolveOptions::default())
        .and_then(|_| grimorio.resolve_card(&id, &ctx(), &ResolveOptions::default()))
        .unwrap();
    let fresh = grimorio
        .resolve_card(&id, &ctx(), &ResolveOptions::default().with_use_cache(false))
        .unwrap();

    assert!(cached.stats().from_cache());
    assert!(!fresh.stats().from_cache());
    assert_eq!(cached.result(), fresh.result());
    assert_eq!(fresh.result(), "En Villaroble. Hola Gareth, hoy es 10:30pm");
}

#[test]
fn test_context_change_misses() {
    let grimorio = engine(GrimorioConfig::default());
    let id = CardId::new("c-saludo");
    let options = ResolveOptions::default();

    grimorio.resolve_card(&id, &ctx(), &options).unwrap();
    let other = ctx().with_npc(json!({"nombre": "Elena"}));
    let resolution = grimorio.resolve_card(&id, &other, &options).unwrap();

    assert!(!resolution.stats().from_cache());
    assert_eq!(resolution.result(), "Hola Elena, hoy es 10:30pm");
}

#[test]
fn test_invalidate_card_forces_miss() {
    let grimorio = engine(GrimorioConfig::default());
    let id = CardId::new("c-saludo");
    let options = ResolveOptions::default();

    grimorio.resolve_card(&id, &ctx(), &options).unwrap();
    grimorio.cache().invalidate_card(&id);
    let after = grimorio.resolve_card(&id, &ctx(), &options).unwrap();
    assert!(!after.stats().from_cache());

    grimorio.cache().invalidate_all();
    assert!(grimorio.cache().is_empty());
}

#[test]
fn test_editing_a_referenced_card_changes_the_result() {
    let grimorio = engine(GrimorioConfig::default());
    let escena = CardId::new("c-escena");
    let options = ResolveOptions::default();

    grimorio.resolve_card(&escena, &ctx(), &options).unwrap();

    // Only the nested card changes; the entry card's own entries stay
    grimorio
        .upsert_card(Card::template("c-lugar", "lugar", "Cerca de {{asentamiento.nombre}}"))
        .unwrap();
    let resolution = grimorio.resolve_card(&escena, &ctx(), &options).unwrap();

    assert!(!resolution.stats().from_cache());
    assert_eq!(
        resolution.result(),
        "Cerca de Villaroble. Hola Gareth, hoy es 10:30pm"
    );
}

#[test]
fn test_card_mutations_invalidate() {
    let grimorio = engine(GrimorioConfig::default());
    let id = CardId::new("c-saludo");
    let options = ResolveOptions::default();

    grimorio.resolve_card(&id, &ctx(), &options).unwrap();
    assert_eq!(grimorio.cache().len(), 1);

    grimorio
        .upsert_card(Card::template("c-saludo", "saludo", "Buenas {{npc.nombre}}"))
        .unwrap();
    assert!(grimorio.cache().is_empty());
    assert_eq!(
        grimorio.resolve_card(&id, &ctx(), &options).unwrap().result(),
        "Buenas Gareth"
    );

    grimorio.remove_card(&id).unwrap();
    assert!(grimorio.cache().is_empty());
    assert!(grimorio.resolve_card(&id, &ctx(), &options).is_err());

    grimorio.resolve_card(&CardId::new("c-lugar"), &ctx(), &options).unwrap();
    grimorio.replace_cards(cards()).unwrap();
    assert!(grimorio.cache().is_empty());
    assert_eq!(grimorio.store().version(), 3);
}

#[test]
fn test_reachable_slice_fingerprints_ignore_unrelated_state() {
    let config = GrimorioConfig::default().with_cache(
        ResolutionCacheConfig::default().with_fingerprint(FingerprintScope::ReachableSlices),
    );
    let grimorio = engine(config);
    let id = CardId::new("c-saludo");
    let options = ResolveOptions::default();

    grimorio.resolve_card(&id, &ctx(), &options).unwrap();

    // saludo never reads the world or the user message
    let drifted = ctx()
        .with_world(json!({"clima": "lluvia"}))
        .with_user_message("hola");
    assert!(
        grimorio
            .resolve_card(&id, &drifted, &options)
            .unwrap()
            .stats()
            .from_cache()
    );

    // but it does read the player
    let moved = ctx().with_player(json!({"hora": "11:00pm"}));
    let resolution = grimorio.resolve_card(&id, &moved, &options).unwrap();
    assert!(!resolution.stats().from_cache());
    assert_eq!(resolution.result(), "Hola Gareth, hoy es 11:00pm");
}

#[test]
fn test_whole_context_fingerprints_see_everything() {
    let grimorio = engine(GrimorioConfig::default());
    let id = CardId::new("c-saludo");
    let options = ResolveOptions::default();

    grimorio.resolve_card(&id, &ctx(), &options).unwrap();
    let drifted = ctx().with_world(json!({"clima": "lluvia"}));
    assert!(
        !grimorio
            .resolve_card(&id, &drifted, &options)
            .unwrap()
            .stats()
            .from_cache()
    );
}

#[test]
fn test_disabled_cache_never_serves() {
    let config = GrimorioConfig::default()
        .with_cache(ResolutionCacheConfig::default().with_enabled(false));
    let grimorio = engine(config);
    let id = CardId::new("c-saludo");

    for _ in 0..3 {
        let resolution = grimorio
            .resolve_card(&id, &ctx(), &ResolveOptions::default())
            .unwrap();
        assert!(!resolution.stats().from_cache());
    }
    assert_eq!(*grimorio.cache().stats().miss_count(), 0);
}

#[test]
fn test_variable_cards_through_the_engine() {
    let grimorio = engine(GrimorioConfig::default());
    let resolution = grimorio
        .resolve_template("Nivel {{nivel}}", &ctx(), &ResolveOptions::default())
        .unwrap();
    assert_eq!(resolution.result(), "Nivel 3");
}

#[test]
fn test_shared_across_threads() {
    let grimorio = Arc::new(engine(GrimorioConfig::default()));
    let expected = "En Villaroble. Hola Gareth, hoy es 10:30pm";

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let grimorio = Arc::clone(&grimorio);
            thread::spawn(move || {
                for _ in 0..25 {
                    let resolution = grimorio
                        .resolve_card(&CardId::new("c-escena"), &ctx(), &ResolveOptions::default())
                        .unwrap();
                    assert_eq!(resolution.result(), expected);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let summary = grimorio.stats().summary();
    assert_eq!(*summary.total_resolutions(), 200);
    assert!(*summary.cache_served() >= 192);
    assert_eq!(grimorio.cache().len(), 1);
}
