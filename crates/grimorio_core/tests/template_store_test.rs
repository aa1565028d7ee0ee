//! Tests for the template store and card files.

use grimorio_core::{Card, CardFile, CardKind, TemplateStore};
use std::io::Write;
use std::sync::Arc;
use std::thread;

#[test]
fn test_store_from_card_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[[cards]]
id = "c-1"
key = "saludo"
category = "dialogo"
kind = "template"
body = "Hola {{{{npc.nombre}}}}"

[[cards]]
id = "c-2"
key = "hora"
kind = "variable"
body = "player.hora"
"#
    )
    .unwrap();

    let cards = CardFile::from_file(file.path()).unwrap().cards;
    let store = TemplateStore::from_cards(cards).unwrap();

    let saludo = store.get_by_key("saludo").unwrap();
    assert_eq!(saludo.body(), "Hola {{npc.nombre}}");
    assert_eq!(saludo.category(), "dialogo");
    assert_eq!(*store.get_by_key("hora").unwrap().kind(), CardKind::Variable);
}

#[test]
fn test_missing_card_file() {
    assert!(CardFile::from_file("/nonexistent/cards.toml").is_err());
}

#[test]
fn test_concurrent_readers_see_whole_snapshots() {
    let store = Arc::new(
        TemplateStore::from_cards(vec![
            Card::template("c-1", "a", "v0"),
            Card::template("c-2", "b", "v0"),
        ])
        .unwrap(),
    );

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for version in 1..=50 {
                let body = format!("v{version}");
                store
                    .replace_all(vec![
                        Card::template("c-1", "a", body.clone()),
                        Card::template("c-2", "b", body),
                    ])
                    .unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    let snapshot = store.snapshot();
                    let a = snapshot.get_by_key("a").unwrap().body().clone();
                    let b = snapshot.get_by_key("b").unwrap().body().clone();
                    assert_eq!(a, b);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(store.version(), 50);
}
