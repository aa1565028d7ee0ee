//! `grimorio lint` handler.

use grimorio::{CardFile, CardSet, GrimorioResult, JsonError, lint};
use std::path::Path;

/// Lint a card file and print the findings.
///
/// Exits with status 1 when anything is found.
pub fn lint_cards(path: &Path, json: bool) -> GrimorioResult<()> {
    let cards = CardSet::new(CardFile::from_file(path)?.cards)?;
    let report = lint(&cards);

    if json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| JsonError::new(e.to_string()))?;
        println!("{}", json);
    } else {
        println!("Checked {} cards in {}", cards.len(), path.display());
        println!("{:-<80}", "");
        for cycle in report.cycles() {
            println!("cycle:        {}", cycle.join(" -> "));
        }
        for finding in report.unrecognized() {
            println!(
                "unrecognized: {{{{{}}}}} in '{}'",
                finding.reference(),
                finding.card()
            );
        }
        for span in report.malformed() {
            println!("malformed:    {:?} in '{}'", span.text(), span.card());
        }
        if report.is_clean() {
            println!("No problems found");
        }
    }

    if !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}
