//! `grimorio resolve` handler.

use super::commands::ResolveArgs;
use grimorio::{
    CardFile, Grimorio, GrimorioConfig, GrimorioResult, JsonError, ResolveOptions, VariableContext,
};
use std::path::Path;
use tracing::{debug, instrument};

/// Resolve a card or template from the command line.
#[instrument(skip(args, config_path), fields(cards = %args.cards.display()))]
pub fn resolve(args: ResolveArgs, config_path: Option<&Path>, verbose: bool) -> GrimorioResult<()> {
    let config = match config_path {
        Some(path) => GrimorioConfig::from_file(path)?,
        None => GrimorioConfig::load()?,
    };

    let card_file = CardFile::from_file(&args.cards)?;
    let grimorio = Grimorio::with_cards(config, card_file.cards)?;
    let ctx = load_context(&args.context)?;

    let options = ResolveOptions::default()
        .with_use_cache(!args.no_cache)
        .with_verbose(verbose);

    let resolution = match (&args.card, &args.template) {
        (Some(key), _) => grimorio.resolve_key(key, &ctx, &options)?,
        (None, Some(body)) => grimorio.resolve_template(body, &ctx, &options)?,
        (None, None) => grimorio.resolve_template("", &ctx, &options)?,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&resolution)
            .map_err(|e| JsonError::new(e.to_string()))?;
        println!("{}", json);
    } else {
        println!("{}", resolution.result());
        let (resolved, empty, errors) = resolution.stats().counts();
        eprintln!("{:-<80}", "");
        eprintln!("resolved: {}  empty: {}  errors: {}", resolved, empty, errors);
        for variable in resolution.stats().variables() {
            eprintln!("  {:<32} {}", variable.name(), variable.outcome());
        }
    }

    Ok(())
}

fn load_context(path: &Path) -> GrimorioResult<VariableContext> {
    debug!(path = %path.display(), "Loading context");
    let contents = std::fs::read_to_string(path)
        .map_err(|e| JsonError::new(format!("Failed to read {}: {}", path.display(), e)))?;
    let ctx = serde_json::from_str(&contents)
        .map_err(|e| JsonError::new(format!("Failed to parse {}: {}", path.display(), e)))?;
    Ok(ctx)
}
