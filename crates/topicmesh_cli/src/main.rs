//! CLI smoke entry point.
//!
//! # Responsibility
//! - Seed an in-memory entity directory and run suggestions and restricted
//!   search over the text given on the command line.
//! - Keep output deterministic for quick local sanity checks.

use std::error::Error;
use topicmesh_core::{
    core_version, open_db_in_memory, CompositeSuggester, EntityKind, EntityRecord,
    EntityRepository, EntitySearchResolver, IndexSuggester, KeywordSuggester, SqliteEntityIndex,
    SqliteEntityRepository, SuggestionEngine,
};

const DEFAULT_TEXT: &str =
    "Great case study about Nike's programmatic strategy with Horizon Media on connected TV";

fn main() {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let text = if args.is_empty() {
        DEFAULT_TEXT.to_string()
    } else {
        args.join(" ")
    };

    println!("topicmesh_core version={}", core_version());
    if let Err(err) = run(&text) {
        eprintln!("topicmesh_cli error={err}");
        std::process::exit(1);
    }
}

fn run(text: &str) -> Result<(), Box<dyn Error>> {
    let conn = open_db_in_memory()?;
    seed_directory(&SqliteEntityRepository::try_new(&conn)?)?;

    let index = SqliteEntityIndex::new(&conn);
    let mut backends = CompositeSuggester::new(Vec::new());
    backends.push(IndexSuggester::new(index));
    backends.push(KeywordSuggester::new());
    let engine = SuggestionEngine::new(backends);
    for suggestion in engine.suggest(text, None, None) {
        let reference = suggestion.reference;
        println!(
            "suggestion key={} kind={} confidence={:.2} name={}",
            reference.dedup_key(),
            reference.kind.as_str(),
            reference.confidence,
            reference.display_name
        );
    }

    let resolver = EntitySearchResolver::restricted(index);
    let query = text.split_whitespace().last().unwrap_or_default();
    for reference in resolver.search(query, 0) {
        println!(
            "search query={query} key={} kind={} name={}",
            reference.dedup_key(),
            reference.kind.as_str(),
            reference.display_name
        );
    }
    Ok(())
}

fn seed_directory(repo: &impl EntityRepository) -> Result<(), Box<dyn Error>> {
    let records = [
        EntityRecord::new(EntityKind::Company, "c-nike", "Nike").with_category("ADVERTISER"),
        EntityRecord::new(EntityKind::Company, "c-horizon", "Horizon Media")
            .with_category("AGENCY"),
        EntityRecord::new(EntityKind::Company, "c-ttd", "The Trade Desk")
            .with_category("DSP_SSP"),
        EntityRecord::new(EntityKind::Contact, "p-jane", "Jane Doe"),
        EntityRecord::new(EntityKind::Topic, "t-ctv", "Connected TV")
            .with_description("Streaming video delivered to TV screens"),
        EntityRecord::new(EntityKind::Category, "cat-news", "Industry News"),
    ];
    for record in &records {
        repo.upsert_entity(record)?;
    }
    Ok(())
}
