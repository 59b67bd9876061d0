//! Search command implementation.

use crate::cli::args::SearchArgs;
use crate::cli::output::Output;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::RecordSummary;
use crate::search::{Materializer, TimeBudget, compile};
use crate::store::{MemoryStore, build_candidates};
use crate::tag::DefaultDecoders;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub screen: String,
    pub total: usize,
    pub results: Vec<RecordSummary>,
}

pub fn run(config: &Config, args: &SearchArgs, output: &Output) -> Result<()> {
    let screen = config.screen(args.screen.as_deref())?;
    let store = MemoryStore::load_dump(&args.dump)?;
    let targets = build_candidates(&store, &screen.content_types);
    let query = compile(&args.query, &screen, targets)?;

    let mut materializer = Materializer::new(&query, &DefaultDecoders)
        .with_budget(TimeBudget::new(Duration::from_millis(config.batch_millis)));
    if !output.is_quiet() {
        materializer = materializer.with_progress(|done: usize, total: usize| {
            eprint!("\rSearching {}/{}", done, total);
        });
    }
    let searched = materializer.total();
    let matches = materializer.run();
    if searched > 0 {
        output.info("");
    }

    let total = matches.len();
    let limit = args.limit.unwrap_or(usize::MAX);
    let response = SearchResponse {
        query: args.query.clone(),
        screen: screen.name.clone(),
        total,
        results: matches.iter().take(limit).map(|r| r.summary()).collect(),
    };
    output.print(&response)?;

    if total == 0 && args.fail_on_empty {
        return Err(Error::NoMatches);
    }
    Ok(())
}
