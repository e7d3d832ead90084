//! Quarry command line.
//!
//! Runs one search against a collection and prints the result page as JSON.
//! With `--explain` the compiled request is printed instead and no backend is
//! contacted.

mod config;

use clap::Parser;

use quarry_search::backends::elasticsearch::search::{QueryCompiler, assemble};
use quarry_search::core::SearchContext;
use quarry_search::filter::parse_filter;
use quarry_search::types::SearchCriteria;

use crate::config::{QuarryConfig, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = QuarryConfig::parse();

    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let criteria = config.criteria();
    let context = config.search_context();

    if config.explain {
        return explain(&criteria, &context);
    }

    search(&config, &criteria, &context).await
}

/// Prints the request that a search would send.
fn explain(criteria: &SearchCriteria, context: &SearchContext) -> anyhow::Result<()> {
    let filter = criteria.filter().map(parse_filter).transpose()?;
    let filter = context.apply(filter)?;
    let compiled = filter
        .as_ref()
        .map(|node| QueryCompiler::new().compile(node))
        .transpose()?;

    let request = assemble(criteria, compiled);
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

#[cfg(feature = "elasticsearch")]
async fn search(
    config: &QuarryConfig,
    criteria: &SearchCriteria,
    context: &SearchContext,
) -> anyhow::Result<()> {
    use std::sync::Arc;

    use quarry_search::backends::elasticsearch::ElasticsearchClient;
    use quarry_search::core::{SearchEngine, SearchService};
    use serde_json::Value;
    use tracing::info;

    let client = ElasticsearchClient::new(config.elasticsearch_config())?;
    let index = client.index_name(&config.collection);

    info!(
        index = %index,
        nodes = %config.elasticsearch_nodes,
        page = criteria.pagination.page,
        size = criteria.pagination.size,
        "Searching"
    );

    let service = SearchService::new(SearchEngine::new(Arc::new(client)));
    let page = service
        .search(&index, criteria, context, |doc| Some(Value::Object(doc)))
        .await?;

    info!(
        total = page.total_count,
        returned = page.len(),
        "Search complete"
    );

    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

#[cfg(not(feature = "elasticsearch"))]
async fn search(
    _config: &QuarryConfig,
    _criteria: &SearchCriteria,
    _context: &SearchContext,
) -> anyhow::Result<()> {
    anyhow::bail!(
        "Searching requires the 'elasticsearch' feature. \
         Use --explain to print the compiled request, or build with: \
         cargo build -p quarry-cli --features elasticsearch"
    )
}
