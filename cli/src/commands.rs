//! Subcommand handlers

use std::time::Duration;

use anyhow::{Context, Result};
use druid_query::{Client, DataSource, Query, predicate};

use crate::core::cli::{Commands, QueryArgs};
use crate::core::config::{AppConfig, QueryDefaults};

/// Run one subcommand against the configured broker
pub async fn execute(command: Commands, config: &AppConfig) -> Result<()> {
    if let Commands::Query(args) = &command
        && args.dry_run
    {
        let query = build_query(args, &config.query)?;
        println!("{}", serde_json::to_string_pretty(&query.to_json()?)?);
        return Ok(());
    }

    let client = Client::with_timeout(
        &config.broker.url,
        Duration::from_secs(config.broker.timeout_secs),
    )?;

    match command {
        Commands::Datasources => {
            let names = client
                .data_sources()
                .await
                .context("Failed to list data sources")?;
            for name in names {
                println!("{}", name);
            }
        }
        Commands::Describe { source } => {
            let source = DataSource::new(&source, client);
            let dimensions = source
                .dimensions()
                .await
                .with_context(|| format!("Failed to describe {}", source.name()))?;
            println!("dimensions: {}", dimensions.join(", "));
            println!("metrics: {}", source.metrics().await?.join(", "));
        }
        Commands::Query(args) => {
            let query = build_query(&args, &config.query)?;
            let rows = client
                .send(&query)
                .await
                .with_context(|| format!("Query on {} failed", query.source()))?;
            tracing::debug!(rows = rows.len(), "Query returned");
            for row in rows {
                println!("{}", serde_json::to_string(&row)?);
            }
        }
    }
    Ok(())
}

/// Translate `query` arguments into a [`Query`]
pub fn build_query(args: &QueryArgs, defaults: &QueryDefaults) -> Result<Query> {
    let mut query = Query::new(&args.source);

    if !args.group_by.is_empty() {
        query = query.group_by(args.group_by.iter().cloned());
    }
    if !args.long_sum.is_empty() {
        query = query.long_sum(args.long_sum.iter().cloned());
    }
    if !args.double_sum.is_empty() {
        query = query.double_sum(args.double_sum.iter().cloned());
    }
    if !args.count.is_empty() {
        query = query.count(args.count.iter().cloned());
    }

    query = query.filter(
        args.filter
            .iter()
            .map(|f| (f.dimension.clone(), f.values.clone())),
    )?;
    for exclude in &args.exclude {
        let expr = predicate(exclude.dimension.as_str()).not_equals(exclude.values.clone())?;
        query = query.and_filter(expr);
    }

    if let Some(interval) = &args.interval {
        query = query
            .interval(interval.from.as_str(), interval.to.as_str())
            .with_context(|| format!("Invalid interval {}/{}", interval.from, interval.to))?;
    }

    let granularity = args.granularity.as_deref().unwrap_or(&defaults.granularity);
    query = query.granularity(granularity, defaults.time_zone.as_deref())?;

    if args.no_cache {
        query = query.use_cache(false);
    }
    Ok(query)
}
