//! Builds a small dynamic timeline and prints the renderer JSON
//!
//! Usage:
//!   cargo run --bin timeline_demo -- [config.toml]

use std::path::PathBuf;

use geo::{polygon, MultiPolygon};
use pax_atlas::{
    Aggregator, AtlasConfig, Flag, GeometryCache, MemoryProvider, Result, Territory,
    TerritoryResolver,
};

fn block(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: x0, y: y0),
        (x: x1, y: y0),
        (x: x1, y: y1),
        (x: x0, y: y1),
    ]])
}

fn demo_provider() -> Result<MemoryProvider> {
    let mut provider = MemoryProvider::new();
    provider.insert("magadha", block(84.0, 24.0, 88.0, 27.0))?;
    provider.insert("gandhara", block(70.0, 33.0, 73.0, 35.0))?;
    provider.insert("deccan", block(74.0, 15.0, 80.0, 20.0))?;
    provider.insert("kalinga", block(83.0, 18.0, 87.0, 22.0))?;
    Ok(provider)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pax_atlas=debug".parse().map_err(|e| {
                    pax_atlas::AtlasError::Config(format!("bad log directive: {e}"))
                })?),
        )
        .init();

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => AtlasConfig::load(&path)?,
        None => AtlasConfig::default(),
    };
    tracing::info!(cache_dir = %config.cache.cache_dir.display(), "Starting timeline demo");

    let provider = demo_provider()?;
    let mut cache = GeometryCache::from_config(&config.cache);

    let flags = vec![
        Flag::new("Maurya", Territory::key("magadha") | Territory::key("gandhara"))
            .with_period(-322, -185)
            .with_color("#c0392b")
            .with_note("Chandragupta"),
        Flag::new("Maurya", Territory::key("kalinga"))
            .with_period(-261, -185)
            .with_note("Kalinga war"),
        Flag::new("Kalinga", Territory::key("kalinga")).with_period(-350, -261),
        Flag::new("Satavahana", Territory::key("deccan") - Territory::key("kalinga"))
            .with_period(-100, 200)
            .with_classes("dynasty southern"),
        Flag::new("Gupta", Territory::key("magadha")).with_period(320, 550),
    ];

    let mut aggregator = Aggregator::from_config(&config);
    let timeline = {
        let mut resolver = TerritoryResolver::with_cache(&provider, &mut cache);
        aggregator.aggregate(&flags, Some(-400), &mut resolver)?
    };

    println!("{}", serde_json::to_string_pretty(&timeline)?);
    println!("{}", serde_json::to_string_pretty(aggregator.stats())?);
    println!("{}", serde_json::to_string_pretty(&cache.stats())?);
    Ok(())
}
