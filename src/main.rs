use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use spendscope::config::EngineConfig;
use spendscope::error::EngineResult;
use spendscope::AggregationSession;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Read a JSON feed from disk. A missing or unreadable feed counts as no data.
fn read_feed(path: Option<&String>) -> Value {
    let Some(path) = path else {
        return Value::Array(Vec::new());
    };
    match load_json(Path::new(path)) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Could not read {}: {}", path, e);
            Value::Array(Vec::new())
        }
    }
}

fn load_json(path: &Path) -> EngineResult<Value> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spendscope=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("usage: spendscope <transactions.json> [projected.json] [category]");
        std::process::exit(2);
    }

    let config = EngineConfig::from_env();
    tracing::info!(
        "spendscope {} (week length {} days, close day {})",
        spendscope::VERSION,
        config.week_length_days,
        config.statement_close_day
    );

    let actual = read_feed(args.first());
    let projected = read_feed(args.get(1));
    let category = args.get(2).map(String::as_str);

    let session = AggregationSession::new(config);
    let weekly = session.weekly(&actual, category);
    let categories = session.categories(&actual, &projected, category);

    if weekly.is_empty() {
        tracing::info!("No dated transactions to bucket");
    }

    let weeks: Vec<Value> = weekly
        .weeks
        .iter()
        .map(|week| {
            json!({
                "label": week.label(),
                "start": week.start,
                "end": week.end,
                "total": week.total,
                "count": week.count,
            })
        })
        .collect();

    let report = json!({
        "weekly": {
            "weeks": weeks,
            "total": weekly.total,
            "start": weekly.start,
            "end": weekly.end,
            "weekly_average": weekly.weekly_average,
        },
        "categories": &categories.rows,
        "selected": category.and_then(|name| categories.row(name)),
        "total_sum": categories.total_sum,
    });
    let rendered = serde_json::to_string_pretty(&report).expect("Failed to render report");
    println!("{}", rendered);
}
