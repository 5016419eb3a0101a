use std::{env, process::ExitCode, sync::Arc};

use catalog_recommender::{
    Catalog, Evaluation, Hits, InteractionLog, Recommender, RecommenderConfig, Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage: catalog-recommender --catalog FILE [options]");
    eprintln!("  --catalog FILE       : CBOR catalog snapshot (required)");
    eprintln!("  --interactions FILE  : CBOR interaction log (for --user)");
    eprintln!("  --config FILE        : CBOR recommender config");
    eprintln!("  --category NAME      : restrict to one main category (\"All\" = no filter)");
    eprintln!("  --top N              : number of results");
    eprintln!("  --query TEXT         : items similar to the first name containing TEXT");
    eprintln!("  --user ID            : collaborative recommendations for user ID");
    eprintln!("  --evaluate NAME      : precision / recall / F1 for the item named NAME");
    eprintln!("  (no mode flag)       : top rated items");
    eprintln!("  log level via RUST_LOG (default: warn)");
}

enum Mode {
    TopRated,
    Similar(String),
    User(u64),
    Evaluate(String),
}

struct Args {
    catalog: String,
    interactions: Option<String>,
    config: Option<String>,
    category: Option<String>,
    top: Option<usize>,
    mode: Mode,
}

// None = 終了 (usage 表示済み or エラー)
fn parse_args() -> Option<Args> {
    let mut args = env::args().skip(1);
    let mut catalog = None;
    let mut interactions = None;
    let mut config = None;
    let mut category = None;
    let mut top = None;
    let mut mode = Mode::TopRated;
    while let Some(a) = args.next() {
        match a.as_str() {
            "--catalog" => {
                let Some(v) = args.next() else {
                    eprintln!("[error] --catalog requires a path");
                    return None;
                };
                catalog = Some(v);
            }
            "--interactions" => {
                let Some(v) = args.next() else {
                    eprintln!("[error] --interactions requires a path");
                    return None;
                };
                interactions = Some(v);
            }
            "--config" => {
                let Some(v) = args.next() else {
                    eprintln!("[error] --config requires a path");
                    return None;
                };
                config = Some(v);
            }
            "--category" => {
                let Some(v) = args.next() else {
                    eprintln!("[error] --category requires a name");
                    return None;
                };
                category = Some(v);
            }
            "--top" => match args.next().map(|v| v.parse::<usize>()) {
                Some(Ok(n)) => top = Some(n),
                _ => {
                    eprintln!("[error] --top needs a non-negative integer");
                    return None;
                }
            },
            "--query" => {
                let Some(v) = args.next() else {
                    eprintln!("[error] --query requires a string");
                    return None;
                };
                mode = Mode::Similar(v);
            }
            "--user" => match args.next().map(|v| v.parse::<u64>()) {
                Some(Ok(id)) => mode = Mode::User(id),
                _ => {
                    eprintln!("[error] --user needs an integer id");
                    return None;
                }
            },
            "--evaluate" => {
                let Some(v) = args.next() else {
                    eprintln!("[error] --evaluate requires an item name");
                    return None;
                };
                mode = Mode::Evaluate(v);
            }
            "-h" | "--help" => {
                print_usage();
                return None;
            }
            other => eprintln!("[warn] extra arg ignored: {}", other),
        }
    }
    let Some(catalog) = catalog else {
        eprintln!("[error] --catalog is required");
        print_usage();
        return None;
    };
    Some(Args { catalog, interactions, config, category, top, mode })
}

fn print_hits(rec: &Recommender, hits: &Hits) {
    if hits.is_empty() {
        eprintln!("(no results)");
    }
    for record in hits.records(rec.catalog()) {
        println!("{}", record);
    }
}

fn run(args: Args) -> Result<()> {
    let catalog = Catalog::from_cbor_file(&args.catalog)?;
    let interactions = match &args.interactions {
        Some(path) => InteractionLog::from_cbor_file(path)?,
        None => InteractionLog::default(),
    };
    let config = match &args.config {
        Some(path) => RecommenderConfig::from_cbor_file(path)?,
        None => RecommenderConfig::default(),
    };
    info!(
        items = catalog.len(),
        interactions = interactions.len(),
        "snapshot loaded"
    );

    let mut rec = Recommender::new(Arc::new(catalog), Arc::new(interactions), config)?;
    if let Some(name) = &args.category {
        rec = rec.for_main_category(name);
    }

    match &args.mode {
        Mode::TopRated => print_hits(&rec, &rec.top_rated(args.top)),
        Mode::Similar(query) => print_hits(&rec, &rec.similar_to(query, args.top)),
        Mode::User(id) => print_hits(&rec, &rec.for_user(*id, args.top)),
        Mode::Evaluate(name) => match rec.evaluate(name, args.top) {
            Evaluation::NotFound => eprintln!("item not found: {}", name),
            Evaluation::Scored(metrics) => println!("{}", metrics),
        },
    }
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(args) = parse_args() else {
        return ExitCode::FAILURE;
    };
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("[error] {}", e);
            ExitCode::FAILURE
        }
    }
}
