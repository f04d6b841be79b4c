use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use catalog_index::{AdjacencyIndex, PrefixIndex, RangeSumArray, RatingIndex, RatingIndexConfig, ScoreMatch, StalePolicy};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "catalog-index", about = "Build in-memory catalog indexes and print their contents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank entities from `name,rating` lines.
    Ratings {
        /// Input file, or `-` for stdin
        #[arg(long, default_value = "-")]
        input: PathBuf,
        /// Path to a JSON rating-index config
        #[arg(long)]
        config: Option<PathBuf>,
        /// Keep superseded rank entries instead of relocating them
        #[arg(long)]
        retain_stale: bool,
        /// Match `--with-rating` within this absolute tolerance
        #[arg(long)]
        tolerance: Option<f64>,
        /// List entities whose average equals this value
        #[arg(long, allow_negative_numbers = true)]
        with_rating: Option<f64>,
        /// Only print the best and worst N entries
        #[arg(long)]
        top: Option<usize>,
    },

    /// Run range-sum updates and queries over a fixed array.
    Range {
        /// Initial values, comma separated
        #[arg(long, value_delimiter = ',', required = true, allow_negative_numbers = true)]
        values: Vec<i64>,
        /// Point update `index=value`, applied in order before queries
        #[arg(long = "update")]
        updates: Vec<String>,
        /// Inclusive query `left:right`
        #[arg(long = "query")]
        queries: Vec<String>,
    },

    /// Autocomplete a prefix against a word list.
    Suggest {
        /// Word list, one per line, or `-` for stdin
        #[arg(long, default_value = "-")]
        words: PathBuf,
        /// Prefix to complete
        #[arg(long)]
        prefix: String,
    },

    /// Breadth- and depth-first traversal of a directed graph.
    Traverse {
        /// Edges `from-to`, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        edges: Vec<String>,
        /// Start node
        #[arg(long)]
        start: u64,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ratings {
            input,
            config,
            retain_stale,
            tolerance,
            with_rating,
            top,
        } => {
            let mut config = match config {
                Some(path) => serde_json::from_str(&fs::read_to_string(&path)?)
                    .with_context(|| format!("parsing config {}", path.display()))?,
                None => RatingIndexConfig::default(),
            };
            if retain_stale {
                config.stale_entries = StalePolicy::Retain;
            }
            if let Some(epsilon) = tolerance {
                config.score_match = ScoreMatch::tolerance(epsilon)?;
            }
            cmd_ratings(&input, config, with_rating, top)?;
        }
        Commands::Range {
            values,
            updates,
            queries,
        } => {
            cmd_range(&values, &updates, &queries)?;
        }
        Commands::Suggest { words, prefix } => {
            cmd_suggest(&words, &prefix)?;
        }
        Commands::Traverse { edges, start } => {
            cmd_traverse(&edges, start)?;
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn cmd_ratings(
    input: &Path,
    config: RatingIndexConfig,
    with_rating: Option<f64>,
    top: Option<usize>,
) -> anyhow::Result<()> {
    let text = read_input(input)?;
    let mut index = RatingIndex::with_config(config);

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (name, rating) =
            line.rsplit_once(',').ok_or_else(|| anyhow!("line {}: expected `name,rating`", number + 1))?;
        let rating: f64 = rating.trim().parse().with_context(|| format!("line {}: bad rating", number + 1))?;
        index.add_rating(name.trim(), rating).with_context(|| format!("line {}", number + 1))?;
    }
    info!(entities = index.entity_count(), entries = index.len(), "ratings loaded");

    let limit = top.unwrap_or(usize::MAX);
    println!("Ascending:");
    for (name, average) in index.worst(limit) {
        println!("  {average:>8.3}  {name}");
    }
    println!("Descending:");
    for (name, average) in index.best(limit) {
        println!("  {average:>8.3}  {name}");
    }
    if let Some(target) = with_rating {
        println!("Rated {target}:");
        for name in index.with_rating(target) {
            println!("  {name}");
        }
    }

    Ok(())
}

fn cmd_range(values: &[i64], updates: &[String], queries: &[String]) -> anyhow::Result<()> {
    let mut array = RangeSumArray::new(values).context("initial values")?;

    for update in updates {
        let (index, value) = update.split_once('=').ok_or_else(|| anyhow!("expected `index=value`, got {update:?}"))?;
        let index: usize = index.trim().parse()?;
        let value: i64 = value.trim().parse()?;
        array.update(index, value).with_context(|| format!("update({index}, {value})"))?;
        println!("update({index}, {value})");
    }
    for query in queries {
        let (left, right) = query.split_once(':').ok_or_else(|| anyhow!("expected `left:right`, got {query:?}"))?;
        let left: usize = left.trim().parse()?;
        let right: usize = right.trim().parse()?;
        println!("query({left}, {right}) = {}", array.query(left, right)?);
    }

    Ok(())
}

fn cmd_suggest(words: &Path, prefix: &str) -> anyhow::Result<()> {
    let text = read_input(words)?;
    let mut index = PrefixIndex::new();
    let added = index.bulk_insert(text.lines().map(str::trim).filter(|line| !line.is_empty()))?;
    info!(added, "words indexed");

    for suggestion in index.suggestions(prefix) {
        println!("{suggestion}");
    }

    Ok(())
}

fn cmd_traverse(edges: &[String], start: u64) -> anyhow::Result<()> {
    let mut graph = AdjacencyIndex::new();
    for edge in edges {
        let (from, to) = edge.split_once('-').ok_or_else(|| anyhow!("expected `from-to`, got {edge:?}"))?;
        graph.add_edge(from.trim().parse::<u64>()?, to.trim().parse::<u64>()?);
    }

    let join = |nodes: Vec<u64>| nodes.iter().map(u64::to_string).collect::<Vec<_>>().join(" ");
    println!("BFS: {}", join(graph.bfs(start)));
    println!("DFS: {}", join(graph.dfs(start)));

    Ok(())
}
