use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use repogauge::model::HistorySize;
use repogauge::repository::{GitObjectStore, RepoScanner};
use repogauge::util::{format_count, format_size};

struct Args {
    repo_path: String,
    refs_prefix: Option<String>,
    json: bool,
    quiet: bool,
    preload: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        repo_path: String::from("."),
        refs_prefix: None,
        json: false,
        quiet: false,
        preload: true,
    };

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "--json" => args.json = true,
            "--quiet" => args.quiet = true,
            "--no-preload" => args.preload = false,
            "--refs" => {
                i += 1;
                let prefix = argv.get(i).context("--refs requires a prefix argument")?;
                args.refs_prefix = Some(prefix.clone());
            }
            arg if !arg.starts_with("--") => args.repo_path = arg.to_string(),
            arg => bail!("unknown flag: {arg}"),
        }
        i += 1;
    }
    Ok(args)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    let store = GitObjectStore::open(&args.repo_path)
        .with_context(|| format!("Could not open repository at {}", args.repo_path))?;

    let mut scanner = if args.quiet || args.json {
        RepoScanner::quiet()
    } else {
        RepoScanner::new()
    };
    if !args.preload {
        scanner = scanner.skip_preload();
    }

    let prefix = args.refs_prefix;
    let history = scanner.scan(store, |reference| {
        prefix
            .as_deref()
            .is_none_or(|p| reference.name.starts_with(p))
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&history)?);
    } else {
        print_summary(&history);
    }
    Ok(())
}

fn print_summary(history: &HistorySize) {
    let count = |c: repogauge::model::Count| format_count(c.get());
    let size = |c: repogauge::model::Count| format_size(u64::from(c.get()));

    println!("Blobs");
    println!("  {:<32} {:>14}", "unique count", count(history.unique_blob_count));
    println!("  {:<32} {:>14}", "total size", size(history.unique_blob_size));
    println!("  {:<32} {:>14}", "maximum size", size(history.max_blob_size));
    println!("Trees");
    println!("  {:<32} {:>14}", "unique count", count(history.unique_tree_count));
    println!("  {:<32} {:>14}", "total size", size(history.unique_tree_size));
    println!("  {:<32} {:>14}", "total entries", count(history.unique_tree_entries));
    println!("  {:<32} {:>14}", "maximum entries", count(history.max_tree_entries));
    println!("  {:<32} {:>14}", "maximum path depth", count(history.max_path_depth));
    println!("  {:<32} {:>14}", "maximum expanded trees", count(history.max_expanded_tree_count));
    println!("  {:<32} {:>14}", "maximum expanded blobs", count(history.max_expanded_blob_count));
    println!("  {:<32} {:>14}", "maximum expanded size", size(history.max_expanded_blob_size));
    println!("  {:<32} {:>14}", "maximum expanded links", count(history.max_expanded_link_count));
    println!("  {:<32} {:>14}", "maximum expanded submodules", count(history.max_expanded_submodule_count));
    println!("Commits");
    println!("  {:<32} {:>14}", "unique count", count(history.unique_commit_count));
    println!("  {:<32} {:>14}", "total size", size(history.unique_commit_size));
    println!("  {:<32} {:>14}", "maximum size", size(history.max_commit_size));
    println!("  {:<32} {:>14}", "maximum parents", count(history.max_parent_count));
    println!("  {:<32} {:>14}", "maximum history depth", count(history.max_ancestor_depth));
    println!("Annotated tags");
    println!("  {:<32} {:>14}", "unique count", count(history.unique_tag_count));
    println!("  {:<32} {:>14}", "maximum tag depth", count(history.max_tag_depth));
    println!("References");
    println!("  {:<32} {:>14}", "count", count(history.reference_count));
    println!("  {:<32} {:>14}", "to commits", count(history.references_to_commits));
    println!("  {:<32} {:>14}", "to tags", count(history.references_to_tags));
    println!("  {:<32} {:>14}", "to trees", count(history.references_to_trees));
    println!("  {:<32} {:>14}", "to blobs", count(history.references_to_blobs));
}
