mod input;
mod log_duration;
mod output;
mod paginate;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use search_core::{
    process_queries_joined_with, remove_duplicates, DocId, DocumentStatus, Execution, RequestQueue,
    SearchEngine, StopWords, REQUEST_WINDOW,
};
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, Write};
use std::path::Path;

use input::{load_documents, read_queries};
use log_duration::LogDuration;
use output::{write_json_line, write_match, write_pages, MatchOutput, QueryOutput};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Load documents into an in-memory TF-IDF index and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct IndexArgs {
    /// Input path (JSON/JSONL file or directory)
    #[arg(long)]
    input: String,
    /// Space separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// Use the built-in English stop-word list instead of --stop-words
    #[arg(long, default_value_t = false)]
    english_stop_words: bool,
    /// Remove documents whose term set repeats an earlier document
    #[arg(long, default_value_t = false)]
    dedup: bool,
}

#[derive(Args)]
struct QueryArgs {
    /// Query text; may be repeated
    #[arg(long = "query")]
    queries: Vec<String>,
    /// File with one query per line
    #[arg(long)]
    queries_file: Option<String>,
    /// Print JSON lines instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run queries and print the top documents
    Search {
        #[command(flatten)]
        index: IndexArgs,
        #[command(flatten)]
        queries: QueryArgs,
        /// Only return documents with this status
        #[arg(long, default_value = "ACTIVE")]
        status: DocumentStatus,
        /// Run all queries in parallel and print one joined result list
        #[arg(long, default_value_t = false)]
        batch: bool,
        /// Documents per printed page
        #[arg(long, default_value_t = 5)]
        page_size: usize,
        /// Number of requests kept in the search history
        #[arg(long, default_value_t = REQUEST_WINDOW)]
        history_window: usize,
    },
    /// Show which query terms a document matches
    Match {
        #[command(flatten)]
        index: IndexArgs,
        #[command(flatten)]
        queries: QueryArgs,
        /// Document id to match against
        #[arg(long)]
        id: DocId,
        /// Evaluate terms on the rayon pool
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Report documents removed as duplicates
    Dedup {
        #[command(flatten)]
        index: IndexArgs,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { index, queries, status, batch, page_size, history_window } => {
            let engine = build_engine(&index)?;
            let list = collect_queries(&queries)?;
            let opts = SearchOptions { status, batch, page_size, history_window, json: queries.json };
            search(&engine, &list, &opts, &mut io::stdout().lock())
        }
        Commands::Match { index, queries, id, parallel } => {
            let engine = build_engine(&index)?;
            let list = collect_queries(&queries)?;
            let policy = if parallel { Execution::Parallel } else { Execution::Sequential };
            match_documents(&engine, &list, id, policy, queries.json)
        }
        Commands::Dedup { index } => {
            let mut engine = load_engine(&index)?;
            let removed = remove_duplicates(&mut engine);
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for id in &removed {
                writeln!(out, "Found duplicate document id {id}")?;
            }
            tracing::info!(removed = removed.len(), remaining = engine.document_count(), "dedup complete");
            Ok(())
        }
    }
}

fn load_engine(args: &IndexArgs) -> Result<SearchEngine> {
    let _timer = LogDuration::new("build index");
    let stop_words = if args.english_stop_words {
        StopWords::english()
    } else {
        StopWords::parse(&args.stop_words)?
    };
    let mut engine = SearchEngine::with_stop_words(stop_words);

    let docs = load_documents(Path::new(&args.input))?;
    let total = docs.len();
    for doc in docs {
        // A rejected document is reported and skipped; the rest still get indexed.
        if let Err(err) = engine.add_document(doc.id, &doc.text, doc.status, &doc.ratings) {
            tracing::warn!(doc_id = doc.id, error = %err, "document rejected");
        }
    }
    tracing::info!(read = total, indexed = engine.document_count(), terms = engine.term_count(), "ingested documents");
    Ok(engine)
}

fn build_engine(args: &IndexArgs) -> Result<SearchEngine> {
    let mut engine = load_engine(args)?;
    if args.dedup {
        let removed = remove_duplicates(&mut engine);
        tracing::info!(removed = removed.len(), "removed duplicate documents");
    }
    Ok(engine)
}

fn collect_queries(args: &QueryArgs) -> Result<Vec<String>> {
    let mut queries = args.queries.clone();
    if let Some(path) = &args.queries_file {
        queries.extend(read_queries(Path::new(path))?);
    }
    if queries.is_empty() {
        anyhow::bail!("no queries given, use --query or --queries-file");
    }
    Ok(queries)
}

struct SearchOptions {
    status: DocumentStatus,
    batch: bool,
    page_size: usize,
    history_window: usize,
    json: bool,
}

fn search<W: Write>(
    engine: &SearchEngine,
    queries: &[String],
    opts: &SearchOptions,
    out: &mut W,
) -> Result<()> {
    let SearchOptions { status, batch, page_size, history_window, json } = *opts;

    if batch {
        let joined = {
            let _timer = LogDuration::new("process queries joined");
            process_queries_joined_with(engine, queries, status)?
        };
        if json {
            write_json_line(out, &joined)?;
        } else {
            write_pages(out, &joined, page_size)?;
        }
        return Ok(());
    }

    let mut history = RequestQueue::with_capacity(history_window);
    for query in queries {
        let found = {
            let _timer = LogDuration::new(format!("query {query:?}"));
            history.add_find_request_by_status(engine, query, status)
        };
        let found = match found {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(query = %query, error = %err, "query rejected");
                continue;
            }
        };
        if json {
            write_json_line(out, &QueryOutput { query, results: &found })?;
        } else {
            writeln!(out, "Results for query: {query}")?;
            write_pages(out, &found, page_size)?;
        }
    }
    tracing::info!(
        requests = history.len(),
        no_result_requests = history.no_result_requests(),
        "request history"
    );
    Ok(())
}

fn match_documents(
    engine: &SearchEngine,
    queries: &[String],
    id: DocId,
    policy: Execution,
    json: bool,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for query in queries {
        let matched = match engine.match_document_with_policy(policy, query, id) {
            Ok(matched) => matched,
            Err(err) => {
                tracing::warn!(query = %query, error = %err, "query rejected");
                continue;
            }
        };
        if json {
            write_json_line(&mut out, &MatchOutput { query, document_id: id, matched: &matched })?;
        } else {
            write_match(&mut out, id, &matched)?;
        }
    }
    Ok(())
}
