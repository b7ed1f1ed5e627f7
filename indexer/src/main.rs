use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sift_core::corpus::{index_corpus, load_corpus};
use sift_core::{
    paginate, process_queries, remove_duplicates, DocId, DocumentStatus, ExecutionMode, LogDuration, RequestQueue,
    SearchEngine,
};
use tracing_subscriber::{fmt, EnvFilter};

use std::fs;

#[derive(Parser)]
#[command(name = "sift-indexer")]
#[command(about = "Load a corpus into the in-memory TF-IDF index and query it", long_about = None)]
struct Cli {
    #[command(flatten)]
    corpus: CorpusArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Input path (JSON/JSONL file or directory)
    #[arg(long)]
    corpus: String,
    /// Space separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// Worker threads for parallel execution; 0 runs sequentially
    #[arg(long, default_value_t = 0)]
    workers: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the top documents for a query
    Search {
        #[arg(long)]
        query: String,
        /// Only documents with this status (actual, irrelevant, banned, removed)
        #[arg(long, default_value = "actual")]
        status: DocumentStatus,
    },
    /// Print the query words found in one document
    Match {
        #[arg(long)]
        query: String,
        #[arg(long)]
        id: DocId,
    },
    /// Remove documents with identical word sets and report them
    Dedup,
    /// Run every query of a file (one per line) and report empty-result counts
    Batch {
        #[arg(long)]
        queries: String,
        /// Results printed per page
        #[arg(long, default_value_t = 2)]
        page_size: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let mode = if cli.corpus.workers == 0 { ExecutionMode::Sequential } else { ExecutionMode::Parallel(cli.corpus.workers) };
    let mut engine = build_engine(&cli.corpus)?;

    match cli.command {
        Commands::Search { query, status } => {
            let _timer = LogDuration::new("search");
            for doc in engine.find_top_documents_with(mode, &query, status)? {
                println!("{doc}");
            }
        }
        Commands::Match { query, id } => {
            let (words, status) = engine.match_document_with(mode, &query, id)?;
            if !engine.contains_document(id) {
                println!("document {id} not found");
            } else {
                println!("{{ document_id = {id}, status = {status:?}, words = {} }}", words.join(" "));
            }
        }
        Commands::Dedup => {
            let removed = remove_duplicates(&mut engine);
            println!("removed {} duplicates, {} documents left", removed.len(), engine.document_count());
        }
        Commands::Batch { queries, page_size } => run_batch(&engine, &queries, page_size)?,
    }
    Ok(())
}

fn build_engine(args: &CorpusArgs) -> Result<SearchEngine> {
    let _timer = LogDuration::new("load corpus");
    let docs = load_corpus(&args.corpus)?;
    let mut engine = SearchEngine::from_stop_text(&args.stop_words)?;
    index_corpus(&mut engine, &docs)?;
    Ok(engine)
}

fn run_batch(engine: &SearchEngine, path: &str, page_size: usize) -> Result<()> {
    let text = fs::read_to_string(path)?;
    let queries: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let results = {
        let _timer = LogDuration::new("batch queries");
        process_queries(engine, &queries)?
    };
    for (query, found) in queries.iter().zip(&results) {
        println!("query: {query}");
        for (n, page) in paginate(found, page_size).into_iter().enumerate() {
            println!("  page {}: {page}", n + 1);
        }
    }

    let mut tracker = RequestQueue::new(engine);
    for query in &queries {
        tracker.add_find_request(query)?;
    }
    tracing::info!(queries = queries.len(), empty = tracker.no_result_requests(), "batch complete");
    println!("{} of {} queries returned nothing", tracker.no_result_requests(), queries.len());
    Ok(())
}
