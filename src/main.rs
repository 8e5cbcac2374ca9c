use clap::Parser;
use std::path::Path;
use std::sync::Arc;

use symdex::{
    read_slab_file, sort_text, split_qualified_name, Dex, FuzzyFindRequest, LookupRequest,
    MemIndex, NameMatcher, SubsequenceMatcher, Symbol, SymbolIndex, SymbolSlab,
};

mod cli;
use cli::{Cli, Commands, Engine};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Query {
            slab,
            query,
            scope,
            limit,
            completion,
            engine,
        } => run_query(&slab, &query, scope, limit, completion, engine),
        Commands::Lookup { slab, ids } => run_lookup(&slab, &ids),
        Commands::Inspect { slab } => run_inspect(&slab),
    };

    if let Err(message) = result {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}

fn load(path: &Path) -> Result<Arc<SymbolSlab>, String> {
    read_slab_file(path)
        .map(Arc::new)
        .map_err(|err| format!("{}: {err}", path.display()))
}

fn run_query(
    slab_path: &Path,
    raw_query: &str,
    mut scopes: Vec<String>,
    limit: usize,
    completion: bool,
    engine: Engine,
) -> Result<(), String> {
    let slab = load(slab_path)?;

    // Query text must stay separator-free; a qualified query becomes a
    // scope filter plus the bare name.
    let (qualifier, name) = split_qualified_name(raw_query);
    if !qualifier.is_empty() {
        scopes.push(qualifier.to_string());
    }

    let req = FuzzyFindRequest {
        query: name.to_string(),
        scopes,
        restrict_for_code_completion: completion,
        max_candidate_count: limit,
    };
    let matcher = SubsequenceMatcher::new(&req.query);

    let mut results: Vec<Symbol> = Vec::new();
    let mut collect = |sym: &Symbol| results.push(sym.clone());
    let more = match engine {
        Engine::Dex => Dex::build(slab).fuzzy_find(&req, &matcher, &mut collect),
        Engine::Linear => MemIndex::build(slab).fuzzy_find(&req, &matcher, &mut collect),
    };

    for (rank, sym) in results.iter().enumerate() {
        let score = matcher
            .match_name(&sym.name)
            .map(|name_score| name_score * symdex::quality(sym))
            .unwrap_or_default();
        println!(
            "{:>3}. {}{}{}  [{:?}] refs={} sort={}",
            rank + 1,
            sym.scope,
            sym.name,
            sym.signature,
            sym.info.kind,
            sym.references,
            sort_text(score, &sym.name),
        );
    }
    if more {
        println!("... more results may exist; raise --limit");
    }
    Ok(())
}

fn run_lookup(slab_path: &Path, raw_ids: &[String]) -> Result<(), String> {
    let slab = load(slab_path)?;
    let mut ids = Vec::with_capacity(raw_ids.len());
    for raw in raw_ids {
        ids.push(raw.parse().map_err(|err| format!("{err}"))?);
    }

    let index = MemIndex::build(slab);
    let mut found = 0usize;
    index.lookup(&LookupRequest { ids: ids.clone() }, &mut |sym| {
        found += 1;
        println!("{} {}{}", sym.id, sym.scope, sym.name);
        if let Some(decl) = &sym.canonical_declaration {
            println!("     declared at {}:{}", decl.file_uri, decl.start.line);
        }
    });
    println!("{found}/{} ids found", ids.len());
    Ok(())
}

fn run_inspect(slab_path: &Path) -> Result<(), String> {
    let slab = load(slab_path)?;
    println!("symbols: {}", slab.len());

    let dex = Dex::build(slab.clone());
    let linear = MemIndex::build(slab);
    println!("dex engine:    ~{} bytes", dex.estimate_memory_usage());
    println!("linear engine: ~{} bytes", linear.estimate_memory_usage());
    Ok(())
}
