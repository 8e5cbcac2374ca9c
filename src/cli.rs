use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "symdex",
    about = "Explore symbol slabs: fuzzy search, id lookup, index stats",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Which engine answers the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Engine {
    /// Trigram inverted index.
    Dex,
    /// Brute-force linear scan.
    Linear,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fuzzy-find symbols by name
    Query {
        /// Slab file (JSON text or binary container)
        slab: PathBuf,

        /// Fuzzy name pattern; a qualified name like std::vec is split into
        /// scope filter and pattern
        query: String,

        /// Restrict to symbols declared in this scope (repeatable)
        #[arg(long)]
        scope: Vec<String>,

        /// Maximum number of results
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Only symbols indexed for code completion
        #[arg(long)]
        completion: bool,

        /// Engine to query
        #[arg(long, value_enum, default_value_t = Engine::Dex)]
        engine: Engine,
    },

    /// Look up symbols by hex id
    Lookup {
        /// Slab file (JSON text or binary container)
        slab: PathBuf,

        /// 16-digit hex symbol ids
        ids: Vec<String>,
    },

    /// Print slab and index statistics
    Inspect {
        /// Slab file (JSON text or binary container)
        slab: PathBuf,
    },
}
