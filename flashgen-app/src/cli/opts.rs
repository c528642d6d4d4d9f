use clap::{Args, Parser, Subcommand, ValueEnum};
use flashgen_core::{UserId, DEFAULT_MODEL, DEFAULT_USER_ID};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Memory,
    Sqlite,
    Postgres,
}

#[derive(Debug, Parser, Clone)]
#[command(name = "flashgen", version, about = "Generate, review and save flashcards from source text")]
pub struct Cli {
    /// Storage backend
    #[arg(long, value_enum, env = "FLASHGEN_STORE", default_value_t = StoreKind::Sqlite)]
    pub store: StoreKind,

    /// SQLite DB path when --store sqlite (defaults to app data dir)
    #[arg(long, env = "FLASHGEN_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Connection string when --store postgres
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Model name recorded with each generation
    #[arg(long, env = "FLASHGEN_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Acting user for generations and saved flashcards
    #[arg(long, env = "FLASHGEN_USER_ID", default_value_t = DEFAULT_USER_ID)]
    pub user_id: UserId,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Launch the HTTP API
    Serve(ServeCmd),
    /// Generate proposals from a text file and print them
    Generate(GenerateCmd),
    /// Generate proposals and save them without review
    Save(SaveCmd),
    /// List saved flashcards
    List {
        #[arg(long = "generation")]
        generation_id: Option<i64>,
    },
    /// Check whether a text file is acceptable source text
    Check {
        #[arg(long)]
        file: PathBuf,
    },
    /// Review proposals interactively (TUI)
    Review(ReviewCmd),
}

#[derive(Debug, Args, Clone)]
pub struct ServeCmd {
    /// Bind address (host:port)
    #[arg(long, env = "FLASHGEN_ADDR", default_value = "127.0.0.1:8080")]
    pub addr: String,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateCmd {
    #[arg(long)]
    pub file: PathBuf,
    /// Print the raw response as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SaveCmd {
    #[arg(long)]
    pub file: PathBuf,
    /// Save every proposal rather than only accepted ones
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ReviewCmd {
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Base URL of a running server; works in-process when omitted
    #[arg(long)]
    pub remote: Option<String>,
}
