use crate::api::identity::FixedIdentity;
use crate::api::routes::AppState;
use crate::api::server as api_server;
use crate::cli::opts::*;
use crate::client::{HttpApi, LocalApi};
use crate::tui::app::TuiApp;

use anyhow::{anyhow, bail, Context, Result};
use directories::ProjectDirs;
use flashgen_core::{
    repo::memory::MemoryRepo, save_batch, validate_source_text, FlashcardApi,
    GenerateFlashcardsCommand, GenerationService, MockGenerator, ProposalStore, Repository,
};
use flashgen_pg::PostgresRepo;
use flashgen_sqlite::SqliteRepo;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

pub async fn run_cli(args: Cli) -> Result<()> {
    match args.cmd.clone() {
        Command::Check { file } => check_cmd(&file),
        Command::Serve(cmd) => {
            let state = build_state(&args).await?;
            let addr: std::net::SocketAddr = cmd.addr.parse()?;
            api_server::run(state, addr).await
        }
        Command::Generate(cmd) => generate_cmd(&args, cmd).await,
        Command::Save(cmd) => save_cmd(&args, cmd).await,
        Command::List { generation_id } => {
            let repo = open_repo(&args).await?;
            list_cmd(repo, generation_id).await
        }
        Command::Review(_) => bail!("review runs on its own runtime; call run_review"),
    }
}

/// Blocking entry for the TUI; owns the runtime the background calls use.
pub fn run_review(args: &Cli, cmd: &ReviewCmd) -> Result<()> {
    let rt = Arc::new(Runtime::new()?);
    let api: Arc<dyn FlashcardApi> = match &cmd.remote {
        Some(url) => Arc::new(HttpApi::new(url.clone())),
        None => Arc::new(LocalApi::new(rt.block_on(build_state(args))?)),
    };
    let text = match &cmd.file {
        Some(p) => read_text(p)?,
        None => String::new(),
    };
    let mut app = TuiApp::new(api, rt, text);
    app.run()
}

pub async fn open_repo(args: &Cli) -> Result<Arc<dyn Repository>> {
    match args.store {
        StoreKind::Memory => Ok(Arc::new(MemoryRepo::new())),
        StoreKind::Sqlite => {
            let p = args.db_path.clone().unwrap_or_else(|| data_root().join("flashgen.sqlite3"));
            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let s = SqliteRepo::open_file(&p).await?;
            Ok(Arc::new(s))
        }
        StoreKind::Postgres => {
            let url = args
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow!("--database-url (or DATABASE_URL) is required for postgres"))?;
            let s = PostgresRepo::connect(url).await?;
            Ok(Arc::new(s))
        }
    }
}

pub async fn build_state(args: &Cli) -> Result<AppState> {
    let repo = open_repo(args).await?;
    let generator = Arc::new(MockGenerator::new(args.model.clone()));
    Ok(AppState {
        service: GenerationService::new(repo.clone(), generator),
        repo,
        identity: Arc::new(FixedIdentity(args.user_id)),
    })
}

fn data_root() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("com", "flashgen", "FlashGen") {
        pd.data_dir().to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn check_cmd(file: &Path) -> Result<()> {
    let text = read_text(file)?;
    let check = validate_source_text(&text);
    if check.valid {
        println!("ok ({} characters)", flashgen_core::char_len(&text));
        Ok(())
    } else {
        bail!(check.error.unwrap_or_else(|| "source text is empty".to_string()))
    }
}

async fn generate_cmd(args: &Cli, cmd: GenerateCmd) -> Result<()> {
    let api = LocalApi::new(build_state(args).await?);
    let req = GenerateFlashcardsCommand { source_text: read_text(&cmd.file)? };
    let out = api
        .create_generation(&req)
        .await
        .map_err(|e| anyhow!(e.user_message(flashgen_core::ClientAction::Generate)))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    println!("generation {} ({} proposals)", out.generation_id, out.generated_count);
    for (i, p) in out.flashcards_proposals.iter().enumerate() {
        println!("{}\tQ: {}\n\tA: {}", i + 1, p.front, p.back);
    }
    Ok(())
}

async fn save_cmd(args: &Cli, cmd: SaveCmd) -> Result<()> {
    let api = LocalApi::new(build_state(args).await?);
    let req = GenerateFlashcardsCommand { source_text: read_text(&cmd.file)? };
    let out = api
        .create_generation(&req)
        .await
        .map_err(|e| anyhow!(e.user_message(flashgen_core::ClientAction::Generate)))?;

    let store = ProposalStore::from_proposals(out.flashcards_proposals);
    let saved = save_batch(&api, store.entries(), !cmd.all, Some(out.generation_id))
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    info!(generation_id = out.generation_id, count = saved.len(), "saved generation");
    for c in saved {
        println!("{}\t{}\t{}", c.id, c.source, c.front);
    }
    Ok(())
}

async fn list_cmd(repo: Arc<dyn Repository>, generation_id: Option<i64>) -> Result<()> {
    let cards = repo.list_flashcards(generation_id).await?;
    if cards.is_empty() {
        println!("no flashcards");
        return Ok(());
    }
    for c in cards {
        let generation = c.generation_id.map(|g| g.to_string()).unwrap_or_else(|| "-".to_string());
        println!("{}\t{}\tgeneration={}\t{}\t{}", c.id, c.source, generation, c.front, c.back);
    }
    Ok(())
}
