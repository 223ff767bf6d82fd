use std::path::PathBuf;

use coursekit_core::catalog::DEFAULT_PAGE_SIZE;

use crate::prelude::{eprintln, *};

pub mod create;
pub mod delete;
pub mod form;
pub mod get;
pub mod list;
pub mod options;
pub mod seed;
pub mod store;
pub mod update;

pub use store::{CatalogStore, StoreError};

/// Local course catalog operations
#[derive(Debug, clap::Parser)]
#[command(name = "courses")]
#[command(about = "Query and manage the local course catalog")]
pub struct App {
    #[clap(flatten)]
    pub store: StoreArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the catalog lives and how it is paged
#[derive(Debug, Clone, clap::Args)]
pub struct StoreArgs {
    /// SQLite database path (a leading `file:` is accepted)
    #[arg(long, env = "DATABASE_URL", default_value = "coursekit.db", global = true)]
    pub database: String,

    /// Courses per page
    #[arg(long, env = "COURSEKIT_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE, global = true)]
    pub page_size: u32,
}

impl StoreArgs {
    /// Filesystem path of the database
    pub fn database_path(&self) -> PathBuf {
        let raw = self.database.trim();
        PathBuf::from(raw.strip_prefix("file:").unwrap_or(raw))
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List courses matching filters, one page at a time
    #[clap(name = "list")]
    List(list::ListOptions),

    /// Show a single course
    #[clap(name = "get")]
    Get(get::GetOptions),

    /// Create a course
    #[clap(name = "create")]
    Create(create::CreateOptions),

    /// Overwrite a course
    #[clap(name = "update")]
    Update(update::UpdateOptions),

    /// Delete a course
    #[clap(name = "delete")]
    Delete(delete::DeleteOptions),

    /// Categories, sub-categories and tags available for filtering
    #[clap(name = "options")]
    Options(options::OptionsArgs),

    /// Replace the catalog with demo data
    #[clap(name = "seed")]
    Seed,
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let path = app.store.database_path();
    if global.verbose {
        eprintln!("Using catalog at {}", path.display());
    }

    let mut store = CatalogStore::open(&path)
        .with_context(|| format!("Failed to open catalog at {}", path.display()))?;

    match app.command {
        Commands::List(options) => list::handler(&mut store, app.store.page_size, options),
        Commands::Get(options) => get::handler(&store, options),
        Commands::Create(options) => create::handler(&mut store, options),
        Commands::Update(options) => update::handler(&mut store, options),
        Commands::Delete(options) => delete::handler(&mut store, options),
        Commands::Options(args) => options::handler(&store, args),
        Commands::Seed => seed::handler(&mut store),
    }
}
