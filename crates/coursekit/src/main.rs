use crate::prelude::*;
use clap::Parser;

mod courses;
mod error;
mod prelude;
mod remote;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Query and manage the course catalog and its remote content backends"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "COURSEKIT_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Remote REST resources (WordPress v2, Tutor v1)
    Remote(crate::remote::App),

    /// Local course catalog
    Courses(crate::courses::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Remote(sub_app) => crate::remote::run(sub_app, app.global).await,
        SubCommands::Courses(sub_app) => crate::courses::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
