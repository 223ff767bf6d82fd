use colored::Colorize;
use coursekit_core::entity::{DeleteOutcome, Entity};
use serde::{Deserialize, Serialize};

use super::ResourceClient;
use crate::prelude::{println, *};

/// Options for deleting a remote resource
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct DeleteOptions {
    /// Resource id
    pub id: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Public data function
pub async fn delete_data(client: &ResourceClient<Entity>, id: u64) -> Result<DeleteOutcome> {
    Ok(client.remove(id).await?)
}

pub async fn handler(client: &ResourceClient<Entity>, options: DeleteOptions) -> Result<()> {
    let outcome = delete_data(client, options.id).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if outcome.success {
        println!("{} {}", "Deleted".green(), outcome.message);
    } else {
        println!("{} {}", "Not deleted".yellow(), outcome.message);
    }

    Ok(())
}
