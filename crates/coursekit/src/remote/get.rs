use colored::Colorize;
use coursekit_core::entity::Entity;
use serde::{Deserialize, Serialize};

use super::ResourceClient;
use crate::prelude::{println, *};

/// Options for getting a single remote resource
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct GetOptions {
    /// Resource id
    pub id: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Public data function
pub async fn get_data(client: &ResourceClient<Entity>, id: u64) -> Result<Entity> {
    Ok(client.get(id).await?)
}

pub async fn handler(client: &ResourceClient<Entity>, options: GetOptions) -> Result<()> {
    let entity = get_data(client, options.id).await?;
    display_entity(&entity, options.json)
}

/// Print one entity, either as JSON or as a field table
pub fn display_entity(entity: &Entity, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entity)?);
        return Ok(());
    }

    println!(
        "\n{} {}\n",
        format!("#{}", entity.id).bold().cyan(),
        entity.label().unwrap_or("(no label)").bright_white()
    );

    let mut table = new_table();
    for (key, value) in &entity.fields {
        let rendered = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        table.add_row(prettytable::row![key.bold().cyan(), rendered]);
    }
    table.printstd();

    Ok(())
}
