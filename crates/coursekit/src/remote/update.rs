use coursekit_core::entity::Entity;
use serde::{Deserialize, Serialize};

use super::create::parse_payload;
use super::get::display_entity;
use super::ResourceClient;
use crate::prelude::*;

/// Options for updating a remote resource
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct UpdateOptions {
    /// Resource id
    pub id: u64,

    /// JSON object with the fields to change
    #[arg(short, long, value_parser = parse_payload)]
    pub data: serde_json::Value,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Public data function
pub async fn update_data(
    client: &ResourceClient<Entity>,
    id: u64,
    payload: &serde_json::Value,
) -> Result<Entity> {
    Ok(client.update(id, payload).await?)
}

pub async fn handler(client: &ResourceClient<Entity>, options: UpdateOptions) -> Result<()> {
    let updated = update_data(client, options.id, &options.data).await?;
    display_entity(&updated, options.json)
}
