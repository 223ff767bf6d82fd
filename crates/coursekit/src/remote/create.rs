use coursekit_core::entity::Entity;
use serde::{Deserialize, Serialize};

use super::get::display_entity;
use super::ResourceClient;
use crate::prelude::*;

/// Options for creating a remote resource
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct CreateOptions {
    /// JSON object with the fields to set
    #[arg(short, long, value_parser = parse_payload)]
    pub data: serde_json::Value,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parse a JSON object payload; anything but an object is rejected
pub fn parse_payload(raw: &str) -> std::result::Result<serde_json::Value, Error> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value @ serde_json::Value::Object(_)) => Ok(value),
        Ok(_) => Err(Error::InvalidPayload("expected a JSON object".to_string())),
        Err(e) => Err(Error::InvalidPayload(e.to_string())),
    }
}

/// Public data function
pub async fn create_data(
    client: &ResourceClient<Entity>,
    payload: &serde_json::Value,
) -> Result<Entity> {
    Ok(client.create(payload).await?)
}

pub async fn handler(client: &ResourceClient<Entity>, options: CreateOptions) -> Result<()> {
    let created = create_data(client, &options.data).await?;
    display_entity(&created, options.json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payload() {
        let value = parse_payload(r#"{"title":"New"}"#).unwrap();
        assert_eq!(value["title"], "New");

        assert!(matches!(
            parse_payload("[1,2]"),
            Err(Error::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_payload("{title}"),
            Err(Error::InvalidPayload(_))
        ));
    }
}
