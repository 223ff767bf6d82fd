use colored::Colorize;
use coursekit_core::entity::Entity;
use coursekit_core::pagination::PageResult;
use coursekit_core::query::QueryParams;
use serde::{Deserialize, Serialize};

use super::ResourceClient;
use crate::prelude::{println, *};

/// Options for listing remote resources
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
#[command(after_help = "EXAMPLES:
  # Second page of published posts matching \"intro\":
  coursekit remote wp posts list --param search=intro --param status=publish --page 2

  # Tutor courses, 20 per page:
  coursekit remote tutor courses list --param per_page=20 --json

NOTES:
  - Parameters are sent in the order given; repeating a key keeps the last value
  - An empty value (key=) is sent as-is; leave the flag out to leave a filter unset")]
pub struct ListOptions {
    /// Query parameter as key=value (repeatable)
    #[arg(short = 'P', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Page number, sent as the `page` parameter
    #[arg(short, long)]
    pub page: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parse a `key=value` argument
pub fn parse_param(raw: &str) -> std::result::Result<(String, String), Error> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(Error::InvalidParam(raw.to_string())),
    }
}

/// Assemble the request parameters from CLI options
pub fn build_params(options: &ListOptions) -> QueryParams {
    let mut params = QueryParams::new();
    for (key, value) in &options.params {
        params.set(key.as_str(), value.as_str());
    }
    if let Some(page) = options.page {
        params.set("page", page);
    }
    params
}

/// Public data function
pub async fn list_data(
    client: &ResourceClient<Entity>,
    params: &QueryParams,
) -> Result<PageResult<Entity>> {
    Ok(client.list(params).await?)
}

pub async fn handler(client: &ResourceClient<Entity>, options: ListOptions) -> Result<()> {
    let params = build_params(&options);
    let result = list_data(client, &params).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.data.is_empty() {
        println!("{}", "No matching resources found.".yellow());
    } else {
        let mut table = new_table();
        table.add_row(prettytable::row!["ID".bold().cyan(), "Label".bold().cyan()]);
        for entity in &result.data {
            table.add_row(prettytable::row![
                entity.id,
                entity.label().unwrap_or("(no label)")
            ]);
        }
        table.printstd();
    }

    if let Some(meta) = result.meta {
        println!(
            "\nPage {} of {} ({} total)",
            meta.current_page.to_string().bright_cyan(),
            meta.pages.to_string().bright_cyan(),
            meta.total.to_string().bright_cyan()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursekit_core::query::encode_query;

    fn sample_options(params: &[(&str, &str)], page: Option<u32>) -> ListOptions {
        ListOptions {
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            page,
            json: false,
        }
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("search=intro").unwrap(),
            ("search".to_string(), "intro".to_string())
        );
        assert_eq!(
            parse_param("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_param("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn test_build_params_keeps_order_and_last_value() {
        let options = sample_options(
            &[("search", "a"), ("status", "publish"), ("search", "b")],
            Some(2),
        );
        assert_eq!(
            encode_query(&build_params(&options)),
            "search=b&status=publish&page=2"
        );
    }

    #[test]
    fn test_page_flag_overrides_param() {
        let options = sample_options(&[("page", "9")], Some(3));
        assert_eq!(encode_query(&build_params(&options)), "page=3");
    }
}
