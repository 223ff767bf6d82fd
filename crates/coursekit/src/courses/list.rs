use colored::Colorize;
use coursekit_core::catalog::{Course, CourseQuery, RawCourseQuery};
use coursekit_core::pagination::PageResult;
use serde::{Deserialize, Serialize};

use super::CatalogStore;
use crate::prelude::{println, *};

/// Options for listing catalog courses
#[derive(Debug, Default, clap::Args, Serialize, Deserialize, Clone)]
#[command(after_help = "EXAMPLES:
  # Free courses matching \"rust\", oldest first:
  coursekit courses list --search rust --is-free yes --sort postDate-asc

  # Everything posted in March 2024:
  coursekit courses list --start-date 2024-03-01 --end-date 2024-03-31

NOTES:
  - Sort keys: title-asc, title-desc, postDate-asc, postDate-desc (default)
  - An end date without a time covers the whole day
  - Values that do not parse are ignored rather than rejected")]
pub struct ListOptions {
    /// Case-insensitive substring of the title
    #[arg(short, long)]
    pub search: Option<String>,

    /// Category id
    #[arg(long)]
    pub category_id: Option<String>,

    /// Sub-category id
    #[arg(long)]
    pub sub_category_id: Option<String>,

    /// yes, no or all
    #[arg(long)]
    pub is_free: Option<String>,

    /// Only courses carrying this tag id
    #[arg(long)]
    pub tag_id: Option<String>,

    /// Earliest post date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Latest post date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Sort key
    #[arg(long)]
    pub sort: Option<String>,

    /// Page number (1-based)
    #[arg(short, long)]
    pub page: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListOptions {
    pub fn to_raw_query(&self) -> RawCourseQuery {
        RawCourseQuery {
            search: self.search.clone(),
            category_id: self.category_id.clone(),
            sub_category_id: self.sub_category_id.clone(),
            is_free: self.is_free.clone(),
            tag_id: self.tag_id.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            sort: self.sort.clone(),
            page: self.page.clone(),
        }
    }
}

/// Public data function
pub fn list_data(
    store: &mut CatalogStore,
    raw: &RawCourseQuery,
    page_size: u32,
) -> Result<PageResult<Course>> {
    let query = CourseQuery::parse(raw, page_size);
    Ok(store.list_courses(&query)?)
}

pub fn handler(store: &mut CatalogStore, page_size: u32, options: ListOptions) -> Result<()> {
    let result = list_data(store, &options.to_raw_query(), page_size)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.data.is_empty() {
        println!("{}", "No courses found.".yellow());
    } else {
        let mut table = new_table();
        table.add_row(prettytable::row![
            "Title".bold().cyan(),
            "Category".bold().cyan(),
            "Free".bold().cyan(),
            "Posted".bold().cyan(),
            "Tags".bold().cyan(),
        ]);
        for course in &result.data {
            table.add_row(prettytable::row![
                course.title,
                category_path(course),
                if course.is_free { "yes" } else { "no" },
                course.post_date,
                tag_names(course),
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

/// `Category / Sub-category`, or whatever part of it exists
pub fn category_path(course: &Course) -> String {
    match (&course.category, &course.sub_category) {
        (Some(cat), Some(sub)) => format!("{} / {}", cat.name, sub.name),
        (Some(cat), None) => cat.name.clone(),
        (None, Some(sub)) => sub.name.clone(),
        (None, None) => "-".to_string(),
    }
}

pub fn tag_names(course: &Course) -> String {
    course
        .tags
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursekit_core::catalog::NamedRef;

    fn sample_course() -> Course {
        Course {
            id: "c1".to_string(),
            title: "Intro".to_string(),
            is_free: true,
            post_date: "2024-03-01T00:00:00.000Z".to_string(),
            category_id: Some("cat".to_string()),
            sub_category_id: None,
            category: Some(NamedRef {
                id: "cat".to_string(),
                name: "Web".to_string(),
            }),
            sub_category: None,
            tags: vec![
                NamedRef {
                    id: "t1".to_string(),
                    name: "beginner".to_string(),
                },
                NamedRef {
                    id: "t2".to_string(),
                    name: "rust".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_to_raw_query_passes_values_through() {
        let options = ListOptions {
            search: Some("intro".to_string()),
            is_free: Some("all".to_string()),
            page: Some("abc".to_string()),
            ..Default::default()
        };
        let raw = options.to_raw_query();

        assert_eq!(raw.search.as_deref(), Some("intro"));
        assert_eq!(raw.is_free.as_deref(), Some("all"));
        assert_eq!(raw.page.as_deref(), Some("abc"));
        assert_eq!(raw.sort, None);
    }

    #[test]
    fn test_list_data_uses_page_size() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.seed().unwrap();

        let raw = RawCourseQuery {
            page: Some("abc".to_string()),
            ..Default::default()
        };
        let result = list_data(&mut store, &raw, 5).unwrap();

        assert_eq!(result.data.len(), 5);
        assert_eq!(result.page_count(), Some(4));
        assert_eq!(result.current_page(), Some(1));
    }

    #[test]
    fn test_display_helpers() {
        let course = sample_course();
        assert_eq!(category_path(&course), "Web");
        assert_eq!(tag_names(&course), "beginner, rust");
    }
}
