//! Course write-path validation
//!
//! Validation failures are values, not errors: [`validate_course_form`] returns
//! a field-keyed map so callers can redisplay the input with per-field messages.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::DateInput;

/// Raw course form input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseForm {
    pub title: Option<String>,
    pub category_id: Option<String>,
    pub sub_category_id: Option<String>,
    pub post_date: Option<String>,
    /// Only the literal `"true"` marks the course as free
    pub is_free: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A course that passed validation and can be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCourse {
    pub title: String,
    pub category_id: String,
    pub sub_category_id: String,
    pub post_date: DateTime<Utc>,
    pub is_free: bool,
    pub tag_ids: Vec<String>,
}

/// Field name to message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn required<'a>(
    value: &'a Option<String>,
    field: &str,
    message: &str,
    errors: &mut FieldErrors,
) -> Option<&'a str> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.insert(field, message);
            None
        }
    }
}

/// Validate a course form before any write is attempted
pub fn validate_course_form(form: &CourseForm) -> Result<ValidCourse, FieldErrors> {
    let mut errors = FieldErrors::default();

    let title = required(&form.title, "title", "Title is required", &mut errors);
    let category_id = required(
        &form.category_id,
        "categoryId",
        "Category is required",
        &mut errors,
    );
    let sub_category_id = required(
        &form.sub_category_id,
        "subCategoryId",
        "SubCategory is required",
        &mut errors,
    );
    let post_date = required(
        &form.post_date,
        "postDate",
        "Post Date is required",
        &mut errors,
    )
    .and_then(|raw| {
        let parsed = DateInput::parse(raw).map(|d| d.start());
        if parsed.is_none() {
            errors.insert("postDate", "Post Date is invalid");
        }
        parsed
    });

    match (title, category_id, sub_category_id, post_date) {
        (Some(title), Some(category_id), Some(sub_category_id), Some(post_date))
            if errors.is_empty() =>
        {
            let mut tag_ids: Vec<String> = Vec::with_capacity(form.tags.len());
            for tag in form.tags.iter().filter(|t| !t.is_empty()) {
                if !tag_ids.contains(tag) {
                    tag_ids.push(tag.clone());
                }
            }

            Ok(ValidCourse {
                title: title.to_string(),
                category_id: category_id.to_string(),
                sub_category_id: sub_category_id.to_string(),
                post_date,
                is_free: form.is_free.as_deref() == Some("true"),
                tag_ids,
            })
        }
        _ => Err(errors),
    }
}
