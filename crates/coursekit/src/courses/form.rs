//! Course fields shared by `create` and `update`

use coursekit_core::validation::{validate_course_form, CourseForm, ValidCourse};
use serde::{Deserialize, Serialize};

use crate::prelude::{println, *};

#[derive(Debug, Default, clap::Args, Serialize, Deserialize, Clone)]
pub struct CourseArgs {
    /// Course title
    #[arg(long)]
    pub title: Option<String>,

    /// Category id
    #[arg(long)]
    pub category_id: Option<String>,

    /// Sub-category id
    #[arg(long)]
    pub sub_category_id: Option<String>,

    /// Post date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub post_date: Option<String>,

    /// Pass `true` to mark the course free
    #[arg(long)]
    pub is_free: Option<String>,

    /// Tag id (repeatable)
    #[arg(long = "tag", value_name = "TAG_ID")]
    pub tags: Vec<String>,
}

impl CourseArgs {
    pub fn to_form(&self) -> CourseForm {
        CourseForm {
            title: self.title.clone(),
            category_id: self.category_id.clone(),
            sub_category_id: self.sub_category_id.clone(),
            post_date: self.post_date.clone(),
            is_free: self.is_free.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Validate the form, printing `{"errors": {...}}` when it is rejected
pub fn validated(args: &CourseArgs) -> Result<ValidCourse> {
    match validate_course_form(&args.to_form()) {
        Ok(course) => Ok(course),
        Err(errors) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "errors": errors }))?
            );
            let fields = errors.iter().map(|(field, _)| field).collect::<Vec<_>>();
            Err(Error::ValidationFailed(fields.join(", ")).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_args() -> CourseArgs {
        CourseArgs {
            title: Some("Intro".to_string()),
            category_id: Some("cat".to_string()),
            sub_category_id: Some("sub".to_string()),
            post_date: Some("2024-03-01".to_string()),
            is_free: Some("true".to_string()),
            tags: vec!["t1".to_string()],
        }
    }

    #[test]
    fn test_validated_accepts_complete_form() {
        let course = validated(&sample_args()).unwrap();
        assert_eq!(course.title, "Intro");
        assert!(course.is_free);
        assert_eq!(course.tag_ids, vec!["t1".to_string()]);
    }

    #[test]
    fn test_validated_names_missing_fields() {
        let args = CourseArgs {
            title: None,
            post_date: None,
            ..sample_args()
        };
        let err = validated(&args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: postDate, title"
        );
    }
}
