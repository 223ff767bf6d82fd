//! SQLite-backed course catalog
//!
//! The store executes what `coursekit_core::catalog` describes: the predicate
//! and ordering come from the core, the store binds parameters, runs the count
//! and the page fetch inside one transaction, and shapes the result through
//! the shared [`paginate`] skeleton.

use std::collections::HashMap;
use std::path::Path;

use chrono::{Duration, Utc};
use coursekit_core::catalog::{
    format_timestamp, CategoryOption, Course, CourseQuery, FilterOptions, NamedRef, SqlParam,
};
use coursekit_core::pagination::{paginate, PageResult};
use coursekit_core::validation::ValidCourse;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

/// Errors raised by the catalog store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Course not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Counts of records written by [`CatalogStore::seed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SeedSummary {
    pub categories: usize,
    pub sub_categories: usize,
    pub tags: usize,
    pub courses: usize,
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS categories (
      id TEXT PRIMARY KEY NOT NULL,
      name TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS sub_categories (
      id TEXT PRIMARY KEY NOT NULL,
      name TEXT NOT NULL,
      category_id TEXT NOT NULL,
      FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_sub_categories_category_id ON sub_categories(category_id);

    CREATE TABLE IF NOT EXISTS tags (
      id TEXT PRIMARY KEY NOT NULL,
      name TEXT NOT NULL
    );

    -- post_date holds RFC 3339 UTC text with millisecond precision, so text
    -- comparison is chronological.
    CREATE TABLE IF NOT EXISTS courses (
      id TEXT PRIMARY KEY NOT NULL,
      title TEXT NOT NULL,
      is_free INTEGER NOT NULL DEFAULT 0,
      post_date TEXT NOT NULL,
      category_id TEXT,
      sub_category_id TEXT,
      FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE SET NULL,
      FOREIGN KEY (sub_category_id) REFERENCES sub_categories(id) ON DELETE SET NULL
    );

    CREATE INDEX IF NOT EXISTS idx_courses_title ON courses(title);
    CREATE INDEX IF NOT EXISTS idx_courses_post_date ON courses(post_date);
    CREATE INDEX IF NOT EXISTS idx_courses_category_id ON courses(category_id);

    CREATE TABLE IF NOT EXISTS course_tags (
      course_id TEXT NOT NULL,
      tag_id TEXT NOT NULL,
      PRIMARY KEY (course_id, tag_id),
      FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE,
      FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_course_tags_tag_id ON course_tags(tag_id);
"#;

const SELECT_COURSE: &str = "SELECT c.id, c.title, c.is_free, c.post_date, \
     c.category_id, c.sub_category_id, cat.name, sub.name \
     FROM courses c \
     LEFT JOIN categories cat ON cat.id = c.category_id \
     LEFT JOIN sub_categories sub ON sub.id = c.sub_category_id";

fn new_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

fn to_value(param: &SqlParam) -> Value {
    match param {
        SqlParam::Text(s) => Value::Text(s.clone()),
        SqlParam::Int(n) => Value::Integer(*n),
    }
}

fn named(id: Option<String>, name: Option<String>) -> Option<NamedRef> {
    match (id, name) {
        (Some(id), Some(name)) => Some(NamedRef { id, name }),
        _ => None,
    }
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    let category_id: Option<String> = row.get(4)?;
    let sub_category_id: Option<String> = row.get(5)?;

    Ok(Course {
        id: row.get(0)?,
        title: row.get(1)?,
        is_free: row.get(2)?,
        post_date: row.get(3)?,
        category: named(category_id.clone(), row.get(6)?),
        sub_category: named(sub_category_id.clone(), row.get(7)?),
        category_id,
        sub_category_id,
        tags: Vec::new(),
    })
}

/// Load the tags of every course in `courses`, ordered by tag name
fn attach_tags(conn: &Connection, courses: &mut [Course]) -> rusqlite::Result<()> {
    if courses.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["?"; courses.len()].join(", ");
    let sql = format!(
        "SELECT ct.course_id, t.id, t.name FROM course_tags ct \
         JOIN tags t ON t.id = ct.tag_id \
         WHERE ct.course_id IN ({placeholders}) \
         ORDER BY t.name ASC, t.rowid ASC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(courses.iter().map(|c| &c.id)), |row| {
        Ok((
            row.get::<_, String>(0)?,
            NamedRef {
                id: row.get(1)?,
                name: row.get(2)?,
            },
        ))
    })?;

    let mut by_course: HashMap<String, Vec<NamedRef>> = HashMap::new();
    for row in rows {
        let (course_id, tag) = row?;
        by_course.entry(course_id).or_default().push(tag);
    }

    for course in courses.iter_mut() {
        course.tags = by_course.remove(&course.id).unwrap_or_default();
    }

    Ok(())
}

fn insert_course_tags(conn: &Connection, course_id: &str, tag_ids: &[String]) -> rusqlite::Result<()> {
    let mut stmt =
        conn.prepare("INSERT OR IGNORE INTO course_tags (course_id, tag_id) VALUES (?1, ?2)")?;
    for tag_id in tag_ids {
        stmt.execute(params![course_id, tag_id])?;
    }
    Ok(())
}

fn insert_named(conn: &Connection, table: &str, name: &str) -> rusqlite::Result<String> {
    let id = new_id();
    conn.execute(
        &format!("INSERT INTO {table} (id, name) VALUES (?1, ?2)"),
        params![id, name],
    )?;
    Ok(id)
}

fn insert_sub_category(conn: &Connection, category_id: &str, name: &str) -> rusqlite::Result<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO sub_categories (id, name, category_id) VALUES (?1, ?2, ?3)",
        params![id, name, category_id],
    )?;
    Ok(id)
}

fn insert_course(conn: &Connection, course: &ValidCourse) -> rusqlite::Result<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO courses (id, title, is_free, post_date, category_id, sub_category_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            course.title,
            course.is_free,
            format_timestamp(course.post_date),
            course.category_id,
            course.sub_category_id
        ],
    )?;
    insert_course_tags(conn, &id, &course.tag_ids)?;
    Ok(id)
}

/// The local course catalog
pub struct CatalogStore {
    conn: Connection,
}

impl CatalogStore {
    /// Open (or create) the catalog database at `path`
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        log::debug!("catalog schema ready");
        Ok(Self { conn })
    }

    /// List courses matching `query`
    ///
    /// The total and the page are read inside one transaction, so they agree
    /// even when writers are active on the same database.
    pub fn list_courses(&mut self, query: &CourseQuery) -> StoreResult<PageResult<Course>> {
        let predicate = query.filter.to_predicate();
        let where_sql = predicate.where_sql();
        let bound: Vec<Value> = predicate.params.iter().map(to_value).collect();

        log::debug!(
            "listing courses: {} {} page={} size={}",
            where_sql,
            query.sort.as_str(),
            query.page.page(),
            query.page.page_size()
        );

        let tx = self.conn.transaction()?;
        let result = paginate(query.page, |skip, take| -> StoreResult<_> {
            let total: i64 = tx.query_row(
                &format!("SELECT COUNT(*) FROM courses c {where_sql}"),
                params_from_iter(bound.iter()),
                |row| row.get(0),
            )?;

            let sql = format!(
                "{SELECT_COURSE} {where_sql} {} LIMIT ? OFFSET ?",
                query.sort.order_by_sql()
            );
            let mut window = bound.clone();
            window.push(Value::Integer(i64::try_from(take).unwrap_or(i64::MAX)));
            window.push(Value::Integer(i64::try_from(skip).unwrap_or(i64::MAX)));

            let mut courses = {
                let mut stmt = tx.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(window.iter()), course_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            };
            attach_tags(&tx, &mut courses)?;

            Ok((courses, u64::try_from(total).unwrap_or(0)))
        })?;
        tx.commit()?;

        Ok(result)
    }

    /// A single course with its relations
    pub fn get_course(&self, id: &str) -> StoreResult<Course> {
        let mut course = self
            .conn
            .query_row(
                &format!("{SELECT_COURSE} WHERE c.id = ?1"),
                params![id],
                course_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        attach_tags(&self.conn, std::slice::from_mut(&mut course))?;
        Ok(course)
    }

    /// Insert a validated course and connect its tags; returns the new id
    pub fn create_course(&mut self, course: &ValidCourse) -> StoreResult<String> {
        let tx = self.conn.transaction()?;
        let id = insert_course(&tx, course)?;
        tx.commit()?;

        log::debug!("created course {id}");
        Ok(id)
    }

    /// Overwrite a course and replace its tag set
    pub fn update_course(&mut self, id: &str, course: &ValidCourse) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE courses SET title = ?2, is_free = ?3, post_date = ?4, \
             category_id = ?5, sub_category_id = ?6 WHERE id = ?1",
            params![
                id,
                course.title,
                course.is_free,
                format_timestamp(course.post_date),
                course.category_id,
                course.sub_category_id
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        tx.execute("DELETE FROM course_tags WHERE course_id = ?1", params![id])?;
        insert_course_tags(&tx, id, &course.tag_ids)?;
        tx.commit()?;

        log::debug!("updated course {id}");
        Ok(())
    }

    /// Delete a course and its tag links
    pub fn delete_course(&mut self, id: &str) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM course_tags WHERE course_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM courses WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        tx.commit()?;

        log::debug!("deleted course {id}");
        Ok(())
    }

    /// Categories (with sub-categories) and tags, each ordered by name
    pub fn filter_options(&self) -> StoreResult<FilterOptions> {
        let mut subs_by_category: HashMap<String, Vec<NamedRef>> = HashMap::new();
        {
            let mut stmt = self.conn.prepare(
                "SELECT id, name, category_id FROM sub_categories ORDER BY name ASC, rowid ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(2)?,
                    NamedRef {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    },
                ))
            })?;
            for row in rows {
                let (category_id, sub) = row?;
                subs_by_category.entry(category_id).or_default().push(sub);
            }
        }

        let all_categories = {
            let mut stmt = self
                .conn
                .prepare("SELECT id, name FROM categories ORDER BY name ASC, rowid ASC")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            rows.map(|row| {
                row.map(|(id, name)| CategoryOption {
                    sub_categories: subs_by_category.remove(&id).unwrap_or_default(),
                    id,
                    name,
                })
            })
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let all_tags = {
            let mut stmt = self
                .conn
                .prepare("SELECT id, name FROM tags ORDER BY name ASC, rowid ASC")?;
            let rows = stmt.query_map([], |row| {
                Ok(NamedRef {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        Ok(FilterOptions {
            all_categories,
            all_tags,
        })
    }

    /// Wipe the catalog and fill it with demo data
    pub fn seed(&mut self) -> StoreResult<SeedSummary> {
        let mut rng = rand::thread_rng();
        let tx = self.conn.transaction()?;

        tx.execute_batch(
            "DELETE FROM course_tags; DELETE FROM courses; \
             DELETE FROM sub_categories; DELETE FROM categories; DELETE FROM tags;",
        )?;

        let mut categories: Vec<(String, Vec<String>)> = Vec::with_capacity(5);
        for i in 1..=5 {
            let category_id = insert_named(&tx, "categories", &format!("Category {i}"))?;
            let subs = (1..=3)
                .map(|j| insert_sub_category(&tx, &category_id, &format!("SubCategory {i}-{j}")))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            categories.push((category_id, subs));
        }

        let tags = (1..=10)
            .map(|i| insert_named(&tx, "tags", &format!("Tag {i}")))
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let now = Utc::now();
        let mut courses = 0;
        for i in 1..=20_i64 {
            let Some((category_id, subs)) = categories.choose(&mut rng) else {
                break;
            };
            let Some(sub_category_id) = subs.choose(&mut rng) else {
                continue;
            };

            let course = ValidCourse {
                title: format!("Course {i}"),
                category_id: category_id.clone(),
                sub_category_id: sub_category_id.clone(),
                post_date: now - Duration::days(20 - i),
                is_free: rng.gen_bool(0.5),
                tag_ids: tags.choose_multiple(&mut rng, 3).cloned().collect(),
            };
            insert_course(&tx, &course)?;
            courses += 1;
        }

        tx.commit()?;

        let summary = SeedSummary {
            categories: categories.len(),
            sub_categories: categories.iter().map(|(_, s)| s.len()).sum(),
            tags: tags.len(),
            courses,
        };
        log::info!("seeded catalog: {summary:?}");
        Ok(summary)
    }
}
