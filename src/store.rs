use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("post not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Post author as stored: the structured form is the source of truth.
/// The flattened "First Last" string exists only on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub first_name: String,
    pub last_name: String,
}

impl Author {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: Author,
    pub created: DateTime<Utc>,
}

/// Fields for a new post. Required fields are required by construction;
/// `created` falls back to insertion time.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: Author,
    pub created: Option<DateTime<Utc>>,
}

/// Partial update: only fields present are applied.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<Author>,
}

fn row_to_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    let created: String = row.get(5)?;
    let created = DateTime::parse_from_rfc3339(&created)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        author: Author {
            first_name: row.get(3)?,
            last_name: row.get(4)?,
        },
        created,
    })
}

pub fn create_one(conn: &Connection, new: NewPost) -> Result<Post, StoreError> {
    let id = uuid::Uuid::new_v4().to_string();
    let created = new.created.unwrap_or_else(Utc::now);
    conn.execute(
        "INSERT INTO posts (id, title, content, author_first_name, author_last_name, created) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![id, new.title, new.content, new.author.first_name, new.author.last_name, created.to_rfc3339()],
    )?;
    Ok(Post {
        id,
        title: new.title,
        content: new.content,
        author: new.author,
        created,
    })
}

pub fn find_all(conn: &Connection) -> Result<Vec<Post>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, content, author_first_name, author_last_name, created FROM posts ORDER BY rowid",
    )?;
    let posts = stmt
        .query_map([], row_to_post)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<Post>, StoreError> {
    match conn.query_row(
        "SELECT id, title, content, author_first_name, author_last_name, created FROM posts WHERE id = ?1",
        [id],
        row_to_post,
    ) {
        Ok(post) => Ok(Some(post)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_by_id(conn: &Connection, id: &str, patch: PostPatch) -> Result<(), StoreError> {
    let current = find_by_id(conn, id)?.ok_or(StoreError::NotFound)?;

    let title = patch.title.unwrap_or(current.title);
    let content = patch.content.unwrap_or(current.content);
    let author = patch.author.unwrap_or(current.author);

    conn.execute(
        "UPDATE posts SET title = ?1, content = ?2, author_first_name = ?3, author_last_name = ?4 WHERE id = ?5",
        rusqlite::params![title, content, author.first_name, author.last_name, id],
    )?;
    Ok(())
}

/// Removes the record if present. Deleting an unknown id is not an error;
/// the return value says whether anything was removed.
pub fn delete_by_id(conn: &Connection, id: &str) -> Result<bool, StoreError> {
    let deleted = conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

pub fn count(conn: &Connection) -> Result<u64, StoreError> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |r| r.get(0))?;
    Ok(n as u64)
}
