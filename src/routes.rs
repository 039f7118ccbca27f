use chrono::{DateTime, Utc};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};

use crate::store::{self, Author, NewPost, PostPatch, StoreError};
use crate::{DbPool, DbPoolExt};

// ─── Models ───

#[derive(Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

fn err(status: Status, msg: &str, code: &str) -> (Status, Json<ApiError>) {
    (status, Json(ApiError { error: msg.to_string(), code: code.to_string() }))
}

fn validation_err(msg: &str) -> (Status, Json<ApiError>) {
    err(Status::BadRequest, msg, "VALIDATION_ERROR")
}

fn store_err(e: StoreError) -> (Status, Json<ApiError>) {
    match e {
        StoreError::NotFound => err(Status::NotFound, "Post not found", "NOT_FOUND"),
        StoreError::Database(e) => err(Status::InternalServerError, &e.to_string(), "DB_ERROR"),
    }
}

/// Wire shape of a post. `author` is the flattened display string; the
/// structured object only exists on input and in storage.
#[derive(Serialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created: String,
}

impl From<store::Post> for PostResponse {
    fn from(post: store::Post) -> Self {
        Self {
            author: post.author.display_name(),
            id: post.id,
            title: post.title,
            content: post.content,
            created: post.created.to_rfc3339(),
        }
    }
}

// ─── Request bodies ───

#[derive(Deserialize)]
pub struct CreatePostReq {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<Author>,
    pub created: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct UpdatePostReq {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<Author>,
}

// ─── Routes ───

#[get("/health")]
pub fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok", "version": "0.1.0"}))
}

#[get("/posts")]
pub fn list_posts(db: &State<DbPool>) -> Result<Json<Vec<PostResponse>>, (Status, Json<ApiError>)> {
    let conn = db.conn();
    let posts = store::find_all(&conn).map_err(store_err)?;
    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

#[get("/posts/<id>")]
pub fn get_post(id: &str, db: &State<DbPool>) -> Result<Json<PostResponse>, (Status, Json<ApiError>)> {
    let conn = db.conn();
    match store::find_by_id(&conn, id).map_err(store_err)? {
        Some(post) => Ok(Json(post.into())),
        None => Err(err(Status::NotFound, "Post not found", "NOT_FOUND")),
    }
}

#[post("/posts", format = "json", data = "<req>")]
pub fn create_post(req: Json<CreatePostReq>, db: &State<DbPool>) -> Result<(Status, Json<PostResponse>), (Status, Json<ApiError>)> {
    let req = req.into_inner();

    let title = match req.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => return Err(validation_err("Title is required")),
    };
    let content = match req.content {
        Some(c) => c,
        None => return Err(validation_err("Content is required")),
    };
    let author = match req.author {
        Some(a) => a,
        None => return Err(validation_err("Author is required")),
    };

    let conn = db.conn();
    let post = store::create_one(&conn, NewPost { title, content, author, created: req.created })
        .map_err(store_err)?;

    Ok((Status::Created, Json(post.into())))
}

#[put("/posts/<id>", format = "json", data = "<req>")]
pub fn update_post(id: &str, req: Json<UpdatePostReq>, db: &State<DbPool>) -> Result<Status, (Status, Json<ApiError>)> {
    let req = req.into_inner();
    let patch = PostPatch {
        title: req.title,
        content: req.content,
        author: req.author,
    };

    let conn = db.conn();
    store::update_by_id(&conn, id, patch).map_err(store_err)?;
    Ok(Status::NoContent)
}

// Deleting an unknown id returns 404. The store call itself is idempotent;
// the status mapping is the handler's contract.
#[delete("/posts/<id>")]
pub fn delete_post(id: &str, db: &State<DbPool>) -> Result<Status, (Status, Json<ApiError>)> {
    let conn = db.conn();
    let deleted = store::delete_by_id(&conn, id).map_err(store_err)?;
    if !deleted {
        return Err(err(Status::NotFound, "Post not found", "NOT_FOUND"));
    }
    Ok(Status::NoContent)
}

// ─── Catchers ───

#[catch(400)]
pub fn bad_request() -> Json<ApiError> {
    Json(ApiError { error: "Bad request".to_string(), code: "VALIDATION_ERROR".to_string() })
}

#[catch(404)]
pub fn not_found() -> Json<ApiError> {
    Json(ApiError { error: "Not found".to_string(), code: "NOT_FOUND".to_string() })
}

#[catch(422)]
pub fn unprocessable_entity() -> Json<ApiError> {
    Json(ApiError { error: "Malformed request body".to_string(), code: "VALIDATION_ERROR".to_string() })
}

#[catch(500)]
pub fn internal_error() -> Json<ApiError> {
    Json(ApiError { error: "Internal server error".to_string(), code: "INTERNAL_ERROR".to_string() })
}
