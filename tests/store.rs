use chrono::{TimeZone, Utc};
use posts_api::db;
use posts_api::store::{self, Author, NewPost, PostPatch, StoreError};

fn test_conn() -> rusqlite::Connection {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    db::initialize(&conn);
    conn
}

fn new_post(title: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: "Some content".to_string(),
        author: Author {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        },
        created: None,
    }
}

#[test]
fn test_create_assigns_id_and_created() {
    let conn = test_conn();
    let before = Utc::now();
    let post = store::create_one(&conn, new_post("First")).unwrap();
    assert!(!post.id.is_empty());
    assert!(post.created >= before);
    assert!(post.created <= Utc::now());
}

#[test]
fn test_create_preserves_supplied_created() {
    let conn = test_conn();
    let when = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let mut new = new_post("Backdated");
    new.created = Some(when);
    let post = store::create_one(&conn, new).unwrap();
    assert_eq!(post.created, when);

    let found = store::find_by_id(&conn, &post.id).unwrap().unwrap();
    assert_eq!(found.created, when);
}

#[test]
fn test_author_round_trip() {
    let conn = test_conn();
    let post = store::create_one(&conn, new_post("Authored")).unwrap();
    let found = store::find_by_id(&conn, &post.id).unwrap().unwrap();
    assert_eq!(found.author, Author {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    });
    assert_eq!(found.author.display_name(), "Ada Lovelace");
}

#[test]
fn test_count_tracks_creates_and_deletes() {
    let conn = test_conn();
    assert_eq!(store::count(&conn).unwrap(), 0);

    let mut ids = Vec::new();
    for i in 0..3 {
        ids.push(store::create_one(&conn, new_post(&format!("Post {}", i))).unwrap().id);
    }
    assert_eq!(store::count(&conn).unwrap(), 3);

    assert!(store::delete_by_id(&conn, &ids[0]).unwrap());
    assert_eq!(store::count(&conn).unwrap(), 2);
}

#[test]
fn test_find_by_id_absent_is_none() {
    let conn = test_conn();
    assert!(store::find_by_id(&conn, "no-such-id").unwrap().is_none());
}

#[test]
fn test_partial_update_title_only() {
    let conn = test_conn();
    let post = store::create_one(&conn, new_post("Original")).unwrap();

    store::update_by_id(&conn, &post.id, PostPatch {
        title: Some("Changed".to_string()),
        ..Default::default()
    }).unwrap();

    let found = store::find_by_id(&conn, &post.id).unwrap().unwrap();
    assert_eq!(found.title, "Changed");
    assert_eq!(found.content, "Some content");
    assert_eq!(found.author.display_name(), "Ada Lovelace");
    assert_eq!(found.created, post.created);
}

#[test]
fn test_partial_update_author_only() {
    let conn = test_conn();
    let post = store::create_one(&conn, new_post("Keep")).unwrap();

    store::update_by_id(&conn, &post.id, PostPatch {
        author: Some(Author {
            first_name: "Alan".to_string(),
            last_name: "Turing".to_string(),
        }),
        ..Default::default()
    }).unwrap();

    let found = store::find_by_id(&conn, &post.id).unwrap().unwrap();
    assert_eq!(found.title, "Keep");
    assert_eq!(found.author.display_name(), "Alan Turing");
}

#[test]
fn test_update_unknown_id() {
    let conn = test_conn();
    let result = store::update_by_id(&conn, "no-such-id", PostPatch {
        title: Some("Nope".to_string()),
        ..Default::default()
    });
    assert!(matches!(result, Err(StoreError::NotFound)));
}

#[test]
fn test_delete_is_idempotent_by_id() {
    let conn = test_conn();
    let post = store::create_one(&conn, new_post("Gone")).unwrap();

    assert!(store::delete_by_id(&conn, &post.id).unwrap());
    assert!(!store::delete_by_id(&conn, &post.id).unwrap());
    assert!(store::find_by_id(&conn, &post.id).unwrap().is_none());
}

#[test]
fn test_find_all_returns_current_state() {
    let conn = test_conn();
    store::create_one(&conn, new_post("One")).unwrap();
    assert_eq!(store::find_all(&conn).unwrap().len(), 1);

    store::create_one(&conn, new_post("Two")).unwrap();
    let posts = store::find_all(&conn).unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "One");
    assert_eq!(posts[1].title, "Two");
}

#[test]
fn test_persistence_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posts.db");

    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        db::initialize(&conn);
        store::create_one(&conn, new_post("Durable")).unwrap();
    }

    let conn = rusqlite::Connection::open(&path).unwrap();
    let posts = store::find_all(&conn).unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "Durable");
    assert_eq!(posts[0].author.display_name(), "Ada Lovelace");
}
