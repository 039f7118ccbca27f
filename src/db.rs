use rusqlite::Connection;

pub fn initialize(conn: &Connection) {
    conn.execute_batch("PRAGMA journal_mode=WAL;").ok();

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            author_first_name TEXT NOT NULL,
            author_last_name TEXT NOT NULL,
            created TEXT NOT NULL
        );
        ",
    )
    .expect("Failed to initialize database");
}
