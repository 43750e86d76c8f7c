use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_name TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        follows TEXT NOT NULL DEFAULT '[]',
        followers TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS login (
        email TEXT NOT NULL UNIQUE,
        user_name TEXT NOT NULL UNIQUE,
        hash TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_by INTEGER NOT NULL,
        content TEXT NOT NULL,
        likes TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
];

pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new().connect(url).await?;
    init_schema(&pool).await?;
    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

// === Denormalized id lists ===

pub fn decode_id_list(column: &str, raw: &str) -> Result<Vec<i64>, sqlx::Error> {
    serde_json::from_str(raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub fn encode_id_list(ids: &[i64]) -> String {
    serde_json::to_string(ids).expect("id list serializes")
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_list_roundtrip() {
        let ids = vec![3, 1, 2];
        let encoded = encode_id_list(&ids);
        assert_eq!(decode_id_list("follows", &encoded).unwrap(), ids);
        assert_eq!(decode_id_list("follows", "[]").unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn id_list_decode_rejects_garbage() {
        assert!(decode_id_list("likes", "not json").is_err());
    }
}
