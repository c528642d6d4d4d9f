use chrono::{DateTime, Utc};
use flashgen_core::{
    repo::Repository, CoreError, Flashcard, FlashcardRecord, Generation, GenerationId,
    NewGeneration, NewGenerationErrorLog, UserId,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Row, SqlitePool,
};
use std::path::Path;
use std::str::FromStr;

pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    pub async fn open_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let url = format!("sqlite://{}", path.as_ref().to_string_lossy());
        let opts = SqliteConnectOptions::from_str(&url)
            .map_err(|e| CoreError::storage("sqlite url", e))?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(|e| CoreError::storage("sqlite connect", e))?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    pub async fn open_memory() -> Result<Self, CoreError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| CoreError::storage("sqlite url", e))?
            .foreign_keys(true);
        // Every in-memory connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(|e| CoreError::storage("sqlite connect", e))?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    async fn ensure_schema(&self) -> Result<(), CoreError> {
        const STMT: &str = r#"
        CREATE TABLE IF NOT EXISTS generations (
          id                  INTEGER PRIMARY KEY AUTOINCREMENT,
          user_id             TEXT NOT NULL,
          model               TEXT NOT NULL,
          generated_count     INTEGER NOT NULL,
          source_text_hash    TEXT NOT NULL,
          source_text_length  INTEGER NOT NULL CHECK (source_text_length BETWEEN 1000 AND 10000),
          generation_duration INTEGER NOT NULL,
          created_at          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS generation_error_logs (
          id                  INTEGER PRIMARY KEY AUTOINCREMENT,
          user_id             TEXT NOT NULL,
          model               TEXT NOT NULL,
          source_text_hash    TEXT NOT NULL,
          source_text_length  INTEGER NOT NULL,
          error_code          TEXT NOT NULL,
          error_message       TEXT NOT NULL,
          created_at          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS flashcards (
          id             INTEGER PRIMARY KEY AUTOINCREMENT,
          front          TEXT NOT NULL,
          back           TEXT NOT NULL,
          source         TEXT NOT NULL CHECK (source IN ('ai-full', 'ai-edited', 'manual')),
          generation_id  INTEGER REFERENCES generations(id) ON DELETE SET NULL,
          user_id        TEXT NOT NULL,
          created_at     TEXT NOT NULL,
          updated_at     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_flashcards_generation ON flashcards (generation_id);
        CREATE INDEX IF NOT EXISTS idx_generations_user ON generations (user_id);
        "#;

        for chunk in STMT.split(';') {
            let sql = chunk.trim();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| CoreError::storage("sqlite schema", e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Repository for SqliteRepo {
    // ===== Generations =====
    async fn insert_generation(&self, new: &NewGeneration) -> Result<Generation, CoreError> {
        let created_at = Utc::now();
        let res = sqlx::query(
            r#"INSERT INTO generations (
                 user_id, model, generated_count, source_text_hash, source_text_length,
                 generation_duration, created_at
               ) VALUES (?,?,?,?,?,?,?)"#,
        )
        .bind(new.user_id.to_string())
        .bind(&new.model)
        .bind(new.generated_count as i64)
        .bind(&new.source_text_hash)
        .bind(new.source_text_length as i64)
        .bind(new.generation_duration_ms as i64)
        .bind(dt_to_str(created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::storage("insert generation", e))?;

        let mut generation = Generation::from_new(res.last_insert_rowid(), new);
        generation.created_at = created_at;
        Ok(generation)
    }

    async fn get_generation(&self, id: GenerationId) -> Result<Generation, CoreError> {
        let row = sqlx::query(
            r#"SELECT id,user_id,model,generated_count,source_text_hash,source_text_length,
                      generation_duration,created_at
               FROM generations WHERE id=?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::storage("read generation", e))?;
        let row = row.ok_or(CoreError::NotFound("generation"))?;
        Ok(Generation {
            id: row.get::<i64, _>("id"),
            user_id: uuid_from_str(row.get::<String, _>("user_id"))?,
            model: row.get::<String, _>("model"),
            generated_count: row.get::<i64, _>("generated_count") as u32,
            source_text_hash: row.get::<String, _>("source_text_hash"),
            source_text_length: row.get::<i64, _>("source_text_length") as u32,
            generation_duration_ms: row.get::<i64, _>("generation_duration") as u64,
            created_at: dt_from_str(row.get::<String, _>("created_at"))?,
        })
    }

    async fn insert_generation_error(&self, entry: &NewGenerationErrorLog) -> Result<(), CoreError> {
        sqlx::query(
            r#"INSERT INTO generation_error_logs (
                 user_id, model, source_text_hash, source_text_length, error_code,
                 error_message, created_at
               ) VALUES (?,?,?,?,?,?,?)"#,
        )
        .bind(entry.user_id.to_string())
        .bind(&entry.model)
        .bind(&entry.source_text_hash)
        .bind(entry.source_text_length as i64)
        .bind(&entry.error_code)
        .bind(&entry.error_message)
        .bind(dt_to_str(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::storage("insert generation error", e))?;
        Ok(())
    }

    // ===== Flashcards =====
    async fn insert_flashcards(
        &self,
        user_id: UserId,
        batch: &[FlashcardRecord],
    ) -> Result<Vec<Flashcard>, CoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CoreError::storage("tx", e))?;

        let mut out = Vec::with_capacity(batch.len());
        for record in batch {
            let card = Flashcard::from_record(0, user_id, record);
            let res = sqlx::query(
                r#"INSERT INTO flashcards (
                     front, back, source, generation_id, user_id, created_at, updated_at
                   ) VALUES (?,?,?,?,?,?,?)"#,
            )
            .bind(&card.front)
            .bind(&card.back)
            .bind(card.source.as_str())
            .bind(card.generation_id)
            .bind(user_id.to_string())
            .bind(dt_to_str(card.created_at))
            .bind(dt_to_str(card.updated_at))
            .execute(&mut *tx)
            .await;

            match res {
                Ok(done) => out.push(Flashcard { id: done.last_insert_rowid(), ..card }),
                Err(e) => {
                    tx.rollback().await.ok();
                    return Err(map_insert_error(e));
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| CoreError::storage("tx commit", e))?;
        Ok(out)
    }

    async fn list_flashcards(
        &self,
        generation_id: Option<GenerationId>,
    ) -> Result<Vec<Flashcard>, CoreError> {
        let rows = if let Some(gid) = generation_id {
            sqlx::query(
                r#"SELECT id,front,back,source,generation_id,user_id,created_at,updated_at
                   FROM flashcards WHERE generation_id=? ORDER BY id ASC"#,
            )
            .bind(gid)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CoreError::storage("list flashcards", e))?
        } else {
            sqlx::query(
                r#"SELECT id,front,back,source,generation_id,user_id,created_at,updated_at
                   FROM flashcards ORDER BY id ASC"#,
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CoreError::storage("list flashcards", e))?
        };
        let mut v = Vec::with_capacity(rows.len());
        for row in rows {
            v.push(row_into_flashcard(row)?);
        }
        Ok(v)
    }
}

// ===== Helpers =====
fn uuid_from_str(s: String) -> Result<uuid::Uuid, CoreError> {
    uuid::Uuid::parse_str(&s).map_err(|e| CoreError::storage("uuid", e))
}

fn dt_to_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn dt_from_str(s: String) -> Result<DateTime<Utc>, CoreError> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map_err(|e| CoreError::storage("datetime", e))
        .map(|dt| dt.with_timezone(&Utc))
}

fn map_insert_error(e: sqlx::Error) -> CoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => CoreError::NotFound("generation"),
        _ => CoreError::storage("insert flashcard", e),
    }
}

fn row_into_flashcard(row: sqlx::sqlite::SqliteRow) -> Result<Flashcard, CoreError> {
    Ok(Flashcard {
        id: row.get::<i64, _>("id"),
        front: row.get::<String, _>("front"),
        back: row.get::<String, _>("back"),
        source: row.get::<String, _>("source").parse()?,
        generation_id: row.get::<Option<i64>, _>("generation_id"),
        user_id: uuid_from_str(row.get::<String, _>("user_id"))?,
        created_at: dt_from_str(row.get::<String, _>("created_at"))?,
        updated_at: dt_from_str(row.get::<String, _>("updated_at"))?,
    })
}
