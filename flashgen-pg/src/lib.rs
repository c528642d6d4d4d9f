use chrono::{DateTime, Utc};
use flashgen_core::{
    repo::Repository, CoreError, Flashcard, FlashcardRecord, Generation, GenerationId,
    NewGeneration, NewGenerationErrorLog, UserId,
};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

pub struct PostgresRepo {
    pool: PgPool,
}

impl PostgresRepo {
    pub async fn connect(url: &str) -> Result<Self, CoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|e| CoreError::storage("pg connect", e))?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    async fn ensure_schema(&self) -> Result<(), CoreError> {
        const STMT: &str = r#"
        CREATE TABLE IF NOT EXISTS generations (
          id                  bigserial PRIMARY KEY,
          user_id             uuid NOT NULL,
          model               varchar NOT NULL,
          generated_count     integer NOT NULL,
          source_text_hash    varchar NOT NULL,
          source_text_length  integer NOT NULL CHECK (source_text_length BETWEEN 1000 AND 10000),
          generation_duration bigint NOT NULL,
          created_at          timestamptz NOT NULL DEFAULT now()
        );

        CREATE TABLE IF NOT EXISTS generation_error_logs (
          id                  bigserial PRIMARY KEY,
          user_id             uuid NOT NULL,
          model               varchar NOT NULL,
          source_text_hash    varchar NOT NULL,
          source_text_length  integer NOT NULL,
          error_code          varchar(100) NOT NULL,
          error_message       text NOT NULL,
          created_at          timestamptz NOT NULL DEFAULT now()
        );

        CREATE TABLE IF NOT EXISTS flashcards (
          id             bigserial PRIMARY KEY,
          front          varchar(200) NOT NULL,
          back           varchar(500) NOT NULL,
          source         varchar NOT NULL CHECK (source IN ('ai-full', 'ai-edited', 'manual')),
          generation_id  bigint REFERENCES generations(id) ON DELETE SET NULL,
          user_id        uuid NOT NULL,
          created_at     timestamptz NOT NULL DEFAULT now(),
          updated_at     timestamptz NOT NULL DEFAULT now()
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
                .map_err(|e| CoreError::storage("pg schema", e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Repository for PostgresRepo {
    // ===== Generations =====
    async fn insert_generation(&self, new: &NewGeneration) -> Result<Generation, CoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO generations (
              user_id, model, generated_count, source_text_hash, source_text_length,
              generation_duration
            ) VALUES ($1,$2,$3,$4,$5,$6)
            RETURNING id, created_at
            "#,
        )
        .bind(new.user_id)
        .bind(&new.model)
        .bind(new.generated_count as i32)
        .bind(&new.source_text_hash)
        .bind(new.source_text_length as i32)
        .bind(new.generation_duration_ms as i64)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CoreError::storage("pg insert generation", e))?;

        let mut generation = Generation::from_new(row.get::<i64, _>("id"), new);
        generation.created_at = row.get::<DateTime<Utc>, _>("created_at");
        Ok(generation)
    }

    async fn get_generation(&self, id: GenerationId) -> Result<Generation, CoreError> {
        let row = sqlx::query(
            r#"SELECT id,user_id,model,generated_count,source_text_hash,source_text_length,
                      generation_duration,created_at
               FROM generations WHERE id=$1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::storage("pg read generation", e))?;
        let row = row.ok_or(CoreError::NotFound("generation"))?;
        Ok(Generation {
            id: row.get("id"),
            user_id: row.get::<uuid::Uuid, _>("user_id"),
            model: row.get("model"),
            generated_count: row.get::<i32, _>("generated_count") as u32,
            source_text_hash: row.get("source_text_hash"),
            source_text_length: row.get::<i32, _>("source_text_length") as u32,
            generation_duration_ms: row.get::<i64, _>("generation_duration") as u64,
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        })
    }

    async fn insert_generation_error(&self, entry: &NewGenerationErrorLog) -> Result<(), CoreError> {
        sqlx::query(
            r#"
            INSERT INTO generation_error_logs (
              user_id, model, source_text_hash, source_text_length, error_code, error_message
            ) VALUES ($1,$2,$3,$4,$5,$6)
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.model)
        .bind(&entry.source_text_hash)
        .bind(entry.source_text_length as i32)
        .bind(&entry.error_code)
        .bind(&entry.error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::storage("pg insert generation error", e))?;
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
            .map_err(|e| CoreError::storage("pg tx", e))?;

        let mut out = Vec::with_capacity(batch.len());
        for record in batch {
            let res = sqlx::query(
                r#"
                INSERT INTO flashcards (front, back, source, generation_id, user_id)
                VALUES ($1,$2,$3,$4,$5)
                RETURNING id, front, back, source, generation_id, user_id, created_at, updated_at
                "#,
            )
            .bind(&record.front)
            .bind(&record.back)
            .bind(record.source.as_str())
            .bind(record.generation_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await;

            match res {
                Ok(row) => out.push(row_into_flashcard(row)?),
                Err(e) => {
                    tx.rollback().await.ok();
                    return Err(map_insert_error(e));
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| CoreError::storage("pg tx commit", e))?;
        Ok(out)
    }

    async fn list_flashcards(
        &self,
        generation_id: Option<GenerationId>,
    ) -> Result<Vec<Flashcard>, CoreError> {
        let rows = sqlx::query(
            r#"SELECT id,front,back,source,generation_id,user_id,created_at,updated_at
               FROM flashcards
               WHERE ($1::bigint IS NULL OR generation_id = $1)
               ORDER BY id ASC"#,
        )
        .bind(generation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoreError::storage("pg list flashcards", e))?;
        rows.into_iter().map(row_into_flashcard).collect()
    }
}

// ===== Helpers =====
fn map_insert_error(e: sqlx::Error) -> CoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => CoreError::NotFound("generation"),
        _ => CoreError::storage("pg insert flashcard", e),
    }
}

fn row_into_flashcard(row: sqlx::postgres::PgRow) -> Result<Flashcard, CoreError> {
    Ok(Flashcard {
        id: row.get("id"),
        front: row.get("front"),
        back: row.get("back"),
        source: row.get::<String, _>("source").parse()?,
        generation_id: row.get::<Option<i64>, _>("generation_id"),
        user_id: row.get::<uuid::Uuid, _>("user_id"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    })
}
