use std::collections::BTreeMap;

use anyhow::Context;
use axum::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use super::repo_types::{NewStudent, Student};

#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<Student>>;
    async fn get(&self, id: i64) -> anyhow::Result<Option<Student>>;
    async fn create(&self, new: NewStudent) -> anyhow::Result<Student>;
    /// Returns `None` when no record has this id.
    async fn update(&self, id: i64, fields: NewStudent) -> anyhow::Result<Option<Student>>;
    /// Returns `false` when no record has this id.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgStudentStore {
    db: PgPool,
}

impl PgStudentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn list(&self) -> anyhow::Result<Vec<Student>> {
        let rows = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, name, email, controlnum, year
            FROM api_estudiantes
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list estudiantes")?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Student>> {
        let row = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, name, email, controlnum, year
            FROM api_estudiantes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("get estudiante {}", id))?;
        Ok(row)
    }

    async fn create(&self, new: NewStudent) -> anyhow::Result<Student> {
        let row = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO api_estudiantes (name, email, controlnum, year)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, controlnum, year
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.controlnum)
        .bind(new.year)
        .fetch_one(&self.db)
        .await
        .context("insert estudiante")?;
        Ok(row)
    }

    async fn update(&self, id: i64, fields: NewStudent) -> anyhow::Result<Option<Student>> {
        let row = sqlx::query_as::<_, Student>(
            r#"
            UPDATE api_estudiantes
            SET name = $2, email = $3, controlnum = $4, year = $5
            WHERE id = $1
            RETURNING id, name, email, controlnum, year
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.controlnum)
        .bind(fields.year)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("update estudiante {}", id))?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let deleted = sqlx::query_scalar::<_, i64>(
            r#"DELETE FROM api_estudiantes WHERE id = $1 RETURNING id"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("delete estudiante {}", id))?;
        Ok(deleted.is_some())
    }
}

#[derive(Default)]
struct MemoryInner {
    rows: BTreeMap<i64, Student>,
    last_id: i64,
}

/// Process-local store; ids are never reused, like a `BIGSERIAL` sequence.
#[derive(Default)]
pub struct MemoryStudentStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn list(&self) -> anyhow::Result<Vec<Student>> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Student>> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, new: NewStudent) -> anyhow::Result<Student> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let student = new.into_student(inner.last_id);
        inner.rows.insert(student.id, student.clone());
        Ok(student)
    }

    async fn update(&self, id: i64, fields: NewStudent) -> anyhow::Result<Option<Student>> {
        let mut inner = self.inner.write().await;
        Ok(inner.rows.get_mut(&id).map(|row| {
            *row = fields.into_student(id);
            row.clone()
        }))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }
}
