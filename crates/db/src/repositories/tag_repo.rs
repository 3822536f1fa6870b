//! Repository for the `tags` table.

use sqlx::PgPool;

use crate::models::tag::TagRow;

const COLUMNS: &str = "id, name, color, created_at";

pub struct TagRepo;

impl TagRepo {
    /// All tags, alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<TagRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags ORDER BY name");
        sqlx::query_as::<_, TagRow>(&query).fetch_all(pool).await
    }
}
