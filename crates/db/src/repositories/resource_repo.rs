//! Repository for the `resources` table.

use sqlx::PgPool;
use tandem_core::types::DbId;

use crate::models::resource::ResourceRow;

const COLUMNS: &str = "id, display_name, created_at";

pub struct ResourceRepo;

impl ResourceRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ResourceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM resources WHERE id = $1");
        sqlx::query_as::<_, ResourceRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
