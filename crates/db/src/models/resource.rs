use sqlx::FromRow;
use tandem_core::resource::Resource;
use tandem_core::types::{DbId, Timestamp};

/// A row from the `resources` table.
#[derive(Debug, Clone, FromRow)]
pub struct ResourceRow {
    pub id: DbId,
    pub display_name: String,
    pub created_at: Timestamp,
}

impl From<ResourceRow> for Resource {
    fn from(row: ResourceRow) -> Self {
        Resource {
            id: row.id,
            display_name: row.display_name,
        }
    }
}
