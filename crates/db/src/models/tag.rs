use sqlx::FromRow;
use tandem_core::error::CoreError;
use tandem_core::tag::{Tag, DEFAULT_TAG_COLOR};
use tandem_core::types::{DbId, Timestamp};

/// A row from the `tags` table.
#[derive(Debug, Clone, FromRow)]
pub struct TagRow {
    pub id: DbId,
    pub name: String,
    pub color: Option<String>,
    pub created_at: Timestamp,
}

impl TryFrom<TagRow> for Tag {
    type Error = CoreError;

    fn try_from(row: TagRow) -> Result<Self, Self::Error> {
        Ok(Tag {
            id: row.id,
            name: row.name,
            color: row
                .color
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string()),
        })
    }
}
