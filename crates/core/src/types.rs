/// All store primary keys are UUIDs.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar days are plain dates without a time zone.
pub type Day = chrono::NaiveDate;
