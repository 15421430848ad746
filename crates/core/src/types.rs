/// All hosted-database primary keys are UUIDs.
pub type Id = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (due dates, transaction dates) carry no time zone.
pub type Date = chrono::NaiveDate;
