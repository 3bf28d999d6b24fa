/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar day a timesheet entry is booked against. No time component.
pub type WorkDate = chrono::NaiveDate;

/// Hour quantities are exact decimals (`NUMERIC(5,2)` in the database).
pub type Hours = rust_decimal::Decimal;
