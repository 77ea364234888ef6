use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// One logged drink, kept in the day's append-only log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterLogEntry {
    pub amount_ml: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}

/// Stored document for one user and one day.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterIntake {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub total_ml: i32,
    pub entries: Vec<WaterLogEntry>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Wire view of a day. Days without a document render with zero total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterDay {
    #[serde(with = "crate::dates::iso_date")]
    pub date: Date,
    pub total_ml: i32,
    pub entries: Vec<WaterLogEntry>,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

impl WaterDay {
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            total_ml: 0,
            entries: Vec::new(),
            updated_at: None,
        }
    }
}

impl From<WaterIntake> for WaterDay {
    fn from(w: WaterIntake) -> Self {
        Self {
            date: w.date,
            total_ml: w.total_ml,
            entries: w.entries,
            updated_at: Some(w.updated_at),
        }
    }
}
