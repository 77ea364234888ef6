use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::PlanRepo;
use crate::{state::AppState, validation::Checker};

pub const DAYS_PER_WEEK: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// A stored plan: a title plus a week structure owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan<D> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub days: D,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Week structure held by a plan kind (meals or exercises).
pub trait PlanBody: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Human label used in messages, e.g. "meal plan".
    const LABEL: &'static str;
    /// Label of one entry, e.g. "meal".
    const ENTRY_LABEL: &'static str;
    const TABLE: &'static str;

    type Summary: Serialize + Send + Sync;

    fn day_count(&self) -> usize;
    fn entry_count(&self) -> usize;
    /// Pushes per-entry problems under `days.<day>...` field paths.
    fn check_entries(&self, checker: &mut Checker);
    fn summarize(&self) -> Self::Summary;
    fn prompt(title: &str, summary: &Self::Summary) -> String;
    fn repo(state: &AppState) -> Arc<dyn PlanRepo<Self>>;
}

pub(crate) fn day_key(day: DayOfWeek) -> &'static str {
    match day {
        DayOfWeek::Monday => "monday",
        DayOfWeek::Tuesday => "tuesday",
        DayOfWeek::Wednesday => "wednesday",
        DayOfWeek::Thursday => "thursday",
        DayOfWeek::Friday => "friday",
        DayOfWeek::Saturday => "saturday",
        DayOfWeek::Sunday => "sunday",
    }
}

/// Non-negative and finite.
pub(crate) fn check_amount(checker: &mut Checker, field: &str, value: f64) {
    if !value.is_finite() || value < 0.0 {
        checker.push(field, format!("{field} must be a non-negative number"));
    }
}
