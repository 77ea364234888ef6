use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::model::{check_amount, day_key, DayOfWeek, PlanBody};
use super::repo::PlanRepo;
use crate::{metrics::calculator::round2, state::AppState, validation::Checker};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseEntry {
    pub name: String,
    #[serde(default)]
    pub sets: i64,
    #[serde(default)]
    pub reps: i64,
    #[serde(default)]
    pub duration_minutes: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_part: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
}

/// Day of week → exercises.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseWeek(pub BTreeMap<DayOfWeek, Vec<ExerciseEntry>>);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSummary {
    pub exercise_count: usize,
    pub active_days: usize,
    pub total_sets: i64,
    pub total_reps: i64,
    pub total_duration_minutes: f64,
    pub body_parts: Vec<String>,
    pub targets: Vec<String>,
}

fn normalized(label: &Option<String>) -> Option<String> {
    label
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

impl PlanBody for ExerciseWeek {
    const LABEL: &'static str = "exercise plan";
    const ENTRY_LABEL: &'static str = "exercise";
    const TABLE: &'static str = "exercise_plans";

    type Summary = ExerciseSummary;

    fn day_count(&self) -> usize {
        self.0.len()
    }

    fn entry_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    fn check_entries(&self, checker: &mut Checker) {
        for (day, exercises) in &self.0 {
            for (i, ex) in exercises.iter().enumerate() {
                let path = format!("days.{}[{}]", day_key(*day), i);
                if ex.name.trim().is_empty() {
                    checker.push(&format!("{path}.name"), "exercise name is required");
                }
                for (field, count) in [("sets", ex.sets), ("reps", ex.reps)] {
                    if count < 0 {
                        let field = format!("{path}.{field}");
                        let message = format!("{field} must be a non-negative whole number");
                        checker.push(&field, message);
                    }
                }
                check_amount(checker, &format!("{path}.durationMinutes"), ex.duration_minutes);
            }
        }
    }

    fn summarize(&self) -> ExerciseSummary {
        let mut body_parts = BTreeSet::new();
        let mut targets = BTreeSet::new();
        let mut summary = ExerciseSummary {
            exercise_count: 0,
            active_days: 0,
            total_sets: 0,
            total_reps: 0,
            total_duration_minutes: 0.0,
            body_parts: Vec::new(),
            targets: Vec::new(),
        };
        for exercises in self.0.values() {
            if !exercises.is_empty() {
                summary.active_days += 1;
            }
            for ex in exercises {
                summary.exercise_count += 1;
                summary.total_sets += ex.sets;
                summary.total_reps += ex.reps;
                summary.total_duration_minutes += ex.duration_minutes;
                body_parts.extend(normalized(&ex.body_part));
                targets.extend(normalized(&ex.target));
            }
        }
        summary.total_duration_minutes = round2(summary.total_duration_minutes);
        summary.body_parts = body_parts.into_iter().collect();
        summary.targets = targets.into_iter().collect();
        summary
    }

    fn prompt(title: &str, s: &ExerciseSummary) -> String {
        let list = |items: &[String]| {
            if items.is_empty() {
                "not specified".to_string()
            } else {
                items.join(", ")
            }
        };
        format!(
            "You are a strength and conditioning coach. Review the weekly exercise plan \"{title}\".\n\
             It schedules {count} exercises over {days} training days: {sets} sets, {reps} reps \
             and {minutes} minutes in total.\n\
             Body parts worked: {parts}.\nTarget muscles: {targets}.\n\
             Assess balance between muscle groups, training volume and recovery, \
             and suggest concrete improvements in a few short paragraphs.",
            count = s.exercise_count,
            days = s.active_days,
            sets = s.total_sets,
            reps = s.total_reps,
            minutes = s.total_duration_minutes,
            parts = list(&s.body_parts),
            targets = list(&s.targets),
        )
    }

    fn repo(state: &AppState) -> Arc<dyn PlanRepo<Self>> {
        state.exercise_plans.clone()
    }
}
