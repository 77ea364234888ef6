use serde::{de::DeserializeOwned, Deserialize};

use super::model::PlanBody;
use crate::{error::ApiError, validation::Checker};

pub const MAX_TITLE_LEN: usize = 120;

/// Body of create and update: both replace title and week structure.
#[derive(Debug, Deserialize)]
#[serde(bound = "D: DeserializeOwned")]
pub struct PlanRequest<D> {
    pub title: Option<String>,
    pub days: Option<D>,
}

impl<D: PlanBody> PlanRequest<D> {
    pub fn validate(self) -> Result<(String, D), ApiError> {
        let mut c = Checker::new();

        let title = c.text("title", self.title.as_deref());
        if let Some(t) = &title {
            if t.chars().count() > MAX_TITLE_LEN {
                c.push(
                    "title",
                    format!("title must be at most {MAX_TITLE_LEN} characters"),
                );
            }
        }

        match &self.days {
            None => c.push("days", "days is required"),
            Some(days) if days.day_count() == 0 => c.push("days", "days must not be empty"),
            Some(days) => {
                if days.entry_count() == 0 {
                    c.push(
                        "days",
                        format!("{} must contain at least one {}", D::LABEL, D::ENTRY_LABEL),
                    );
                }
                days.check_entries(&mut c);
            }
        }

        c.finish()?;
        match (title, self.days) {
            (Some(title), Some(days)) => Ok((title, days)),
            _ => Err(ApiError::BadRequest("title and days are required".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::{exercise::ExerciseWeek, meal::MealWeek};
    use serde_json::json;

    fn fields(err: ApiError) -> Vec<(String, String)> {
        match err {
            ApiError::Validation(errors) => {
                errors.into_iter().map(|e| (e.field, e.message)).collect()
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn accepts_a_minimal_meal_plan() {
        let req: PlanRequest<MealWeek> = serde_json::from_value(json!({
            "title": "  Cutting week ",
            "days": {"monday": {"breakfast": [{"name": "Oats", "calories": 380}]}}
        }))
        .unwrap();
        let (title, days) = req.validate().unwrap();
        assert_eq!(title, "Cutting week");
        assert_eq!(days.entry_count(), 1);
    }

    #[test]
    fn missing_title_and_days() {
        let req: PlanRequest<MealWeek> = serde_json::from_value(json!({})).unwrap();
        let errors = fields(req.validate().unwrap_err());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].0, "title");
        assert_eq!(errors[1], ("days".into(), "days is required".into()));
    }

    #[test]
    fn empty_week_and_long_title() {
        let req: PlanRequest<ExerciseWeek> = serde_json::from_value(json!({
            "title": "x".repeat(MAX_TITLE_LEN + 1),
            "days": {}
        }))
        .unwrap();
        let errors = fields(req.validate().unwrap_err());
        assert_eq!(errors[0].1, "title must be at most 120 characters");
        assert_eq!(errors[1].1, "days must not be empty");
    }

    #[test]
    fn days_without_entries_are_rejected() {
        let req: PlanRequest<ExerciseWeek> = serde_json::from_value(json!({
            "title": "Rest week",
            "days": {"monday": [], "tuesday": []}
        }))
        .unwrap();
        let errors = fields(req.validate().unwrap_err());
        assert_eq!(
            errors,
            vec![(
                "days".to_string(),
                "exercise plan must contain at least one exercise".to_string()
            )]
        );
    }

    #[test]
    fn negative_duration_is_reported_by_path() {
        let req: PlanRequest<ExerciseWeek> = serde_json::from_value(json!({
            "title": "Legs",
            "days": {"thursday": [{"name": "squat", "durationMinutes": -10}]}
        }))
        .unwrap();
        let errors = fields(req.validate().unwrap_err());
        assert_eq!(errors[0].0, "days.thursday[0].durationMinutes");
    }
}
