use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::calculator::{ActivityLevel, BodyMetrics, BodyMetricsInput, Gender};
use crate::{auth::repo_types::User, error::ApiError, validation::Checker};

/// Body of `POST /body-analysis/analyze`. Numbers may arrive as JSON numbers
/// or numeric strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyAnalysisRequest {
    pub height: Option<Value>,
    pub weight: Option<Value>,
    pub age: Option<Value>,
    pub gender: Option<String>,
    pub activity_level: Option<String>,
}

/// Query of the single-formula `/calculate/*` endpoints; each one reads only
/// the parameters it needs.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateQuery {
    pub weight: Option<String>,
    pub height: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub bmr: Option<String>,
    pub bmi: Option<String>,
    pub activity_level: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyMetricsUpdateRequest {
    pub activity_level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalculatedValue {
    pub value: Value,
    pub unit: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BodyMetricsReport {
    pub metrics: BodyMetrics,
    pub user: User,
}

/// Positive whole number of years.
pub(crate) fn age(c: &mut Checker, value: Option<&Value>) -> Option<u32> {
    let years = c.positive_number("age", value)?;
    if years.fract() != 0.0 || years > f64::from(u32::MAX) {
        c.push("age", "age must be a whole number");
        return None;
    }
    Some(years as u32)
}

fn gender(c: &mut Checker, value: Option<&str>) -> Option<Gender> {
    c.choice("gender", value, "male, female")
}

pub(crate) fn activity_level(c: &mut Checker, value: Option<&str>) -> Option<ActivityLevel> {
    c.choice("activityLevel", value, ActivityLevel::ALLOWED)
}

impl BodyAnalysisRequest {
    pub fn validate(self) -> Result<BodyMetricsInput, ApiError> {
        let mut c = Checker::new();
        let height_cm = c.positive_number("height", self.height.as_ref());
        let weight_kg = c.positive_number("weight", self.weight.as_ref());
        let age = age(&mut c, self.age.as_ref());
        let gender = gender(&mut c, self.gender.as_deref());
        let activity_level = activity_level(&mut c, self.activity_level.as_deref());
        c.finish()?;
        match (height_cm, weight_kg, age, gender, activity_level) {
            (Some(height_cm), Some(weight_kg), Some(age), Some(gender), Some(activity_level)) => {
                Ok(BodyMetricsInput {
                    height_cm,
                    weight_kg,
                    age,
                    gender,
                    activity_level,
                })
            }
            _ => Err(ApiError::BadRequest("Invalid body metrics".into())),
        }
    }
}

fn as_value(raw: &Option<String>) -> Option<Value> {
    raw.clone().map(Value::String)
}

impl CalculateQuery {
    fn number(&self, c: &mut Checker, field: &str, raw: &Option<String>) -> Option<f64> {
        c.positive_number(field, as_value(raw).as_ref())
    }

    fn finish<T>(c: Checker, value: Option<T>) -> Result<T, ApiError> {
        c.finish()?;
        value.ok_or_else(|| ApiError::BadRequest("Invalid parameters".into()))
    }

    pub fn bmi_params(&self) -> Result<(f64, f64), ApiError> {
        let mut c = Checker::new();
        let weight = self.number(&mut c, "weight", &self.weight);
        let height = self.number(&mut c, "height", &self.height);
        Self::finish(c, weight.zip(height))
    }

    pub fn bmr_params(&self) -> Result<(f64, f64, u32, Gender), ApiError> {
        let mut c = Checker::new();
        let weight = self.number(&mut c, "weight", &self.weight);
        let height = self.number(&mut c, "height", &self.height);
        let age = age(&mut c, as_value(&self.age).as_ref());
        let gender = gender(&mut c, self.gender.as_deref());
        let all = match (weight, height, age, gender) {
            (Some(w), Some(h), Some(a), Some(g)) => Some((w, h, a, g)),
            _ => None,
        };
        Self::finish(c, all)
    }

    pub fn daily_calories_params(&self) -> Result<(f64, ActivityLevel), ApiError> {
        let mut c = Checker::new();
        let bmr = self.number(&mut c, "bmr", &self.bmr);
        let level = activity_level(&mut c, self.activity_level.as_deref());
        Self::finish(c, bmr.zip(level))
    }

    pub fn body_fat_params(&self) -> Result<(f64, u32, Gender), ApiError> {
        let mut c = Checker::new();
        let bmi = self.number(&mut c, "bmi", &self.bmi);
        let age = age(&mut c, as_value(&self.age).as_ref());
        let gender = gender(&mut c, self.gender.as_deref());
        let all = match (bmi, age, gender) {
            (Some(b), Some(a), Some(g)) => Some((b, a, g)),
            _ => None,
        };
        Self::finish(c, all)
    }

    pub fn ideal_weight_params(&self) -> Result<(f64, Gender), ApiError> {
        let mut c = Checker::new();
        let height = self.number(&mut c, "height", &self.height);
        let gender = gender(&mut c, self.gender.as_deref());
        Self::finish(c, height.zip(gender))
    }
}
