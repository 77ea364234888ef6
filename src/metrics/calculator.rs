//! Body-metrics formulas. Every surface computes BMI, BMR, daily calories,
//! body fat and ideal weight through this module.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

const LB_TO_KG: f64 = 0.453_592_37;
const CM_PER_INCH: f64 = 2.54;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(format!("unknown gender `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Very,
    Extra,
}

impl ActivityLevel {
    pub const ALLOWED: &'static str = "sedentary, light, moderate, very, extra";

    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Very => 1.725,
            ActivityLevel::Extra => 1.9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Very => "very",
            ActivityLevel::Extra => "extra",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "very" => Ok(ActivityLevel::Very),
            "extra" => Ok(ActivityLevel::Extra),
            other => Err(format!("unknown activity level `{other}`")),
        }
    }
}

/// Validated calculator input. Height in cm, weight in kg, age in years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMetricsInput {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyMetrics {
    pub bmi: f64,
    pub bmr: i64,
    pub daily_calories: i64,
    pub body_fat_percentage: f64,
    pub ideal_weight: f64,
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    round2(weight_kg / (height_m * height_m))
}

/// Mifflin-St Jeor.
pub fn bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> i64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    let value = match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    };
    value.round() as i64
}

pub fn daily_calories(bmr: f64, activity_level: ActivityLevel) -> i64 {
    (bmr * activity_level.multiplier()).round() as i64
}

pub fn body_fat_percentage(bmi: f64, age: u32, gender: Gender) -> f64 {
    let base = 1.20 * bmi + 0.23 * f64::from(age);
    let value = match gender {
        Gender::Male => base - 16.2,
        Gender::Female => base - 5.4,
    };
    round2(value)
}

/// Devine formula evaluated in pounds, then converted to kg. Heights under
/// five feet are not clamped.
pub fn ideal_weight(height_cm: f64, gender: Gender) -> f64 {
    let inches_over_five_feet = height_cm / CM_PER_INCH - 60.0;
    let base_lb = match gender {
        Gender::Male => 50.0,
        Gender::Female => 45.5,
    };
    round2((base_lb + 2.3 * inches_over_five_feet) * LB_TO_KG)
}

/// Runs the whole chain; daily calories use the rounded BMR and body fat the
/// rounded BMI.
pub fn analyze(input: &BodyMetricsInput) -> BodyMetrics {
    let bmi = bmi(input.weight_kg, input.height_cm);
    let bmr = bmr(input.weight_kg, input.height_cm, input.age, input.gender);
    BodyMetrics {
        bmi,
        bmr,
        daily_calories: daily_calories(bmr as f64, input.activity_level),
        body_fat_percentage: body_fat_percentage(bmi, input.age, input.gender),
        ideal_weight: ideal_weight(input.height_cm, input.gender),
    }
}
