use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::model::{check_amount, day_key, DayOfWeek, PlanBody, DAYS_PER_WEEK};
use super::repo::PlanRepo;
use crate::{metrics::calculator::round2, state::AppState, validation::Checker};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntry {
    pub name: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayMeals {
    #[serde(default)]
    pub breakfast: Vec<FoodEntry>,
    #[serde(default)]
    pub lunch: Vec<FoodEntry>,
    #[serde(default)]
    pub dinner: Vec<FoodEntry>,
    #[serde(default)]
    pub snacks: Vec<FoodEntry>,
}

impl DayMeals {
    pub fn slots(&self) -> [(&'static str, &[FoodEntry]); 4] {
        [
            ("breakfast", &self.breakfast),
            ("lunch", &self.lunch),
            ("dinner", &self.dinner),
            ("snacks", &self.snacks),
        ]
    }
}

/// Day of week → meal slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealWeek(pub BTreeMap<DayOfWeek, DayMeals>);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Macros {
    fn add(&mut self, food: &FoodEntry) {
        self.calories += food.calories;
        self.protein += food.protein;
        self.carbs += food.carbs;
        self.fat += food.fat;
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            calories: f(self.calories),
            protein: f(self.protein),
            carbs: f(self.carbs),
            fat: f(self.fat),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSummary {
    pub totals: Macros,
    pub daily_average: Macros,
    pub food_count: usize,
    pub meal_count: usize,
}

impl PlanBody for MealWeek {
    const LABEL: &'static str = "meal plan";
    const ENTRY_LABEL: &'static str = "meal";
    const TABLE: &'static str = "meal_plans";

    type Summary = MealSummary;

    fn day_count(&self) -> usize {
        self.0.len()
    }

    fn entry_count(&self) -> usize {
        self.0
            .values()
            .flat_map(|d| d.slots())
            .map(|(_, foods)| foods.len())
            .sum()
    }

    fn check_entries(&self, checker: &mut Checker) {
        for (day, meals) in &self.0 {
            for (slot, foods) in meals.slots() {
                for (i, food) in foods.iter().enumerate() {
                    let path = format!("days.{}.{}[{}]", day_key(*day), slot, i);
                    if food.name.trim().is_empty() {
                        checker.push(&format!("{path}.name"), "food name is required");
                    }
                    check_amount(checker, &format!("{path}.calories"), food.calories);
                    check_amount(checker, &format!("{path}.protein"), food.protein);
                    check_amount(checker, &format!("{path}.carbs"), food.carbs);
                    check_amount(checker, &format!("{path}.fat"), food.fat);
                }
            }
        }
    }

    fn summarize(&self) -> MealSummary {
        let mut totals = Macros::default();
        let mut food_count = 0;
        let mut meal_count = 0;
        for meals in self.0.values() {
            for (_, foods) in meals.slots() {
                if !foods.is_empty() {
                    meal_count += 1;
                }
                for food in foods {
                    totals.add(food);
                    food_count += 1;
                }
            }
        }
        MealSummary {
            totals: totals.map(round2),
            daily_average: totals.map(|v| round2(v / DAYS_PER_WEEK)),
            food_count,
            meal_count,
        }
    }

    fn prompt(title: &str, s: &MealSummary) -> String {
        format!(
            "You are a nutrition coach. Review the weekly meal plan \"{title}\".\n\
             It contains {foods} food entries across {meals} meals.\n\
             Average daily intake: {cal} kcal, {protein} g protein, {carbs} g carbohydrates, {fat} g fat.\n\
             Weekly totals: {tcal} kcal, {tprotein} g protein, {tcarbs} g carbohydrates, {tfat} g fat.\n\
             Assess whether the plan is balanced, point out nutritional gaps or excesses, \
             and suggest concrete improvements in a few short paragraphs.",
            foods = s.food_count,
            meals = s.meal_count,
            cal = s.daily_average.calories,
            protein = s.daily_average.protein,
            carbs = s.daily_average.carbs,
            fat = s.daily_average.fat,
            tcal = s.totals.calories,
            tprotein = s.totals.protein,
            tcarbs = s.totals.carbs,
            tfat = s.totals.fat,
        )
    }

    fn repo(state: &AppState) -> Arc<dyn PlanRepo<Self>> {
        state.meal_plans.clone()
    }
}
