use serde::Deserialize;
use serde_json::Value;
use time::Date;

use crate::{dates::parse_iso_date, error::ApiError, validation::Checker};

pub const MAX_AMOUNT_ML: i64 = 5000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWaterRequest {
    pub amount_ml: Option<Value>,
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// Absent means `today`; future days are rejected.
fn resolve_date(c: &mut Checker, raw: Option<&str>, today: Date) -> Option<Date> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Some(today);
    };
    match parse_iso_date(raw) {
        None => {
            c.push("date", "date must be a valid date (YYYY-MM-DD)");
            None
        }
        Some(d) if d > today => {
            c.push("date", "date cannot be in the future");
            None
        }
        Some(d) => Some(d),
    }
}

impl AddWaterRequest {
    pub fn validate(self, today: Date) -> Result<(i32, Date), ApiError> {
        let mut c = Checker::new();
        let amount = match self.amount_ml {
            None | Some(Value::Null) => {
                c.push("amountMl", "amountMl is required");
                None
            }
            Some(Value::Number(n)) => match n.as_i64() {
                Some(v) if (1..=MAX_AMOUNT_ML).contains(&v) => Some(v as i32),
                Some(_) => {
                    c.push(
                        "amountMl",
                        format!("amountMl must be between 1 and {MAX_AMOUNT_ML}"),
                    );
                    None
                }
                None => {
                    c.push("amountMl", "amountMl must be a whole number");
                    None
                }
            },
            Some(_) => {
                c.push("amountMl", "amountMl must be a number");
                None
            }
        };
        let date = resolve_date(&mut c, self.date.as_deref(), today);
        c.finish()?;
        match (amount, date) {
            (Some(a), Some(d)) => Ok((a, d)),
            _ => Err(ApiError::BadRequest("amountMl is required".into())),
        }
    }
}

impl DateQuery {
    pub fn resolve(&self, today: Date) -> Result<Date, ApiError> {
        let mut c = Checker::new();
        let date = resolve_date(&mut c, self.date.as_deref(), today);
        c.finish()?;
        date.ok_or_else(|| ApiError::BadRequest("date is invalid".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 03 - 10);

    fn req(v: Value) -> AddWaterRequest {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn date_defaults_to_today() {
        let (amount, date) = req(json!({"amountMl": 250})).validate(TODAY).unwrap();
        assert_eq!(amount, 250);
        assert_eq!(date, TODAY);
    }

    #[test]
    fn amount_bounds() {
        assert!(req(json!({"amountMl": 1})).validate(TODAY).is_ok());
        assert!(req(json!({"amountMl": 5000})).validate(TODAY).is_ok());
        assert!(req(json!({"amountMl": 0})).validate(TODAY).is_err());
        assert!(req(json!({"amountMl": 5001})).validate(TODAY).is_err());
        assert!(req(json!({"amountMl": -200})).validate(TODAY).is_err());
        assert!(req(json!({"amountMl": 2.5})).validate(TODAY).is_err());
        assert!(req(json!({"amountMl": "250"})).validate(TODAY).is_err());
        assert!(req(json!({})).validate(TODAY).is_err());
    }

    #[test]
    fn future_and_malformed_dates() {
        let err = req(json!({"amountMl": 200, "date": "2024-03-11"}))
            .validate(TODAY)
            .unwrap_err();
        match err {
            ApiError::Validation(e) => assert_eq!(e[0].message, "date cannot be in the future"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(req(json!({"amountMl": 200, "date": "10/03/2024"}))
            .validate(TODAY)
            .is_err());
        let (_, d) = req(json!({"amountMl": 200, "date": "2024-03-01T08:00:00Z"}))
            .validate(TODAY)
            .unwrap();
        assert_eq!(d, date!(2024 - 03 - 01));
    }

    #[test]
    fn query_resolution() {
        assert_eq!(DateQuery::default().resolve(TODAY).unwrap(), TODAY);
        let q = DateQuery {
            date: Some("2024-02-29".into()),
        };
        assert_eq!(q.resolve(TODAY).unwrap(), date!(2024 - 02 - 29));
    }
}
