use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

pub const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Parses `YYYY-MM-DD`, also accepting a full ISO timestamp by its date part.
pub fn parse_iso_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    let day = raw.split('T').next().unwrap_or(raw);
    Date::parse(day, ISO_DATE).ok()
}

/// Whole years between `birth` and `on`.
pub fn age_on(birth: Date, on: Date) -> i32 {
    let mut age = on.year() - birth.year();
    if (on.month() as u8, on.day()) < (birth.month() as u8, birth.day()) {
        age -= 1;
    }
    age
}

/// `YYYY-MM-DD` (de)serialization for `time::Date`.
pub mod iso_date {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        let text = date.format(super::ISO_DATE).map_err(serde::ser::Error::custom)?;
        s.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_iso_date(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid date `{raw}`, expected YYYY-MM-DD")))
    }

    pub mod option {
        use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
        use time::Date;

        pub fn serialize<S: Serializer>(date: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => super::serialize(d, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
            match Option::<String>::deserialize(d)? {
                None => Ok(None),
                Some(raw) => super::super::parse_iso_date(&raw)
                    .map(Some)
                    .ok_or_else(|| {
                        D::Error::custom(format!("invalid date `{raw}`, expected YYYY-MM-DD"))
                    }),
            }
        }
    }
}
