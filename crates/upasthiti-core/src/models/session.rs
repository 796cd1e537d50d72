//! Class session domain model.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{UpasthitiError, UpasthitiResult};

const TIME_FORMAT: &str = "%H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A scheduled class during which attendance can be taken.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub subject: String,
    pub department: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Whether `today` falls within `[start_date, end_date]`.
    pub fn is_editable_on(&self, today: NaiveDate) -> bool {
        self.start_date <= today && today <= self.end_date
    }
}

/// Validated input for creating a session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub owner_id: Uuid,
    pub subject: String,
    pub department: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Raw session fields as submitted by a client.
#[derive(Debug, Clone)]
pub struct SessionFields {
    pub department: String,
    pub subject: String,
    pub start_time: String,
    pub end_time: String,
    pub start_date: String,
    pub end_date: String,
}

impl SessionFields {
    /// Check presence and format of every field and produce a
    /// [`CreateSession`] owned by `owner_id`.
    pub fn validate(self, owner_id: Uuid) -> UpasthitiResult<CreateSession> {
        let missing: Vec<&str> = [
            ("department", &self.department),
            ("subject", &self.subject),
            ("startTime", &self.start_time),
            ("endTime", &self.end_time),
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect();

        if !missing.is_empty() {
            return Err(UpasthitiError::validation(format!(
                "missing fields: {}",
                missing.join(", ")
            )));
        }

        let (start_time, end_time) = parse_time_range(&self.start_time, &self.end_time)?;
        let start_date = parse_date("startDate", &self.start_date)?;
        let end_date = parse_date("endDate", &self.end_date)?;
        if start_date > end_date {
            return Err(UpasthitiError::validation(
                "startDate must not be after endDate",
            ));
        }

        Ok(CreateSession {
            owner_id,
            subject: self.subject.trim().to_string(),
            department: self.department.trim().to_string(),
            start_time,
            end_time,
            start_date,
            end_date,
        })
    }
}

/// Parse an `HH:MM` pair and require `start < end`.
pub fn parse_time_range(start: &str, end: &str) -> UpasthitiResult<(NaiveTime, NaiveTime)> {
    let start_time = parse_time("startTime", start)?;
    let end_time = parse_time("endTime", end)?;
    if start_time >= end_time {
        return Err(UpasthitiError::validation(
            "startTime must be before endTime",
        ));
    }
    Ok((start_time, end_time))
}

fn parse_time(field: &str, value: &str) -> UpasthitiResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| {
        UpasthitiError::validation(format!("{field} must be HH:MM, got {value:?}"))
    })
}

fn parse_date(field: &str, value: &str) -> UpasthitiResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        UpasthitiError::validation(format!("{field} must be YYYY-MM-DD, got {value:?}"))
    })
}

/// Serde adapter storing [`NaiveTime`] as `HH:MM`.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIME_FORMAT;

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&time.format(TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn maths() -> SessionFields {
        SessionFields {
            department: "CS".into(),
            subject: "Maths".into(),
            start_time: "09:00".into(),
            end_time: "10:00".into(),
            start_date: "2024-01-01".into(),
            end_date: "2024-06-01".into(),
        }
    }

    #[test]
    fn valid_fields_produce_create_session() {
        let owner = Uuid::new_v4();
        let input = maths().validate(owner).unwrap();
        assert_eq!(input.owner_id, owner);
        assert_eq!(input.subject, "Maths");
        assert_eq!(input.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(input.end_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn missing_fields_are_listed() {
        let fields = SessionFields {
            subject: "  ".into(),
            end_date: String::new(),
            ..maths()
        };
        match fields.validate(Uuid::new_v4()) {
            Err(UpasthitiError::Validation { message }) => {
                assert!(message.contains("subject"), "{message}");
                assert!(message.contains("endDate"), "{message}");
                assert!(!message.contains("department"), "{message}");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn malformed_time_and_date_are_rejected() {
        let bad_time = SessionFields {
            start_time: "9am".into(),
            ..maths()
        };
        assert!(bad_time.validate(Uuid::new_v4()).is_err());

        let bad_date = SessionFields {
            start_date: "01/01/2024".into(),
            ..maths()
        };
        assert!(bad_date.validate(Uuid::new_v4()).is_err());
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let times = SessionFields {
            start_time: "11:00".into(),
            ..maths()
        };
        assert!(times.validate(Uuid::new_v4()).is_err());

        let dates = SessionFields {
            start_date: "2024-07-01".into(),
            ..maths()
        };
        assert!(dates.validate(Uuid::new_v4()).is_err());
    }

    #[test]
    fn session_serializes_times_as_hh_mm() {
        let input = maths().validate(Uuid::new_v4()).unwrap();
        let session = Session {
            id: Uuid::new_v4(),
            owner_id: input.owner_id,
            subject: input.subject,
            department: input.department,
            start_time: input.start_time,
            end_time: input.end_time,
            start_date: input.start_date,
            end_date: input.end_date,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["startTime"], "09:00");
        assert_eq!(json["endTime"], "10:00");
        assert_eq!(json["startDate"], "2024-01-01");

        let back: Session = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn editable_window_is_inclusive() {
        let input = maths().validate(Uuid::new_v4()).unwrap();
        let session = Session {
            id: Uuid::new_v4(),
            owner_id: input.owner_id,
            subject: input.subject,
            department: input.department,
            start_time: input.start_time,
            end_time: input.end_time,
            start_date: input.start_date,
            end_date: input.end_date,
            created_at: Utc::now(),
        };
        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert!(session.is_editable_on(day(2024, 1, 1)));
        assert!(session.is_editable_on(day(2024, 6, 1)));
        assert!(!session.is_editable_on(day(2023, 12, 31)));
        assert!(!session.is_editable_on(day(2024, 6, 2)));
    }
}
