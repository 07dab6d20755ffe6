//! Request validation against per-resource field schemas.

use crate::error::AppError;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    /// `YYYY-MM-DD`
    Date,
    IntegerList,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
    /// Characters for text, items for lists.
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Bounds for integers and list items.
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
}

impl FieldRule {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldRule {
            name,
            kind,
            required: false,
            nullable: false,
            min_length: None,
            max_length: None,
            minimum: None,
            maximum: None,
        }
    }
}

pub const NAME_MAX_LENGTH: usize = 50;
/// Largest accepted record id. Keeps `MAX(id) + 1` inside BIGINT when the sequence is resynced.
pub const ID_MAXIMUM: i64 = i32::MAX as i64;

pub const COURSE_FIELDS: &[FieldRule] = &[
    FieldRule {
        minimum: Some(1),
        maximum: Some(ID_MAXIMUM),
        ..FieldRule::new("id", FieldKind::Integer)
    },
    FieldRule {
        required: true,
        min_length: Some(1),
        max_length: Some(NAME_MAX_LENGTH),
        ..FieldRule::new("name", FieldKind::Text)
    },
    FieldRule {
        minimum: Some(1),
        maximum: Some(ID_MAXIMUM),
        ..FieldRule::new("students", FieldKind::IntegerList)
    },
];

pub const STUDENT_FIELDS: &[FieldRule] = &[
    FieldRule {
        minimum: Some(1),
        maximum: Some(ID_MAXIMUM),
        ..FieldRule::new("id", FieldKind::Integer)
    },
    FieldRule {
        required: true,
        min_length: Some(1),
        max_length: Some(NAME_MAX_LENGTH),
        ..FieldRule::new("name", FieldKind::Text)
    },
    FieldRule {
        nullable: true,
        ..FieldRule::new("birth_date", FieldKind::Date)
    },
];

pub struct RequestValidator;

impl RequestValidator {
    /// Validate body against the rules. All required fields must be present and non-null.
    pub fn validate(body: &HashMap<String, Value>, rules: &[FieldRule]) -> Result<(), AppError> {
        for rule in rules {
            let val = body.get(rule.name);
            if rule.required && (val.is_none() || val == Some(&Value::Null)) {
                return Err(AppError::Validation(format!("{} is required", rule.name)));
            }
            if let Some(v) = val {
                validate_field(rule, v)?;
            }
        }
        Ok(())
    }

    /// Validate only the fields present in body (for PATCH). Required is not enforced for missing fields.
    pub fn validate_partial(body: &HashMap<String, Value>, rules: &[FieldRule]) -> Result<(), AppError> {
        for (key, v) in body {
            if let Some(rule) = rules.iter().find(|r| r.name == key.as_str()) {
                validate_field(rule, v)?;
            }
        }
        Ok(())
    }

    /// Validate, drop fields the schema does not know, and deserialize into `T`.
    pub fn parse<T: DeserializeOwned>(
        body: HashMap<String, Value>,
        rules: &[FieldRule],
        partial: bool,
    ) -> Result<T, AppError> {
        if partial {
            Self::validate_partial(&body, rules)?;
        } else {
            Self::validate(&body, rules)?;
        }
        let known: Map<String, Value> = body
            .into_iter()
            .filter(|(k, _)| rules.iter().any(|r| r.name == k.as_str()))
            .collect();
        serde_json::from_value(Value::Object(known)).map_err(|e| AppError::Validation(e.to_string()))
    }
}

fn validate_field(rule: &FieldRule, v: &Value) -> Result<(), AppError> {
    let col = rule.name;
    if v.is_null() {
        if rule.nullable {
            return Ok(());
        }
        return Err(AppError::Validation(format!("{} may not be null", col)));
    }
    match rule.kind {
        FieldKind::Integer => {
            let n = v
                .as_i64()
                .ok_or_else(|| AppError::Validation(format!("{} must be an integer", col)))?;
            check_range(col, n, rule)?;
        }
        FieldKind::Text => {
            let s = v
                .as_str()
                .ok_or_else(|| AppError::Validation(format!("{} must be a string", col)))?;
            let len = s.chars().count();
            if let Some(min) = rule.min_length {
                if len < min {
                    return Err(AppError::Validation(format!("{} must be at least {} characters", col, min)));
                }
            }
            if let Some(max) = rule.max_length {
                if len > max {
                    return Err(AppError::Validation(format!("{} must be at most {} characters", col, max)));
                }
            }
        }
        FieldKind::Date => {
            let s = v
                .as_str()
                .ok_or_else(|| AppError::Validation(format!("{} must be a date string", col)))?;
            if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_err() {
                return Err(AppError::Validation(format!("{} must be a valid date (YYYY-MM-DD)", col)));
            }
        }
        FieldKind::IntegerList => {
            let items = v
                .as_array()
                .ok_or_else(|| AppError::Validation(format!("{} must be an array of integers", col)))?;
            for item in items {
                let n = item
                    .as_i64()
                    .ok_or_else(|| AppError::Validation(format!("{} must contain only integers", col)))?;
                check_range(col, n, rule)?;
            }
            if let Some(max) = rule.max_length {
                if items.len() > max {
                    return Err(AppError::Validation(format!("{} may contain at most {} items", col, max)));
                }
            }
        }
    }
    Ok(())
}

fn check_range(col: &str, n: i64, rule: &FieldRule) -> Result<(), AppError> {
    if let Some(min) = rule.minimum {
        if n < min {
            return Err(AppError::Validation(format!("{} must be at least {}", col, min)));
        }
    }
    if let Some(max) = rule.maximum {
        if n > max {
            return Err(AppError::Validation(format!("{} must be at most {}", col, max)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CourseChanges, NewCourse, NewStudent};
    use serde_json::json;

    fn body(v: Value) -> HashMap<String, Value> {
        match v {
            Value::Object(m) => m.into_iter().collect(),
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn name_is_required_on_create() {
        let err = RequestValidator::validate(&body(json!({ "id": 4 })), COURSE_FIELDS).unwrap_err();
        assert!(err.to_string().contains("name is required"));
    }

    #[test]
    fn parse_accepts_id_and_name() {
        let course: NewCourse =
            RequestValidator::parse(body(json!({ "id": 4, "name": "FFFF" })), COURSE_FIELDS, false).unwrap();
        assert_eq!(course.id, Some(4));
        assert_eq!(course.name, "FFFF");
        assert!(course.students.is_empty());
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let course: NewCourse =
            RequestValidator::parse(body(json!({ "name": "A", "room": "B12" })), COURSE_FIELDS, false).unwrap();
        assert_eq!(course.name, "A");
    }

    #[test]
    fn wrong_types_are_rejected() {
        for bad in [
            json!({ "name": 12 }),
            json!({ "name": "A", "id": "four" }),
            json!({ "name": "A", "students": [1, "2"] }),
            json!({ "name": "A", "students": 3 }),
            json!({ "name": null }),
        ] {
            assert!(
                RequestValidator::validate(&body(bad.clone()), COURSE_FIELDS).is_err(),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn ids_are_bounded() {
        for bad in [
            json!({ "name": "A", "id": 0 }),
            json!({ "name": "A", "id": ID_MAXIMUM + 1 }),
            json!({ "name": "A", "id": i64::MAX }),
            json!({ "name": "A", "students": [i64::MAX] }),
        ] {
            assert!(RequestValidator::validate(&body(bad.clone()), COURSE_FIELDS).is_err(), "accepted {}", bad);
        }
        let ok = json!({ "name": "A", "id": ID_MAXIMUM });
        assert!(RequestValidator::validate(&body(ok), STUDENT_FIELDS).is_ok());
    }

    #[test]
    fn name_length_bounds() {
        let long = "x".repeat(NAME_MAX_LENGTH + 1);
        assert!(RequestValidator::validate(&body(json!({ "name": long })), COURSE_FIELDS).is_err());
        assert!(RequestValidator::validate(&body(json!({ "name": "" })), COURSE_FIELDS).is_err());
        let max = "é".repeat(NAME_MAX_LENGTH);
        assert!(RequestValidator::validate(&body(json!({ "name": max })), COURSE_FIELDS).is_ok());
    }

    #[test]
    fn partial_skips_required() {
        let changes: CourseChanges =
            RequestValidator::parse(body(json!({ "students": [2, 3] })), COURSE_FIELDS, true).unwrap();
        assert!(changes.name.is_none());
        assert_eq!(changes.students, Some(vec![2, 3]));
    }

    #[test]
    fn birth_date_must_be_a_real_date() {
        assert!(RequestValidator::validate(&body(json!({ "name": "A", "birth_date": "2001-02-30" })), STUDENT_FIELDS)
            .is_err());
        let student: NewStudent =
            RequestValidator::parse(body(json!({ "name": "A", "birth_date": null })), STUDENT_FIELDS, false).unwrap();
        assert!(student.birth_date.is_none());
    }
}
