//! User records and input validation

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use validator::Validate;

use crate::core::error::AppError;

/// A row of the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub uuid: String,
    pub fullname: String,
    pub study_level: String,
    pub age: i32,
}

impl User {
    pub fn new(uuid: impl Into<String>, fields: UserFields) -> Self {
        Self {
            uuid: uuid.into(),
            fullname: fields.fullname,
            study_level: fields.study_level,
            age: fields.age,
        }
    }
}

/// The three mutable columns, as accepted from a request body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct UserFields {
    #[validate(length(min = 1))]
    pub fullname: String,

    #[validate(length(min = 1))]
    pub study_level: String,

    #[serde(deserialize_with = "deserialize_age")]
    pub age: i32,
}

/// Body of a successful `PUT /api/users/:uuid`
///
/// `age` is echoed exactly as submitted, so `"24"` stays a string here
/// even though the stored column is numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatedUser {
    pub uuid: String,
    pub fullname: String,
    pub study_level: String,
    pub age: Value,
}

/// Validate an arbitrary request body
///
/// Fails when the body is absent or not an object, when `fullname` or
/// `study_level` is missing, empty or not a string, or when `age` is missing
/// or not an integer (a JSON number or a numeric string). Unknown fields,
/// including a client-supplied `uuid`, are ignored.
pub fn parse_user(input: Option<&Value>) -> Result<UserFields, AppError> {
    let value = input
        .filter(|value| value.is_object())
        .ok_or(AppError::Validation)?;

    let fields = UserFields::deserialize(value).map_err(|_| AppError::Validation)?;
    fields.validate().map_err(|_| AppError::Validation)?;

    Ok(fields)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AgeRepr {
    Number(Number),
    Text(String),
}

fn deserialize_age<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = AgeRepr::deserialize(deserializer)?;
    let age = match &repr {
        AgeRepr::Number(number) => age_from_number(number),
        AgeRepr::Text(text) => text.trim().parse::<f64>().ok().and_then(age_from_f64),
    };

    age.ok_or_else(|| serde::de::Error::custom("age is not a valid integer"))
}

fn age_from_number(number: &Number) -> Option<i32> {
    if let Some(value) = number.as_i64() {
        return i32::try_from(value).ok();
    }

    age_from_f64(number.as_f64()?)
}

/// 24.0 is accepted, 24.5, NaN and anything outside INT are not
fn age_from_f64(value: f64) -> Option<i32> {
    if value.is_finite()
        && value.fract() == 0.0
        && value >= f64::from(i32::MIN)
        && value <= f64::from(i32::MAX)
    {
        Some(value as i32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<UserFields, AppError> {
        parse_user(Some(&value))
    }

    #[test]
    fn test_valid_input() {
        let fields = parse(json!({ "fullname": "Ana", "study_level": "MSc", "age": 24 })).unwrap();
        assert_eq!(
            fields,
            UserFields {
                fullname: "Ana".to_string(),
                study_level: "MSc".to_string(),
                age: 24,
            }
        );
    }

    #[test]
    fn test_numeric_string_age() {
        let fields = parse(json!({ "fullname": "Ana", "study_level": "MSc", "age": " 31 " })).unwrap();
        assert_eq!(fields.age, 31);

        let fields = parse(json!({ "fullname": "Ana", "study_level": "MSc", "age": 31.0 })).unwrap();
        assert_eq!(fields.age, 31);

        let fields = parse(json!({ "fullname": "Ana", "study_level": "MSc", "age": "24.0" })).unwrap();
        assert_eq!(fields.age, 24);
    }

    #[test]
    fn test_string_and_number_ages_agree() {
        for (number, text) in [
            (json!(24.0), json!("24.0")),
            (json!(1e2), json!("1e2")),
            (json!(-3), json!("-3")),
        ] {
            let from_number =
                parse(json!({ "fullname": "Ana", "study_level": "MSc", "age": number })).unwrap();
            let from_text =
                parse(json!({ "fullname": "Ana", "study_level": "MSc", "age": text })).unwrap();
            assert_eq!(from_number.age, from_text.age);
        }

        for text in ["24.5", "inf", "NaN", "3000000000", "1e10"] {
            let input = json!({ "fullname": "Ana", "study_level": "MSc", "age": text });
            assert!(parse(input).is_err(), "age {text:?} should be rejected");
        }
    }

    #[test]
    fn test_zero_age_is_accepted() {
        let fields = parse(json!({ "fullname": "Ana", "study_level": "MSc", "age": 0 })).unwrap();
        assert_eq!(fields.age, 0);
    }

    #[test]
    fn test_absent_input() {
        assert!(matches!(parse_user(None), Err(AppError::Validation)));
        assert!(parse(Value::Null).is_err());
        assert!(parse(json!([])).is_err());
        assert!(parse(json!("Ana")).is_err());
    }

    #[test]
    fn test_missing_or_mistyped_names() {
        assert!(parse(json!({ "study_level": "MSc", "age": 24 })).is_err());
        assert!(parse(json!({ "fullname": "", "study_level": "MSc", "age": 24 })).is_err());
        assert!(parse(json!({ "fullname": 42, "study_level": "MSc", "age": 24 })).is_err());
        assert!(parse(json!({ "fullname": "Ana", "age": 24 })).is_err());
        assert!(parse(json!({ "fullname": "Ana", "study_level": "", "age": 24 })).is_err());
        assert!(parse(json!({ "fullname": "Ana", "study_level": ["MSc"], "age": 24 })).is_err());
    }

    #[test]
    fn test_invalid_age() {
        for age in [
            json!(null),
            json!("NaN"),
            json!("twenty"),
            json!(""),
            json!(true),
            json!(24.5),
            json!(3_000_000_000_i64),
            json!({ "years": 24 }),
        ] {
            let input = json!({ "fullname": "Ana", "study_level": "MSc", "age": age });
            assert!(parse(input).is_err(), "age {age} should be rejected");
        }

        assert!(parse(json!({ "fullname": "Ana", "study_level": "MSc" })).is_err());
    }

    #[test]
    fn test_client_uuid_is_ignored() {
        let fields = parse(json!({
            "uuid": "not-yours",
            "fullname": "Ana",
            "study_level": "MSc",
            "age": 24
        }))
        .unwrap();
        let user = User::new("generated", fields);
        assert_eq!(user.uuid, "generated");
    }
}
