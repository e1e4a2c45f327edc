//! Validation of untyped JSON against the case record shapes.
//!
//! Serde derive already rejects most bad input, but its errors are opaque
//! strings. The parsers here walk a `serde_json::Value` so every failure maps
//! onto one `SchemaError` kind.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Case, CaseType, CasesData, WeekDay};

const CASE_FIELDS: [&str; 3] = ["type", "day", "severity"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("invalid case shape at {path}: {reason}")]
    InvalidCaseShape { path: String, reason: String },
    #[error("cases data is missing the '{0}' bucket")]
    MissingBucket(CaseType),
    #[error("'{0}' is not a weekday (expected Monday through Friday)")]
    InvalidWeekDay(String),
    #[error("case '{key}' is filed under '{bucket}' but tagged '{tagged}'")]
    BucketMismatch {
        bucket: CaseType,
        key: String,
        tagged: CaseType,
    },
    #[error("malformed JSON: {0}")]
    Malformed(String),
}

impl SchemaError {
    fn shape(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::InvalidCaseShape {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Prefixes the field path with the location of the enclosing case.
    fn nested(self, prefix: &str) -> Self {
        match self {
            SchemaError::InvalidCaseShape { path, reason } => SchemaError::InvalidCaseShape {
                path: format!("{prefix}.{path}"),
                reason,
            },
            other => other,
        }
    }
}

pub fn parse_week_day(input: &str) -> Result<WeekDay, SchemaError> {
    input.parse()
}

pub fn parse_case(value: &Value) -> Result<Case, SchemaError> {
    let object = value
        .as_object()
        .ok_or_else(|| SchemaError::shape("$", format!("expected object, found {}", type_name(value))))?;

    if let Some(extra) = object.keys().find(|key| !CASE_FIELDS.contains(&key.as_str())) {
        return Err(SchemaError::shape(extra.as_str(), "field is not permitted"));
    }

    let case_type = string_field(object, "type")?;
    let day = string_field(object, "day")?;
    let severity = string_field(object, "severity")?;

    Case::parse(case_type, day, severity)
}

pub fn parse_cases_data(value: &Value) -> Result<CasesData, SchemaError> {
    let object = value
        .as_object()
        .ok_or(SchemaError::MissingBucket(CaseType::FollowUps))?;

    let mut data = CasesData::default();
    for bucket in CaseType::ALL {
        let entries = object
            .get(bucket.as_str())
            .ok_or(SchemaError::MissingBucket(bucket))?
            .as_object()
            .ok_or_else(|| SchemaError::shape(bucket.as_str(), "bucket must be an object"))?;

        let target = match bucket {
            CaseType::FollowUps => &mut data.follow_ups,
            CaseType::Strikes => &mut data.strikes,
        };
        for (key, entry) in entries {
            let case = parse_case(entry).map_err(|err| err.nested(&format!("{bucket}.{key}")))?;
            target.insert(key.clone(), case);
        }
    }

    Ok(data)
}

/// Like `parse_cases_data`, but every case must carry its bucket's tag.
pub fn validate_strict(value: &Value) -> Result<CasesData, SchemaError> {
    let data = parse_cases_data(value)?;
    match data.mismatches().into_iter().next() {
        Some(mismatch) => Err(mismatch),
        None => Ok(data),
    }
}

impl CasesData {
    pub fn from_json_str(input: &str) -> Result<Self, SchemaError> {
        let value: Value =
            serde_json::from_str(input).map_err(|err| SchemaError::Malformed(err.to_string()))?;
        parse_cases_data(&value)
    }
}

fn string_field<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a str, SchemaError> {
    match object.get(field) {
        None => Err(SchemaError::shape(field, "field is required")),
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(other) => Err(SchemaError::shape(
            field,
            format!("expected string, found {}", type_name(other)),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use serde_json::json;

    #[test]
    fn accepts_well_formed_case() {
        let case = parse_case(&json!({"type": "Strikes", "day": "Monday", "severity": "C"})).unwrap();
        assert_eq!(case, Case::new(CaseType::Strikes, "Monday", Severity::C));
    }

    #[test]
    fn rejects_unknown_case_type() {
        let err = parse_case(&json!({"type": "Warning", "day": "Monday", "severity": "C"})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidCaseShape { ref path, .. } if path == "type"));
    }

    #[test]
    fn rejects_every_severity_outside_b_and_c() {
        for severity in ["A", "D", "b", "c", "", "BC", " B"] {
            let err = parse_case(&json!({"type": "Follow-ups", "day": "Friday", "severity": severity}))
                .unwrap_err();
            assert!(
                matches!(err, SchemaError::InvalidCaseShape { ref path, .. } if path == "severity"),
                "severity {severity:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_every_type_outside_the_two_tags() {
        for case_type in ["Follow-up", "follow-ups", "Strike", "STRIKES", "", "Follow ups"] {
            let err = parse_case(&json!({"type": case_type, "day": "Friday", "severity": "B"}))
                .unwrap_err();
            assert!(matches!(err, SchemaError::InvalidCaseShape { .. }));
        }
    }

    #[test]
    fn rejects_missing_extra_and_non_string_fields() {
        let missing = parse_case(&json!({"type": "Strikes", "severity": "C"})).unwrap_err();
        assert_eq!(
            missing,
            SchemaError::InvalidCaseShape {
                path: "day".to_string(),
                reason: "field is required".to_string(),
            }
        );

        let extra = parse_case(&json!({
            "type": "Strikes", "day": "Monday", "severity": "C", "note": "late"
        }))
        .unwrap_err();
        assert!(matches!(extra, SchemaError::InvalidCaseShape { ref path, .. } if path == "note"));

        let numeric = parse_case(&json!({"type": "Strikes", "day": 3, "severity": "C"})).unwrap_err();
        assert!(matches!(numeric, SchemaError::InvalidCaseShape { ref reason, .. } if reason.contains("number")));

        assert!(matches!(parse_case(&json!([])), Err(SchemaError::InvalidCaseShape { .. })));
    }

    #[test]
    fn week_day_accepts_only_the_five_weekdays() {
        for day in WeekDay::ALL {
            assert_eq!(parse_week_day(day.as_str()), Ok(day));
        }
        for day in ["Sunday", "Saturday", "monday", "Mon", "", "Friday "] {
            assert_eq!(
                parse_week_day(day),
                Err(SchemaError::InvalidWeekDay(day.to_string()))
            );
        }
    }

    #[test]
    fn empty_buckets_are_valid() {
        let data = parse_cases_data(&json!({"Follow-ups": {}, "Strikes": {}})).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn missing_bucket_is_reported_by_name() {
        assert_eq!(
            parse_cases_data(&json!({"Follow-ups": {}})),
            Err(SchemaError::MissingBucket(CaseType::Strikes))
        );
        assert_eq!(
            parse_cases_data(&json!({"Strikes": {}})),
            Err(SchemaError::MissingBucket(CaseType::FollowUps))
        );
        assert_eq!(
            parse_cases_data(&json!("not an object")),
            Err(SchemaError::MissingBucket(CaseType::FollowUps))
        );
    }

    #[test]
    fn nested_case_errors_carry_their_location() {
        let err = parse_cases_data(&json!({
            "Follow-ups": {},
            "Strikes": {"avery": {"type": "Strikes", "day": "Monday", "severity": "Z"}}
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidCaseShape { ref path, .. } if path == "Strikes.avery.severity"));
    }

    #[test]
    fn strict_validation_rejects_misfiled_cases() {
        let document = json!({
            "Follow-ups": {"jules": {"type": "Strikes", "day": "Monday", "severity": "B"}},
            "Strikes": {}
        });
        assert!(parse_cases_data(&document).is_ok());
        assert!(matches!(
            validate_strict(&document),
            Err(SchemaError::BucketMismatch { bucket: CaseType::FollowUps, .. })
        ));
    }

    #[test]
    fn serialized_data_parses_back_equal() {
        let mut data = CasesData::default();
        data.insert("avery", Case::new(CaseType::Strikes, "Monday", Severity::C));
        data.insert("jules", Case::new(CaseType::FollowUps, "2026-02-03", Severity::B));

        let encoded = serde_json::to_string(&data).unwrap();
        assert_eq!(CasesData::from_json_str(&encoded).unwrap(), data);
        assert_eq!(serde_json::from_str::<CasesData>(&encoded).unwrap(), data);
    }

    #[test]
    fn malformed_input_is_not_a_bucket_error() {
        assert!(matches!(
            CasesData::from_json_str("{\"Follow-ups\": "),
            Err(SchemaError::Malformed(_))
        ));
    }
}
