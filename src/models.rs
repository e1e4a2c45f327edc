use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::schema::{parse_week_day, SchemaError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CaseType {
    #[serde(rename = "Follow-ups")]
    FollowUps,
    Strikes,
}

impl CaseType {
    pub const ALL: [CaseType; 2] = [CaseType::FollowUps, CaseType::Strikes];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::FollowUps => "Follow-ups",
            CaseType::Strikes => "Strikes",
        }
    }
}

impl fmt::Display for CaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Follow-ups" => Ok(CaseType::FollowUps),
            "Strikes" => Ok(CaseType::Strikes),
            other => Err(SchemaError::InvalidCaseShape {
                path: "type".to_string(),
                reason: format!("'{other}' is not one of 'Follow-ups', 'Strikes'"),
            }),
        }
    }
}

/// Two-level case classification. The letters carry no ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    B,
    C,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::B => "B",
            Severity::C => "C",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B" => Ok(Severity::B),
            "C" => Ok(Severity::C),
            other => Err(SchemaError::InvalidCaseShape {
                path: "severity".to_string(),
                reason: format!("'{other}' is not one of 'B', 'C'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl WeekDay {
    pub const ALL: [WeekDay; 5] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeekDay::Monday => "Monday",
            WeekDay::Tuesday => "Tuesday",
            WeekDay::Wednesday => "Wednesday",
            WeekDay::Thursday => "Thursday",
            WeekDay::Friday => "Friday",
        }
    }

    /// Weekend days have no counterpart.
    pub fn from_weekday(day: Weekday) -> Option<Self> {
        match day {
            Weekday::Mon => Some(WeekDay::Monday),
            Weekday::Tue => Some(WeekDay::Tuesday),
            Weekday::Wed => Some(WeekDay::Wednesday),
            Weekday::Thu => Some(WeekDay::Thursday),
            Weekday::Fri => Some(WeekDay::Friday),
            Weekday::Sat | Weekday::Sun => None,
        }
    }
}

impl fmt::Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekDay {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeekDay::ALL
            .into_iter()
            .find(|day| day.as_str() == s)
            .ok_or_else(|| SchemaError::InvalidWeekDay(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Case {
    #[serde(rename = "type")]
    pub case_type: CaseType,
    pub day: String,
    pub severity: Severity,
}

impl Case {
    pub fn new(case_type: CaseType, day: impl Into<String>, severity: Severity) -> Self {
        Self {
            case_type,
            day: day.into(),
            severity,
        }
    }

    pub fn parse(case_type: &str, day: &str, severity: &str) -> Result<Self, SchemaError> {
        Ok(Self {
            case_type: case_type.parse()?,
            day: day.to_string(),
            severity: severity.parse()?,
        })
    }

    /// Resolves `day` as either a weekday name or an ISO date on a weekday.
    pub fn week_day(&self) -> Option<WeekDay> {
        let day = self.day.trim();
        if let Ok(week_day) = parse_week_day(day) {
            return Some(week_day);
        }
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .ok()
            .and_then(|date| WeekDay::from_weekday(date.weekday()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasesData {
    #[serde(rename = "Follow-ups")]
    pub follow_ups: BTreeMap<String, Case>,
    #[serde(rename = "Strikes")]
    pub strikes: BTreeMap<String, Case>,
}

impl CasesData {
    pub fn bucket(&self, case_type: CaseType) -> &BTreeMap<String, Case> {
        match case_type {
            CaseType::FollowUps => &self.follow_ups,
            CaseType::Strikes => &self.strikes,
        }
    }

    fn bucket_mut(&mut self, case_type: CaseType) -> &mut BTreeMap<String, Case> {
        match case_type {
            CaseType::FollowUps => &mut self.follow_ups,
            CaseType::Strikes => &mut self.strikes,
        }
    }

    /// Files the case under the bucket matching its own tag.
    pub fn insert(&mut self, key: impl Into<String>, case: Case) -> Option<Case> {
        self.bucket_mut(case.case_type).insert(key.into(), case)
    }

    pub fn remove(&mut self, case_type: CaseType, key: &str) -> Option<Case> {
        self.bucket_mut(case_type).remove(key)
    }

    pub fn len(&self) -> usize {
        self.follow_ups.len() + self.strikes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Yields `(bucket, key, case)` with Follow-ups first.
    pub fn iter(&self) -> impl Iterator<Item = (CaseType, &str, &Case)> {
        CaseType::ALL.into_iter().flat_map(move |bucket| {
            self.bucket(bucket)
                .iter()
                .map(move |(key, case)| (bucket, key.as_str(), case))
        })
    }

    /// Cases filed under a bucket that disagrees with their `type` tag.
    pub fn mismatches(&self) -> Vec<SchemaError> {
        self.iter()
            .filter(|(bucket, _, case)| case.case_type != *bucket)
            .map(|(bucket, key, case)| SchemaError::BucketMismatch {
                bucket,
                key: key.to_string(),
                tagged: case.case_type,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSummary {
    pub case_type: CaseType,
    pub count: usize,
    pub severity_b: usize,
    pub severity_c: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTally {
    pub day: WeekDay,
    pub follow_ups: usize,
    pub strikes: usize,
}

impl DayTally {
    pub fn total(&self) -> usize {
        self.follow_ups + self.strikes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTally {
    pub key: String,
    pub follow_ups: usize,
    pub strikes: usize,
}

impl KeyTally {
    pub fn total(&self) -> usize {
        self.follow_ups + self.strikes
    }
}
