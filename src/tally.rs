use std::collections::HashMap;

use crate::models::{BucketSummary, CaseType, CasesData, DayTally, KeyTally, Severity, WeekDay};

pub fn summarize_by_bucket(data: &CasesData) -> Vec<BucketSummary> {
    CaseType::ALL
        .into_iter()
        .map(|case_type| {
            let bucket = data.bucket(case_type);
            let severity_b = bucket
                .values()
                .filter(|case| case.severity == Severity::B)
                .count();
            BucketSummary {
                case_type,
                count: bucket.len(),
                severity_b,
                severity_c: bucket.len() - severity_b,
            }
        })
        .collect()
}

/// Counts cases per weekday, Monday first. The second value lists
/// `(bucket, key)` pairs whose `day` does not resolve to a weekday.
pub fn tally_by_day(data: &CasesData) -> (Vec<DayTally>, Vec<(CaseType, String)>) {
    let mut tallies: Vec<DayTally> = WeekDay::ALL
        .into_iter()
        .map(|day| DayTally {
            day,
            follow_ups: 0,
            strikes: 0,
        })
        .collect();
    let mut unscheduled = Vec::new();

    for (bucket, key, case) in data.iter() {
        let Some(day) = case.week_day() else {
            unscheduled.push((bucket, key.to_string()));
            continue;
        };

        let entry = &mut tallies[day as usize];
        match bucket {
            CaseType::FollowUps => entry.follow_ups += 1,
            CaseType::Strikes => entry.strikes += 1,
        }
    }

    (tallies, unscheduled)
}

pub fn rank_keys(data: &CasesData) -> Vec<KeyTally> {
    let mut tallies: HashMap<&str, KeyTally> = HashMap::new();

    for (bucket, key, _) in data.iter() {
        let entry = tallies.entry(key).or_insert_with(|| KeyTally {
            key: key.to_string(),
            follow_ups: 0,
            strikes: 0,
        });
        match bucket {
            CaseType::FollowUps => entry.follow_ups += 1,
            CaseType::Strikes => entry.strikes += 1,
        }
    }

    let mut values: Vec<KeyTally> = tallies.into_values().collect();
    values.sort_by(|a, b| b.total().cmp(&a.total()).then_with(|| a.key.cmp(&b.key)));
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Case;

    fn sample_data() -> CasesData {
        let mut data = CasesData::default();
        data.insert("avery", Case::new(CaseType::Strikes, "Monday", Severity::C));
        data.insert("avery", Case::new(CaseType::FollowUps, "2026-02-03", Severity::B));
        data.insert("jules", Case::new(CaseType::FollowUps, "Monday", Severity::C));
        data.insert("kiara", Case::new(CaseType::Strikes, "Saturday", Severity::B));
        data
    }

    #[test]
    fn bucket_summary_splits_severity() {
        let summaries = summarize_by_bucket(&sample_data());
        assert_eq!(
            summaries,
            vec![
                BucketSummary {
                    case_type: CaseType::FollowUps,
                    count: 2,
                    severity_b: 1,
                    severity_c: 1,
                },
                BucketSummary {
                    case_type: CaseType::Strikes,
                    count: 2,
                    severity_b: 1,
                    severity_c: 1,
                },
            ]
        );
    }

    #[test]
    fn day_tally_covers_all_weekdays_in_order() {
        let (tallies, unscheduled) = tally_by_day(&sample_data());

        let days: Vec<WeekDay> = tallies.iter().map(|tally| tally.day).collect();
        assert_eq!(days, WeekDay::ALL.to_vec());

        assert_eq!(tallies[0].follow_ups, 1);
        assert_eq!(tallies[0].strikes, 1);
        // 2026-02-03 is a Tuesday.
        assert_eq!(tallies[1].follow_ups, 1);
        assert_eq!(tallies[4].total(), 0);

        assert_eq!(unscheduled, vec![(CaseType::Strikes, "kiara".to_string())]);
    }

    #[test]
    fn keys_rank_by_total_then_name() {
        let ranked = rank_keys(&sample_data());
        let order: Vec<(&str, usize)> = ranked
            .iter()
            .map(|tally| (tally.key.as_str(), tally.total()))
            .collect();
        assert_eq!(order, vec![("avery", 2), ("jules", 1), ("kiara", 1)]);
        assert_eq!(ranked[0].follow_ups, 1);
        assert_eq!(ranked[0].strikes, 1);
    }

    #[test]
    fn empty_data_yields_zero_tallies() {
        let data = CasesData::default();
        let (tallies, unscheduled) = tally_by_day(&data);
        assert!(tallies.iter().all(|tally| tally.total() == 0));
        assert!(unscheduled.is_empty());
        assert!(rank_keys(&data).is_empty());
    }
}
