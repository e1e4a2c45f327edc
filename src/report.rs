use std::fmt::Write;

use crate::models::CasesData;
use crate::tally;

pub fn build_report(label: Option<&str>, data: &CasesData) -> String {
    let summaries = tally::summarize_by_bucket(data);
    let (days, unscheduled) = tally::tally_by_day(data);
    let ranked = tally::rank_keys(data);

    let mut output = String::new();
    let source_label = label.unwrap_or("all cases");

    let _ = writeln!(output, "# Weekly Case Report");
    let _ = writeln!(output, "Generated for {} ({} cases)", source_label, data.len());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Bucket Mix");

    for summary in summaries.iter() {
        let _ = writeln!(
            output,
            "- {}: {} cases (B: {}, C: {})",
            summary.case_type, summary.count, summary.severity_b, summary.severity_c
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Cases by Weekday");
    let _ = writeln!(output, "| Day | Follow-ups | Strikes | Total |");
    let _ = writeln!(output, "| --- | ---: | ---: | ---: |");
    for tally in days.iter() {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            tally.day,
            tally.follow_ups,
            tally.strikes,
            tally.total()
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Most Cases");

    if ranked.is_empty() {
        let _ = writeln!(output, "No cases recorded.");
    } else {
        for tally in ranked.iter().take(10) {
            let _ = writeln!(
                output,
                "- {}: {} follow-ups, {} strikes",
                tally.key, tally.follow_ups, tally.strikes
            );
        }
    }

    if !unscheduled.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Unscheduled Cases");
        for (bucket, key) in unscheduled.iter() {
            let day = data
                .bucket(*bucket)
                .get(key)
                .map(|case| case.day.as_str())
                .unwrap_or_default();
            let _ = writeln!(output, "- {key} ({bucket}) on '{day}'");
        }
    }

    output
}
