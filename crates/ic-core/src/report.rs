//! Report projection: summary, sorted event list and creator matrix.

use std::collections::HashSet;
use std::fmt::Write;

use serde::Serialize;

use crate::aggregate::{Aggregation, ClassifiedEvent};
use crate::category::CategoryLabel;
use crate::range::DateRange;

/// One summary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub label: CategoryLabel,
    pub count: usize,
}

/// One matrix row: a label and a count per header creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub label: CategoryLabel,
    pub counts: Vec<usize>,
}

/// Creator × category counts.
///
/// `rows[i].counts[j]` is the tally of `creators[j]` for `rows[i].label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatorMatrix {
    pub creators: Vec<String>,
    pub rows: Vec<MatrixRow>,
}

impl CreatorMatrix {
    /// Count for a label and creator, `None` if the creator is not a column.
    pub fn get(&self, label: CategoryLabel, creator: &str) -> Option<usize> {
        let col = self.creators.iter().position(|c| c == creator)?;
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.counts[col])
    }
}

/// Everything written out for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub range: DateRange,
    pub total: usize,
    pub summary: Vec<SummaryRow>,
    pub events: Vec<ClassifiedEvent>,
    pub matrix: CreatorMatrix,
}

/// Builds the report from an aggregation without modifying it.
///
/// `primary_creators` are pinned to the front of the matrix header, in the
/// given order, when they appear in the data.
pub fn build_report(
    range: DateRange,
    aggregation: &Aggregation,
    primary_creators: &[String],
) -> Report {
    let summary = CategoryLabel::ALL
        .into_iter()
        .map(|label| SummaryRow {
            label,
            count: aggregation.count(label),
        })
        .collect();

    Report {
        range,
        total: aggregation.total(),
        summary,
        events: sorted_events(&aggregation.classified),
        matrix: creator_matrix(aggregation, primary_creators),
    }
}

/// Sorts by label text then title, in plain code-point order.
fn sorted_events(classified: &[ClassifiedEvent]) -> Vec<ClassifiedEvent> {
    let mut events = classified.to_vec();
    events.sort_by(|a, b| {
        a.label
            .as_str()
            .cmp(b.label.as_str())
            .then_with(|| a.title.cmp(&b.title))
    });
    events
}

/// Primary creators present in the data, then everyone else alphabetically.
pub fn creators_for_header(aggregation: &Aggregation, primary_creators: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut header: Vec<String> = primary_creators
        .iter()
        .filter(|c| aggregation.creator_counts.contains_key(c.as_str()))
        .filter(|c| seen.insert(c.as_str()))
        .cloned()
        .collect();

    let mut rest: Vec<&String> = aggregation
        .creator_counts
        .keys()
        .filter(|c| !seen.contains(c.as_str()))
        .collect();
    rest.sort();
    header.extend(rest.into_iter().cloned());
    header
}

fn creator_matrix(aggregation: &Aggregation, primary_creators: &[String]) -> CreatorMatrix {
    let creators = creators_for_header(aggregation, primary_creators);
    let rows = CategoryLabel::ALL
        .into_iter()
        .map(|label| MatrixRow {
            label,
            counts: creators
                .iter()
                .map(|c| aggregation.creator_count(c, label))
                .collect(),
        })
        .collect();
    CreatorMatrix { creators, rows }
}

impl Report {
    /// Renders the report as plain text.
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        writeln!(
            output,
            "INTERVIEW COUNTS: {} to {}",
            self.range.start.to_rfc3339(),
            self.range.end.to_rfc3339()
        )
        .unwrap();
        writeln!(output).unwrap();

        writeln!(output, "SUMMARY").unwrap();
        writeln!(output, "───────").unwrap();
        for row in &self.summary {
            writeln!(output, "{}\t{}", row.label, row.count).unwrap();
        }
        writeln!(output, "Total\t{}", self.total).unwrap();

        writeln!(output).unwrap();
        writeln!(output, "EVENTS").unwrap();
        writeln!(output, "──────").unwrap();
        if self.events.is_empty() {
            writeln!(output, "(no events in range)").unwrap();
        }
        for event in &self.events {
            writeln!(output, "{}\t{}", event.title, event.label).unwrap();
        }

        writeln!(output).unwrap();
        writeln!(output, "BY CREATOR").unwrap();
        writeln!(output, "──────────").unwrap();
        let mut header = String::from("Category");
        for creator in &self.matrix.creators {
            write!(header, "\t{creator}").unwrap();
        }
        writeln!(output, "{header}").unwrap();
        for row in &self.matrix.rows {
            let mut line = row.label.to_string();
            for count in &row.counts {
                write!(line, "\t{count}").unwrap();
            }
            writeln!(output, "{line}").unwrap();
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::aggregate::fixtures::event;
    use crate::event::UNKNOWN_CREATOR;
    use chrono::{TimeZone, Utc};
    use insta::assert_snapshot;

    fn range() -> DateRange {
        DateRange {
            start: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn scenario_report() -> Report {
        let x = "x@example.com";
        let events = vec![
            event("Casual Interview w/ A", &[x]),
            event("1st Interview", &[x]),
            event("祝日のお知らせ", &[x]),
            event("Random Sync", &[x]),
        ];
        build_report(range(), &aggregate(&events), &[])
    }

    #[test]
    fn test_summary_has_every_label_in_fixed_order() {
        let report = scenario_report();
        let labels: Vec<_> = report.summary.iter().map(|r| r.label).collect();
        assert_eq!(labels, CategoryLabel::ALL.to_vec());

        let nonzero: Vec<_> = report
            .summary
            .iter()
            .filter(|r| r.count > 0)
            .map(|r| (r.label, r.count))
            .collect();
        assert_eq!(
            nonzero,
            vec![
                (CategoryLabel::CasualInterview, 1),
                (CategoryLabel::FirstInterview, 1),
                (CategoryLabel::Holiday, 1),
                (CategoryLabel::Other, 1),
            ]
        );
    }

    #[test]
    fn test_events_sort_by_label_text_then_title() {
        let report = scenario_report();
        let pairs: Vec<_> = report
            .events
            .iter()
            .map(|e| (e.title.as_str(), e.label.as_str()))
            .collect();
        // "(" < "1" < "カ" in code-point order.
        assert_eq!(
            pairs,
            vec![
                ("Random Sync", "(Other)"),
                ("祝日のお知らせ", "(祝日)"),
                ("1st Interview", "1次面接"),
                ("Casual Interview w/ A", "カジュアル面談"),
            ]
        );
    }

    #[test]
    fn test_ties_on_label_fall_back_to_title() {
        let events = vec![
            event("b sync", &[]),
            event("B sync", &[]),
            event("a sync", &[]),
        ];
        let report = build_report(range(), &aggregate(&events), &[]);
        let titles: Vec<_> = report.events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["B sync", "a sync", "b sync"]);
        assert_eq!(report.events.len(), events.len());
    }

    #[test]
    fn test_matrix_for_single_creator_scenario() {
        let report = scenario_report();
        let x = "x@example.com";
        assert_eq!(report.matrix.creators, strings(&[x]));
        assert_eq!(report.matrix.rows.len(), CategoryLabel::ALL.len());
        for row in &report.matrix.rows {
            let expected = usize::from(matches!(
                row.label,
                CategoryLabel::CasualInterview
                    | CategoryLabel::FirstInterview
                    | CategoryLabel::Holiday
                    | CategoryLabel::Other
            ));
            assert_eq!(row.counts, vec![expected], "row {}", row.label);
        }
    }

    #[test]
    fn test_primary_creators_come_first_then_alphabetical() {
        let events = vec![
            event("1st", &["zed@example.com"]),
            event("1st", &["amy@example.com"]),
            event("1st", &["lead@example.com"]),
            event("1st", &["boss@example.com"]),
        ];
        let primary = strings(&[
            "lead@example.com",
            "absent@example.com",
            "boss@example.com",
            "lead@example.com",
        ]);
        let report = build_report(range(), &aggregate(&events), &primary);
        assert_eq!(
            report.matrix.creators,
            strings(&[
                "lead@example.com",
                "boss@example.com",
                "amy@example.com",
                "zed@example.com",
            ])
        );
    }

    #[test]
    fn test_matrix_columns_sum_to_label_counts() {
        let events = vec![
            event("2次面接", &["a@example.com"]),
            event("2次面接", &["b@example.com"]),
            event("最終面接", &["a@example.com"]),
            event("Random", &[]),
        ];
        let agg = aggregate(&events);
        let report = build_report(range(), &agg, &[]);

        for row in &report.matrix.rows {
            let sum: usize = row.counts.iter().sum();
            assert_eq!(sum, agg.count(row.label), "row {}", row.label);
        }
        assert_eq!(
            report.matrix.get(CategoryLabel::Other, UNKNOWN_CREATOR),
            Some(1)
        );
        assert_eq!(
            report.matrix.get(CategoryLabel::Other, "a@example.com"),
            Some(0)
        );
        assert_eq!(report.matrix.get(CategoryLabel::Other, "nobody"), None);
    }

    #[test]
    fn test_two_creator_event_increments_both_columns_once() {
        let events = vec![event("2次面接", &["a@example.com", "b@example.com"])];
        let report = build_report(range(), &aggregate(&events), &[]);

        let second = &report.summary[CategoryLabel::SecondInterview.index()];
        assert_eq!(second.count, 1);
        assert_eq!(
            report.matrix.get(CategoryLabel::SecondInterview, "a@example.com"),
            Some(1)
        );
        assert_eq!(
            report.matrix.get(CategoryLabel::SecondInterview, "b@example.com"),
            Some(1)
        );
    }

    #[test]
    fn test_building_twice_is_identical() {
        let events = vec![
            event("Casual", &["b@example.com", "a@example.com"]),
            event("Random", &["c@example.com"]),
        ];
        let primary = strings(&["c@example.com"]);
        let first = build_report(range(), &aggregate(&events), &primary);
        let second = build_report(range(), &aggregate(&events), &primary);
        assert_eq!(first, second);
    }

    #[test]
    fn test_text_rendering() {
        let events = vec![
            event("Casual Interview w/ A", &["x@example.com"]),
            event("Random Sync", &[]),
        ];
        let report = build_report(range(), &aggregate(&events), &[]);
        assert_snapshot!(report.to_text(), @r"
        INTERVIEW COUNTS: 2025-01-01T00:00:00+00:00 to 2025-02-01T00:00:00+00:00

        SUMMARY
        ───────
        カジュアル面談	1
        1次面接	0
        2次面接	0
        人事面談	0
        最終面接	0
        その他面接	0
        オファー面談	0
        その他面談・会食	0
        (対応ステータス/リマインド系)	0
        (祝日)	0
        (Other)	1
        Total	2

        EVENTS
        ──────
        Random Sync	(Other)
        Casual Interview w/ A	カジュアル面談

        BY CREATOR
        ──────────
        Category	(Unknown)	x@example.com
        カジュアル面談	0	1
        1次面接	0	0
        2次面接	0	0
        人事面談	0	0
        最終面接	0	0
        その他面接	0	0
        オファー面談	0	0
        その他面談・会食	0	0
        (対応ステータス/リマインド系)	0	0
        (祝日)	0	0
        (Other)	1	0
        ");
    }
}
