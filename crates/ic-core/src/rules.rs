//! Ordered title classification rules.
//!
//! Rules are evaluated top to bottom and the first pattern that matches
//! anywhere in the title decides the category. A title that matches
//! several rules belongs to the earliest one, so the table order is part
//! of the classification contract. The pattern literals are the business
//! taxonomy and are kept verbatim.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::category::CategoryLabel;

/// A single `(label, pattern)` rule.
#[derive(Debug)]
pub struct ClassificationRule {
    pub label: CategoryLabel,
    pub pattern: Regex,
}

/// Raw rule table in evaluation order.
const RULE_SOURCES: [(CategoryLabel, &str); 10] = [
    (
        CategoryLabel::CasualInterview,
        "Casual Interview|カジュアル|casual",
    ),
    (
        CategoryLabel::FirstInterview,
        "First Interview|1st interview|1st|1次面接|１次面接|一次面接",
    ),
    (
        CategoryLabel::SecondInterview,
        "Second Interview|2nd interview|2nd|2次面接|２次面接|二次面接|2次|二次|2st",
    ),
    (CategoryLabel::HrMeeting, "HR Mee|人事面談|人事面接"),
    (CategoryLabel::FinalInterview, "Final Interview|最終面接"),
    (
        CategoryLabel::OtherInterview,
        "追加|技術面接|カルチャーマッチ|3rd Interview|3次|三次",
    ),
    (
        CategoryLabel::OfferMeeting,
        "Offer Meeting|オファー面談|オフィスツアー|顔合わせ|座談会|期待値|Office Tour",
    ),
    (
        CategoryLabel::OtherMeeting,
        "会食|派遣面談|入社前面談|採用ランチ|室長面接|フォロー面談|Meeting with|職場面接|再面談|Introductory|オファー前|Online Meeting|Recruitment Lunch",
    ),
    (
        CategoryLabel::StatusMarker,
        "対応済|対応中|辞退|リマインド済|格納済|対応不要|ASHIATO|技術課題|TOEIC|通訳|総会|Backcheck|Work block|System Design Interview",
    ),
    (CategoryLabel::Holiday, "の日|祝日"),
];

/// Compiled rules, built once per process.
static RULES: LazyLock<Vec<ClassificationRule>> = LazyLock::new(|| {
    RULE_SOURCES
        .iter()
        .map(|&(label, source)| ClassificationRule {
            label,
            pattern: RegexBuilder::new(source)
                .case_insensitive(true)
                .build()
                .unwrap(),
        })
        .collect()
});

/// Returns the classification rules in evaluation order.
pub fn rules() -> &'static [ClassificationRule] {
    &RULES
}

/// Classifies an event title.
///
/// A missing title is treated as empty, which only ever yields
/// [`CategoryLabel::Other`].
pub fn classify(title: Option<&str>) -> CategoryLabel {
    let title = title.unwrap_or_default();
    rules()
        .iter()
        .find(|rule| rule.pattern.is_match(title))
        .map_or(CategoryLabel::Other, |rule| rule.label)
}

/// Returns the label of every rule whose pattern matches `title`, in rule order.
///
/// The first entry (if any) is what [`classify`] picks.
pub fn matching_labels(title: &str) -> Vec<CategoryLabel> {
    rules()
        .iter()
        .filter(|rule| rule.pattern.is_match(title))
        .map(|rule| rule.label)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(title: &str) -> CategoryLabel {
        classify(Some(title))
    }

    #[test]
    fn test_rule_table_covers_every_named_label_once() {
        let labels: Vec<_> = rules().iter().map(|r| r.label).collect();
        let expected: Vec<_> = CategoryLabel::ALL
            .into_iter()
            .filter(|l| *l != CategoryLabel::Other)
            .collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_matches_each_category() {
        assert_eq!(label("Casual Interview w/ A"), CategoryLabel::CasualInterview);
        assert_eq!(label("1次面接 山田様"), CategoryLabel::FirstInterview);
        assert_eq!(label("一次面接"), CategoryLabel::FirstInterview);
        assert_eq!(label("２次面接"), CategoryLabel::SecondInterview);
        assert_eq!(label("HR Meeting"), CategoryLabel::HrMeeting);
        assert_eq!(label("最終面接"), CategoryLabel::FinalInterview);
        assert_eq!(label("技術面接"), CategoryLabel::OtherInterview);
        assert_eq!(label("Office Tour"), CategoryLabel::OfferMeeting);
        assert_eq!(label("Recruitment Lunch"), CategoryLabel::OtherMeeting);
        assert_eq!(label("辞退連絡"), CategoryLabel::StatusMarker);
        assert_eq!(label("祝日のお知らせ"), CategoryLabel::Holiday);
        assert_eq!(label("海の日"), CategoryLabel::Holiday);
    }

    #[test]
    fn test_matching_is_case_insensitive_and_unanchored() {
        assert_eq!(label("re: CASUAL chat"), CategoryLabel::CasualInterview);
        assert_eq!(label("xx final interview xx"), CategoryLabel::FinalInterview);
        assert_eq!(label("backcheck call"), CategoryLabel::StatusMarker);
    }

    #[test]
    fn test_earliest_rule_wins_on_overlap() {
        // Matches casual and 1st; casual comes first.
        let title = "Casual 1st Interview";
        assert_eq!(
            matching_labels(title),
            vec![CategoryLabel::CasualInterview, CategoryLabel::FirstInterview]
        );
        assert_eq!(label(title), CategoryLabel::CasualInterview);

        // "System Design Interview" is a status marker, but "2nd" wins first.
        assert_eq!(
            label("2nd System Design Interview"),
            CategoryLabel::SecondInterview
        );

        // Holiday names with "の日" lose to any earlier rule.
        assert_eq!(label("最終面接の日"), CategoryLabel::FinalInterview);
    }

    #[test]
    fn test_unmatched_and_missing_titles_are_other() {
        assert_eq!(label("Random Sync"), CategoryLabel::Other);
        assert_eq!(label(""), CategoryLabel::Other);
        assert_eq!(classify(None), CategoryLabel::Other);
        assert!(matching_labels("Random Sync").is_empty());
    }

    #[test]
    fn test_matching_labels_follow_rule_order() {
        let title = "2nd interview 辞退 祝日";
        assert_eq!(
            matching_labels(title),
            vec![
                CategoryLabel::SecondInterview,
                CategoryLabel::StatusMarker,
                CategoryLabel::Holiday,
            ]
        );
    }
}
