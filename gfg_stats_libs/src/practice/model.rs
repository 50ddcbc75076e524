//! Wire models of the documents served by GeeksforGeeks.
//!
//! Upstream is loose about types: the same counter can arrive as `12`, `12.0`, `"12"`, `""` or
//! `null` depending on the page. Integer fields therefore go through [`LenientInteger`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{serde_as, DeserializeAs};
use std::{cmp::Ordering, collections::BTreeMap};

/// Content of the `<script id="__NEXT_DATA__">` element of a profile page.
#[derive(Deserialize, Debug)]
pub struct NextData {
    pub props: Option<NextProps>,
}

#[derive(Deserialize, Debug)]
pub struct NextProps {
    #[serde(alias = "pageProps")]
    pub page_props: Option<PageProps>,
}

#[derive(Deserialize, Debug)]
pub struct PageProps {
    #[serde(alias = "userInfo")]
    pub user_info: Option<UserInfo>,
    #[serde(alias = "contestData")]
    pub contest_data: Option<ContestInfo>,
    #[serde(alias = "userSubmissionsInfo")]
    pub user_submissions_info: Option<SubmissionsInfo>,
}

#[serde_as]
#[derive(Deserialize, Debug, Default)]
pub struct UserInfo {
    pub name: Option<String>,
    pub profile_image_url: Option<String>,
    pub institute_name: Option<String>,
    #[serde_as(as = "LenientInteger")]
    #[serde(default)]
    pub institute_rank: Option<i64>,
    #[serde_as(as = "LenientInteger")]
    #[serde(default)]
    pub pod_solved_longest_streak: Option<i64>,
    #[serde_as(as = "LenientInteger")]
    #[serde(default)]
    pub score: Option<i64>,
    #[serde_as(as = "LenientInteger")]
    #[serde(default)]
    pub monthly_score: Option<i64>,
    #[serde_as(as = "LenientInteger")]
    #[serde(default)]
    pub total_problems_solved: Option<i64>,
}

/// Contest statistics. Embedded in the profile page as `contestData` and returned as-is by the
/// rating API.
#[serde_as]
#[derive(Deserialize, Debug, Default)]
pub struct ContestInfo {
    #[serde_as(as = "LenientInteger")]
    #[serde(default)]
    pub user_global_rank: Option<i64>,
    #[serde_as(as = "LenientInteger")]
    #[serde(default)]
    pub user_stars: Option<i64>,
    pub star_colour_codes: Option<Value>,
    pub user_contest_data: Option<UserContestData>,
}

#[serde_as]
#[derive(Deserialize, Debug, Default)]
pub struct UserContestData {
    #[serde_as(as = "LenientInteger")]
    #[serde(default)]
    pub current_rating: Option<i64>,
    #[serde_as(as = "LenientInteger")]
    #[serde(default)]
    pub no_of_participated_contest: Option<i64>,
    /// Kept raw here; only the contest endpoint validates the entries.
    pub contest_data: Option<Value>,
}

/// `userSubmissionsInfo`: difficulty label to solved problems. Users without any submission get
/// an empty JSON array instead of an object.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum SubmissionsInfo {
    ByDifficulty(BTreeMap<String, ProblemBucket>),
    Empty(Vec<Value>),
}

/// Solved problems of one difficulty, either keyed by problem id or as a plain list.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ProblemBucket {
    Keyed(BTreeMap<String, SolvedProblem>),
    Listed(Vec<SolvedProblem>),
}

impl ProblemBucket {
    /// Problems ordered by id. Keyed buckets sort numerically, listed ones keep upstream order.
    pub fn into_problems(self) -> Vec<SolvedProblem> {
        match self {
            ProblemBucket::Keyed(problems) => {
                let mut problems: Vec<(String, SolvedProblem)> = problems.into_iter().collect();
                problems.sort_by(|(a, _), (b, _)| compare_problem_ids(a, b));
                problems.into_iter().map(|(_, problem)| problem).collect()
            }
            ProblemBucket::Listed(problems) => problems,
        }
    }
}

/// Numeric ids first in numeric order, then any non-numeric ids in text order.
fn compare_problem_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[derive(Deserialize, Debug)]
pub struct SolvedProblem {
    pub pname: Option<String>,
    pub slug: Option<String>,
}

/// Response of the yearwise submissions API.
#[serde_as]
#[derive(Deserialize, Debug)]
pub struct SubmissionCalendar {
    #[serde_as(as = "LenientInteger")]
    #[serde(default)]
    pub count: Option<i64>,
    pub result: SubmissionDates,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum SubmissionDates {
    Dates(BTreeMap<String, Value>),
    Empty(Vec<Value>),
}

/// `serde_with` adapter reading an optional integer from a number, a numeric string, the empty
/// string or `null`.
pub struct LenientInteger;

impl<'de> DeserializeAs<'de, Option<i64>> for LenientInteger {
    fn deserialize_as<D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        coerce_integer(&value).map_err(serde::de::Error::custom)
    }
}

/// Floats are rounded to the nearest integer.
pub fn coerce_integer(value: &Value) -> Result<Option<i64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f.round() as i64))
            .map(Some)
            .ok_or_else(|| format!("{} is not representable as an integer", number)),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<i64>()
                .or_else(|_| text.parse::<f64>().map(|f| f.round() as i64))
                .map(Some)
                .map_err(|_| format!("`{}` is not a number", text))
        }
        other => Err(format!("expected an integer but got {}", other)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_integer() {
        assert_eq!(coerce_integer(&json!(42)), Ok(Some(42)));
        assert_eq!(coerce_integer(&json!("  120 ")), Ok(Some(120)));
        assert_eq!(coerce_integer(&json!(1500.6)), Ok(Some(1501)));
        assert_eq!(coerce_integer(&json!("1499.5")), Ok(Some(1500)));
        assert_eq!(coerce_integer(&json!("")), Ok(None));
        assert_eq!(coerce_integer(&Value::Null), Ok(None));
        assert!(coerce_integer(&json!("N/A")).is_err());
        assert!(coerce_integer(&json!([1])).is_err());
    }

    #[test]
    fn test_deserialize_user_info() {
        let raw = r#"
        {
            "name": "Valid User",
            "profile_image_url": "https://media.geeksforgeeks.org/img/avatar.png",
            "institute_name": "Example Institute of Technology",
            "institute_rank": "",
            "pod_solved_longest_streak": "07",
            "score": "1234",
            "monthly_score": 56,
            "total_problems_solved": 210.0,
            "is_verified": true
        }
        "#;
        let info: UserInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(info.name.as_deref(), Some("Valid User"));
        assert_eq!(info.institute_rank, None);
        assert_eq!(info.pod_solved_longest_streak, Some(7));
        assert_eq!(info.score, Some(1234));
        assert_eq!(info.monthly_score, Some(56));
        assert_eq!(info.total_problems_solved, Some(210));
    }

    #[test]
    fn test_deserialize_user_info_with_missing_fields() {
        let info: UserInfo = serde_json::from_str("{}").unwrap();
        assert_eq!(info.name, None);
        assert_eq!(info.score, None);
    }

    #[test]
    fn test_deserialize_problem_buckets() {
        let keyed: ProblemBucket = serde_json::from_value(json!({
            "702": {"pname": "Reverse a String", "slug": "reverse-a-string"},
            "701": {"pname": "Missing number", "slug": "missing-number"}
        }))
        .unwrap();
        let names: Vec<Option<String>> =
            keyed.into_problems().into_iter().map(|p| p.pname).collect();
        assert_eq!(
            names,
            vec![
                Some(String::from("Missing number")),
                Some(String::from("Reverse a String"))
            ]
        );

        let listed: ProblemBucket =
            serde_json::from_value(json!([{"pname": "Two Sum", "slug": "two-sum"}])).unwrap();
        assert_eq!(listed.into_problems().len(), 1);
    }

    #[test]
    fn test_keyed_problems_are_ordered_by_numeric_id() {
        let keyed: ProblemBucket = serde_json::from_value(json!({
            "700231": {"pname": "big-id", "slug": "big-id"},
            "99": {"pname": "ninety-nine", "slug": "ninety-nine"},
            "1000": {"pname": "thousand", "slug": "thousand"},
            "702": {"pname": "seven-o-two", "slug": "seven-o-two"},
            "draft": {"pname": "draft", "slug": "draft"}
        }))
        .unwrap();
        let slugs: Vec<String> = keyed
            .into_problems()
            .into_iter()
            .filter_map(|p| p.slug)
            .collect();
        assert_eq!(
            slugs,
            vec!["ninety-nine", "seven-o-two", "thousand", "big-id", "draft"]
        );
    }

    #[test]
    fn test_compare_problem_ids() {
        assert_eq!(compare_problem_ids("99", "700231"), Ordering::Less);
        assert_eq!(compare_problem_ids("1000", "702"), Ordering::Greater);
        assert_eq!(compare_problem_ids("12", "abc"), Ordering::Less);
        assert_eq!(compare_problem_ids("abc", "abd"), Ordering::Less);
    }

    #[test]
    fn test_deserialize_empty_submissions_info() {
        let info: SubmissionsInfo = serde_json::from_value(json!([])).unwrap();
        assert!(matches!(info, SubmissionsInfo::Empty(_)));
    }
}
