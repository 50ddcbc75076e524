use crate::api::{
    CalendarResponse, ContestDetail, ContestResponse, ContestSummary, ProfileInfo,
    ProfileResponse, SolvedQuestion, SolvedStats,
};
use crate::practice::core::FetchError;
use crate::practice::model::*;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

type Result<T> = std::result::Result<T, FetchError>;

pub const PROBLEM_URL_BASE: &str = "https://practice.geeksforgeeks.org/problems";

static SCRAPER: Lazy<ProfilePageScraper> = Lazy::new(ProfilePageScraper::new);

pub struct ProfilePageScraper {
    next_data: Selector,
}

impl ProfilePageScraper {
    pub fn new() -> Self {
        let next_data =
            Selector::parse(r#"script#__NEXT_DATA__[type="application/json"]"#).unwrap();

        Self { next_data }
    }

    /// Returns the raw JSON text embedded by Next.js, if the page has any.
    pub fn extract_next_data(&self, html: &str) -> Option<String> {
        let html = Html::parse_document(html);
        html.select(&self.next_data)
            .next()
            .map(|script| script.text().collect::<String>())
    }
}

impl Default for ProfilePageScraper {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the profile response from the HTML of a user's practice page.
pub fn parse_profile(username: &str, html: &str) -> Result<ProfileResponse> {
    let raw = SCRAPER.extract_next_data(html).ok_or_else(|| {
        tracing::warn!("no embedded page data in the profile page of {}", username);
        FetchError::NotFound(username.to_string())
    })?;

    let data: NextData = serde_json::from_str(&raw)?;
    let page_props = data
        .props
        .and_then(|props| props.page_props)
        .ok_or_else(|| FetchError::Parse(String::from("`props.pageProps` is missing")))?;

    let user_info = page_props.user_info.ok_or_else(|| {
        tracing::warn!("no user info in the profile page of {}", username);
        FetchError::NotFound(username.to_string())
    })?;
    let contest = page_props.contest_data.unwrap_or_default();
    let user_contest = contest.user_contest_data.unwrap_or_default();

    let info = ProfileInfo {
        user_name: username.to_string(),
        full_name: user_info.name.unwrap_or_default(),
        profile_picture: user_info.profile_image_url.unwrap_or_default(),
        institute: user_info.institute_name.unwrap_or_default(),
        institute_rank: user_info.institute_rank,
        longest_streak: user_info.pod_solved_longest_streak.unwrap_or(0),
        coding_score: user_info.score.unwrap_or(0),
        monthly_score: user_info.monthly_score.unwrap_or(0),
        current_rating: user_contest.current_rating.unwrap_or(0),
        user_global_rank: contest.user_global_rank.unwrap_or(0),
        level: contest.user_stars.unwrap_or(0),
        total_problems_solved: user_info.total_problems_solved.unwrap_or(0),
    };

    Ok(ProfileResponse {
        info,
        solved_stats: bucket_solved_problems(page_props.user_submissions_info),
    })
}

fn bucket_solved_problems(submissions: Option<SubmissionsInfo>) -> SolvedStats {
    let mut stats = SolvedStats::new();

    let buckets = match submissions {
        Some(SubmissionsInfo::ByDifficulty(buckets)) => buckets,
        _ => return stats,
    };

    for (difficulty, bucket) in buckets {
        let tier = stats.entry(difficulty.to_lowercase()).or_default();
        tier.questions
            .extend(bucket.into_problems().into_iter().map(|problem| SolvedQuestion {
                question: problem.pname.unwrap_or_default(),
                question_url: format!(
                    "{}/{}",
                    PROBLEM_URL_BASE,
                    problem.slug.unwrap_or_default()
                ),
            }));
        tier.count = tier.questions.len();
    }

    stats
}

/// Builds the calendar response from the body of the yearwise submissions API.
///
/// The total is recomputed from the per-date counts.
pub fn parse_calendar(body: &str) -> Result<CalendarResponse> {
    let raw: Map<String, Value> = serde_json::from_str(body)?;
    require_fields(&raw, &["count", "result"])?;
    let calendar: SubmissionCalendar = serde_json::from_value(Value::Object(raw))?;

    let mut submission_dates: BTreeMap<String, i64> = BTreeMap::new();
    if let SubmissionDates::Dates(dates) = calendar.result {
        for (date, count) in dates {
            if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
                return Err(FetchError::Parse(format!(
                    "`{}` is not a calendar date",
                    date
                )));
            }
            let count = coerce_integer(&count).map_err(FetchError::Parse)?.unwrap_or(0);
            if count < 0 {
                return Err(FetchError::Parse(format!(
                    "negative submission count {} at {}",
                    count, date
                )));
            }
            submission_dates.insert(date, count);
        }
    }

    let total_submissions: i64 = submission_dates.values().sum();
    if calendar.count != Some(total_submissions) {
        tracing::warn!(
            "upstream submission count {:?} differs from the sum of daily counts {}",
            calendar.count,
            total_submissions
        );
    }

    Ok(CalendarResponse {
        total_submissions,
        submission_dates,
    })
}

/// Builds the contest response from the body of the rating API.
pub fn parse_contest(body: &str) -> Result<ContestResponse> {
    let raw: Map<String, Value> = serde_json::from_str(body)?;
    require_fields(
        &raw,
        &["user_global_rank", "star_colour_codes", "user_contest_data"],
    )?;
    let info: ContestInfo = serde_json::from_value(Value::Object(raw))?;

    let user_contest = info
        .user_contest_data
        .ok_or_else(|| FetchError::Parse(String::from("`user_contest_data` is null")))?;
    let contest_details: Vec<ContestDetail> = match user_contest.contest_data {
        None | Some(Value::Null) => Vec::new(),
        Some(details) => serde_json::from_value(details)?,
    };

    Ok(ContestResponse {
        contest_data: ContestSummary {
            level: info.user_stars.unwrap_or(0),
            rank: user_contest.current_rating.unwrap_or(0),
            global_rank: info.user_global_rank.unwrap_or(0),
            total_contests: user_contest.no_of_participated_contest.unwrap_or(0),
        },
        contest_details,
    })
}

fn require_fields(object: &Map<String, Value>, fields: &[&str]) -> Result<()> {
    match fields.iter().find(|field| !object.contains_key(**field)) {
        Some(field) => Err(FetchError::Parse(format!(
            "unexpected response format: `{}` is missing",
            field
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    const PROFILE_PAGE: &str = include_str!("../../testdata/profile.html");
    const CALENDAR_BODY: &str = include_str!("../../testdata/calendar.json");
    const CONTEST_BODY: &str = include_str!("../../testdata/contest.json");

    fn next_data_page(next_data: &str) -> String {
        let head = r#"<html><body><script id="__NEXT_DATA__" type="application/json">"#;
        format!("{}{}</script></body></html>", head, next_data)
    }

    #[test]
    fn test_extract_next_data() {
        let scraper = ProfilePageScraper::new();
        let raw = scraper.extract_next_data(PROFILE_PAGE).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert!(value["props"]["pageProps"]["userInfo"].is_object());

        assert_eq!(scraper.extract_next_data("<html><body></body></html>"), None);
    }

    #[test]
    fn test_parse_profile() {
        let profile = parse_profile("validuser", PROFILE_PAGE).unwrap();

        let expected = ProfileInfo {
            user_name: String::from("validuser"),
            full_name: String::from("Valid User"),
            profile_picture: String::from(
                "https://media.geeksforgeeks.org/auth/avatar.png",
            ),
            institute: String::from("Example Institute of Technology"),
            institute_rank: Some(42),
            longest_streak: 17,
            coding_score: 1234,
            monthly_score: 56,
            current_rating: 1650,
            user_global_rank: 9876,
            level: 3,
            total_problems_solved: 5,
        };
        assert_eq!(profile.info, expected);

        let tiers: Vec<&String> = profile.solved_stats.keys().collect();
        assert_eq!(tiers, vec!["basic", "easy", "hard", "medium"]);

        let easy = &profile.solved_stats["easy"];
        assert_eq!(easy.count, 2);
        assert_eq!(
            easy.questions[0],
            SolvedQuestion {
                question: String::from("Missing number in array"),
                question_url: String::from(
                    "https://practice.geeksforgeeks.org/problems/missing-number-in-array1416"
                ),
            }
        );
        assert_eq!(profile.solved_stats["hard"].count, 0);
        assert!(profile.solved_stats["hard"].questions.is_empty());

        let total: usize = profile.solved_stats.values().map(|tier| tier.count).sum();
        assert_eq!(total as i64, profile.info.total_problems_solved);
    }

    #[test]
    fn test_parse_profile_is_deterministic() {
        let first = parse_profile("validuser", PROFILE_PAGE).unwrap();
        let second = parse_profile("validuser", PROFILE_PAGE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_profile_without_next_data() {
        let result = parse_profile("ghost", "<html><head><title>404</title></head></html>");
        assert!(matches!(result, Err(FetchError::NotFound(name)) if name == "ghost"));
    }

    #[test]
    fn test_parse_profile_without_user_info() {
        let html = next_data_page(r#"{"props":{"pageProps":{}}}"#);
        let result = parse_profile("ghost", &html);
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }

    #[test]
    fn test_parse_profile_without_page_props() {
        let html = next_data_page(r#"{"props":{}}"#);
        let result = parse_profile("validuser", &html);
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[test]
    fn test_parse_profile_with_broken_json() {
        let html = next_data_page(r#"{"props":"#);
        let result = parse_profile("validuser", &html);
        assert!(matches!(result, Err(FetchError::Deserialize(_))));
    }

    #[test]
    fn test_parse_profile_with_minimal_user_info() {
        let next_data = json!({
            "props": {
                "pageProps": {"userInfo": {}, "contestData": null, "userSubmissionsInfo": []}
            }
        });
        let html = next_data_page(&next_data.to_string());
        let profile = parse_profile("newbie", &html).unwrap();
        assert_eq!(profile.info.user_name, "newbie");
        assert_eq!(profile.info.full_name, "");
        assert_eq!(profile.info.coding_score, 0);
        assert_eq!(profile.info.current_rating, 0);
        assert!(profile.solved_stats.is_empty());
    }

    #[test]
    fn test_bucket_merges_labels_case_insensitively() {
        let submissions: SubmissionsInfo = serde_json::from_value(json!({
            "Easy": {"1": {"pname": "A", "slug": "a"}},
            "easy": [{"pname": "B", "slug": "b"}]
        }))
        .unwrap();
        let stats = bucket_solved_problems(Some(submissions));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats["easy"].count, 2);
    }

    #[test]
    fn test_parse_calendar() {
        let calendar = parse_calendar(CALENDAR_BODY).unwrap();

        assert_eq!(calendar.submission_dates.len(), 4);
        assert_eq!(calendar.submission_dates["2023-01-01"], 3);
        assert_eq!(calendar.submission_dates["2023-02-14"], 2);
        assert_eq!(
            calendar.total_submissions,
            calendar.submission_dates.values().sum::<i64>()
        );
        assert_eq!(calendar.total_submissions, 11);
    }

    #[test]
    fn test_parse_calendar_total_follows_daily_counts() {
        let calendar =
            parse_calendar(r#"{"count": 100, "result": {"2023-05-01": 1, "2023-05-02": "4"}}"#)
                .unwrap();
        assert_eq!(calendar.total_submissions, 5);
    }

    #[test]
    fn test_parse_empty_calendar() {
        let calendar = parse_calendar(r#"{"count": 0, "result": []}"#).unwrap();
        assert_eq!(calendar.total_submissions, 0);
        assert!(calendar.submission_dates.is_empty());
    }

    #[test]
    fn test_parse_calendar_with_missing_fields() {
        assert!(matches!(
            parse_calendar(r#"{"result": {}}"#),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            parse_calendar(r#"{"count": 0}"#),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            parse_calendar(r#"{"count": 1, "result": {"yesterday": 1}}"#),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            parse_calendar("not json"),
            Err(FetchError::Deserialize(_))
        ));
    }

    #[test]
    fn test_parse_contest() {
        let contest = parse_contest(CONTEST_BODY).unwrap();

        assert_eq!(
            contest.contest_data,
            ContestSummary {
                level: 3,
                rank: 1650,
                global_rank: 9876,
                total_contests: 2,
            }
        );
        assert_eq!(contest.contest_details.len(), 2);
        assert_eq!(
            contest.contest_details[0].get("contest_name"),
            Some(&json!("GFG Weekly Coding Contest - 101"))
        );
        assert_eq!(contest.contest_details[1].get("rank"), Some(&json!(801)));
    }

    #[test]
    fn test_parse_contest_with_missing_fields() {
        let result = parse_contest(r#"{"user_stars": 1, "user_contest_data": {}}"#);
        assert!(matches!(result, Err(FetchError::Parse(_))));

        let result = parse_contest(
            r#"{"user_global_rank": 1, "star_colour_codes": {}, "user_contest_data": null}"#,
        );
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[test]
    fn test_parse_contest_without_history() {
        let body = json!({
            "user_global_rank": "",
            "user_stars": null,
            "star_colour_codes": {},
            "user_contest_data": {"current_rating": null, "no_of_participated_contest": 0}
        });
        let contest = parse_contest(&body.to_string()).unwrap();
        assert_eq!(contest.contest_data.global_rank, 0);
        assert!(contest.contest_details.is_empty());
    }

    #[test]
    fn test_parse_contest_rejects_non_object_details() {
        let body = json!({
            "user_global_rank": 1,
            "star_colour_codes": {},
            "user_contest_data": {"contest_data": [1, 2]}
        });
        let result = parse_contest(&body.to_string());
        assert!(matches!(result, Err(FetchError::Deserialize(_))));
    }
}
