use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Solved problems grouped by lower-cased difficulty label.
pub type SolvedStats = BTreeMap<String, SolvedTier>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProfileResponse {
    pub info: ProfileInfo,
    #[serde(rename = "solvedStats")]
    pub solved_stats: SolvedStats,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
    pub user_name: String,
    pub full_name: String,
    pub profile_picture: String,
    pub institute: String,
    pub institute_rank: Option<i64>,
    pub longest_streak: i64,
    pub coding_score: i64,
    pub monthly_score: i64,
    pub current_rating: i64,
    pub user_global_rank: i64,
    pub level: i64,
    pub total_problems_solved: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct SolvedTier {
    pub count: usize,
    pub questions: Vec<SolvedQuestion>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SolvedQuestion {
    pub question: String,
    #[serde(rename = "questionUrl")]
    pub question_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CalendarResponse {
    #[serde(rename = "Total Submissions")]
    pub total_submissions: i64,
    #[serde(rename = "Submission Dates")]
    pub submission_dates: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ContestResponse {
    #[serde(rename = "Contest Data")]
    pub contest_data: ContestSummary,
    #[serde(rename = "Contest Details")]
    pub contest_details: Vec<ContestDetail>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ContestSummary {
    #[serde(rename = "Level")]
    pub level: i64,
    #[serde(rename = "Rank")]
    pub rank: i64,
    #[serde(rename = "Global Rank")]
    pub global_rank: i64,
    #[serde(rename = "Total Contests")]
    pub total_contests: i64,
}

/// One entry of a user's contest history, passed through with upstream's keys.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct ContestDetail(pub Map<String, Value>);

impl ContestDetail {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl ToString, message: impl ToString, status_code: u16) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status_code,
        }
    }
}
