use crate::api::{CalendarResponse, ContestResponse, ProfileResponse};
use crate::practice::parser;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{
    header::{ACCEPT, ACCEPT_LANGUAGE},
    Client, Response, StatusCode, Url,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

type Result<T> = std::result::Result<T, FetchError>;

pub const DEFAULT_PROFILE_HOST: &str = "https://auth.geeksforgeeks.org";
pub const DEFAULT_PRACTICE_API_HOST: &str = "https://practiceapi.geeksforgeeks.org";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const PAGE_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const PROFILE_TIMEOUT: Duration = Duration::from_secs(30);
const API_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("profile `{0}` not found")]
    NotFound(String),
    #[error("failed to request to upstream")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned unexpected status {0}")]
    UnexpectedStatus(StatusCode),
    #[error("failed to deserialize JSON data")]
    Deserialize(#[from] serde_json::Error),
    #[error("invalid upstream url given")]
    InvalidUrl(#[from] url::ParseError),
    #[error("{0}")]
    Parse(String),
}

/// Source of a user's practice statistics.
#[async_trait]
pub trait PracticeApi {
    async fn profile(&self, username: &str) -> Result<ProfileResponse>;
    async fn calendar(&self, username: &str, year: i32) -> Result<CalendarResponse>;
    async fn contest(&self, username: &str, year: i32) -> Result<ContestResponse>;
}

/// [`PracticeApi`] backed by the live GeeksforGeeks site.
pub struct StandalonePracticeApi {
    profile_host: Url,
    submissions_url: Url,
    practice_api_host: Url,
    client: Client,
}

impl StandalonePracticeApi {
    pub fn new(profile_host: &str, practice_api_host: &str) -> Result<Self> {
        let profile_host = base_url(profile_host)?;
        let practice_api_host = base_url(practice_api_host)?;
        let submissions_url = practice_api_host.join("api/v1/user/problems/submissions/")?;

        let client = Client::builder().gzip(true).user_agent(USER_AGENT).build()?;

        Ok(StandalonePracticeApi {
            profile_host,
            submissions_url,
            practice_api_host,
            client,
        })
    }

    fn profile_url(&self, username: &str) -> Url {
        let mut url = self.profile_host.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(&["user", username, "practice", ""]);
        }
        url
    }

    /// The rating API identifies users by the base64 encoding of their handle.
    fn contest_url(&self, username: &str) -> Result<Url> {
        let handle = STANDARD.encode(username.as_bytes());
        let url = self
            .practice_api_host
            .join(&format!("api/v1/rating/{}/info", handle))?;
        Ok(url)
    }
}

fn base_url(host: &str) -> Result<Url> {
    let mut url = Url::parse(host)?;
    if url.cannot_be_a_base() {
        return Err(FetchError::InvalidUrl(
            url::ParseError::RelativeUrlWithCannotBeABaseBase,
        ));
    }
    url.set_path("");
    url.set_query(None);
    Ok(url)
}

fn ensure_success(res: &Response, username: &str) -> Result<()> {
    if res.status() == StatusCode::NOT_FOUND {
        tracing::info!("upstream reports no profile for {}", username);
        return Err(FetchError::NotFound(username.to_string()));
    }

    match res.error_for_status_ref() {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!(
                "error response returned from {} for {}: {:?}",
                res.url(),
                username,
                e
            );
            Err(FetchError::UnexpectedStatus(res.status()))
        }
    }
}

#[async_trait]
impl PracticeApi for StandalonePracticeApi {
    async fn profile(&self, username: &str) -> Result<ProfileResponse> {
        let url = self.profile_url(username);
        tracing::info!("fetch profile page {}", url);

        let res = self
            .client
            .get(url)
            .header(ACCEPT, PAGE_ACCEPT)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .timeout(PROFILE_TIMEOUT)
            .send()
            .await?;
        ensure_success(&res, username)?;

        let html = res.text().await?;
        parser::parse_profile(username, &html)
    }

    async fn calendar(&self, username: &str, year: i32) -> Result<CalendarResponse> {
        tracing::info!("fetch submission calendar of {} in {}", username, year);

        let payload = json!({
            "handle": username,
            "requestType": "getYearwiseUserSubmissions",
            "year": year,
            "month": "",
        });
        let res = self
            .client
            .post(self.submissions_url.clone())
            .header(ACCEPT, "application/json")
            .json(&payload)
            .timeout(API_TIMEOUT)
            .send()
            .await?;
        ensure_success(&res, username)?;

        let body = res.text().await?;
        parser::parse_calendar(&body)
    }

    async fn contest(&self, username: &str, year: i32) -> Result<ContestResponse> {
        tracing::info!("fetch contest history of {} in {}", username, year);

        let res = self
            .client
            .post(self.contest_url(username)?)
            .header(ACCEPT, "application/json")
            .query(&[("year", year)])
            .timeout(API_TIMEOUT)
            .send()
            .await?;
        ensure_success(&res, username)?;

        let body = res.text().await?;
        parser::parse_contest(&body)
    }
}
