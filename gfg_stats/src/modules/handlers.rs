use crate::modules::{
    error::ApiError,
    models::request::{ValidatedUsername, ValidatedYear},
};
use axum::{extract::Extension, http::Uri, Json};
use gfg_stats_libs::{
    api::{CalendarResponse, ContestResponse, ProfileResponse},
    PracticeApi,
};
use std::sync::Arc;
use tokio::time::Instant;

pub type SharedPracticeApi = Arc<dyn PracticeApi + Send + Sync>;

pub async fn profile(
    ValidatedUsername(username): ValidatedUsername,
    Extension(api): Extension<SharedPracticeApi>,
) -> Result<Json<ProfileResponse>, ApiError> {
    tracing::info!("Processing request for username: {}", username);
    let start_process = Instant::now();

    let profile = api.profile(&username).await?;

    tracing::info!(
        target: "querylog",
        "endpoint=profile username={} elapsed_time={} tiers={}",
        username,
        start_process.elapsed().as_millis(),
        profile.solved_stats.len()
    );
    Ok(Json(profile))
}

pub async fn calendar(
    ValidatedUsername(username): ValidatedUsername,
    ValidatedYear(year): ValidatedYear,
    Extension(api): Extension<SharedPracticeApi>,
) -> Result<Json<CalendarResponse>, ApiError> {
    tracing::info!(
        "Processing calendar request for username: {}, year: {}",
        username,
        year
    );
    let start_process = Instant::now();

    let calendar = api.calendar(&username, year).await?;

    tracing::info!(
        target: "querylog",
        "endpoint=calendar username={} year={} elapsed_time={} total={}",
        username,
        year,
        start_process.elapsed().as_millis(),
        calendar.total_submissions
    );
    Ok(Json(calendar))
}

pub async fn contest(
    ValidatedUsername(username): ValidatedUsername,
    ValidatedYear(year): ValidatedYear,
    Extension(api): Extension<SharedPracticeApi>,
) -> Result<Json<ContestResponse>, ApiError> {
    tracing::info!(
        "Processing contest request for username: {}, year: {}",
        username,
        year
    );
    let start_process = Instant::now();

    let contest = api.contest(&username, year).await?;

    tracing::info!(
        target: "querylog",
        "endpoint=contest username={} year={} elapsed_time={} contests={}",
        username,
        year,
        start_process.elapsed().as_millis(),
        contest.contest_details.len()
    );
    Ok(Json(contest))
}

pub async fn fallback(uri: Uri) -> ApiError {
    tracing::info!("no route for {}", uri);
    ApiError::NotFound(String::from("The requested resource was not found."))
}
