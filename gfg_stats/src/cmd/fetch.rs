use crate::cmd::{create_practice_api, Target};
use crate::modules::models::request::{UsernameParameter, YearParameter};
use anyhow::{Context, Result};
use clap::Args;
use gfg_stats_libs::PracticeApi;
use validator::Validate;

#[derive(Debug, Args)]
pub struct FetchArgs {
    username: String,
    #[arg(long, value_enum, default_value_t = Target::Profile)]
    target: Target,
    #[arg(long)]
    year: Option<i32>,
}

/// Runs one request through the same pipeline as the server and prints the JSON response.
pub async fn run(args: FetchArgs) -> Result<()> {
    let username = UsernameParameter {
        username: args.username,
    };
    username
        .validate()
        .with_context(|| format!("invalid username `{}`", username.username))?;

    let year = YearParameter {
        year: args.year.map(|year| year.to_string()),
    };
    year.validate()
        .with_context(|| format!("invalid year {:?}", args.year))?;
    let year = year.resolve();

    let api = create_practice_api()?;
    tracing::info!("fetch {} of {}", args.target, username.username);

    let value = match args.target {
        Target::Profile => serde_json::to_value(api.profile(&username.username).await?)?,
        Target::Calendar => serde_json::to_value(api.calendar(&username.username, year).await?)?,
        Target::Contest => serde_json::to_value(api.contest(&username.username, year).await?)?,
    };
    println!("{}", serde_json::to_string_pretty(&value)?);

    Ok(())
}
