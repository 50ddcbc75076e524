pub mod fetch;
pub mod server;

use anyhow::{Context, Result};
use clap::ValueEnum;
use gfg_stats_libs::{
    practice::core::{DEFAULT_PRACTICE_API_HOST, DEFAULT_PROFILE_HOST},
    StandalonePracticeApi,
};
use std::{env, fmt};

#[derive(Debug, ValueEnum, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Profile,
    Calendar,
    Contest,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Target::Profile => write!(f, "profile"),
            Target::Calendar => write!(f, "calendar"),
            Target::Contest => write!(f, "contest"),
        }
    }
}

/// Builds the upstream client from `GFG_PROFILE_HOST` and `GFG_PRACTICE_API_HOST`.
pub fn create_practice_api() -> Result<StandalonePracticeApi> {
    let profile_host = env::var("GFG_PROFILE_HOST").unwrap_or_else(|_| {
        tracing::warn!(
            "GFG_PROFILE_HOST environment variable is not set. Default value `{}` will be used.",
            DEFAULT_PROFILE_HOST
        );
        String::from(DEFAULT_PROFILE_HOST)
    });
    let practice_api_host = env::var("GFG_PRACTICE_API_HOST").unwrap_or_else(|_| {
        tracing::warn!(
            "GFG_PRACTICE_API_HOST environment variable is not set. \
             Default value `{}` will be used.",
            DEFAULT_PRACTICE_API_HOST
        );
        String::from(DEFAULT_PRACTICE_API_HOST)
    });

    StandalonePracticeApi::new(&profile_host, &practice_api_host).with_context(|| {
        let message = "couldn't create upstream client. \
            check the values of GFG_PROFILE_HOST and GFG_PRACTICE_API_HOST.";
        tracing::error!(message);
        message
    })
}
