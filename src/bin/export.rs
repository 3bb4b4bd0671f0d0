use anyhow::{Context, Result, bail};

use pl_dashboard::config::DashboardConfig;
use pl_dashboard::crest::CrestTable;
use pl_dashboard::pipeline::{
    PipelineKind, fixtures_response, match_feed_response, roster_response,
};

const USAGE: &str = "usage: export <roster|fixtures|matches>";

fn main() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    sensible_env_logger::init!();

    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(2);
        }
    }
}

/// Prints the envelope; `Ok(false)` when the pipeline itself failed.
fn run() -> Result<bool> {
    let arg = std::env::args().nth(1).context(USAGE)?;
    let Some(kind) = PipelineKind::parse(&arg) else {
        bail!("unknown pipeline {arg:?}; {USAGE}");
    };
    let cfg = DashboardConfig::from_env();

    let (status, json) = match kind {
        PipelineKind::Roster => {
            let resp = roster_response(&cfg);
            (resp.status, resp.to_json_pretty())
        }
        PipelineKind::Fixtures => {
            let crests = CrestTable::from_config(&cfg);
            let resp = fixtures_response(&cfg, &crests);
            (resp.status, resp.to_json_pretty())
        }
        PipelineKind::MatchFeed => {
            let resp = match_feed_response(&cfg);
            (resp.status, resp.to_json_pretty())
        }
    };

    println!("{}", json.context("serialize response")?);
    log::info!("{arg} finished with status {status}");
    Ok((200..300).contains(&status))
}
