use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, TimeZone};
use sbr_client::config::Config;
use sbr_client::engine::SearchTerm;
use sbr_client::query::kinds;
use sbr_client::SbrClient;
use std::path::PathBuf;

const USAGE: &str = "usage: sbr-query [--config PATH] <league> <start YYYY-MM-DD> <end YYYY-MM-DD> [team ...]";

struct Args {
    config: PathBuf,
    league: String,
    start: NaiveDate,
    end: NaiveDate,
    teams: Vec<String>,
}

fn parse_args() -> Result<Args> {
    let mut config = PathBuf::from("config.toml");
    let mut positional = Vec::new();
    let mut argv = std::env::args().skip(1);
    while let Some(arg) = argv.next() {
        if arg == "--config" {
            config = PathBuf::from(argv.next().context(USAGE)?);
        } else {
            positional.push(arg);
        }
    }
    if positional.len() < 3 {
        anyhow::bail!(USAGE);
    }
    let date = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{}'", s))
    };
    Ok(Args {
        config,
        league: positional[0].clone(),
        start: date(&positional[1])?,
        end: date(&positional[2])?,
        teams: positional[3..].to_vec(),
    })
}

fn local_midnight(date: NaiveDate) -> Result<chrono::DateTime<Local>> {
    let naive = date.and_hms_opt(0, 0, 0).context("invalid time")?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("{} has no local midnight", date))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;
    let config = Config::load(&args.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    let client = SbrClient::from_config(&config)?;
    let league = client.catalog().league(&args.league)?;
    let start = local_midnight(args.start)?;
    let end = local_midnight(args.end)?;

    let events = if args.teams.is_empty() {
        client
            .query(kinds::events_by_date_range(&[league.league_id], &start, &end))
            .await?
    } else {
        let terms: Vec<SearchTerm> = args.teams.iter().map(|t| SearchTerm::from(t.as_str())).collect();
        let team_ids = league.team_ids(&terms)?;
        tracing::info!(league = %league.key, ?team_ids, "resolved teams");
        client
            .events_by_participants(&team_ids, league.league_id, &start, &end)
            .await?
    };

    println!("{}", serde_json::to_string_pretty(events.list())?);
    Ok(())
}
