use anyhow::{Context, Result, bail};

use match_predictor::api::{HttpMatchApi, MatchApi};
use match_predictor::config::AppConfig;
use match_predictor::grouping::{format_kickoff, group_by_day};
use match_predictor::outcome::Outcome;

const USAGE: &str = "usage: probe [--base-url <url>] <fixtures [matchday] | match <id> | predict <home_id> <away_id> | elo <team_id> | results [offset] [limit]>";

fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = AppConfig::from_env();
    if args.first().map(String::as_str) == Some("--base-url") {
        let Some(base) = args.get(1).cloned() else { bail!(USAGE) };
        config = config.with_base_url(&base);
        args.drain(..2);
    }
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let api = HttpMatchApi::new(&config).context("build api client")?;
    println!("API: {}", api.base_url());

    match args.first().map(String::as_str) {
        Some("fixtures") => {
            let matchday = parse_opt::<u32>(args.get(1), "matchday")?;
            let batch = api
                .fetch_upcoming_fixtures(matchday)
                .context("fetch upcoming fixtures")?;
            println!(
                "Matchday {}: {} fixtures",
                batch
                    .matchday
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                batch.fixtures.len()
            );
            for group in group_by_day(batch.fixtures) {
                println!("{}", group.label());
                for f in &group.fixtures {
                    println!(
                        "  [{}] {} vs {} ({}-{})",
                        f.match_id, f.home_team_name, f.away_team_name, f.home_team_id, f.away_team_id
                    );
                }
            }
        }
        Some("match") => {
            let Some(id) = args.get(1) else { bail!(USAGE) };
            let card = api.fetch_match(id).with_context(|| format!("fetch match {id}"))?;
            println!(
                "{} vs {} | {} | {} | {}",
                card.home.name,
                card.away.name,
                format_kickoff(&card.kickoff),
                card.venue.as_deref().unwrap_or("TBD"),
                card.status
            );
            if let Some(score) = card.score {
                println!("Score: {}-{}", score.home, score.away);
            }
        }
        Some("predict") => {
            let home = parse_opt::<u64>(args.get(1), "home_id")?;
            let away = parse_opt::<u64>(args.get(2), "away_id")?;
            let (Some(home), Some(away)) = (home, away) else { bail!(USAGE) };
            let p = api
                .fetch_prediction(home, away)
                .with_context(|| format!("fetch prediction {home} vs {away}"))?;
            println!(
                "H {:.1}% | D {:.1}% | A {:.1}% -> {}",
                p.home_win_probability * 100.0,
                p.draw_probability * 100.0,
                p.away_win_probability * 100.0,
                p.predicted_outcome().label()
            );
        }
        Some("elo") => {
            let Some(team) = parse_opt::<u64>(args.get(1), "team_id")? else { bail!(USAGE) };
            let rating = api
                .fetch_team_rating(team)
                .with_context(|| format!("fetch rating for team {team}"))?;
            println!(
                "{} ({}): {:.1}",
                rating.name.as_deref().unwrap_or("team"),
                rating.team_id.unwrap_or(team),
                rating.elo_rating
            );
        }
        Some("results") => {
            let offset = parse_opt::<u32>(args.get(1), "offset")?.unwrap_or(0);
            let limit = parse_opt::<u32>(args.get(2), "limit")?.unwrap_or(config.results_page_size);
            let batch = api
                .fetch_results(offset, limit)
                .with_context(|| format!("fetch results offset={offset} limit={limit}"))?;
            let mut correct = 0usize;
            let mut rated = 0usize;
            for r in &batch.results {
                let predicted = r.predicted_outcome();
                if let Some(p) = predicted {
                    rated += 1;
                    if p == r.actual_outcome() {
                        correct += 1;
                    }
                }
                println!(
                    "{} {} {}-{} {} | predicted {}",
                    format_kickoff(&r.date),
                    r.home_team,
                    r.home_goals,
                    r.away_goals,
                    r.away_team,
                    predicted.map(Outcome::label).unwrap_or("N/A")
                );
            }
            println!(
                "{} of {} shown, {correct}/{rated} predictions correct",
                batch.results.len(),
                batch.total
            );
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

fn parse_opt<T: std::str::FromStr>(raw: Option<&String>, name: &str) -> Result<Option<T>> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("invalid {name}: {value}")),
    }
}
