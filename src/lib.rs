pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod reporting;
pub mod scheduling;
pub mod services;
pub mod standings;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use colored::Colorize;
use log::info;
use std::fs;
use std::path::Path;

use crate::api::parsers::parse_snapshot_str;
use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::domain::time::{format_datetime, parse_datetime};
use crate::domain::{
    GroupId, GroupStandings, Match, MatchId, MatchOrderingStrategy, OrderingRecord, TournamentSnapshot,
};
use crate::scheduling::{
    apply_ordering, apply_schedule, auto_schedule_matches, calculate_match_order, PlanningWindow,
    SchedulerOptions,
};
use crate::services::server::ServerService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_standings(snapshot_path: &Path, group_id: Option<GroupId>) -> Result<()> {
    let config = AppConfig::new();
    let snapshot = load_snapshot(snapshot_path)?;
    let now = Local::now().naive_local();

    let result = standings::recalculate(&snapshot, group_id, &config.standings, now)?;
    for group in &result.groups {
        print_standings(group);

        let config = snapshot.stage_config_for_group(snapshot.group(group.group_id)?);
        let advancing = standings::qualifiers(&group.standings, &config.advancement_rules);
        if !advancing.is_empty() {
            let ids: Vec<String> = advancing.iter().map(|q| q.couple_id.to_string()).collect();
            let destination = config
                .advancement_rules
                .to_bracket
                .map_or_else(|| "next stage".to_string(), |b| format!("{:?} bracket", b));
            println!("{} {} -> {}", "Advancing:".cyan(), ids.join(", "), destination);
        }
    }
    Ok(())
}

pub fn handle_order(
    snapshot_path: &Path,
    strategy: MatchOrderingStrategy,
    force: bool,
    output: Option<&Path>,
) -> Result<()> {
    let config = AppConfig::new();
    let mut snapshot = load_snapshot(snapshot_path)?;

    if !force && snapshot.has_ordering() {
        info!("Snapshot already ordered, pass --force to recalculate");
        print_matches(&snapshot);
        return Ok(());
    }

    let outcome = calculate_match_order(&snapshot, strategy, &SchedulerOptions::from(&config.scheduling));
    apply_ordering(&mut snapshot, &outcome);
    snapshot.last_ordering = Some(OrderingRecord {
        strategy,
        total_matches_ordered: outcome.total_ordered(),
        unresolved_matches: outcome.unresolved.len(),
        calculated_at: Local::now().naive_local(),
    });

    print_matches(&snapshot);
    print_unresolved(&outcome.unresolved);
    if let Some(path) = output {
        save_snapshot(path, &snapshot)?;
    }
    Ok(())
}

pub fn handle_schedule(
    snapshot_path: &Path,
    start: &str,
    end: &str,
    strategy: Option<MatchOrderingStrategy>,
    output: Option<&Path>,
) -> Result<()> {
    let config = AppConfig::new();
    let mut snapshot = load_snapshot(snapshot_path)?;
    let window = PlanningWindow {
        start: parse_datetime(start)?,
        end: parse_datetime(end)?,
    };
    let strategy = strategy
        .or_else(|| snapshot.last_ordering.as_ref().map(|o| o.strategy))
        .unwrap_or(config.scheduling.default_strategy);

    let outcome = auto_schedule_matches(&snapshot, strategy, window, &SchedulerOptions::from(&config.scheduling))?;
    apply_schedule(&mut snapshot, &outcome);
    snapshot.last_ordering = Some(OrderingRecord {
        strategy,
        total_matches_ordered: outcome.ordering.total_ordered(),
        unresolved_matches: outcome.ordering.unresolved.len(),
        calculated_at: Local::now().naive_local(),
    });

    println!(
        "{} {} matches scheduled using {}",
        "✓".green(),
        outcome.scheduled.len(),
        strategy
    );
    print_matches(&snapshot);
    print_unresolved(&outcome.ordering.unresolved);
    if let Some(path) = output {
        save_snapshot(path, &snapshot)?;
    }
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

fn load_snapshot(path: &Path) -> Result<TournamentSnapshot> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let snapshot = parse_snapshot_str(&json).with_context(|| format!("Invalid snapshot {}", path.display()))?;
    info!(
        "Loaded tournament {} with {} matches from {}",
        snapshot.tournament_id,
        snapshot.matches.len(),
        path.display()
    );
    Ok(snapshot)
}

fn save_snapshot(path: &Path, snapshot: &TournamentSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Saved snapshot to {}", path.display());
    Ok(())
}

fn print_standings(group: &GroupStandings) {
    println!("\n{}", format!("{} (group {})", group.group_name, group.group_id).bold());
    println!(
        "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>7} {:>5} {:>6} {:>7}",
        "#", "Couple", "P", "W", "D", "L", "Games", "Diff", "Pts", "Win%"
    );
    for row in &group.standings {
        let name = if row.couple_name.is_empty() {
            format!("Couple {}", row.couple_id)
        } else {
            row.couple_name.clone()
        };
        let line = format!(
            "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>7} {:>+5} {:>6} {:>7.2}",
            row.position,
            name,
            row.matches_played,
            row.matches_won,
            row.matches_drawn,
            row.matches_lost,
            format!("{}-{}", row.games_won, row.games_lost),
            row.games_diff,
            row.total_points,
            row.win_percentage
        );
        if row.position == 1 {
            println!("{}", line.green());
        } else {
            println!("{}", line);
        }
    }
}

fn print_matches(snapshot: &TournamentSnapshot) {
    let mut pending: Vec<&Match> = snapshot.matches.iter().filter(|m| m.is_pending()).collect();
    pending.sort_by_key(|m| (m.display_order.unwrap_or(u32::MAX), m.id));

    println!(
        "{:>5}  {:>6}  {:>5}  {:>7}  {:<9} {:<20} {:>8}",
        "Order", "Match", "Round", "Court", "Position", "Start", "Priority"
    );
    for m in pending {
        let court = m.court_id.map_or_else(|| "-".to_string(), |c| c.to_string());
        let start = m.scheduled_start.map_or_else(|| "unscheduled".to_string(), |s| format_datetime(&s));
        println!(
            "{:>5}  {:>6}  {:>5}  {:>7}  {:<9} {:<20} {:>8.2}",
            m.display_order.map_or_else(|| "-".to_string(), |o| o.to_string()),
            m.id,
            m.round_number.unwrap_or_default(),
            court,
            m.bracket_position.as_deref().unwrap_or("-"),
            start,
            m.priority_score.unwrap_or_default()
        );
    }
}

fn print_unresolved(unresolved: &[MatchId]) {
    if !unresolved.is_empty() {
        let ids: Vec<String> = unresolved.iter().map(|id| id.to_string()).collect();
        println!(
            "{} {} matches could not be placed: {}",
            "!".yellow().bold(),
            unresolved.len(),
            ids.join(", ")
        );
    }
}
