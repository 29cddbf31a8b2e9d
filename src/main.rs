use anyhow::Result;

use court_order::cli::Command;
use court_order::{
    handle_completions, handle_order, handle_schedule, handle_serve, handle_standings, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Standings { snapshot, group } => handle_standings(snapshot, *group),
        Command::Order {
            snapshot,
            strategy,
            force,
            output,
        } => handle_order(snapshot, *strategy, *force, output.as_deref()),
        Command::Schedule {
            snapshot,
            start,
            end,
            strategy,
            output,
        } => handle_schedule(snapshot, start, end, *strategy, output.as_deref()),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
