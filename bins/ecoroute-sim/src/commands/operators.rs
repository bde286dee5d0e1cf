//! Operators command - list who can send a truck

use crate::output;
use anyhow::Result;
use ecoroute_tracker::Roster;
use owo_colors::OwoColorize;

pub fn run(json: bool) -> Result<()> {
    let roster = Roster::default();

    if json {
        return output::json_pretty(&roster.operators());
    }

    output::header("📞 Pickup Operators");
    for operator in roster.operators() {
        let status = if operator.available {
            "available".green().to_string()
        } else {
            "unavailable".red().to_string()
        };
        println!(
            "  {} {:<2} {:<24} {:<12} {:<14} {}",
            format!("#{}", operator.id).dimmed(),
            operator.initials().bold(),
            operator.name,
            output::category(operator.category),
            operator.phone,
            status
        );
    }
    println!();
    Ok(())
}
