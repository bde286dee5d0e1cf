//! Schedule command - weekly collection windows

use crate::output;
use anyhow::Result;
use chrono::{Local, Weekday};
use ecoroute_tracker::Schedule;
use owo_colors::OwoColorize;
use serde_json::json;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn run(day: Option<Weekday>, sector: Option<&str>, json: bool) -> Result<()> {
    let schedule = Schedule::default();
    let days: Vec<Weekday> = match day {
        Some(day) => vec![day],
        None => WEEK.to_vec(),
    };
    let next = schedule.next_after(Local::now().naive_local(), sector);

    if json {
        let slots: Vec<_> = days
            .iter()
            .flat_map(|d| schedule.for_day(*d, sector))
            .collect();
        return output::json_pretty(&json!({
            "slots": slots,
            "next": next.map(|(start, slot)| json!({ "start": start, "slot": slot })),
        }));
    }

    output::header("🗓  Collection Schedule");
    for weekday in days {
        let slots: Vec<_> = schedule.for_day(weekday, sector).collect();
        if slots.is_empty() {
            println!("  {} {}", format!("{:<4}", weekday.to_string()).bold(), "no collections".dimmed());
            continue;
        }
        for slot in slots {
            println!(
                "  {} {:<12} {:<14} {}",
                format!("{:<4}", weekday.to_string()).bold(),
                slot.window(),
                output::category(slot.category),
                slot.sector
            );
        }
    }

    println!();
    match next {
        Some((start, slot)) => println!(
            "  Next: {} {} ({})",
            start.format("%a %d %b %H:%M").to_string().green(),
            output::category(slot.category),
            slot.sector
        ),
        None => println!("  {}", "No upcoming collections".yellow()),
    }
    println!();
    Ok(())
}
