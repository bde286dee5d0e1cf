//! Distance command

use crate::output;
use anyhow::Result;
use ecoroute_geo::{haversine_distance_meters, Coordinate};
use owo_colors::OwoColorize;
use serde_json::json;

pub fn run(from: Coordinate, to: Coordinate, json: bool) -> Result<()> {
    let meters = haversine_distance_meters(&from, &to);

    if json {
        return output::json_line(&json!({
            "from": from,
            "to": to,
            "distance_m": meters,
        }));
    }

    if meters < 1000.0 {
        println!("{} → {}: {}", from, to, format!("{meters:.1} m").cyan().bold());
    } else {
        println!(
            "{} → {}: {}",
            from,
            to,
            format!("{:.2} km", meters / 1000.0).cyan().bold()
        );
    }
    Ok(())
}
