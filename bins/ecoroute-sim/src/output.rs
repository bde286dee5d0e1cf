//! Terminal rendering shared by the commands

use anyhow::Result;
use ecoroute_tracker::{FlowEvent, TrayState, VehicleCategory};
use owo_colors::OwoColorize;
use serde::Serialize;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Print a framed section title
pub fn header(title: &str) {
    println!();
    println!("{}", RULE.green());
    println!("  {}", title.green().bold());
    println!("{}", RULE.green());
    println!();
}

/// Print one value as a single JSON line
pub fn json_line<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Print a value as pretty JSON
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Colored category label
pub fn category(category: VehicleCategory) -> String {
    let label = category.label();
    match category {
        VehicleCategory::Organic => label.green().to_string(),
        VehicleCategory::Recyclable => label.blue().to_string(),
        VehicleCategory::General => label.white().to_string(),
        VehicleCategory::Hazardous => label.red().to_string(),
    }
}

fn tray_state(state: &TrayState) -> String {
    let name = state.to_string();
    match state {
        TrayState::VisiblePendingConfirmation => name.yellow().bold().to_string(),
        TrayState::Confirmed => name.green().bold().to_string(),
        TrayState::Hidden => name.dimmed().to_string(),
        _ => name,
    }
}

/// Human-readable line for a flow event; `None` for events not worth showing
pub fn describe(event: &FlowEvent) -> Option<String> {
    let line = match event {
        FlowEvent::TrayAnimation { .. } | FlowEvent::Haptic => return None,
        FlowEvent::PickupConfirmed => format!("{} Pickup confirmed", "✓".green()),
        FlowEvent::TrayStateChanged { from, to } => {
            format!("  tray   {} → {}", tray_state(from), tray_state(to))
        }
        FlowEvent::ProximityChanged { result: Some(result) } => format!(
            "  near   {} at {:.0} m",
            result.nearest_vehicle_id.cyan(),
            result.distance_m
        ),
        FlowEvent::ProximityChanged { result: None } => {
            format!("  near   {}", "none".dimmed())
        }
        FlowEvent::TrackingStarted { vehicle, category: c } => {
            format!("{} Tracking {} ({})", "→".cyan(), vehicle.cyan(), category(*c))
        }
        FlowEvent::TrackingCancelled => format!("{} Tracking cancelled", "✗".yellow()),
        FlowEvent::FlowReset => format!("{} Pickup complete", "●".green()),
    };
    Some(line)
}

/// Print a flow event in the chosen format
pub fn event(event: &FlowEvent, json: bool) -> Result<()> {
    if json {
        return json_line(event);
    }
    if let Some(line) = describe(event) {
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecoroute_tracker::{Easing, Motion, ProximityResult, VehicleId};
    use std::time::Duration;

    #[test]
    fn test_animation_and_haptics_are_quiet() {
        let animation = FlowEvent::TrayAnimation {
            motion: Motion::SlideIn,
            duration_ms: Duration::from_millis(500).as_millis() as u64,
            easing: Easing::EaseOut,
        };
        assert!(describe(&animation).is_none());
        assert!(describe(&FlowEvent::Haptic).is_none());
    }

    #[test]
    fn test_proximity_line_mentions_vehicle_and_distance() {
        let event = FlowEvent::ProximityChanged {
            result: Some(ProximityResult {
                nearest_vehicle_id: VehicleId::from("c1"),
                distance_m: 42.4,
            }),
        };
        let line = describe(&event).unwrap();
        assert!(line.contains("c1"));
        assert!(line.contains("42 m"));
    }
}
