//! Monitor command handler.
//!
//! Runs the sampling engine until Ctrl+C, printing every sample and alert,
//! then prints the most recent CPU and memory history.

use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;
use serde::Serialize;

use crate::core::config::Settings;
use crate::core::system_monitor::{Alert, AlertSeverity, ApplicationCore};
use crate::ui::{format_bytes, format_percent, format_rate, format_time};

const SUMMARY_SAMPLES: usize = 10;

/// One line of `--json` output
#[derive(Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
enum JsonEvent<'a, T: Serialize> {
    Cpu(&'a T),
    Memory(&'a T),
    Disk(&'a T),
    Network(&'a T),
    Alert(&'a T),
    Severity(&'a T),
}

fn emit_json<T: Serialize>(event: JsonEvent<'_, T>) {
    match serde_json::to_string(&event) {
        Ok(line) => println!("{}", line),
        Err(e) => log::warn!("Failed to serialize event: {}", e),
    }
}

/// Resolve settings from the config file, then apply CLI overrides.
pub fn resolve_settings(matches: &ArgMatches) -> Result<Settings> {
    let mut settings = match matches.get_one::<PathBuf>("config") {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load(),
    };

    if let Some(&interval) = matches.get_one::<u64>("interval") {
        settings.refresh_interval_ms = interval;
    }
    if let Some(&history) = matches.get_one::<usize>("history") {
        settings.history_size = history;
    }

    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

/// Execute the monitor command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let settings = resolve_settings(matches)?;
    let json_output = matches.get_flag("json");

    let core = ApplicationCore::new(settings).context("Failed to start metric collection")?;

    if json_output {
        subscribe_json(&core);
    } else {
        subscribe_text(&core);
    }

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    if !json_output {
        println!(
            "{}",
            format!(
                "Sampling every {} ms, press Ctrl+C to stop",
                core.settings().refresh_interval_ms
            )
            .cyan()
            .bold()
        );
    }

    core.start();
    rx.recv().context("Ctrl+C handler disconnected")?;
    core.stop();

    if !json_output {
        print_summary(&core);
    }

    Ok(())
}

fn subscribe_json(core: &ApplicationCore) {
    let bus = core.event_bus();
    bus.subscribe_cpu(|s| emit_json(JsonEvent::Cpu(s)));
    bus.subscribe_memory(|s| emit_json(JsonEvent::Memory(s)));
    bus.subscribe_disk(|s| emit_json(JsonEvent::Disk(s)));
    bus.subscribe_network(|s| emit_json(JsonEvent::Network(s)));

    let alerts = core.alerts();
    alerts.on_alert(|a| emit_json(JsonEvent::Alert(a)));
    alerts.on_severity_changed(|s| emit_json(JsonEvent::Severity(s)));
}

fn subscribe_text(core: &ApplicationCore) {
    let bus = core.event_bus();
    bus.subscribe_cpu(|s| {
        println!(
            "{} {:<8} {}",
            format_time(s.timestamp).dimmed(),
            "CPU".cyan(),
            format_percent(s.value())
        );
    });
    bus.subscribe_memory(|s| {
        println!(
            "{} {:<8} {} ({} / {})",
            format_time(s.timestamp).dimmed(),
            "Memory".cyan(),
            format_percent(s.value()),
            format_bytes(s.used_bytes),
            format_bytes(s.total_bytes)
        );
    });
    bus.subscribe_disk(|s| {
        println!(
            "{} {:<8} read {} write {}",
            format_time(s.timestamp).dimmed(),
            "Disk".cyan(),
            format_rate(s.read_bytes_per_sec),
            format_rate(s.write_bytes_per_sec)
        );
    });
    bus.subscribe_network(|s| {
        println!(
            "{} {:<8} down {} up {}",
            format_time(s.timestamp).dimmed(),
            "Network".cyan(),
            format_rate(s.download_bytes_per_sec),
            format_rate(s.upload_bytes_per_sec)
        );
    });

    let alerts = core.alerts();
    alerts.on_alert(print_alert);
    alerts.on_severity_changed(|severity| {
        println!("{}", format!("Severity: {:?}", severity).bold());
    });
}

fn print_alert(alert: &Alert) {
    let line = format!("[{:?}] {}", alert.alert_type, alert.message);
    match alert.severity {
        AlertSeverity::Critical => println!("{}", line.red().bold()),
        AlertSeverity::Warning => println!("{}", line.yellow().bold()),
        AlertSeverity::Normal => println!("{}", line),
    }
}

fn print_summary(core: &ApplicationCore) {
    println!();
    println!("{}", "Recent CPU samples".bold());
    for sample in last(&core.cpu_history()) {
        println!(
            "  {}  {}",
            format_time(sample.timestamp).dimmed(),
            format_percent(sample.value())
        );
    }

    println!("{}", "Recent memory samples".bold());
    for sample in last(&core.memory_history()) {
        println!(
            "  {}  {}",
            format_time(sample.timestamp).dimmed(),
            format_percent(sample.value())
        );
    }
}

fn last<T>(history: &[T]) -> &[T] {
    &history[history.len().saturating_sub(SUMMARY_SAMPLES)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::system_monitor::CpuSample;

    #[test]
    fn test_last_keeps_tail() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(last(&items), &(15..25).collect::<Vec<_>>()[..]);
        assert_eq!(last(&items[..3]), &[0, 1, 2]);
    }

    #[test]
    fn test_json_event_shape() {
        let sample = CpuSample::new(42.0, vec![40.0, 44.0]);
        let line = serde_json::to_string(&JsonEvent::Cpu(&sample)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["event"], "cpu");
        assert_eq!(value["data"]["total_usage_percent"], 42.0);
    }
}
