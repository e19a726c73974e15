// Command handlers module
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

pub mod monitor;

// Re-exports for cleaner imports
pub use monitor::execute as monitor;

/// Command-line interface of the `hostpulse` binary
pub fn build_cli() -> Command {
    Command::new("hostpulse")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Samples CPU, memory, disk and network usage and raises threshold alerts")
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("MS")
                .help("Sampling interval in milliseconds (overrides the settings file)")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("history")
                .long("history")
                .value_name("N")
                .help("Number of samples kept per metric (overrides the settings file)")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Settings file to load instead of the default location")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print one JSON object per event instead of text")
                .action(ArgAction::SetTrue),
        )
}
