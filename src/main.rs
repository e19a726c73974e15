use anyhow::Result;

use hostpulse::commands;

fn main() -> Result<()> {
    hostpulse::init_logging();

    let matches = commands::build_cli().get_matches();

    commands::monitor(&matches)
}
