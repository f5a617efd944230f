mod cli;
mod commands;

use cli::{CheckParams, DeriveParams, DumpParams, build_cli};
use tracing::Level;

fn main() {
    let matches = build_cli().get_matches();
    let Some((name, m)) = matches.subcommand() else {
        unreachable!("clap should have caught this");
    };
    init_logging(m.get_count("verbose"));

    match name {
        "derive" => {
            let params = DeriveParams::from_matches(m);
            commands::derive::run(params.into());
        }
        "dump" => {
            let params = DumpParams::from_matches(m);
            commands::dump::run(params.into());
        }
        "check" => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
