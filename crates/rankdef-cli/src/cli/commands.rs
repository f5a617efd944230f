//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Inputs every derivation reads.
fn with_input_args(cmd: Command) -> Command {
    cmd.arg(schema_path_arg())
        .arg(schema_name_arg())
        .arg(attributes_arg())
        .arg(query_profiles_arg())
        .arg(deploy_arg())
        .arg(threads_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("rankdef")
        .about("Derive serving-node rank profile configuration from a schema model")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(derive_command())
        .subcommand(dump_command())
        .subcommand(check_command())
}

/// Derive every rank profile and print the configuration as JSON.
pub fn derive_command() -> Command {
    let cmd = Command::new("derive")
        .about("Derive rank profiles, constants and models as JSON")
        .after_help(
            r#"EXAMPLES:
  rankdef derive music.json
  rankdef derive music.json --attributes attributes.json --threads 4
  rankdef derive hierarchy.json --schema album --compact"#,
        )
        .arg(compact_arg());
    with_input_args(cmd)
}

/// Print the properties of one rank profile.
pub fn dump_command() -> Command {
    let cmd = Command::new("dump")
        .about("Print the properties of one rank profile")
        .after_help(
            r#"EXAMPLES:
  rankdef dump music.json                # default profile
  rankdef dump music.json -p popularity"#,
        )
        .arg(profile_arg());
    with_input_args(cmd)
}

/// Derive and report errors only.
pub fn check_command() -> Command {
    let cmd = Command::new("check")
        .about("Check that a schema derives without errors")
        .after_help(
            r#"EXAMPLES:
  rankdef check music.json
  rankdef check music.json --deploy deploy.json"#,
        );
    with_input_args(cmd)
}
