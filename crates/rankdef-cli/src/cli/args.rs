//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` so every command that reads a schema
//! spells its input flags the same way.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Schema model file (positional).
pub fn schema_path_arg() -> Arg {
    Arg::new("schema_path")
        .value_name("SCHEMA")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("Schema model JSON (one schema or a document-type hierarchy)")
}

/// Document type to derive when the file holds several (--schema).
pub fn schema_name_arg() -> Arg {
    Arg::new("schema_name")
        .long("schema")
        .value_name("NAME")
        .help("Schema to derive (defaults to the last one in the file)")
}

/// Attribute snapshot (--attributes).
pub fn attributes_arg() -> Arg {
    Arg::new("attributes")
        .long("attributes")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("JSON map of attribute field name to value type")
}

/// Query profile types (--query-profiles).
pub fn query_profiles_arg() -> Arg {
    Arg::new("query_profiles")
        .long("query-profiles")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("JSON map of query feature name to value type")
}

/// Deploy properties (--deploy).
pub fn deploy_arg() -> Arg {
    Arg::new("deploy")
        .long("deploy")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Deploy properties JSON")
}

/// Worker pool size (--threads).
pub fn threads_arg() -> Arg {
    Arg::new("threads")
        .long("threads")
        .value_name("N")
        .value_parser(value_parser!(usize))
        .help("Compilation worker threads (0 = available parallelism)")
}

/// Profile to show (-p/--profile).
pub fn profile_arg() -> Arg {
    Arg::new("profile")
        .short('p')
        .long("profile")
        .value_name("NAME")
        .default_value("default")
        .help("Rank profile to dump")
}

/// Output compact JSON (--compact).
pub fn compact_arg() -> Arg {
    Arg::new("compact")
        .long("compact")
        .action(ArgAction::SetTrue)
        .help("Output compact JSON")
}

/// Log verbosity (-v, -vv, -vvv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::Count)
        .global(true)
        .help("Raise log level (-v info, -vv debug, -vvv trace)")
}
