//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use crate::commands::check::CheckArgs;
use crate::commands::derive::DeriveArgs;
use crate::commands::dump::DumpArgs;
use crate::commands::input::InputArgs;

pub struct InputParams {
    pub schema_path: PathBuf,
    pub schema_name: Option<String>,
    pub attributes: Option<PathBuf>,
    pub query_profiles: Option<PathBuf>,
    pub deploy: Option<PathBuf>,
    pub threads: Option<usize>,
}

impl InputParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            // Required by clap.
            schema_path: m.get_one::<PathBuf>("schema_path").cloned().unwrap_or_default(),
            schema_name: m.get_one::<String>("schema_name").cloned(),
            attributes: m.get_one::<PathBuf>("attributes").cloned(),
            query_profiles: m.get_one::<PathBuf>("query_profiles").cloned(),
            deploy: m.get_one::<PathBuf>("deploy").cloned(),
            threads: m.get_one::<usize>("threads").copied(),
        }
    }
}

impl From<InputParams> for InputArgs {
    fn from(p: InputParams) -> Self {
        Self {
            schema_path: p.schema_path,
            schema_name: p.schema_name,
            attributes: p.attributes,
            query_profiles: p.query_profiles,
            deploy: p.deploy,
            threads: p.threads,
        }
    }
}

pub struct DeriveParams {
    pub input: InputParams,
    pub compact: bool,
}

impl DeriveParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input: InputParams::from_matches(m),
            compact: m.get_flag("compact"),
        }
    }
}

impl From<DeriveParams> for DeriveArgs {
    fn from(p: DeriveParams) -> Self {
        Self {
            input: p.input.into(),
            compact: p.compact,
        }
    }
}

pub struct DumpParams {
    pub input: InputParams,
    pub profile: String,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input: InputParams::from_matches(m),
            profile: m
                .get_one::<String>("profile")
                .cloned()
                .unwrap_or_else(|| rankdef_core::DEFAULT_PROFILE.to_string()),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            input: p.input.into(),
            profile: p.profile,
        }
    }
}

pub struct CheckParams {
    pub input: InputParams,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input: InputParams::from_matches(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            input: p.input.into(),
        }
    }
}
