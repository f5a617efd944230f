use rankdef_properties::render;

use super::input::{InputArgs, Inputs};
use super::{CommandError, exit_on_error};

pub struct DumpArgs {
    pub input: InputArgs,
    pub profile: String,
}

pub fn run(args: DumpArgs) {
    let text = exit_on_error(dump_profile(&args));
    if !text.is_empty() {
        println!("{text}");
    }
}

/// `key = value` lines of one derived profile.
pub fn dump_profile(args: &DumpArgs) -> Result<String, CommandError> {
    let inputs = Inputs::load(&args.input)?;
    let derived = inputs.derive()?;
    let profile = derived
        .rank_profiles()
        .get(&args.profile)
        .ok_or_else(|| CommandError::UnknownProfile {
            schema: inputs.schema.name.clone(),
            profile: args.profile.clone(),
        })?;
    Ok(render(&profile.properties()?))
}
