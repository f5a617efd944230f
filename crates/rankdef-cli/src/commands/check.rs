use tracing::info;

use super::input::{InputArgs, Inputs};
use super::{CommandError, exit_on_error};

pub struct CheckArgs {
    pub input: InputArgs,
}

pub fn run(args: CheckArgs) {
    exit_on_error(check(&args));
    // Silent on success (like cargo check)
}

pub fn check(args: &CheckArgs) -> Result<(), CommandError> {
    let inputs = Inputs::load(&args.input)?;
    let derived = inputs.derive()?;
    info!(
        schema = %inputs.schema.name,
        profiles = derived.rank_profiles().len(),
        "schema derives cleanly"
    );
    Ok(())
}
