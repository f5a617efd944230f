use super::input::{InputArgs, Inputs};
use super::{CommandError, exit_on_error};

pub struct DeriveArgs {
    pub input: InputArgs,
    pub compact: bool,
}

pub fn run(args: DeriveArgs) {
    let json = exit_on_error(derive_json(&args));
    println!("{json}");
}

/// The derived configuration of the selected schema as JSON.
pub fn derive_json(args: &DeriveArgs) -> Result<String, CommandError> {
    let inputs = Inputs::load(&args.input)?;
    let export = inputs.derive()?.export()?;
    let json = if args.compact {
        serde_json::to_string(&export)?
    } else {
        serde_json::to_string_pretty(&export)?
    };
    Ok(json)
}
