//! Large-expression externalization.
//!
//! Machine-learned expressions can be megabytes of text. Rather than keep
//! them in the resident property blob, any serialized function body longer
//! than the deploy limit is shipped as a file and the property is replaced by
//! a pointer to it.

use rankdef_properties::{Property, keys};
use tracing::debug;

use crate::registry::FileRegistry;

/// Name an externalized function body is distributed under.
pub fn externalized_name(profile: &str, function: &str) -> String {
    format!("{profile}.{function}")
}

/// Replace oversized ranking scripts with `expressionName` references.
///
/// `expressionRef(f).rankingScript = <huge>` becomes
/// `expressionRef(f).expressionName = <profile>.<f>` and the body is
/// registered with `files`.
pub fn externalize(
    profile: &str,
    properties: Vec<Property>,
    limit: usize,
    files: &dyn FileRegistry,
) -> Vec<Property> {
    properties
        .into_iter()
        .map(|property| {
            if property.value.len() <= limit {
                return property;
            }
            let Some(function) = keys::function_of_ranking_script(&property.key) else {
                return property;
            };
            let name = externalized_name(profile, function);
            let reference = files.add_blob(&name, property.value.as_bytes());
            debug!(
                profile,
                function,
                bytes = property.value.len(),
                %reference,
                "externalized ranking expression"
            );
            Property::new(keys::expression_name(function), name)
        })
        .collect()
}
