//! Native rank types.
//!
//! A rank type bundles five tuning tables used by the backend's native rank
//! features. Index fields use the field-match and proximity tables,
//! attribute fields use the attribute-match weight table.

use indexmap::IndexMap;
use rankdef_core::{AttributeFields, RankType};
use rankdef_properties::{Property, keys};

use crate::{Error, Result};

const FIELD_MATCH: &str = "nativeFieldMatch";
const ATTRIBUTE_MATCH: &str = "nativeAttributeMatch";
const PROXIMITY: &str = "nativeProximity";

/// Which kind of field a table applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Index,
    Attribute,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeTable {
    pub feature: &'static str,
    pub table: &'static str,
    pub applies_to: FieldKind,
}

/// The five tables every rank type defines, in emission order.
pub const TABLES: [NativeTable; 5] = [
    NativeTable {
        feature: FIELD_MATCH,
        table: "firstOccurrenceTable",
        applies_to: FieldKind::Index,
    },
    NativeTable {
        feature: FIELD_MATCH,
        table: "occurrenceCountTable",
        applies_to: FieldKind::Index,
    },
    NativeTable {
        feature: PROXIMITY,
        table: "proximityTable",
        applies_to: FieldKind::Index,
    },
    NativeTable {
        feature: PROXIMITY,
        table: "reverseProximityTable",
        applies_to: FieldKind::Index,
    },
    NativeTable {
        feature: ATTRIBUTE_MATCH,
        table: "weightTable",
        applies_to: FieldKind::Attribute,
    },
];

/// Table values of a rank type, aligned with [`TABLES`].
pub type TableValues = [&'static str; 5];

const DEFAULT_TABLES: TableValues = [
    "expdecay(8000,12.50)",
    "loggrowth(1500,4000,19)",
    "expdecay(500,3)",
    "expdecay(400,3)",
    "linear(1,0)",
];

const IDENTITY_TABLES: TableValues = [
    "expdecay(100,12.50)",
    "loggrowth(1500,4000,19)",
    "expdecay(5000,3)",
    "expdecay(3000,3)",
    "linear(1,0)",
];

const TAGS_TABLES: TableValues = [
    "loggrowth(38,8,1)",
    "loggrowth(38,8,1)",
    "expdecay(500,3)",
    "expdecay(400,3)",
    "loggrowth(38,8,1)",
];

/// Table values of `rank_type`, or `None` when it has no definition.
pub fn table_values(rank_type: RankType) -> Option<&'static TableValues> {
    match rank_type {
        RankType::Default | RankType::About => Some(&DEFAULT_TABLES),
        RankType::Identity => Some(&IDENTITY_TABLES),
        RankType::Tags => Some(&TAGS_TABLES),
        RankType::Empty => None,
    }
}

/// Per-field settings accumulated from a profile's rank settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldRankSettings {
    pub weight: Option<u32>,
    pub filter: bool,
    pub tables: Vec<Property>,
}

/// Attach the tables of `rank_type` that apply to `field`.
///
/// A later setting replaces an earlier one. `Default` only drops what was
/// there: the backend already uses those tables.
pub fn apply_rank_type(
    settings: &mut FieldRankSettings,
    field: &str,
    rank_type: RankType,
    attributes: &AttributeFields,
) -> Result<()> {
    if rank_type == RankType::Default {
        settings.tables.clear();
        return Ok(());
    }
    let values = table_values(rank_type).ok_or_else(|| Error::UnsupportedRankType {
        rank_type,
        field: field.to_string(),
    })?;
    let kind = if attributes.is_attribute(field) {
        FieldKind::Attribute
    } else {
        FieldKind::Index
    };

    settings.tables.clear();
    for (table, value) in TABLES.iter().zip(values) {
        if table.applies_to == kind {
            settings.tables.push(Property::new(
                keys::native_table(table.feature, table.table, field),
                *value,
            ));
        }
    }
    Ok(())
}

/// Emit per-field properties in field order.
pub fn field_properties(fields: &IndexMap<String, FieldRankSettings>) -> Vec<Property> {
    let mut properties = Vec::new();
    for (field, settings) in fields {
        if let Some(weight) = settings.weight {
            properties.push(Property::new(keys::field_weight(field), weight.to_string()));
        }
        if settings.filter {
            properties.push(Property::new(keys::is_filter_field(field), "true"));
        }
        properties.extend(settings.tables.iter().cloned());
    }
    properties
}
