use indexmap::IndexMap;
use rankdef_core::{AttributeFields, RankType};
use rankdef_properties::render;

use crate::Error;
use crate::native::{
    FieldKind, FieldRankSettings, TABLES, apply_rank_type, field_properties, table_values,
};

#[test]
fn every_table_backed_rank_type_defines_all_tables() {
    for rank_type in RankType::ALL {
        if rank_type == RankType::Empty {
            continue;
        }
        let values = table_values(rank_type).unwrap();
        assert!(values.iter().all(|v| !v.is_empty()), "{rank_type}");
    }
}

#[test]
fn empty_rank_type_has_no_tables() {
    assert!(table_values(RankType::Empty).is_none());
}

#[test]
fn one_attribute_table_four_index_tables() {
    let attribute_tables = TABLES
        .iter()
        .filter(|t| t.applies_to == FieldKind::Attribute)
        .count();

    assert_eq!(attribute_tables, 1);
    assert_eq!(TABLES.len() - attribute_tables, 4);
}

#[test]
fn index_field_gets_match_and_proximity_tables() {
    let mut settings = FieldRankSettings::default();

    apply_rank_type(&mut settings, "title", RankType::Identity, &AttributeFields::new()).unwrap();

    insta::assert_snapshot!(render(&settings.tables), @r"
    nativeFieldMatch.firstOccurrenceTable.title = expdecay(100,12.50)
    nativeFieldMatch.occurrenceCountTable.title = loggrowth(1500,4000,19)
    nativeProximity.proximityTable.title = expdecay(5000,3)
    nativeProximity.reverseProximityTable.title = expdecay(3000,3)
    ");
}

#[test]
fn attribute_field_gets_weight_table_only() {
    let attributes = AttributeFields::new().with("tags", "array<string>");
    let mut settings = FieldRankSettings::default();

    apply_rank_type(&mut settings, "tags", RankType::Tags, &attributes).unwrap();

    insta::assert_snapshot!(render(&settings.tables), @"nativeAttributeMatch.weightTable.tags = loggrowth(38,8,1)");
}

#[test]
fn default_rank_type_adds_nothing() {
    let mut settings = FieldRankSettings::default();

    apply_rank_type(&mut settings, "title", RankType::Default, &AttributeFields::new()).unwrap();

    assert!(settings.tables.is_empty());
}

#[test]
fn empty_rank_type_is_unsupported() {
    let mut settings = FieldRankSettings::default();

    let err = apply_rank_type(&mut settings, "body", RankType::Empty, &AttributeFields::new())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::UnsupportedRankType { rank_type: RankType::Empty, field } if field == "body"
    ));
}

#[test]
fn later_rank_type_replaces_earlier() {
    let mut settings = FieldRankSettings::default();
    let attributes = AttributeFields::new();

    apply_rank_type(&mut settings, "title", RankType::Tags, &attributes).unwrap();
    apply_rank_type(&mut settings, "title", RankType::About, &attributes).unwrap();

    assert_eq!(settings.tables.len(), 4);
    assert_eq!(settings.tables[0].value, "expdecay(8000,12.50)");
}

#[test]
fn later_default_drops_earlier_tables() {
    let mut settings = FieldRankSettings::default();
    let attributes = AttributeFields::new();

    apply_rank_type(&mut settings, "title", RankType::Tags, &attributes).unwrap();
    apply_rank_type(&mut settings, "title", RankType::Default, &attributes).unwrap();

    assert!(settings.tables.is_empty());
}

#[test]
fn field_properties_order() {
    let mut fields = IndexMap::new();
    fields.insert(
        "y".to_string(),
        FieldRankSettings {
            weight: Some(200),
            filter: true,
            ..Default::default()
        },
    );
    fields.insert(
        "a".to_string(),
        FieldRankSettings {
            weight: Some(50),
            ..Default::default()
        },
    );

    insta::assert_snapshot!(render(&field_properties(&fields)), @r"
    fieldweight.y = 200
    isfilterfield.y = true
    fieldweight.a = 50
    ");
}
