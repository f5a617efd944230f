use crate::RankType;

#[test]
fn names_round_trip() {
    for rank_type in RankType::ALL {
        assert_eq!(RankType::from_name(rank_type.name()), Some(rank_type));
    }
}

#[test]
fn lookup_is_case_insensitive() {
    assert_eq!(RankType::from_name("IDENTITY"), Some(RankType::Identity));
    assert_eq!(RankType::from_name("Tags"), Some(RankType::Tags));
    assert_eq!(RankType::from_name("weight"), None);
}

#[test]
fn deserializes_lowercase() {
    let t: RankType = serde_json::from_str(r#""about""#).unwrap();
    assert_eq!(t, RankType::About);
    assert_eq!(t.to_string(), "about");
}
