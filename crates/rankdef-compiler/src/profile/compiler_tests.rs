use rankdef_core::{
    ConstantDef, DeployProperties, DiversityDef, InputDef, MatchPhaseDef, RankProfileDef,
    RankSetting, RankSettingDef, RankType, TuningDef, ValueType,
};
use rankdef_properties::{Property, keys, render};

use super::{CompiledRankProfile, MAX_PROPERTIES, compile_profile};
use crate::registry::ProfileRegistry;
use crate::test_utils::{
    Fixture, SCHEMA, function, inline_function, keys as keys_of, schema, tensor, value,
};
use crate::{Error, Result};

fn compile(fixture: &Fixture, name: &str) -> Result<Vec<Property>> {
    let profile = fixture.registry.resolve(SCHEMA, name)?;
    let raw = compile_profile(&fixture.ctx(), &profile)?;
    Ok(raw.properties()?)
}

fn single(def: RankProfileDef) -> Fixture {
    Fixture::new(schema(vec![def]))
}

#[test]
fn bare_phase_is_emitted_directly() {
    let fixture = single(RankProfileDef {
        first_phase: Some("attribute(x)".into()),
        ..RankProfileDef::new("p")
    });

    let properties = compile(&fixture, "p").unwrap();

    assert_eq!(properties, vec![Property::new(keys::FIRST_PHASE, "attribute(x)")]);
}

#[test]
fn full_layout() {
    let def = RankProfileDef {
        first_phase: Some("attribute(x)".into()),
        second_phase: Some("f + 1".into()),
        functions: vec![function("f", &[], "attribute(a) * 2")],
        summary_features: vec!["attribute(b)".into()],
        rank_settings: vec![
            RankSettingDef::new("y", RankSetting::Weight(200)),
            RankSettingDef::new("y", RankSetting::Filter(true)),
        ],
        constants: vec![ConstantDef::value("c", tensor("tensor(x[2])"), "[1,2]")],
        inputs: vec![InputDef {
            name: "q".into(),
            value_type: tensor("tensor(x[2])"),
            default: Some("[0,0]".into()),
        }],
        tuning: TuningDef {
            rerank_count: 100,
            ..TuningDef::default()
        },
        ..RankProfileDef::new("p")
    };
    let fixture = single(def)
        .with_attribute("a", "double")
        .with_attribute("emb", "tensor<float>(x[4])");

    let properties = compile(&fixture, "p").unwrap();

    insta::assert_snapshot!(render(&properties), @r"
    rank.firstphase = attribute(x)
    rank.secondphase = expressionRef(secondphase)
    expressionRef(secondphase).rankingScript = expressionRef(f) + 1
    expressionRef(f).rankingScript = attribute(a) * 2
    expressionRef(f).type = double
    summary.feature = attribute(b)
    fieldweight.y = 200
    isfilterfield.y = true
    hitcollector.heapsize = 100
    constant(c) = [1,2]
    constant(c).type = tensor(x[2])
    type.attribute.emb = tensor<float>(x[4])
    type.query.q = tensor(x[2])
    query(q) = [0,0]
    ");
}

#[test]
fn inline_functions_are_not_serialized() {
    let fixture = single(RankProfileDef {
        first_phase: Some("g(attribute(a)) + 1".into()),
        functions: vec![inline_function("g", &["v"], "v * 2")],
        ..RankProfileDef::new("p")
    });

    let properties = compile(&fixture, "p").unwrap();

    assert_eq!(
        value(&properties, &keys::ranking_script("firstphase")),
        "(attribute(a) * 2) + 1"
    );
    assert!(!keys_of(&properties).contains(&keys::function_type("g").as_str()));
}

#[test]
fn bound_instance_and_declared_function_both_emitted() {
    let mut g = function("g", &["v"], "v * attribute(a)");
    g.arguments[0].value_type = Some(ValueType::double());
    let fixture = single(RankProfileDef {
        first_phase: Some("g(attribute(b))".into()),
        functions: vec![g],
        ..RankProfileDef::new("p")
    });

    let properties = compile(&fixture, "p").unwrap();

    let phase = value(&properties, keys::FIRST_PHASE);
    assert!(phase.starts_with("expressionRef(g@"), "{phase}");
    let instance = phase
        .strip_prefix("expressionRef(")
        .and_then(|s| s.strip_suffix(')'))
        .unwrap();
    assert_eq!(
        value(&properties, &keys::ranking_script(instance)),
        "attribute(b) * attribute(a)"
    );
    assert_eq!(value(&properties, &keys::ranking_script("g")), "v * attribute(a)");
    assert_eq!(value(&properties, &keys::argument_type("g", "v")), "double");
    assert_eq!(value(&properties, &keys::function_type("g")), "double");
}

#[test]
fn function_features_are_renamed() {
    let fixture = single(RankProfileDef {
        functions: vec![function("f", &[], "attribute(a)")],
        summary_features: vec!["f".into()],
        ignore_default_rank_features: true,
        ..RankProfileDef::new("p")
    });

    let properties = compile(&fixture, "p").unwrap();

    insta::assert_snapshot!(render(&properties), @r"
    expressionRef(f).rankingScript = attribute(a)
    expressionRef(f).type = double
    summary.feature = expressionRef(f)
    dump.ignoredefaultfeatures = true
    feature.rename = f
    feature.rename = expressionRef(f)
    ");
}

#[test]
fn native_tables_follow_field_kind() {
    let fixture = single(RankProfileDef {
        rank_settings: vec![
            RankSettingDef::new("title", RankSetting::RankType(RankType::Identity)),
            RankSettingDef::new("tags", RankSetting::RankType(RankType::Tags)),
            RankSettingDef::new("body", RankSetting::RankType(RankType::Default)),
        ],
        ..RankProfileDef::new("p")
    })
    .with_attribute("tags", "double");

    let properties = compile(&fixture, "p").unwrap();

    insta::assert_snapshot!(render(&properties), @r"
    nativeFieldMatch.firstOccurrenceTable.title = expdecay(100,12.50)
    nativeFieldMatch.occurrenceCountTable.title = loggrowth(1500,4000,19)
    nativeProximity.proximityTable.title = expdecay(5000,3)
    nativeProximity.reverseProximityTable.title = expdecay(3000,3)
    nativeAttributeMatch.weightTable.tags = loggrowth(38,8,1)
    ");
}

#[test]
fn rank_type_without_tables_is_fatal() {
    let fixture = single(RankProfileDef {
        rank_settings: vec![RankSettingDef::new("title", RankSetting::RankType(RankType::Empty))],
        ..RankProfileDef::new("p")
    });

    let err = compile(&fixture, "p").unwrap_err();

    assert!(matches!(
        err,
        Error::UnsupportedRankType { rank_type: RankType::Empty, ref field } if field == "title"
    ));
}

#[test]
fn tuning_knobs_in_fixed_order() {
    let fixture = single(RankProfileDef {
        tuning: TuningDef {
            global_phase_rerank_count: 50,
            keep_rank_count: 1000,
            termwise_limit: Some(0.5),
            num_threads_per_search: 4,
            match_phase: Some(MatchPhaseDef {
                attribute: "popularity".into(),
                ascending: false,
                max_hits: 1000,
                max_filter_coverage: 0.2,
            }),
            diversity: Some(DiversityDef {
                attribute: "category".into(),
                min_groups: 10,
                cutoff_factor: 10.0,
                cutoff_strategy: "loose".into(),
            }),
            ..TuningDef::default()
        },
        ..RankProfileDef::new("p")
    });

    let properties = compile(&fixture, "p").unwrap();

    insta::assert_snapshot!(render(&properties), @r"
    matching.termwise_limit = 0.5
    matching.numthreadspersearch = 4
    matchphase.degradation.attribute = popularity
    matchphase.degradation.ascendingorder = false
    matchphase.degradation.maxhits = 1000
    matchphase.degradation.maxfiltercoverage = 0.2
    matchphase.diversity.attribute = category
    matchphase.diversity.mingroups = 10
    matchphase.diversity.cutoff.factor = 10
    matchphase.diversity.cutoff.strategy = loose
    hitcollector.arraysize = 1000
    globalphase.rerankcount = 50
    ");
}

#[test]
fn scalar_inputs_keep_their_default() {
    let fixture = single(RankProfileDef {
        inputs: vec![InputDef {
            name: "w".into(),
            value_type: ValueType::double(),
            default: Some("0.5".into()),
        }],
        ..RankProfileDef::new("p")
    });

    let properties = compile(&fixture, "p").unwrap();

    assert_eq!(properties, vec![Property::new("query(w)", "0.5")]);
}

#[test]
fn profile_constant_overrides_schema_constant() {
    let mut doc = schema(vec![RankProfileDef {
        constants: vec![ConstantDef::value("c", ValueType::double(), "2")],
        ..RankProfileDef::new("p")
    }]);
    doc.constants = vec![
        ConstantDef::value("c", ValueType::double(), "1"),
        ConstantDef::value("k", ValueType::double(), "3"),
        ConstantDef::file("t", tensor("tensor(x[10])"), "t.json"),
    ];
    let fixture = Fixture::new(doc);

    let properties = compile(&fixture, "p").unwrap();

    insta::assert_snapshot!(render(&properties), @r"
    constant(c) = 2
    constant(c).type = double
    constant(k) = 3
    constant(k).type = double
    ");
}

#[test]
fn deploy_flags_come_last() {
    let fixture = single(RankProfileDef {
        first_phase: Some("nativeRank".into()),
        ..RankProfileDef::new("p")
    })
    .with_deploy(
        DeployProperties::new()
            .with_sort_blueprints_by_cost(true)
            .with_always_mark_phrase_expensive(true),
    );

    let properties = compile(&fixture, "p").unwrap();

    assert_eq!(
        keys_of(&properties),
        vec![
            keys::FIRST_PHASE,
            keys::SORT_BLUEPRINTS_BY_COST,
            keys::ALWAYS_MARK_PHRASE_EXPENSIVE,
        ]
    );
}

#[test]
fn large_function_is_externalized_once() {
    let body = "attribute(a) + attribute(b) + attribute(c) + attribute(d)";
    let fixture = single(RankProfileDef {
        first_phase: Some("f".into()),
        second_phase: Some("f * 2".into()),
        functions: vec![function("f", &[], body)],
        ..RankProfileDef::new("p")
    })
    .with_deploy(DeployProperties::new().with_large_rank_expression_limit(32));

    let properties = compile(&fixture, "p").unwrap();

    assert_eq!(value(&properties, keys::FIRST_PHASE), "expressionRef(f)");
    assert_eq!(value(&properties, &keys::expression_name("f")), "p.f");
    assert!(!keys_of(&properties).contains(&keys::ranking_script("f").as_str()));
    assert_eq!(fixture.files.registrations("p.f"), 1);
    assert_eq!(fixture.files.blob("p.f").unwrap(), body.as_bytes());
}

#[test]
fn recompiling_gives_identical_blob() {
    let fixture = single(RankProfileDef {
        first_phase: Some("f(attribute(a)) + g".into()),
        functions: vec![
            function("f", &["x"], "x * 2"),
            function("g", &[], "attribute(b)"),
        ],
        summary_features: vec!["g".into(), "nativeRank".into()],
        ..RankProfileDef::new("p")
    });
    let profile = fixture.registry.resolve(SCHEMA, "p").unwrap();

    let first = compile_profile(&fixture.ctx(), &profile).unwrap();
    let second = compile_profile(&fixture.ctx(), &profile).unwrap();

    assert_eq!(first.compressed(), second.compressed());
}

#[test]
fn recursive_function_is_fatal() {
    let fixture = single(RankProfileDef {
        first_phase: Some("f".into()),
        functions: vec![function("f", &[], "g + 1"), function("g", &[], "f * 2")],
        ..RankProfileDef::new("p")
    });

    let err = compile(&fixture, "p").unwrap_err();

    assert!(matches!(err, Error::RecursiveFunction { .. }), "{err}");
}

#[test]
fn too_many_properties_overflow() {
    let profile = CompiledRankProfile {
        summary_features: (0..MAX_PROPERTIES + 1)
            .map(|i| format!("attribute(f{i})"))
            .collect(),
        ..CompiledRankProfile::new("big")
    };
    let fixture = Fixture::default();

    let err = compile_profile(&fixture.ctx(), &profile).unwrap_err();

    assert!(matches!(
        err,
        Error::PropertyOverflow { ref profile, count, limit }
            if profile == "big" && count == MAX_PROPERTIES + 1 && limit == MAX_PROPERTIES
    ));
}

#[test]
fn reserved_character_in_constant_is_rejected() {
    let fixture = single(RankProfileDef {
        constants: vec![ConstantDef::value("c", ValueType::double(), "1\u{1e}2")],
        ..RankProfileDef::new("p")
    });

    let err = compile(&fixture, "p").unwrap_err();

    assert!(
        matches!(err, Error::ReservedCharacter { ref profile, ref key } if profile == "p" && key == "constant(c)"),
        "{err}"
    );
}
