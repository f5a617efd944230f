use rankdef_core::{ModelDef, RankProfileDef};

use super::{SerializationContext, expand_features, rewrite_models};
use crate::Error;
use crate::test_utils::{Fixture, function, inline_function, resolve, schema};

fn features(def: RankProfileDef) -> (super::ExpandedFeatures, Vec<String>) {
    let fixture = Fixture::new(schema(vec![]));
    let profile = resolve(def);
    let mut ctx = SerializationContext::new(&profile, fixture.types());
    let expanded = expand_features(&mut ctx, &profile).unwrap();
    let serialized = ctx.functions().keys().cloned().collect();
    (expanded, serialized)
}

#[test]
fn plain_features_pass_through() {
    let def = RankProfileDef {
        summary_features: vec!["fieldMatch(title).completeness".into(), "nativeRank".into()],
        ..RankProfileDef::new("p")
    };

    let (expanded, serialized) = features(def);

    assert_eq!(
        expanded.summary,
        vec!["fieldMatch(title).completeness", "nativeRank"]
    );
    assert!(expanded.renames.is_empty());
    assert!(serialized.is_empty());
}

#[test]
fn function_features_are_serialized_and_renamed() {
    let def = RankProfileDef {
        functions: vec![function("f", &[], "attribute(a) + 1")],
        summary_features: vec!["f".into(), "attribute(b)".into()],
        match_features: vec!["f".into()],
        ..RankProfileDef::new("p")
    };

    let (expanded, serialized) = features(def);

    assert_eq!(expanded.summary, vec!["expressionRef(f)", "attribute(b)"]);
    assert_eq!(expanded.matched, vec!["expressionRef(f)"]);
    assert_eq!(expanded.renames.len(), 1);
    assert_eq!(expanded.renames["f"], "expressionRef(f)");
    assert_eq!(serialized, vec!["f"]);
}

#[test]
fn inline_function_features_stay_out_of_line() {
    let def = RankProfileDef {
        functions: vec![inline_function("g", &[], "2 * attribute(a)")],
        rank_features: vec!["g".into()],
        ..RankProfileDef::new("p")
    };

    let (expanded, serialized) = features(def);

    assert_eq!(expanded.rank, vec!["expressionRef(g)"]);
    assert_eq!(serialized, vec!["g"]);
}

#[test]
fn feature_with_arguments_uses_bound_instance() {
    let def = RankProfileDef {
        functions: vec![function("h", &["x"], "attribute(x)")],
        hidden_match_features: vec!["h(year)".into()],
        ..RankProfileDef::new("p")
    };
    let instance = format!("h@{:08x}", crc32fast::hash(b"year"));

    let (expanded, _) = features(def);

    assert_eq!(expanded.hidden_matched, vec![format!("expressionRef({instance})")]);
    assert_eq!(expanded.renames["h(year)"], format!("expressionRef({instance})"));
}

#[test]
fn onnx_model_feature_is_renamed() {
    let def = RankProfileDef {
        summary_features: vec!["onnxModel(ranker).score".into()],
        ..RankProfileDef::new("p")
    };

    let (expanded, _) = features(def);

    assert_eq!(expanded.summary, vec!["onnx(ranker).score"]);
    assert_eq!(expanded.renames["onnxModel(ranker).score"], "onnx(ranker).score");
}

#[test]
fn model_inputs_naming_functions_are_rewritten() {
    let def = RankProfileDef {
        functions: vec![function("tokens", &[], "query(t)")],
        models: vec![
            ModelDef::new("ranker", "models/ranker.onnx")
                .with_input("input_ids", "tokens")
                .with_input("mask", "attribute(mask)"),
        ],
        ..RankProfileDef::new("p")
    };
    let fixture = Fixture::new(schema(vec![]));
    let profile = resolve(def);
    let mut ctx = SerializationContext::new(&profile, fixture.types());

    let models = rewrite_models(&mut ctx, &[], &profile).unwrap();

    assert_eq!(models[0].inputs["input_ids"], "expressionRef(tokens)");
    assert_eq!(models[0].inputs["mask"], "attribute(mask)");
    assert!(ctx.is_serialized("tokens"));
}

#[test]
fn unparsable_model_input_is_an_error() {
    let def = RankProfileDef {
        models: vec![ModelDef::new("m", "m.onnx").with_input("x", "attribute(")],
        ..RankProfileDef::new("p")
    };
    let fixture = Fixture::new(schema(vec![]));
    let profile = resolve(def);
    let mut ctx = SerializationContext::new(&profile, fixture.types());

    let err = rewrite_models(&mut ctx, &[], &profile).unwrap_err();

    assert!(matches!(err, Error::ExpressionParse { context, .. } if context == "input 'x' of model 'm'"));
}

#[test]
fn schema_models_are_rewritten_and_overridable() {
    let def = RankProfileDef {
        functions: vec![inline_function("f", &[], "attribute(a) * 2")],
        models: vec![ModelDef::new("own", "own.onnx").with_input("x", "attribute(b)")],
        ..RankProfileDef::new("p")
    };
    let schema_models = [
        ModelDef::new("shared", "shared.onnx").with_input("x", "f"),
        ModelDef::new("own", "old.onnx"),
    ];
    let fixture = Fixture::new(schema(vec![]));
    let profile = resolve(def);
    let mut ctx = SerializationContext::new(&profile, fixture.types());

    let models = rewrite_models(&mut ctx, &schema_models, &profile).unwrap();

    assert_eq!(models.len(), 2);
    assert_eq!(models[0].inputs["x"], "expressionRef(f)");
    assert_eq!(models[1].path, "own.onnx");
    assert!(ctx.is_serialized("f"));
}
