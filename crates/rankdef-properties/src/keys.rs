//! Property key vocabulary.
//!
//! Every key the backend reads is spelled here. The forms are a stable
//! contract with the serving node and must not change spelling.

pub const FIRST_PHASE: &str = "rank.firstphase";
pub const SECOND_PHASE: &str = "rank.secondphase";
pub const GLOBAL_PHASE: &str = "rank.globalphase";

pub const SUMMARY_FEATURE: &str = "summary.feature";
pub const MATCH_FEATURE: &str = "match.feature";
pub const HIDDEN_MATCH_FEATURE: &str = "hidden.matchfeature";
pub const DUMP_FEATURE: &str = "dump.feature";
pub const DUMP_IGNORE_DEFAULT_FEATURES: &str = "dump.ignoredefaultfeatures";
pub const FEATURE_RENAME: &str = "feature.rename";

pub const TERMWISE_LIMIT: &str = "matching.termwise_limit";
pub const NUM_THREADS_PER_SEARCH: &str = "matching.numthreadspersearch";
pub const MIN_HITS_PER_THREAD: &str = "matching.minhitsperthread";
pub const NUM_SEARCH_PARTITIONS: &str = "matching.numsearchpartitions";
pub const GLOBAL_FILTER_UPPER_LIMIT: &str = "matching.global_filter.upper_limit";
pub const GLOBAL_FILTER_LOWER_LIMIT: &str = "matching.global_filter.lower_limit";
pub const TARGET_HITS_MAX_ADJUSTMENT_FACTOR: &str =
    "matching.global_filter.target_hits_max_adjustment_factor";
pub const SORT_BLUEPRINTS_BY_COST: &str = "matching.sort_blueprints_by_cost";
pub const ALWAYS_MARK_PHRASE_EXPENSIVE: &str = "matching.always_mark_phrase_expensive";

pub const MATCH_PHASE_ATTRIBUTE: &str = "matchphase.degradation.attribute";
pub const MATCH_PHASE_ASCENDING: &str = "matchphase.degradation.ascendingorder";
pub const MATCH_PHASE_MAX_HITS: &str = "matchphase.degradation.maxhits";
pub const MATCH_PHASE_MAX_FILTER_COVERAGE: &str = "matchphase.degradation.maxfiltercoverage";
pub const DIVERSITY_ATTRIBUTE: &str = "matchphase.diversity.attribute";
pub const DIVERSITY_MIN_GROUPS: &str = "matchphase.diversity.mingroups";
pub const DIVERSITY_CUTOFF_FACTOR: &str = "matchphase.diversity.cutoff.factor";
pub const DIVERSITY_CUTOFF_STRATEGY: &str = "matchphase.diversity.cutoff.strategy";

pub const HEAP_SIZE: &str = "hitcollector.heapsize";
pub const ARRAY_SIZE: &str = "hitcollector.arraysize";
pub const RANK_SCORE_DROP_LIMIT: &str = "hitcollector.rankscoredroplimit";
pub const SECOND_PHASE_RANK_SCORE_DROP_LIMIT: &str = "hitcollector.secondphase.rankscoredroplimit";
pub const GLOBAL_PHASE_RERANK_COUNT: &str = "globalphase.rerankcount";

const EXPRESSION_REF: &str = "expressionRef";
const RANKING_SCRIPT: &str = ".rankingScript";
const EXPRESSION_NAME: &str = ".expressionName";

/// Backend name of a serialized function: `expressionRef(name)`.
pub fn expression_ref(name: &str) -> String {
    format!("{EXPRESSION_REF}({name})")
}

/// Key holding the serialized body of `name`.
pub fn ranking_script(name: &str) -> String {
    format!("{EXPRESSION_REF}({name}){RANKING_SCRIPT}")
}

/// Key pointing at an externalized body of `name`.
pub fn expression_name(name: &str) -> String {
    format!("{EXPRESSION_REF}({name}){EXPRESSION_NAME}")
}

pub fn function_type(name: &str) -> String {
    format!("{EXPRESSION_REF}({name}).type")
}

pub fn argument_type(function: &str, argument: &str) -> String {
    format!("{EXPRESSION_REF}({function}).arg.{argument}.type")
}

/// Function name encoded in a [`ranking_script`] key.
pub fn function_of_ranking_script(key: &str) -> Option<&str> {
    key.strip_prefix(EXPRESSION_REF)?
        .strip_prefix('(')?
        .strip_suffix(RANKING_SCRIPT)?
        .strip_suffix(')')
}

pub fn field_weight(field: &str) -> String {
    format!("fieldweight.{field}")
}

pub fn is_filter_field(field: &str) -> String {
    format!("isfilterfield.{field}")
}

pub fn type_attribute(field: &str) -> String {
    format!("type.attribute.{field}")
}

pub fn type_query(input: &str) -> String {
    format!("type.query.{input}")
}

/// Default value key of a query input: `query(name)`.
pub fn query_default(input: &str) -> String {
    format!("query({input})")
}

pub fn constant(name: &str) -> String {
    format!("constant({name})")
}

pub fn constant_type(name: &str) -> String {
    format!("constant({name}).type")
}

/// Native table key, e.g. `nativeFieldMatch.firstOccurrenceTable.title`.
pub fn native_table(feature: &str, table: &str, field: &str) -> String {
    format!("{feature}.{table}.{field}")
}
