//! Wavefront scheduling.
//!
//! A profile can only be compiled once every parent it inherits from is
//! available, either compiled earlier in this derivation or declared by an
//! ancestor document type. `default` goes first on the calling thread; the
//! rest run in wavefronts of mutually independent profiles on a worker pool,
//! with a barrier between wavefronts.

use rankdef_core::DEFAULT_PROFILE;
use rankdef_properties::RawRankProfile;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, info};

use super::{DeriveCtx, RankProfileList, assets};
use crate::profile::compile_profile;
use crate::{Error, Result};

/// Compile every rank profile of the context's schema.
///
/// Without a schema the result is empty. Any failure aborts the derivation;
/// nothing partial is returned.
pub fn compile_all(ctx: &DeriveCtx<'_>) -> Result<RankProfileList> {
    let mut list = RankProfileList::default();
    let Some(schema) = ctx.schema else {
        return Ok(list);
    };
    let schema_name = schema.name.as_str();

    let threads = ctx.deploy.effective_worker_threads();
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("rankdef-worker-{i}"))
        .build()?;

    let mut remaining = Vec::new();
    for name in ctx.profiles.profile_names(schema_name) {
        if name == DEFAULT_PROFILE {
            debug!(schema = schema_name, wavefront = 0, "compiling default rank profile");
            let default = compile_named(ctx, schema_name, &name)?;
            list.push_wavefront(vec![default]);
        } else {
            remaining.push(name);
        }
    }

    while !remaining.is_empty() {
        let (ready, pending): (Vec<String>, Vec<String>) =
            remaining.into_iter().partition(|name| {
                ctx.profiles
                    .parents(schema_name, name)
                    .iter()
                    .all(|parent| {
                        list.contains(parent)
                            || ctx.profiles.resolvable_in_ancestor(schema_name, parent)
                    })
            });
        if ready.is_empty() {
            return Err(Error::SchedulingDeadlock { pending });
        }

        debug!(
            schema = schema_name,
            wavefront = list.wavefronts().len(),
            profiles = ?ready,
            threads,
            "compiling wavefront"
        );
        let compiled = pool.install(|| {
            ready
                .par_iter()
                .map(|name| {
                    compile_named(ctx, schema_name, name).map_err(|source| Error::TaskFailure {
                        profile: name.clone(),
                        source: Box::new(source),
                    })
                })
                .collect::<Result<Vec<_>>>()
        })?;
        list.push_wavefront(compiled);
        remaining = pending;
    }

    let (constants, models) = assets::aggregate(ctx.schema, list.profiles())?;
    list.set_assets(constants, models);

    info!(
        schema = schema_name,
        profiles = list.len(),
        wavefronts = list.wavefronts().len(),
        constants = list.constants().len(),
        models = list.models().len(),
        "derived rank profiles"
    );
    Ok(list)
}

fn compile_named(ctx: &DeriveCtx<'_>, schema: &str, name: &str) -> Result<RawRankProfile> {
    let profile = ctx.profiles.resolve(schema, name)?;
    compile_profile(ctx, &profile)
}
