//! Dependency-ordered compilation of all profiles of a schema.

mod assets;
mod ctx;
mod list;
mod scheduler;


pub use ctx::DeriveCtx;
pub use list::RankProfileList;
pub use scheduler::compile_all;
