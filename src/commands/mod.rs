//! Command implementations.

mod args;
mod common;
mod next;
mod release;

pub use args::{
    PublishArgs,
    RepoArgs,
    VersionArgs,
};
pub use common::{
    Resolution,
    resolve_from_source,
};
pub use next::{
    NextArgs,
    next,
};
pub use release::{
    ReleaseArgs,
    ReleaseRun,
    release,
    run_release,
};
