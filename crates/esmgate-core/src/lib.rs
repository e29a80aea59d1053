#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod cache;
pub mod cjs;
pub mod classify;
pub mod config;
pub mod error;
pub mod package;
pub mod paths;
pub mod resolve;
pub mod service;
pub mod store;
pub mod version;

pub use cache::{CachedResolution, ResolutionCache};
pub use cjs::{CjsAnalysis, CjsAnalyzer, NodeCjsAnalyzer, NodeEnv};
pub use classify::{check_esm, EsmCheck, SourceParser, SwcParser};
pub use config::Config;
pub use error::{Error, Result};
pub use package::{BuildId, BuildOptions, NormalizedManifest, PackageIdentity};
pub use resolve::{ModuleResolver, ResolvedModule};
pub use service::{Resolution, ResolutionService};
pub use store::{
    ArtifactStore, FsArtifactStore, FsMetadataStore, MemoryArtifactStore, MemoryMetadataStore,
    MetadataStore, StoreRecord,
};
pub use version::VERSION;
