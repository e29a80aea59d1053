//! Cached resolution service.

use crate::cache::ResolutionCache;
use crate::cjs::NodeCjsAnalyzer;
use crate::classify::SwcParser;
use crate::config::Config;
use crate::error::Result;
use crate::package::{BuildId, BuildOptions, PackageIdentity};
use crate::resolve::{ModuleResolver, ResolvedModule};
use crate::store::{FsArtifactStore, FsMetadataStore};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Outcome of [`ResolutionService::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub build_id: BuildId,
    pub module: ResolvedModule,
    pub has_css: bool,
    /// Whether the result came from the cache.
    pub cached: bool,
}

/// Resolver fronted by an optional [`ResolutionCache`].
#[derive(Debug)]
pub struct ResolutionService {
    resolver: ModuleResolver,
    cache: Option<ResolutionCache>,
}

impl ResolutionService {
    #[must_use]
    pub fn new(resolver: ModuleResolver) -> Self {
        Self {
            resolver,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: ResolutionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build a service from config: the swc parser, a Node.js sandbox on
    /// `config.node_bin`, and filesystem stores when both store dirs are set.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let resolver = ModuleResolver::new(
            Arc::new(SwcParser),
            Arc::new(NodeCjsAnalyzer::new(&config.node_bin)),
        );
        let service = Self::new(resolver);
        match (&config.db_dir, &config.storage_dir) {
            (Some(db_dir), Some(storage_dir)) => service.with_cache(ResolutionCache::new(
                Arc::new(FsMetadataStore::new(db_dir)),
                Arc::new(FsArtifactStore::new(storage_dir)),
            )),
            _ => service,
        }
    }

    #[must_use]
    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    /// Resolve `identity` for the given build, consulting the cache first.
    ///
    /// Only successful resolutions are written back.
    pub fn resolve(
        &self,
        wd: &Path,
        identity: &PackageIdentity,
        options: &BuildOptions,
    ) -> Result<Resolution> {
        let build_id = BuildId::derive(identity, options);

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.find_resolution(&build_id)? {
                debug!(build_id = %build_id, "cache hit");
                return Ok(Resolution {
                    build_id,
                    module: hit.module,
                    has_css: hit.has_css,
                    cached: true,
                });
            }
        }

        let module = self
            .resolver
            .resolve_module(wd, identity, true, options.dev)?;

        if let Some(cache) = &self.cache {
            cache.store_resolution(&build_id, &module, false)?;
        }

        Ok(Resolution {
            build_id,
            module,
            has_css: false,
            cached: false,
        })
    }
}
