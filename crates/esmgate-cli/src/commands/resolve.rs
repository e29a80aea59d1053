use super::parse_spec;
use esmgate_core::{
    BuildId, BuildOptions, Config, PackageIdentity, Resolution, ResolutionService, ResolvedModule,
};
use miette::{miette, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// One line of `esmgate resolve` output.
#[derive(Serialize)]
struct ResolveOutput {
    spec: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    build_id: Option<BuildId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_css: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    module: Option<ResolvedModule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ResolveOutput {
    fn resolved(spec: &str, resolution: Resolution) -> Self {
        Self {
            spec: spec.to_string(),
            ok: true,
            build_id: Some(resolution.build_id),
            cached: Some(resolution.cached),
            has_css: Some(resolution.has_css),
            module: Some(resolution.module),
            error: None,
        }
    }

    fn failed(spec: &str, error: impl std::fmt::Display) -> Self {
        Self {
            spec: spec.to_string(),
            ok: false,
            build_id: None,
            cached: None,
            has_css: None,
            module: None,
            error: Some(error.to_string()),
        }
    }
}

/// Resolve every spec in parallel and print the results in argument order.
pub fn run(
    config: &Config,
    specs: &[String],
    dev: bool,
    check_exports: bool,
    json: bool,
) -> Result<()> {
    let identities = specs
        .iter()
        .map(|spec| parse_spec(spec))
        .collect::<Result<Vec<PackageIdentity>>>()?;

    if config.cache_enabled() {
        debug!("resolution cache enabled");
    }
    let service = ResolutionService::from_config(config);
    let options = BuildOptions::new(config.target.clone(), dev);

    let outputs: Vec<ResolveOutput> = specs
        .par_iter()
        .zip(identities.par_iter())
        .map(|(spec, identity)| {
            let result = if check_exports {
                service.resolve(&config.cwd, identity, &options)
            } else {
                service
                    .resolver()
                    .resolve_module(&config.cwd, identity, false, dev)
                    .map(|module| Resolution {
                        build_id: BuildId::derive(identity, &options),
                        module,
                        has_css: false,
                        cached: false,
                    })
            };
            match result {
                Ok(resolution) => ResolveOutput::resolved(spec, resolution),
                Err(e) => ResolveOutput::failed(spec, e),
            }
        })
        .collect();

    let failed = outputs.iter().filter(|o| !o.ok).count();
    info!(total = outputs.len(), failed, "resolve finished");

    if json {
        let out = serde_json::to_string_pretty(&outputs).map_err(|e| miette!("{e}"))?;
        println!("{out}");
    } else {
        for output in &outputs {
            print_human(output);
        }
    }

    if failed > 0 {
        return Err(miette!("{failed} of {} package(s) failed to resolve", outputs.len()));
    }
    Ok(())
}

fn print_human(output: &ResolveOutput) {
    let (Some(module), Some(build_id)) = (&output.module, &output.build_id) else {
        println!(
            "{}: error: {}",
            output.spec,
            output.error.as_deref().unwrap_or("unknown error")
        );
        return;
    };

    let kind = if module.is_cjs() { "cjs" } else { "esm" };
    let cached = if output.cached == Some(true) { " (cached)" } else { "" };
    println!("{} -> {}{cached}", output.spec, build_id);
    println!("  kind:    {kind}");
    println!("  entry:   {}", module.entry());
    println!("  default: {}", module.export_default);
    if !module.exports.is_empty() {
        println!("  exports: {}", module.exports.join(", "));
    }
    if !module.manifest.types.is_empty() {
        println!("  types:   {}", module.manifest.types);
    }
}
