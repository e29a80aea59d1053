pub mod build_id;
pub mod lookup;
pub mod resolve;
pub mod version;

use esmgate_core::PackageIdentity;
use miette::{miette, Result};

/// Parse a `name@version[/submodule]` argument.
pub fn parse_spec(spec: &str) -> Result<PackageIdentity> {
    PackageIdentity::parse(spec).map_err(|e| miette!("{e}"))
}
