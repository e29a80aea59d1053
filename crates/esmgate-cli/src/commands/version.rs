use esmgate_core::version::{version_string, SCHEMA_VERSION};
use esmgate_core::VERSION;
use miette::Result;

pub fn run(json: bool) -> Result<()> {
    if json {
        let out = serde_json::json!({
            "version": VERSION,
            "schema_version": SCHEMA_VERSION,
        });
        println!("{out}");
    } else {
        println!("{}", version_string());
    }
    Ok(())
}
