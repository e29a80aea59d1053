use super::parse_spec;
use esmgate_core::{BuildId, BuildOptions};
use miette::Result;

pub fn run(spec: &str, target: &str, dev: bool, json: bool) -> Result<()> {
    let identity = parse_spec(spec)?;
    let id = BuildId::derive(&identity, &BuildOptions::new(target, dev));

    if json {
        let out = serde_json::json!({
            "spec": spec,
            "build_id": id,
            "artifact": id.artifact_path(),
        });
        println!("{out}");
    } else {
        println!("{id}");
    }
    Ok(())
}
