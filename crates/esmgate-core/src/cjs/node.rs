use super::{CjsAnalysis, CjsAnalyzer, NodeEnv, ESM_IN_CJS_DIAGNOSTIC};
use crate::error::{Error, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long a single analysis may run before the subprocess is killed.
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Script run with `node -e <script> <import path>` from the working directory.
///
/// Anything the module prints is sent to stderr; stdout carries exactly one
/// JSON object `{ exports, error }`, after which the process exits even if
/// the module left timers or handles open.
const ANALYZE_SCRIPT: &str = r#"
const { createRequire } = require("module");
const path = require("path");
const ESM_DIAGNOSTIC = "__ESM_DIAGNOSTIC__";
const specifier = process.argv[1];
const writeResult = process.stdout.write.bind(process.stdout);
process.stdout.write = (chunk, encoding, cb) => process.stderr.write(chunk, encoding, cb);
console.log = console.info = console.debug = console.error;
const out = { exports: [], error: "" };
try {
  const req = createRequire(path.join(process.cwd(), "__esmgate__.js"));
  const mod = req(specifier);
  if (mod && mod[Symbol.toStringTag] === "Module") {
    out.error = ESM_DIAGNOSTIC;
  } else if (mod !== null && (typeof mod === "object" || typeof mod === "function")) {
    out.exports = Object.keys(mod).filter((k) => k !== "__esModule");
  }
} catch (err) {
  const message = String((err && err.message) || err);
  const esmSyntax =
    (err && err.code === "ERR_REQUIRE_ESM") ||
    (err instanceof SyntaxError &&
      /Unexpected token 'export'|Cannot use import statement outside a module|import\.meta/.test(message));
  out.error = esmSyntax ? ESM_DIAGNOSTIC + ": " + message : message;
}
writeResult(JSON.stringify(out), () => process.exit(0));
"#;

/// [`CjsAnalyzer`] that loads the module in a Node.js subprocess.
#[derive(Debug, Clone)]
pub struct NodeCjsAnalyzer {
    node_bin: PathBuf,
    timeout: Duration,
}

impl Default for NodeCjsAnalyzer {
    fn default() -> Self {
        Self::new("node")
    }
}

impl NodeCjsAnalyzer {
    #[must_use]
    pub fn new(node_bin: impl Into<PathBuf>) -> Self {
        Self {
            node_bin: node_bin.into(),
            timeout: DEFAULT_ANALYSIS_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wait for `child`, killing it once the timeout elapses.
    ///
    /// Returns `None` on timeout.
    fn wait(&self, child: &mut Child) -> Result<Option<ExitStatus>> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(Some(status)),
                Ok(None) if Instant::now() >= deadline => {
                    if let Err(e) = child.kill() {
                        warn!(error = %e, "failed to kill CJS analysis process");
                    }
                    let _ = child.wait();
                    return Ok(None);
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    return Err(Error::CjsAnalysis(format!(
                        "failed to wait for {}: {e}",
                        self.node_bin.display()
                    )))
                }
            }
        }
    }
}

/// Drain a child pipe on its own thread so a full pipe never blocks the child.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

impl CjsAnalyzer for NodeCjsAnalyzer {
    fn analyze(&self, wd: &Path, import_path: &str, env: NodeEnv) -> Result<CjsAnalysis> {
        let script = ANALYZE_SCRIPT.replace("__ESM_DIAGNOSTIC__", ESM_IN_CJS_DIAGNOSTIC);
        debug!(import_path, env = env.as_str(), "running CJS analysis");

        let mut child = Command::new(&self.node_bin)
            .arg("-e")
            .arg(script)
            .arg(import_path)
            .current_dir(wd)
            .env("NODE_ENV", env.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::CjsAnalysis(format!("failed to spawn {}: {e}", self.node_bin.display()))
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let Some(status) = self.wait(&mut child)? else {
            return Err(Error::CjsAnalysis(format!(
                "timed out after {}ms loading {import_path}",
                self.timeout.as_millis()
            )));
        };

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(Error::CjsAnalysis(format!(
                "{} exited with {}: {}",
                self.node_bin.display(),
                status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&stdout);
        serde_json::from_str(stdout.trim())
            .map_err(|e| Error::CjsAnalysis(format!("invalid analysis output: {e}")))
    }
}
