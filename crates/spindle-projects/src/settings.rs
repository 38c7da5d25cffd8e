//! Settings-file patching
//!
//! Logging configuration is governed exclusively by the coordinator; any
//! project-local logging directive would fight with the injected values.

use std::path::Path;

use tracing::debug;

use spindle_core::error::Result;

/// Settings keys the coordinator owns
const RESERVED_LOG_KEYS: [&str; 4] = ["LOG_LEVEL =", "LOG_FORMAT =", "LOG_DATEFORMAT =", "LOG_FILE ="];

/// Remove every line that sets one of the reserved logging keys.
///
/// Rewrites the file in place; running it again is a no-op.
pub fn strip_log_directives(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    let kept: Vec<&str> = content
        .lines()
        .filter(|line| !RESERVED_LOG_KEYS.iter().any(|key| line.starts_with(key)))
        .collect();
    let removed = content.lines().count() - kept.len();

    if removed == 0 {
        return Ok(());
    }
    let mut output = kept.join("\n");
    if content.ends_with('\n') {
        output.push('\n');
    }
    std::fs::write(path, output)?;
    debug!(path = %path.display(), removed, "stripped log directives");
    Ok(())
}
