//! Last submitted filters, kept between runs.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use shared::protocol::ScheduleFilter;
use tracing::debug;

const STATE_FILE: &str = "last_filters.json";

pub fn default_state_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("shipping-schedules").join(STATE_FILE))
}

/// Missing and unreadable files both mean "nothing to restore".
pub fn load_last_filters(path: &Path) -> Option<ScheduleFilter> {
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(filter) => Some(filter),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "ignoring unreadable saved filters");
            None
        }
    }
}

pub fn save_last_filters(path: &Path, filter: &ScheduleFilter) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create state directory '{}'", parent.display())
        })?;
    }
    let raw = serde_json::to_string_pretty(filter)?;
    fs::write(path, raw)
        .with_context(|| format!("failed to write saved filters to '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
