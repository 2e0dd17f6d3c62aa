use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use rand::distr::Alphanumeric;

const SESSION_FILE_NAME: &str = "session_id";
const SESSION_SUFFIX_LEN: usize = 9;

fn session_path() -> Option<PathBuf> {
    Some(
        glib::user_config_dir()
            .join("evermore")
            .join(SESSION_FILE_NAME),
    )
}

fn synthesize_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("session_{}_{}", millis, suffix)
}

fn load_session_id(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

fn get_or_create_at(path: &Path) -> String {
    if let Some(id) = load_session_id(path) {
        return id;
    }
    let id = synthesize_session_id();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    // Best-effort persist. If the write fails the id is simply regenerated
    // next launch; the experience stays usable either way.
    if let Err(err) = fs::write(path, &id) {
        tracing::warn!("could not persist session id: {err}");
    }
    id
}

/// Returns the stable per-install session id, creating and persisting it on
/// first use.
pub fn get_or_create_session_id() -> String {
    match session_path() {
        Some(path) => get_or_create_at(&path),
        None => synthesize_session_id(),
    }
}
