use super::StoredSession;
use std::io;
use std::path::{Path, PathBuf};

/// JSON file holding the signed-in session between launches.
pub(super) struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub(super) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The saved session. A missing or unreadable file means nobody is signed in.
    pub(super) fn load(&self) -> Option<StoredSession> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }

    /// Write `session`, or remove the file when signed out. Failures are
    /// logged; the in-memory session stays authoritative.
    pub(super) fn save(&self, session: Option<&StoredSession>) {
        let result = match session {
            Some(session) => write_json(&self.path, session),
            None => match std::fs::remove_file(&self.path) {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to update session file");
        }
    }
}

fn write_json(path: &Path, session: &StoredSession) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string(session).map_err(io::Error::other)?;
    std::fs::write(path, json)
}
