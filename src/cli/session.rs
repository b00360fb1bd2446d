use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::client::ClientError;
use crate::auth::looks_like_jwt;

const SESSION_FILE: &str = "session.json";

/// What the CLI remembers between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
}

pub fn config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("PANEL_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("student-panel").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

impl Session {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_dir()?)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&config_dir()?)
    }

    /// A missing or unreadable file is an empty session. A stored token that
    /// is not shaped like a JWT is dropped along with the user.
    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let file = dir.join(SESSION_FILE);
        if !file.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&file)?;
        let mut session: Session = match serde_json::from_str(&content) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session file {}: {}", file.display(), e);
                return Ok(Self::default());
            }
        };

        if session.token.as_deref().is_some_and(|t| !looks_like_jwt(t)) {
            tracing::warn!("Discarding malformed stored token");
            session.clear();
        }

        Ok(session)
    }

    pub fn save_to(&self, dir: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(dir)?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(SESSION_FILE), content)?;
        Ok(())
    }

    /// Forgets the credentials; the API URL stays.
    pub fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Clears the stored credentials in `dir` when `error` is the server turning
/// the token down with a 401. Returns whether anything was cleared.
pub fn forget_rejected_token(dir: &Path, error: &anyhow::Error) -> anyhow::Result<bool> {
    let rejected = error
        .downcast_ref::<ClientError>()
        .is_some_and(ClientError::is_unauthorized);
    if !rejected {
        return Ok(false);
    }

    let mut session = Session::load_from(dir)?;
    if !session.is_authenticated() {
        return Ok(false);
    }
    session.clear();
    session.save_to(dir)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.eyJ1c2VySWQiOiJ1In0.c2ln";

    #[test]
    fn missing_file_is_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Session::load_from(dir.path()).unwrap(), Session::default());
    }

    #[test]
    fn saved_session_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session {
            api_url: Some("http://localhost:5000/api".into()),
            token: Some(TOKEN.into()),
            user: Some(json!({"id": "u", "role": "super_admin"})),
        };
        session.save_to(dir.path()).unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(dir.path().join(SESSION_FILE)).unwrap()).unwrap();
        assert_eq!(raw["apiUrl"], "http://localhost:5000/api");

        assert_eq!(Session::load_from(dir.path()).unwrap(), session);
    }

    #[test]
    fn malformed_token_is_dropped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SESSION_FILE),
            r#"{"apiUrl": "http://x/api", "token": "undefined", "user": {"id": "u"}}"#,
        )
        .unwrap();

        let session = Session::load_from(dir.path()).unwrap();
        assert_eq!(session.api_url.as_deref(), Some("http://x/api"));
        assert!(session.token.is_none());
        assert!(session.user.is_none());
    }

    #[test]
    fn garbage_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SESSION_FILE), "not json").unwrap();
        assert_eq!(Session::load_from(dir.path()).unwrap(), Session::default());
    }

    fn logged_in(dir: &Path) -> Session {
        let session = Session {
            api_url: Some("http://localhost:5000/api".into()),
            token: Some(TOKEN.into()),
            user: Some(json!({"id": "u"})),
        };
        session.save_to(dir).unwrap();
        session
    }

    fn api_error(status: reqwest::StatusCode) -> anyhow::Error {
        ClientError::Api {
            status,
            message: "nope".into(),
        }
        .into()
    }

    #[test]
    fn unauthorized_response_clears_stored_token() {
        let dir = tempfile::tempdir().unwrap();
        logged_in(dir.path());

        let cleared = forget_rejected_token(dir.path(), &api_error(reqwest::StatusCode::UNAUTHORIZED)).unwrap();
        assert!(cleared);

        let session = Session::load_from(dir.path()).unwrap();
        assert!(session.token.is_none());
        assert!(session.user.is_none());
        assert_eq!(session.api_url.as_deref(), Some("http://localhost:5000/api"));
    }

    #[test]
    fn other_failures_keep_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let saved = logged_in(dir.path());

        let forbidden = api_error(reqwest::StatusCode::FORBIDDEN);
        assert!(!forget_rejected_token(dir.path(), &forbidden).unwrap());
        let unrelated = anyhow::anyhow!("disk full");
        assert!(!forget_rejected_token(dir.path(), &unrelated).unwrap());

        assert_eq!(Session::load_from(dir.path()).unwrap(), saved);
    }

    #[test]
    fn nothing_to_clear_when_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let err = api_error(reqwest::StatusCode::UNAUTHORIZED);
        assert!(!forget_rejected_token(dir.path(), &err).unwrap());
    }
}
