use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use appstore_client::{ClientConfig, HttpTransport, Session, StoreClient};

use crate::cli::GlobalArgs;

/**
    Client and session shared by every command.
*/
pub struct Context {
    pub client: StoreClient<HttpTransport>,
    pub session: Session,
    session_path: PathBuf,
}

impl Context {
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let config = match &args.config {
            Some(path) => load_config(path)?,
            None => ClientConfig::default(),
        };
        let client = StoreClient::from_config(config).context("failed to create store client")?;
        let session = load_session(&args.session)?;

        Ok(Self {
            client,
            session,
            session_path: args.session.clone(),
        })
    }

    pub fn save(&self) -> Result<()> {
        save_session(&self.session_path, &self.session)
    }
}

pub fn load_config(path: &Path) -> Result<ClientConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

/**
    Read a session file, or start a new session if it does not exist.
*/
pub fn load_session(path: &Path) -> Result<Session> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no session file, starting a new session");
        return Ok(Session::new());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read session {}", path.display()))?;
    Session::from_json(&text).with_context(|| format!("invalid session file {}", path.display()))
}

pub fn save_session(path: &Path, session: &Session) -> Result<()> {
    let json = session.to_json().context("failed to serialize session")?;
    fs::write(path, json).with_context(|| format!("failed to write session {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_session_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let session = load_session(&dir.path().join("none.json")).unwrap();
        assert_eq!(session, Session::new());
    }

    #[test]
    fn session_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let session = Session::with_machine_id("0123456789AB");

        save_session(&path, &session).unwrap();
        assert_eq!(load_session(&path).unwrap(), session);
    }

    #[test]
    fn corrupt_session_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(load_session(&path).is_err());
    }

    #[test]
    fn yaml_config_overrides_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "endpoints:\n  catalog: http://localhost:9000\nmachine-id-seed: 64\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.endpoints.catalog, "http://localhost:9000");
        assert_eq!(config.machine_id_seed, 64);
        assert_eq!(config.endpoints.buy, ClientConfig::default().endpoints.buy);
    }
}
