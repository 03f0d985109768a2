use serde::{Deserialize, Serialize};

use crate::machine::DEFAULT_SEED;

/**
    Base URLs and the user agent used for every store request.

    Every field has a production default, so a partial configuration
    file only needs to name what it overrides.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Endpoints {
    /// Public catalog (lookup/search).
    pub catalog: String,
    /// Purchase endpoint.
    pub buy: String,
    /// Sign-in host used once a second-factor code is supplied.
    pub auth_with_code: String,
    /// Sign-in host for the first factor; also serves permit requests.
    pub auth_without_code: String,
    pub user_agent: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            catalog: String::from("https://itunes.apple.com"),
            buy: String::from("https://buy.itunes.apple.com"),
            auth_with_code: String::from("https://p25-buy.itunes.apple.com"),
            auth_without_code: String::from("https://p71-buy.itunes.apple.com"),
            user_agent: String::from(
                "Configurator/2.15 (Macintosh; OperatingSystem X 11.0.0; 16G29) AppleWebKit/2603.3.8",
            ),
        }
    }
}

impl Endpoints {
    /**
        Point every host at a single base URL, keeping the user agent.
    */
    pub fn all(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            catalog: base.clone(),
            buy: base.clone(),
            auth_with_code: base.clone(),
            auth_without_code: base,
            ..Self::default()
        }
    }
}

/**
    Client configuration.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    /// Width of the range machine identifier groups are sampled from.
    pub machine_id_seed: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            machine_id_seed: DEFAULT_SEED,
        }
    }
}
