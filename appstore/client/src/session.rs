use serde::{Deserialize, Serialize};

use crate::cookies::CookieJar;
use crate::error::StoreResult;
use crate::machine::MachineIdGenerator;

/**
    Identity issued by a successful sign-in.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Directory services person id (`dsPersonId`).
    pub person_id: String,
    /// Password token sent as `X-Token` on purchases.
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Machine {
    guid: Option<String>,
}

/**
    Per-account state carried across store requests.

    A session owns its machine identifier, cookies and signed-in identity.
    Protocol operations borrow it mutably, so one session can only take part
    in one exchange at a time.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    machine: Machine,
    #[serde(default)]
    cookies: CookieJar,
    #[serde(default)]
    identity: Option<Identity>,
}

impl Session {
    /**
        Create an empty session. The machine identifier is generated on
        first use.
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Create a session with a known machine identifier.
    */
    pub fn with_machine_id(guid: impl Into<String>) -> Self {
        Self {
            machine: Machine {
                guid: Some(guid.into()),
            },
            ..Self::default()
        }
    }

    /**
        Restore a session previously produced by [`Session::to_json`].
    */
    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn machine_id(&self) -> Option<&str> {
        self.machine.guid.as_deref()
    }

    pub(crate) fn machine_id_or_generate(&mut self, generator: &dyn MachineIdGenerator) -> String {
        self.machine
            .guid
            .get_or_insert_with(|| generator.generate())
            .clone()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /**
        Forget the signed-in identity. Cookies and the machine identifier
        are kept so the next sign-in looks like the same device.
    */
    pub fn sign_out(&mut self) {
        self.identity = None;
    }

    pub(crate) fn cookies_mut(&mut self) -> &mut CookieJar {
        &mut self.cookies
    }

    pub(crate) fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }
}
