use serde::Deserialize;

use crate::client::StoreClient;
use crate::error::{StoreError, StoreResult};
use crate::protocol::{Discriminant, FailureType, PlistBody, Reply, decode, lenient_string};
use crate::session::{Identity, Session};
use crate::transport::{Request, Transport};

const AUTHENTICATE_PATH: &str = "WebObjects/MZFinance.woa/wa/authenticate";

/// Customer message the store sends when a second factor is needed.
const CHALLENGE_MESSAGE: &str = "MZFinance.BadLogin.Configurator_message";

/**
    Account credentials for one sign-in attempt. Never persisted.
*/
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub email: String,
    pub password: String,
    /// Second-factor code, appended to the password when present.
    pub code: Option<String>,
}

impl Credential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.is_empty())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("code", &self.code.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/**
    Account details returned by a successful sign-in.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub person_id: String,
    pub apple_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Account {
    /**
        "First Last", falling back to the account id.
    */
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.apple_id.clone().unwrap_or_else(|| self.person_id.clone())
        } else {
            name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The store wants a second-factor code; retry with one.
    ChallengeRequired,
    Authenticated(Account),
}

#[derive(Debug, Deserialize)]
struct SignIn {
    #[serde(rename = "dsPersonId", default, deserialize_with = "lenient_string")]
    person_id: Option<String>,
    #[serde(rename = "passwordToken", default)]
    token: Option<String>,
    #[serde(rename = "accountInfo", default)]
    account_info: Option<AccountInfo>,
}

#[derive(Debug, Deserialize)]
struct AccountInfo {
    #[serde(rename = "appleId", default)]
    apple_id: Option<String>,
    #[serde(default)]
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Address {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

impl<T: Transport> StoreClient<T> {
    /**
        Sign in and store the resulting identity on the session.

        Returns [`AuthOutcome::ChallengeRequired`] when the account needs a
        second-factor code; the session stays unauthenticated in that case.
    */
    pub async fn authenticate(
        &self,
        session: &mut Session,
        credential: &Credential,
    ) -> StoreResult<AuthOutcome> {
        let guid = self.machine_id(session);
        let code = credential.code();

        let endpoints = &self.config().endpoints;
        let base = match code {
            Some(_) => &endpoints.auth_with_code,
            None => &endpoints.auth_without_code,
        };
        let url = self.endpoint(base, AUTHENTICATE_PATH)?;

        let body = PlistBody::new()
            .string("appleId", credential.email.as_str())
            .integer("attempt", if code.is_some() { 2 } else { 4 })
            .string("createSession", "true")
            .string("guid", guid.as_str())
            .string("password", format!("{}{}", credential.password, code.unwrap_or_default()))
            .string("rmp", "0")
            .string("why", "signIn")
            .to_xml()?;

        let request = Request::post(url, body)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .query("guid", guid);
        let response = self.exchange(session, request).await?;

        let sign_in = match decode::<SignIn>(&response.body, Discriminant::Allowed)? {
            Reply::Success(sign_in) => sign_in,
            Reply::Failure(failure) => {
                return match failure.kind() {
                    None if failure.customer_message.as_deref() == Some(CHALLENGE_MESSAGE) => {
                        Ok(AuthOutcome::ChallengeRequired)
                    }
                    Some(FailureType::InvalidCredentials) => Err(StoreError::InvalidCredentials),
                    Some(FailureType::TemporarilyUnavailable) => {
                        Err(StoreError::ServiceTemporarilyUnavailable)
                    }
                    _ => Err(StoreError::UnknownFailure(failure.code().to_owned())),
                };
            }
        };

        let (Some(person_id), Some(token)) = (sign_in.person_id, sign_in.token) else {
            return Err(StoreError::InvalidResponse(String::from(
                "sign-in succeeded without dsPersonId or passwordToken",
            )));
        };

        let info = sign_in.account_info;
        let apple_id = info.as_ref().and_then(|i| i.apple_id.clone());
        let address = info.and_then(|i| i.address);
        let account = Account {
            person_id: person_id.clone(),
            apple_id,
            first_name: address.as_ref().and_then(|a| a.first_name.clone()),
            last_name: address.and_then(|a| a.last_name),
        };

        session.set_identity(Identity { person_id, token });
        Ok(AuthOutcome::Authenticated(account))
    }
}
