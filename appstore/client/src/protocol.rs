use std::fmt;
use std::io::Cursor;

use plist::{Dictionary, Value};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::{StoreError, StoreResult};

/**
    Vendor failure codes carried in the `failureType` field.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureType {
    InvalidCredentials,
    PasswordTokenExpired,
    LicenseNotFound,
    TemporarilyUnavailable,
    Other(String),
}

impl FailureType {
    pub fn from_code(code: &str) -> Self {
        match code {
            "-5000" => Self::InvalidCredentials,
            "2034" => Self::PasswordTokenExpired,
            "9610" => Self::LicenseNotFound,
            "2059" => Self::TemporarilyUnavailable,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn to_code(&self) -> &str {
        match self {
            Self::InvalidCredentials => "-5000",
            Self::PasswordTokenExpired => "2034",
            Self::LicenseNotFound => "9610",
            Self::TemporarilyUnavailable => "2059",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_code())
    }
}

/**
    Fields shared by every store response, decoded before deciding
    whether the reply is a success.
*/
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(rename = "m-allowed", default, deserialize_with = "lenient_bool")]
    allowed: Option<bool>,
    #[serde(rename = "failureType", default, deserialize_with = "lenient_string")]
    failure_type: Option<String>,
    #[serde(rename = "customerMessage", default, deserialize_with = "lenient_string")]
    customer_message: Option<String>,
    #[serde(default, deserialize_with = "lenient_integer")]
    status: Option<i64>,
    #[serde(rename = "jingleDocType", default, deserialize_with = "lenient_string")]
    jingle_doc_type: Option<String>,
}

/**
    The failure half of a store reply.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Failure {
    /// Raw `failureType`, if the server sent one.
    pub failure_type: Option<String>,
    pub customer_message: Option<String>,
    pub status: Option<i64>,
}

impl Failure {
    /**
        Parsed failure code. An empty `failureType` counts as absent.
    */
    pub fn kind(&self) -> Option<FailureType> {
        self.failure_type
            .as_deref()
            .filter(|code| !code.is_empty())
            .map(FailureType::from_code)
    }

    /**
        Raw code for error messages, empty when absent.
    */
    pub fn code(&self) -> &str {
        self.failure_type.as_deref().unwrap_or_default()
    }
}

/**
    Rule deciding which half of the reply a response belongs to.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Discriminant {
    /// Success iff `m-allowed` is true (sign-in).
    Allowed,
    /// Success iff no `failureType` is present (permit).
    NoFailureType,
    /// Success iff no `failureType`, `jingleDocType == "purchaseSuccess"`
    /// and `status == 0` (purchase).
    PurchaseSuccess,
}

impl Discriminant {
    fn is_success(self, envelope: &Envelope) -> bool {
        match self {
            Self::Allowed => envelope.allowed == Some(true),
            Self::NoFailureType => envelope.failure_type.is_none(),
            Self::PurchaseSuccess => {
                envelope.failure_type.is_none()
                    && envelope.jingle_doc_type.as_deref() == Some("purchaseSuccess")
                    && envelope.status == Some(0)
            }
        }
    }
}

#[derive(Debug)]
pub(crate) enum Reply<T> {
    Success(T),
    Failure(Failure),
}

/**
    Decode a property-list response body (XML or binary) into a tagged reply.
*/
pub(crate) fn decode<T: DeserializeOwned>(
    body: &[u8],
    rule: Discriminant,
) -> StoreResult<Reply<T>> {
    let value = Value::from_reader(Cursor::new(body))
        .map_err(|e| StoreError::InvalidResponse(format!("undecodable property list: {e}")))?;
    if value.as_dictionary().is_none() {
        return Err(StoreError::InvalidResponse(String::from(
            "response is not a dictionary",
        )));
    }

    let envelope: Envelope = plist::from_value(&value)?;
    if rule.is_success(&envelope) {
        Ok(Reply::Success(plist::from_value(&value)?))
    } else {
        Ok(Reply::Failure(Failure {
            failure_type: envelope.failure_type,
            customer_message: envelope.customer_message,
            status: envelope.status,
        }))
    }
}

/**
    Builder for the XML property-list bodies sent to the store.
*/
#[derive(Debug, Default)]
pub(crate) struct PlistBody(Dictionary);

impl PlistBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_owned(), Value::String(value.into()));
        self
    }

    pub fn integer(mut self, key: &str, value: u64) -> Self {
        self.0.insert(key.to_owned(), Value::Integer(value.into()));
        self
    }

    pub fn to_xml(&self) -> StoreResult<Vec<u8>> {
        let mut buf = Vec::new();
        Value::Dictionary(self.0.clone()).to_writer_xml(&mut buf)?;
        Ok(buf)
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(r) => Some(r.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/**
    Accepts a string or any scalar, rendered as a string.
*/
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_to_string))
}

fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Integer(i)) => i.as_signed(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Boolean(b)) => Some(b),
        Some(Value::String(s)) => Some(s == "true" || s == "1"),
        Some(Value::Integer(i)) => Some(i.as_signed() != Some(0)),
        _ => None,
    })
}
