use plist::Dictionary;
use serde::Deserialize;

use appstore_core::{
    DownloadEntry, LicenseGrant, LicenseMetrics, LicenseRequest, PackageMetadata, Sinf,
};

use crate::client::StoreClient;
use crate::error::{StoreError, StoreResult};
use crate::protocol::{Discriminant, FailureType, PlistBody, Reply, decode, lenient_string};
use crate::session::{Identity, Session};
use crate::transport::{Request, Transport};

const PERMIT_PATH: &str = "WebObjects/MZFinance.woa/wa/volumeStoreDownloadProduct";
const PURCHASE_PATH: &str = "WebObjects/MZBuy.woa/wa/buyProduct";

const PLIST_CONTENT_TYPE: &str = "application/x-apple-plist";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermitSuccess {
    #[serde(default)]
    song_list: Vec<Song>,
    #[serde(default)]
    metrics: Option<Metrics>,
}

#[derive(Debug, Deserialize)]
struct Song {
    #[serde(rename = "URL")]
    url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    md5: Option<String>,
    #[serde(default)]
    sinfs: Vec<SinfRecord>,
    #[serde(default)]
    metadata: Option<Dictionary>,
}

#[derive(Debug, Deserialize)]
struct SinfRecord {
    id: u64,
    sinf: plist::Data,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metrics {
    #[serde(default)]
    item_ids: Vec<u64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(rename = "exchangeRateToUSD", default)]
    exchange_rate_to_usd: Option<f64>,
}

impl From<Song> for DownloadEntry {
    fn from(song: Song) -> Self {
        Self {
            url: song.url,
            md5: song.md5,
            sinfs: song
                .sinfs
                .into_iter()
                .map(|s| Sinf {
                    id: s.id,
                    data: s.sinf.into(),
                })
                .collect(),
            metadata: PackageMetadata::new(song.metadata.unwrap_or_default()),
        }
    }
}

impl From<Metrics> for LicenseMetrics {
    fn from(metrics: Metrics) -> Self {
        Self {
            item_ids: metrics.item_ids,
            currency: metrics.currency,
            exchange_rate_to_usd: metrics.exchange_rate_to_usd,
        }
    }
}

/**
    Clear the identity and report expiry. The caller has to sign in again.
*/
fn expire(session: &mut Session) -> StoreError {
    session.sign_out();
    StoreError::SessionExpired
}

fn identity(session: &Session) -> StoreResult<Identity> {
    session
        .identity()
        .cloned()
        .ok_or(StoreError::SessionUnavailable)
}

impl<T: Transport> StoreClient<T> {
    /**
        Ask for the license of a package the account already owns.

        Fails with [`StoreError::LicenseUnavailable`] when the account has
        no license for it yet.
    */
    pub async fn permit(
        &self,
        session: &mut Session,
        request: &LicenseRequest,
    ) -> StoreResult<LicenseGrant> {
        let identity = identity(session)?;
        let guid = self.machine_id(session);
        let url = self.endpoint(&self.config().endpoints.auth_without_code, PERMIT_PATH)?;

        let body = PlistBody::new()
            .string("creditDisplay", "")
            .string("guid", guid.as_str())
            .integer("salableAdamId", request.package_id)
            .string("appExtVrsId", request.version_id.as_str())
            .to_xml()?;

        let http = Request::post(url, body)
            .header("Content-Type", PLIST_CONTENT_TYPE)
            .header("iCloud-DSID", identity.person_id.as_str())
            .header("X-Dsid", identity.person_id.as_str())
            .query("guid", guid);
        let response = self.exchange(session, http).await?;

        match decode::<PermitSuccess>(&response.body, Discriminant::NoFailureType)? {
            Reply::Success(success) => {
                if success.song_list.is_empty() {
                    return Err(StoreError::InvalidResponse(String::from(
                        "permit succeeded without download entries",
                    )));
                }
                Ok(LicenseGrant {
                    entries: success.song_list.into_iter().map(DownloadEntry::from).collect(),
                    metrics: success.metrics.map(LicenseMetrics::from).unwrap_or_default(),
                })
            }
            Reply::Failure(failure) => Err(match failure.kind() {
                Some(FailureType::PasswordTokenExpired) => expire(session),
                Some(FailureType::LicenseNotFound) => StoreError::LicenseUnavailable,
                _ => StoreError::UnknownFailure(failure.code().to_owned()),
            }),
        }
    }

    /**
        Acquire a free package for the account.

        A package the account already owns fails with
        [`StoreError::LicenseAlreadyExists`].
    */
    pub async fn purchase(
        &self,
        session: &mut Session,
        request: &LicenseRequest,
    ) -> StoreResult<()> {
        let identity = identity(session)?;
        let guid = self.machine_id(session);
        let url = self.endpoint(&self.config().endpoints.buy, PURCHASE_PATH)?;

        let body = PlistBody::new()
            .string("appExtVrsId", "0")
            .string("hasAskedToFulfillPreorder", "true")
            .string("buyWithoutAuthorization", "true")
            .string("hasDoneAgeCheck", "true")
            .string("guid", guid)
            .string("needDiv", "0")
            .string("origPage", format!("Software-{}", request.package_id))
            .string("origPageLocation", "Buy")
            .string("price", "0")
            .string("pricingParameters", request.pricing.to_parameter())
            .string("productType", "C")
            .integer("salableAdamId", request.package_id)
            .to_xml()?;

        let http = Request::post(url, body)
            .header("Content-Type", PLIST_CONTENT_TYPE)
            .header("iCloud-DSID", identity.person_id.as_str())
            .header("X-Dsid", identity.person_id.as_str())
            .header("X-Apple-Store-Front", request.storefront.id().to_string())
            .header("X-Token", identity.token.as_str());
        let response = self.exchange(session, http).await?;

        match decode::<Dictionary>(&response.body, Discriminant::PurchaseSuccess)? {
            Reply::Success(_) => Ok(()),
            Reply::Failure(failure) => Err(if failure.status == Some(500) {
                StoreError::LicenseAlreadyExists
            } else {
                match failure.kind() {
                    Some(FailureType::TemporarilyUnavailable) => {
                        StoreError::ServiceTemporarilyUnavailable
                    }
                    Some(FailureType::PasswordTokenExpired) => expire(session),
                    _ => StoreError::UnknownFailure(format!(
                        "{}:{}",
                        failure.code(),
                        failure.status.map(|s| s.to_string()).unwrap_or_default()
                    )),
                }
            }),
        }
    }

    /**
        Obtain a license grant, purchasing the package first when the
        account does not own it and `allow_purchase` is set.

        After a successful purchase the permit is retried exactly once and
        its result is returned as is.
    */
    pub async fn acquire_license(
        &self,
        session: &mut Session,
        request: &LicenseRequest,
        allow_purchase: bool,
    ) -> StoreResult<LicenseGrant> {
        match self.permit(session, request).await {
            Err(StoreError::LicenseUnavailable) if allow_purchase => {
                self.purchase(session, request).await?;
                self.permit(session, request).await
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use appstore_core::{Pricing, Storefront};
    use plist::Value;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::{ClientConfig, Endpoints};
    use crate::machine::FixedMachineId;
    use crate::testing::{
        PERMIT_PATH as PERMIT, PURCHASE_PATH as PURCHASE, ScriptedTransport, failure,
        permit_success, plist_response, purchase_success,
    };

    const GUID: &str = "0123456789AB";

    fn client(transport: ScriptedTransport) -> StoreClient<ScriptedTransport> {
        let config = ClientConfig {
            endpoints: Endpoints {
                buy: String::from("https://buy.store.test"),
                auth_without_code: String::from("https://p71.store.test"),
                ..Endpoints::default()
            },
            ..ClientConfig::default()
        };
        StoreClient::new(transport, config).with_machine_ids(FixedMachineId(GUID.into()))
    }

    fn session() -> Session {
        let mut session = Session::with_machine_id(GUID);
        session.set_identity(Identity {
            person_id: String::from("8675309"),
            token: String::from("token-abc"),
        });
        session
    }

    fn request() -> LicenseRequest {
        LicenseRequest::new(42, Storefront::from_code("GB").unwrap())
    }

    fn body_of(request: &Request) -> Dictionary {
        Value::from_reader_xml(request.body.as_deref().unwrap())
            .unwrap()
            .into_dictionary()
            .unwrap()
    }

    #[tokio::test]
    async fn permit_success_builds_grant() {
        let client = client(ScriptedTransport::new().respond(permit_success()));
        let mut session = session();

        let grant = client.permit(&mut session, &request()).await.unwrap();
        let entry = grant.primary().unwrap();
        assert_eq!(entry.url, "https://cdn.store.test/app.ipa");
        assert_eq!(entry.md5.as_deref(), Some("d41d8cd98f00b204e9800998ecf8427e"));
        assert_eq!(
            entry.sinfs,
            vec![
                Sinf { id: 0, data: vec![0, 1, 2] },
                Sinf { id: 1, data: vec![3, 4, 5] },
            ]
        );
        assert_eq!(entry.metadata.bundle_id(), Some("com.example.app"));
        assert_eq!(entry.metadata.item_id(), Some(42));
        assert_eq!(grant.metrics.item_ids, vec![42]);
        assert_eq!(grant.metrics.currency.as_deref(), Some("USD"));

        let http = &client.transport().requests()[0];
        assert_eq!(http.url.host_str(), Some("p71.store.test"));
        assert_eq!(http.query_value("guid"), Some(GUID));
        assert_eq!(http.header_value("Content-Type"), Some("application/x-apple-plist"));
        assert_eq!(http.header_value("iCloud-DSID"), Some("8675309"));
        assert_eq!(http.header_value("X-Dsid"), Some("8675309"));
        assert_eq!(http.header_value("X-Token"), None);

        let body = body_of(http);
        assert_eq!(body.get("salableAdamId").and_then(Value::as_unsigned_integer), Some(42));
        assert_eq!(body.get("appExtVrsId").and_then(Value::as_string), Some("0"));
        assert_eq!(body.get("creditDisplay").and_then(Value::as_string), Some(""));
        assert_eq!(body.get("guid").and_then(Value::as_string), Some(GUID));
    }

    #[tokio::test]
    async fn permit_without_identity_sends_nothing() {
        let client = client(ScriptedTransport::new());
        let mut session = Session::new();
        let err = client.permit(&mut session, &request()).await.unwrap_err();
        assert_eq!(err, StoreError::SessionUnavailable);
        assert!(client.transport().requests().is_empty());

        let err = client.purchase(&mut session, &request()).await.unwrap_err();
        assert_eq!(err, StoreError::SessionUnavailable);
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn permit_failure_codes() {
        let cases = [
            ("9610", StoreError::LicenseUnavailable),
            ("5002", StoreError::UnknownFailure(String::from("5002"))),
        ];
        for (code, expected) in cases {
            let client = client(ScriptedTransport::new().respond(failure(code)));
            let mut session = session();
            let err = client.permit(&mut session, &request()).await.unwrap_err();
            assert_eq!(err, expected);
            assert!(session.is_authenticated());
        }
    }

    #[tokio::test]
    async fn expired_token_clears_identity() {
        let client = client(ScriptedTransport::new().respond(failure("2034")));
        let mut session = session();
        let err = client.permit(&mut session, &request()).await.unwrap_err();
        assert_eq!(err, StoreError::SessionExpired);
        assert!(!session.is_authenticated());
        assert_eq!(session.machine_id(), Some(GUID));
    }

    #[tokio::test]
    async fn owned_package_never_purchases() {
        let transport = ScriptedTransport::new()
            .respond(permit_success())
            .respond(permit_success());
        let client = client(transport);
        let mut session = session();

        let first = client.acquire_license(&mut session, &request(), true).await.unwrap();
        let second = client.acquire_license(&mut session, &request(), true).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(client.transport().calls_to(PERMIT), 2);
        assert_eq!(client.transport().calls_to(PURCHASE), 0);
    }

    #[tokio::test]
    async fn not_found_without_purchase_is_unavailable() {
        let client = client(ScriptedTransport::new().respond(failure("9610")));
        let mut session = session();
        let err = client
            .acquire_license(&mut session, &request(), false)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::LicenseUnavailable);
        assert_eq!(client.transport().calls_to(PURCHASE), 0);
    }

    #[tokio::test]
    async fn not_found_purchases_then_permits_again() {
        let transport = ScriptedTransport::new()
            .respond(failure("9610"))
            .respond(purchase_success())
            .respond(permit_success());
        let client = client(transport);
        let mut session = session();

        let grant = client
            .acquire_license(&mut session, &request().with_pricing(Pricing::Arcade), true)
            .await
            .unwrap();
        assert_eq!(grant.entries.len(), 1);
        assert_eq!(client.transport().calls_to(PERMIT), 2);
        assert_eq!(client.transport().calls_to(PURCHASE), 1);

        let purchase = &client.transport().requests()[1];
        assert_eq!(purchase.url.host_str(), Some("buy.store.test"));
        assert_eq!(purchase.header_value("X-Apple-Store-Front"), Some("143444"));
        assert_eq!(purchase.header_value("X-Token"), Some("token-abc"));
        assert_eq!(purchase.header_value("X-Dsid"), Some("8675309"));
        assert_eq!(purchase.query_value("guid"), None);

        let body = body_of(purchase);
        assert_eq!(body.get("pricingParameters").and_then(Value::as_string), Some("GAME"));
        assert_eq!(body.get("origPage").and_then(Value::as_string), Some("Software-42"));
        assert_eq!(body.get("productType").and_then(Value::as_string), Some("C"));
        assert_eq!(body.get("appExtVrsId").and_then(Value::as_string), Some("0"));
        assert_eq!(body.get("salableAdamId").and_then(Value::as_unsigned_integer), Some(42));
    }

    #[tokio::test]
    async fn second_permit_failure_propagates_unfiltered() {
        let transport = ScriptedTransport::new()
            .respond(failure("9610"))
            .respond(purchase_success())
            .respond(failure("9610"));
        let client = client(transport);
        let mut session = session();

        let err = client
            .acquire_license(&mut session, &request(), true)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::LicenseUnavailable);
        assert_eq!(client.transport().calls_to(PERMIT), 2);
        assert_eq!(client.transport().calls_to(PURCHASE), 1);
    }

    #[tokio::test]
    async fn purchase_failures() {
        let already = plist_response(
            "<key>jingleDocType</key><string>purchaseSuccess</string><key>status</key><integer>500</integer>",
        );
        let unavailable = plist_response(
            "<key>failureType</key><string>2059</string><key>status</key><integer>-1</integer>",
        );
        let unknown = plist_response(
            "<key>failureType</key><string>1008</string><key>status</key><integer>1</integer>",
        );
        let wrong_doc = plist_response(
            "<key>jingleDocType</key><string>failure</string><key>status</key><integer>0</integer>",
        );
        let cases = [
            (already, StoreError::LicenseAlreadyExists),
            (unavailable, StoreError::ServiceTemporarilyUnavailable),
            (unknown, StoreError::UnknownFailure(String::from("1008:1"))),
            (wrong_doc, StoreError::UnknownFailure(String::from(":0"))),
        ];
        for (response, expected) in cases {
            let client = client(ScriptedTransport::new().respond(response));
            let mut session = session();
            let err = client.purchase(&mut session, &request()).await.unwrap_err();
            assert_eq!(err, expected);
        }
    }

    #[tokio::test]
    async fn purchase_failure_aborts_acquisition() {
        let already = plist_response(
            "<key>jingleDocType</key><string>purchaseSuccess</string><key>status</key><integer>500</integer>",
        );
        let transport = ScriptedTransport::new()
            .respond(failure("9610"))
            .respond(already);
        let client = client(transport);
        let mut session = session();

        let err = client
            .acquire_license(&mut session, &request(), true)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::LicenseAlreadyExists);
        assert_eq!(client.transport().calls_to(PERMIT), 1);
    }

    #[tokio::test]
    async fn purchase_expiry_clears_identity() {
        let client = client(ScriptedTransport::new().respond(failure("2034")));
        let mut session = session();
        let err = client.purchase(&mut session, &request()).await.unwrap_err();
        assert_eq!(err, StoreError::SessionExpired);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn permit_without_entries_is_invalid() {
        let client = client(ScriptedTransport::new().respond(plist_response(
            "<key>songList</key><array/>",
        )));
        let mut session = session();
        let err = client.permit(&mut session, &request()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidResponse(_)));
    }
}
