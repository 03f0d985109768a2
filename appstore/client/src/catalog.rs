use serde::{Deserialize, Serialize};

use appstore_core::Storefront;

use crate::client::StoreClient;
use crate::error::StoreResult;
use crate::session::Session;
use crate::transport::{Request, Transport};

const ENTITY: &str = "software,iPadSoftware";

/**
    One package in a catalog lookup or search result.
*/
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub track_id: u64,
    pub bundle_id: String,
    pub track_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub formatted_price: Option<String>,
    #[serde(default)]
    pub file_size_bytes: Option<String>,
    #[serde(default)]
    pub minimum_os_version: Option<String>,
}

impl CatalogEntry {
    pub fn is_free(&self) -> bool {
        self.price.is_some_and(|p| p == 0.0)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    results: Vec<CatalogEntry>,
}

impl<T: Transport> StoreClient<T> {
    /**
        Look up packages by bundle identifier in one storefront.
    */
    pub async fn lookup(
        &self,
        session: &mut Session,
        storefront: Storefront,
        bundle_id: &str,
        limit: u32,
    ) -> StoreResult<Vec<CatalogEntry>> {
        self.catalog(session, "lookup", ("bundleId", bundle_id), storefront, limit)
            .await
    }

    /**
        Search packages by keyword in one storefront.
    */
    pub async fn search(
        &self,
        session: &mut Session,
        storefront: Storefront,
        term: &str,
        limit: u32,
    ) -> StoreResult<Vec<CatalogEntry>> {
        self.catalog(session, "search", ("term", term), storefront, limit)
            .await
    }

    async fn catalog(
        &self,
        session: &mut Session,
        path: &str,
        (key, value): (&str, &str),
        storefront: Storefront,
        limit: u32,
    ) -> StoreResult<Vec<CatalogEntry>> {
        let url = self.endpoint(&self.config().endpoints.catalog, path)?;
        let request = Request::get(url)
            .query("entity", ENTITY)
            .query("limit", limit.to_string())
            .query("media", "software")
            .query(key, value)
            .query("country", storefront.code());

        let response = self.exchange(session, request).await?;
        let parsed: CatalogResponse = serde_json::from_slice(&response.body)?;
        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::{ClientConfig, Endpoints};
    use crate::error::StoreError;
    use crate::testing::ScriptedTransport;
    use crate::transport::Response;

    const LOOKUP: &str = r#"{
        "resultCount": 1,
        "results": [{
            "trackId": 284882215,
            "bundleId": "com.facebook.Facebook",
            "trackName": "Facebook",
            "version": "450.0",
            "artistName": "Meta Platforms, Inc.",
            "price": 0.0,
            "currency": "USD",
            "formattedPrice": "Free",
            "fileSizeBytes": "312066048",
            "minimumOsVersion": "15.0",
            "kind": "software"
        }]
    }"#;

    fn client(transport: ScriptedTransport) -> StoreClient<ScriptedTransport> {
        let config = ClientConfig {
            endpoints: Endpoints {
                catalog: String::from("https://catalog.store.test"),
                ..Endpoints::default()
            },
            ..ClientConfig::default()
        };
        StoreClient::new(transport, config)
    }

    #[tokio::test]
    async fn lookup_by_bundle_id() {
        let client = client(ScriptedTransport::new().respond(Response::new(200, LOOKUP)));
        let mut session = Session::new();

        let results = client
            .lookup(&mut session, Storefront::from_code("us").unwrap(), "com.facebook.Facebook", 1)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].track_id, 284882215);
        assert_eq!(results[0].formatted_price.as_deref(), Some("Free"));
        assert!(results[0].is_free());

        let request = &client.transport().requests()[0];
        assert_eq!(request.url.as_str(), "https://catalog.store.test/lookup");
        assert_eq!(
            request.query,
            [
                ("entity", "software,iPadSoftware"),
                ("limit", "1"),
                ("media", "software"),
                ("bundleId", "com.facebook.Facebook"),
                ("country", "US"),
            ]
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .to_vec()
        );
        assert!(request.body.is_none());
        assert!(session.identity().is_none());
    }

    #[tokio::test]
    async fn search_by_term() {
        let client = client(ScriptedTransport::new().respond(Response::new(
            200,
            r#"{"resultCount":0,"results":[]}"#,
        )));
        let mut session = Session::new();

        let results = client
            .search(&mut session, Storefront::from_code("JP").unwrap(), "maps", 5)
            .await
            .unwrap();
        assert!(results.is_empty());

        let request = &client.transport().requests()[0];
        assert_eq!(request.url.path(), "/search");
        assert_eq!(request.query_value("term"), Some("maps"));
        assert_eq!(request.query_value("limit"), Some("5"));
        assert_eq!(request.query_value("country"), Some("JP"));
        assert_eq!(request.query_value("bundleId"), None);
    }

    #[tokio::test]
    async fn malformed_json_is_an_error() {
        let client = client(ScriptedTransport::new().respond(Response::new(200, "<html>")));
        let mut session = Session::new();
        let err = client
            .search(&mut session, Storefront::default(), "x", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }
}
