use reqwest::Url;

use appstore_core::DownloadEntry;

use crate::config::ClientConfig;
use crate::error::{StoreError, StoreResult};
use crate::machine::{MachineIdGenerator, RandomMachineId};
use crate::session::Session;
use crate::transport::{HttpTransport, Method, Request, Response, Transport};

/// Redirect hops followed by a single exchange.
const MAX_REDIRECTS: usize = 10;

/**
    Store protocol client.

    Holds no per-account state: everything that changes between calls
    lives in the [`Session`] passed to each operation.
*/
pub struct StoreClient<T> {
    transport: T,
    config: ClientConfig,
    machine_ids: Box<dyn MachineIdGenerator + Send + Sync>,
}

impl StoreClient<HttpTransport> {
    /**
        Client over HTTP, using the configured user agent.
    */
    pub fn from_config(config: ClientConfig) -> StoreResult<Self> {
        let transport = HttpTransport::new(&config.endpoints.user_agent)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> StoreClient<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        let machine_ids = Box::new(RandomMachineId::new(config.machine_id_seed));
        Self {
            transport,
            config,
            machine_ids,
        }
    }

    /**
        Replace the generator used for sessions that have no machine
        identifier yet.
    */
    pub fn with_machine_ids(
        mut self,
        generator: impl MachineIdGenerator + Send + Sync + 'static,
    ) -> Self {
        self.machine_ids = Box::new(generator);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /**
        Machine identifier of the session, generating it on first use.
    */
    pub(crate) fn machine_id(&self, session: &mut Session) -> String {
        session.machine_id_or_generate(self.machine_ids.as_ref())
    }

    pub(crate) fn endpoint(&self, base: &str, path: &str) -> StoreResult<Url> {
        let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
        Url::parse(&raw)
            .map_err(|e| StoreError::Transport(format!("invalid endpoint '{raw}': {e}")))
    }

    /**
        Send one request on behalf of `session`.

        Redirects are followed here, up to ten hops. Cookies are attached
        from and absorbed into the session at every hop, also for responses
        with an error status. Non-2xx final responses are errors.
    */
    pub(crate) async fn exchange(
        &self,
        session: &mut Session,
        mut request: Request,
    ) -> StoreResult<Response> {
        let mut hops = 0;
        loop {
            let url = request.full_url();
            request.remove_header("Cookie");
            if let Some(cookie) = session.cookies().header_for(&url) {
                request.headers.push((String::from("Cookie"), cookie));
            }

            let response = self.transport.send(request.clone()).await?;
            for set_cookie in response.set_cookies() {
                session.cookies_mut().absorb(&url, set_cookie);
            }

            let Some(location) = redirect_target(&url, &response)? else {
                if !response.is_success() {
                    return Err(StoreError::HttpStatus(response.status));
                }
                return Ok(response);
            };

            hops += 1;
            if hops > MAX_REDIRECTS {
                let message = format!("too many redirects, last to {location}");
                return Err(StoreError::Transport(message));
            }
            tracing::debug!(status = response.status, %location, "following redirect");

            if response.status == 303 && request.method != Method::Get {
                request.method = Method::Get;
                request.body = None;
                request.remove_header("Content-Type");
            }
            request.url = location;
            request.query.clear();
        }
    }

    /**
        Fetch the raw, unpatched archive of a download entry.
    */
    pub async fn download(
        &self,
        session: &mut Session,
        entry: &DownloadEntry,
    ) -> StoreResult<Vec<u8>> {
        let url = Url::parse(&entry.url).map_err(|e| {
            StoreError::InvalidResponse(format!("invalid download url '{}': {e}", entry.url))
        })?;
        let response = self.exchange(session, Request::get(url)).await?;
        Ok(response.body)
    }
}

/**
    Resolved `Location` of a redirect response, or `None` when the response
    is not a redirect.
*/
fn redirect_target(url: &Url, response: &Response) -> StoreResult<Option<Url>> {
    if !matches!(response.status, 301 | 302 | 303 | 307 | 308) {
        return Ok(None);
    }
    let Some(location) = response.header_value("Location") else {
        return Ok(None);
    };
    url.join(location)
        .map(Some)
        .map_err(|e| StoreError::InvalidResponse(format!("invalid redirect '{location}': {e}")))
}
