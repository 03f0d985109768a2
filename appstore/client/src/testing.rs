use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::transport::{Request, Response, Transport};

/**
    Transport that replays queued responses and records every request.
*/
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Response>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: Response) -> Self {
        self.push(response);
        self
    }

    pub fn push(&self, response: Response) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(response);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("requests lock").clone()
    }

    /**
        Number of requests whose path ends with `suffix`.
    */
    pub fn calls_to(&self, suffix: &str) -> usize {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .filter(|r| r.url.path().ends_with(suffix))
            .count()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> StoreResult<Response> {
        self.requests.lock().expect("requests lock").push(request);
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .ok_or_else(|| StoreError::Transport(String::from("no scripted response left")))
    }
}

/**
    A 200 response carrying an XML property-list dictionary with `body`
    as its contents.
*/
pub fn plist_response(body: &str) -> Response {
    Response::new(
        200,
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0"><dict>{body}</dict></plist>"#
        ),
    )
}

pub const PERMIT_PATH: &str = "volumeStoreDownloadProduct";
pub const PURCHASE_PATH: &str = "buyProduct";
pub const AUTH_PATH: &str = "authenticate";

/**
    A permit success with one download entry and two sinfs.
*/
pub fn permit_success() -> Response {
    plist_response(
        r#"
        <key>jingleDocType</key><string>purchaseSuccess</string>
        <key>status</key><integer>0</integer>
        <key>songList</key>
        <array>
            <dict>
                <key>URL</key><string>https://cdn.store.test/app.ipa</string>
                <key>md5</key><string>d41d8cd98f00b204e9800998ecf8427e</string>
                <key>sinfs</key>
                <array>
                    <dict><key>id</key><integer>0</integer><key>sinf</key><data>AAEC</data></dict>
                    <dict><key>id</key><integer>1</integer><key>sinf</key><data>AwQF</data></dict>
                </array>
                <key>metadata</key>
                <dict>
                    <key>softwareVersionBundleId</key><string>com.example.app</string>
                    <key>bundleDisplayName</key><string>Example</string>
                    <key>bundleShortVersionString</key><string>1.2.3</string>
                    <key>itemId</key><integer>42</integer>
                </dict>
            </dict>
        </array>
        <key>metrics</key>
        <dict>
            <key>itemIds</key><array><integer>42</integer></array>
            <key>currency</key><string>USD</string>
            <key>exchangeRateToUSD</key><real>1.0</real>
        </dict>
        "#,
    )
}

pub fn failure(code: &str) -> Response {
    plist_response(&format!(
        "<key>failureType</key><string>{code}</string><key>customerMessage</key><string>nope</string>"
    ))
}

pub fn purchase_success() -> Response {
    plist_response(
        "<key>jingleDocType</key><string>purchaseSuccess</string><key>status</key><integer>0</integer>",
    )
}
