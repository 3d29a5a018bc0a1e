// File: ./src/calendar/caldav.rs
// CalDAV backend: events are PUT as individual .ics resources
use crate::calendar::{CalendarHandle, CalendarService};
use crate::error::CalendarError;
use crate::model::EventRequest;

// Libdav imports
use libdav::caldav::{FindCalendarHomeSet, FindCalendars};
use libdav::dav::{GetProperty, PutResource};
use libdav::dav::{WebDavClient, WebDavError};
use libdav::{CalDavClient, names};

use async_trait::async_trait;
use http::{Request, StatusCode, Uri};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tokio::sync::OnceCell;
use tower_http::auth::AddAuthorization;
use tracing::{debug, info, warn};

type HttpsClient = AddAuthorization<
    Client<
        hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>,
        String,
    >,
>;

const EVENT_CONTENT_TYPE: &str = "text/calendar; charset=utf-8; component=VEVENT";

const PRIVILEGE_QUERY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:"><d:prop><d:current-user-privilege-set/></d:prop></d:propfind>"#;

static PRIVILEGE_SET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)current-user-privilege-set>(.*?)</[^>]*current-user-privilege-set>")
        .expect("privilege set pattern is valid")
});

// Any of these lets us create a new resource in the collection.
static WRITE_PRIVILEGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:[A-Za-z0-9_-]+:)?(?:write|write-content|bind|all)\s*/?>")
        .expect("write privilege pattern is valid")
});

#[derive(Clone, Debug)]
pub struct CalDavCalendar {
    client: Option<CalDavClient<HttpsClient>>,
    /// Calendar name or collection href chosen by the user.
    preferred: Option<String>,
    resolved: OnceCell<CalendarHandle>,
}

fn dav_error<E: std::fmt::Debug>(e: E) -> CalendarError {
    CalendarError::Dav(format!("{:?}", e))
}

fn join_href(collection: &str, filename: &str) -> String {
    if collection.ends_with('/') {
        format!("{}{}", collection, filename)
    } else {
        format!("{}/{}", collection, filename)
    }
}

fn looks_like_href(s: &str) -> bool {
    s.starts_with('/') || s.contains("://")
}

fn handle_for_href(href: &str) -> CalendarHandle {
    CalendarHandle {
        name: href.to_string(),
        href: href.to_string(),
    }
}

/// `Some(true/false)` when the multistatus body reports the current user's
/// privileges on the collection, `None` when the server left them out.
fn privileges_allow_write(body: &str) -> Option<bool> {
    let set = PRIVILEGE_SET.captures(body)?.get(1)?.as_str();
    Some(WRITE_PRIVILEGE.is_match(set))
}

fn tls_config(insecure: bool) -> Result<rustls::ClientConfig, CalendarError> {
    if insecure {
        return Ok(rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerifier))
            .with_no_client_auth());
    }

    let mut root_store = rustls::RootCertStore::empty();
    let result = rustls_native_certs::load_native_certs();
    root_store.add_parsable_certificates(result.certs);
    if root_store.is_empty() {
        return Err(CalendarError::Rejected(
            "No valid system certificates found.".to_string(),
        ));
    }
    Ok(rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth())
}

/// Calendars in the current user's home set. Display names cost one request
/// per calendar, so they are only fetched when asked for.
async fn list_calendars(
    client: &CalDavClient<HttpsClient>,
    with_names: bool,
) -> Result<Vec<CalendarHandle>, CalendarError> {
    let principal = client
        .find_current_user_principal()
        .await
        .map_err(dav_error)?
        .ok_or_else(|| CalendarError::Dav("No principal".to_string()))?;
    let home_set_resp = client
        .request(FindCalendarHomeSet::new(&principal))
        .await
        .map_err(dav_error)?;
    let home_url = home_set_resp
        .home_sets
        .first()
        .ok_or_else(|| CalendarError::Dav("No home set".to_string()))?;
    let cals_resp = client
        .request(FindCalendars::new(home_url))
        .await
        .map_err(dav_error)?;

    let mut calendars = Vec::new();
    for col in cals_resp.calendars {
        let name = if with_names {
            client
                .request(GetProperty::new(&col.href, &names::DISPLAY_NAME))
                .await
                .ok()
                .and_then(|r| r.value)
        } else {
            None
        };
        calendars.push(CalendarHandle {
            name: name.unwrap_or_else(|| col.href.clone()),
            href: col.href,
        });
    }
    Ok(calendars)
}

impl CalDavCalendar {
    pub fn new(url: &str, user: &str, pass: &str, insecure: bool) -> Result<Self, CalendarError> {
        if url.is_empty() {
            return Ok(Self {
                client: None,
                preferred: None,
                resolved: OnceCell::new(),
            });
        }

        let uri: Uri = url
            .parse()
            .map_err(|e: http::uri::InvalidUri| CalendarError::Rejected(e.to_string()))?;
        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config(insecure)?)
            .https_or_http()
            .enable_http1()
            .build();

        let http_client = Client::builder(TokioExecutor::new()).build(https_connector);
        let auth_client = AddAuthorization::basic(http_client, user, pass);
        let caldav = CalDavClient::new(WebDavClient::new(uri, auth_client));

        Ok(Self {
            client: Some(caldav),
            preferred: None,
            resolved: OnceCell::new(),
        })
    }

    /// Target a calendar by display name or collection href.
    pub fn with_calendar(mut self, name_or_href: impl Into<String>) -> Self {
        let value = name_or_href.into();
        self.preferred = (!value.is_empty()).then_some(value);
        self.resolved = OnceCell::new();
        self
    }

    /// Picks the target collection: an explicit href as is, a display name by
    /// listing the home set, otherwise the first calendar found or, failing
    /// discovery, the configured URL itself.
    async fn resolve_calendar(&self) -> Result<CalendarHandle, CalendarError> {
        let client = self.client.as_ref().ok_or(CalendarError::Offline)?;

        match self.preferred.as_deref() {
            Some(href) if looks_like_href(href) => Ok(handle_for_href(href)),
            Some(name) => list_calendars(client, true)
                .await?
                .into_iter()
                .find(|c| c.name == name || c.href == name)
                .ok_or_else(|| CalendarError::Rejected(format!("calendar '{}' not found", name))),
            None => {
                let discovered = list_calendars(client, false)
                    .await
                    .ok()
                    .and_then(|cals| cals.into_iter().next());
                let handle = discovered
                    .unwrap_or_else(|| handle_for_href(client.base_url().path()));
                debug!(href = %handle.href, "discovered calendar");
                Ok(handle)
            }
        }
    }
}

#[async_trait]
impl CalendarService for CalDavCalendar {
    /// Asks the server for `DAV:current-user-privilege-set` on the target
    /// collection. A read-only grant is refused here rather than on the
    /// first PUT. Servers that do not report privileges are trusted.
    async fn request_write_access(&self) -> Result<bool, CalendarError> {
        let client = self.client.as_ref().ok_or(CalendarError::Offline)?;
        let target = self.default_calendar().await?;

        let req = Request::builder()
            .method("PROPFIND")
            .uri(&target.href)
            .header("Depth", "0")
            .header("Content-Type", "application/xml; charset=utf-8")
            .body(PRIVILEGE_QUERY.to_string())
            .map_err(dav_error)?;
        let (parts, body) = client
            .webdav_client
            .request_raw(req)
            .await
            .map_err(dav_error)?;

        match parts.status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(href = %target.href, "server refused access to calendar");
                Ok(false)
            }
            status if status.is_success() => {
                match privileges_allow_write(&String::from_utf8_lossy(&body)) {
                    Some(true) | None => Ok(true),
                    Some(false) => {
                        warn!(href = %target.href, "calendar is read-only for this user");
                        Ok(false)
                    }
                }
            }
            status => Err(CalendarError::Dav(format!("PROPFIND failed: {}", status))),
        }
    }

    async fn default_calendar(&self) -> Result<CalendarHandle, CalendarError> {
        self.resolved
            .get_or_try_init(|| self.resolve_calendar())
            .await
            .cloned()
    }

    async fn save(
        &self,
        event: &EventRequest,
        calendar: &CalendarHandle,
    ) -> Result<(), CalendarError> {
        let client = self.client.as_ref().ok_or(CalendarError::Offline)?;
        let full_href = join_href(&calendar.href, &event.filename());

        match client
            .request(PutResource::new(&full_href).create(event.to_ics(), EVENT_CONTENT_TYPE))
            .await
        {
            Ok(_) => {
                info!(href = %full_href, "created event");
                Ok(())
            }
            Err(WebDavError::BadStatusCode(StatusCode::PRECONDITION_FAILED))
            | Err(WebDavError::PreconditionFailed(_)) => Err(CalendarError::Conflict(full_href)),
            Err(e) => Err(dav_error(e)),
        }
    }
}

#[derive(Debug)]
struct NoVerifier;
impl rustls::client::danger::ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _: &rustls::pki_types::CertificateDer<'_>,
        _: &[rustls::pki_types::CertificateDer<'_>],
        _: &rustls::pki_types::ServerName<'_>,
        _: &[u8],
        _: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }
    fn verify_tls12_signature(
        &self,
        _: &[u8],
        _: &rustls::pki_types::CertificateDer<'_>,
        _: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }
    fn verify_tls13_signature(
        &self,
        _: &[u8],
        _: &rustls::pki_types::CertificateDer<'_>,
        _: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }
    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        use rustls::SignatureScheme::*;
        vec![
            RSA_PKCS1_SHA256,
            RSA_PKCS1_SHA384,
            RSA_PKCS1_SHA512,
            ECDSA_NISTP256_SHA256,
            RSA_PSS_SHA256,
            ED25519,
        ]
    }
}
