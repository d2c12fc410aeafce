//! Object protocol: fetch with version tag, CSRF handshake, conditional
//! write, and the two activation endpoints.
//!
//! ## Write path
//!
//! 1. `fetch_csrf_token` once per run (any valid object URL will do).
//! 2. `fetch_source` → text + `ETag`.
//! 3. `write_source` with `If-Match: <ETag>` (or `*` when the server sent none).
//! 4. `activate` via the direct or the central service endpoint.
//!
//! Nothing here retries. A stale `ETag`, an expired token or an object locked
//! in another transport all surface as [`AdtError::Status`].

use std::fmt;
use std::io::Read;

use adtsync_core::{text::truncate_chars, ActivationProtocol, TransportRequest};
use url::Url;

use crate::error::{AdtError, Operation};
use crate::session::AdtSession;
use crate::urls::{self, CORRNR_PARAM};

pub const CSRF_HEADER: &str = "X-CSRF-Token";
pub const CSRF_FETCH: &str = "Fetch";
pub const ETAG_HEADER: &str = "ETag";
pub const IF_MATCH_HEADER: &str = "If-Match";

const ACCEPT_TEXT: &str = "text/plain, */*";
const ACCEPT_ERRORS: &str = "application/vnd.sap.adt.errors+xml";
const ACCEPT_SERVICE: &str = "application/vnd.sap.adt.errors+xml, application/xml, */*";
const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";
const CONTENT_TYPE_OBJECT_REFS: &str =
    "application/vnd.sap.adt.core.objectreferences+xml; charset=utf-8";

/// Maximum number of response body characters kept in error messages.
pub const ERROR_BODY_LIMIT: usize = 4000;

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Session-scoped anti-forgery token. Redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken(***)")
    }
}

/// Opaque revision tag from a successful source read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ETag(pub String);

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Source text plus the version tag to thread into the matching write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub text: String,
    pub etag: Option<ETag>,
}

// ---------------------------------------------------------------------------
// Protocol calls
// ---------------------------------------------------------------------------

impl AdtSession {
    /// GET the object's source text and its `ETag`.
    pub fn fetch_source(&self, url: &Url) -> Result<SourceText, AdtError> {
        tracing::debug!("GET {url}");
        let response = self.request("GET", url.as_str(), ACCEPT_TEXT).call();
        let response = check(Operation::Fetch, url.as_str(), response)?;
        let response = require_success(Operation::Fetch, url.as_str(), response)?;

        let etag = response.header(ETAG_HEADER).map(|v| ETag(v.to_string()));
        let bytes = read_body(Operation::Fetch, url.as_str(), response)?;
        Ok(SourceText {
            text: decode_source(bytes),
            etag,
        })
    }

    /// GET with `X-CSRF-Token: Fetch` and return the issued token.
    pub fn fetch_csrf_token(&self, url: &Url) -> Result<CsrfToken, AdtError> {
        tracing::debug!("CSRF token fetch via {url}");
        let response = self
            .request("GET", url.as_str(), ACCEPT_TEXT)
            .set(CSRF_HEADER, CSRF_FETCH)
            .call();
        let response = check(Operation::CsrfFetch, url.as_str(), response)?;
        let response = require_success(Operation::CsrfFetch, url.as_str(), response)?;

        match response.header(CSRF_HEADER) {
            Some(token) if !token.trim().is_empty() => Ok(CsrfToken(token.to_string())),
            _ => Err(AdtError::MissingCsrfToken {
                url: url.to_string(),
            }),
        }
    }

    /// Conditional PUT of `text` to `url?corrNr=<transport>`.
    ///
    /// Sends `If-Match: *` when `etag` is `None`, which overwrites whatever
    /// revision the server holds. Returns the URL actually written to.
    pub fn write_source(
        &self,
        url: &Url,
        text: &str,
        token: &CsrfToken,
        etag: Option<&ETag>,
        transport: &TransportRequest,
    ) -> Result<Url, AdtError> {
        let target = urls::with_query_param(url, CORRNR_PARAM, transport.as_str());
        let if_match = etag.map_or("*", |tag| tag.0.as_str());
        tracing::debug!("PUT {target} (If-Match: {if_match})");

        let response = self
            .request("PUT", target.as_str(), ACCEPT_TEXT)
            .set("Content-Type", CONTENT_TYPE_TEXT)
            .set(CSRF_HEADER, &token.0)
            .set(IF_MATCH_HEADER, if_match)
            .send_bytes(text.as_bytes());
        check(Operation::Write, target.as_str(), response)?;
        Ok(target)
    }

    /// Activate a written object with the selected protocol.
    pub fn activate(
        &self,
        url: &Url,
        token: &CsrfToken,
        transport: &TransportRequest,
        protocol: ActivationProtocol,
    ) -> Result<Url, AdtError> {
        match protocol {
            ActivationProtocol::Direct => self.activate_direct(url, token, transport),
            ActivationProtocol::Service => self.activate_via_service(url, token, transport),
        }
    }

    /// POST to the object's own `/activation` endpoint.
    pub fn activate_direct(
        &self,
        url: &Url,
        token: &CsrfToken,
        transport: &TransportRequest,
    ) -> Result<Url, AdtError> {
        let target = urls::direct_activation_url(url, transport.as_str())?;
        tracing::debug!("POST {target}");
        let response = self
            .request("POST", target.as_str(), ACCEPT_ERRORS)
            .set(CSRF_HEADER, &token.0)
            .call();
        check(Operation::Activation, target.as_str(), response)?;
        Ok(target)
    }

    /// POST an object-reference envelope to the central activation service.
    pub fn activate_via_service(
        &self,
        url: &Url,
        token: &CsrfToken,
        transport: &TransportRequest,
    ) -> Result<Url, AdtError> {
        let (target, rel_uri) = urls::service_activation_target(url, transport.as_str())?;
        let body = urls::object_references_xml(&rel_uri);
        tracing::debug!("POST {target} for {rel_uri}");
        let response = self
            .request("POST", target.as_str(), ACCEPT_SERVICE)
            .set("Content-Type", CONTENT_TYPE_OBJECT_REFS)
            .set(CSRF_HEADER, &token.0)
            .send_bytes(body.as_bytes());
        check(Operation::Activation, target.as_str(), response)?;
        Ok(target)
    }
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

/// Map ureq's `Err(Status)` (any status >= 400) and transport errors.
///
/// Status errors carry the response headers, except for activation where the
/// target URL and body are what matters.
fn check(
    operation: Operation,
    url: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response, AdtError> {
    match result {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(_, response)) => Err(status_error(operation, url, response)),
        Err(ureq::Error::Transport(source)) => Err(AdtError::Transport {
            operation,
            url: url.to_string(),
            source: Box::new(source),
        }),
    }
}

/// Reads are stricter than writes: anything outside 2xx is an error.
fn require_success(
    operation: Operation,
    url: &str,
    response: ureq::Response,
) -> Result<ureq::Response, AdtError> {
    if (200..300).contains(&response.status()) {
        Ok(response)
    } else {
        Err(status_error(operation, url, response))
    }
}

fn status_error(operation: Operation, url: &str, response: ureq::Response) -> AdtError {
    let status = response.status();
    let reason = response.status_text().to_string();
    let headers = if operation != Operation::Activation {
        response
            .headers_names()
            .into_iter()
            .filter_map(|name| {
                let value = response.header(&name)?.to_string();
                Some((name, value))
            })
            .collect()
    } else {
        Vec::new()
    };

    let mut bytes = Vec::new();
    if let Err(e) = response.into_reader().read_to_end(&mut bytes) {
        tracing::warn!("could not read error body from {url}: {e}");
    }
    let body = String::from_utf8_lossy(&bytes);
    let body = truncate_chars(&body, ERROR_BODY_LIMIT).to_string();

    tracing::debug!("{operation} {url} -> {status} {reason}");
    AdtError::Status {
        operation,
        url: url.to_string(),
        status,
        reason,
        headers,
        body,
    }
}

fn read_body(
    operation: Operation,
    url: &str,
    response: ureq::Response,
) -> Result<Vec<u8>, AdtError> {
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|source| AdtError::Body {
            operation,
            url: url.to_string(),
            source,
        })?;
    Ok(bytes)
}

/// Strict UTF-8 first; otherwise drop a byte-order mark and replace
/// undecodable sequences.
pub fn decode_source(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            let bytes = err.into_bytes();
            let without_bom = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
            String::from_utf8_lossy(without_bom).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_utf8_is_kept_verbatim() {
        let text = "REPORT z_test1.\n\" äöü\n";
        assert_eq!(decode_source(text.as_bytes().to_vec()), text);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let decoded = decode_source(b"\xEF\xBB\xBFWRITE 'x\xff'.".to_vec());
        assert_eq!(decoded, "WRITE 'x\u{fffd}'.");
    }

    #[test]
    fn token_debug_is_redacted() {
        assert_eq!(format!("{:?}", CsrfToken("abc".into())), "CsrfToken(***)");
    }
}
