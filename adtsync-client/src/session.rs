//! Authenticated transport session shared by every protocol call of a run.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::AdtError;

pub const USER_AGENT: &str = "adt-client";

/// Basic-auth credentials. The password is redacted from `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.user, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Knobs for [`AdtSession::new`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Value of the `sap-client` header sent on every request.
    pub client: String,
    /// Skip certificate and host name verification.
    pub insecure: bool,
    /// Upper bound for each request (connect + read + write).
    pub timeout: Duration,
}

/// One blocking HTTP agent plus the headers every ADT call carries.
///
/// Immutable after construction, so it can be shared by reference across items.
#[derive(Clone)]
pub struct AdtSession {
    agent: ureq::Agent,
    authorization: String,
    client: String,
}

impl fmt::Debug for AdtSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdtSession")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl AdtSession {
    pub fn new(credentials: &Credentials, options: &SessionOptions) -> Result<Self, AdtError> {
        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(options.insecure)
            .danger_accept_invalid_hostnames(options.insecure)
            .build()?;
        if options.insecure {
            tracing::warn!("TLS certificate verification disabled");
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(options.timeout)
            .user_agent(USER_AGENT)
            .tls_connector(Arc::new(tls))
            .build();

        Ok(Self {
            agent,
            authorization: credentials.basic_auth_header(),
            client: options.client.clone(),
        })
    }

    /// Start a request with auth, `sap-client`, `Accept` and `Accept-Charset` set.
    pub(crate) fn request(&self, method: &str, url: &str, accept: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &self.authorization)
            .set("sap-client", &self.client)
            .set("Accept", accept)
            .set("Accept-Charset", "utf-8")
    }

    pub fn client(&self) -> &str {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_password() {
        let creds = Credentials::new("DEVELOPER", "s3cret");
        let dbg = format!("{creds:?}");
        assert!(dbg.contains("DEVELOPER"));
        assert!(!dbg.contains("s3cret"));
    }

    #[test]
    fn basic_auth_header_is_base64_of_user_colon_password() {
        let creds = Credentials::new("Aladdin", "open sesame");
        assert_eq!(
            creds.basic_auth_header(),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
    }
}
