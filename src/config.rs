//! Client configuration: server address, credentials, and TLS trust policy.
//!
//! `ClientConfig` holds only resolved values. Loading a configuration file,
//! prompting for credentials, or reading a CA file from disk is the caller's
//! job — this crate consumes the results and performs no I/O of its own.
//!
//! # Trust model
//!
//! Two settings here are security-relevant and deserve operator awareness:
//!
//! - [`ClientConfig::trust_anchor`] replaces the platform trust store with a
//!   single caller-supplied CA **and disables hostname verification by
//!   default**. The appliances this client targets ship with a self-signed
//!   certificate whose subject does not match the host they are reached by,
//!   so a custom CA without relaxed hostname checking would fail every
//!   handshake. The relaxation is visible and reversible: call
//!   [`ClientConfig::danger_skip_hostname_verification`] with `false` after
//!   setting the anchor if your deployment's certificate does carry the
//!   right hostname.
//! - [`ClientConfig::allow_weak_tls`] lowers the protocol floor from
//!   TLS 1.2 to TLS 1.0 for appliances too old to negotiate modern TLS.
//!   Nothing in this crate prompts or decides this interactively; whatever
//!   confirmation flow is appropriate belongs to the application.

/// The credential used to authenticate every request.
///
/// Exactly one variant applies per client: either a pre-provisioned service
/// token (sent as the `SEC` session-token header) or a username/password
/// pair (sent as `Authorization: Basic ...`).
#[derive(Debug, Clone)]
pub enum Credential {
    /// An authorized service token, sent verbatim in the `SEC` header.
    ApiToken(String),
    /// Username and password, base64-encoded into a Basic `Authorization`
    /// header at client construction.
    Basic {
        /// The login username.
        username: String,
        /// The login password.
        password: String,
    },
}

/// Configuration consumed by [`crate::client::ApiClient`].
///
/// Built with chained setters:
///
/// ```
/// use qradar_client::config::ClientConfig;
///
/// let config = ClientConfig::new("qradar.example.com")
///     .api_token("a2ef...")
///     .version("12.0");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) server: String,
    pub(crate) credential: Option<Credential>,
    pub(crate) api_version: Option<String>,
    pub(crate) accept: String,
    pub(crate) trust_anchor: Option<Vec<u8>>,
    pub(crate) skip_hostname_verification: bool,
    pub(crate) allow_weak_tls: bool,
}

impl ClientConfig {
    /// Creates a configuration for the given server address (host or
    /// host:port). Requests are issued to `https://{server}/api/...`.
    ///
    /// The accepted response content type defaults to `application/json`.
    pub fn new(server: impl Into<String>) -> Self {
        ClientConfig {
            server: server.into(),
            credential: None,
            api_version: None,
            accept: "application/json".to_string(),
            trust_anchor: None,
            skip_hostname_verification: false,
            allow_weak_tls: false,
        }
    }

    /// Authenticates with a service token (the `SEC` header).
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.credential = Some(Credential::ApiToken(token.into()));
        self
    }

    /// Authenticates with username and password (Basic authorization).
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credential = Some(Credential::Basic {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Selects the API revision sent in the `Version` request header.
    ///
    /// The value is transmitted verbatim: the server falls back to the
    /// nearest lower version for unknown strings, and signals removed
    /// versions itself (HTTP 422), so no local validation is performed.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the default `Accept` header (e.g. `application/csv` for
    /// endpoints that support CSV content negotiation).
    pub fn accept(mut self, content_type: impl Into<String>) -> Self {
        self.accept = content_type.into();
        self
    }

    /// Trusts only the supplied PEM-encoded CA material instead of the
    /// platform trust store.
    ///
    /// Setting an anchor also disables hostname verification — see the
    /// module docs for why, and
    /// [`danger_skip_hostname_verification`](Self::danger_skip_hostname_verification)
    /// to re-enable it.
    pub fn trust_anchor(mut self, pem: Vec<u8>) -> Self {
        self.trust_anchor = Some(pem);
        self.skip_hostname_verification = true;
        self
    }

    /// Overrides whether the server certificate's hostname is verified.
    ///
    /// Defaults: `false` (verify) without a trust anchor, `true` (skip)
    /// once [`trust_anchor`](Self::trust_anchor) is set. Only meaningful to
    /// call after `trust_anchor`, since setting the anchor resets it.
    pub fn danger_skip_hostname_verification(mut self, skip: bool) -> Self {
        self.skip_hostname_verification = skip;
        self
    }

    /// Permits TLS 1.0/1.1 handshakes for appliances that cannot negotiate
    /// TLS 1.2. Off by default.
    pub fn allow_weak_tls(mut self, allow: bool) -> Self {
        self.allow_weak_tls = allow;
        self
    }

    /// Returns `true` if hostname verification will be skipped for clients
    /// built from this configuration.
    pub fn skips_hostname_verification(&self) -> bool {
        self.skip_hostname_verification
    }

    /// Returns `true` if a custom trust anchor is configured.
    pub fn has_trust_anchor(&self) -> bool {
        self.trust_anchor.is_some()
    }
}
