//! OAuth2 for installed applications: cached credentials, refresh, and the
//! browser flow with a loopback redirect.

use std::convert::Infallible;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use rand::distributions::{Alphanumeric, DistString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use url::Url;

use crate::FullClient;

pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are refreshed before use.
const REFRESH_THRESHOLD_SECS: i64 = 225;

const CALLBACK_PAGE: &str = "<html><body><p>The authentication flow has completed. You may close this window.</p></body></html>";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Client secrets file {0} not found; download the OAuth client credentials from the Google Cloud console")]
    MissingClientSecrets(PathBuf),
    #[error("Invalid client secrets: {0}")]
    InvalidClientSecrets(String),
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),
    #[error("Legacy HTTP error: {0}")]
    LegacyHttp(#[from] hyper_util::client::legacy::Error),
    #[error("Token endpoint returned {status}: {message}")]
    TokenEndpoint { status: u16, message: String },
    #[error("Authorization denied: {0}")]
    Denied(String),
    #[error("Authorization response state does not match the request")]
    StateMismatch,
    #[error("Authorization response carries no code")]
    MissingCode,
    #[error("Redirect listener failed: {0}")]
    CallbackServer(String),
    #[error("Timed out waiting for the browser authorization")]
    Timeout,
    #[error("Credentials carry no refresh token")]
    NoRefreshToken,
    #[error("Other error: {0}")]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let file: ClientSecretsFile = serde_json::from_str(json)?;
        file.installed
            .or(file.web)
            .ok_or_else(|| AuthError::InvalidClientSecrets("expected an \"installed\" or \"web\" section".into()))
    }

    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let json = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => AuthError::MissingClientSecrets(path.to_path_buf()),
            _ => AuthError::Io { path: path.to_path_buf(), source },
        })?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl TokenRecord {
    /// A record without an expiry never expires.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry - chrono::Duration::seconds(REFRESH_THRESHOLD_SECS) > now,
            None => !self.token.is_empty(),
        }
    }

    pub fn has_scopes(&self, scopes: &[String]) -> bool {
        scopes.iter().all(|s| self.scopes.contains(s))
    }
}

pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenCache { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Missing, empty and unreadable files all count as no cache.
    pub fn load(&self) -> Result<Option<TokenRecord>, AuthError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(AuthError::Io { path: self.path.clone(), source }),
        };

        if json.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&json) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable token cache {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    pub fn save(&self, record: &TokenRecord) -> Result<(), AuthError> {
        let io_err = |source: std::io::Error| AuthError::Io { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(record)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        use std::io::Write;
        let mut file = options.open(&self.path).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;

        tracing::debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    pub fn generate() -> Self {
        Self::from_verifier(random_string(64))
    }

    pub fn from_verifier(verifier: String) -> Self {
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Pkce { verifier, challenge }
    }
}

fn random_string(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), len)
}

pub fn authorization_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    scopes: &[String],
    state: &str,
    pkce: &Pkce,
) -> Result<Url, AuthError> {
    let scope = scopes.join(" ");
    let url = Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("response_type", "code"),
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
            ("state", state),
            ("code_challenge", pkce.challenge.as_str()),
            ("code_challenge_method", "S256"),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )?;
    Ok(url)
}

fn is_callback(query: &str) -> bool {
    url::form_urlencoded::parse(query.as_bytes()).any(|(k, _)| k == "code" || k == "error")
}

pub fn parse_callback(query: &str, expected_state: &str) -> Result<String, AuthError> {
    let mut code = None;
    let mut state = None;
    let mut error = None;

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(AuthError::Denied(error));
    }

    if state.as_deref() != Some(expected_state) {
        return Err(AuthError::StateMismatch);
    }

    code.ok_or(AuthError::MissingCode)
}

async fn serve_callbacks(listener: TcpListener, tx: mpsc::UnboundedSender<String>) -> std::io::Error {
    loop {
        let stream = match listener.accept().await {
            Ok((stream, _)) => stream,
            Err(e) => return e,
        };

        let tx = tx.clone();
        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let tx = tx.clone();
                async move {
                    let query = req.uri().query().unwrap_or_default().to_string();
                    let mut resp = Response::new(Full::new(Bytes::from_static(CALLBACK_PAGE.as_bytes())));
                    if is_callback(&query) {
                        let _ = tx.send(query);
                    } else {
                        *resp.status_mut() = StatusCode::NOT_FOUND;
                    }
                    Ok::<_, Infallible>(resp)
                }
            });

            if let Err(e) = http1::Builder::new()
                .keep_alive(false)
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                tracing::debug!("Redirect connection error: {}", e);
            }
        });
    }
}

/// Query string of the first redirect carrying `code` or `error`.
pub(crate) async fn wait_for_callback(listener: TcpListener, timeout: Duration) -> Result<String, AuthError> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    tokio::select! {
        Some(query) = rx.recv() => Ok(query),
        err = serve_callbacks(listener, tx) => Err(AuthError::CallbackServer(err.to_string())),
        _ = tokio::time::sleep(timeout) => Err(AuthError::Timeout),
    }
}

fn open_browser(url: &str) -> std::io::Result<()> {
    use std::process::{Command, Stdio};

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("rundll32");
        c.arg("url.dll,FileProtocolHandler");
        c
    };
    #[cfg(target_os = "macos")]
    let mut command = Command::new("open");
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let mut command = Command::new("xdg-open");

    command
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

async fn post_token_form(
    client: &FullClient,
    token_uri: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();

    let req = Request::builder()
        .method(Method::POST)
        .uri(token_uri)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Full::new(Bytes::from(body)))
        .map_err(|e| AuthError::Other(e.to_string()))?;

    let resp = client.request(req).await?;
    let status = resp.status();
    let body = http_body_util::BodyExt::collect(resp.into_body()).await?.to_bytes();

    if status != StatusCode::OK {
        let message = match serde_json::from_slice::<TokenErrorResponse>(&body) {
            Ok(e) => match e.error_description {
                Some(description) => format!("{}: {}", e.error, description),
                None => e.error,
            },
            Err(_) => String::from_utf8_lossy(&body).into_owned(),
        };
        return Err(AuthError::TokenEndpoint { status: status.as_u16(), message });
    }

    Ok(serde_json::from_slice(&body)?)
}

fn expiry_from(expires_in: Option<i64>) -> Option<DateTime<Utc>> {
    expires_in.map(|secs| Utc::now() + chrono::Duration::seconds(secs))
}

fn granted_scopes(scope: Option<&str>, requested: &[String]) -> Vec<String> {
    match scope {
        Some(scope) if !scope.trim().is_empty() => scope.split_whitespace().map(String::from).collect(),
        _ => requested.to_vec(),
    }
}

pub async fn exchange_code(
    client: &FullClient,
    secrets: &ClientSecrets,
    code: &str,
    redirect_uri: &str,
    verifier: &str,
    scopes: &[String],
) -> Result<TokenRecord, AuthError> {
    let response = post_token_form(
        client,
        &secrets.token_uri,
        &[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("code_verifier", verifier),
        ],
    )
    .await?;

    Ok(TokenRecord {
        expiry: expiry_from(response.expires_in),
        scopes: granted_scopes(response.scope.as_deref(), scopes),
        token: response.access_token,
        refresh_token: response.refresh_token,
        token_uri: secrets.token_uri.clone(),
        client_id: secrets.client_id.clone(),
        client_secret: secrets.client_secret.clone(),
    })
}

/// Keeps the old refresh token when the endpoint does not rotate it.
pub async fn refresh_token(client: &FullClient, record: &TokenRecord) -> Result<TokenRecord, AuthError> {
    let refresh_token = record.refresh_token.as_deref().ok_or(AuthError::NoRefreshToken)?;

    let response = post_token_form(
        client,
        &record.token_uri,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", record.client_id.as_str()),
            ("client_secret", record.client_secret.as_str()),
        ],
    )
    .await?;

    Ok(TokenRecord {
        expiry: expiry_from(response.expires_in),
        scopes: granted_scopes(response.scope.as_deref(), &record.scopes),
        token: response.access_token,
        refresh_token: response.refresh_token.or_else(|| record.refresh_token.clone()),
        token_uri: record.token_uri.clone(),
        client_id: record.client_id.clone(),
        client_secret: record.client_secret.clone(),
    })
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub client_secrets: PathBuf,
    pub token_cache: PathBuf,
    pub scopes: Vec<String>,
    pub open_browser: bool,
    pub redirect_port: u16,
    pub timeout: Duration,
}

pub struct Authenticator {
    settings: AuthSettings,
    client: FullClient,
    cache: TokenCache,
    current: Mutex<Option<TokenRecord>>,
}

impl Authenticator {
    pub fn new(settings: AuthSettings, client: FullClient) -> Self {
        Authenticator {
            cache: TokenCache::new(&settings.token_cache),
            settings,
            client,
            current: Mutex::new(None),
        }
    }

    /// Cache, then refresh, then the browser flow.
    pub async fn authenticate(&self) -> Result<TokenRecord, AuthError> {
        let cached = self.cache.load()?;
        let now = Utc::now();

        let record = match cached {
            Some(record) if record.is_valid(now) && record.has_scopes(&self.settings.scopes) => {
                tracing::info!("Using cached credentials from {}", self.cache.path().display());
                record
            }
            Some(record) if record.refresh_token.is_some() && record.has_scopes(&self.settings.scopes) => {
                tracing::info!("Refreshing expired credentials");
                let fresh = match refresh_token(&self.client, &record).await {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        tracing::warn!("Token refresh failed: {}; starting a new authorization", e);
                        self.run_flow().await?
                    }
                };
                self.cache.save(&fresh)?;
                fresh
            }
            _ => {
                let fresh = self.run_flow().await?;
                self.cache.save(&fresh)?;
                fresh
            }
        };

        *self.current.lock().await = Some(record.clone());
        Ok(record)
    }

    /// A usable access token, refreshed first when it is about to expire.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let existing = self.current.lock().await.clone();

        match existing {
            Some(record) if record.is_valid(Utc::now()) => Ok(record.token),
            Some(record) if record.refresh_token.is_some() => {
                tracing::debug!("Access token expiring, refreshing");
                let fresh = refresh_token(&self.client, &record).await?;
                self.cache.save(&fresh)?;
                let token = fresh.token.clone();
                *self.current.lock().await = Some(fresh);
                Ok(token)
            }
            _ => Ok(self.authenticate().await?.token),
        }
    }

    async fn run_flow(&self) -> Result<TokenRecord, AuthError> {
        let secrets = ClientSecrets::from_file(&self.settings.client_secrets)?;

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, self.settings.redirect_port))
            .await
            .map_err(|e| AuthError::CallbackServer(e.to_string()))?;
        let port = listener
            .local_addr()
            .map_err(|e| AuthError::CallbackServer(e.to_string()))?
            .port();
        let redirect_uri = format!("http://127.0.0.1:{}/", port);

        let state = random_string(32);
        let pkce = Pkce::generate();
        let url = authorization_url(&secrets, &redirect_uri, &self.settings.scopes, &state, &pkce)?;

        tracing::info!("Please visit this URL to authorize this application: {}", url);
        if self.settings.open_browser {
            if let Err(e) = open_browser(url.as_str()) {
                tracing::warn!("Could not open a browser: {}", e);
            }
        }

        let query = wait_for_callback(listener, self.settings.timeout).await?;
        let code = parse_callback(&query, &state)?;

        tracing::debug!("Received authorization code, exchanging it for tokens");
        exchange_code(&self.client, &secrets, &code, &redirect_uri, &pkce.verifier, &self.settings.scopes).await
    }
}

#[derive(Clone)]
pub enum TokenSource {
    Static(String),
    OAuth(Arc<Authenticator>),
}

impl TokenSource {
    pub async fn bearer(&self) -> Result<String, AuthError> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::OAuth(authenticator) => authenticator.access_token().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(expiry: Option<DateTime<Utc>>) -> TokenRecord {
        TokenRecord {
            token: "ya29.token".into(),
            refresh_token: Some("1//refresh".into()),
            token_uri: DEFAULT_TOKEN_URI.into(),
            client_id: "id.apps.googleusercontent.com".into(),
            client_secret: "secret".into(),
            scopes: vec![YOUTUBE_SCOPE.into()],
            expiry,
        }
    }

    #[test]
    fn client_secrets_installed_and_web() {
        let installed = ClientSecrets::from_json(
            r#"{"installed":{"client_id":"cid","client_secret":"cs","project_id":"p",
                "auth_uri":"https://accounts.google.com/o/oauth2/auth",
                "token_uri":"https://oauth2.googleapis.com/token","redirect_uris":["http://localhost"]}}"#,
        )
        .unwrap();
        assert_eq!(installed.client_id, "cid");
        assert_eq!(installed.token_uri, DEFAULT_TOKEN_URI);

        let web = ClientSecrets::from_json(r#"{"web":{"client_id":"w","client_secret":"s"}}"#).unwrap();
        assert_eq!(web.client_id, "w");
        assert_eq!(web.auth_uri, DEFAULT_AUTH_URI);

        assert!(matches!(
            ClientSecrets::from_json(r#"{"other":{}}"#),
            Err(AuthError::InvalidClientSecrets(_))
        ));
    }

    #[test]
    fn missing_client_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientSecrets::from_file(&dir.path().join("credentials.json")).unwrap_err();
        assert!(matches!(err, AuthError::MissingClientSecrets(_)));
    }

    #[test]
    fn token_validity_honours_refresh_threshold() {
        let now = Utc::now();
        assert!(record(Some(now + chrono::Duration::hours(1))).is_valid(now));
        assert!(!record(Some(now + chrono::Duration::seconds(60))).is_valid(now));
        assert!(!record(Some(now - chrono::Duration::seconds(1))).is_valid(now));
        assert!(record(None).is_valid(now));
    }

    #[test]
    fn scopes_must_cover_request() {
        let r = record(None);
        assert!(r.has_scopes(&[YOUTUBE_SCOPE.to_string()]));
        assert!(!r.has_scopes(&["https://www.googleapis.com/auth/youtube.upload".to_string()]));
    }

    #[test]
    fn token_cache_missing_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");

        let cache = TokenCache::new(&path);
        assert_eq!(cache.load().unwrap(), None);

        std::fs::write(&path, "").unwrap();
        assert_eq!(cache.load().unwrap(), None);

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(cache.load().unwrap(), None);
    }

    #[test]
    fn token_cache_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path().join("nested").join("token.json"));

        let saved = record(Some("2030-01-01T00:00:00Z".parse().unwrap()));
        cache.save(&saved).unwrap();
        assert_eq!(cache.load().unwrap(), Some(saved));
    }

    #[test]
    fn token_cache_reads_google_authorized_user_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(
            &path,
            r#"{"token": "ya29.a0", "refresh_token": "1//0g", "token_uri": "https://oauth2.googleapis.com/token",
                "client_id": "cid", "client_secret": "cs", "scopes": ["https://www.googleapis.com/auth/youtube"],
                "universe_domain": "googleapis.com", "account": "", "expiry": "2024-05-01T12:00:00.123456Z"}"#,
        )
        .unwrap();

        let loaded = TokenCache::new(&path).load().unwrap().unwrap();
        assert_eq!(loaded.token, "ya29.a0");
        assert_eq!(loaded.refresh_token.as_deref(), Some("1//0g"));
        assert!(!loaded.is_valid(Utc::now()));
    }

    #[test]
    fn pkce_challenge_matches_rfc7636() {
        let pkce = Pkce::from_verifier("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".into());
        assert_eq!(pkce.challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
        assert_eq!(Pkce::generate().verifier.len(), 64);
    }

    #[test]
    fn authorization_url_carries_flow_parameters() {
        let secrets = ClientSecrets::from_json(r#"{"installed":{"client_id":"cid","client_secret":"cs"}}"#).unwrap();
        let pkce = Pkce::from_verifier("verifier".into());
        let url = authorization_url(&secrets, "http://127.0.0.1:8080/", &[YOUTUBE_SCOPE.to_string()], "xyz", &pkce).unwrap();

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(params["client_id"], "cid");
        assert_eq!(params["redirect_uri"], "http://127.0.0.1:8080/");
        assert_eq!(params["scope"], YOUTUBE_SCOPE);
        assert_eq!(params["state"], "xyz");
        assert_eq!(params["code_challenge"], pkce.challenge);
        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params["access_type"], "offline");
    }

    #[test]
    fn callback_parsing() {
        assert_eq!(parse_callback("state=abc&code=4%2F0Ad", "abc").unwrap(), "4/0Ad");
        assert!(matches!(parse_callback("state=zzz&code=c", "abc"), Err(AuthError::StateMismatch)));
        assert!(matches!(
            parse_callback("error=access_denied&state=abc", "abc"),
            Err(AuthError::Denied(e)) if e == "access_denied"
        ));
        assert!(matches!(parse_callback("state=abc", "abc"), Err(AuthError::MissingCode)));

        assert!(is_callback("code=1&state=2"));
        assert!(is_callback("error=access_denied"));
        assert!(!is_callback(""));
    }

    #[test]
    fn granted_scopes_fall_back_to_request() {
        let requested = vec![YOUTUBE_SCOPE.to_string()];
        assert_eq!(granted_scopes(None, &requested), requested);
        assert_eq!(
            granted_scopes(Some("a b"), &requested),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
