use std::error::Error;
use hyper::body::Bytes;
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use http_body_util::{Empty, Full};
use hyper::StatusCode;
use thiserror::Error;
use native_tls::TlsConnector;
use hyper_util::rt::TokioExecutor;


pub mod app;
pub mod auth;
pub mod config;
pub mod console;
pub mod manager;
pub mod models;
pub mod shuffle;
pub mod utils;
pub mod playlists;
pub use playlists::{CreatePlaylistRequest, ListPlaylistsRequest, ListPlaylistsResponse};
pub mod playlist_items;
pub use playlist_items::{InsertPlaylistItemRequest, ListPlaylistItemsRequest, ListPlaylistItemsResponse};

pub const DEFAULT_API_BASE_URL: &str = "https://youtube.googleapis.com";

/// Client used for bodiless requests (GET).
pub type EmptyClient = Client<HttpsConnector<HttpConnector>, Empty<Bytes>>;
/// Client used for requests carrying a JSON or form body (POST).
pub type FullClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    NetworkError(#[from] std::io::Error),
    #[error("TLS error: {0}")]
    TlsError(#[from] native_tls::Error),
}

fn https_connector() -> Result<HttpsConnector<HttpConnector>, ClientError> {
    let mut http = HttpConnector::new();
    // Plain http stays allowed so the base url can point at a local server.
    http.enforce_http(false);

    let tls = TlsConnector::builder().build()?;

    Ok(HttpsConnector::from((http, tls.into())))
}

pub fn initialize_client() -> Result<EmptyClient, ClientError> {
    let client = Client::builder(TokioExecutor::new())
        .build::<_, Empty<Bytes>>(https_connector()?);

    Ok(client)
}

pub fn initialize_full_client() -> Result<FullClient, ClientError> {
    let client = Client::builder(TokioExecutor::new())
        .build::<_, Full<Bytes>>(https_connector()?);

    Ok(client)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GoogleAPIRequestFields<'a> {
    pub bearer_token: Option<&'a str>,
    pub key: Option<&'a str>,
}

pub trait GoogleAPIRequest<'a> {
    fn bearer_token(&mut self) -> &mut Option<&'a str>;

    fn key(&mut self) -> &mut Option<&'a str>;

    fn with_bearer_token(mut self, bearer_token: &'a str) -> Self
    where
        Self: Sized,
    {
        *self.bearer_token() = Some(bearer_token);
        self
    }

    fn with_key(mut self, key: &'a str) -> Self
    where
        Self: Sized,
    {
        *self.key() = Some(key);
        self
    }
}

impl<'a, T> GoogleAPIRequest<'a> for T
where
    T: AsMut<GoogleAPIRequestFields<'a>>,
{
    fn bearer_token(&mut self) -> &mut Option<&'a str> {
        &mut self.as_mut().bearer_token
    }

    fn key(&mut self) -> &mut Option<&'a str> {
        &mut self.as_mut().key
    }
}

#[derive(Error, Debug)]
pub enum YouTubeError {
    #[error("Not found")]
    NotFound,
    #[error("Ratelimited")]
    Ratelimited,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error")]
    InternalServerError,
    #[error("Unknown status code: {0}")]
    UnknownStatusCode(StatusCode),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("HTTP error: {0}")]
    HttpError(#[from] hyper::Error),
    #[error("Legacy HTTP error: {0}")]
    LegacyHttpError(#[from] hyper_util::client::legacy::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Other error: {0}")]
    Other(Box<dyn Error + Send + Sync>),
}

impl YouTubeError {
    /// The HTTP status this error was built from, when there is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            YouTubeError::NotFound => Some(StatusCode::NOT_FOUND),
            YouTubeError::Ratelimited => Some(StatusCode::TOO_MANY_REQUESTS),
            YouTubeError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            YouTubeError::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            YouTubeError::BadRequest(_) => Some(StatusCode::BAD_REQUEST),
            YouTubeError::InternalServerError => Some(StatusCode::INTERNAL_SERVER_ERROR),
            YouTubeError::UnknownStatusCode(status) => Some(*status),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct YouTubeDataV3Client {
    client: EmptyClient,
    full_client: FullClient,
    base_url: String,
}

impl YouTubeDataV3Client {
    pub fn new(base_url: impl Into<String>, client: EmptyClient, full_client: FullClient) -> Self {
        YouTubeDataV3Client {
            client,
            full_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn list_playlists(&self, page_token: Option<String>, max_results: Option<u32>) -> ListPlaylistsRequest<'_> {
        ListPlaylistsRequest {
            client: &self.client,
            base_url: &self.base_url,
            fields: GoogleAPIRequestFields::default(),
            page_token,
            max_results,
        }
    }

    pub fn create_playlist(&self, title: String, description: String) -> CreatePlaylistRequest<'_> {
        CreatePlaylistRequest {
            client: &self.full_client,
            base_url: &self.base_url,
            fields: GoogleAPIRequestFields::default(),
            title,
            description,
            privacy_status: models::PrivacyStatus::default(),
        }
    }

    pub fn list_playlist_items(&self, playlist_id: String, page_token: Option<String>, max_results: Option<u32>) -> ListPlaylistItemsRequest<'_> {
        ListPlaylistItemsRequest {
            client: &self.client,
            base_url: &self.base_url,
            fields: GoogleAPIRequestFields::default(),
            playlist_id,
            page_token,
            max_results,
        }
    }

    pub fn insert_playlist_item(&self, playlist_id: String, video_id: String) -> InsertPlaylistItemRequest<'_> {
        InsertPlaylistItemRequest {
            client: &self.full_client,
            base_url: &self.base_url,
            fields: GoogleAPIRequestFields::default(),
            playlist_id,
            video_id,
        }
    }
}
