use crate::models::{Playlist, PrivacyStatus};
use crate::utils::{apply_fields, read_body};
use crate::{EmptyClient, FullClient, GoogleAPIRequestFields, YouTubeError};
use http_body_util::{Empty, Full};
use hyper::body::Bytes;
use hyper::{Method, Request};
use serde::{Deserialize, Serialize};

pub struct ListPlaylistsRequest<'a> {
    pub client: &'a EmptyClient,
    pub base_url: &'a str,
    pub fields: GoogleAPIRequestFields<'a>,
    pub page_token: Option<String>,
    pub max_results: Option<u32>,
}

pub struct CreatePlaylistRequest<'a> {
    pub client: &'a FullClient,
    pub base_url: &'a str,
    pub fields: GoogleAPIRequestFields<'a>,
    pub title: String,
    pub description: String,
    pub privacy_status: PrivacyStatus,
}

impl<'a> AsMut<GoogleAPIRequestFields<'a>> for ListPlaylistsRequest<'a> {
    fn as_mut(&mut self) -> &mut GoogleAPIRequestFields<'a> {
        &mut self.fields
    }
}

impl<'a> AsMut<GoogleAPIRequestFields<'a>> for CreatePlaylistRequest<'a> {
    fn as_mut(&mut self) -> &mut GoogleAPIRequestFields<'a> {
        &mut self.fields
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<ApiPlaylist>,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylist {
    id: String,
    snippet: ApiPlaylistSnippet,
    #[serde(rename = "contentDetails")]
    content_details: Option<ApiPlaylistContentDetails>,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylistSnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylistContentDetails {
    #[serde(rename = "itemCount")]
    item_count: u32,
}

#[derive(Debug)]
pub struct ListPlaylistsResponse {
    pub next_page_token: Option<String>,
    pub playlists: Vec<Playlist>,
}

#[derive(Debug, Serialize)]
struct CreatePlaylistRequestBody<'b> {
    snippet: CreatePlaylistSnippet<'b>,
    status: CreatePlaylistStatus,
}

#[derive(Debug, Serialize)]
struct CreatePlaylistSnippet<'b> {
    title: &'b str,
    description: &'b str,
}

#[derive(Debug, Serialize)]
struct CreatePlaylistStatus {
    #[serde(rename = "privacyStatus")]
    privacy_status: PrivacyStatus,
}

#[derive(Debug, Deserialize)]
struct CreatePlaylistResponse {
    id: String,
}

impl<'a> ListPlaylistsRequest<'a> {
    pub async fn send(self) -> Result<ListPlaylistsResponse, YouTubeError> {
        let mut url = format!(
            "{}/youtube/v3/playlists?part=snippet%2CcontentDetails&mine=true",
            self.base_url
        );

        if let Some(max_results) = self.max_results {
            url.push_str(&format!("&maxResults={}", max_results));
        }

        if let Some(page_token) = &self.page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(page_token)));
        }

        tracing::debug!("GET {}", url);

        let req_builder = Request::builder().method(Method::GET).uri(url);

        let req = apply_fields(req_builder, &self.fields)
            .body(Empty::<Bytes>::new())
            .map_err(|e| YouTubeError::Other(Box::new(e)))?;

        let res = self.client.request(req).await?;
        let body = read_body(res).await?;

        let api_response: ApiResponse = serde_json::from_slice(&body)?;

        Ok(ListPlaylistsResponse {
            next_page_token: api_response.next_page_token,
            playlists: api_response
                .items
                .into_iter()
                .map(|item| Playlist {
                    id: item.id,
                    title: item.snippet.title,
                    video_count: item.content_details.map(|c| c.item_count).unwrap_or_default(),
                })
                .collect(),
        })
    }
}

impl<'a> CreatePlaylistRequest<'a> {
    pub fn with_privacy_status(mut self, privacy_status: PrivacyStatus) -> Self {
        self.privacy_status = privacy_status;
        self
    }

    /// Creates the playlist and returns its id.
    pub async fn send(self) -> Result<String, YouTubeError> {
        let url = format!("{}/youtube/v3/playlists?part=snippet%2Cstatus", self.base_url);

        let request_body = CreatePlaylistRequestBody {
            snippet: CreatePlaylistSnippet {
                title: &self.title,
                description: &self.description,
            },
            status: CreatePlaylistStatus {
                privacy_status: self.privacy_status,
            },
        };

        let body_json = serde_json::to_vec(&request_body)?;

        tracing::debug!("POST {}", url);

        let req_builder = Request::builder()
            .method(Method::POST)
            .uri(url)
            .header("Content-Type", "application/json");

        let req = apply_fields(req_builder, &self.fields)
            .body(Full::new(Bytes::from(body_json)))
            .map_err(|e| YouTubeError::Other(Box::new(e)))?;

        let res = self.client.request(req).await?;
        let body = read_body(res).await?;

        let api_response: CreatePlaylistResponse = serde_json::from_slice(&body)?;

        Ok(api_response.id)
    }
}
