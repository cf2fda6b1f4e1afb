use crate::models::PlaylistVideo;
use crate::utils::{apply_fields, read_body};
use crate::{EmptyClient, FullClient, GoogleAPIRequestFields, YouTubeError};
use http_body_util::{Empty, Full};
use hyper::body::Bytes;
use hyper::{Method, Request};
use serde::{Deserialize, Serialize};

pub struct ListPlaylistItemsRequest<'a> {
    pub client: &'a EmptyClient,
    pub base_url: &'a str,
    pub fields: GoogleAPIRequestFields<'a>,
    pub playlist_id: String,
    pub page_token: Option<String>,
    pub max_results: Option<u32>,
}

pub struct InsertPlaylistItemRequest<'a> {
    pub client: &'a FullClient,
    pub base_url: &'a str,
    pub fields: GoogleAPIRequestFields<'a>,
    pub playlist_id: String,
    pub video_id: String,
}

impl<'a> AsMut<GoogleAPIRequestFields<'a>> for ListPlaylistItemsRequest<'a> {
    fn as_mut(&mut self) -> &mut GoogleAPIRequestFields<'a> {
        &mut self.fields
    }
}

impl<'a> AsMut<GoogleAPIRequestFields<'a>> for InsertPlaylistItemRequest<'a> {
    fn as_mut(&mut self) -> &mut GoogleAPIRequestFields<'a> {
        &mut self.fields
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
    #[serde(rename = "pageInfo")]
    page_info: Option<PageInfo>,
    #[serde(default)]
    items: Vec<ApiPlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(rename = "totalResults")]
    total_results: u32,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylistItem {
    snippet: ApiPlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylistItemSnippet {
    #[serde(default)]
    title: String,
    #[serde(rename = "resourceId")]
    resource_id: Option<ApiResourceId>,
}

#[derive(Debug, Deserialize)]
struct ApiResourceId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug)]
pub struct ListPlaylistItemsResponse {
    pub next_page_token: Option<String>,
    pub total_results: Option<u32>,
    pub items: Vec<PlaylistVideo>,
}

#[derive(Debug, Serialize)]
struct InsertPlaylistItemRequestBody<'b> {
    snippet: InsertSnippet<'b>,
}

#[derive(Debug, Serialize)]
struct InsertSnippet<'b> {
    #[serde(rename = "playlistId")]
    playlist_id: &'b str,
    #[serde(rename = "resourceId")]
    resource_id: InsertResourceId<'b>,
}

#[derive(Debug, Serialize)]
struct InsertResourceId<'b> {
    kind: &'static str,
    #[serde(rename = "videoId")]
    video_id: &'b str,
}

#[derive(Debug, Deserialize)]
struct InsertPlaylistItemResponse {
    id: String,
}

impl<'a> ListPlaylistItemsRequest<'a> {
    pub async fn send(self) -> Result<ListPlaylistItemsResponse, YouTubeError> {
        let mut url = format!(
            "{}/youtube/v3/playlistItems?part=snippet&playlistId={}",
            self.base_url,
            urlencoding::encode(&self.playlist_id)
        );

        if let Some(page_token) = &self.page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(page_token)));
        }

        if let Some(max_results) = self.max_results {
            url.push_str(&format!("&maxResults={}", max_results));
        }

        tracing::debug!("GET {}", url);

        let req_builder = Request::builder().method(Method::GET).uri(url);

        let req = apply_fields(req_builder, &self.fields)
            .body(Empty::<Bytes>::new())
            .map_err(|e| YouTubeError::Other(Box::new(e)))?;

        let res = self.client.request(req).await?;
        let body = read_body(res).await?;

        let api_response: ApiResponse = serde_json::from_slice(&body)?;

        let items = api_response
            .items
            .into_iter()
            .filter_map(|item| {
                let title = item.snippet.title;
                match item.snippet.resource_id.and_then(|r| r.video_id) {
                    Some(video_id) => Some(PlaylistVideo { video_id, title }),
                    None => {
                        // Deleted and private videos come back without a resource id.
                        tracing::debug!("Skipping playlist item without a video id: {:?}", title);
                        None
                    }
                }
            })
            .collect();

        Ok(ListPlaylistItemsResponse {
            next_page_token: api_response.next_page_token,
            total_results: api_response.page_info.map(|p| p.total_results),
            items,
        })
    }
}

impl<'a> InsertPlaylistItemRequest<'a> {
    /// Appends the video to the playlist and returns the new playlist item id.
    pub async fn send(self) -> Result<String, YouTubeError> {
        let url = format!("{}/youtube/v3/playlistItems?part=snippet", self.base_url);

        let request_body = InsertPlaylistItemRequestBody {
            snippet: InsertSnippet {
                playlist_id: &self.playlist_id,
                resource_id: InsertResourceId {
                    kind: "youtube#video",
                    video_id: &self.video_id,
                },
            },
        };

        let body_json = serde_json::to_vec(&request_body)?;

        tracing::debug!("POST {} video={}", url, self.video_id);

        let req_builder = Request::builder()
            .method(Method::POST)
            .uri(url)
            .header("Content-Type", "application/json");

        let req = apply_fields(req_builder, &self.fields)
            .body(Full::new(Bytes::from(body_json)))
            .map_err(|e| YouTubeError::Other(Box::new(e)))?;

        let res = self.client.request(req).await?;
        let body = read_body(res).await?;

        let api_response: InsertPlaylistItemResponse = serde_json::from_slice(&body)?;

        Ok(api_response.id)
    }
}
