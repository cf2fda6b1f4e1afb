use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hyper::StatusCode;
use thiserror::Error;

use crate::auth::{AuthError, Authenticator, TokenSource};
use crate::config::Config;
use crate::models::{InsertFailure, InsertReport, Playlist, PlaylistVideo, PrivacyStatus};
use crate::{initialize_client, initialize_full_client, shuffle};
use crate::{ClientError, GoogleAPIRequest, YouTubeDataV3Client, YouTubeError};

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Api(#[from] YouTubeError),
    #[error("Client setup failed: {0}")]
    Client(#[from] ClientError),
    #[error("No videos found in playlist '{0}'")]
    EmptyPlaylist(String),
}

impl ManagerError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ManagerError::Api(e) => e.status(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per video, including the first one.
    pub max_retries: u32,
    pub retry_delay: Duration,
    /// Pause after each successful insert.
    pub insert_pacing: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            insert_pacing: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerSettings {
    pub page_size: u32,
    pub privacy_status: PrivacyStatus,
    pub retry: RetryPolicy,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        ManagerSettings {
            page_size: 50,
            privacy_status: PrivacyStatus::Private,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    FetchingVideos { title: String },
    Shuffling { count: usize },
    CreatingPlaylist { title: String },
    AddingVideos { count: usize },
    Added { position: usize, total: usize },
    AttemptFailed { position: usize, attempt: u32, max_attempts: u32, status: Option<StatusCode> },
    GaveUp { position: usize, attempts: u32 },
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::FetchingVideos { title } => write!(f, "Getting videos from '{}'...", title),
            Progress::Shuffling { count } => write!(f, "Found {} videos. Shuffling...", count),
            Progress::CreatingPlaylist { title } => write!(f, "Creating new playlist '{}'...", title),
            Progress::AddingVideos { count } => write!(f, "Adding {} videos to new playlist...", count),
            Progress::Added { position, total } => write!(f, "Added video {}/{}", position, total),
            Progress::AttemptFailed { position, attempt, max_attempts, status } => match status {
                Some(status) => write!(f, "Attempt {}/{} failed for video {}: {}", attempt, max_attempts, position, status.as_u16()),
                None => write!(f, "Attempt {}/{} failed for video {}: unknown", attempt, max_attempts, position),
            },
            Progress::GaveUp { position, attempts } => {
                write!(f, "Failed to add video {} after {} attempts", position, attempts)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleOutcome {
    pub playlist_id: String,
    pub title: String,
    pub total: usize,
    pub report: InsertReport,
}

/// Picks the continuation token for the next page. A missing, empty or already seen token
/// ends the listing.
fn next_page(seen: &mut HashSet<String>, next: Option<String>) -> Option<String> {
    match next {
        Some(next) if next.is_empty() => None,
        Some(next) if !seen.insert(next.clone()) => {
            tracing::warn!("Server repeated page token {}; stopping pagination", next);
            None
        }
        next => next,
    }
}

pub struct PlaylistManager {
    client: YouTubeDataV3Client,
    tokens: TokenSource,
    settings: ManagerSettings,
}

impl PlaylistManager {
    pub fn new(client: YouTubeDataV3Client, tokens: TokenSource, settings: ManagerSettings) -> Self {
        PlaylistManager { client, tokens, settings }
    }

    pub async fn connect(config: &Config) -> Result<Self, ManagerError> {
        let client = initialize_client()?;
        let full_client = initialize_full_client()?;

        let authenticator = Authenticator::new(config.auth_settings(), full_client.clone());
        authenticator.authenticate().await?;

        Ok(PlaylistManager::new(
            YouTubeDataV3Client::new(config.api_base_url.clone(), client, full_client),
            TokenSource::OAuth(Arc::new(authenticator)),
            config.manager_settings(),
        ))
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    pub async fn get_user_playlists(&self) -> Result<Vec<Playlist>, ManagerError> {
        let mut playlists = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let bearer = self.tokens.bearer().await?;
            let page = self
                .client
                .list_playlists(page_token.clone(), Some(self.settings.page_size))
                .with_bearer_token(&bearer)
                .send()
                .await?;

            playlists.extend(page.playlists);

            match next_page(&mut seen, page.next_page_token) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!("Fetched {} playlists", playlists.len());
        Ok(playlists)
    }

    pub async fn get_playlist_videos(&self, playlist_id: &str) -> Result<Vec<PlaylistVideo>, ManagerError> {
        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let bearer = self.tokens.bearer().await?;
            let page = self
                .client
                .list_playlist_items(playlist_id.to_string(), page_token.clone(), Some(self.settings.page_size))
                .with_bearer_token(&bearer)
                .send()
                .await?;

            tracing::trace!("Playlist page with {} items (total {:?})", page.items.len(), page.total_results);
            videos.extend(page.items);

            match next_page(&mut seen, page.next_page_token) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!("Fetched {} videos from playlist {}", videos.len(), playlist_id);
        Ok(videos)
    }

    pub fn shuffle_videos(&self, videos: &[PlaylistVideo]) -> Vec<PlaylistVideo> {
        shuffle::shuffle_videos(videos)
    }

    pub async fn create_new_playlist(&self, title: &str, description: &str) -> Result<String, ManagerError> {
        let bearer = self.tokens.bearer().await?;
        let id = self
            .client
            .create_playlist(title.to_string(), description.to_string())
            .with_privacy_status(self.settings.privacy_status)
            .with_bearer_token(&bearer)
            .send()
            .await?;

        tracing::info!("Created playlist '{}' ({})", title, id);
        Ok(id)
    }

    async fn insert_once(&self, playlist_id: &str, video_id: &str) -> Result<String, ManagerError> {
        let bearer = self.tokens.bearer().await?;
        let id = self
            .client
            .insert_playlist_item(playlist_id.to_string(), video_id.to_string())
            .with_bearer_token(&bearer)
            .send()
            .await?;
        Ok(id)
    }

    pub async fn add_videos_to_playlist(&self, playlist_id: &str, video_ids: &[String]) -> InsertReport {
        self.add_videos_to_playlist_with(playlist_id, video_ids, |_| {}).await
    }

    // One insert at a time, in order. A video that fails every attempt goes into the report.
    pub async fn add_videos_to_playlist_with<F>(
        &self,
        playlist_id: &str,
        video_ids: &[String],
        mut on_progress: F,
    ) -> InsertReport
    where
        F: FnMut(Progress),
    {
        let retry = self.settings.retry;
        let max_attempts = retry.max_retries.max(1);
        let total = video_ids.len();
        let mut report = InsertReport::default();

        for (index, video_id) in video_ids.iter().enumerate() {
            let position = index + 1;
            let mut attempt = 1;

            loop {
                match self.insert_once(playlist_id, video_id).await {
                    Ok(_) => {
                        report.added += 1;
                        tracing::debug!("Added video {}/{}", position, total);
                        on_progress(Progress::Added { position, total });

                        if !retry.insert_pacing.is_zero() {
                            tokio::time::sleep(retry.insert_pacing).await;
                        }
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Attempt {}/{} failed for video {} ({}): {}", attempt, max_attempts, position, video_id, e);
                        on_progress(Progress::AttemptFailed {
                            position,
                            attempt,
                            max_attempts,
                            status: e.status(),
                        });

                        if attempt < max_attempts {
                            tokio::time::sleep(retry.retry_delay).await;
                            attempt += 1;
                            continue;
                        }

                        tracing::warn!("Failed to add video {} after {} attempts", position, max_attempts);
                        on_progress(Progress::GaveUp { position, attempts: max_attempts });
                        report.failed.push(InsertFailure {
                            video_id: video_id.clone(),
                            error: e.to_string(),
                            position,
                        });
                        break;
                    }
                }
            }
        }

        report
    }

    /// Copies `source` into a new playlist named `new_name`, in random order.
    pub async fn shuffle_into_new_playlist<F>(
        &self,
        source: &Playlist,
        new_name: &str,
        mut on_progress: F,
    ) -> Result<ShuffleOutcome, ManagerError>
    where
        F: FnMut(Progress),
    {
        on_progress(Progress::FetchingVideos { title: source.title.clone() });
        let videos = self.get_playlist_videos(&source.id).await?;

        if videos.is_empty() {
            return Err(ManagerError::EmptyPlaylist(source.title.clone()));
        }

        on_progress(Progress::Shuffling { count: videos.len() });
        let shuffled = self.shuffle_videos(&videos);

        on_progress(Progress::CreatingPlaylist { title: new_name.to_string() });
        let description = format!("Shuffled version of {}", source.title);
        let playlist_id = self.create_new_playlist(new_name, &description).await?;

        on_progress(Progress::AddingVideos { count: shuffled.len() });
        let video_ids: Vec<String> = shuffled.into_iter().map(|v| v.video_id).collect();
        let report = self
            .add_videos_to_playlist_with(&playlist_id, &video_ids, &mut on_progress)
            .await;

        Ok(ShuffleOutcome {
            playlist_id,
            title: new_name.to_string(),
            total: videos.len(),
            report,
        })
    }
}
