use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub video_count: u32,
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} videos)", self.title, self.video_count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaylistVideo {
    pub video_id: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    #[default]
    Private,
    Unlisted,
    Public,
}

impl fmt::Display for PrivacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrivacyStatus::Private => "private",
            PrivacyStatus::Unlisted => "unlisted",
            PrivacyStatus::Public => "public",
        })
    }
}

/// A video that could not be added after every retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertFailure {
    pub video_id: String,
    pub error: String,
    /// 1-based position in the submitted batch.
    pub position: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertReport {
    pub added: usize,
    pub failed: Vec<InsertFailure>,
}

impl InsertReport {
    pub fn total(&self) -> usize {
        self.added + self.failed.len()
    }
}
