use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::id::{SongId, UserId};

/// Where a song's reference link points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Youtube,
    Spotify,
    Soundcloud,
    Other,
}

impl LinkKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Spotify => "spotify",
            Self::Soundcloud => "soundcloud",
            Self::Other => "other",
        }
    }

    /// Parse a link kind from its stored name (unknown values become Other)
    #[must_use]
    pub fn from_str_name(s: &str) -> Self {
        Self::from_str(s).unwrap_or(Self::Other)
    }
}

impl FromStr for LinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "youtube" => Ok(Self::Youtube),
            "spotify" => Ok(Self::Spotify),
            "soundcloud" => Ok(Self::Soundcloud),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown link kind: {s}")),
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// External reference for a song (recording, sheet, playlist entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongLink {
    pub kind: LinkKind,
    pub url: String,
}

/// A song in the community repertoire.
///
/// `created_by` is nullable: songs imported before identity linking existed
/// have no creator and are editable only by song editors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub description: String,
    pub link: Option<SongLink>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user signed up for a role on a song. Unique per (song, role, user).
///
/// Role slots themselves ("vocals", "drums", ...) are stored as
/// (song, role) rows and surface as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub song_id: SongId,
    pub role: String,
    pub user_id: UserId,
}

/// Song plus role slots, assignments, and the caller's edit rights.
/// `editable_by_me` is derived at read time, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongDetails {
    #[serde(flatten)]
    pub song: Song,
    pub available_roles: Vec<String>,
    pub assignments: Vec<RoleAssignment>,
    pub editable_by_me: bool,
}

/// Listing row: song with its role slots and the caller's edit rights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongSummary {
    #[serde(flatten)]
    pub song: Song,
    pub available_roles: Vec<String>,
    pub editable_by_me: bool,
}

/// Fields accepted by song create/update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SongFields {
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub description: String,
    pub link: Option<SongLink>,
}

/// Search + pagination parameters for song listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SongListQuery {
    pub query: Option<String>,
    pub page_size: Option<i64>,
    pub page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_kind_round_trips_through_str() {
        for kind in [
            LinkKind::Youtube,
            LinkKind::Spotify,
            LinkKind::Soundcloud,
            LinkKind::Other,
        ] {
            assert_eq!(LinkKind::from_str_name(kind.as_str()), kind);
        }
    }

    #[test]
    fn unknown_link_kind_becomes_other() {
        assert_eq!(LinkKind::from_str_name("myspace"), LinkKind::Other);
    }
}
