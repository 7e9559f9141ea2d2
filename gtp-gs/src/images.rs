//! Image URL resolution with local-cache fallback
//!
//! Players and clubs resolve to a locally downloaded file under the static
//! root when one exists, then to the scraped external URL, then to a bundled
//! placeholder. The server only serves `static_root`; downloading images is
//! a separate offline step.

use std::path::PathBuf;

/// Web prefix the image directory is mounted under.
const STATIC_BASE: &str = "/static/images";

#[derive(Debug, Clone)]
pub struct ImageResolver {
    static_root: PathBuf,
}

impl ImageResolver {
    pub fn new(static_root: impl Into<PathBuf>) -> Self {
        ImageResolver {
            static_root: static_root.into(),
        }
    }

    /// URL for a player portrait.
    pub fn player_image_url(&self, player_id: &str, external_url: Option<&str>) -> String {
        let local = self
            .static_root
            .join("images")
            .join("players")
            .join(format!("{player_id}.jpg"));
        if local.exists() {
            return format!("{STATIC_BASE}/players/{player_id}.jpg");
        }

        if let Some(url) = external_url.filter(|u| u.starts_with("http")) {
            return url.to_string();
        }

        format!("{STATIC_BASE}/placeholders/default-player.png")
    }

    /// URL for a club crest, given the scraped logo URL if any.
    pub fn club_logo_url(&self, external_url: Option<&str>) -> String {
        if let Some(url) = external_url {
            if let Some(club_id) = extract_club_id(url) {
                let local = self
                    .static_root
                    .join("images")
                    .join("clubs")
                    .join(format!("{club_id}.png"));
                if local.exists() {
                    return format!("{STATIC_BASE}/clubs/{club_id}.png");
                }
            }

            if url.starts_with("http") {
                return url.to_string();
            }
        }

        format!("{STATIC_BASE}/placeholders/default-club.png")
    }
}

/// Club id from a scraped crest URL.
///
/// Filenames look like `CLUB_ID.png` or `CLUB_ID_timestamp.png`.
pub fn extract_club_id(url: &str) -> Option<String> {
    let filename = url.rsplit('/').next()?;
    let id = filename.split('.').next()?.split('_').next()?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
