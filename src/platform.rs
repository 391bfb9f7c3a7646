/// Where a URL points, decided by host-substring matching. No network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Website,
    TikTok,
    YouTube,
}

impl Platform {
    pub fn from_url(url: &str) -> Platform {
        let lower = url.to_lowercase();
        if lower.contains("tiktok.com") {
            Platform::TikTok
        } else if lower.contains("youtube.com") || lower.contains("youtu.be") {
            Platform::YouTube
        } else {
            Platform::Website
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Platform::TikTok | Platform::YouTube)
    }

    /// Lowercase identifier used in source labels (`tiktok-video`).
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Website => "website",
            Platform::TikTok => "tiktok",
            Platform::YouTube => "youtube",
        }
    }

    /// Capitalized name used as the `host` of video records.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Website => "Website",
            Platform::TikTok => "Tiktok",
            Platform::YouTube => "Youtube",
        }
    }
}
