use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

const EMBED_BASE: &str = "https://www.youtube.com/embed/";
const VIDEO_ID_LEN: usize = 11;

static VIDEO_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
        .expect("video id regex should compile")
});

/// Page-level parameters passed to the embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedOptions {
    /// Origin of the page hosting the frame; the player posts messages to it.
    pub origin: String,
}

/// Pull the 11-character video id out of a watch, short or embed URL.
pub fn extract_video_id(video_url: &str) -> Option<&str> {
    let captures = VIDEO_ID_PATTERN.captures(video_url)?;
    let id = captures.get(2)?.as_str();
    (id.len() == VIDEO_ID_LEN).then_some(id)
}

/// Build the iframe `src` for a catalog video URL, with the JS API enabled so
/// the player reports state changes back to `options.origin`.
pub fn embed_url(video_url: &str, options: &EmbedOptions) -> Option<Url> {
    let video_id = extract_video_id(video_url)?;
    let mut url = Url::parse(EMBED_BASE).ok()?.join(video_id).ok()?;
    url.query_pairs_mut()
        .append_pair("enablejsapi", "1")
        .append_pair("origin", &options.origin)
        .append_pair("modestbranding", "1")
        .append_pair("rel", "0")
        .append_pair("autoplay", "0");
    Some(url)
}
