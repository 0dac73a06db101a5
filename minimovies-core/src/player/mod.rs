//! Trust boundary for the embedded video player.
//!
//! The player runs in an isolated frame and only talks to the page through
//! cross-context messages. Everything arriving from it is untrusted: the
//! origin is checked first, then the payload is decoded into a closed set of
//! events. Anything that does not fit is discarded, never surfaced as an
//! error to the viewer.

pub mod embed;
pub mod message;
pub mod origin;

pub use embed::{EmbedOptions, embed_url, extract_video_id};
pub use message::{DecodeError, InboundMessage, PlayerEvent, PlayerState};
pub use origin::TrustedOrigin;
