//! HLS playlist types.

use serde::{Deserialize, Serialize};
use vf_core::video::media_playlist_name;
use vf_core::{ResolutionTier, VideoId};

/// Protocol version advertised by master playlists built from tiers.
pub const MASTER_PLAYLIST_VERSION: u8 = 3;

/// A stream variant in a master playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Peak bandwidth in bits per second.
    pub bandwidth: u64,
    /// Optional resolution as (width, height).
    pub resolution: Option<(u32, u32)>,
    /// URI to the media playlist for this variant, relative to the master.
    pub uri: String,
}

impl Variant {
    /// The variant ffmpeg produces for `tier` of `video_id`.
    pub fn for_tier(video_id: VideoId, tier: &ResolutionTier) -> Self {
        Self {
            bandwidth: tier.bandwidth(),
            resolution: Some((tier.width, tier.height)),
            uri: media_playlist_name(video_id, tier),
        }
    }
}

/// An HLS master playlist containing multiple stream variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterPlaylist {
    /// Value of `#EXT-X-VERSION`; `None` omits the tag.
    pub version: Option<u8>,
    /// Stream variants in presentation order.
    pub variants: Vec<Variant>,
}

impl MasterPlaylist {
    /// One variant per tier, in tier order.
    pub fn from_tiers(video_id: VideoId, tiers: &[ResolutionTier]) -> Self {
        Self {
            version: Some(MASTER_PLAYLIST_VERSION),
            variants: tiers
                .iter()
                .map(|tier| Variant::for_tier(video_id, tier))
                .collect(),
        }
    }
}
