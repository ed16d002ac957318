//! HLS playlist rendering and persistence.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::types::MasterPlaylist;

/// Generate an HLS master playlist (M3U8) from a [`MasterPlaylist`].
///
/// Output is `#EXTM3U`, an optional `#EXT-X-VERSION`, then an
/// `#EXT-X-STREAM-INF` line followed by the variant URI for each variant.
/// Every line ends with `\n`; identical input yields identical bytes.
pub fn generate_master_playlist(playlist: &MasterPlaylist) -> String {
    let mut out = String::from("#EXTM3U\n");

    if let Some(version) = playlist.version {
        out.push_str(&format!("#EXT-X-VERSION:{version}\n"));
    }

    for variant in &playlist.variants {
        out.push_str(&format!("#EXT-X-STREAM-INF:BANDWIDTH={}", variant.bandwidth));

        if let Some((w, h)) = variant.resolution {
            out.push_str(&format!(",RESOLUTION={w}x{h}"));
        }

        out.push('\n');
        out.push_str(&variant.uri);
        out.push('\n');
    }

    out
}

/// Render `playlist` and atomically replace the file at `path` with it.
///
/// The text goes to a temporary file in the destination directory which is
/// then renamed over `path`, so a reader sees either the old manifest or the
/// new one.
///
/// # Errors
///
/// Returns [`vf_core::Error::PlaylistWrite`] if any filesystem step fails.
pub fn write_master_playlist(path: &Path, playlist: &MasterPlaylist) -> vf_core::Result<()> {
    let wrap = |source: std::io::Error| vf_core::Error::PlaylistWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let body = generate_master_playlist(playlist);

    let mut tmp = NamedTempFile::new_in(dir).map_err(wrap)?;
    tmp.write_all(body.as_bytes()).map_err(wrap)?;
    tmp.as_file().sync_all().map_err(wrap)?;

    // NamedTempFile creates 0600 files; the manifest is served to players.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(wrap)?;
    }

    tmp.persist(path).map_err(|e| wrap(e.error))?;

    tracing::debug!(
        path = %path.display(),
        variants = playlist.variants.len(),
        "Wrote master playlist"
    );
    Ok(())
}
