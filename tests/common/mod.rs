//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a temporary media
//! root, and stand-in `ffprobe`/`ffmpeg` shell scripts so the whole pipeline
//! runs without real encoders.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vf_av::ToolRegistry;
use vf_core::config::Config;
use vf_core::{VideoAsset, VideoId};
use vf_pipeline::PipelineContext;
use vodforge::App;

/// How the fake ffprobe behaves.
pub enum FakeProbe {
    /// Print this to stdout and exit 0.
    Prints(&'static str),
    /// Print to stderr and exit 1.
    Fails,
}

/// How the fake ffmpeg behaves.
#[derive(Default)]
pub struct FakeEncoder {
    /// Exit 1 when asked to produce this height.
    pub fail_height: Option<u32>,
}

/// Write an executable `#!/bin/sh` script.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("failed to write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("failed to chmod script");
    path
}

fn fake_ffprobe(dir: &Path, behavior: &FakeProbe) -> PathBuf {
    let body = match behavior {
        FakeProbe::Prints(out) => format!("echo '{out}'"),
        FakeProbe::Fails => "echo 'Invalid data found when processing input' >&2\nexit 1".to_string(),
    };
    write_script(dir, "ffprobe", &body)
}

/// An ffmpeg stand-in: appends the output playlist path to `ffmpeg.log`,
/// then writes the playlist and a first segment where the real encoder would.
fn fake_ffmpeg(dir: &Path, encoder: &FakeEncoder) -> PathBuf {
    let log = dir.join("ffmpeg.log");
    let fail = match encoder.fail_height {
        Some(h) => format!(
            "case \"$out\" in *_{h}p.m3u8) echo 'Conversion failed!' >&2; exit 1;; esac"
        ),
        None => String::new(),
    };
    let body = format!(
        r#"prev=""
seg=""
for a in "$@"; do
  if [ "$prev" = "-hls_segment_filename" ]; then seg="$a"; fi
  prev="$a"
  out="$a"
done
echo "$out" >> '{log}'
{fail}
printf '#EXTM3U\n#EXT-X-PLAYLIST-TYPE:VOD\n#EXT-X-ENDLIST\n' > "$out"
: > "$(echo "$seg" | sed 's/%03d/000/')""#,
        log = log.display(),
    );
    write_script(dir, "ffmpeg", &body)
}

/// Test harness wrapping an [`App`] with fake tools.
pub struct TestHarness {
    pub app: App,
    /// Holds uploads, the media root and the tool scripts.
    pub root: TempDir,
}

impl TestHarness {
    /// ffprobe reports 12.345 s, ffmpeg succeeds for every tier.
    pub fn new() -> Self {
        Self::with_tools(FakeProbe::Prints("12.345"), FakeEncoder::default())
    }

    pub fn with_tools(probe: FakeProbe, encoder: FakeEncoder) -> Self {
        Self::build(Config::default(), probe, encoder)
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, FakeProbe::Prints("12.345"), FakeEncoder::default())
    }

    fn build(mut config: Config, probe: FakeProbe, encoder: FakeEncoder) -> Self {
        let root = tempfile::tempdir().expect("failed to create temp dir");
        let bin = root.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::create_dir_all(root.path().join("uploads")).unwrap();

        let mut tools = ToolRegistry::empty();
        tools.insert("ffprobe", fake_ffprobe(&bin, &probe));
        tools.insert("ffmpeg", fake_ffmpeg(&bin, &encoder));

        config.media_root = root.path().join("media");
        config.worker.poll_interval_ms = 10;

        let app = App::in_memory(config, tools).expect("failed to build app");
        Self { app, root }
    }

    pub fn ctx(&self) -> &PipelineContext {
        &self.app.ctx
    }

    pub fn media_root(&self) -> &Path {
        &self.app.ctx.config.media_root
    }

    /// Lines appended by the fake ffmpeg, one per invocation.
    pub fn ffmpeg_calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.root.path().join("bin/ffmpeg.log"))
            .map(|s| s.lines().map(String::from).collect())
            .unwrap_or_default()
    }

    /// Write an upload file and return its path.
    pub fn upload(&self, name: &str) -> PathBuf {
        let path = self.root.path().join("uploads").join(name);
        std::fs::write(&path, b"not really a video").unwrap();
        path
    }

    /// Insert a video record with a fixed id and an uploaded source file.
    pub fn insert_video(&self, id: i64, title: &str) -> VideoAsset {
        let source = self.upload(&format!("{id}.mov"));
        let conn = vf_db::pool::get_conn(&self.app.db).unwrap();
        conn.execute(
            "INSERT INTO videos (id, title, source_path, created_at)
             VALUES (?1, ?2, ?3, '2024-01-01T00:00:00Z')",
            rusqlite::params![id, title, source.to_string_lossy()],
        )
        .unwrap();
        drop(conn);
        self.app.get_video(VideoId::new(id)).unwrap().unwrap()
    }
}
