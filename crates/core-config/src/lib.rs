//! Configuration loading and parsing.
//!
//! Parses `multicursor.toml` (or an override path provided by the binary),
//! extracting the `[cursor]` table:
//!
//! ```toml
//! [cursor]
//! merge_overlapping = true
//! limit = 10000
//! ```
//!
//! Missing files and parse failures both fall back to defaults so a broken
//! config never prevents startup. Unknown fields are ignored to allow forward
//! evolution without immediate warnings.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "multicursor.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CursorSection {
    /// Merge cursors whose selections overlap (or touch, for carets) after each operation.
    #[serde(default = "CursorSection::default_merge_overlapping")]
    pub merge_overlapping: bool,
    /// Upper bound on the number of cursors kept when selections are replaced.
    #[serde(default = "CursorSection::default_limit")]
    pub limit: usize,
}

impl Default for CursorSection {
    fn default() -> Self {
        Self {
            merge_overlapping: Self::default_merge_overlapping(),
            limit: Self::default_limit(),
        }
    }
}

impl CursorSection {
    const fn default_merge_overlapping() -> bool {
        true
    }
    const fn default_limit() -> usize {
        10_000
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub cursor: CursorSection,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("multicursor").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
            })
        }
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e,
                "config_parse_failed_using_defaults"
            );
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn merge_overlapping(&self) -> bool {
        self.file.cursor.merge_overlapping
    }

    /// Cursor limit with a floor of one (the primary cursor always exists).
    pub fn effective_cursor_limit(&self) -> usize {
        let raw = self.file.cursor.limit;
        if raw == 0 {
            info!(target: "config", raw, clamped = 1, "cursor_limit_clamped");
            return 1;
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn capture<F: FnOnce()>(f: F) -> String {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        with_default(subscriber, f);
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.merge_overlapping());
        assert_eq!(cfg.effective_cursor_limit(), 10_000);
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn parses_cursor_section() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[cursor]\nmerge_overlapping = false\nlimit = 8\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(!cfg.merge_overlapping());
        assert_eq!(cfg.effective_cursor_limit(), 8);
        assert!(cfg.raw.is_some());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[cursor]\nlimit = 3\n[unrelated]\nx = 1\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.merge_overlapping());
        assert_eq!(cfg.file.cursor.limit, 3);
    }

    #[test]
    fn parse_error_falls_back_and_warns() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[cursor\nmerge_overlapping = ").unwrap();
        let path = tmp.path().to_path_buf();
        let mut cfg = None;
        let log_output = capture(|| {
            cfg = Some(load_from(Some(path)).unwrap());
        });
        let cfg = cfg.unwrap();
        assert!(cfg.merge_overlapping());
        assert!(cfg.raw.is_none());
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config_parse_failed_using_defaults"));
    }

    #[test]
    fn zero_limit_clamps_to_one_and_logs() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[cursor]\nlimit = 0\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let mut limit = 0;
        let log_output = capture(|| {
            limit = cfg.effective_cursor_limit();
        });
        assert_eq!(limit, 1);
        assert!(log_output.contains("INFO config:"));
        assert!(log_output.contains("cursor_limit_clamped"));
    }
}
