use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use thiserror::Error;

use crate::config::{DEFAULT_EXTENSION, DOWNLOAD_CHUNK_SIZE, RECOGNIZED_EXTENSIONS};
use crate::library::{Asset, MediaLibrary};

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("download request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("download of {url} returned {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("failed downloading to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A local copy of a remote asset, alive for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub path: PathBuf,
    pub display_name: String,
    pub bytes: u64,
}

impl StagedFile {
    /// Delete the local copy. Failure is logged and otherwise ignored.
    pub fn remove(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!("removed staged file {}", self.path.display()),
            Err(e) => warn!("could not remove staged file {}: {}", self.path.display(), e),
        }
    }
}

fn trailing_segment(public_id: &str) -> &str {
    public_id.rsplit('/').next().unwrap_or(public_id)
}

/// Local filename for an asset: the last path segment, with `.mp4` appended
/// unless it already carries a recognised video extension.
pub fn local_filename(public_id: &str) -> String {
    let name = trailing_segment(public_id);
    let lower = name.to_ascii_lowercase();
    if RECOGNIZED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        name.to_string()
    } else {
        format!("{name}{DEFAULT_EXTENSION}")
    }
}

/// Human-readable name: `Clips/great_goal.mp4` becomes `Great Goal`.
pub fn display_name(public_id: &str) -> String {
    let stem = trailing_segment(public_id)
        .split('.')
        .next()
        .unwrap_or_default();
    let spaced: String = stem
        .chars()
        .map(|c| if c == '_' { ' ' } else { c })
        .collect();
    title_case(&spaced)
}

// Upper-case a letter that follows a non-letter, lower-case every other letter.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

fn progress_bar(len: Option<u64>) -> ProgressBar {
    match len {
        Some(n) => {
            let bar = ProgressBar::new(n);
            bar.set_style(
                ProgressStyle::with_template(
                    "[{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
            );
            bar
        }
        None => ProgressBar::new_spinner(),
    }
}

/// Stream `asset` into `dir`, returning the staged file.
///
/// The body is copied in fixed-size chunks; a partially written file is
/// removed before the error is returned.
pub fn stage<L: MediaLibrary + ?Sized>(
    library: &L,
    asset: &Asset,
    dir: &Path,
) -> Result<StagedFile, DownloadError> {
    let path = dir.join(local_filename(&asset.public_id));
    let display_name = display_name(&asset.public_id);

    info!("downloading {} to {}", asset.secure_url, path.display());
    let stream = library.open(&asset.secure_url)?;

    let progress = progress_bar(stream.content_length);
    let result = write_stream(progress.wrap_read(stream.reader), &path);
    progress.finish_and_clear();

    match result {
        Ok(bytes) => {
            info!("download complete: {} bytes", bytes);
            Ok(StagedFile {
                path,
                display_name,
                bytes,
            })
        }
        Err(source) => {
            let _ = fs::remove_file(&path);
            Err(DownloadError::Io { path, source })
        }
    }
}

fn write_stream<R: Read>(mut reader: R, path: &Path) -> std::io::Result<u64> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut buf = vec![0u8; DOWNLOAD_CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
    writer.flush()?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{AssetStream, LibraryError};
    use std::io::Cursor;

    #[test]
    fn test_filename_keeps_recognised_extension() {
        assert_eq!(local_filename("Clips/great_goal.mp4"), "great_goal.mp4");
        assert_eq!(local_filename("a/b/c/skill.MOV"), "skill.MOV");
        assert_eq!(local_filename("clip.webm"), "clip.webm");
    }

    #[test]
    fn test_filename_appends_default_once() {
        assert_eq!(local_filename("Clips/great_goal"), "great_goal.mp4");
        assert_eq!(local_filename("Clips/free_kick.mkv"), "free_kick.mkv.mp4");
        let once = local_filename("Clips/x");
        assert_eq!(once.matches(".mp4").count(), 1);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("Clips/great_goal.mp4"), "Great Goal");
        assert_eq!(display_name("RonaldoClips/BICYCLE_kick"), "Bicycle Kick");
        assert_eq!(display_name("free-kick_vs_spain"), "Free-Kick Vs Spain");
        assert_eq!(display_name("Clips/bicycle-kick.mov"), "Bicycle-Kick");
    }

    #[test]
    fn test_title_case_matches_word_boundaries() {
        assert_eq!(title_case("cr7 skills"), "Cr7 Skills");
        assert_eq!(title_case("o'neil"), "O'Neil");
    }

    struct FakeLibrary {
        body: Vec<u8>,
        fail: bool,
    }

    /// Yields `good` bytes, then fails as a dropped connection would.
    struct BrokenStream {
        good: Cursor<Vec<u8>>,
    }

    impl Read for BrokenStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.good.read(buf)? {
                0 => Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                )),
                n => Ok(n),
            }
        }
    }

    struct BrokenLibrary;

    impl MediaLibrary for BrokenLibrary {
        fn list(&self, _: &str, _: u32) -> Result<Vec<Asset>, LibraryError> {
            Ok(Vec::new())
        }

        fn open(&self, _: &str) -> Result<AssetStream, DownloadError> {
            Ok(AssetStream {
                reader: Box::new(BrokenStream {
                    good: Cursor::new(vec![7u8; DOWNLOAD_CHUNK_SIZE * 2]),
                }),
                content_length: Some(DOWNLOAD_CHUNK_SIZE as u64 * 4),
            })
        }
    }

    impl MediaLibrary for FakeLibrary {
        fn list(&self, _: &str, _: u32) -> Result<Vec<Asset>, LibraryError> {
            Ok(Vec::new())
        }

        fn open(&self, _: &str) -> Result<AssetStream, DownloadError> {
            if self.fail {
                return Err(DownloadError::Status {
                    status: reqwest::StatusCode::NOT_FOUND,
                    url: "https://res.example/missing".into(),
                });
            }
            Ok(AssetStream {
                reader: Box::new(Cursor::new(self.body.clone())),
                content_length: Some(self.body.len() as u64),
            })
        }
    }

    #[test]
    fn test_stage_writes_whole_body() {
        let dir = tempfile::tempdir().unwrap();
        let body: Vec<u8> = (0..(DOWNLOAD_CHUNK_SIZE * 3 + 17)).map(|i| i as u8).collect();
        let library = FakeLibrary {
            body: body.clone(),
            fail: false,
        };
        let asset = Asset::new("Clips/great_goal", "https://res.example/great_goal");

        let staged = stage(&library, &asset, dir.path()).unwrap();
        assert_eq!(staged.path, dir.path().join("great_goal.mp4"));
        assert_eq!(staged.display_name, "Great Goal");
        assert_eq!(staged.bytes, body.len() as u64);
        assert_eq!(fs::read(&staged.path).unwrap(), body);

        staged.remove();
        assert!(!staged.path.exists());
    }

    #[test]
    fn test_stage_status_failure_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let library = FakeLibrary {
            body: Vec::new(),
            fail: true,
        };
        let asset = Asset::new("Clips/missing", "https://res.example/missing");

        let err = stage(&library, &asset, dir.path()).unwrap_err();
        assert!(matches!(err, DownloadError::Status { .. }));
        assert!(!dir.path().join("missing.mp4").exists());
    }

    #[test]
    fn test_stage_unwritable_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let library = FakeLibrary {
            body: b"data".to_vec(),
            fail: false,
        };
        let asset = Asset::new("Clips/clip", "https://res.example/clip");

        let err = stage(&library, &asset, &dir.path().join("no/such/dir")).unwrap_err();
        assert!(matches!(err, DownloadError::Io { .. }));
    }

    #[test]
    fn test_stage_interrupted_stream_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let asset = Asset::new("Clips/cut_off.mp4", "https://res.example/cut_off.mp4");

        let err = stage(&BrokenLibrary, &asset, dir.path()).unwrap_err();
        match &err {
            DownloadError::Io { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::ConnectionReset)
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("failed downloading to "));
        assert!(!dir.path().join("cut_off.mp4").exists());
    }
}
