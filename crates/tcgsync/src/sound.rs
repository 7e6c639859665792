//! Victory sound selection.

use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;

/// Picks a victory sound to announce.
///
/// Returns a file name, or `None` when no sound is available. The server
/// turns the name into a URL; implementations never deal with URLs.
pub trait SoundLibrary: Send + Sync + 'static {
    fn pick(&self) -> Option<String>;
}

/// A [`SoundLibrary`] over the `.mp3` files in one directory.
///
/// The directory is listed on every pick, so sounds added or removed while
/// the server runs are picked up. A missing directory is not an error; it
/// just has no sounds.
#[derive(Debug, Clone)]
pub struct DirectorySounds {
    dir: PathBuf,
}

impl DirectorySounds {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File names with an `.mp3` extension, any case, sorted.
    pub fn list(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(
                    dir = %self.dir.display(),
                    error = %e,
                    "sound directory unavailable"
                );
                return Vec::new();
            }
        };

        let mut files: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_mp3(name))
            .collect();
        files.sort();
        files
    }
}

impl SoundLibrary for DirectorySounds {
    fn pick(&self) -> Option<String> {
        self.list().choose(&mut rand::rng()).cloned()
    }
}

fn is_mp3(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
}

/// Joins a URL prefix and a file name with exactly one slash.
pub(crate) fn sound_url(prefix: &str, file: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), file)
}
