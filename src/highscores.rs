//! Persisted best score
//!
//! A single JSON document on disk. The session keeps the live value; this
//! only moves it between runs of the program.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default file name used by the binary
pub const HIGHSCORE_FILE: &str = "spacegame_highscore.json";

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("highscore file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("highscore file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighScore {
    pub best: u64,
}

impl HighScore {
    /// Record a finished run; returns true if it set a new best
    pub fn submit(&mut self, score: u64) -> bool {
        if score > self.best {
            log::info!("New highscore: {} (was {})", score, self.best);
            self.best = score;
            return true;
        }
        false
    }

    /// Read from `path`; a missing file means no score yet
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HighScoreError> {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No highscore at {}, starting fresh", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let score: Self = serde_json::from_str(&json)?;
        log::info!("Loaded highscore {}", score.best);
        Ok(score)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HighScoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Highscore saved ({})", self.best);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("spacegame_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_submit_only_raises() {
        let mut hs = HighScore::default();
        assert!(hs.submit(120));
        assert!(!hs.submit(80));
        assert!(!hs.submit(120));
        assert_eq!(hs.best, 120);
    }

    #[test]
    fn test_missing_file_is_zero() {
        let hs = HighScore::load(temp_path("missing")).unwrap();
        assert_eq!(hs.best, 0);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("save");
        HighScore { best: 4242 }.save(&path).unwrap();
        let hs = HighScore::load(&path).unwrap();
        assert_eq!(hs.best, 4242);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(HighScore::load(&path), Err(HighScoreError::Json(_))));
        let _ = std::fs::remove_file(&path);
    }
}
