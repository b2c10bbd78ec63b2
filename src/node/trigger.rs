//! One-shot command file for bench testing without a broker

use std::{
    io::ErrorKind,
    path::PathBuf,
    time::{Duration, Instant},
};

use tracing::{info, warn};

pub const TRIGGER_CHECK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct TriggerFile {
    path: PathBuf,
    last_check: Option<Instant>,
}

impl TriggerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_check: None,
        }
    }

    /// Read and consume the trigger file, at most once per check interval
    pub async fn poll(&mut self, now: Instant) -> std::io::Result<Option<Vec<u8>>> {
        if let Some(last) = self.last_check {
            if now.saturating_duration_since(last) < TRIGGER_CHECK_INTERVAL {
                return Ok(None);
            }
        }
        self.last_check = Some(now);

        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        info!(path = %self.path.display(), "Trigger file found");
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            warn!("Failed to remove trigger file {}: {}", self.path.display(), e);
        }
        Ok(Some(contents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("matrix-signage-{}-{}.json", name, std::process::id()))
    }

    #[tokio::test]
    async fn missing_file_is_quiet() {
        let mut trigger = TriggerFile::new(scratch_path("missing"));
        assert!(trigger.poll(Instant::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fires_once_then_disappears() {
        let path = scratch_path("once");
        tokio::fs::write(&path, br#"{"name": "T", "duration": 5}"#).await.unwrap();

        let mut trigger = TriggerFile::new(&path);
        let t0 = Instant::now();
        let contents = trigger.poll(t0).await.unwrap();
        assert_eq!(contents.as_deref(), Some(&br#"{"name": "T", "duration": 5}"#[..]));
        assert!(!path.exists());
        assert!(trigger.poll(t0 + TRIGGER_CHECK_INTERVAL).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn checks_are_rate_limited() {
        let path = scratch_path("rate");
        let mut trigger = TriggerFile::new(&path);
        let t0 = Instant::now();
        assert!(trigger.poll(t0).await.unwrap().is_none());

        tokio::fs::write(&path, b"{}").await.unwrap();
        assert!(trigger.poll(t0 + Duration::from_millis(500)).await.unwrap().is_none());
        assert!(path.exists());
        assert!(trigger.poll(t0 + TRIGGER_CHECK_INTERVAL).await.unwrap().is_some());
    }
}
