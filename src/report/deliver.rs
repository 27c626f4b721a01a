/// Hand-off of finished reports to the platform
///
/// Sharing is preferred when the environment offers it; otherwise (or when
/// the share fails) the report is saved into the download directory.
use std::path::PathBuf;
use tracing::{info, warn};

use super::ReportImage;
use crate::error::{SnapError, SnapResult};

/// Platform share capability (share sheet, messaging bridge, ...)
pub trait ShareTarget: Send + Sync {
    fn share(&self, report: &ReportImage) -> SnapResult<()>;
}

/// How a report reached the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    Shared,
    Saved(PathBuf),
}

pub struct Delivery {
    share: Option<Box<dyn ShareTarget>>,
    download_dir: PathBuf,
}

impl Delivery {
    /// Deliver by saving into `download_dir` only
    pub fn save_to(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            share: None,
            download_dir: download_dir.into(),
        }
    }

    pub fn with_share(mut self, target: impl ShareTarget + 'static) -> Self {
        self.share = Some(Box::new(target));
        self
    }

    pub fn can_share(&self) -> bool {
        self.share.is_some()
    }

    pub async fn deliver(&self, report: &ReportImage) -> SnapResult<Delivered> {
        if let Some(target) = &self.share {
            match target.share(report) {
                Ok(()) => {
                    info!(filename = %report.filename, "report shared");
                    return Ok(Delivered::Shared);
                }
                Err(err) => warn!(error = %err, "share failed, saving instead"),
            }
        }

        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .map_err(|e| {
                SnapError::delivery(format!("create {}: {e}", self.download_dir.display()))
            })?;

        let path = self.download_dir.join(&report.filename);
        tokio::fs::write(&path, &report.bytes)
            .await
            .map_err(|e| SnapError::delivery(format!("write {}: {e}", path.display())))?;

        info!(path = %path.display(), bytes = report.bytes.len(), "report saved");
        Ok(Delivered::Saved(path))
    }
}

impl std::fmt::Debug for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delivery")
            .field("can_share", &self.can_share())
            .field("download_dir", &self.download_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        shared: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl ShareTarget for Recorder {
        fn share(&self, report: &ReportImage) -> SnapResult<()> {
            if self.fail {
                return Err(SnapError::delivery("user dismissed share sheet"));
            }
            self.shared.lock().unwrap().push(report.filename.clone());
            Ok(())
        }
    }

    fn report() -> ReportImage {
        ReportImage {
            filename: "Kitchen_report_2026-10-18.jpg".to_string(),
            mime: "image/jpeg",
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            width: 2400,
            height: 1236,
        }
    }

    #[tokio::test]
    async fn test_saves_when_share_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let delivery = Delivery::save_to(dir.path().join("downloads"));

        let outcome = delivery.deliver(&report()).await.unwrap();
        let expected = dir.path().join("downloads/Kitchen_report_2026-10-18.jpg");
        assert_eq!(outcome, Delivered::Saved(expected.clone()));
        assert_eq!(std::fs::read(expected).unwrap(), report().bytes);
    }

    #[tokio::test]
    async fn test_prefers_share() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let delivery = Delivery::save_to(dir.path()).with_share(recorder.clone());

        assert_eq!(delivery.deliver(&report()).await.unwrap(), Delivered::Shared);
        assert_eq!(recorder.shared.lock().unwrap().len(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_failed_share_falls_back_to_save() {
        let dir = tempfile::tempdir().unwrap();
        let failing = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let delivery = Delivery::save_to(dir.path()).with_share(failing);

        let outcome = delivery.deliver(&report()).await.unwrap();
        assert!(matches!(outcome, Delivered::Saved(_)));
    }
}
