//! Failure screenshots.

use crate::driver::Driver;
use crate::result::E2eResult;
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::info;

/// Timestamp pattern used in file names
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `<test>_<yyyyMMdd_HHmmss>.png`, with unsafe path characters replaced
#[must_use]
pub fn screenshot_file_name(test_name: &str, at: &NaiveDateTime) -> String {
    let safe: String = test_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}_{}.png", at.format(FILE_TIMESTAMP_FORMAT))
}

/// Capture the current browser state into `dir`
pub async fn capture_screenshot(
    driver: &dyn Driver,
    dir: &Path,
    test_name: &str,
) -> E2eResult<PathBuf> {
    let shot = driver.screenshot().await?;
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(screenshot_file_name(test_name, &Local::now().naive_local()));
    tokio::fs::write(&path, &shot.data).await?;
    info!(path = %path.display(), bytes = shot.size_bytes(), "screenshot saved");
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;
    use chrono::NaiveDate;

    #[test]
    fn test_file_name_format() {
        let at = NaiveDate::from_ymd_opt(2025, 4, 16)
            .unwrap()
            .and_hms_opt(14, 27, 5)
            .unwrap();
        assert_eq!(
            screenshot_file_name("validTC01", &at),
            "validTC01_20250416_142705.png"
        );
        assert_eq!(
            screenshot_file_name("guest_supplies::tc01", &at),
            "guest_supplies__tc01_20250416_142705.png"
        );
    }

    #[tokio::test]
    async fn test_capture_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("failed-screenshots");
        let driver = MockDriver::new();
        let path = capture_screenshot(&driver, &target, "tc07").await.unwrap();
        assert!(path.starts_with(&target));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("tc07_"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
        assert_eq!(driver.call_count("screenshot"), 1);
    }
}
