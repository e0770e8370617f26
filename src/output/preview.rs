use crate::output::{OutputResult, WebPayload};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the payload file inside the preview directory
pub const PREVIEW_FILE_NAME: &str = "data.json";

/// Writes the payload as pretty-printed JSON into `dir`
///
/// The directory is created if it does not exist. A payload without events
/// is not written, so an earlier preview stays in place.
///
/// # Returns
///
/// * `Ok(Some(PathBuf))` - Path of the written file
/// * `Ok(None)` - Nothing to preview
/// * `Err(OutputError)` - The directory or file could not be written
pub fn write_preview(dir: &Path, payload: &WebPayload) -> OutputResult<Option<PathBuf>> {
    if payload.events.is_empty() {
        tracing::info!("No events to preview, skipping {}", dir.display());
        return Ok(None);
    }

    fs::create_dir_all(dir)?;

    let path = dir.join(PREVIEW_FILE_NAME);
    let json = serde_json::to_string_pretty(payload)?;
    fs::write(&path, json)?;

    tracing::info!("Wrote preview data to {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperConfig;
    use crate::models::{Event, Source};
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_write_preview_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("public");
        let source = Source::new("obec", "Obec Brewing", "https://a.example");
        let day = NaiveDate::from_ymd_opt(2025, 11, 4).unwrap();
        let events = vec![Event::new(&source, "Marination", day)];
        let payload = WebPayload::new(&events, Vec::new(), &ScraperConfig::default(), Utc::now());

        let path = write_preview(&dir, &payload).unwrap().unwrap();
        assert_eq!(path, dir.join("data.json"));

        let written: WebPayload = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, payload);
    }

    #[test]
    fn test_empty_run_is_not_previewed() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("public");
        let payload = WebPayload::new(
            &[],
            vec!["Failed to fetch information for source: Obec Brewing".to_string()],
            &ScraperConfig::default(),
            Utc::now(),
        );

        assert_eq!(write_preview(&dir, &payload).unwrap(), None);
        assert!(!dir.exists());
    }
}
