//! Recording export: blob assembly to a downloadable file.

use std::path::{Path, PathBuf};

use camscribe_common::error::CamscribeResult;
use camscribe_media_model::chunk::RecordedBlob;
use chrono::{DateTime, SecondsFormat, Utc};

/// File name for a recording finished at `at`:
/// `recording-<ISO8601 timestamp>.webm`.
pub fn artifact_name(at: DateTime<Utc>) -> String {
    format!(
        "recording-{}.webm",
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Write the recorded blob into `output_dir` under a timestamped name.
///
/// An empty export (no blob) is a silent no-op with a logged
/// diagnostic, not an error: returns `Ok(None)`.
pub fn save_recording(
    blob: Option<&RecordedBlob>,
    output_dir: &Path,
) -> CamscribeResult<Option<PathBuf>> {
    let Some(blob) = blob else {
        tracing::warn!("No recording data available; nothing to export");
        return Ok(None);
    };

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(artifact_name(Utc::now()));
    std::fs::write(&path, &blob.data)?;

    tracing::info!(
        path = %path.display(),
        bytes = blob.data.len(),
        mime = blob.mime_type,
        "Recording exported"
    );
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use camscribe_media_model::chunk::WEBM_MIME_TYPE;
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn artifact_name_embeds_iso8601_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 8, 6, 12, 34, 56).unwrap();
        let name = artifact_name(at);
        assert_eq!(name, "recording-2026-08-06T12:34:56.000Z.webm");
    }

    #[test]
    fn save_writes_blob_bytes() {
        let dir = std::env::temp_dir().join("camscribe_test_export");
        let _ = std::fs::remove_dir_all(&dir);

        let blob = RecordedBlob {
            data: vec![1, 2, 3, 4],
            mime_type: WEBM_MIME_TYPE,
        };
        let path = save_recording(Some(&blob), &dir).unwrap().unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().ends_with(".webm"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3, 4]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_export_is_a_silent_noop() {
        let dir = std::env::temp_dir().join("camscribe_test_export_empty");
        let _ = std::fs::remove_dir_all(&dir);

        assert!(save_recording(None, &dir).unwrap().is_none());
        // Nothing was created
        assert!(!dir.exists());
    }
}
