//! File-system index of topic voice recordings
//!
//! Recordings live under `<root>/<dateType>/<D-MMMM-YYYY>/<topicId>.m4a`.
//! Capturing and playing audio happens elsewhere; this module only finds and
//! files the captured files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use memoneo_core::{EntityId, RECORDING_EXTENSION, TopicLogDateType, TopicRecord};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::SyncResult;

/// Directory holding the recordings of one topic log
pub fn recording_dir(root: &Path, date_type: TopicLogDateType, date: NaiveDate) -> PathBuf {
    root.join(date_type.as_str())
        .join(date.format("%-d-%B-%Y").to_string())
}

/// Full destination path of one topic's recording
pub fn recording_path(
    root: &Path,
    topic_id: &EntityId,
    date_type: TopicLogDateType,
    date: NaiveDate,
) -> PathBuf {
    recording_dir(root, date_type, date).join(format!("{}.{}", topic_id, RECORDING_EXTENSION))
}

/// List the recordings in `directory`, one per topic.
///
/// A missing directory is an empty index, not an error.
pub async fn list_recordings(directory: &Path) -> SyncResult<Vec<TopicRecord>> {
    let mut entries = match fs::read_dir(directory).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(dir = %directory.display(), "No recordings directory");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(RECORDING_EXTENSION) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        records.push(TopicRecord {
            topic_id: EntityId::new(stem),
            path,
        });
    }

    records.sort_by(|a, b| a.topic_id.cmp(&b.topic_id));
    debug!(dir = %directory.display(), count = records.len(), "Listed recordings");
    Ok(records)
}

/// Move a captured file into the recordings tree, replacing an older take
pub async fn save_recording(
    root: &Path,
    topic_id: &EntityId,
    date_type: TopicLogDateType,
    date: NaiveDate,
    source: &Path,
) -> SyncResult<TopicRecord> {
    let destination = recording_path(root, topic_id, date_type, date);
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).await?;
    }

    if let Err(e) = fs::rename(source, &destination).await {
        // rename cannot cross file systems
        warn!(error = %e, "Rename failed, copying recording instead");
        fs::copy(source, &destination).await?;
        fs::remove_file(source).await?;
    }

    info!(topic = %topic_id, path = %destination.display(), "Saved recording");
    Ok(TopicRecord {
        topic_id: topic_id.clone(),
        path: destination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_recording_path_layout() {
        let path = recording_path(
            Path::new("/rec"),
            &"t1".into(),
            TopicLogDateType::Daily,
            date(),
        );
        assert_eq!(path, PathBuf::from("/rec/daily/5-March-2024/t1.m4a"));
    }

    #[tokio::test]
    async fn test_missing_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let records = list_recordings(&dir.path().join("absent")).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_list_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.m4a"), b"audio").await.unwrap();
        fs::write(dir.path().join("a.m4a"), b"audio").await.unwrap();
        fs::write(dir.path().join("notes.txt"), b"text").await.unwrap();

        let records = list_recordings(dir.path()).await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.topic_id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(records[0].path, dir.path().join("a.m4a"));
    }

    #[tokio::test]
    async fn test_save_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("capture.m4a");
        fs::write(&source, b"take one").await.unwrap();

        let root = dir.path().join("recordings");
        let record = save_recording(&root, &"t1".into(), TopicLogDateType::Weekly, date(), &source)
            .await
            .unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&record.path).await.unwrap(), b"take one");

        let listed = list_recordings(&recording_dir(&root, TopicLogDateType::Weekly, date()))
            .await
            .unwrap();
        assert_eq!(listed, vec![record]);
    }

    #[tokio::test]
    async fn test_save_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_recording(
            dir.path(),
            &"t1".into(),
            TopicLogDateType::Daily,
            date(),
            &dir.path().join("nothing.m4a"),
        )
        .await;
        assert!(result.is_err());
    }
}
