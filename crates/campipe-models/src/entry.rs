//! Queue entries and their wire encodings.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Field separator of the delimited encoding.
pub const ENTRY_DELIMITER: char = '|';

/// Encoding used when writing entries to the queue service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryFormat {
    /// `frames_dir|hour_dir|prefix`, as read by the pose-estimation worker.
    #[default]
    Delimited,
    /// A JSON object with named fields.
    Json,
}

impl FromStr for EntryFormat {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "delimited" | "pipe" => Ok(EntryFormat::Delimited),
            "json" => Ok(EntryFormat::Json),
            other => Err(ModelError::UnknownFormat(other.to_string())),
        }
    }
}

/// One unit of queued work: a block of one camera.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Destination directory for extracted frames.
    pub frames_dir: PathBuf,
    /// Source directory holding the hour's videos.
    pub hour_dir: PathBuf,
    /// Minute-digit prefix selecting the block's videos in `hour_dir`.
    pub prefix: String,
}

impl QueueEntry {
    pub fn new(
        frames_dir: impl Into<PathBuf>,
        hour_dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            frames_dir: frames_dir.into(),
            hour_dir: hour_dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Serialize for transit through the queue service.
    ///
    /// The delimited encoding refuses empty directories and fields
    /// containing [`ENTRY_DELIMITER`]; both would not decode back.
    pub fn encode(&self, format: EntryFormat) -> ModelResult<String> {
        match format {
            EntryFormat::Json => Ok(serde_json::to_string(self)?),
            EntryFormat::Delimited => {
                let frames_dir = delimited_field("frames_dir", &self.frames_dir)?;
                let hour_dir = delimited_field("hour_dir", &self.hour_dir)?;
                if self.prefix.contains(ENTRY_DELIMITER) {
                    return Err(ModelError::DelimiterInField {
                        field: "prefix",
                        value: self.prefix.clone(),
                    });
                }
                let encoded = format!(
                    "{frames_dir}{d}{hour_dir}{d}{prefix}",
                    d = ENTRY_DELIMITER,
                    prefix = self.prefix
                );
                if encoded.trim_start().starts_with('{')
                    && serde_json::from_str::<QueueEntry>(&encoded).is_ok()
                {
                    return Err(ModelError::malformed(format!(
                        "delimited form reads as JSON: {encoded}"
                    )));
                }
                Ok(encoded)
            }
        }
    }

    /// Parse a queue member written in either encoding.
    ///
    /// A member starting with `{` is read as JSON first and falls back to
    /// the delimited form, since a frames directory may itself start with `{`.
    pub fn decode(raw: &str) -> ModelResult<Self> {
        if raw.trim_start().starts_with('{') {
            match serde_json::from_str(raw) {
                Ok(entry) => return Ok(entry),
                Err(e) if !raw.contains(ENTRY_DELIMITER) => return Err(e.into()),
                Err(_) => {}
            }
        }

        let mut parts = raw.split(ENTRY_DELIMITER);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(frames_dir), Some(hour_dir), Some(prefix), None)
                if !frames_dir.is_empty() && !hour_dir.is_empty() =>
            {
                Ok(Self::new(frames_dir, hour_dir, prefix))
            }
            _ => Err(ModelError::malformed(raw)),
        }
    }

    /// Whether `file_name` belongs to this entry's block.
    pub fn matches_source(&self, file_name: &str) -> bool {
        file_name.starts_with(&self.prefix)
    }
}

impl fmt::Display for QueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.frames_dir.display())
    }
}

fn delimited_field<'a>(field: &'static str, path: &'a Path) -> ModelResult<&'a str> {
    let value = path
        .to_str()
        .ok_or_else(|| ModelError::malformed(format!("{field} is not valid UTF-8")))?;
    if value.is_empty() {
        return Err(ModelError::EmptyField(field));
    }
    if value.contains(ENTRY_DELIMITER) {
        return Err(ModelError::DelimiterInField {
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueueEntry {
        QueueEntry::new(
            "/data/frames/room-a/cam/2024/03/06/07/frames__3",
            "/data/room-a/cam/2024/03/06/07",
            "3",
        )
    }

    #[test]
    fn test_delimited_layout() {
        let encoded = sample().encode(EntryFormat::Delimited).unwrap();
        assert_eq!(
            encoded,
            "/data/frames/room-a/cam/2024/03/06/07/frames__3|/data/room-a/cam/2024/03/06/07|3"
        );
    }

    #[test]
    fn test_round_trip_both_formats() {
        let entry = sample();
        for format in [EntryFormat::Delimited, EntryFormat::Json] {
            let encoded = entry.encode(format).unwrap();
            assert_eq!(QueueEntry::decode(&encoded).unwrap(), entry);
        }
    }

    #[test]
    fn test_delimited_rejects_delimiter_in_field() {
        let entry = QueueEntry::new("/data/fr|ames", "/data/hour", "3");
        let err = entry.encode(EntryFormat::Delimited).unwrap_err();
        assert!(matches!(err, ModelError::DelimiterInField { field: "frames_dir", .. }));
    }

    #[test]
    fn test_delimited_round_trips_brace_prefixed_dir() {
        let entry = QueueEntry::new("{room}/frames__3", "/video/07", "3");
        let encoded = entry.encode(EntryFormat::Delimited).unwrap();
        assert_eq!(encoded, "{room}/frames__3|/video/07|3");
        assert_eq!(QueueEntry::decode(&encoded).unwrap(), entry);
    }

    #[test]
    fn test_delimited_rejects_empty_dirs() {
        let err = QueueEntry::new("", "/video/07", "3")
            .encode(EntryFormat::Delimited)
            .unwrap_err();
        assert!(matches!(err, ModelError::EmptyField("frames_dir")));

        let err = QueueEntry::new("/frames", "", "3")
            .encode(EntryFormat::Delimited)
            .unwrap_err();
        assert!(matches!(err, ModelError::EmptyField("hour_dir")));
    }

    #[test]
    fn test_decode_rejects_broken_json() {
        assert!(matches!(
            QueueEntry::decode("{\"frames_dir\": 1}"),
            Err(ModelError::Json(_))
        ));
    }

    #[test]
    fn test_json_carries_delimiter_safely() {
        let entry = QueueEntry::new("/data/fr|ames", "/data/ho|ur", "3");
        let encoded = entry.encode(EntryFormat::Json).unwrap();
        assert_eq!(QueueEntry::decode(&encoded).unwrap(), entry);
    }

    #[test]
    fn test_decode_rejects_wrong_field_count() {
        assert!(QueueEntry::decode("/a|/b").is_err());
        assert!(QueueEntry::decode("/a|/b|3|extra").is_err());
        assert!(QueueEntry::decode("").is_err());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("json".parse::<EntryFormat>().unwrap(), EntryFormat::Json);
        assert_eq!(" Delimited ".parse::<EntryFormat>().unwrap(), EntryFormat::Delimited);
        assert!("yaml".parse::<EntryFormat>().is_err());
    }

    #[test]
    fn test_matches_source() {
        let entry = sample();
        assert!(entry.matches_source("31_00.mp4"));
        assert!(!entry.matches_source("21_00.mp4"));
    }
}
