use crate::error::ConfigError;
use connectors::bigquery::table::WriteDisposition;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Destination write policy for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Replace the table with the first chunk, append the rest.
    #[default]
    TruncateAppend,
    /// Append every chunk to whatever the table already holds.
    Append,
}

impl WriteMode {
    pub fn disposition(&self, is_first_chunk: bool) -> WriteDisposition {
        match (self, is_first_chunk) {
            (WriteMode::TruncateAppend, true) => WriteDisposition::Truncate,
            _ => WriteDisposition::Append,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMode::TruncateAppend => "truncate_append",
            WriteMode::Append => "append",
        }
    }
}

impl FromStr for WriteMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "truncate_append" => Ok(WriteMode::TruncateAppend),
            "append" => Ok(WriteMode::Append),
            other => Err(ConfigError::InvalidWriteMode(other.to_string())),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_append_truncates_only_first_chunk() {
        let mode = WriteMode::TruncateAppend;
        assert_eq!(mode.disposition(true), WriteDisposition::Truncate);
        assert_eq!(mode.disposition(false), WriteDisposition::Append);
    }

    #[test]
    fn append_never_truncates() {
        assert_eq!(WriteMode::Append.disposition(true), WriteDisposition::Append);
        assert_eq!(WriteMode::Append.disposition(false), WriteDisposition::Append);
    }

    #[test]
    fn parses_and_displays() {
        assert_eq!("append".parse::<WriteMode>(), Ok(WriteMode::Append));
        assert_eq!(
            " TRUNCATE_APPEND ".parse::<WriteMode>(),
            Ok(WriteMode::TruncateAppend)
        );
        assert_eq!(
            "overwrite".parse::<WriteMode>(),
            Err(ConfigError::InvalidWriteMode("overwrite".into()))
        );
        assert_eq!(WriteMode::TruncateAppend.to_string(), "truncate_append");
    }
}
