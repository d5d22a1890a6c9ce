use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown scenario '{0}' (try `rule-of-five list`)")]
    UnknownScenario(String),

    #[error("Failed to read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write trace output: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub fn unknown_scenario(selector: impl Into<String>) -> Self {
        Self::UnknownScenario(selector.into())
    }

    /// Process exit code the binary reports for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::UnknownScenario(_) => 2,
            Error::ConfigRead { .. } | Error::ConfigParse { .. } => 3,
            Error::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_scenario_display() {
        let error = Error::unknown_scenario("9.9");
        let display = format!("{}", error);
        assert!(display.contains("'9.9'"));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_io_error_converts() {
        fn fails() -> Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))?;
            Ok(())
        }
        let error = fails().unwrap_err();
        assert!(matches!(error, Error::Io(_)));
        assert!(format!("{}", error).contains("closed"));
    }

    #[test]
    fn test_config_parse_error_names_path() {
        let source = toml::from_str::<toml::Value>("indent = ").unwrap_err();
        let error = Error::ConfigParse {
            path: PathBuf::from("tracer.toml"),
            source,
        };
        assert!(format!("{}", error).contains("tracer.toml"));
        assert_eq!(error.exit_code(), 3);
    }
}
