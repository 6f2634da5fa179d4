use crate::Endpoint2FileError;
use secrecy::SecretString;
use std::time::Duration;

/// Process configuration, loaded once at startup and passed by reference
/// to the fetcher, the sink and the scheduler.
#[derive(Clone, Debug)]
pub struct Config {
    pub token: SecretString,
    pub node: String,
    pub lines: Vec<String>,
    pub endpoint: String,
    pub target_path: String,
    pub target_filename: String,
    pub target_file_ext: String,
    pub schedule: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, Endpoint2FileError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    ///
    /// Every setting is required and must be non-blank; the line list must
    /// name at least one identifier and the schedule must be whole seconds.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, Endpoint2FileError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let token = require(&mut get, "JWT")?;
        let node = require(&mut get, "NODE")?;
        let lines_raw = require(&mut get, "BANENOR_LINES")?;
        let endpoint = require(&mut get, "SESAM_ENDPOINT2FILE_ENDPOINT")?;
        let target_path = require(&mut get, "SESAM_ENDPOINT2FILE_TARGET_PATH")?;
        let target_filename = require(&mut get, "SESAM_ENDPOINT2FILE_TARGET_FILENAME")?;
        let target_file_ext = require(&mut get, "SESAM_ENDPOINT2FILE_TARGET_FILE_EXT")?;
        let schedule_raw = require(&mut get, "SESAM_ENDPOINT2FILE_SCHEDULE")?;

        // Space-delimited, order preserved; repeated separators are tolerated.
        let lines: Vec<String> = lines_raw
            .split(' ')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if lines.is_empty() {
            return Err(Endpoint2FileError::Config(
                "BANENOR_LINES contains no line identifiers".into(),
            ));
        }

        let secs: u64 = schedule_raw
            .trim()
            .parse()
            .map_err(|_| Endpoint2FileError::InvalidInterval(schedule_raw.clone()))?;

        Ok(Self {
            token: SecretString::new(token.into()),
            node,
            lines,
            endpoint,
            target_path,
            target_filename,
            target_file_ext,
            schedule: Duration::from_secs(secs),
        })
    }

    /// Output filename for one line: `{line}-{stem}.{ext}`.
    pub fn output_file_name(&self, line: &str) -> String {
        format!("{}-{}.{}", line, self.target_filename, self.target_file_ext)
    }
}

fn require<F>(get: &mut F, key: &str) -> Result<String, Endpoint2FileError>
where
    F: FnMut(&str) -> Option<String>,
{
    match get(key) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Endpoint2FileError::Config(format!("{key} missing or empty"))),
    }
}
