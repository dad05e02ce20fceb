use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use jiff::Timestamp;

use crate::Error;
use crate::service::{RateData, RateRequest};

/// Directory holding one `FROM_TO_YYYY-MM-DD.json` file per fetched rate.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the artifact for a request, falling back to the returned date for "latest".
    pub fn path_for(&self, request: &RateRequest, data: &RateData) -> PathBuf {
        let date = request.date.unwrap_or(data.date);
        self.dir.join(format!("{}_{}_{date}.json", request.from, request.to))
    }

    /// Write `data` as pretty JSON, replacing any earlier file for the same triple.
    pub fn save(&self, request: &RateRequest, data: &RateData) -> Result<PathBuf, Error> {
        let path = self.path_for(request, data);
        let write_error = |source: io::Error| Error::FileWriteError {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_error)?;
        let mut writer = BufWriter::new(File::create(&path).map_err(write_error)?);
        serde_json::to_writer_pretty(&mut writer, data).map_err(|e| write_error(e.into()))?;
        writer.write_all(b"\n").map_err(write_error)?;
        writer.flush().map_err(write_error)?;

        Ok(path)
    }
}

/// Append-only log of failed lookups, one line per failure.
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a failure for `subject` here and on the console.
    pub fn record(&self, subject: impl Display, error: &Error) {
        tracing::error!("{subject}: {}: {error}", error.kind());

        let line = format!(
            "{} [ERROR] {subject}: {}: {error}\n",
            Timestamp::now(),
            error.kind()
        );
        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(e) = appended {
            tracing::warn!("could not append to {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    fn rate() -> RateData {
        RateData {
            from: "USD".to_string(),
            to: "EUR".to_string(),
            rate: Decimal::new(11, 1),
            date: date(2025, 6, 1),
        }
    }

    fn request(date: Option<jiff::civil::Date>) -> RateRequest {
        RateRequest {
            from: "USD".to_string(),
            to: "EUR".to_string(),
            date,
        }
    }

    #[test]
    fn test_save_creates_dir_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::new(tmp.path().join("data"));

        let path = store.save(&request(Some(date(2025, 6, 1))), &rate()).unwrap();
        assert_eq!(path, tmp.path().join("data").join("USD_EUR_2025-06-01.json"));

        let saved: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            saved,
            json!({"from": "USD", "to": "EUR", "rate": 1.1, "date": "2025-06-01"})
        );
    }

    #[test]
    fn test_save_latest_uses_returned_date() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::new(tmp.path());
        let path = store.save(&request(None), &rate()).unwrap();
        assert_eq!(path.file_name().unwrap(), "USD_EUR_2025-06-01.json");
    }

    #[test]
    fn test_save_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::new(tmp.path());
        let req = request(Some(date(2025, 6, 1)));
        store.save(&req, &rate()).unwrap();

        let mut newer = rate();
        newer.rate = Decimal::new(12, 1);
        let path = store.save(&req, &newer).unwrap();

        let saved: RateData = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(saved, newer);
    }

    #[test]
    fn test_save_into_a_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("data");
        fs::write(&blocker, "not a directory").unwrap();

        let err = Store::new(&blocker)
            .save(&request(Some(date(2025, 6, 1))), &rate())
            .unwrap_err();
        assert_eq!(err.kind(), "FileWriteError");
    }

    #[test]
    fn test_error_log_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(tmp.path().join("error.log"));

        let req = request(Some(date(2025, 6, 1)));
        log.record(&req, &Error::ServiceError("no data".to_string()));
        log.record(
            &req,
            &Error::HttpError {
                status: 403,
                body: "bad key".to_string(),
            },
        );

        let contents = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[ERROR] USD/EUR 2025-06-01: ServiceError: no data"));
        assert!(lines[1].ends_with("[ERROR] USD/EUR 2025-06-01: HttpError: HTTP 403: bad key"));
        // Lines start with an RFC 3339 timestamp
        let stamp = lines[0].split(' ').next().unwrap();
        assert!(stamp.parse::<Timestamp>().is_ok(), "{stamp}");
    }
}
