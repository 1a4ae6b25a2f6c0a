use crate::error::SourceError;
use crate::model::GameRow;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Which games to fetch: a tournament overview page, optionally narrowed to
/// one UTC day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentFilter {
    pub overview_page: String,
    pub date: Option<NaiveDate>,
}

impl TournamentFilter {
    pub fn new(overview_page: impl Into<String>) -> Self {
        Self {
            overview_page: overview_page.into(),
            date: None,
        }
    }

    pub fn on_date(mut self, raw: &str) -> Result<Self, SourceError> {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| SourceError::Date(raw.to_string()))?;
        self.date = Some(date);
        Ok(self)
    }

    /// `[date 00:00:00, date+1 00:00:00)` formatted for a Cargo `where` clause.
    pub fn utc_window(&self) -> Option<(String, String)> {
        let date = self.date?;
        let next = date.succ_opt()?;
        Some((
            format!("{} 00:00:00", date.format("%Y-%m-%d")),
            format!("{} 00:00:00", next.format("%Y-%m-%d")),
        ))
    }
}

/// Supplies the per-player game rows for one run. An empty result means no
/// data matched.
pub trait MatchSource {
    fn fetch_rows(&self, filter: &TournamentFilter) -> Result<Vec<GameRow>, SourceError>;
}

/// Reads rows from a CSV file whose headers are the `GameRow` field names.
/// The filter is ignored; the file is assumed to hold one tournament.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MatchSource for CsvSource {
    fn fetch_rows(&self, _filter: &TournamentFilter) -> Result<Vec<GameRow>, SourceError> {
        let mut reader = csv::Reader::from_path(self.path())?;
        let mut rows = Vec::new();

        for (line, record) in reader.deserialize::<GameRow>().enumerate() {
            match record {
                Ok(row) => rows.push(row),
                Err(err) => {
                    tracing::warn!(
                        path = %self.path().display(),
                        line = line + 2,
                        error = %err,
                        "skipping malformed row"
                    );
                }
            }
        }

        Ok(rows)
    }
}
