use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::CrutemHeader;
use crate::utils::constants::{CRUTEM_DATA_TOKENS, CRUTEM_YEAR_WIDTH};

/// Reads station headers from a CRUTEM station file (ISO-8859-1).
pub struct CrutemReader;

impl CrutemReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_headers(&self, path: &Path) -> Result<Vec<CrutemHeader>> {
        let bytes = std::fs::read(path)?;
        let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(&bytes);
        if had_errors {
            warn!("{} contained undecodable bytes", path.display());
        }

        let headers = self.parse_headers(&text)?;
        debug!("Found {} station headers in {}", headers.len(), path.display());
        Ok(headers)
    }

    /// A non-empty line is a header unless it looks like a data row: a
    /// year of at most four characters followed by twelve values.
    pub fn parse_headers(&self, text: &str) -> Result<Vec<CrutemHeader>> {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .filter(|line| is_header_line(line))
            .map(CrutemHeader::parse)
            .collect()
    }
}

impl Default for CrutemReader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_header_line(line: &str) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    tokens.len() != CRUTEM_DATA_TOKENS
        || tokens.first().map_or(true, |t| t.len() > CRUTEM_YEAR_WIDTH)
}
