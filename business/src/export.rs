//! Export of the current table view as a file.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Csv,
}

impl ExportFormat {
    /// Content type assumed when the server does not send one.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Csv => "text/csv",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// The list query of a table plus the requested file format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportQuery {
    pub page: u32,
    pub size: u32,
    pub search: String,
    pub format: ExportFormat,
}

impl ExportQuery {
    pub fn new(page: u32, size: u32, search: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            page,
            size,
            search: search.into(),
            format,
        }
    }

    /// File name offered to the browser, e.g. `users-page-2.csv`.
    pub fn file_name(&self, noun: &str) -> String {
        format!(
            "{}-page-{}.{}",
            noun.replace(' ', "-"),
            self.page,
            self.format.extension()
        )
    }
}
