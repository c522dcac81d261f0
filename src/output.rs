//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output and
//! [`ResponseView`] for JSON output.

use std::collections::BTreeMap;

use serde::Serialize;
use tabled::{Table, Tabled};

use crate::Response;

/// Trait for human-readable key-value output.
///
/// Used for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

/// One header line in table output.
#[derive(Tabled)]
pub struct HeaderRow {
    pub name: String,
    pub value: String,
}

impl PrettyPrint for Response {
    fn pretty_print(&self) -> String {
        let header = format!("{} {}", self.status(), self.url());
        let divider = "─".repeat(header.chars().count().max(30));

        let rows: Vec<HeaderRow> = self
            .headers()
            .iter()
            .map(|(name, value)| HeaderRow {
                name: name.to_string(),
                value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            })
            .collect();

        let mut lines = vec![header, divider];
        if !rows.is_empty() {
            lines.push(Table::new(rows).to_string());
        }

        let body = self.text();
        if !body.is_empty() {
            lines.push(String::new());
            lines.push(body);
        }

        lines.join("\n")
    }
}

/// Serializable snapshot of a response.
#[derive(Debug, Serialize)]
pub struct ResponseView {
    pub status: u16,
    pub url: String,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: String,
}

impl From<&Response> for ResponseView {
    fn from(response: &Response) -> Self {
        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in response.headers() {
            headers
                .entry(name.to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        Self {
            status: response.status(),
            url: response.url().to_string(),
            headers,
            body: response.text(),
        }
    }
}
