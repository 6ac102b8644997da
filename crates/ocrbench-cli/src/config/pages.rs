//! Page selection grammar.
//!
//! A selection is a comma-separated list of items, each either a single
//! page number (`4`) or an inclusive range (`2-5`). Pages keep the order and
//! multiplicity they were written in.

use std::fmt;
use std::str::FromStr;

/// Why a page selection could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageSelectionError {
    #[error("page selection is empty")]
    Empty,
    #[error("'{0}' is not a page number")]
    InvalidNumber(String),
    #[error("page numbers start at 1")]
    Zero,
    #[error("range {start}-{end} is descending")]
    Descending { start: u32, end: u32 },
}

/// Ordered list of 1-based page numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: Vec<u32>,
    source: String,
}

impl PageSelection {
    /// Returns the selected pages in order.
    pub fn pages(&self) -> &[u32] {
        &self.pages
    }

    /// Number of selected pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns the highest selected page.
    pub fn max(&self) -> Option<u32> {
        self.pages.iter().copied().max()
    }
}

fn parse_page(raw: &str) -> Result<u32, PageSelectionError> {
    let page: u32 = raw
        .trim()
        .parse()
        .map_err(|_| PageSelectionError::InvalidNumber(raw.trim().to_string()))?;
    if page == 0 {
        return Err(PageSelectionError::Zero);
    }
    Ok(page)
}

impl FromStr for PageSelection {
    type Err = PageSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pages = Vec::new();

        for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            match item.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (parse_page(start)?, parse_page(end)?);
                    if start > end {
                        return Err(PageSelectionError::Descending { start, end });
                    }
                    pages.extend(start..=end);
                }
                None => pages.push(parse_page(item)?),
            }
        }

        if pages.is_empty() {
            return Err(PageSelectionError::Empty);
        }

        Ok(Self {
            pages,
            source: s.trim().to_string(),
        })
    }
}

impl fmt::Display for PageSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
