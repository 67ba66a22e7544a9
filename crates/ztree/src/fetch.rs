//! Fetching remote or on-disk documents
//!
//! Absolute file paths are read straight from disk. Every other locator is
//! handed to a [`Fetch`] implementation supplied by the caller, which keeps
//! transport concerns (HTTP clients, credentials, retries) out of this crate.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::input::{self, Source};
use crate::namespace::strip_namespaces_bytes;
use crate::xml::Element;

/// `/...`, `C:\...`, `C:/...` or `\\...`
#[allow(clippy::expect_used)]
static FILE_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(([A-Za-z]:[/\\])|(\\\\))|^/").expect("valid pattern")
});

/// True when `locator` is an absolute path on Unix or Windows
pub fn is_file_location(locator: &str) -> bool {
    FILE_LOCATION.is_match(locator)
}

/// Turns a locator into raw document bytes
pub trait Fetch {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>>;
}

/// Reads file locations from disk and rejects everything else
#[derive(Clone, Copy, Debug, Default)]
pub struct FileFetcher;

impl Fetch for FileFetcher {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        match is_file_location(locator) {
            true => Ok(std::fs::read(locator)?),
            false => Err(Error::with_message(
                ErrorKind::UnsupportedLocator,
                format!("unsupported locator: {locator}"),
            )),
        }
    }
}

/// Fetch a document, strip its namespaces, resolve it and follow `path`
///
/// File locations are always read from disk; `fetcher` only sees the rest.
#[instrument(skip(fetcher))]
pub fn get_remote_element(
    locator: &str,
    path: Option<&str>,
    fetcher: &dyn Fetch,
) -> Result<Option<Element>> {
    let content = match is_file_location(locator) {
        true => FileFetcher.fetch(locator)?,
        false => fetcher.fetch(locator)?,
    };
    debug!(bytes = content.len(), "document fetched");

    let stripped = Source::Text(strip_namespaces_bytes(&content)?);
    match path {
        Some(path) => input::resolve_path(stripped, path),
        None => input::resolve(stripped),
    }
}
