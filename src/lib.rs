#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

//! Reading and writing of INI-style configuration files.
//!
//! A [`Document`] is an ordered list of [`Group`]s (the `[section]` blocks), each holding an ordered list of
//! [`Item`]s. Values are stored as text and converted on access through the typed getters and setters.
//!
//! ```text
//! [GroupName]
//! key = value
//! quoted_key = "quoted value"
//!
//! [NextGroup]
//! key2 = 42
//! ```

mod accessors;
mod error;
mod group;
mod parser;
mod writer;

use std::collections::TryReserveError;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, warn};

pub use crate::error::{LoadError, SaveError, WriteError};
pub use crate::group::{Group, Item};
use crate::parser::Parser;

/// Default bound, in bytes, for keys, values and group names.
pub const MAX_KEY_VALUE_LENGTH: usize = 256;

/// Default bound, in bytes, for a single line of input.
pub const MAX_LINE_LENGTH: usize = 1024;

/// Byte Order Mark (BOM) is used to signal the endianness of an encoding. The order `0xFF 0xFE`
/// strongly suggests that the encoding is using little-endian byte order.
///
/// <https://en.wikipedia.org/wiki/Byte_order_mark>
const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Length bounds fixed when a document is created.
///
/// Text longer than a bound is truncated (at a character boundary), never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_key_value_length: usize,
    pub max_line_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_key_value_length: MAX_KEY_VALUE_LENGTH,
            max_line_length: MAX_LINE_LENGTH,
        }
    }
}

impl Limits {
    /// Bounds a key, value or group name used for lookup.
    pub(crate) fn clamp<'a>(&self, text: &'a str) -> &'a str {
        truncate(text, self.max_key_value_length)
    }

    /// Bounds a key, value or group name about to be stored.
    pub(crate) fn bounded(&self, text: &str, what: &'static str) -> String {
        let kept = self.clamp(text);

        if kept.len() < text.len() {
            warn!(
                what,
                length = text.len(),
                limit = self.max_key_value_length,
                "truncating"
            );
        }

        kept.to_owned()
    }
}

/// Cuts `text` to at most `max` bytes without splitting a character.
pub(crate) fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }

    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

/// An in-memory configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub(crate) groups: Vec<Group>,
    limits: Limits,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            groups: Vec::new(),
            limits,
        }
    }

    #[must_use]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or read, if a key/value pair appears before the first section
    /// header, or if storage for a group or item cannot be allocated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::load_with_limits(path, Limits::default())
    }

    /// Same as [`Document::load`] with explicit length bounds.
    ///
    /// # Errors
    ///
    /// See [`Document::load`].
    pub fn load_with_limits(path: impl AsRef<Path>, limits: Limits) -> Result<Self, LoadError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading document");

        let mut file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_owned(),
            source,
        })?;
        let document = Self::read_with_limits(&mut file, limits)?;

        debug!(
            path = %path.display(),
            groups = document.group_count(),
            "loaded document"
        );
        Ok(document)
    }

    /// Parses a document from any byte source.
    ///
    /// # Errors
    ///
    /// See [`Document::load`].
    pub fn from_reader<R>(reader: &mut R) -> Result<Self, LoadError>
    where
        R: Read,
    {
        Self::read_with_limits(reader, Limits::default())
    }

    fn read_with_limits<R>(reader: &mut R, limits: Limits) -> Result<Self, LoadError>
    where
        R: Read,
    {
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .map_err(|source| LoadError::ReadFailure { source })?;

        let text = decode_data(&buffer);
        Self::parse_with_limits(&text, limits)
    }

    /// Parses already decoded text.
    ///
    /// # Errors
    ///
    /// Fails if a key/value pair appears before the first section header, or if storage for a group or item
    /// cannot be allocated.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        Self::parse_with_limits(text, Limits::default())
    }

    /// Same as [`Document::parse`] with explicit length bounds.
    ///
    /// # Errors
    ///
    /// See [`Document::parse`].
    pub fn parse_with_limits(text: &str, limits: Limits) -> Result<Self, LoadError> {
        Parser::new(text, limits).into_document()
    }

    /// Writes the document to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Fails if the destination cannot be opened for writing or the write itself fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let path = path.as_ref();
        debug!(path = %path.display(), groups = self.group_count(), "saving document");

        let file = File::create(path).map_err(|source| SaveError::Open {
            path: path.to_owned(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        self.write_to(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(|source| SaveError::WriteFailure { source })
    }

    /// Writes the canonical text of the document.
    ///
    /// # Errors
    ///
    /// Propagates any error from `writer`.
    pub fn write_to<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        crate::writer::write(writer, self)
    }

    #[must_use]
    pub fn to_ini_string(&self) -> String {
        self.to_string()
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        let name = self.limits.clamp(name);
        self.groups.iter().find(|group| group.name() == name)
    }

    pub(crate) fn item(&self, group: &str, key: &str) -> Option<&Item> {
        self.group(group)?.item(self.limits.clamp(key))
    }

    /// Returns the index of the group named `name`, appending an empty one if there is none.
    pub(crate) fn group_index_or_insert(&mut self, name: &str) -> Result<usize, TryReserveError> {
        let name = self.limits.clamp(name);

        if let Some(i) = self.groups.iter().position(|group| group.name() == name) {
            return Ok(i);
        }

        self.groups.try_reserve(1)?;
        self.groups
            .push(Group::new(self.limits.bounded(name, "group name")));

        Ok(self.groups.len() - 1)
    }
}

// Configuration files written on Windows are often UTF-16 LE; everything else is treated as UTF-8.
fn decode_data(data: &[u8]) -> String {
    if let Some(data) = data.strip_prefix(BOM_UTF16_LE) {
        let utf16 = data
            .chunks_exact(2)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect::<Vec<u16>>();

        char::decode_utf16(utf16)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect::<String>()
    } else {
        let data = data.strip_prefix(BOM_UTF8).unwrap_or(data);
        String::from_utf8_lossy(data).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 3), "hel");
        // 'é' is two bytes; cutting inside it backs off to the previous boundary.
        assert_eq!(truncate("aé", 2), "a");
    }

    #[test]
    fn decode_utf16_le() {
        let mut data = BOM_UTF16_LE.to_vec();
        for unit in "[A]\nk = v\n".encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }

        assert_eq!(decode_data(&data), "[A]\nk = v\n");
    }

    #[test]
    fn decode_strips_utf8_bom() {
        let data = b"\xEF\xBB\xBF[A]\n";

        assert_eq!(decode_data(data), "[A]\n");
    }

    #[test]
    fn group_index_or_insert_reuses_existing() {
        let mut document = Document::new();

        let first = document.group_index_or_insert("A").unwrap();
        let second = document.group_index_or_insert("B").unwrap();
        let again = document.group_index_or_insert("A").unwrap();

        assert_eq!((first, second, again), (0, 1, 0));
        assert_eq!(document.group_count(), 2);
    }

    #[test]
    fn long_group_names_are_truncated_and_still_found() {
        let limits = Limits {
            max_key_value_length: 4,
            ..Limits::default()
        };
        let mut document = Document::with_limits(limits);

        document.group_index_or_insert("Networking").unwrap();

        assert_eq!(document.groups()[0].name(), "Netw");
        assert!(document.group("Networking").is_some());
        assert!(document.group("Netw").is_some());
    }
}
