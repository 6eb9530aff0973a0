//! The file-I/O collaborator (spec.md §1 "external collaborators").
//!
//! Reading a file and normalizing line endings lives outside the core
//! parser modules, matching spec.md's framing of file I/O as a
//! collaborator whose only contract with the core is "provide a
//! contiguous byte buffer". Grounded on
//! `original_source/TiXmlDocument.cpp`'s `LoadFile` (read-whole-file,
//! `\r\n`/bare `\r` → `\n` normalization) and `SaveFile`.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::{Document, Error, ErrorId, ParsingOptions, TextPos};

/// Either an I/O failure or a parse failure, so callers get one `Result`
/// type end to end.
#[derive(Debug)]
pub enum DocError {
    Io(io::Error),
    Parse(Error),
}

impl fmt::Display for DocError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DocError::Io(e) => write!(f, "{}", e),
            DocError::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DocError {}

impl From<io::Error> for DocError {
    fn from(e: io::Error) -> Self {
        DocError::Io(e)
    }
}

impl From<Error> for DocError {
    fn from(e: Error) -> Self {
        DocError::Parse(e)
    }
}

/// Reads `path`, normalizes line endings, and parses the result.
///
/// A failure to open or read the file itself is reported as
/// [`ErrorId::OpeningFile`] (spec §6 taxonomy, "collaborator-only"), rather
/// than as a bare `io::Error`, so callers inspecting `.id()` see one
/// consistent error surface regardless of whether reading or parsing failed.
pub fn read_file(path: impl AsRef<Path>, options: ParsingOptions) -> Result<Document, DocError> {
    let raw = fs::read(path).map_err(|e| {
        DocError::Parse(Error::with_message(ErrorId::OpeningFile, TextPos::default(), e.to_string()))
    })?;
    let normalized = normalize_line_endings(&raw);
    Document::parse_bytes(&normalized, options).map_err(DocError::from)
}

/// Serializes `doc` and writes it to `path` (spec.md §9/§10 Supplemented
/// Features, `SaveFile`).
pub fn write_file(doc: &Document, path: impl AsRef<Path>) -> io::Result<()> {
    fs::write(path, doc.to_xml_string())
}

fn normalize_line_endings(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\r' {
            out.push(b'\n');
            if bytes.get(i + 1) == Some(&b'\n') {
                i += 1;
            }
        } else {
            out.push(bytes[i]);
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_crlf_and_bare_cr() {
        assert_eq!(normalize_line_endings(b"a\r\nb\rc\n"), b"a\nb\nc\n".to_vec());
    }

    #[test]
    fn round_trips_through_a_real_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("minixml-io-test-{:p}.xml", &dir));
        std::fs::write(&path, "<a x=\"1\"/>").unwrap();

        let doc = read_file(&path, ParsingOptions::default()).unwrap();
        assert_eq!(doc.root_element().unwrap().attribute("x"), Some("1"));

        write_file(&doc, &path).unwrap();
        let doc2 = read_file(&path, ParsingOptions::default()).unwrap();
        assert_eq!(doc2.root_element().unwrap().tag_name(), Some("a"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_reported_as_opening_file_error() {
        let path = std::env::temp_dir().join("minixml-io-test-does-not-exist.xml");
        std::fs::remove_file(&path).ok();

        match read_file(&path, ParsingOptions::default()) {
            Err(DocError::Parse(e)) => assert_eq!(e.id(), crate::ErrorId::OpeningFile),
            other => panic!("expected an OpeningFile error, got {:?}", other),
        }
    }
}
