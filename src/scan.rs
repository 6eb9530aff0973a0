//! Scanning primitives (spec §4.1, §2 item 1).
//!
//! Stateless functions over a byte buffer and position, plus a [`Scanner`]
//! that bundles a buffer, a byte offset, a [`Cursor`] and an [`Encoding`] —
//! the combination every node parser in [`crate::parse`] drives directly,
//! the same way the teacher crate's `Stream` bundles offset and text.

use crate::cursor::{Cursor, Encoding, TextPos};

const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// Decodes one code point at `bytes[pos..]`.
///
/// Under [`Encoding::Legacy`] every byte decodes to itself as a `char` (no
/// multi-byte awareness — this mode exists so pre-UTF-8 documents pass
/// through byte-for-byte). Under [`Encoding::Utf8`] a malformed sequence
/// decodes to `U+FFFD` and consumes a single byte, so scanning always makes
/// progress.
pub fn decode_char(bytes: &[u8], pos: usize, encoding: Encoding) -> (char, usize) {
    if pos >= bytes.len() {
        return (REPLACEMENT_CHAR, 0);
    }

    let b0 = bytes[pos];
    if encoding == Encoding::Legacy || b0 < 0x80 {
        return (b0 as char, 1);
    }

    let rest = &bytes[pos..];
    match core::str::from_utf8(rest) {
        Ok(s) => {
            let c = s.chars().next().unwrap_or(REPLACEMENT_CHAR);
            (c, c.len_utf8())
        }
        Err(e) => {
            // Decode just the valid prefix, if any starts right here.
            let valid_len = e.valid_up_to();
            if valid_len > 0 {
                let c = core::str::from_utf8(&rest[..valid_len]).unwrap().chars().next();
                if let Some(c) = c {
                    return (c, c.len_utf8());
                }
            }
            (REPLACEMENT_CHAR, 1)
        }
    }
}

/// Encodes a UTF-32 code point into UTF-8 bytes.
///
/// Returns the number of bytes written into `out` (1 to 4). An invalid
/// scalar value (surrogate, or out of Unicode range) is replaced by
/// `U+FFFD`.
pub fn utf32_to_utf8(code_point: u32, out: &mut [u8; 4]) -> usize {
    let c = char::from_u32(code_point).unwrap_or(REPLACEMENT_CHAR);
    c.encode_utf8(out).len()
}

/// Checks whether the code point at `bytes[pos..]` can start a name
/// (spec §4.1: alphabetic or `_`).
pub fn is_name_start(bytes: &[u8], pos: usize, encoding: Encoding) -> bool {
    if pos >= bytes.len() {
        return false;
    }

    let b0 = bytes[pos];
    if encoding == Encoding::Legacy {
        return b0 >= 0x80 || (b0 as char).is_ascii_alphabetic() || b0 == b'_';
    }

    if b0 < 0x80 {
        return (b0 as char).is_ascii_alphabetic() || b0 == b'_';
    }

    let (c, _) = decode_char(bytes, pos, encoding);
    c.is_alphabetic()
}

/// Checks whether the code point at `bytes[pos..]` can continue a name
/// (spec §4.1: alphanumeric, `_`, `-`, `.`, `:`).
pub fn is_name_continue(bytes: &[u8], pos: usize, encoding: Encoding) -> bool {
    if pos >= bytes.len() {
        return false;
    }

    let b0 = bytes[pos];
    if encoding == Encoding::Legacy {
        return b0 >= 0x80 || is_ascii_name_continue(b0);
    }

    if b0 < 0x80 {
        return is_ascii_name_continue(b0);
    }

    let (c, _) = decode_char(bytes, pos, encoding);
    c.is_alphanumeric()
}

fn is_ascii_name_continue(b: u8) -> bool {
    (b as char).is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':')
}

/// Lowercases an ASCII byte; non-ASCII bytes pass through unchanged
/// (spec §4.1: "case-insensitive mode it lowercases ASCII only").
pub fn to_lower_ascii(b: u8) -> u8 {
    b.to_ascii_lowercase()
}

/// Compares `bytes[pos..]` against `target` byte-by-byte, optionally
/// ASCII-case-insensitively (spec §4.1 `stringEqual`).
pub fn string_equal(bytes: &[u8], pos: usize, target: &[u8], ignore_case: bool) -> bool {
    if pos + target.len() > bytes.len() {
        return false;
    }

    let window = &bytes[pos..pos + target.len()];
    if ignore_case {
        window.iter().zip(target).all(|(a, b)| to_lower_ascii(*a) == to_lower_ascii(*b))
    } else {
        window == target
    }
}

/// A byte buffer plus a moving position, a [`Cursor`] and an [`Encoding`],
/// advanced together by every node parser.
pub struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
    cursor: Cursor,
    encoding: Encoding,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner at the start of `bytes`.
    pub fn new(bytes: &'a [u8], tab_size: u32, encoding: Encoding) -> Self {
        Scanner { bytes, pos: 0, cursor: Cursor::new(tab_size), encoding }
    }

    /// Current byte offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Current 1-based `(row, col)`.
    pub fn text_pos(&self) -> TextPos {
        self.cursor.pos()
    }

    /// The active encoding mode.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Switches the encoding mode mid-parse (used once a Declaration's
    /// `encoding` attribute has been read — spec §4.7).
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    /// `true` once every byte has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// The byte at the current position, if any.
    pub fn current(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// The byte `offset` positions ahead of the current one, if any.
    pub fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Remaining, unconsumed bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    /// The whole input buffer, for callers (e.g. the entity decoder) that
    /// need an absolute byte offset rather than a position relative to the
    /// scanner's cursor.
    pub fn full_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// A slice of the input between two absolute byte offsets.
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.bytes[start..end]
    }

    /// `true` if the unconsumed input starts with `pat`.
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        string_equal(self.bytes, self.pos, pat, false)
    }

    /// `true` if the unconsumed input starts with `pat`, ASCII-case-insensitively.
    pub fn starts_with_ignore_case(&self, pat: &[u8]) -> bool {
        string_equal(self.bytes, self.pos, pat, true)
    }

    /// Advances past `n` already-matched bytes, updating the cursor.
    pub fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if let Some(b) = self.current() {
                self.cursor.advance(b, self.encoding);
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Advances past one decoded character, returning it.
    pub fn advance_char(&mut self) -> Option<char> {
        if self.at_end() {
            return None;
        }
        let (c, len) = decode_char(self.bytes, self.pos, self.encoding);
        self.advance(len.max(1));
        Some(c)
    }

    /// Skips whitespace (space, tab, `\n`, `\r`).
    ///
    /// At the very start of the input, under [`Encoding::Utf8`], also
    /// consumes a leading UTF-8 BOM (`EF BB BF`) once (spec §4.1).
    pub fn skip_whitespace(&mut self) {
        if self.pos == 0 && self.encoding == Encoding::Utf8 && self.starts_with(&[0xEF, 0xBB, 0xBF]) {
            self.advance(3);
        }

        while let Some(b) = self.current() {
            if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                self.advance(1);
            } else {
                break;
            }
        }
    }

    /// Reads a name starting at the current position (spec §4.1 `readName`).
    ///
    /// Returns `None` ("no name") if the first byte cannot start a name,
    /// without advancing.
    pub fn read_name(&mut self) -> Option<String> {
        if !is_name_start(self.bytes, self.pos, self.encoding) {
            return None;
        }

        let start = self.pos;
        let (_, len) = decode_char(self.bytes, self.pos, self.encoding);
        self.advance(len.max(1));

        while !self.at_end() && is_name_continue(self.bytes, self.pos, self.encoding) {
            let (_, len) = decode_char(self.bytes, self.pos, self.encoding);
            self.advance(len.max(1));
        }

        Some(decode_lossy(&self.bytes[start..self.pos], self.encoding))
    }
}

/// Decodes a byte range into an owned `String`.
///
/// Under [`Encoding::Utf8`] this is just `String::from_utf8_lossy`. Under
/// [`Encoding::Legacy`] each byte is widened to its own `char` so that
/// opaque high bytes survive round-tripping even though they are never
/// interpreted as a particular character set (spec §3: "Every node's
/// `value` field is UTF-8 after parsing finishes, regardless of source
/// encoding" — legacy bytes are preserved as Latin-1-style code points so no
/// information is silently dropped).
pub fn decode_lossy(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        Encoding::Legacy => bytes.iter().map(|&b| b as char).collect(),
    }
}
