//! Entity decoding (spec §4.2).
//!
//! Handles the five predefined named entities and numeric character
//! references. Anything else starting with `&` is literal: a bare `&` with
//! no recognizable reference passes through unchanged rather than erroring,
//! matching the teacher's and TinyXML's leniency here.

use crate::cursor::Encoding;
use crate::scan::utf32_to_utf8;

/// The result of attempting to decode a reference starting at a `&`.
pub struct Decoded {
    /// The decoded text to emit in place of the reference.
    pub text: String,
    /// Number of input bytes the reference occupied, including `&` and `;`.
    pub len: usize,
}

/// Attempts to decode an entity or character reference at `bytes[pos..]`,
/// where `bytes[pos] == b'&'`.
///
/// Returns `None` if what follows `&` is not a recognized reference; callers
/// should then treat the `&` itself as a literal character.
pub fn try_decode(bytes: &[u8], pos: usize, encoding: Encoding) -> Option<Decoded> {
    debug_assert_eq!(bytes.get(pos), Some(&b'&'));

    if let Some(rest) = bytes.get(pos + 1..) {
        if rest.starts_with(b"#x") || rest.starts_with(b"#X") {
            return decode_numeric(bytes, pos, pos + 3, 16, encoding);
        }
        if rest.starts_with(b"#") {
            return decode_numeric(bytes, pos, pos + 2, 10, encoding);
        }
    }

    for &(name, value) in PREDEFINED {
        let full = format!("&{};", name);
        if bytes[pos..].starts_with(full.as_bytes()) {
            return Some(Decoded { text: value.to_string(), len: full.len() });
        }
    }

    None
}

const PREDEFINED: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
];

fn decode_numeric(
    bytes: &[u8],
    start: usize,
    digits_start: usize,
    radix: u32,
    encoding: Encoding,
) -> Option<Decoded> {
    let max_digits = if radix == 16 { 8 } else { 10 };

    let mut end = digits_start;
    while end < bytes.len() && end - digits_start < max_digits {
        let b = bytes[end];
        let digit_ok = match radix {
            16 => (b as char).is_ascii_hexdigit(),
            _ => (b as char).is_ascii_digit(),
        };
        if !digit_ok {
            break;
        }
        end += 1;
    }

    if end == digits_start || bytes.get(end) != Some(&b';') {
        return None;
    }

    let digits = core::str::from_utf8(&bytes[digits_start..end]).ok()?;
    let code_point = u32::from_str_radix(digits, radix).ok()?;

    let text = if encoding == Encoding::Legacy && code_point < 0x100 {
        (code_point as u8 as char).to_string()
    } else {
        let mut buf = [0u8; 4];
        let len = utf32_to_utf8(code_point, &mut buf);
        core::str::from_utf8(&buf[..len]).unwrap_or("\u{FFFD}").to_string()
    };

    Some(Decoded { text, len: end + 1 - start })
}
