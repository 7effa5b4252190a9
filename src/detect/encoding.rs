use encoding_rs::{Encoding, UTF_8, WINDOWS_1251, WINDOWS_1252};

use crate::config::{LEGACY_CYRILLIC_SOURCES, LEGACY_LATIN_SOURCES};
use crate::source::traits::SourceOrigin;

/// Pick the decoder for a word-list source.
///
/// A byte-order mark always wins. Uploaded files are otherwise UTF-8.
/// Fetched assets use the legacy table keyed by file stem, falling back to UTF-8.
pub fn detect_encoding(name: &str, origin: SourceOrigin, bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    match origin {
        SourceOrigin::Uploaded => UTF_8,
        SourceOrigin::Fetched => legacy_encoding(name).unwrap_or(UTF_8),
    }
}

/// Legacy 8-bit encoding for known asset names, if any.
pub fn legacy_encoding(name: &str) -> Option<&'static Encoding> {
    let stem = file_stem(name).to_ascii_lowercase();
    if LEGACY_LATIN_SOURCES.contains(&stem.as_str()) {
        Some(WINDOWS_1252)
    } else if LEGACY_CYRILLIC_SOURCES.contains(&stem.as_str()) {
        Some(WINDOWS_1251)
    } else {
        None
    }
}

/// Decode `bytes` with `encoding`, rejecting malformed input instead of substituting.
pub fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

fn file_stem(name: &str) -> &str {
    let base = name.rsplit('/').next().unwrap_or(name);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(dot) => &base[..dot],
    }
}
