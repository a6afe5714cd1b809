//! Decoding of `wsl.exe` output.
//!
//! `wsl.exe` writes UTF-16LE on most Windows locales and UTF-8 when
//! `WSL_UTF8=1` is set or when running under WSL interop. Text matching must
//! happen on the decoded form.

const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Whether `raw` looks like UTF-16LE: a BOM, or NUL high bytes for most of
/// the first ten code units.
fn looks_like_utf16le(raw: &[u8]) -> bool {
    if raw.starts_with(&UTF16LE_BOM) {
        return true;
    }
    raw.len() >= 4
        && raw.len() % 2 == 0
        && raw
            .iter()
            .skip(1)
            .step_by(2)
            .take(10)
            .filter(|&&b| b == 0x00)
            .count()
            >= 2.max(raw.len().min(20) / 4)
}

/// Decode raw process output to a `String`, whichever encoding it uses.
///
/// Invalid sequences are replaced, never rejected.
#[must_use]
pub fn normalize_output(raw: &[u8]) -> String {
    if looks_like_utf16le(raw) {
        let body = raw.strip_prefix(&UTF16LE_BOM).unwrap_or(raw);
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    let body = raw.strip_prefix(&UTF8_BOM).unwrap_or(raw);
    String::from_utf8_lossy(body).into_owned()
}
