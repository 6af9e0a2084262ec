//! UTF-8 decoding of raw script sources

use crate::module::traits::ModuleError;

/// Decode bytes as UTF-8, replacing invalid sequences with U+FFFD
pub fn utf8_decode(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    String::from_utf8_lossy(bytes).into_owned()
}

/// Decode bytes as UTF-8, failing on the first invalid sequence
pub fn utf8_decode_strict(bytes: &[u8]) -> Result<String, ModuleError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| ModuleError::InvalidUtf8)
}
