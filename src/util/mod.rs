//! Diagnostic helpers

use std::fmt::Write as _;

/// Render `bytes` as space-separated groups of two hex-encoded bytes.
///
/// Odd-length input leaves a trailing single-byte group.
pub fn hexdump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + bytes.len() / 2);
    for (i, chunk) in bytes.chunks(2).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        for byte in chunk {
            let _ = write!(out, "{byte:02x}");
        }
    }
    out
}
