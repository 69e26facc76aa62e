pub const OCTET_STREAM: &str = "application/octet-stream";

/// Pick a display content type for a decrypted record: file extension first,
/// then magic bytes, then an opaque binary type. Extensions that only map to
/// octet-stream (`.bin`, `.dat`) still get sniffed.
pub fn content_type_for(file_name: &str, plaintext: &[u8]) -> &'static str {
    mime_guess::from_path(file_name)
        .first_raw()
        .filter(|mime| *mime != OCTET_STREAM)
        .unwrap_or_else(|| sniff(plaintext))
}

fn sniff(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"%PDF-") {
        "application/pdf"
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else {
        OCTET_STREAM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_wins() {
        assert_eq!(content_type_for("Report.PDF", b""), "application/pdf");
        assert_eq!(content_type_for("xray.jpeg", b"%PDF-"), "image/jpeg");
        assert_eq!(content_type_for("labs.json", b"{}"), "application/json");
        assert_eq!(content_type_for("notes.txt", b"%PDF-"), "text/plain");
    }

    #[test]
    fn falls_back_to_magic_bytes() {
        assert_eq!(content_type_for("scan", &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0]), "image/png");
        assert_eq!(content_type_for("upload.bin", b"%PDF-1.4"), "application/pdf");
        assert_eq!(content_type_for("photo", &[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    }

    #[test]
    fn defaults_to_octet_stream() {
        assert_eq!(content_type_for("scan.bin", b"PK\x03\x04"), OCTET_STREAM);
        assert_eq!(content_type_for("", b""), OCTET_STREAM);
    }
}
