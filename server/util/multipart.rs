/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`, returning the pieces
/// between occurrences (excluding the needle itself).
pub fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find(|s| s.starts_with("boundary="))
        .map(|s| s["boundary=".len()..].trim_matches('"').to_owned())
}

/// One part of a multipart body: its header block and raw content.
struct Part<'a> {
    headers: String,
    data:    &'a [u8],
}

fn parts<'a>(body: &'a [u8], boundary: &str) -> Vec<Part<'a>> {
    let delimiter = format!("--{}", boundary);
    let sep = b"\r\n\r\n";
    split_on(body, delimiter.as_bytes())
        .into_iter()
        .filter_map(|part| {
            let sep_pos = find_subsequence(part, sep)?;
            let raw = &part[sep_pos + sep.len()..];
            Some(Part {
                headers: String::from_utf8_lossy(&part[..sep_pos]).into_owned(),
                data:    raw.strip_suffix(b"\r\n").unwrap_or(raw),
            })
        })
        .collect()
}

/// Extracts the raw bytes of the first file part from a multipart/form-data body.
pub fn multipart_extract_file(body: &[u8], boundary: &str) -> Option<Vec<u8>> {
    parts(body, boundary)
        .into_iter()
        .find(|p| p.headers.to_ascii_lowercase().contains("filename="))
        .map(|p| p.data.to_vec())
}

/// Extracts a plain-text (non-file) field from a multipart body.
pub fn extract_text_field(body: &[u8], boundary: &str, field_name: &str) -> Option<String> {
    let name = format!("name=\"{}\"", field_name);
    parts(body, boundary)
        .into_iter()
        .find(|p| p.headers.contains(&name) && !p.headers.contains("filename="))
        .and_then(|p| String::from_utf8(p.data.to_vec()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(b"--XYZ\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n");
        b.extend_from_slice(b"--XYZ\r\nContent-Disposition: form-data; name=\"image\"; filename=\"leaf.png\"\r\n");
        b.extend_from_slice(b"Content-Type: image/png\r\n\r\n\x89PNG\r\n\x00\x01\r\n--XYZ--\r\n");
        b
    }

    #[test]
    fn boundary_is_parsed_with_or_without_quotes() {
        assert_eq!(extract_boundary("multipart/form-data; boundary=XYZ").as_deref(), Some("XYZ"));
        assert_eq!(extract_boundary("multipart/form-data; boundary=\"XYZ\"").as_deref(), Some("XYZ"));
        assert_eq!(extract_boundary("application/json"), None);
    }

    #[test]
    fn file_part_keeps_inner_crlf() {
        let file = multipart_extract_file(&body(), "XYZ").unwrap();
        assert_eq!(file, b"\x89PNG\r\n\x00\x01".to_vec());
    }

    #[test]
    fn text_field_ignores_file_parts() {
        assert_eq!(extract_text_field(&body(), "XYZ", "note").as_deref(), Some("hello"));
        assert_eq!(extract_text_field(&body(), "XYZ", "image"), None);
    }
}
