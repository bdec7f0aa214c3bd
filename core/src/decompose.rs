//! Decomposition of raw transport output into status, headers and body.
//!
//! The transport returns the response with its header block inline. When the
//! engine handled a `100 Continue`, a redirect or an auth challenge on its
//! own, several header blocks precede the body. The last block is the one
//! that describes the body; all of them are stripped from it.

use log::trace;
use memchr::{memchr, memmem};

use crate::error::ParseError;
use crate::types::HeaderFields;

const BLOCK_END: &[u8] = b"\r\n\r\n";

/// Result of splitting raw transport output.
#[derive(Debug)]
pub(crate) struct Decomposed {
    pub headers: HeaderFields,
    pub body: Vec<u8>,
}

/// Split raw response bytes into the final header block's fields and the body.
pub(crate) fn decompose(raw: &[u8]) -> Result<Decomposed, ParseError> {
    let blocks = scan_header_blocks(raw);
    let last = blocks.last().ok_or(ParseError::MissingStatusLine)?;

    let block = String::from_utf8_lossy(&raw[last.start..last.end - BLOCK_END.len()]);
    let mut lines = block.split("\r\n");
    let mut headers = HeaderFields::new();
    if let Some(status_line) = lines.next() {
        parse_status_line(status_line, &mut headers);
    }
    for line in lines {
        match line.split_once(": ") {
            Some((name, value)) => headers.insert(name, value),
            None => trace!("skipping malformed response header line {line:?}"),
        }
    }

    let received: Vec<u8> = blocks
        .iter()
        .flat_map(|range| raw[range.clone()].iter().copied())
        .collect();
    let body = remove_all(raw, &received);

    Ok(Decomposed { headers, body })
}

/// Parse the captured outgoing request header block.
pub(crate) fn parse_request_headers(block: &str) -> HeaderFields {
    let mut headers = HeaderFields::new();
    let mut lines = block.split("\r\n").filter(|line| !line.is_empty());

    if let Some(request_line) = lines.next() {
        let tokens: Vec<&str> = request_line.splitn(3, ' ').collect();
        if let [method, path, version] = tokens[..] {
            headers.insert("Method", method);
            headers.insert("Path", path);
            headers.insert("Version", version);
        } else {
            trace!("request line {request_line:?} is not METHOD PATH VERSION");
        }
    }

    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name, value);
        }
    }

    headers.map_values(|value| value.trim().to_string());
    headers
}

/// Byte ranges of every header block, in order. Each range starts at a line
/// beginning with `HTTP/<d>.<d>` and ends just past its `\r\n\r\n` terminator.
fn scan_header_blocks(raw: &[u8]) -> Vec<std::ops::Range<usize>> {
    let mut blocks = Vec::new();
    let mut from = 0;
    while let Some(start) = next_block_start(raw, from) {
        let Some(offset) = memmem::find(&raw[start..], BLOCK_END) else {
            break;
        };
        let end = start + offset + BLOCK_END.len();
        blocks.push(start..end);
        from = end;
    }
    blocks
}

/// Offset of the next line at or after `from` that starts with `HTTP/<d>.<d>`.
fn next_block_start(raw: &[u8], mut from: usize) -> Option<usize> {
    while from < raw.len() {
        let at_line_start = from == 0 || raw[from - 1] == b'\n';
        if at_line_start && has_version_prefix(&raw[from..]) {
            return Some(from);
        }
        from += memchr(b'\n', &raw[from..])? + 1;
    }
    None
}

/// `HTTP/<d>.<d>` at the start of `line`, scheme case-insensitive.
fn has_version_prefix(line: &[u8]) -> bool {
    line.len() >= 8
        && line[..5].eq_ignore_ascii_case(b"HTTP/")
        && line[5].is_ascii_digit()
        && line[6] == b'.'
        && line[7].is_ascii_digit()
}

/// Offset of the three-digit status code in a status line: the version
/// prefix, at least one space or tab, then the code.
fn status_code_offset(line: &[u8]) -> Option<usize> {
    if !has_version_prefix(line) {
        return None;
    }
    let spaces = line[8..].iter().take_while(|&&b| b == b' ' || b == b'\t').count();
    if spaces == 0 {
        return None;
    }
    let code_at = 8 + spaces;
    let code = line.get(code_at..code_at + 3)?;
    code.iter().all(u8::is_ascii_digit).then_some(code_at)
}

/// Populate `Http-Version`, `Status-Code` and `Status` from the status line.
/// `Status` keeps the code in front of the reason phrase. A line without a
/// code leaves all three unset.
fn parse_status_line(line: &str, headers: &mut HeaderFields) {
    let Some(code_at) = status_code_offset(line.as_bytes()) else {
        trace!("status line {line:?} has no status code");
        return;
    };
    headers.insert("Http-Version", &line[5..8]);
    headers.insert("Status-Code", &line[code_at..code_at + 3]);
    headers.insert("Status", &line[code_at..]);
}

/// Remove every non-overlapping occurrence of `needle`, scanning left to right.
fn remove_all(haystack: &[u8], needle: &[u8]) -> Vec<u8> {
    let finder = memmem::Finder::new(needle);
    let mut out = Vec::with_capacity(haystack.len());
    let mut last = 0;
    for at in finder.find_iter(haystack) {
        out.extend_from_slice(&haystack[last..at]);
        last = at + needle.len();
    }
    out.extend_from_slice(&haystack[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_block() {
        let raw = b"HTTP/1.1 404 Not Found\r\nServer: mock\r\nContent-Length: 4\r\n\r\ngone";
        let parsed = decompose(raw).unwrap();
        assert_eq!(parsed.headers.get("Http-Version"), Some("1.1"));
        assert_eq!(parsed.headers.get("Status-Code"), Some("404"));
        assert_eq!(parsed.headers.get("Status"), Some("404 Not Found"));
        assert_eq!(parsed.headers.get("Server"), Some("mock"));
        assert_eq!(parsed.headers.get("Content-Length"), Some("4"));
        assert_eq!(parsed.body, b"gone");
    }

    #[test]
    fn continue_block_then_final_block() {
        let raw = b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 201 Created\r\nLocation: /items/1\r\n\r\n{\"id\":1}";
        let parsed = decompose(raw).unwrap();
        assert_eq!(parsed.headers.get("Status-Code"), Some("201"));
        assert_eq!(parsed.headers.get("Status"), Some("201 Created"));
        assert_eq!(parsed.headers.get("Location"), Some("/items/1"));
        assert_eq!(parsed.body, b"{\"id\":1}");
    }

    #[test]
    fn only_last_block_populates_fields() {
        let raw = b"HTTP/1.1 302 Found\r\nLocation: /next\r\nX-Hop: 1\r\n\r\nHTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<p>";
        let parsed = decompose(raw).unwrap();
        assert_eq!(parsed.headers.get("Status-Code"), Some("200"));
        assert_eq!(parsed.headers.get("Location"), None);
        assert_eq!(parsed.headers.get("X-Hop"), None);
        assert_eq!(parsed.headers.get("Content-Type"), Some("text/html"));
        assert_eq!(parsed.body, b"<p>");
    }

    #[test]
    fn synthetic_keys_come_first() {
        let raw = b"HTTP/1.0 200 OK\r\nA: 1\r\n\r\n";
        let parsed = decompose(raw).unwrap();
        let names: Vec<&str> = parsed.headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Http-Version", "Status-Code", "Status", "A"]);
        assert!(parsed.body.is_empty());
    }

    #[test]
    fn repeated_header_last_wins() {
        let raw = b"HTTP/1.1 200 OK\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\n\r\n";
        let parsed = decompose(raw).unwrap();
        assert_eq!(parsed.headers.get("Set-Cookie"), Some("b=2"));
    }

    #[test]
    fn malformed_header_lines_are_skipped() {
        let raw = b"HTTP/1.1 200 OK\r\nno separator here\r\nKey:value\r\nGood: yes\r\n\r\nbody";
        let parsed = decompose(raw).unwrap();
        assert_eq!(parsed.headers.len(), 4);
        assert_eq!(parsed.headers.get("Good"), Some("yes"));
        assert_eq!(parsed.headers.get("Key"), None);
        assert_eq!(parsed.body, b"body");
    }

    #[test]
    fn header_value_keeps_inner_separators() {
        let raw = b"HTTP/1.1 200 OK\r\nX-Note: a: b\r\n\r\n";
        let parsed = decompose(raw).unwrap();
        assert_eq!(parsed.headers.get("X-Note"), Some("a: b"));
    }

    #[test]
    fn status_without_reason_phrase() {
        let raw = b"HTTP/1.1 204\r\n\r\n";
        let parsed = decompose(raw).unwrap();
        assert_eq!(parsed.headers.get("Status-Code"), Some("204"));
        assert_eq!(parsed.headers.get("Status"), Some("204"));
    }

    #[test]
    fn scheme_match_is_case_insensitive() {
        let raw = b"http/1.1 200 OK\r\nServer: x\r\n\r\nok";
        let parsed = decompose(raw).unwrap();
        assert_eq!(parsed.headers.get("Status-Code"), Some("200"));
        assert_eq!(parsed.body, b"ok");
    }

    #[test]
    fn body_may_contain_blank_lines_and_binary() {
        let mut raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\n\r\n".to_vec();
        raw.extend_from_slice(&[0, 159, 146, 150, b'\r', b'\n', b'\r', b'\n', 255]);
        let parsed = decompose(&raw).unwrap();
        assert_eq!(parsed.body, vec![0, 159, 146, 150, b'\r', b'\n', b'\r', b'\n', 255]);
    }

    #[test]
    fn missing_status_line_is_an_error() {
        let err = decompose(b"just some bytes\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::MissingStatusLine);
        assert_eq!(decompose(b"").unwrap_err(), ParseError::MissingStatusLine);
    }

    #[test]
    fn unterminated_block_is_not_a_block() {
        assert!(decompose(b"HTTP/1.1 200 OK\r\nServer: x").is_err());
    }

    #[test]
    fn status_line_must_start_a_line() {
        let raw = b"HTTP/1.1 200 OK\r\n\r\nsee HTTP/1.1 500 Oops\r\n\r\n";
        let parsed = decompose(raw).unwrap();
        assert_eq!(parsed.headers.get("Status-Code"), Some("200"));
        assert_eq!(parsed.body, b"see HTTP/1.1 500 Oops\r\n\r\n");
    }

    #[test]
    fn request_headers_with_synthetic_keys() {
        let block = "POST /form?x=1 HTTP/1.1\r\nHost: example.com\r\nContent-Type: application/x-www-form-urlencoded  \r\n\r\n";
        let headers = parse_request_headers(block);
        assert_eq!(headers.get("Method"), Some("POST"));
        assert_eq!(headers.get("Path"), Some("/form?x=1"));
        assert_eq!(headers.get("Version"), Some("HTTP/1.1"));
        assert_eq!(headers.get("Host"), Some("example.com"));
        assert_eq!(headers.get("Content-Type"), Some("application/x-www-form-urlencoded"));
    }

    #[test]
    fn request_line_with_wrong_token_count() {
        let headers = parse_request_headers("GET /only-two\r\nAccept: */*\r\n\r\n");
        assert_eq!(headers.get("Method"), None);
        assert_eq!(headers.get("Path"), None);
        assert_eq!(headers.get("Accept"), Some("*/*"));
    }

    #[test]
    fn request_header_splits_on_first_colon() {
        let headers = parse_request_headers("GET / HTTP/1.1\r\nHost: localhost:8080\r\nbogus line\r\n");
        assert_eq!(headers.get("Host"), Some("localhost:8080"));
        assert_eq!(headers.len(), 4);
    }

    #[test]
    fn empty_request_block() {
        assert!(parse_request_headers("").is_empty());
    }

    #[test]
    fn block_without_status_code_is_still_stripped() {
        let parsed = decompose(b"HTTP/1.1 abc\r\n\r\nbody").unwrap();
        assert_eq!(parsed.body, b"body");
        assert_eq!(parsed.headers.get("Http-Version"), None);
        assert_eq!(parsed.headers.get("Status-Code"), None);
        assert_eq!(parsed.headers.get("Status"), None);
        assert!(parsed.headers.is_empty());
    }

    #[test]
    fn codeless_final_block_keeps_its_header_lines() {
        let raw = b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1\r\nServer: odd\r\n\r\nrest";
        let parsed = decompose(raw).unwrap();
        assert_eq!(parsed.headers.get("Status-Code"), None);
        assert_eq!(parsed.headers.get("Server"), Some("odd"));
        assert_eq!(parsed.body, b"rest");
    }

    #[test]
    fn http2_status_line_is_not_a_block() {
        let err = decompose(b"HTTP/2 200 \r\ncontent-type: text/plain\r\n\r\nhello").unwrap_err();
        assert_eq!(err, ParseError::MissingStatusLine);
    }

    #[test]
    fn remove_all_strips_every_occurrence() {
        assert_eq!(remove_all(b"abXabYab", b"ab"), b"XY");
        assert_eq!(remove_all(b"nothing", b"zz"), b"nothing");
        assert_eq!(remove_all(b"aaaa", b"aa"), b"");
    }
}
