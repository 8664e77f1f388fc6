#![forbid(unsafe_code)]

pub(crate) const MAX_PAGE_LIMIT: usize = 100;

/// Raw (undecoded) query parameter value. Empty values count as absent.
pub(crate) fn extract_query_param_raw(path: &str, key: &str) -> Option<String> {
    let (_, query) = path.split_once('?')?;
    for pair in query.split('&') {
        let mut parts = pair.splitn(2, '=');
        let name = parts.next().unwrap_or("");
        if name != key {
            continue;
        }
        let value = parts.next().unwrap_or("");
        if value.is_empty() {
            return None;
        }
        return Some(value.to_string());
    }
    None
}

/// Percent-decodes a query value; `+` reads as space. Over-long or
/// non-UTF-8 values are dropped.
pub(crate) fn decode_query_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.len() > 256 {
        return None;
    }
    let mut bytes = Vec::with_capacity(trimmed.len());
    let mut input = trimmed.bytes();
    while let Some(byte) = input.next() {
        match byte {
            b'+' => bytes.push(b' '),
            b'%' => {
                let hi = input.next().and_then(hex_digit)?;
                let lo = input.next().and_then(hex_digit)?;
                bytes.push((hi << 4) | lo);
            }
            other => bytes.push(other),
        }
    }
    String::from_utf8(bytes).ok()
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

pub(crate) fn query_param(path: &str, key: &str) -> Option<String> {
    extract_query_param_raw(path, key).and_then(|raw| decode_query_value(&raw))
}

pub(crate) fn page_param(path: &str) -> usize {
    query_param(path, "page")
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

pub(crate) fn limit_param(path: &str, default: usize) -> usize {
    query_param(path, "limit")
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|limit| *limit >= 1)
        .map(|limit| limit.min(MAX_PAGE_LIMIT))
        .unwrap_or(default)
}
