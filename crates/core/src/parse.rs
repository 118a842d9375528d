/// Parses a base-10 integer the way a browser's `parseInt(s, 10)` does.
///
/// Leading whitespace is skipped, an optional sign is accepted and the
/// longest run of digits is used (`"12abc"` gives 12). Returns `None` where
/// the browser would produce `NaN`, and also when the digits overflow `i64`.
pub fn parse_int(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
