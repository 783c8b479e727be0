//! Pure syntax validators shared by the router and the resource services.
//!
//! All functions are total over arbitrary strings and never panic; inputs
//! are inspected byte-wise so multi-byte characters simply fail the ASCII
//! class checks.

const NAME_LEN_MIN: usize = 3;
const NAME_LEN_MAX: usize = 30;

/// Display names: `[A-Za-z0-9_-]`, 3 to 30 characters.
#[must_use]
pub fn validate_name(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < NAME_LEN_MIN || bytes.len() > NAME_LEN_MAX {
        return false;
    }
    bytes
        .iter()
        .all(|&c| c.is_ascii_alphanumeric() || c == b'-' || c == b'_')
}

/// Canonical textual UUID: 36 characters, hexadecimal except the dashes at
/// positions 8, 13, 18 and 23.
#[must_use]
pub fn validate_uuid(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, &c)| match i {
        8 | 13 | 18 | 23 => c == b'-',
        _ => c.is_ascii_hexdigit(),
    })
}

/// Email syntax: local part in `[A-Za-z0-9._+-]`, a single `@` not in first
/// position, a domain in `[A-Za-z0-9.-]` with at least one character before
/// the final dot, and an alphabetic-only TLD after it.
#[must_use]
pub fn validate_email(s: &str) -> bool {
    let bytes = s.as_bytes();

    let Some(at) = bytes.iter().position(|&c| c == b'@') else {
        return false;
    };
    if at == 0 {
        return false;
    }

    let Some(dot) = bytes[at..].iter().rposition(|&c| c == b'.').map(|i| at + i) else {
        return false;
    };
    if dot < at + 2 {
        return false;
    }
    if dot + 1 >= bytes.len() {
        return false;
    }

    if !bytes[..at]
        .iter()
        .all(|&c| c.is_ascii_alphanumeric() || matches!(c, b'.' | b'_' | b'-' | b'+'))
    {
        return false;
    }

    if !bytes[at + 1..dot]
        .iter()
        .all(|&c| c.is_ascii_alphanumeric() || matches!(c, b'.' | b'-'))
    {
        return false;
    }

    bytes[dot + 1..].iter().all(u8::is_ascii_alphabetic)
}

/// Strict `YYYY-MM-DDTHH:MM:SS` with no trailing characters.
#[must_use]
pub fn validate_timestamp(s: &str) -> bool {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_accepts_charset_and_length() {
        assert!(validate_name("abc"));
        assert!(validate_name("station-7_garden"));
        assert!(validate_name("A23456789012345678901234567890"));
    }

    #[test]
    fn name_rejects_bad_input() {
        assert!(!validate_name(""));
        assert!(!validate_name("ab"));
        assert!(!validate_name("a234567890123456789012345678901"));
        assert!(!validate_name("has space"));
        assert!(!validate_name("dot.dot"));
        assert!(!validate_name("ñandú"));
        assert!(!validate_name("emoji🌧"));
    }

    #[test]
    fn uuid_accepts_canonical_form() {
        assert!(validate_uuid("123e4567-e89b-12d3-a456-426614174000"));
        assert!(validate_uuid("ABCDEF01-2345-6789-abcd-ef0123456789"));
    }

    #[test]
    fn uuid_rejects_bad_input() {
        assert!(!validate_uuid(""));
        assert!(!validate_uuid("123e4567-e89b-12d3-a456-42661417400"));
        assert!(!validate_uuid("123e4567-e89b-12d3-a456-4266141740000"));
        assert!(!validate_uuid("123e4567ge89b-12d3-a456-426614174000"));
        assert!(!validate_uuid("123e4567-e89b-12d3-a456+426614174000"));
        // Multi-byte content must not slip through the positional checks.
        assert!(!validate_uuid("123e4567-e89b-12d3-a456-42661417400ñ"));
    }

    #[test]
    fn email_accepts_common_forms() {
        assert!(validate_email("alice@x.io"));
        assert!(validate_email("a.b+c_d-e@sub.domain-x.org"));
    }

    #[test]
    fn email_rejects_bad_input() {
        assert!(!validate_email(""));
        assert!(!validate_email("@x.io"));
        assert!(!validate_email("alice"));
        assert!(!validate_email("alice@xio"));
        assert!(!validate_email("alice@.io"));
        assert!(!validate_email("alice@x."));
        assert!(!validate_email("alice@x.i0"));
        assert!(!validate_email("al ice@x.io"));
        assert!(!validate_email("alice@x_y.io"));
        assert!(!validate_email("ali\u{e9}@x.io"));
    }

    #[test]
    fn timestamp_accepts_strict_format_only() {
        assert!(validate_timestamp("2024-06-01T00:00:00"));
        assert!(validate_timestamp("1999-12-31T23:59:59"));
        assert!(!validate_timestamp(""));
        assert!(!validate_timestamp("2024-06-01"));
        assert!(!validate_timestamp("2024-06-01 00:00:00"));
        assert!(!validate_timestamp("2024-06-01T00:00:00Z"));
        assert!(!validate_timestamp("2024-06-01T00:00:00.123"));
        assert!(!validate_timestamp("2024-13-01T00:00:00"));
        assert!(!validate_timestamp("not-a-date"));
    }
}
