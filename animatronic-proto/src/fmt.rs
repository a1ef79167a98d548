//! Allocation-free number formatting and parsing for the text codec.

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Write a byte as 2 uppercase hex digits. Returns 2.
#[inline]
pub fn write_hex_u8(buf: &mut [u8], value: u8) -> usize {
    debug_assert!(buf.len() >= 2, "buffer too small for hex u8");
    buf[0] = HEX_DIGITS[(value >> 4) as usize];
    buf[1] = HEX_DIGITS[(value & 0xF) as usize];
    2
}

/// Write an unsigned value in decimal. Returns the number of bytes (1-5).
#[inline]
pub fn write_u16(buf: &mut [u8], value: u16) -> usize {
    debug_assert!(buf.len() >= 5, "buffer too small for u16");

    let mut digits = [0u8; 5];
    let mut n = value;
    let mut len = 0;
    loop {
        digits[len] = b'0' + (n % 10) as u8;
        n /= 10;
        len += 1;
        if n == 0 {
            break;
        }
    }

    for i in 0..len {
        buf[i] = digits[len - 1 - i];
    }
    len
}

/// Write a signed value in decimal. Returns the number of bytes (1-6).
#[inline]
pub fn write_i16(buf: &mut [u8], value: i16) -> usize {
    debug_assert!(buf.len() >= 6, "buffer too small for i16");

    if value < 0 {
        buf[0] = b'-';
        // unsigned_abs handles i16::MIN without overflow
        1 + write_u16(&mut buf[1..], value.unsigned_abs())
    } else {
        write_u16(buf, value as u16)
    }
}

#[inline]
fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}

/// Parse exactly 2 hex digits.
#[inline]
pub fn parse_hex_u8(s: &[u8]) -> Option<u8> {
    match s {
        [high, low] => Some((hex_digit(*high)? << 4) | hex_digit(*low)?),
        _ => None,
    }
}

/// Parse a magnitude of at most 5 decimal digits.
#[inline]
fn parse_magnitude(s: &[u8]) -> Option<u32> {
    if s.is_empty() || s.len() > 5 {
        return None;
    }
    s.iter().try_fold(0u32, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
    })
}

/// Parse an unsigned decimal that fits in `u16`.
#[inline]
pub fn parse_u16(s: &[u8]) -> Option<u16> {
    parse_magnitude(s).and_then(|v| u16::try_from(v).ok())
}

/// Parse a signed decimal that fits in `i16`, with an optional sign.
#[inline]
pub fn parse_i16(s: &[u8]) -> Option<i16> {
    let (negative, digits) = match s.first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = i32::try_from(parse_magnitude(digits)?).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i16::try_from(value).ok()
}

/// Parse a `0`/`1` flag.
#[inline]
pub fn parse_bool(s: &[u8]) -> Option<bool> {
    match s {
        b"1" => Some(true),
        b"0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_u16() {
        let mut buf = [0u8; 5];

        let len = write_u16(&mut buf, 0);
        assert_eq!(&buf[..len], b"0");

        let len = write_u16(&mut buf, 90);
        assert_eq!(&buf[..len], b"90");

        let len = write_u16(&mut buf, 65535);
        assert_eq!(&buf[..len], b"65535");
    }

    #[test]
    fn test_write_i16() {
        let mut buf = [0u8; 6];

        let len = write_i16(&mut buf, 180);
        assert_eq!(&buf[..len], b"180");

        let len = write_i16(&mut buf, -5);
        assert_eq!(&buf[..len], b"-5");

        let len = write_i16(&mut buf, i16::MIN);
        assert_eq!(&buf[..len], b"-32768");

        let len = write_i16(&mut buf, i16::MAX);
        assert_eq!(&buf[..len], b"32767");
    }

    #[test]
    fn test_write_hex_u8() {
        let mut buf = [0u8; 2];
        write_hex_u8(&mut buf, 0x0A);
        assert_eq!(&buf, b"0A");
        write_hex_u8(&mut buf, 0xFF);
        assert_eq!(&buf, b"FF");
    }

    #[test]
    fn test_parse_hex_u8() {
        assert_eq!(parse_hex_u8(b"0a"), Some(0x0A));
        assert_eq!(parse_hex_u8(b"C3"), Some(0xC3));
        assert_eq!(parse_hex_u8(b"C"), None);
        assert_eq!(parse_hex_u8(b"C3F"), None);
        assert_eq!(parse_hex_u8(b"G0"), None);
    }

    #[test]
    fn test_parse_u16_bounds() {
        assert_eq!(parse_u16(b"0"), Some(0));
        assert_eq!(parse_u16(b"65535"), Some(65535));
        assert_eq!(parse_u16(b"65536"), None);
        assert_eq!(parse_u16(b"-1"), None);
        assert_eq!(parse_u16(b""), None);
        assert_eq!(parse_u16(b"123456"), None);
    }

    #[test]
    fn test_parse_i16_bounds() {
        assert_eq!(parse_i16(b"-32768"), Some(i16::MIN));
        assert_eq!(parse_i16(b"+32767"), Some(i16::MAX));
        assert_eq!(parse_i16(b"32768"), None);
        assert_eq!(parse_i16(b"-"), None);
        assert_eq!(parse_i16(b"1x"), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool(b"1"), Some(true));
        assert_eq!(parse_bool(b"0"), Some(false));
        assert_eq!(parse_bool(b"true"), None);
        assert_eq!(parse_bool(b""), None);
    }
}
