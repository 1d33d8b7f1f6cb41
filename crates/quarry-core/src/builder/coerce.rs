//! Integer coercion for LIMIT and OFFSET arguments.

/// Converts a LIMIT/OFFSET argument into an integer.
///
/// Integers convert directly. Text reads an optional sign and the leading
/// digits after any whitespace; text without leading digits is 0.
pub trait ToInteger {
    /// Returns the integer value.
    fn to_integer(self) -> i64;
}

macro_rules! impl_to_integer {
    ($($ty:ty),+) => {
        $(
            impl ToInteger for $ty {
                fn to_integer(self) -> i64 {
                    i64::from(self)
                }
            }
        )+
    };
}

impl_to_integer!(i64, i32, i16, i8, u32, u16, u8);

impl ToInteger for u64 {
    fn to_integer(self) -> i64 {
        i64::try_from(self).unwrap_or(i64::MAX)
    }
}

impl ToInteger for usize {
    fn to_integer(self) -> i64 {
        i64::try_from(self).unwrap_or(i64::MAX)
    }
}

impl ToInteger for &str {
    fn to_integer(self) -> i64 {
        leading_integer(self)
    }
}

impl ToInteger for String {
    fn to_integer(self) -> i64 {
        leading_integer(&self)
    }
}

impl ToInteger for &String {
    fn to_integer(self) -> i64 {
        leading_integer(self)
    }
}

fn leading_integer(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }

    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_pass_through() {
        assert_eq!(3_i32.to_integer(), 3);
        assert_eq!(10_usize.to_integer(), 10);
        assert_eq!(u64::MAX.to_integer(), i64::MAX);
    }

    #[test]
    fn test_text_reads_leading_digits() {
        assert_eq!("1".to_integer(), 1);
        assert_eq!("  42".to_integer(), 42);
        assert_eq!("7 rows".to_integer(), 7);
        assert_eq!("-3".to_integer(), -3);
        assert_eq!("+8".to_integer(), 8);
    }

    #[test]
    fn test_non_numeric_text_is_zero() {
        assert_eq!("abc".to_integer(), 0);
        assert_eq!("".to_integer(), 0);
        assert_eq!("-".to_integer(), 0);
    }
}
