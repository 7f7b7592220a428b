//! Fixed-width hexadecimal and base-32 digit fields

use crate::error::{DigitBase, FormatError};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";
const BASE32_DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

impl DigitBase {
    pub const fn radix(self) -> u32 {
        match self {
            DigitBase::Hex => 16,
            DigitBase::Base32 => 32,
        }
    }
}

/// Render a single digit (lowercase)
pub fn digit_char(value: u8, base: DigitBase) -> char {
    match base {
        DigitBase::Hex => HEX_DIGITS[(value & 0x0F) as usize] as char,
        DigitBase::Base32 => BASE32_DIGITS[(value & 0x1F) as usize] as char,
    }
}

/// Parse a single digit. Both cases are accepted.
pub fn digit_value(ch: char, base: DigitBase) -> Option<u8> {
    ch.to_digit(base.radix()).map(|v| v as u8)
}

/// Parse a whole line as digits of `base`, requiring exactly `expected` characters
pub fn parse_line(
    line: &str,
    line_no: usize,
    base: DigitBase,
    expected: usize,
) -> Result<Vec<u8>, FormatError> {
    let found = line.chars().count();
    if found != expected {
        return Err(FormatError::WrongLength {
            line: line_no,
            expected,
            found,
        });
    }
    line.chars()
        .enumerate()
        .map(|(column, ch)| {
            digit_value(ch, base).ok_or(FormatError::InvalidDigit {
                line: line_no,
                column,
                ch,
                base,
            })
        })
        .collect()
}

/// Combine big-endian digits into a number
pub fn combine(digits: &[u8], base: DigitBase) -> u32 {
    digits
        .iter()
        .fold(0u32, |acc, &d| acc * base.radix() + d as u32)
}

/// Append `value` as `width` big-endian digits
pub fn push_number(out: &mut String, value: u32, width: usize, base: DigitBase) {
    for i in (0..width).rev() {
        let digit = (value / base.radix().pow(i as u32)) % base.radix();
        out.push(digit_char(digit as u8, base));
    }
}
