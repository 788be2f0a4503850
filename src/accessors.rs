//! Typed getters and setters over the textual values of a [`Document`].
//!
//! Getters return `None` when the group or key does not exist. Numeric getters never fail on malformed text:
//! they parse the longest valid numeric prefix and fall back to zero, so `"abc"` reads as `0` and `"42px"`
//! reads as `42`.

use crate::error::WriteError;
use crate::group::Item;
use crate::Document;

impl Document {
    #[must_use]
    pub fn get_int(&self, group: &str, key: &str) -> Option<i64> {
        self.item(group, key).map(|item| lenient_int(item.value()))
    }

    #[must_use]
    pub fn get_float(&self, group: &str, key: &str) -> Option<f64> {
        self.item(group, key).map(|item| lenient_float(item.value()))
    }

    #[must_use]
    pub fn get_string(&self, group: &str, key: &str) -> Option<&str> {
        self.item(group, key).map(Item::value)
    }

    /// Copies the stored text into `buffer`, returning how many bytes of it were copied.
    ///
    /// Text longer than the buffer is cut at the buffer's capacity, which may split a multi-byte character.
    /// Unused trailing bytes are zeroed. No terminator is guaranteed when the text fills the buffer.
    #[must_use]
    pub fn get_string_into(&self, group: &str, key: &str, buffer: &mut [u8]) -> Option<usize> {
        let value = self.get_string(group, key)?.as_bytes();
        let copied = value.len().min(buffer.len());

        buffer[..copied].copy_from_slice(&value[..copied]);
        buffer[copied..].fill(0);

        Some(copied)
    }

    /// True when the first four characters of the value are `true` in any ASCII case.
    #[must_use]
    pub fn get_bool(&self, group: &str, key: &str) -> Option<bool> {
        self.item(group, key).map(|item| is_true(item.value()))
    }

    /// # Errors
    ///
    /// Fails if storage for a new group or item cannot be allocated.
    pub fn set_int(&mut self, group: &str, key: &str, value: i64) -> Result<(), WriteError> {
        self.set_raw(group, key, &value.to_string(), false)
    }

    /// Stores the value in fixed notation with six fractional digits.
    ///
    /// # Errors
    ///
    /// Fails if storage for a new group or item cannot be allocated.
    pub fn set_float(&mut self, group: &str, key: &str, value: f64) -> Result<(), WriteError> {
        self.set_raw(group, key, &format!("{value:.6}"), false)
    }

    /// Stores the value quoted, so it is written back as `key = "value"`.
    ///
    /// # Errors
    ///
    /// Fails if storage for a new group or item cannot be allocated.
    pub fn set_string(&mut self, group: &str, key: &str, value: &str) -> Result<(), WriteError> {
        self.set_raw(group, key, value, true)
    }

    /// # Errors
    ///
    /// Fails if storage for a new group or item cannot be allocated.
    pub fn set_bool(&mut self, group: &str, key: &str, value: bool) -> Result<(), WriteError> {
        let text = if value { "true" } else { "false" };
        self.set_raw(group, key, text, false)
    }

    /// Overwrites the first item with `key` in place, or appends a new one.
    fn set_raw(
        &mut self,
        group: &str,
        key: &str,
        value: &str,
        quoted: bool,
    ) -> Result<(), WriteError> {
        let limits = self.limits();
        let value = limits.bounded(value, "value");
        let index = self.group_index_or_insert(group)?;
        let group = &mut self.groups[index];

        if let Some(item) = group.item_mut(limits.clamp(key)) {
            item.set(value, quoted);
        } else {
            group.push(Item::new(limits.bounded(key, "key"), value, quoted))?;
        }

        Ok(())
    }
}

fn is_true(value: &str) -> bool {
    value
        .as_bytes()
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(b"true"))
}

fn skip_leading_whitespace(text: &str) -> &str {
    text.trim_start_matches(|c: char| c.is_ascii_whitespace())
}

fn count_digits(bytes: &[u8], from: usize) -> usize {
    bytes
        .get(from..)
        .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
}

/// Parses an optionally signed run of decimal digits, saturating on overflow.
fn lenient_int(text: &str) -> i64 {
    let text = skip_leading_whitespace(text);
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            let digit = i64::from(digit - b'0');
            let acc = acc.saturating_mul(10);

            if negative {
                acc.saturating_sub(digit)
            } else {
                acc.saturating_add(digit)
            }
        })
}

/// Parses the longest prefix that forms a decimal float: sign, digits, fraction and exponent.
/// `inf`, `infinity` and `nan` are accepted in any case.
fn lenient_float(text: &str) -> f64 {
    const SPECIAL: [&str; 3] = ["infinity", "inf", "nan"];

    let text = skip_leading_whitespace(text);
    let bytes = text.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    for word in SPECIAL {
        let matched = bytes
            .get(end..end + word.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(word.as_bytes()));

        if matched {
            return text[..end + word.len()].parse().unwrap_or(0.0);
        }
    }

    let int_digits = count_digits(bytes, end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(bytes, end + 1);

        if frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits + frac_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;

        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }

        let exp_digits = count_digits(bytes, exponent);
        if exp_digits > 0 {
            end = exponent + exp_digits;
        }
    }

    text[..end].parse().unwrap_or(0.0)
}
