//! Masking operator

/// Replace `chars_to_mask` characters of `value` with `masking_char`
///
/// Counts characters, not bytes, so multi-byte text keeps its character
/// length. Masking more characters than `value` has masks all of it.
pub fn mask(value: &str, masking_char: char, chars_to_mask: usize, from_end: bool) -> String {
    let total = value.chars().count();
    let masked = chars_to_mask.min(total);
    let (keep_before, keep_after) = if from_end {
        (total - masked, 0)
    } else {
        (0, total - masked)
    };

    value
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i < keep_before || i >= total - keep_after {
                c
            } else {
                masking_char
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("192.168.1.1", 5, true, "192.16*****" ; "ip from end")]
    #[test_case("4111111111111111", 12, false, "************1111" ; "card from start")]
    #[test_case("abc", 10, true, "***" ; "more than length")]
    #[test_case("abc", 0, true, "abc" ; "zero leaves value")]
    #[test_case("", 3, false, "" ; "empty value")]
    fn test_mask(value: &str, n: usize, from_end: bool, expected: &str) {
        assert_eq!(mask(value, '*', n, from_end), expected);
    }

    #[test]
    fn test_mask_counts_characters() {
        let masked = mask("Αθήνα", '#', 2, true);
        assert_eq!(masked, "Αθή##");
        assert_eq!(masked.chars().count(), 5);
    }
}
