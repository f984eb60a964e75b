//! Resolution-derived defaults for word count and font size.
//!
//! Both functions are pure; explicit CLI overrides take precedence and are
//! validated at argument-parse time instead of here.

/// Suggested word cap for a canvas: `width * height / 1000`, rounded to the
/// nearest hundred (half-up). A 1080p canvas yields 2100.
#[must_use]
pub fn max_words(width: u32, height: u32) -> u32 {
    let per_mille = u64::from(width) * u64::from(height) / 1000;
    let rounded = (per_mille + 50) / 100 * 100;
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Suggested maximum font size for a canvas height: `height / 27`.
/// A 1080-pixel canvas yields 40.
#[must_use]
pub fn font_size(height: u32) -> u32 {
    height / 27
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_max_words_1080p() {
        // 1920*1080/1000 = 2073.6 -> truncated 2073 -> nearest hundred 2100
        assert_eq!(max_words(1920, 1080), 2100);
    }

    #[test]
    fn test_max_words_rounds_half_up() {
        // 500*100/1000 = 50 -> 100
        assert_eq!(max_words(500, 100), 100);
        // 490*100/1000 = 49 -> 0
        assert_eq!(max_words(490, 100), 0);
    }

    #[test]
    fn test_font_size_examples() {
        assert_eq!(font_size(1080), 40);
        assert_eq!(font_size(27), 1);
        assert_eq!(font_size(26), 0);
    }

    proptest! {
        #[test]
        fn max_words_is_multiple_of_hundred(w in 1u32..8192, h in 1u32..8192) {
            prop_assert_eq!(max_words(w, h) % 100, 0);
        }

        #[test]
        fn max_words_tracks_area(w in 1u32..8192, h in 1u32..8192) {
            let exact = u64::from(w) * u64::from(h) / 1000;
            let got = u64::from(max_words(w, h));
            prop_assert!(got.abs_diff(exact) <= 50);
        }

        #[test]
        fn font_size_matches_integer_division(h in 1u32..16384) {
            prop_assert_eq!(font_size(h), h / 27);
        }
    }
}
