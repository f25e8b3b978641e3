//! Natural ordering of file names.
//!
//! Names are compared segment by segment: the text before each run of ASCII
//! digits is compared byte-wise, and the digit runs themselves are compared
//! by numeric value. `clip2.mp4` therefore sorts before `clip10.mp4`.
//!
//! Digit runs of any length are supported. Instead of parsing into a fixed
//! width integer, a run is compared by its significant digits (leading zeros
//! stripped): a longer run is larger, equal lengths compare digit by digit.

use std::cmp::Ordering;

/// Returns the byte range of the first digit run in `s` at or after `from`.
fn next_digit_run(s: &[u8], from: usize) -> Option<(usize, usize)> {
    let start = from + s[from..].iter().position(u8::is_ascii_digit)?;
    let len = s[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(s.len() - start);
    Some((start, start + len))
}

/// Compares two runs of ASCII digits by numeric value.
fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let a = trim_leading_zeros(a);
    let b = trim_leading_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn trim_leading_zeros(run: &[u8]) -> &[u8] {
    let first = run.iter().position(|&b| b != b'0').unwrap_or(run.len());
    &run[first..]
}

/// Compares two names using natural (human-expected) ordering.
///
/// Leading zeros do not matter, so `f007.mp4` and `f7.mp4` compare equal.
/// Names without digits compare exactly like `str::cmp`.
///
/// # Examples
///
/// ```rust
/// use std::cmp::Ordering;
/// use vidmerge_core::natural::compare;
///
/// assert_eq!(compare("clip2.mp4", "clip10.mp4"), Ordering::Less);
/// assert_eq!(compare("f007.mp4", "f7.mp4"), Ordering::Equal);
/// ```
pub fn compare(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut cursor_a, mut cursor_b) = (0, 0);

    loop {
        let (Some((start_a, end_a)), Some((start_b, end_b))) =
            (next_digit_run(a, cursor_a), next_digit_run(b, cursor_b))
        else {
            return a[cursor_a..].cmp(&b[cursor_b..]);
        };

        let prefix = a[cursor_a..start_a].cmp(&b[cursor_b..start_b]);
        if prefix != Ordering::Equal {
            return prefix;
        }

        let number = compare_digit_runs(&a[start_a..end_a], &b[start_b..end_b]);
        if number != Ordering::Equal {
            return number;
        }

        cursor_a = end_a;
        cursor_b = end_b;
    }
}

/// Sorts names in natural order. The sort is stable, so names comparing
/// equal keep their relative order.
pub fn natural_sort<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| compare(a.as_ref(), b.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering::{Equal, Greater, Less};

    #[test]
    fn numbers_compare_by_magnitude() {
        assert_eq!(compare("clip2.mp4", "clip10.mp4"), Less);
        assert_eq!(compare("clip10.mp4", "clip2.mp4"), Greater);
        assert_eq!(compare("a9b", "a10b"), Less);
    }

    #[test]
    fn leading_zeros_are_ignored() {
        assert_eq!(compare("f007.mp4", "f7.mp4"), Equal);
        assert_eq!(compare("f0010.mp4", "f9.mp4"), Greater);
        assert_eq!(compare("0", "000"), Equal);
    }

    #[test]
    fn prefixes_decide_before_numbers() {
        assert_eq!(compare("a10.mp4", "b2.mp4"), Less);
        assert_eq!(compare("part2", "clip1"), Greater);
    }

    #[test]
    fn later_segments_are_compared_after_equal_ones() {
        assert_eq!(compare("s1e2.mp4", "s1e10.mp4"), Less);
        assert_eq!(compare("s2e1.mp4", "s1e10.mp4"), Greater);
        assert_eq!(compare("s01e05.mkv", "s1e5.mkv"), Equal);
    }

    #[test]
    fn no_digits_is_plain_lexical() {
        assert_eq!(compare("alpha.mp4", "beta.mp4"), Less);
        assert_eq!(compare("Beta.mp4", "alpha.mp4"), "Beta.mp4".cmp("alpha.mp4"));
        assert_eq!(compare("same.mp4", "same.mp4"), Equal);
    }

    #[test]
    fn tails_compare_when_digits_run_out() {
        // One side has no digit run at all: the whole tails decide.
        assert_eq!(compare("clip.mkv", "clip1.mkv"), Less);
        assert_eq!(compare("clip1.mkv", "clip.mkv"), Greater);
        assert_eq!(compare("clip1", "clip1a"), Less);
        assert_eq!(compare("", "a"), Less);
    }

    #[test]
    fn digits_in_the_extension_are_a_run_too() {
        // "mp4" ends in a digit run, so "clip.mp" is the prefix set against "clip".
        assert_eq!(compare("clip.mp4", "clip1.mp4"), Greater);
        // Equal stems: the extension's own number decides.
        assert_eq!(compare("clip.mp3", "clip.mp4"), Less);
        assert_eq!(compare("clip.h264", "clip.h265"), Less);
    }

    #[test]
    fn arbitrarily_long_runs_do_not_overflow() {
        let small = "x99999999999999999999999999999999.mp4";
        let large = "x100000000000000000000000000000000.mp4";
        assert_eq!(compare(small, large), Less);
        assert_eq!(compare(large, large), Equal);
    }

    #[test]
    fn non_ascii_text_is_compared_by_bytes() {
        assert_eq!(compare("видео2.mp4", "видео10.mp4"), Less);
        assert_eq!(compare("é1", "e1"), "é".cmp("e"));
    }

    #[test]
    fn sort_is_natural_and_stable() {
        let mut names = vec!["b2.mp4", "a10.mp4", "f7.mp4", "a1.mp4", "f007.mp4"];
        natural_sort(&mut names);
        assert_eq!(names, vec!["a1.mp4", "a10.mp4", "b2.mp4", "f7.mp4", "f007.mp4"]);
    }
}
