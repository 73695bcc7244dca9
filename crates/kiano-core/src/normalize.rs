//! Colloquial text normalization shared by the extractor, the resolver and the catalog.
//!
//! Chat users stretch words ("okeee mauuuu") and pad with whitespace. Every
//! string that takes part in matching goes through [`normalize`] so that input,
//! training phrases and synonyms are compared in the same space.

use regex::Regex;

/// Minimum run length of one repeated letter that gets collapsed.
const REPEAT_RUN: usize = 3;

/// Lowercase, collapse 3+ repeated letters to one, collapse whitespace, trim.
///
/// Digits are left alone so prices ("1000000") and phone numbers survive.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let collapsed = collapse_repeats(&lower);
    collapsed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Regex matching `phrase` as a whole word or phrase: neither neighbour may be a letter,
/// digit or underscore. Works for phrases that start or end with punctuation, where `\b`
/// would not.
pub(crate) fn phrase_regex(phrase: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)(?:^|[^\p{{L}}\p{{N}}_]){}(?:$|[^\p{{L}}\p{{N}}_])",
        regex::escape(phrase)
    ))
}

fn collapse_repeats(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }
        if c.is_alphabetic() && run >= REPEAT_RUN {
            out.push(c);
        } else {
            out.extend(std::iter::repeat(c).take(run));
        }
        i += run;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_stretched_letters() {
        assert_eq!(normalize("oke mauuuu"), "oke mau");
        assert_eq!(normalize("HALOOO kak"), "halo kak");
    }

    #[test]
    fn keeps_double_letters() {
        assert_eq!(normalize("Green Jonggol"), "green jonggol");
        assert_eq!(normalize("tanggal"), "tanggal");
    }

    #[test]
    fn keeps_digit_runs() {
        assert_eq!(normalize("dp 1000000"), "dp 1000000");
    }

    #[test]
    fn phrase_regex_respects_word_edges() {
        let re = phrase_regex("nlk").unwrap();
        assert!(re.is_match("info nlk 3"));
        assert!(re.is_match("nlk"));
        assert!(!re.is_match("unlknown"));
        let re = phrase_regex("kiano 3").unwrap();
        assert!(re.is_match("harga kiano 3?"));
        assert!(!re.is_match("harga kiano 30"));
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  harga \t kiano\n 3  "), "harga kiano 3");
        assert_eq!(normalize(""), "");
    }
}
