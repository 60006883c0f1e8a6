pub trait WordCounter: Send + Sync {
    fn count(&self, text: &str) -> u32;
}

/// Essay-style count: each CJK ideograph, kana or hangul syllable is one word,
/// every other whitespace-separated run is one word.
#[derive(Debug, Default, Clone, Copy)]
pub struct EssayWordCounter;

impl WordCounter for EssayWordCounter {
    fn count(&self, text: &str) -> u32 {
        let mut words = 0u32;
        let mut in_run = false;
        for c in text.chars() {
            if is_cjk(c) {
                words += 1;
                in_run = false;
            } else if c.is_whitespace() || is_separator_punctuation(c) {
                in_run = false;
            } else if !in_run {
                words += 1;
                in_run = true;
            }
        }
        words
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30FF}'     // hiragana, katakana
        | '\u{3400}'..='\u{4DBF}'   // extension A
        | '\u{4E00}'..='\u{9FFF}'   // unified ideographs
        | '\u{AC00}'..='\u{D7AF}'   // hangul syllables
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2FA1F}'
    )
}

fn is_separator_punctuation(c: char) -> bool {
    matches!(c, '\u{3000}'..='\u{303F}' | '\u{FF00}'..='\u{FF0F}' | '\u{FF1A}'..='\u{FF20}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_words_split_on_whitespace() {
        assert_eq!(EssayWordCounter.count("  My  first draft.\nDone "), 4);
    }

    #[test]
    fn ideographs_count_individually() {
        assert_eq!(EssayWordCounter.count("个人陈述"), 4);
    }

    #[test]
    fn mixed_text_and_fullwidth_punctuation() {
        assert_eq!(EssayWordCounter.count("我的 essay，很好。"), 5);
    }

    #[test]
    fn empty_text_has_no_words() {
        assert_eq!(EssayWordCounter.count(""), 0);
    }
}
