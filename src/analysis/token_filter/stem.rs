//! Stemming filter for reducing words to their root forms.

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::TokenFilter;
use crate::error::Result;

/// Trait for stemming algorithms.
pub trait Stemmer: Send + Sync {
    /// Stem a word to its root form.
    fn stem(&self, word: &str) -> String;

    /// Get the name of this stemmer.
    fn name(&self) -> &'static str;
}

/// Porter's 1980 suffix-stripping algorithm for English.
///
/// Stems are index terms, not words: `day -> dai`, `daily -> daili`. That
/// is invisible to users as long as queries run through the same filter.
/// Input that is not lowercase ASCII passes through unchanged; the filter
/// is meant to run after [`super::LowercaseFilter`].
#[derive(Debug, Clone, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    /// Create a new Porter stemmer.
    pub fn new() -> Self {
        PorterStemmer
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        if word.len() <= 2 || !word.bytes().all(|b| b.is_ascii_lowercase()) {
            return word.to_string();
        }
        let mut w = Word(word.as_bytes().to_vec());
        w.strip_plural();
        w.strip_ed_ing();
        w.soften_final_y();
        w.apply_rules(STEP2_RULES);
        w.apply_rules(STEP3_RULES);
        w.strip_long_suffix();
        w.tidy_ending();
        String::from_utf8_lossy(&w.0).into_owned()
    }

    fn name(&self) -> &'static str {
        "porter"
    }
}

/// Step 1a: plural forms. The `ss -> ss` identity shields words ending in
/// a double s from the bare `s` rule below it.
const STEP1A_RULES: &[(&str, &str)] = &[("sses", "ss"), ("ies", "i"), ("ss", "ss"), ("s", "")];

/// Step 2: double suffixes, applied when the stem has measure > 0. Longer
/// suffixes precede their own tails (`ational` before `tional`, `ization`
/// before `ation`) because the first match decides the step.
const STEP2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
];

/// Step 3: `-ic-`, `-ful`, `-ness`; same measure > 0 condition as step 2.
const STEP3_RULES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

/// Step 4: suffixes dropped outright when the stem has measure > 1.
/// `ion` additionally requires the stem to end in `s` or `t`.
const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

/// A lowercase ASCII word being stemmed in place.
struct Word(Vec<u8>);

impl Word {
    fn len(&self) -> usize {
        self.0.len()
    }

    /// Vowel in the Porter sense: a/e/i/o/u always, y when it follows a
    /// consonant.
    fn vowel_at(&self, i: usize) -> bool {
        match self.0[i] {
            b'a' | b'e' | b'i' | b'o' | b'u' => true,
            b'y' => i > 0 && !self.vowel_at(i - 1),
            _ => false,
        }
    }

    /// The measure of the first `end` bytes: the number of vowel-run to
    /// consonant transitions, i.e. the `m` in `[C](VC)^m[V]`.
    fn measure_of(&self, end: usize) -> usize {
        let mut m = 0;
        let mut in_vowel_run = false;
        for i in 0..end {
            let vowel = self.vowel_at(i);
            if in_vowel_run && !vowel {
                m += 1;
            }
            in_vowel_run = vowel;
        }
        m
    }

    fn has_vowel(&self, end: usize) -> bool {
        (0..end).any(|i| self.vowel_at(i))
    }

    fn ends(&self, suffix: &str) -> bool {
        self.0.ends_with(suffix.as_bytes())
    }

    /// Length of the word with `suffix` removed. Only valid after `ends`.
    fn stem_len(&self, suffix: &str) -> usize {
        self.0.len() - suffix.len()
    }

    fn cut(&mut self, n: usize) {
        let len = self.0.len();
        self.0.truncate(len - n);
    }

    fn set_suffix(&mut self, suffix_len: usize, replacement: &str) {
        self.cut(suffix_len);
        self.0.extend_from_slice(replacement.as_bytes());
    }

    fn ends_double_consonant(&self) -> bool {
        let n = self.0.len();
        n >= 2 && self.0[n - 1] == self.0[n - 2] && !self.vowel_at(n - 1)
    }

    /// Consonant-vowel-consonant ending of the first `end` bytes, where the
    /// final consonant is not w, x, or y.
    fn ends_cvc(&self, end: usize) -> bool {
        end >= 3
            && !self.vowel_at(end - 3)
            && self.vowel_at(end - 2)
            && !self.vowel_at(end - 1)
            && !matches!(self.0[end - 1], b'w' | b'x' | b'y')
    }

    fn strip_plural(&mut self) {
        for (suffix, replacement) in STEP1A_RULES {
            if self.ends(suffix) {
                self.set_suffix(suffix.len(), replacement);
                return;
            }
        }
    }

    /// Step 1b: `-eed`, `-ed`, `-ing`, with the fix-up pass that restores
    /// an `e` (conflat -> conflate) or undoubles a consonant (hopp -> hop)
    /// after a removal.
    fn strip_ed_ing(&mut self) {
        if self.ends("eed") {
            if self.measure_of(self.stem_len("eed")) > 0 {
                self.cut(1);
            }
            return;
        }

        if self.ends("ed") && self.has_vowel(self.stem_len("ed")) {
            self.cut(2);
        } else if self.ends("ing") && self.has_vowel(self.stem_len("ing")) {
            self.cut(3);
        } else {
            return;
        }

        if self.ends("at") || self.ends("bl") || self.ends("iz") {
            self.0.push(b'e');
        } else if self.ends_double_consonant() && !matches!(self.0[self.len() - 1], b'l' | b's' | b'z')
        {
            self.cut(1);
        } else if self.measure_of(self.len()) == 1 && self.ends_cvc(self.len()) {
            self.0.push(b'e');
        }
    }

    /// Step 1c: terminal y to i when the stem contains a vowel.
    fn soften_final_y(&mut self) {
        if self.ends("y") && self.has_vowel(self.len() - 1) {
            let n = self.len();
            self.0[n - 1] = b'i';
        }
    }

    /// Steps 2 and 3: the first matching suffix decides the step; the
    /// replacement happens only when the stem's measure is positive.
    fn apply_rules(&mut self, rules: &[(&str, &str)]) {
        for (suffix, replacement) in rules {
            if self.ends(suffix) {
                if self.measure_of(self.stem_len(suffix)) > 0 {
                    self.set_suffix(suffix.len(), replacement);
                }
                return;
            }
        }
    }

    /// Step 4: remove a residual suffix when the remaining stem has
    /// measure > 1.
    fn strip_long_suffix(&mut self) {
        for suffix in STEP4_SUFFIXES {
            if self.ends(suffix) {
                let stem = self.stem_len(suffix);
                if self.measure_of(stem) > 1 {
                    let ion_ok =
                        *suffix != "ion" || (stem > 0 && matches!(self.0[stem - 1], b's' | b't'));
                    if ion_ok {
                        self.0.truncate(stem);
                    }
                }
                return;
            }
        }
    }

    /// Step 5: drop a final `e` on long stems and undouble a final `ll`.
    fn tidy_ending(&mut self) {
        if self.ends("e") {
            let stem = self.len() - 1;
            let m = self.measure_of(stem);
            if m > 1 || (m == 1 && !self.ends_cvc(stem)) {
                self.cut(1);
            }
        }
        if self.ends("ll") && self.measure_of(self.len()) > 1 {
            self.cut(1);
        }
    }
}

/// Filter that applies stemming to tokens.
pub struct StemFilter {
    stemmer: Box<dyn Stemmer>,
}

impl std::fmt::Debug for StemFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StemFilter")
            .field("stemmer", &self.stemmer.name())
            .finish()
    }
}

impl StemFilter {
    /// Create a new stem filter with the Porter stemmer.
    pub fn new() -> Self {
        StemFilter {
            stemmer: Box::new(PorterStemmer::new()),
        }
    }

    /// Create a stem filter with a custom stemmer.
    pub fn with_stemmer(stemmer: Box<dyn Stemmer>) -> Self {
        StemFilter { stemmer }
    }
}

impl Default for StemFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenFilter for StemFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|token| {
                if token.is_stopped() {
                    token
                } else {
                    let stemmed = self.stemmer.stem(&token.text);
                    token.with_text(stemmed)
                }
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_porter_stemmer() {
        let stemmer = PorterStemmer::new();

        assert_eq!(stemmer.stem("running"), "run");
        assert_eq!(stemmer.stem("flies"), "fli");
        assert_eq!(stemmer.stem("agreed"), "agre");
        assert_eq!(stemmer.stem("disabled"), "disabl");
        assert_eq!(stemmer.stem("measuring"), "measur");
        assert_eq!(stemmer.stem("itemization"), "item");
        assert_eq!(stemmer.stem("sensational"), "sensat");
        assert_eq!(stemmer.stem("traditional"), "tradit");
        assert_eq!(stemmer.stem("caresses"), "caress");
        assert_eq!(stemmer.stem("hopping"), "hop");
        assert_eq!(stemmer.stem("conflated"), "conflat");
    }

    #[test]
    fn test_terminal_y_becomes_i() {
        let stemmer = PorterStemmer::new();

        assert_eq!(stemmer.stem("day"), "dai");
        assert_eq!(stemmer.stem("stay"), "stai");
        // No vowel before the y: unchanged.
        assert_eq!(stemmer.stem("sky"), "sky");
    }

    #[test]
    fn test_non_lowercase_input_passes_through() {
        let stemmer = PorterStemmer::new();

        assert_eq!(stemmer.stem("Running"), "Running");
        assert_eq!(stemmer.stem("it's"), "it's");
        assert_eq!(stemmer.stem("no"), "no");
    }

    #[test]
    fn test_measure() {
        fn measure(word: &str) -> usize {
            let w = Word(word.as_bytes().to_vec());
            w.measure_of(word.len())
        }

        assert_eq!(measure("tree"), 0);
        assert_eq!(measure("trees"), 1);
        assert_eq!(measure("trouble"), 1);
        assert_eq!(measure("troubles"), 2);
    }

    #[test]
    fn test_stem_filter() {
        let filter = StemFilter::new();
        let tokens = vec![
            Token::new("running", 0),
            Token::new("flies", 1),
            Token::new("test", 2).stop(),
        ];
        let token_stream = Box::new(tokens.into_iter());

        let result: Vec<Token> = filter.filter(token_stream).unwrap().collect();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].text, "run");
        assert_eq!(result[1].text, "fli");
        assert_eq!(result[2].text, "test"); // Stopped tokens are not processed
        assert!(result[2].is_stopped());
    }
}
