//! Text normalization applied before rule matching and model scoring

use regex::Regex;

static INVISIBLE_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"[\u{00AD}\u{200B}-\u{200D}\u{2060}\u{FEFF}]").unwrap()
});

static WHITESPACE_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Lowercases, trims and optionally folds lookalike characters to ASCII
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    fold_homoglyphs: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Normalizer {
    #[must_use]
    pub const fn new(fold_homoglyphs: bool) -> Self {
        Self { fold_homoglyphs }
    }

    #[must_use]
    pub const fn folds_homoglyphs(&self) -> bool {
        self.fold_homoglyphs
    }

    /// Normalize text for matching.
    ///
    /// Removes zero-width characters, collapses whitespace runs to a single
    /// space, trims, and lowercases without locale rules. With folding
    /// enabled, Cyrillic/Greek lookalikes and fullwidth forms become their
    /// ASCII equivalents, so `pаypаl` (Cyrillic `а`) reads as `paypal`.
    ///
    /// The output is a fixed point: normalizing it again returns it unchanged.
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let visible = INVISIBLE_REGEX.replace_all(text, "");
        let collapsed = WHITESPACE_REGEX.replace_all(&visible, " ");

        let mut out = String::with_capacity(collapsed.len());
        for c in collapsed.trim().chars() {
            if self.fold_homoglyphs
                && let Some(ascii) = fold_char(c)
            {
                out.push(ascii.to_ascii_lowercase());
                continue;
            }
            for lower in c.to_lowercase() {
                match fold_char(lower) {
                    Some(ascii) if self.fold_homoglyphs => out.push(ascii.to_ascii_lowercase()),
                    _ => out.push(lower),
                }
            }
        }
        out
    }
}

/// Normalize with the default settings (homoglyph folding enabled)
#[must_use]
pub fn normalize(text: &str) -> String {
    Normalizer::default().normalize(text)
}

fn fold_char(c: char) -> Option<char> {
    cyrillic_to_latin(c)
        .or_else(|| greek_to_latin(c))
        .or_else(|| fullwidth_to_ascii(c))
}

fn cyrillic_to_latin(c: char) -> Option<char> {
    match c {
        '\u{0430}' | '\u{0410}' => Some('a'), // а А
        '\u{0412}' => Some('b'),              // В
        '\u{0441}' | '\u{0421}' => Some('c'), // с С
        '\u{0435}' | '\u{0415}' => Some('e'), // е Е
        '\u{041D}' => Some('h'),              // Н
        '\u{0456}' | '\u{0406}' => Some('i'), // і І
        '\u{0458}' | '\u{0408}' => Some('j'), // ј Ј
        '\u{041A}' => Some('k'),              // К
        '\u{041C}' => Some('m'),              // М
        '\u{043E}' | '\u{041E}' => Some('o'), // о О
        '\u{0440}' | '\u{0420}' => Some('p'), // р Р
        '\u{0455}' | '\u{0405}' => Some('s'), // ѕ Ѕ
        '\u{0422}' => Some('t'),              // Т
        '\u{0445}' | '\u{0425}' => Some('x'), // х Х
        '\u{0443}' | '\u{04AE}' => Some('y'), // у Ү
        _ => None,
    }
}

fn greek_to_latin(c: char) -> Option<char> {
    match c {
        '\u{0391}' | '\u{03B1}' => Some('a'), // Α α
        '\u{0392}' => Some('b'),              // Β
        '\u{0395}' => Some('e'),              // Ε
        '\u{0397}' => Some('h'),              // Η
        '\u{0399}' | '\u{03B9}' => Some('i'), // Ι ι
        '\u{039A}' => Some('k'),              // Κ
        '\u{039C}' => Some('m'),              // Μ
        '\u{039D}' => Some('n'),              // Ν
        '\u{039F}' | '\u{03BF}' => Some('o'), // Ο ο
        '\u{03A1}' | '\u{03C1}' => Some('p'), // Ρ ρ
        '\u{03A4}' => Some('t'),              // Τ
        '\u{03A7}' => Some('x'),              // Χ
        '\u{03A5}' => Some('y'),              // Υ
        '\u{0396}' => Some('z'),              // Ζ
        _ => None,
    }
}

fn fullwidth_to_ascii(c: char) -> Option<char> {
    let cp = u32::from(c);
    match cp {
        0xFF21..=0xFF3A | 0xFF41..=0xFF5A | 0xFF10..=0xFF19 => char::from_u32(cp - 0xFEE0),
        _ => None,
    }
}
