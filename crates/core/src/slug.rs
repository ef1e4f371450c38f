use std::collections::HashMap;

/// Extracts a `{#custom-id}` suffix from heading text.
///
/// If the text ends with `{#some-id}` (where the id contains ASCII alphanumerics,
/// hyphens, or underscores), returns the trimmed text without the suffix and `Some(id)`.
/// Otherwise returns the original text and `None`.
///
/// ```
/// use mdpress_core::slug::extract_custom_id;
///
/// assert_eq!(extract_custom_id("Setup {#setup}"), ("Setup", Some("setup")));
/// assert_eq!(extract_custom_id("Plain"), ("Plain", None));
/// ```
pub fn extract_custom_id(text: &str) -> (&str, Option<&str>) {
    let trimmed = text.trim_end();
    let Some(inner) = trimmed.strip_suffix('}') else {
        return (text, None);
    };
    let Some(open) = inner.rfind("{#") else {
        return (text, None);
    };

    let id = &inner[open + 2..];
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        (inner[..open].trim_end(), Some(id))
    } else {
        (text, None)
    }
}

/// Github-slugger compatible slug generator.
///
/// One slugger is used per document so repeated headings get `-1`, `-2`
/// suffixes in document order.
#[derive(Debug, Default, Clone)]
pub struct Slugger {
    counts: HashMap<String, usize>,
}

impl Slugger {
    /// Creates a new slugger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates the next unique slug for the given heading text.
    pub fn next_slug(&mut self, text: &str) -> String {
        slugify(text, &mut self.counts)
    }

    /// Reserves a slug so future auto-generated slugs won't collide with it.
    pub fn reserve(&mut self, slug: &str) {
        self.counts.entry(slug.to_string()).or_insert(0);
    }

    /// Forgets every slug seen so far.
    pub fn reset(&mut self) {
        self.counts.clear();
    }
}

/// Returns true for Unicode combining marks (Mn, Mc, Me) in the scripts we
/// care about. They are kept in slugs so Devanagari, Arabic, Thai, etc. survive.
fn is_combining_mark(ch: char) -> bool {
    use std::ops::RangeInclusive;

    const RANGES: &[RangeInclusive<u32>] = &[
        0x0300..=0x036F, // combining diacritical marks
        0x0591..=0x05BD, // hebrew
        0x05BF..=0x05BF,
        0x05C1..=0x05C2,
        0x05C4..=0x05C5,
        0x05C7..=0x05C7,
        0x0610..=0x061A, // arabic
        0x064B..=0x065F,
        0x0670..=0x0670,
        0x0900..=0x0903, // devanagari
        0x093A..=0x094F,
        0x0951..=0x0957,
        0x0962..=0x0963,
        0x0980..=0x0983, // bengali
        0x09BC..=0x09CD,
        0x0A01..=0x0A03, // gurmukhi
        0x0A3C..=0x0A4D,
        0x0A81..=0x0A83, // gujarati
        0x0ABC..=0x0ACD,
        0x0B01..=0x0B03, // tamil
        0x0BBE..=0x0BCD,
        0x0E31..=0x0E3A, // thai
        0x0E47..=0x0E4E,
        0x1AB0..=0x1AFF, // diacritical marks extended
        0x1DC0..=0x1DFF, // diacritical marks supplement
        0x302A..=0x302F, // hangul tone marks
        0x3099..=0x309A, // kana voicing marks
        0xFE20..=0xFE2F, // half marks
    ];

    let cp = ch as u32;
    RANGES.iter().any(|r| r.contains(&cp))
}

/// Slugify the given text, updating counts to ensure uniqueness.
///
/// Same algorithm as github-slugger: lowercase, drop everything that is not
/// alphanumeric, `-`, `_` or a space, then turn each space into a hyphen.
/// Hyphens are neither collapsed nor trimmed.
pub fn slugify(text: &str, counts: &mut HashMap<String, usize>) -> String {
    let mut slug = String::with_capacity(text.len());

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            slug.push(ch.to_ascii_lowercase());
        } else if !ch.is_ascii() && (ch.is_alphanumeric() || is_combining_mark(ch)) {
            slug.extend(ch.to_lowercase());
        } else if ch == ' ' {
            slug.push('-');
        }
    }

    if slug.is_empty() {
        slug.push_str("heading");
    }

    // `counts` maps every slug handed out to the number of suffixed variants
    // generated from it so far.
    let mut unique = slug.clone();
    while counts.contains_key(&unique) {
        let occurrences = counts.entry(slug.clone()).or_insert(0);
        *occurrences += 1;
        unique = format!("{}-{}", slug, occurrences);
    }
    counts.insert(unique.clone(), 0);

    unique
}
