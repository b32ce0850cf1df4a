//! Book reference table
//!
//! Every dialect names books differently: USFM/USFX use three-letter codes, OSIS uses
//! abbreviations like `Prov`, Zefania numbers books 1–66, and authored CSVs use whatever a
//! human typed. All of them resolve through [`BOOKS`], which is the single source of truth for
//! codes and canonical order.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// One row of the book table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Book {
    /// Three-letter code (USFM style), e.g. `PRO`
    pub code: &'static str,
    /// OSIS abbreviation, e.g. `Prov`
    pub osis: &'static str,
    /// English display name
    pub name: &'static str,
    /// Canonical sort rank; 1–66 for the protestant canon, apocrypha after
    pub rank: u16,
    /// Additional spellings accepted from authored input
    pub aliases: &'static [&'static str],
}

impl Book {
    /// Zefania numbers the 66 canonical books by their order
    pub fn ordinal(&self) -> Option<u16> {
        (self.rank <= CANON_LEN).then_some(self.rank)
    }

    pub fn is_apocryphal(&self) -> bool {
        self.rank > CANON_LEN
    }
}

/// Number of books in the protestant canon
pub const CANON_LEN: u16 = 66;

macro_rules! book {
    ($code:literal, $osis:literal, $name:literal, $rank:literal) => {
        book!($code, $osis, $name, $rank, [])
    };
    ($code:literal, $osis:literal, $name:literal, $rank:literal, [$($alias:literal),*]) => {
        Book {
            code: $code,
            osis: $osis,
            name: $name,
            rank: $rank,
            aliases: &[$($alias),*],
        }
    };
}

pub static BOOKS: &[Book] = &[
    book!("GEN", "Gen", "Genesis", 1, ["gn"]),
    book!("EXO", "Exod", "Exodus", 2, ["ex", "exo"]),
    book!("LEV", "Lev", "Leviticus", 3, ["lv"]),
    book!("NUM", "Num", "Numbers", 4, ["nm"]),
    book!("DEU", "Deut", "Deuteronomy", 5, ["dt"]),
    book!("JOS", "Josh", "Joshua", 6),
    book!("JDG", "Judg", "Judges", 7, ["jdgs"]),
    book!("RUT", "Ruth", "Ruth", 8, ["rth"]),
    book!("1SA", "1Sam", "1 Samuel", 9, ["1 sa", "i samuel"]),
    book!("2SA", "2Sam", "2 Samuel", 10, ["2 sa", "ii samuel"]),
    book!("1KI", "1Kgs", "1 Kings", 11, ["1 ki", "1 kin", "i kings"]),
    book!("2KI", "2Kgs", "2 Kings", 12, ["2 ki", "2 kin", "ii kings"]),
    book!("1CH", "1Chr", "1 Chronicles", 13, ["1 chron", "i chronicles"]),
    book!("2CH", "2Chr", "2 Chronicles", 14, ["2 chron", "ii chronicles"]),
    book!("EZR", "Ezra", "Ezra", 15),
    book!("NEH", "Neh", "Nehemiah", 16),
    book!("EST", "Esth", "Esther", 17),
    book!("JOB", "Job", "Job", 18),
    book!("PSA", "Ps", "Psalms", 19, ["psalm", "pss", "psa"]),
    book!("PRO", "Prov", "Proverbs", 20, ["proverb", "prv"]),
    book!("ECC", "Eccl", "Ecclesiastes", 21, ["qoh", "qoheleth", "eccles"]),
    book!("SNG", "Song", "Song of Solomon", 22, ["song of songs", "canticles", "sos"]),
    book!("ISA", "Isa", "Isaiah", 23),
    book!("JER", "Jer", "Jeremiah", 24),
    book!("LAM", "Lam", "Lamentations", 25),
    book!("EZK", "Ezek", "Ezekiel", 26, ["eze"]),
    book!("DAN", "Dan", "Daniel", 27),
    book!("HOS", "Hos", "Hosea", 28),
    book!("JOL", "Joel", "Joel", 29, ["jl"]),
    book!("AMO", "Amos", "Amos", 30),
    book!("OBA", "Obad", "Obadiah", 31, ["ob"]),
    book!("JON", "Jonah", "Jonah", 32, ["jnh"]),
    book!("MIC", "Mic", "Micah", 33),
    book!("NAM", "Nah", "Nahum", 34, ["nah"]),
    book!("HAB", "Hab", "Habakkuk", 35),
    book!("ZEP", "Zeph", "Zephaniah", 36),
    book!("HAG", "Hag", "Haggai", 37),
    book!("ZEC", "Zech", "Zechariah", 38),
    book!("MAL", "Mal", "Malachi", 39),
    book!("MAT", "Matt", "Matthew", 40, ["mt"]),
    book!("MRK", "Mark", "Mark", 41, ["mk", "mar"]),
    book!("LUK", "Luke", "Luke", 42, ["lk"]),
    book!("JHN", "John", "John", 43, ["jn", "joh"]),
    book!("ACT", "Acts", "Acts", 44, ["acts of the apostles"]),
    book!("ROM", "Rom", "Romans", 45),
    book!("1CO", "1Cor", "1 Corinthians", 46, ["i corinthians"]),
    book!("2CO", "2Cor", "2 Corinthians", 47, ["ii corinthians"]),
    book!("GAL", "Gal", "Galatians", 48),
    book!("EPH", "Eph", "Ephesians", 49),
    book!("PHP", "Phil", "Philippians", 50, ["php"]),
    book!("COL", "Col", "Colossians", 51),
    book!("1TH", "1Thess", "1 Thessalonians", 52, ["i thessalonians"]),
    book!("2TH", "2Thess", "2 Thessalonians", 53, ["ii thessalonians"]),
    book!("1TI", "1Tim", "1 Timothy", 54, ["i timothy"]),
    book!("2TI", "2Tim", "2 Timothy", 55, ["ii timothy"]),
    book!("TIT", "Titus", "Titus", 56),
    book!("PHM", "Phlm", "Philemon", 57, ["philem"]),
    book!("HEB", "Heb", "Hebrews", 58),
    book!("JAS", "Jas", "James", 59, ["jm"]),
    book!("1PE", "1Pet", "1 Peter", 60, ["i peter"]),
    book!("2PE", "2Pet", "2 Peter", 61, ["ii peter"]),
    book!("1JN", "1John", "1 John", 62, ["i john"]),
    book!("2JN", "2John", "2 John", 63, ["ii john"]),
    book!("3JN", "3John", "3 John", 64, ["iii john"]),
    book!("JUD", "Jude", "Jude", 65),
    book!("REV", "Rev", "Revelation", 66, ["apocalypse", "revelations"]),
    // Apocrypha / deuterocanon
    book!("TOB", "Tob", "Tobit", 67),
    book!("JDT", "Jdt", "Judith", 68),
    book!("ESG", "AddEsth", "Esther (Greek)", 69),
    book!("WIS", "Wis", "Wisdom of Solomon", 70),
    book!("SIR", "Sir", "Sirach", 71, ["ecclesiasticus"]),
    book!("BAR", "Bar", "Baruch", 72),
    book!("LJE", "EpJer", "Letter of Jeremiah", 73),
    book!("S3Y", "PrAzar", "Song of the Three Young Men", 74),
    book!("SUS", "Sus", "Susanna", 75),
    book!("BEL", "Bel", "Bel and the Dragon", 76),
    book!("1MA", "1Macc", "1 Maccabees", 77),
    book!("2MA", "2Macc", "2 Maccabees", 78),
    book!("3MA", "3Macc", "3 Maccabees", 79),
    book!("4MA", "4Macc", "4 Maccabees", 80),
    book!("1ES", "1Esd", "1 Esdras", 81),
    book!("2ES", "2Esd", "2 Esdras", 82),
    book!("MAN", "PrMan", "Prayer of Manasseh", 83),
    book!("PS2", "AddPs", "Psalm 151", 84),
];

static BY_CODE: Lazy<HashMap<&'static str, &'static Book>> =
    Lazy::new(|| BOOKS.iter().map(|b| (b.code, b)).collect());

static BY_OSIS: Lazy<HashMap<&'static str, &'static Book>> =
    Lazy::new(|| BOOKS.iter().map(|b| (b.osis, b)).collect());

/// Lower-cased names, OSIS abbreviations, codes and aliases, both spaced and compacted
static BY_NAME: Lazy<HashMap<String, &'static Book>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for book in BOOKS {
        let spellings = [book.code, book.osis, book.name]
            .into_iter()
            .chain(book.aliases.iter().copied());
        for spelling in spellings {
            let spaced = collapse_lower(spelling);
            map.entry(compact(&spaced)).or_insert(book);
            map.entry(spaced).or_insert(book);
        }
    }
    map
});

fn collapse_lower(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn compact(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Exact lookup by three-letter code
pub fn by_code(code: &str) -> Option<&'static Book> {
    BY_CODE.get(code).copied()
}

/// Exact lookup by OSIS abbreviation (`Gen`, `1Sam`, `Prov`)
pub fn from_osis(abbr: &str) -> Option<&'static Book> {
    BY_OSIS.get(abbr).copied()
}

/// Zefania-style 1-based ordinal within the 66-book canon
pub fn from_ordinal(n: u32) -> Option<&'static Book> {
    if n == 0 || n > u32::from(CANON_LEN) {
        return None;
    }
    BOOKS.get(n as usize - 1)
}

/// Resolve a code as written in USFM/USFX sources.
///
/// Case-insensitive, and accepts the handful of alternate codes seen in the wild
/// (`NAH` for Nahum, `EZE` for Ezekiel, ...).
pub fn resolve_code(raw: &str) -> Option<&'static Book> {
    let upper = raw.trim().to_ascii_uppercase();
    if let Some(book) = by_code(&upper) {
        return Some(book);
    }
    if upper.len() != 3 {
        return None;
    }
    BY_NAME.get(&upper.to_ascii_lowercase()).copied()
}

/// Resolve any human spelling: name, alias, OSIS abbreviation or code.
///
/// Matching ignores case and repeated whitespace; a second attempt ignores punctuation and
/// spaces altogether (`"1 Sam."` → `1SA`).
pub fn lookup_name(raw: &str) -> Option<&'static Book> {
    let spaced = collapse_lower(raw);
    if spaced.is_empty() {
        return None;
    }
    BY_NAME
        .get(&spaced)
        .or_else(|| BY_NAME.get(&compact(&spaced)))
        .copied()
}

/// Canonical rank, or `None` for codes outside the table
pub fn canonical_rank(code: &str) -> Option<u16> {
    by_code(code).map(|b| b.rank)
}

/// Sort codes in canonical order; unknown codes go last, alphabetically
pub fn sort_codes_canonically<S: AsRef<str>>(codes: &mut [S]) {
    codes.sort_by(|a, b| {
        let ka = (canonical_rank(a.as_ref()).unwrap_or(u16::MAX), a.as_ref());
        let kb = (canonical_rank(b.as_ref()).unwrap_or(u16::MAX), b.as_ref());
        ka.cmp(&kb)
    });
}
