//! Open Scriptures Hebrew lexicon (`HebrewStrong.xml`)
//!
//!     <lexicon xmlns="http://openscriptures.github.com/morphhb/namespace">
//!       <entry id="H1">
//!         <w pos="n-m" pron="awb" xlit="ʼâb" xml:lang="heb">אָב</w>
//!         <source>a primitive word;</source>
//!         <meaning><def>father</def>, in a literal and immediate, or figurative sense</meaning>
//!         <usage>chief, (fore-)father(-less), × patrimony, principal.</usage>
//!
//!     The namespace is dropped by the XML layer, so names match on their local part. When
//!     `meaning` is empty the definition falls back to `usage`.

use super::{collapse, Lexicon, LexiconEntry};
use crate::error::{ParseError, ParseResult};
use crate::strongs::{to_sid, Language};
use crate::xml::XmlNode;
use tracing::debug;

pub fn parse(root: &XmlNode) -> ParseResult<Lexicon> {
    let mut lexicon = Lexicon::new();
    let mut seen = 0usize;
    for node in root.elements().filter(|n| n.name == "entry") {
        seen += 1;
        let Some(id) = node
            .attr("id")
            .and_then(|raw| to_sid(raw, Some(Language::Hebrew)))
        else {
            debug!(attrs = ?node.attrs, "hebrew entry without a usable id");
            continue;
        };
        let mut entry = LexiconEntry::new(id);
        if let Some(w) = node.child("w") {
            entry.lemma = collapse(&w.text());
            entry.translit = w.attr("xlit").unwrap_or_default().trim().to_string();
            entry.pron = w.attr("pron").unwrap_or_default().trim().to_string();
            entry.pos = w.attr("pos").unwrap_or_default().trim().to_string();
        }
        let text_of = |name: &str| node.child(name).map(|n| collapse(&n.text())).unwrap_or_default();
        let meaning = text_of("meaning");
        let usage = text_of("usage");
        entry.derivation = text_of("source");
        entry.definition = if meaning.is_empty() {
            usage.clone()
        } else {
            meaning
        };
        entry.kjv_def = usage;
        lexicon.insert(entry);
    }
    if seen == 0 {
        return Err(ParseError::InvalidStructure("no <entry> elements".into()));
    }
    Ok(lexicon)
}
