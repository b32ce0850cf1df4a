//! Strong's Greek dictionary (`strongsgreek.xml`)
//!
//!     <strongsdictionary>
//!       <entries>
//!         <entry strongs="00025">
//!           <strongs>25</strongs>
//!           <greek BETA="A)GAPA/W" unicode="ἀγαπάω" translit="agapáō"/>
//!           <pronunciation strongs="ag-ap-ah'-o"/>
//!           <strongs_derivation>perhaps from ἄγαν (much)...</strongs_derivation>
//!           <strongs_def>to love (in a social or moral sense)</strongs_def>
//!           <kjv_def>(be-)love(-ed)</kjv_def>
//!           <strongsref language="GREEK" strongs="5368"/>

use super::{collapse, Lexicon, LexiconEntry};
use crate::error::{ParseError, ParseResult};
use crate::strongs::{to_sid, Language};
use crate::xml::XmlNode;
use tracing::debug;

fn child_text(node: &XmlNode, name: &str) -> String {
    node.child(name).map(|c| collapse(&c.text())).unwrap_or_default()
}

/// A `strongsref` is either text or a `language`/`strongs` attribute pair
fn reference(node: &XmlNode) -> Option<String> {
    let text = collapse(&node.text());
    if !text.is_empty() {
        return Some(text);
    }
    let language = match node.attr("language")?.to_ascii_uppercase().as_str() {
        "GREEK" => Language::Greek,
        "HEBREW" => Language::Hebrew,
        _ => return None,
    };
    to_sid(node.attr("strongs")?, Some(language))
}

pub fn parse(root: &XmlNode) -> ParseResult<Lexicon> {
    let entries = root
        .child("entries")
        .ok_or_else(|| ParseError::InvalidStructure("no <entries> element".into()))?;

    let mut lexicon = Lexicon::new();
    for node in entries.elements().filter(|n| n.name == "entry") {
        let Some(id) = node
            .attr("strongs")
            .and_then(|raw| to_sid(raw, Some(Language::Greek)))
        else {
            debug!(attrs = ?node.attrs, "greek entry without a usable strongs number");
            continue;
        };
        let mut entry = LexiconEntry::new(id);
        if let Some(greek) = node.child("greek") {
            entry.lemma = greek.attr("unicode").unwrap_or_default().trim().to_string();
            entry.translit = greek.attr("translit").unwrap_or_default().trim().to_string();
            entry.beta = greek.attr("BETA").unwrap_or_default().trim().to_string();
        }
        entry.pron = match node.child("pronunciation") {
            Some(p) => match p.attr("strongs") {
                Some(attr) if !attr.trim().is_empty() => attr.trim().to_string(),
                _ => collapse(&p.text()),
            },
            None => String::new(),
        };
        entry.derivation = child_text(node, "strongs_derivation");
        entry.definition = child_text(node, "strongs_def");
        entry.kjv_def = child_text(node, "kjv_def");
        entry.refs = node
            .elements()
            .filter(|n| n.name == "strongsref")
            .filter_map(reference)
            .collect();
        lexicon.insert(entry);
    }
    Ok(lexicon)
}
