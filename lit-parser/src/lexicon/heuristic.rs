//! Best-effort lexicon shapes
//!
//!     `parse_dictionary` reads Zefania-style dictionaries: `entry`, `lex`, `item` or `record`
//!     elements with an id attribute and named field children.
//!
//!     `parse_generic` is the permissive fallback for anything else. Every element is a
//!     candidate: it becomes an entry when one of its id-ish attributes, or the text of an
//!     id-ish child, normalizes to a Strong's code. Fields are then harvested from its
//!     children by tag name, and when no definition turns up the element's own text is used.
//!     Expect false positives on unusual documents; that is the price of accepting them at all.

use super::{collapse, Lexicon, LexiconEntry};
use crate::strongs::{to_sid, Language};
use crate::xml::{XmlChild, XmlNode};

const GENERIC_ID_ATTRS: &[&str] = &[
    "id", "n", "n_str", "nStrong", "strong", "strongs", "index", "entry", "lemma",
];
const GENERIC_ID_CHILDREN: &[&str] = &["id", "strong", "strongs", "index", "n"];
const DICTIONARY_TAGS: &[&str] = &["entry", "lex", "item", "record"];
const DICTIONARY_ID_ATTRS: &[&str] = &["id", "n", "strong", "strongs"];

/// Where a harvested child value goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Lemma,
    Translit,
    Pron,
    Pos,
    Gloss,
    Definition,
    Derivation,
    Refs,
}

fn common_field(tag: &str) -> Option<Field> {
    match tag {
        "translit" | "transliteration" => Some(Field::Translit),
        "pron" | "pronunciation" => Some(Field::Pron),
        "pos" | "partofspeech" | "part_of_speech" => Some(Field::Pos),
        "gloss" | "shortdef" | "short_def" | "meaning" => Some(Field::Gloss),
        "refs" | "ref" | "see" | "seealso" => Some(Field::Refs),
        _ => None,
    }
}

fn generic_field(tag: &str) -> Option<Field> {
    if tag.contains("lemma") && !tag.contains("hebrew") && !tag.contains("greek") {
        return Some(Field::Lemma);
    }
    if let Some(field) = common_field(tag) {
        return Some(field);
    }
    if tag.contains("def") {
        Some(Field::Definition)
    } else if tag.contains("deriv") {
        Some(Field::Derivation)
    } else {
        None
    }
}

fn dictionary_field(tag: &str) -> Option<Field> {
    match tag {
        "w" | "lemma" | "headword" => Some(Field::Lemma),
        "def" | "definition" | "content" | "text" => Some(Field::Definition),
        _ if tag.contains("deriv") => Some(Field::Derivation),
        _ => common_field(tag),
    }
}

fn set_once(slot: &mut String, value: &str) {
    if slot.is_empty() {
        *slot = value.to_string();
    }
}

fn harvest(entry: &mut LexiconEntry, node: &XmlNode, classify: fn(&str) -> Option<Field>) {
    for child in node.elements() {
        let Some(field) = classify(&child.tag()) else {
            continue;
        };
        let value = collapse(&child.text());
        if value.is_empty() {
            continue;
        }
        match field {
            Field::Lemma => set_once(&mut entry.lemma, &value),
            Field::Translit => set_once(&mut entry.translit, &value),
            Field::Pron => set_once(&mut entry.pron, &value),
            Field::Pos => set_once(&mut entry.pos, &value),
            Field::Gloss => set_once(&mut entry.gloss, &value),
            Field::Definition => set_once(&mut entry.definition, &value),
            Field::Derivation => set_once(&mut entry.derivation, &value),
            Field::Refs => {
                if entry.refs.is_empty() {
                    entry.refs.push(value);
                }
            }
        }
    }
}

fn id_from_attrs(node: &XmlNode, keys: &[&str], hint: Option<Language>) -> Option<String> {
    keys.iter()
        .filter_map(|k| node.attr(k))
        .find_map(|v| to_sid(v, hint))
}

/// Zefania-style dictionary entries
pub fn parse_dictionary(root: &XmlNode, hint: Option<Language>) -> Lexicon {
    let mut lexicon = Lexicon::new();
    for node in root.descendants() {
        if !DICTIONARY_TAGS.contains(&node.tag().as_str()) {
            continue;
        }
        let Some(id) = id_from_attrs(node, DICTIONARY_ID_ATTRS, hint) else {
            continue;
        };
        let mut entry = LexiconEntry::new(id);
        harvest(&mut entry, node, dictionary_field);
        lexicon.insert(entry);
    }
    lexicon
}

fn is_id_child(node: &XmlNode) -> bool {
    GENERIC_ID_CHILDREN.contains(&node.tag().as_str())
}

/// The element's text without the text of its id-ish children
fn body_text(node: &XmlNode) -> String {
    let mut out = String::new();
    for child in &node.children {
        match child {
            XmlChild::Text(t) => out.push_str(t),
            XmlChild::Element(el) if !is_id_child(el) => out.push_str(&el.text()),
            XmlChild::Element(_) => {}
        }
    }
    collapse(&out)
}

/// Permissive scan of every element
pub fn parse_generic(root: &XmlNode, hint: Option<Language>) -> Lexicon {
    let mut lexicon = Lexicon::new();
    for node in root.descendants() {
        let id = id_from_attrs(node, GENERIC_ID_ATTRS, hint).or_else(|| {
            node.elements()
                .filter(|c| is_id_child(c))
                .find_map(|c| to_sid(&c.text(), hint))
        });
        let Some(id) = id else {
            continue;
        };
        let mut entry = LexiconEntry::new(id);
        harvest(&mut entry, node, generic_field);
        if entry.definition.is_empty() {
            entry.definition = body_text(node);
        }
        lexicon.insert(entry);
    }
    lexicon
}
