//! Identifiers and display strings derived from a verse span
//!
//!     entryId   pro-021-011-012
//!     ref       Prov 21:11-12
//!     osis      Prov.21.11-Prov.21.12
//!     pairId    pro-021-011-012__x-scoffer-is-punished__y-simple-becomes-wise__9898fc49
//!
//! The pair hash covers the span, the PV list and both sides' roots. Keys only appear as
//! slugs, and synonyms never take part, so editing synonyms keeps every pair id stable.

use crate::normalize::RefParts;
use lit_parser::books;
use once_cell::sync::Lazy;
use regex::Regex;
use sha1::{Digest, Sha1};
use std::collections::HashSet;

static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

pub fn entry_id(parts: &RefParts) -> String {
    format!(
        "{}-{:03}-{:03}-{:03}",
        parts.book.to_lowercase(),
        parts.chapter,
        parts.start,
        parts.end
    )
}

/// OSIS abbreviation of a code; codes outside the book table stand for themselves
fn short_name(code: &str) -> &str {
    books::by_code(code).map(|b| b.osis).unwrap_or(code)
}

pub fn ref_string(parts: &RefParts) -> String {
    let name = short_name(&parts.book);
    if parts.is_single() {
        format!("{name} {}:{}", parts.chapter, parts.start)
    } else {
        format!("{name} {}:{}-{}", parts.chapter, parts.start, parts.end)
    }
}

pub fn osis_string(parts: &RefParts) -> String {
    let name = short_name(&parts.book);
    let start = format!("{name}.{}.{}", parts.chapter, parts.start);
    if parts.is_single() {
        start
    } else {
        format!("{start}-{name}.{}.{}", parts.chapter, parts.end)
    }
}

pub fn slug(s: &str) -> String {
    let lower = s.trim().to_lowercase();
    NON_SLUG.replace_all(&lower, "-").trim_matches('-').to_string()
}

fn join_roots(roots: &[String]) -> String {
    roots
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect::<Vec<_>>()
        .join(" || ")
}

/// `CODE|ch|start|end|pv:a,b|x:r1 || r2|y:r1 || r2`
pub fn hash_payload(parts: &RefParts, pv: &[u32], x_roots: &[String], y_roots: &[String]) -> String {
    let pv = pv.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
    format!(
        "{}|{}|{}|{}|pv:{}|x:{}|y:{}",
        parts.book,
        parts.chapter,
        parts.start,
        parts.end,
        pv,
        join_roots(x_roots),
        join_roots(y_roots)
    )
}

pub fn short_hash(payload: &str) -> String {
    let digest = Sha1::digest(payload.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(8);
    hex
}

pub fn make_pair_id(
    parts: &RefParts,
    pv: &[u32],
    x_key: &str,
    y_key: &str,
    x_roots: &[String],
    y_roots: &[String],
) -> String {
    format!(
        "{}__x-{}__y-{}__{}",
        entry_id(parts),
        slug(x_key),
        slug(y_key),
        short_hash(&hash_payload(parts, pv, x_roots, y_roots))
    )
}

/// Hands out unique ids; repeats get `~1`, `~2`, ... in the order they are seen
#[derive(Debug, Default)]
pub struct IdAllocator {
    seen: HashSet<String>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, base: String) -> String {
        if self.seen.insert(base.clone()) {
            return base;
        }
        let mut n = 1usize;
        loop {
            let candidate = format!("{base}~{n}");
            if self.seen.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
