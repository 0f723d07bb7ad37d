//! Circuit-number pattern recognition over extracted page text.
//!
//! Two passes: first the whole document is scanned for joint splices, whose
//! fed circuits are suppressed everywhere; then each page is scanned for
//! standalone circuit occurrences to label.

use crate::extract::content::PageText;
use crate::model::{LocatedCircuit, Rect};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// A "J<digits>" joint marker followed on the next line by a bare number.
/// The second number is a circuit spliced into the joint.
static JOINT_FEED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"J\d+\s*\n(\d+)").unwrap());

/// Both circuit shapes in one combined scan: "<digits>/W<digits>," wire
/// references and "J+<digits>" joint outputs.
static CIRCUIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)/W\d+,|J\+(\d+)\b").unwrap());

/// Part-number token: digits followed by exactly one uppercase letter.
static PART_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+[A-Z]\b").unwrap());

/// Estimated glyph advance as a fraction of the font size. Box-edge
/// precision is enough for offset placement; exact glyph metrics are not.
const CHAR_WIDTH_EM: f64 = 0.5;

/// Scan every page, threading the document-wide suppression set from the
/// first pass into the second.
pub fn scan_pages(pages: &[PageText]) -> Vec<LocatedCircuit> {
    let suppressed = joint_fed_circuits(pages);
    pages
        .iter()
        .flat_map(|page| scan_page(page, &suppressed))
        .collect()
}

/// Pass 1: circuit numbers fed into joints, collected across the whole
/// document. A circuit flagged here is never labeled, on any page.
pub fn joint_fed_circuits(pages: &[PageText]) -> HashSet<String> {
    let mut suppressed = HashSet::new();
    for page in pages {
        let text = page.text();
        for caps in JOINT_FEED.captures_iter(&text) {
            suppressed.insert(caps[1].to_string());
        }
    }
    suppressed
}

/// Pass 2: circuit occurrences on one page. Every textual match yields its
/// own record; duplicates are not collapsed here.
pub fn scan_page(page: &PageText, suppressed: &HashSet<String>) -> Vec<LocatedCircuit> {
    let text = page.text();
    let part_numbers = collect_part_numbers(&text);

    let mut records = Vec::new();
    for caps in CIRCUIT.captures_iter(&text) {
        let circuit_number = match caps.get(1).or_else(|| caps.get(2)) {
            Some(group) => group.as_str(),
            None => continue,
        };
        let match_text = &caps[0];

        if suppressed.contains(circuit_number) {
            log::debug!("circuit {circuit_number} skipped (feeds a joint)");
            continue;
        }

        let Some(bounds) = locate_text(page, match_text) else {
            log::warn!(
                "page {}: '{}' matched in text but has no geometric occurrence, dropped",
                page.index,
                match_text
            );
            continue;
        };

        records.push(LocatedCircuit {
            page_index: page.index,
            circuit_number: circuit_number.to_string(),
            match_text: match_text.to_string(),
            is_left_half: bounds.horizontal_center() < page.width / 2.0,
            bounds,
            page_rotation: page.rotation,
            page_width: page.width,
            page_height: page.height,
            part_numbers: part_numbers.clone(),
            serial: None,
        });
    }
    records
}

/// Part-number tokens in first-seen order, deduplicated.
fn collect_part_numbers(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for found in PART_NUMBER.find_iter(text) {
        if !tokens.iter().any(|t| t == found.as_str()) {
            tokens.push(found.as_str().to_string());
        }
    }
    tokens
}

/// Bounding box of the first occurrence of `needle` within the page's runs.
pub fn locate_text(page: &PageText, needle: &str) -> Option<Rect> {
    for run in &page.runs {
        if let Some(byte_idx) = run.text.find(needle) {
            let advance = run.font_size * CHAR_WIDTH_EM;
            let x0 = run.x + run.text[..byte_idx].chars().count() as f64 * advance;
            let x1 = x0 + needle.chars().count() as f64 * advance;
            return Some(Rect::new(x0, run.y, x1, run.y + run.font_size));
        }
    }
    None
}
