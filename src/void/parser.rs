//! Reading artifacts out of generated text.
//!
//! A record is a run of marker lines:
//!
//! ````text
//! NAME: Lantern of Unfinished Hours
//! CATEGORY: mystical
//! RARITY: rare
//! ASCII_ART:
//! ```ascii
//!   ╔═══╗
//!   ║ ◉ ║
//!   ╚═══╝
//! ```
//! DESCRIPTION:
//! Everything from here to the end of the record.
//! ````
//!
//! Batches separate records with a line of dashes ([`BATCH_DIVIDER`]). Dash lines inside a
//! fenced art block are art, not dividers. A record missing any of the five fields is dropped
//! whole; nothing in here fails.

use crate::logutil::escape_log;
use log::{debug, warn};

pub const BATCH_DIVIDER: &str = "----------";

const NAME_MARKER: &str = "NAME:";
const CATEGORY_MARKER: &str = "CATEGORY:";
const RARITY_MARKER: &str = "RARITY:";
const ART_MARKER: &str = "ASCII_ART:";
const DESCRIPTION_MARKER: &str = "DESCRIPTION:";
const FENCE: &str = "```";

/// One complete record. Category and rarity are the raw labels the generator wrote; mapping
/// them onto the closed taxonomies happens when metadata is filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArtifact {
    pub name: String,
    pub category_label: String,
    pub rarity_label: String,
    pub ascii_art: String,
    pub description: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Header,
    AwaitFence,
    Art,
    Description,
}

/// Parse a single record. `None` if any field is missing or empty.
pub fn parse_record(text: &str) -> Option<ParsedArtifact> {
    match scan_record(text) {
        Ok(parsed) => Some(parsed),
        Err(missing) => {
            warn!("dropping generated record without {}", missing);
            debug!("dropped record: {}", escape_log(text));
            None
        }
    }
}

/// Parse every complete record in a batch reply, in order.
pub fn parse_batch(text: &str) -> Vec<ParsedArtifact> {
    let sections = split_sections(text);
    let total = sections.len();
    let parsed: Vec<ParsedArtifact> = sections.into_iter().filter_map(parse_record).collect();
    debug!("parsed {}/{} generated record(s)", parsed.len(), total);
    parsed
}

fn is_divider(trimmed: &str) -> bool {
    trimmed.len() >= BATCH_DIVIDER.len() && trimmed.bytes().all(|b| b == b'-')
}

/// Split on divider lines outside fenced blocks. Blank sections are discarded.
fn split_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut in_fence = false;
    let mut start = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with(FENCE) {
            in_fence = !in_fence;
        } else if !in_fence && is_divider(trimmed) {
            sections.push(&text[start..offset]);
            start = offset + line.len();
        }
        offset += line.len();
    }
    sections.push(&text[start..]);

    sections.retain(|s| !s.trim().is_empty());
    sections
}

fn marker_value<'a>(trimmed: &'a str, marker: &str) -> Option<&'a str> {
    trimmed.strip_prefix(marker).map(str::trim)
}

fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value.to_string());
    }
}

fn scan_record(text: &str) -> Result<ParsedArtifact, &'static str> {
    let mut name = None;
    let mut category = None;
    let mut rarity = None;
    let mut art: Option<String> = None;
    let mut art_lines: Vec<&str> = Vec::new();
    let mut description: Vec<&str> = Vec::new();
    let mut saw_description = false;
    let mut state = State::Header;

    for line in text.lines() {
        let trimmed = line.trim();
        match state {
            State::Description => {
                description.push(line);
                continue;
            }
            State::Art => {
                if trimmed == FENCE {
                    let block = art_lines.join("\n");
                    if art.is_none() && !block.trim().is_empty() {
                        art = Some(block.trim_matches('\n').trim_end().to_string());
                    }
                    state = State::Header;
                } else {
                    art_lines.push(line);
                }
                continue;
            }
            State::AwaitFence => {
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.starts_with(FENCE) {
                    art_lines.clear();
                    state = State::Art;
                    continue;
                }
                // Marker without a fenced block; treat this line as a header line
                state = State::Header;
            }
            State::Header => {}
        }

        if let Some(value) = marker_value(trimmed, NAME_MARKER) {
            set_once(&mut name, value);
        } else if let Some(value) = marker_value(trimmed, CATEGORY_MARKER) {
            set_once(&mut category, value);
        } else if let Some(value) = marker_value(trimmed, RARITY_MARKER) {
            set_once(&mut rarity, value);
        } else if trimmed.starts_with(ART_MARKER) {
            state = State::AwaitFence;
        } else if let Some(rest) = marker_value(trimmed, DESCRIPTION_MARKER) {
            saw_description = true;
            if !rest.is_empty() {
                description.push(rest);
            }
            state = State::Description;
        }
    }

    let description = description.join("\n").trim().to_string();

    Ok(ParsedArtifact {
        name: name.ok_or("NAME")?,
        category_label: category.ok_or("CATEGORY")?,
        rarity_label: rarity.ok_or("RARITY")?,
        ascii_art: art.ok_or("ASCII_ART")?,
        description: if saw_description && !description.is_empty() {
            description
        } else {
            return Err("DESCRIPTION");
        },
    })
}
