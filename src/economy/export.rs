//! Plain-text artifact export documents.

use super::types::{capitalize, Artifact};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const BANNER_WIDTH: usize = 60;

/// Everything except `[A-Za-z0-9_-]` gets percent-encoded in export file names.
const FILE_NAME_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'-');

/// `"The Brass / Oracle"` + `"1a2b3c4d"` -> `"the_brass___oracle_1a2b3c4d.txt"`.
pub fn export_file_name(artifact: &Artifact) -> String {
    let name = if artifact.name.trim().is_empty() {
        "Unknown Artifact"
    } else {
        artifact.name.as_str()
    };
    let flattened = name.replace([' ', '/'], "_").to_lowercase();
    let safe = utf8_percent_encode(&flattened, FILE_NAME_ESCAPES).to_string();
    format!("{}_{}.txt", safe, artifact.id)
}

pub fn render_document(artifact: &Artifact) -> String {
    let banner = "=".repeat(BANNER_WIDTH);
    let lines = [
        banner.clone(),
        artifact.name.clone(),
        banner,
        format!("ID: {}", artifact.id),
        format!("Category: {}", capitalize(artifact.category.label())),
        format!("Rarity: {}", artifact.rarity.label().to_uppercase()),
        format!("Value: {} credits", artifact.base_value.unwrap_or(0)),
        String::new(),
        artifact.ascii_art.clone(),
        String::new(),
        artifact.description.clone(),
    ];
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::types::{Category, Rarity};

    fn sample() -> Artifact {
        Artifact {
            id: "1a2b3c4d".into(),
            name: "The Brass/Oracle Engine".into(),
            category: Category::Mechanical,
            rarity: Rarity::Rare,
            ascii_art: "[=]".into(),
            description: "It hums.".into(),
            base_value: Some(88),
        }
    }

    #[test]
    fn file_name_is_sanitized() {
        assert_eq!(
            export_file_name(&sample()),
            "the_brass_oracle_engine_1a2b3c4d.txt"
        );
        let mut odd = sample();
        odd.name = "../Über.. Relic".into();
        let name = export_file_name(&odd);
        assert!(!name.contains('/'));
        assert!(!name.contains(".."));
        assert!(name.ends_with("_1a2b3c4d.txt"));
    }

    #[test]
    fn document_layout() {
        let doc = render_document(&sample());
        let lines: Vec<&str> = doc.lines().collect();
        assert_eq!(lines[0], "=".repeat(60));
        assert_eq!(lines[1], "The Brass/Oracle Engine");
        assert_eq!(lines[3], "ID: 1a2b3c4d");
        assert_eq!(lines[4], "Category: Mechanical");
        assert_eq!(lines[5], "Rarity: RARE");
        assert_eq!(lines[6], "Value: 88 credits");
        assert_eq!(lines[7], "");
        assert_eq!(lines[8], "[=]");
        assert_eq!(lines[10], "It hums.");
    }
}
