//! Loading the item pool from files and inline flags.

use std::path::Path;

use tourney_core::{parse_lines, prepare_items, Item};

/// Parse a string as either a JSON array of strings or plain text (one item per line).
///
/// The result is trimmed, deduplicated and sorted, ready for a new run.
pub fn parse_items_from_str(content: &str) -> Result<Vec<Item>, String> {
    let trimmed = content.trim();
    if trimmed.starts_with('[') {
        let items: Vec<String> = serde_json::from_str(trimmed)
            .map_err(|e| format!("Input looks like JSON but failed to parse: {e}"))?;
        Ok(prepare_items(items))
    } else {
        Ok(parse_lines(trimmed))
    }
}

/// Combine an optional items file with inline `--item` values.
pub fn load_items(path: Option<&Path>, inline: &[String]) -> Result<Vec<Item>, String> {
    let mut items = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read items file {}: {e}", path.display()))?;
            parse_items_from_str(&content)?
        }
        None => Vec::new(),
    };

    items.extend(inline.iter().cloned());
    Ok(prepare_items(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_plain_text_is_trimmed_sorted_and_deduplicated() {
        let items = parse_items_from_str("  Pizza \r\nSushi\n\n\nPizza\nBurgers\n").unwrap();
        assert_eq!(items, vec!["Burgers", "Pizza", "Sushi"]);
    }

    #[test]
    fn test_json_array_is_accepted() {
        let items = parse_items_from_str(r#"["Tea", " Coffee ", "", "Tea"]"#).unwrap();
        assert_eq!(items, vec!["Coffee", "Tea"]);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = parse_items_from_str("[\"Tea\", ").unwrap_err();
        assert!(err.contains("failed to parse"));
    }

    #[test]
    fn test_load_items_merges_file_and_inline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Tea\nCoffee").unwrap();

        let inline = vec!["Cocoa".to_string(), "Tea".to_string()];
        let items = load_items(Some(file.path()), &inline).unwrap();
        assert_eq!(items, vec!["Cocoa", "Coffee", "Tea"]);
    }

    #[test]
    fn test_load_items_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let err = load_items(Some(&missing), &[]).unwrap_err();
        assert!(err.contains("Failed to read items file"));
    }
}
