//! Turning pasted text into a run's starting pool.
use crate::types::Item;

/// Trim, drop blanks, sort lexicographically and deduplicate.
pub fn prepare_items<I, S>(items: I) -> Vec<Item>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut prepared: Vec<Item> = items
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    prepared.sort();
    prepared.dedup();
    prepared
}

/// Newline-delimited text (LF or CRLF) to a prepared pool.
pub fn parse_lines(text: &str) -> Vec<Item> {
    prepare_items(text.lines())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines_sorts_and_dedups() {
        let items = parse_lines("pear\r\napple\n\n  pear \nApple\n");
        assert_eq!(items, vec!["Apple", "apple", "pear"]);
    }

    #[test]
    fn test_prepare_items_empty() {
        assert!(prepare_items(Vec::<String>::new()).is_empty());
        assert!(prepare_items(["", "   "]).is_empty());
    }
}
