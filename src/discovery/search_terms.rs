use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Everything after the first colon that follows a "search terms" heading
    static ref TERMS_BLOCK: Regex = Regex::new(r"(?is)search terms.*?[:：]\s*(.*)$").unwrap();
    static ref QUOTED: Regex = Regex::new(r#""(.*?)""#).unwrap();
    static ref MARKDOWN_LINK: Regex = Regex::new(r"\[([^\]]*)\]\((https?://[^)\s]+)\)").unwrap();
}

const BULLETS: &[char] = &['-', '*', '•', ' '];

/// Pulls suggested search terms out of a product description
///
/// Looks for a "search terms" heading followed by a colon. Double-quoted
/// terms in the block that follows win; without any, each non-empty line
/// of the block is a term with bullet characters stripped. A description
/// without the heading has no terms.
///
/// # Examples
///
/// ```
/// use price_scout::discovery::extract_search_terms;
///
/// let text = "A kettle.\n\nTypical search terms:\n\"steel kettle\", \"1.7L kettle\"";
/// assert_eq!(extract_search_terms(text), vec!["steel kettle", "1.7L kettle"]);
/// ```
pub fn extract_search_terms(description: &str) -> Vec<String> {
    let block = match TERMS_BLOCK.captures(description).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().trim(),
        None => return Vec::new(),
    };

    let quoted: Vec<String> = QUOTED
        .captures_iter(block)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect();

    if !quoted.is_empty() {
        return quoted;
    }

    block
        .lines()
        .map(|line| line.trim().trim_matches(BULLETS).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Collects the targets of `[label](http...)` links in model output
pub fn extract_markdown_links(text: &str) -> Vec<String> {
    MARKDOWN_LINK
        .captures_iter(text)
        .filter_map(|c| c.get(2))
        .map(|m| m.as_str().to_string())
        .collect()
}
