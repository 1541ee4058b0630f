//! Markdown summary of a report

use crate::scout::ScoutReport;

/// Formats a report as a markdown summary
///
/// # Arguments
///
/// * `report` - The report to summarize
///
/// # Returns
///
/// A formatted markdown string
pub fn format_text_summary(report: &ScoutReport) -> String {
    let mut md = String::new();

    md.push_str("# Price Scout Report\n\n");
    md.push_str(&format!("- **Request**: {}\n", report.request_id));
    md.push_str(&format!(
        "- **Candidate Links**: {}\n",
        report.shopping_links.len()
    ));
    md.push_str(&format!(
        "- **Product Links**: {}\n\n",
        report.product_links.len()
    ));

    if let Some(description) = &report.product_description {
        md.push_str("## Product\n\n");
        md.push_str(description.trim());
        md.push_str("\n\n");
    }

    // Preparation breakdown
    let stats = &report.stats;
    md.push_str("## Link Preparation\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Received | {} |\n", stats.received));
    md.push_str(&format!("| Repeated | {} |\n", stats.repeated_inputs));
    md.push_str(&format!("| Over Limit | {} |\n", stats.truncated));
    md.push_str(&format!("| Accepted | {} |\n", stats.accepted));
    md.push_str(&format!("| Unresolved | {} |\n", stats.unresolved));
    md.push_str(&format!("| Invalid | {} |\n", stats.invalid));
    md.push_str(&format!("| Search Page | {} |\n", stats.search_pages));
    md.push_str(&format!("| Collection Page | {} |\n", stats.collection_pages));
    md.push_str(&format!("| Duplicate | {} |\n\n", stats.duplicates));

    if !report.outcomes.is_empty() {
        md.push_str("| Link | Destination | Outcome |\n");
        md.push_str("|------|-------------|---------|\n");
        for outcome in &report.outcomes {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                outcome.original, outcome.resolved, outcome.disposition
            ));
        }
        md.push('\n');
    }

    let extraction = match &report.extraction {
        Some(extraction) => extraction,
        None => return md,
    };

    md.push_str("## Prices\n\n");
    match extraction.error() {
        Some(error) => {
            md.push_str(&format!("Extraction failed: {}\n", error));
        }
        None => {
            let listings = extraction.listings();
            if listings.is_empty() {
                md.push_str("No listings were extracted.\n");
            } else {
                md.push_str("| Website | Price | Currency | URL |\n");
                md.push_str("|---------|-------|----------|-----|\n");
                for listing in &listings {
                    let price = if listing.price_combined.is_empty() {
                        &listing.price_string
                    } else {
                        &listing.price_combined
                    };
                    md.push_str(&format!(
                        "| {} | {} | {} | {} |\n",
                        listing.website_name, price, listing.currency_code, listing.website_url
                    ));
                }
            }
        }
    }

    md
}
