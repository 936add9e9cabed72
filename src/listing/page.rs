//! Listing page rendering
//!
//! Produces the HTML shown for a directory: breadcrumb title, an optional
//! link to the parent directory and one table row per entry.

use super::entry::{scan_directory, RenderablePath};
use crate::error::Result;
use crate::storage::target::{directory_url, root_relative};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;
use std::path::Path;

/// Timestamp format used in the "Last modified" column
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything the listing template needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// Root-relative path of the listed directory, `/` for the root
    pub current_path: String,
    /// Root-relative URL of the parent, absent at the root
    pub parent_url: Option<String>,
    /// Entries in display order
    pub entries: Vec<RenderablePath>,
}

impl ListingPage {
    /// Build the page model for `target`, which must lie under `root`
    pub fn new(root: &Path, target: &Path, entries: Vec<RenderablePath>) -> Self {
        let relative = root_relative(root, target).unwrap_or_default();
        let parent_url = if relative.is_empty() {
            None
        } else {
            let parent = relative.rsplit_once('/').map_or("", |(parent, _)| parent);
            Some(directory_url(parent))
        };

        Self {
            current_path: directory_url(&relative),
            parent_url,
            entries,
        }
    }

    /// Render the page as a complete HTML document
    pub fn to_html(&self) -> String {
        let title = encode_text(&self.current_path);
        let mut html = String::with_capacity(1024 + self.entries.len() * 256);

        let _ = write!(
            html,
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Index of {title}</title>
    <style>
        body {{ font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 2em; }}
        table {{ border-collapse: collapse; }}
        th, td {{ padding: 4px 16px 4px 0; text-align: left; }}
        td.size {{ text-align: right; }}
        a {{ text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
    </style>
</head>
<body>
    <h1>Index of {title}</h1>
"#
        );

        if let Some(parent) = &self.parent_url {
            let _ = writeln!(
                html,
                r#"    <p><a class="parent" href="{}">&larr; Parent directory</a></p>"#,
                encode_double_quoted_attribute(&encode_url_path(parent))
            );
        }

        html.push_str("    <table>\n");
        html.push_str(
            "        <tr><th>Name</th><th>Type</th><th>Size</th><th>Last modified</th></tr>\n",
        );
        for entry in &self.entries {
            let _ = writeln!(
                html,
                concat!(
                    r#"        <tr><td><a href="{href}">{name}</a></td><td>{kind}</td>"#,
                    r#"<td class="size" title="{bytes} bytes">{size}</td><td>{modified}</td></tr>"#,
                ),
                href = encode_double_quoted_attribute(&encode_url_path(&entry.url)),
                name = encode_text(&entry.name),
                kind = entry.kind,
                bytes = entry.size,
                size = format_size(entry.size),
                modified = entry.last_modified.format(TIME_FORMAT),
            );
        }
        html.push_str("    </table>\n</body>\n</html>\n");

        html
    }
}

/// Scan `target` and render its listing
pub async fn render_listing(root: &Path, target: &Path) -> Result<String> {
    let entries = scan_directory(root, target).await?;
    Ok(ListingPage::new(root, target, entries).to_html())
}

/// Percent-encode each segment of a root-relative URL path
fn encode_url_path(url: &str) -> String {
    url.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Human readable size, e.g. `512 B`, `1.5 KiB`
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
