//! Line-oriented manifest format read by the experiment catalog.
//!
//! ```text
//! [E-region (Alternating Codes)]
//!
//! Path: Path3
//!
//! imageTitle1: Electron Density Map
//! image1a: Electron ne.png
//!
//! [Links]
//! ...
//! ```

use std::fmt::Write;

use crate::error::CatalogError;
use crate::manifest::ManifestSection;

pub const LINKS_SECTION: &str = "Links";
pub const LINK_TITLE: &str = "Access Data from Madrigal";

#[cfg(windows)]
const NEWLINE: &str = "\r\n";
#[cfg(not(windows))]
const NEWLINE: &str = "\n";

/// Section order of the catalog: first character of the label, then label length.
///
/// Not alphabetical. Existing catalog pages depend on it, ties keep insertion order.
pub fn section_order(sections: &[ManifestSection]) -> Vec<&ManifestSection> {
    let mut ordered = sections.iter().collect::<Vec<_>>();
    ordered.sort_by_key(|section| {
        let label = section.label();
        (label.chars().next(), label.len())
    });
    ordered
}

pub fn render(sections: &[ManifestSection], link: &str) -> String {
    let mut out = String::new();
    for section in section_order(sections) {
        write_header(&mut out, section.label(), &section.path_name);

        let mut titles = section.titles().collect::<Vec<_>>();
        titles.sort_by(|(left, _), (right, _)| left.cmp(right));
        for (title, group) in titles {
            write_line(&mut out, &group.title_label(), title);
            for (index, item) in group.items.iter().enumerate() {
                write_line(&mut out, &group.item_label(index), item);
            }
            out.push_str(NEWLINE);
        }
    }

    write_header(&mut out, LINKS_SECTION, "");
    write_line(&mut out, "imageTitle1", LINK_TITLE);
    write_line(&mut out, "image1a", link);
    out.push_str(NEWLINE);
    out
}

fn write_header(out: &mut String, label: &str, path: &str) {
    let _ = write!(out, "[{label}]{NEWLINE}{NEWLINE}Path: {path}{NEWLINE}{NEWLINE}");
}

fn write_line(out: &mut String, key: &str, value: &str) {
    let _ = write!(out, "{key}: {value}{NEWLINE}");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub img_count: usize,
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSection {
    pub label: String,
    pub path: String,
    pub titles: Vec<ParsedTitle>,
}

/// Reads a rendered manifest back into its section/title/item structure.
pub fn parse(text: &str) -> Result<Vec<ParsedSection>, CatalogError> {
    let mut sections: Vec<ParsedSection> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let error = |message: &str| CatalogError::ManifestParse {
            line: line_no,
            message: message.to_string(),
        };
        if line.trim().is_empty() {
            continue;
        }

        if let Some(label) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            sections.push(ParsedSection {
                label: label.to_string(),
                path: String::new(),
                titles: Vec::new(),
            });
            continue;
        }

        let section = sections
            .last_mut()
            .ok_or_else(|| error("entry before first section"))?;
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| error("expected `key: value`"))?;
        let value = value.strip_prefix(' ').unwrap_or(value);

        if key == "Path" {
            section.path = value.to_string();
        } else if let Some(number) = key.strip_prefix("imageTitle") {
            let img_count = number
                .parse::<usize>()
                .map_err(|_| error("title number is not numeric"))?;
            section.titles.push(ParsedTitle {
                img_count,
                title: value.to_string(),
                items: Vec::new(),
            });
        } else if let Some(label) = key.strip_prefix("image") {
            let digits = label.trim_end_matches(|ch: char| ch.is_ascii_lowercase());
            let img_count = digits
                .parse::<usize>()
                .map_err(|_| error("item label has no title number"))?;
            let title = section
                .titles
                .iter_mut()
                .find(|title| title.img_count == img_count)
                .ok_or_else(|| error("item without a matching title"))?;
            title.items.push(value.to_string());
        } else {
            return Err(error("unknown key"));
        }
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::domain::SemanticCategory;

    #[test]
    fn empty_sections_render_header_only() {
        let sections = vec![ManifestSection::new(
            SemanticCategory::AdditionalPlots,
            "AdditPlots",
        )];
        let text = render(&sections, "LINK").replace("\r\n", "\n");
        assert_eq!(
            text,
            "[Additional Plots]\n\nPath: AdditPlots\n\n\
             [Links]\n\nPath: \n\nimageTitle1: Access Data from Madrigal\nimage1a: LINK\n\n"
        );
    }

    #[test]
    fn parse_rejects_orphan_items() {
        let err = parse("[Data Files]\n\nPath: DataFiles\n\nimage1a: x.h5\n").unwrap_err();
        assert_matches!(err, CatalogError::ManifestParse { line: 5, .. });
    }
}
