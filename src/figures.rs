use std::sync::LazyLock;

use regex::Regex;

use crate::descriptor::ImageRef;
use crate::domain::FileKind;
use crate::manifest::single_line;

static INTEGRATION_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+sec").unwrap());

const GEOMETRY_MARKER: &str = "Geometry Plot";

/// Where a figure goes, under which title, and what it is called once uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FigureRoute {
    /// Published in `Additional Plots` regardless of the owning file's section.
    Geometry { title: String, upload_name: String },
    /// Published in the owning file's section under its original base name.
    Velocity { title: String, upload_name: String },
    /// Published in the owning file's section with the title prefix prepended.
    Standard { title: String, upload_name: String },
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingIntegrationToken { title: String },
    IntegrationMismatch { token: String, file_name: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingIntegrationToken { title } => {
                write!(f, "no integration time in velocity title `{title}`")
            }
            SkipReason::IntegrationMismatch { token, file_name } => {
                write!(f, "integration time {token} does not match figure {file_name}")
            }
        }
    }
}

/// Resolves a figure in priority order: geometry plots, then velocity products,
/// then everything else.
pub fn route_figure(kind: &FileKind, image: &ImageRef) -> FigureRoute {
    let base_name = image.source_path.file_name().unwrap_or(image.source_path.as_str());
    let title = single_line(&image.title);

    if title.contains(GEOMETRY_MARKER) {
        return FigureRoute::Geometry {
            title: title.clone(),
            upload_name: prefixed_name(&title, base_name),
        };
    }

    if kind.is_velocity() {
        let Some(token) = integration_token(&title) else {
            return FigureRoute::Skip(SkipReason::MissingIntegrationToken {
                title: title.clone(),
            });
        };
        if !base_name.contains(token) {
            return FigureRoute::Skip(SkipReason::IntegrationMismatch {
                token: token.to_string(),
                file_name: base_name.to_string(),
            });
        }
        let start = title.find(token).unwrap_or(0);
        return FigureRoute::Velocity {
            title: title[start..].to_string(),
            upload_name: base_name.to_string(),
        };
    }

    FigureRoute::Standard {
        title: title.clone(),
        upload_name: prefixed_name(&title, base_name),
    }
}

/// First `<digits>sec` token in `title`.
pub fn integration_token(title: &str) -> Option<&str> {
    INTEGRATION_TOKEN.find(title).map(|found| found.as_str())
}

/// Title text before the first space, or the whole title.
pub fn leading_token(title: &str) -> &str {
    title.split_once(' ').map_or(title, |(head, _)| head)
}

pub fn prefixed_name(title: &str, base_name: &str) -> String {
    format!("{} {base_name}", leading_token(title))
}
