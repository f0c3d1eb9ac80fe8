use std::collections::HashMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::FileKind;
use crate::error::CatalogError;

pub const DEFAULT_SECTION: &str = "DEFAULT";
pub const EXPERIMENT_SECTION: &str = "Experiment";

/// Raw sectioned key/value store read from an experiment's `Madrigal.ini`.
///
/// Keys are case-sensitive. Values in `[DEFAULT]` are visible from every section.
#[derive(Debug, Clone, Default)]
pub struct Descriptor {
    defaults: HashMap<String, String>,
    sections: HashMap<String, HashMap<String, String>>,
}

impl Descriptor {
    pub fn read(path: &Utf8Path) -> Result<Self, CatalogError> {
        let content =
            fs::read_to_string(path.as_std_path()).map_err(|err| CatalogError::DescriptorRead {
                path: path.as_std_path().to_path_buf(),
                message: err.to_string(),
            })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, CatalogError> {
        let mut descriptor = Descriptor::default();
        let mut current: Option<String> = None;
        let mut last_key: Option<String> = None;

        for (index, raw_line) in content.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = raw_line.trim();

            if trimmed.is_empty() {
                last_key = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if raw_line.starts_with([' ', '\t']) {
                if let (Some(section), Some(key)) = (current.as_deref(), last_key.as_deref()) {
                    if let Some(value) = descriptor.section_mut(section).get_mut(key) {
                        value.push('\n');
                        value.push_str(trimmed);
                        continue;
                    }
                }
            }

            if let Some(name) = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                let name = name.trim();
                if name.is_empty() {
                    return Err(CatalogError::DescriptorParse {
                        line: line_no,
                        message: "empty section name".to_string(),
                    });
                }
                descriptor.section_mut(name);
                current = Some(name.to_string());
                last_key = None;
                continue;
            }

            let Some(section) = current.as_deref() else {
                return Err(CatalogError::DescriptorParse {
                    line: line_no,
                    message: "option outside of any section".to_string(),
                });
            };
            let Some(split_at) = trimmed.find(['=', ':']) else {
                return Err(CatalogError::DescriptorParse {
                    line: line_no,
                    message: format!("expected `key = value`, found `{trimmed}`"),
                });
            };
            let key = trimmed[..split_at].trim();
            if key.is_empty() {
                return Err(CatalogError::DescriptorParse {
                    line: line_no,
                    message: "empty option name".to_string(),
                });
            }
            let value = trimmed[split_at + 1..].trim();
            descriptor
                .section_mut(section)
                .insert(key.to_string(), value.to_string());
            last_key = Some(key.to_string());
        }

        Ok(descriptor)
    }

    fn section_mut(&mut self, name: &str) -> &mut HashMap<String, String> {
        if name == DEFAULT_SECTION {
            return &mut self.defaults;
        }
        self.sections.entry(name.to_string()).or_default()
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        if section != DEFAULT_SECTION {
            if let Some(value) = self.sections.get(section).and_then(|map| map.get(key)) {
                return Some(value.as_str());
            }
        }
        self.defaults.get(key).map(String::as_str)
    }

    pub fn require(&self, section: &str, key: &str) -> Result<&str, CatalogError> {
        self.get(section, key)
            .ok_or_else(|| CatalogError::MissingField {
                section: section.to_string(),
                field: key.to_string(),
            })
    }
}

/// One figure listed under a `FileN` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub source_path: Utf8PathBuf,
    pub title: String,
}

/// One `FileN` section, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub source_path: Utf8PathBuf,
    pub kind: FileKind,
    /// Free-text `ckindat` label the classifier works on.
    pub type_label: String,
    pub kindat: String,
    pub status: String,
    pub category: i64,
    pub history: String,
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Clone)]
pub struct ExperimentDescriptor {
    pub experiment_name: String,
    pub instrument: String,
    pub files: Vec<FileEntry>,
}

impl ExperimentDescriptor {
    pub fn from_descriptor(descriptor: &Descriptor) -> Result<Self, CatalogError> {
        let instrument = descriptor
            .get(EXPERIMENT_SECTION, "instrument")
            .ok_or_else(|| {
                CatalogError::InstrumentLookup("descriptor has no instrument id".to_string())
            })?;
        let experiment_name = descriptor
            .get(DEFAULT_SECTION, "ExperimentName")
            .ok_or_else(|| {
                CatalogError::InstrumentLookup("descriptor has no experiment name".to_string())
            })?;

        let mut files = Vec::new();
        for index in 1.. {
            let section = format!("File{index}");
            if !descriptor.has_section(&section) {
                break;
            }
            files.push(decode_file(descriptor, &section)?);
        }

        Ok(Self {
            experiment_name: experiment_name.to_string(),
            instrument: instrument.to_string(),
            files,
        })
    }
}

fn decode_file(descriptor: &Descriptor, section: &str) -> Result<FileEntry, CatalogError> {
    let category_raw = descriptor.require(section, "category")?;
    let category = category_raw
        .trim()
        .parse::<i64>()
        .map_err(|_| CatalogError::InvalidField {
            section: section.to_string(),
            field: "category".to_string(),
            value: category_raw.to_string(),
        })?;

    let mut images = Vec::new();
    for index in 1.. {
        let Some(image) = descriptor.get(section, &format!("image{index}")) else {
            break;
        };
        let title = descriptor.require(section, &format!("imageTitle{index}"))?;
        images.push(ImageRef {
            source_path: Utf8PathBuf::from(image),
            title: title.to_string(),
        });
    }

    Ok(FileEntry {
        source_path: Utf8PathBuf::from(descriptor.require(section, "hdf5Filename")?),
        kind: descriptor.require(section, "type")?.parse()?,
        type_label: descriptor.require(section, "ckindat")?.to_string(),
        kindat: descriptor.require(section, "kindat")?.to_string(),
        status: descriptor.require(section, "status")?.to_string(),
        category,
        history: descriptor.require(section, "history")?.to_string(),
        images,
    })
}
