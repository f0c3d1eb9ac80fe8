use crate::descriptor::FileEntry;
use crate::domain::{SemanticCategory, letter_suffix};
use crate::slots::Slot;

/// Items published under one title, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleGroup {
    pub img_count: usize,
    pub items: Vec<String>,
}

impl TitleGroup {
    /// Appends an item and returns its `image<N><letters>` label.
    pub fn push(&mut self, item: impl Into<String>) -> String {
        let label = self.item_label(self.items.len());
        self.items.push(item.into());
        label
    }

    pub fn title_label(&self) -> String {
        format!("imageTitle{}", self.img_count)
    }

    pub fn item_label(&self, index: usize) -> String {
        format!("image{}{}", self.img_count, letter_suffix(index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSection {
    pub category: SemanticCategory,
    pub path_name: String,
    titles: Vec<(String, TitleGroup)>,
}

impl ManifestSection {
    pub fn new(category: SemanticCategory, path_name: impl Into<String>) -> Self {
        Self {
            category,
            path_name: path_name.into(),
            titles: Vec::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.category.label()
    }

    /// Titles in first-seen order.
    pub fn titles(&self) -> impl Iterator<Item = (&str, &TitleGroup)> {
        self.titles.iter().map(|(title, group)| (title.as_str(), group))
    }

    pub fn title(&self, title: &str) -> Option<&TitleGroup> {
        let title = single_line(title);
        self.titles
            .iter()
            .find(|(known, _)| *known == title)
            .map(|(_, group)| group)
    }

    /// Titles are stored on one line; multi-line descriptor values are joined with spaces.
    pub fn register_title(&mut self, title: &str) -> &mut TitleGroup {
        let title = single_line(title);
        let position = match self.titles.iter().position(|(known, _)| *known == title) {
            Some(position) => position,
            None => {
                let group = TitleGroup {
                    img_count: self.titles.len() + 1,
                    items: Vec::new(),
                };
                self.titles.push((title, group));
                self.titles.len() - 1
            }
        };
        &mut self.titles[position].1
    }
}

/// Per-run accumulator of catalog sections. Owns every counter used for labels.
#[derive(Debug, Clone, Default)]
pub struct ManifestBuilder {
    sections: Vec<ManifestSection>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_section(&mut self, slot: &Slot) -> &mut ManifestSection {
        let position = match self
            .sections
            .iter()
            .position(|section| section.category == slot.category)
        {
            Some(position) => position,
            None => {
                self.sections
                    .push(ManifestSection::new(slot.category, slot.path_name.clone()));
                self.sections.len() - 1
            }
        };
        &mut self.sections[position]
    }

    /// Makes sure `title` exists in the slot's section without adding an item.
    pub fn register_title(&mut self, slot: &Slot, title: &str) -> usize {
        self.open_section(slot).register_title(title).img_count
    }

    /// Records `item` under `title`. Callers check the dedup ledgers first.
    pub fn add_entry(&mut self, slot: &Slot, title: &str, item: impl Into<String>) -> String {
        self.open_section(slot).register_title(title).push(item)
    }

    pub fn section(&self, category: SemanticCategory) -> Option<&ManifestSection> {
        self.sections
            .iter()
            .find(|section| section.category == category)
    }

    /// Sections in the order they were opened.
    pub fn sections(&self) -> &[ManifestSection] {
        &self.sections
    }

}

/// Collapses line breaks and the indentation around them into single spaces.
pub fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title a data file is listed under in `Data Files`.
pub fn data_file_title(category: SemanticCategory, entry: &FileEntry) -> String {
    if entry.category == 1 {
        format!("{} - hdf", category.label())
    } else {
        format!(
            "{}, status:{}, history:{} - hdf",
            category.label(),
            entry.status,
            entry.history
        )
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;

    use super::*;

    fn slot(category: SemanticCategory, path: &str) -> Slot {
        Slot {
            category,
            path_name: path.to_string(),
            dir: Utf8PathBuf::from("/out").join(path),
        }
    }

    #[test]
    fn titles_number_in_first_seen_order() {
        let mut builder = ManifestBuilder::new();
        let slot = slot(SemanticCategory::FRegion, "Path3");
        assert_eq!(builder.add_entry(&slot, "Ne", "Ne a.png"), "image1a");
        assert_eq!(builder.add_entry(&slot, "Te", "Te a.png"), "image2a");
        assert_eq!(builder.add_entry(&slot, "Ne", "Ne b.png"), "image1b");

        let section = builder.section(SemanticCategory::FRegion).unwrap();
        let group = section.title("Ne").unwrap();
        assert_eq!(group.img_count, 1);
        assert_eq!(group.items, vec!["Ne a.png", "Ne b.png"]);
    }

    #[test]
    fn item_labels_continue_past_z() {
        let mut builder = ManifestBuilder::new();
        let slot = slot(SemanticCategory::ERegion, "Path3");
        let labels = (0..28)
            .map(|index| builder.add_entry(&slot, "Ne", format!("{index}.png")))
            .collect::<Vec<_>>();
        assert_eq!(labels[25], "image1z");
        assert_eq!(labels[26], "image1aa");
        assert_eq!(labels[27], "image1ab");
    }

    #[test]
    fn registered_title_without_items_keeps_its_number() {
        let mut builder = ManifestBuilder::new();
        let slot = slot(SemanticCategory::DataFiles, "DataFiles");
        assert_eq!(builder.register_title(&slot, "first - hdf"), 1);
        assert_eq!(builder.register_title(&slot, "second - hdf"), 2);
        assert_eq!(builder.register_title(&slot, "first - hdf"), 1);
        let section = builder.section(SemanticCategory::DataFiles).unwrap();
        assert!(section.title("first - hdf").unwrap().items.is_empty());
    }

    #[test]
    fn multi_line_titles_are_joined() {
        let mut builder = ManifestBuilder::new();
        let slot = slot(SemanticCategory::DataFiles, "DataFiles");
        builder.add_entry(&slot, "history:reprocessed 2023\n  with new calibration", "lp.h5");
        builder.add_entry(&slot, "history:reprocessed 2023 with new calibration", "lp2.h5");

        let section = builder.section(SemanticCategory::DataFiles).unwrap();
        let titles = section.titles().collect::<Vec<_>>();
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].0, "history:reprocessed 2023 with new calibration");
        assert_eq!(titles[0].1.items, vec!["lp.h5", "lp2.h5"]);
    }
}
