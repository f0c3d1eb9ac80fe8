use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::classify::classify_entry;
use crate::config::ResolvedConfig;
use crate::descriptor::{Descriptor, ExperimentDescriptor, FileEntry};
use crate::domain::SemanticCategory;
use crate::error::CatalogError;
use crate::figures::{FigureRoute, route_figure};
use crate::ledger::{DataFileLedger, FigureKey, FigureLedger};
use crate::link::madrigal_link;
use crate::manifest::{ManifestBuilder, data_file_title};
use crate::render::{self, LINKS_SECTION};
use crate::slots::{Slot, SlotAllocator};
use crate::store::AssetStore;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub processed_at: String,
    pub directories: Vec<DirectoryResult>,
}

impl BatchResult {
    pub fn failed(&self) -> usize {
        self.directories
            .iter()
            .filter(|result| result.error.is_some())
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryResult {
    pub directory: String,
    pub report: Option<ExperimentReport>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub experiment: String,
    pub output_root: String,
    pub manifest_path: String,
    pub sections: Vec<SectionSummary>,
    pub copied: usize,
    pub kept_existing: usize,
    pub duplicates: usize,
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub label: String,
    pub path: String,
    pub titles: usize,
    pub items: usize,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Copied,
    KeptExisting,
    Duplicate,
}

/// Per-directory state. Dropped at the end of each experiment so nothing leaks
/// into the next directory of a batch.
struct ExperimentRun {
    slots: SlotAllocator,
    data_files: DataFileLedger,
    figures: FigureLedger,
    manifest: ManifestBuilder,
    data_slot: Slot,
    plots_slot: Slot,
    copied: usize,
    kept_existing: usize,
    duplicates: usize,
    skipped: Vec<String>,
}

pub struct App<S: AssetStore> {
    config: ResolvedConfig,
    store: S,
}

impl<S: AssetStore> App<S> {
    pub fn new(config: ResolvedConfig, store: S) -> Self {
        Self { config, store }
    }

    /// Processes every experiment directory matching `pattern`. A failing
    /// directory is reported and the batch moves on.
    pub fn run_batch(
        &self,
        pattern: &str,
        options: &RunOptions,
        sink: &dyn ProgressSink,
    ) -> Result<BatchResult, CatalogError> {
        let mut directories = Vec::new();
        for directory in candidate_directories(pattern)? {
            sink.event(ProgressEvent {
                message: format!("Doing {directory}"),
            });
            match self.process_experiment(&directory, options, sink) {
                Ok(report) => directories.push(DirectoryResult {
                    directory: directory.to_string(),
                    report: Some(report),
                    error: None,
                }),
                Err(err) => {
                    tracing::error!(%directory, error = %err, "experiment failed");
                    sink.event(ProgressEvent {
                        message: format!("Failed {directory}: {err}"),
                    });
                    directories.push(DirectoryResult {
                        directory: directory.to_string(),
                        report: None,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        Ok(BatchResult {
            processed_at: chrono::Utc::now().to_rfc3339(),
            directories,
        })
    }

    pub fn process_experiment(
        &self,
        directory: &Utf8Path,
        options: &RunOptions,
        sink: &dyn ProgressSink,
    ) -> Result<ExperimentReport, CatalogError> {
        let descriptor = Descriptor::read(&directory.join(&self.config.descriptor_name))?;
        let experiment = ExperimentDescriptor::from_descriptor(&descriptor)?;
        let instrument = self.config.instrument(&experiment.instrument)?;

        let directory_name = directory.file_name().unwrap_or(directory.as_str());
        if directory_name != experiment.experiment_name {
            tracing::warn!(
                directory = directory_name,
                descriptor = %experiment.experiment_name,
                "experiment name differs from directory name"
            );
        }
        let link = madrigal_link(
            &self.config.madrigal_base,
            directory_name,
            &instrument.mnemonic,
        )?;

        let output_root = instrument.output_root.join(&experiment.experiment_name);
        self.store.ensure_dir(&output_root)?;
        let mut run = self.start_run(output_root.clone())?;

        for (index, file) in experiment.files.iter().enumerate() {
            sink.event(ProgressEvent {
                message: format!("File{} {}", index + 1, file.type_label),
            });
            self.place_file(&mut run, directory, file)?;
        }

        let text = render::render(run.manifest.sections(), &link);
        let manifest_path = output_root.join(&self.config.manifest_name);
        self.store.write_manifest(&manifest_path, &text)?;
        if !options.dry_run {
            verify_references(&self.store, &output_root, &text)?;
        }
        tracing::info!(%manifest_path, sections = run.manifest.sections().len(), "manifest written");

        let sections = render::section_order(run.manifest.sections())
            .into_iter()
            .map(|section| SectionSummary {
                label: section.label().to_string(),
                path: section.path_name.clone(),
                titles: section.titles().count(),
                items: section.titles().map(|(_, group)| group.items.len()).sum(),
            })
            .collect();

        Ok(ExperimentReport {
            experiment: experiment.experiment_name,
            output_root: output_root.to_string(),
            manifest_path: manifest_path.to_string(),
            sections,
            copied: run.copied,
            kept_existing: run.kept_existing,
            duplicates: run.duplicates,
            skipped: run.skipped,
            manifest: options.dry_run.then_some(text),
        })
    }

    fn start_run(&self, output_root: Utf8PathBuf) -> Result<ExperimentRun, CatalogError> {
        let mut slots = SlotAllocator::new(output_root);
        let data_slot = slots.allocate(SemanticCategory::DataFiles, &self.store)?;
        let plots_slot = slots.allocate(SemanticCategory::AdditionalPlots, &self.store)?;
        let mut manifest = ManifestBuilder::new();
        manifest.open_section(&data_slot);
        manifest.open_section(&plots_slot);
        Ok(ExperimentRun {
            slots,
            data_files: DataFileLedger::new(),
            figures: FigureLedger::new(),
            manifest,
            data_slot,
            plots_slot,
            copied: 0,
            kept_existing: 0,
            duplicates: 0,
            skipped: Vec::new(),
        })
    }

    fn place_file(
        &self,
        run: &mut ExperimentRun,
        directory: &Utf8Path,
        file: &FileEntry,
    ) -> Result<(), CatalogError> {
        let category = classify_entry(file)?;
        tracing::debug!(label = %file.type_label, %category, "classified");
        let slot = run.slots.allocate(category, &self.store)?;
        run.manifest.open_section(&slot);

        let source = resolve_source(directory, &file.source_path);
        let file_name = base_name(&source)?;
        let destination = run.data_slot.dir.join(file_name);
        let title = data_file_title(category, file);
        run.manifest.register_title(&run.data_slot, &title);

        let placement = if run.data_files.seen(&destination) {
            tracing::debug!(%destination, "data file already placed");
            Placement::Duplicate
        } else {
            let placement = self.place(&source, &destination)?;
            run.data_files.mark_seen(destination.clone());
            placement
        };
        run.count(placement);
        if placement != Placement::Duplicate {
            run.manifest.add_entry(&run.data_slot, &title, file_name);
        }

        for image in &file.images {
            let (target, title, upload_name) = match route_figure(&file.kind, image) {
                FigureRoute::Geometry { title, upload_name } => {
                    (run.plots_slot.clone(), title, upload_name)
                }
                FigureRoute::Velocity { title, upload_name }
                | FigureRoute::Standard { title, upload_name } => {
                    (slot.clone(), title, upload_name)
                }
                FigureRoute::Skip(reason) => {
                    tracing::warn!(image = %image.source_path, %reason, "skipping figure");
                    run.skipped.push(format!("{}: {reason}", image.source_path));
                    continue;
                }
            };

            run.manifest.register_title(&target, &title);
            let key = FigureKey {
                category: target.category,
                base_name: upload_name.clone(),
            };
            if run.figures.seen(&key) {
                tracing::debug!(section = %target.category, figure = %upload_name, "figure already placed");
                run.count(Placement::Duplicate);
                continue;
            }

            let source = resolve_source(directory, &image.source_path);
            let placement = self.place(&source, &target.dir.join(&upload_name))?;
            run.figures.mark_seen(key);
            run.count(placement);
            run.manifest.add_entry(&target, &title, upload_name);
        }

        Ok(())
    }

    fn place(&self, source: &Utf8Path, destination: &Utf8Path) -> Result<Placement, CatalogError> {
        if self.config.avoid_overwrite && self.store.exists(destination) {
            tracing::warn!(%destination, "already exists, skipping copy");
            return Ok(Placement::KeptExisting);
        }
        tracing::info!(%source, %destination, "copy");
        self.store.copy_file(source, destination)?;
        Ok(Placement::Copied)
    }
}

impl ExperimentRun {
    fn count(&mut self, placement: Placement) {
        match placement {
            Placement::Copied => self.copied += 1,
            Placement::KeptExisting => self.kept_existing += 1,
            Placement::Duplicate => self.duplicates += 1,
        }
    }
}

/// Directories matching `pattern`, sorted, skipping plain files and symlinks.
pub fn candidate_directories(pattern: &str) -> Result<Vec<Utf8PathBuf>, CatalogError> {
    let paths =
        glob::glob(pattern).map_err(|err| CatalogError::InvalidPattern(format!("{pattern}: {err}")))?;
    let mut directories = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(error = %err, "unreadable glob match");
                continue;
            }
        };
        let Ok(metadata) = path.symlink_metadata() else {
            continue;
        };
        if metadata.file_type().is_symlink() || !metadata.is_dir() {
            continue;
        }
        match Utf8PathBuf::from_path_buf(path) {
            Ok(path) => directories.push(path),
            Err(path) => tracing::warn!(path = %path.display(), "skipping non UTF-8 path"),
        }
    }
    directories.sort();
    Ok(directories)
}

/// Checks that every item listed outside `[Links]` exists under `root`.
pub fn verify_references(
    store: &dyn AssetStore,
    root: &Utf8Path,
    manifest: &str,
) -> Result<(), CatalogError> {
    for section in render::parse(manifest)? {
        if section.label == LINKS_SECTION {
            continue;
        }
        for title in &section.titles {
            for item in &title.items {
                let path = root.join(&section.path).join(item);
                if !store.exists(&path) {
                    return Err(CatalogError::ManifestIntegrity(path.into_std_path_buf()));
                }
            }
        }
    }
    Ok(())
}

fn resolve_source(directory: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        directory.join(path)
    }
}

fn base_name(path: &Utf8Path) -> Result<&str, CatalogError> {
    path.file_name().ok_or_else(|| CatalogError::Copy {
        source_path: path.as_std_path().to_path_buf(),
        destination: std::path::PathBuf::new(),
        message: "source has no file name".to_string(),
    })
}
