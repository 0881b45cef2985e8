//! Stateful batch sorting of scanned sketch sheets
//!
//! Pages are read in natural file-name order. A page with more contours than the
//! consent threshold is a consent form and starts a new user; every other
//! page is a content page whose crops go to the current user's folder.

use opencv::core::Mat;
use std::path::{Path, PathBuf};
use tracing::info;

use super::batch::{BatchState, FolderOutcome};
use crate::config::SortConfig;
use crate::detection::{PageReport, RoiExtractor};
use crate::error::Result;
use crate::image_loader::{find_image_files, load_image, page_stem};

/// Kind of a scanned page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Dense form page opening a new user
    ConsentForm,
    /// Sketch sheet
    Content,
}

/// What processing one page did
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// A consent form closed the previous folder and opened `folder`
    ConsentForm {
        folder: PathBuf,
        closed: FolderOutcome,
    },
    /// Crops were written to the target folder
    Content(PageReport),
}

/// Totals of a sorting run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortReport {
    /// Pages processed
    pub pages: usize,
    /// Consent forms seen
    pub consent_forms: usize,
    /// Crops written
    pub rois: usize,
    /// User folders split into catalog folders
    pub labeled: usize,
    /// User folders moved to the unsorted folder
    pub unsorted: usize,
    /// What happened to the folder open at the end
    pub trailing: Option<FolderOutcome>,
}

impl SortReport {
    fn record_closed(&mut self, outcome: &FolderOutcome) {
        match outcome {
            FolderOutcome::Labeled { .. } => self.labeled += 1,
            FolderOutcome::Unsorted { .. } => self.unsorted += 1,
            FolderOutcome::Bootstrap | FolderOutcome::Pending(_) => {}
        }
    }
}

/// Batch sorter owning the folder state of one run
pub struct SketchSorter {
    config: SortConfig,
    extractor: RoiExtractor,
    state: BatchState,
}

impl SketchSorter {
    /// Create a sorter writing below `output_folder`
    ///
    /// Creates the output, unsorted and catalog folders.
    pub fn new(output_folder: &Path, config: SortConfig) -> Result<Self> {
        let state = BatchState::new(output_folder, &config.unsorted_folder_name);
        state.prepare()?;

        Ok(Self {
            extractor: RoiExtractor::new(config.extraction.clone()),
            config,
            state,
        })
    }

    /// Folder state of the run
    pub fn state(&self) -> &BatchState {
        &self.state
    }

    /// Classify a page by its contour count
    pub fn classify(&self, contour_count: usize) -> PageKind {
        if contour_count > self.config.consent_contour_threshold {
            PageKind::ConsentForm
        } else {
            PageKind::Content
        }
    }

    /// Process one page file
    pub fn process_file(&mut self, path: &Path) -> Result<PageOutcome> {
        let page = load_image(path)?;
        self.process_page(path, &page)
    }

    /// Process one loaded page
    pub fn process_page(&mut self, source: &Path, page: &Mat) -> Result<PageOutcome> {
        let region = self.extractor.working_region(page)?;
        let contours = self.extractor.find_contours(&region)?;

        let outcome = match self.classify(contours.len()) {
            PageKind::ConsentForm => {
                let closed = self.state.begin_user(&page_stem(source))?;
                PageOutcome::ConsentForm {
                    folder: self.state.target_folder().to_path_buf(),
                    closed,
                }
            }
            PageKind::Content => {
                let target = self.state.target_folder().to_path_buf();
                let report = self
                    .extractor
                    .process_region(source, &region, &contours, &target)?;
                self.state.record_crops(&report.written);
                PageOutcome::Content(report)
            }
        };

        info!(
            "Processed {}..",
            source.file_name().unwrap_or_default().to_string_lossy()
        );
        Ok(outcome)
    }

    /// Sort every page of `input_folder` and apply the trailing folder policy
    pub fn run(&mut self, input_folder: &Path) -> Result<SortReport> {
        let extraction = &self.config.extraction;
        let pages = find_image_files(input_folder, |p| extraction.accepts(p))?;

        let mut report = SortReport::default();
        for path in &pages {
            match self.process_file(path)? {
                PageOutcome::ConsentForm { closed, .. } => {
                    report.consent_forms += 1;
                    report.record_closed(&closed);
                }
                PageOutcome::Content(page) => report.rois += page.roi_count(),
            }
            report.pages += 1;
        }

        let trailing = self.state.finish(self.config.trailing_folder)?;
        report.record_closed(&trailing);
        report.trailing = Some(trailing);

        info!("Data extraction successful...");
        Ok(report)
    }
}
