//! Per-user output folder tracking
//!
//! A sorting batch writes the crops of every user into one active folder.
//! When the next user's consent form shows up the active folder is closed:
//! with one crop per catalog entry it is split into the catalog folders,
//! otherwise it is moved whole into the unsorted folder.
//!
//! Crops are matched to catalog entries in the order they were written, which
//! the state records as content pages are processed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::catalog::{natural_cmp, CATALOG};
use crate::config::TrailingFolderPolicy;
use crate::error::{ExtractError, Result};

/// How an active folder was closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderOutcome {
    /// No folder was active yet
    Bootstrap,
    /// Every file was moved into its catalog folder and the folder removed
    Labeled {
        folder: PathBuf,
        moved: Vec<PathBuf>,
    },
    /// The folder was moved under the unsorted folder
    Unsorted { from: PathBuf, to: PathBuf },
    /// The folder was left where it is
    Pending(PathBuf),
}

/// Folder state of a sorting batch
#[derive(Debug, Clone)]
pub struct BatchState {
    output_folder: PathBuf,
    unsorted_folder: PathBuf,
    active: Option<PathBuf>,
    /// Crops written into the active folder, oldest first
    written: Vec<PathBuf>,
}

impl BatchState {
    /// Create the state for `output_folder`; no folder is active yet
    pub fn new(output_folder: &Path, unsorted_name: &str) -> Self {
        Self {
            output_folder: output_folder.to_path_buf(),
            unsorted_folder: output_folder.join(unsorted_name),
            active: None,
            written: Vec::new(),
        }
    }

    /// Create the output, unsorted and catalog folders
    pub fn prepare(&self) -> Result<()> {
        create_dir(&self.output_folder)?;
        create_dir(&self.unsorted_folder)?;
        for label in CATALOG {
            create_dir(&self.output_folder.join(label))?;
        }
        Ok(())
    }

    /// Root output folder
    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    /// Folder collecting incomplete user folders
    pub fn unsorted_folder(&self) -> &Path {
        &self.unsorted_folder
    }

    /// Currently active user folder, if a consent form was seen
    pub fn active_folder(&self) -> Option<&Path> {
        self.active.as_deref()
    }

    /// Folder receiving content-page crops
    ///
    /// Falls back to the output folder before the first consent form.
    pub fn target_folder(&self) -> &Path {
        self.active.as_deref().unwrap_or(&self.output_folder)
    }

    /// Remember crops just written into the target folder
    ///
    /// Crops written before the first consent form stay in the output folder
    /// and are never labeled, so they are not recorded.
    pub fn record_crops(&mut self, crops: &[PathBuf]) {
        if self.active.is_some() {
            self.written.extend_from_slice(crops);
        }
    }

    /// Crops recorded for the active folder, in creation order
    pub fn recorded_crops(&self) -> &[PathBuf] {
        &self.written
    }

    /// Close the active folder and open a new one named `stem`
    pub fn begin_user(&mut self, stem: &str) -> Result<FolderOutcome> {
        let outcome = self.close_active()?;

        let folder = self.output_folder.join(stem);
        create_dir(&folder)?;
        info!("Collecting sketches in {}", folder.display());
        self.active = Some(folder);

        Ok(outcome)
    }

    /// Label or shelve the active folder depending on how many files it holds
    pub fn close_active(&mut self) -> Result<FolderOutcome> {
        let Some(folder) = self.active.take() else {
            return Ok(FolderOutcome::Bootstrap);
        };
        let recorded = std::mem::take(&mut self.written);

        let mut files = folder_files(&folder)?;
        if files.len() == CATALOG.len() {
            // Stable sort: unrecorded files keep their natural order at the end
            files.sort_by_key(|file| {
                recorded
                    .iter()
                    .position(|crop| crop == file)
                    .unwrap_or(usize::MAX)
            });
            let moved = self.label_files(&folder, &files)?;
            Ok(FolderOutcome::Labeled { folder, moved })
        } else {
            info!(
                "{} holds {} of {} sketches, moving to {}",
                folder.display(),
                files.len(),
                CATALOG.len(),
                self.unsorted_folder.display()
            );
            let to = self.move_to_unsorted(&folder)?;
            Ok(FolderOutcome::Unsorted { from: folder, to })
        }
    }

    /// Apply the trailing folder policy at the end of a batch
    pub fn finish(&mut self, policy: TrailingFolderPolicy) -> Result<FolderOutcome> {
        match policy {
            TrailingFolderPolicy::Close => self.close_active(),
            TrailingFolderPolicy::Keep => match &self.active {
                Some(folder) => {
                    warn!(
                        "Leaving last user folder {} unsorted and unlabeled",
                        folder.display()
                    );
                    Ok(FolderOutcome::Pending(folder.clone()))
                }
                None => Ok(FolderOutcome::Bootstrap),
            },
        }
    }

    /// Move the i-th file into the i-th catalog folder
    ///
    /// Nothing is moved if any destination already exists.
    fn label_files(&self, folder: &Path, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut moves = Vec::with_capacity(files.len());
        for (file, label) in files.iter().zip(CATALOG) {
            let Some(name) = file.file_name() else {
                continue;
            };
            let destination = self.output_folder.join(label).join(name);
            if destination.exists() {
                return Err(ExtractError::io(
                    format!(
                        "Refusing to overwrite {} with {}",
                        destination.display(),
                        file.display()
                    ),
                    io::Error::from(io::ErrorKind::AlreadyExists),
                ));
            }
            moves.push((file, destination));
        }

        let mut moved = Vec::with_capacity(moves.len());
        for (file, destination) in moves {
            fs::rename(file, &destination).map_err(|e| {
                ExtractError::io(
                    format!("Failed to move {} to {}", file.display(), destination.display()),
                    e,
                )
            })?;
            moved.push(destination);
        }

        fs::remove_dir(folder)
            .map_err(|e| ExtractError::io(format!("Failed to remove {}", folder.display()), e))?;

        info!("Labeled {} sketches from {}", moved.len(), folder.display());
        Ok(moved)
    }

    fn move_to_unsorted(&self, folder: &Path) -> Result<PathBuf> {
        let name = folder.file_name().ok_or_else(|| {
            ExtractError::io(
                format!("Folder has no name: {}", folder.display()),
                io::Error::from(io::ErrorKind::InvalidInput),
            )
        })?;

        let destination = self.unsorted_folder.join(name);
        fs::rename(folder, &destination).map_err(|e| {
            ExtractError::io(
                format!("Failed to move {} to {}", folder.display(), destination.display()),
                e,
            )
        })?;
        Ok(destination)
    }
}

/// Files directly inside `folder`, in natural name order
pub fn folder_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(folder)
        .map_err(|e| ExtractError::io(format!("Failed to list {}", folder.display()), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| ExtractError::io(format!("Failed to list {}", folder.display()), e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| {
        let a = a.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let b = b.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        natural_cmp(&a, &b)
    });
    Ok(files)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| ExtractError::io(format!("Failed to create {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fill(folder: &Path, stems: impl IntoIterator<Item = String>) {
        for stem in stems {
            fs::write(folder.join(format!("{}-0.jpg", stem)), stem.as_bytes()).unwrap();
        }
    }

    fn fill_recorded(state: &mut BatchState, stems: impl IntoIterator<Item = String>) {
        for stem in stems {
            let crop = state.target_folder().join(format!("{}-0.jpg", stem));
            fs::write(&crop, stem.as_bytes()).unwrap();
            state.record_crops(&[crop]);
        }
    }

    fn prepared(dir: &TempDir) -> BatchState {
        let state = BatchState::new(dir.path(), "Unsorted");
        state.prepare().unwrap();
        state
    }

    #[test]
    fn test_prepare_creates_catalog_folders() {
        let dir = TempDir::new().unwrap();
        let state = prepared(&dir);

        assert!(state.unsorted_folder().is_dir());
        for label in CATALOG {
            assert!(dir.path().join(label).is_dir(), "missing {}", label);
        }
        // Idempotent
        state.prepare().unwrap();
    }

    #[test]
    fn test_first_consent_page_bootstraps() {
        let dir = TempDir::new().unwrap();
        let mut state = prepared(&dir);

        assert_eq!(state.target_folder(), dir.path());
        let outcome = state.begin_user("user01").unwrap();

        assert_eq!(outcome, FolderOutcome::Bootstrap);
        assert_eq!(state.active_folder(), Some(dir.path().join("user01").as_path()));
        assert_eq!(state.target_folder(), dir.path().join("user01"));
        assert!(dir.path().join("user01").is_dir());
    }

    #[test]
    fn test_complete_folder_is_labeled() {
        let dir = TempDir::new().unwrap();
        let mut state = prepared(&dir);
        state.begin_user("user01").unwrap();

        let active = state.target_folder().to_path_buf();
        fill(&active, (2..=27).map(|page| format!("scan{}", page)));

        let outcome = state.begin_user("scan28").unwrap();

        match outcome {
            FolderOutcome::Labeled { folder, moved } => {
                assert_eq!(folder, active);
                assert_eq!(moved.len(), 26);
            }
            other => panic!("Expected Labeled, got {:?}", other),
        }

        assert!(!active.exists());
        assert_eq!(state.active_folder(), Some(dir.path().join("scan28").as_path()));

        // Nothing recorded: natural order, scan2 -> first label, scan27 -> last
        assert!(dir.path().join(CATALOG[0]).join("scan2-0.jpg").is_file());
        assert!(dir.path().join(CATALOG[8]).join("scan10-0.jpg").is_file());
        assert!(dir.path().join(CATALOG[25]).join("scan27-0.jpg").is_file());
        for label in CATALOG {
            assert_eq!(fs::read_dir(dir.path().join(label)).unwrap().count(), 1);
        }
    }

    #[test]
    fn test_labels_follow_creation_order() {
        let dir = TempDir::new().unwrap();
        let mut state = prepared(&dir);
        state.begin_user("user01").unwrap();

        // Written newest page first, so name order and creation order disagree
        fill_recorded(&mut state, (1..=26).rev().map(|page| format!("c{}", page)));
        assert_eq!(state.recorded_crops().len(), 26);

        let outcome = state.begin_user("user02").unwrap();
        assert!(matches!(outcome, FolderOutcome::Labeled { .. }));
        assert!(state.recorded_crops().is_empty());

        assert!(dir.path().join(CATALOG[0]).join("c26-0.jpg").is_file());
        assert!(dir.path().join(CATALOG[16]).join("c10-0.jpg").is_file());
        assert!(dir.path().join(CATALOG[25]).join("c1-0.jpg").is_file());
    }

    #[test]
    fn test_crops_before_first_consent_not_recorded() {
        let dir = TempDir::new().unwrap();
        let mut state = prepared(&dir);

        state.record_crops(&[dir.path().join("intro-0.jpg")]);
        assert!(state.recorded_crops().is_empty());
    }

    #[test]
    fn test_labeling_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let mut state = prepared(&dir);
        state.begin_user("user01").unwrap();
        fill_recorded(&mut state, (1..=26).map(|page| format!("c{}", page)));

        let existing = dir.path().join(CATALOG[3]).join("c4-0.jpg");
        fs::write(&existing, b"earlier run").unwrap();

        let result = state.begin_user("user02");
        match result {
            Err(ExtractError::Io { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::AlreadyExists);
            }
            other => panic!("Expected Io error, got {:?}", other),
        }

        // Nothing moved, nothing overwritten
        assert_eq!(folder_files(&dir.path().join("user01")).unwrap().len(), 26);
        assert_eq!(fs::read(&existing).unwrap(), b"earlier run");
        assert_eq!(fs::read_dir(dir.path().join(CATALOG[0])).unwrap().count(), 0);
    }

    #[test]
    fn test_incomplete_folder_moved_intact() {
        let dir = TempDir::new().unwrap();
        let mut state = prepared(&dir);
        state.begin_user("user01").unwrap();
        fill(state.target_folder(), (0..10).map(|page| format!("page{:02}", page)));

        let outcome = state.begin_user("user02").unwrap();

        let moved_to = dir.path().join("Unsorted").join("user01");
        assert_eq!(
            outcome,
            FolderOutcome::Unsorted {
                from: dir.path().join("user01"),
                to: moved_to.clone(),
            }
        );
        assert!(!dir.path().join("user01").exists());

        let files = folder_files(&moved_to).unwrap();
        assert_eq!(files.len(), 10);
        assert_eq!(files[0].file_name().unwrap(), "page00-0.jpg");
        assert_eq!(files[9].file_name().unwrap(), "page09-0.jpg");
    }

    #[test]
    fn test_near_complete_folders_are_unsorted() {
        for count in [25usize, 27] {
            let dir = TempDir::new().unwrap();
            let mut state = prepared(&dir);
            state.begin_user("user01").unwrap();
            fill(state.target_folder(), (0..count).map(|page| format!("p{}", page)));

            let outcome = state.begin_user("user02").unwrap();
            assert!(
                matches!(outcome, FolderOutcome::Unsorted { .. }),
                "{} files should not be labeled",
                count
            );
            for label in CATALOG {
                assert_eq!(fs::read_dir(dir.path().join(label)).unwrap().count(), 0);
            }
        }
    }

    #[test]
    fn test_empty_folder_is_unsorted() {
        let dir = TempDir::new().unwrap();
        let mut state = prepared(&dir);
        state.begin_user("user01").unwrap();

        let outcome = state.begin_user("user02").unwrap();
        assert!(matches!(outcome, FolderOutcome::Unsorted { .. }));
        assert!(dir.path().join("Unsorted").join("user01").is_dir());
    }

    #[test]
    fn test_finish_keep_leaves_folder() {
        let dir = TempDir::new().unwrap();
        let mut state = prepared(&dir);
        state.begin_user("user01").unwrap();
        fill(state.target_folder(), (0..3).map(|page| format!("p{}", page)));

        let outcome = state.finish(TrailingFolderPolicy::Keep).unwrap();
        assert_eq!(outcome, FolderOutcome::Pending(dir.path().join("user01")));
        assert_eq!(folder_files(&dir.path().join("user01")).unwrap().len(), 3);
    }

    #[test]
    fn test_finish_close_applies_rule() {
        let dir = TempDir::new().unwrap();
        let mut state = prepared(&dir);
        state.begin_user("user01").unwrap();
        fill(state.target_folder(), (0..26).map(|page| format!("p{}", page)));

        let outcome = state.finish(TrailingFolderPolicy::Close).unwrap();
        assert!(matches!(outcome, FolderOutcome::Labeled { .. }));
        assert_eq!(state.active_folder(), None);
    }

    #[test]
    fn test_finish_without_active_folder() {
        let dir = TempDir::new().unwrap();
        let mut state = prepared(&dir);
        assert_eq!(
            state.finish(TrailingFolderPolicy::Keep).unwrap(),
            FolderOutcome::Bootstrap
        );
        assert_eq!(
            state.finish(TrailingFolderPolicy::Close).unwrap(),
            FolderOutcome::Bootstrap
        );
    }
}
