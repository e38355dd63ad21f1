//! Directory walking implementation using walkdir.

use super::{filter::PictureFilter, PictureScanner};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files
    pub include_hidden: bool,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            extensions: None,
        }
    }
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: PictureFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = PictureFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }

        Self { config, filter }
    }

    /// Scan a single root. Entries within a directory come back in
    /// lexicographic order.
    fn scan_directory(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<Vec<PathBuf>, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let root = root
            .canonicalize()
            .map_err(|source| ScanError::ReadDirectory {
                path: root.to_path_buf(),
                source,
            })?;

        let mut pictures = Vec::new();
        let walker = WalkDir::new(&root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                match e.io_error().map(|io| io.kind()) {
                    Some(std::io::ErrorKind::PermissionDenied) => {
                        ScanError::PermissionDenied { path }
                    }
                    _ => ScanError::ReadDirectory {
                        path,
                        source: e
                            .into_io_error()
                            .unwrap_or_else(|| std::io::Error::other("filesystem loop")),
                    },
                }
            })?;

            if !entry.file_type().is_file() && !(entry.path_is_symlink() && entry.path().is_file())
            {
                continue;
            }

            if !self.filter.should_include(entry.path()) {
                continue;
            }

            events.send(Event::Scan(ScanEvent::PictureFound {
                path: entry.path().to_path_buf(),
            }));
            pictures.push(entry.into_path());
        }

        Ok(pictures)
    }
}

impl PictureScanner for WalkDirScanner {
    fn scan_with_events(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<Vec<PathBuf>, ScanError> {
        events.send(Event::Scan(ScanEvent::Started {
            paths: paths.to_vec(),
        }));

        // Overlapping roots would otherwise report a file once per root.
        let mut seen = HashSet::new();
        let mut all = Vec::new();
        for path in paths {
            for picture in self.scan_directory(path, events)? {
                if seen.insert(picture.clone()) {
                    all.push(picture);
                }
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_pictures: all.len(),
        }));

        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_picture(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        path
    }

    #[test]
    fn scan_empty_directory_returns_empty_vec() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = WalkDirScanner::new(ScanConfig::default());

        let pictures = scanner.scan(&[temp_dir.path().to_path_buf()]).unwrap();

        assert!(pictures.is_empty());
    }

    #[test]
    fn scan_returns_siblings_in_lexicographic_order() {
        let temp_dir = TempDir::new().unwrap();
        create_test_picture(temp_dir.path(), "c.jpg");
        create_test_picture(temp_dir.path(), "a.nef");
        create_test_picture(temp_dir.path(), "b.CR2");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let pictures = scanner.scan(&[temp_dir.path().to_path_buf()]).unwrap();

        let names: Vec<_> = pictures
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.nef", "b.CR2", "c.jpg"]);
    }

    #[test]
    fn scan_returns_absolute_paths() {
        let temp_dir = TempDir::new().unwrap();
        create_test_picture(temp_dir.path(), "a.jpg");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let pictures = scanner.scan(&[temp_dir.path().to_path_buf()]).unwrap();

        assert!(pictures[0].is_absolute());
    }

    #[test]
    fn overlapping_roots_report_each_picture_once() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        create_test_picture(temp_dir.path(), "top.jpg");
        create_test_picture(&sub, "photo.cr2");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let pictures = scanner
            .scan(&[
                temp_dir.path().to_path_buf(),
                sub.clone(),
                temp_dir.path().to_path_buf(),
            ])
            .unwrap();

        assert_eq!(pictures.len(), 2);
        assert!(pictures[0].ends_with("sub/photo.cr2"));
        assert!(pictures[1].ends_with("top.jpg"));
    }

    #[test]
    fn scan_excludes_non_picture_files() {
        let temp_dir = TempDir::new().unwrap();
        create_test_picture(temp_dir.path(), "photo.jpg");
        File::create(temp_dir.path().join("photo.xmp")).unwrap();
        File::create(temp_dir.path().join("notes.txt")).unwrap();

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let pictures = scanner.scan(&[temp_dir.path().to_path_buf()]).unwrap();

        assert_eq!(pictures.len(), 1);
        assert!(pictures[0].ends_with("photo.jpg"));
    }

    #[test]
    fn scan_traverses_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("2019").join("trip");
        fs::create_dir_all(&subdir).unwrap();

        create_test_picture(temp_dir.path(), "root.jpg");
        create_test_picture(&subdir, "nested.nef");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let pictures = scanner.scan(&[temp_dir.path().to_path_buf()]).unwrap();

        assert_eq!(pictures.len(), 2);
    }

    #[test]
    fn scan_concatenates_multiple_roots() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        create_test_picture(first.path(), "a.jpg");
        create_test_picture(second.path(), "b.jpg");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let pictures = scanner
            .scan(&[first.path().to_path_buf(), second.path().to_path_buf()])
            .unwrap();

        assert_eq!(pictures.len(), 2);
        assert!(pictures[0].ends_with("a.jpg"));
        assert!(pictures[1].ends_with("b.jpg"));
    }

    #[test]
    fn scan_nonexistent_directory_is_fatal() {
        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&[PathBuf::from("/nonexistent/path/12345")]);

        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }
}
