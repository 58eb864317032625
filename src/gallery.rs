//! Paginated browser over the saved images directory.

use anyhow::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Images shown per page on the touchscreen list.
pub const DEFAULT_PER_PAGE: usize = 4;

fn image_file_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\.jpe?g$").expect("valid pattern"))
}

/// Newest-first, page-at-a-time view of the image directory.
pub struct Gallery {
    dir: PathBuf,
    per_page: usize,
    files: Vec<String>,
    page: usize,
}

impl Gallery {
    pub fn new(dir: impl Into<PathBuf>, per_page: usize) -> Self {
        assert!(per_page > 0, "page size must be positive");
        Self {
            dir: dir.into(),
            per_page,
            files: Vec::new(),
            page: 0,
        }
    }

    /// Re-reads the directory. A missing directory is an empty gallery,
    /// not an error. Timestamped names sort newest-first under the
    /// reverse lexicographic order used here.
    pub fn refresh(&mut self) -> Result<()> {
        self.files.clear();

        if self.dir.exists() {
            for entry in std::fs::read_dir(&self.dir)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().to_string();
                if entry.path().is_file() && image_file_pattern().is_match(&name) {
                    self.files.push(name);
                }
            }
            self.files.sort_by(|a, b| b.cmp(a));
        }

        // Keep the page valid after deletions or renames.
        self.page = self.page.min(self.total_pages() - 1);
        Ok(())
    }

    pub fn total_pages(&self) -> usize {
        self.files.len().div_ceil(self.per_page).max(1)
    }

    /// File names on the current page.
    pub fn page_files(&self) -> &[String] {
        let start = self.page * self.per_page;
        let end = (start + self.per_page).min(self.files.len());
        if start >= self.files.len() {
            &[]
        } else {
            &self.files[start..end]
        }
    }

    /// Full path for a file name returned by `page_files`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn image_dir(&self) -> &Path {
        &self.dir
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    /// Advances one page; returns false at the last page.
    pub fn next_page(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Goes back one page; returns false at the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Indicator text like "2/5" for the navigation bar.
    pub fn page_indicator(&self) -> String {
        format!("{}/{}", self.page + 1, self.total_pages())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_gallery(names: &[&str], per_page: usize) -> (tempfile::TempDir, Gallery) {
        let dir = tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), b"img").unwrap();
        }
        let mut gallery = Gallery::new(dir.path(), per_page);
        gallery.refresh().unwrap();
        (dir, gallery)
    }

    #[test]
    fn test_missing_directory_is_empty_single_page() {
        let mut gallery = Gallery::new("/nonexistent/for/sure", 4);
        gallery.refresh().unwrap();
        assert_eq!(gallery.total_pages(), 1);
        assert!(gallery.page_files().is_empty());
        assert_eq!(gallery.page_indicator(), "1/1");
    }

    #[test]
    fn test_only_image_files_are_listed_newest_first() {
        let (_dir, gallery) = make_gallery(
            &[
                "image_20240101_120000.jpg",
                "image_20240102_120000.jpg",
                "notes.txt",
                "scan.JPEG",
            ],
            10,
        );
        assert_eq!(
            gallery.page_files(),
            &[
                "scan.JPEG".to_string(),
                "image_20240102_120000.jpg".to_string(),
                "image_20240101_120000.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_pagination_arithmetic() {
        let names: Vec<String> = (0..9).map(|i| format!("image_0{}.jpg", i)).collect();
        let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let (_dir, mut gallery) = make_gallery(&refs, 4);

        assert_eq!(gallery.total_pages(), 3);
        assert_eq!(gallery.page_files().len(), 4);
        assert!(!gallery.has_prev());

        assert!(gallery.next_page());
        assert_eq!(gallery.page_indicator(), "2/3");
        assert!(gallery.next_page());
        assert_eq!(gallery.page_files().len(), 1);
        assert!(!gallery.next_page());

        assert!(gallery.prev_page());
        assert_eq!(gallery.page_indicator(), "2/3");
    }

    #[test]
    fn test_refresh_clamps_page_after_deletions() {
        let names: Vec<String> = (0..8).map(|i| format!("image_0{}.jpg", i)).collect();
        let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let (dir, mut gallery) = make_gallery(&refs, 4);

        gallery.next_page();
        assert_eq!(gallery.page_indicator(), "2/2");

        for name in &names[..5] {
            std::fs::remove_file(dir.path().join(name)).unwrap();
        }
        gallery.refresh().unwrap();
        assert_eq!(gallery.page_indicator(), "1/1");
        assert_eq!(gallery.page_files().len(), 3);
    }

    #[test]
    fn test_path_for_joins_directory() {
        let (dir, gallery) = make_gallery(&["a.jpg"], 4);
        assert_eq!(gallery.path_for("a.jpg"), dir.path().join("a.jpg"));
    }
}
