use crate::error::{Result, VerifyError};
use globset::{GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Async discovery of candidate feed files under a root path
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    /// File name suffixes to include, without the dot (e.g., ["xml", "rss"])
    extensions: Vec<String>,
    /// Include patterns set
    include_set: Option<GlobSet>,
    /// Exclude patterns set
    exclude_set: Option<GlobSet>,
    /// Maximum depth for directory traversal (None = unlimited)
    max_depth: Option<usize>,
    /// Follow symbolic links
    follow_symlinks: bool,
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self {
            extensions: vec!["xml".to_string(), "rss".to_string()],
            include_set: None,
            exclude_set: None,
            max_depth: None,
            follow_symlinks: false,
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_include_patterns(mut self, patterns: Vec<String>) -> Result<Self> {
        self.include_set = build_glob_set(&patterns, "include")?;
        Ok(self)
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Result<Self> {
        self.exclude_set = build_glob_set(&patterns, "exclude")?;
        Ok(self)
    }

    /// Set maximum traversal depth; entries directly under the root are at depth 0
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Discover feed files under `path` (file or directory).
    ///
    /// Directory entries are visited in lexical order, so the same tree always
    /// yields the same sequence. Any I/O error aborts discovery.
    pub async fn discover_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| traversal_error(path, e))?;

        if metadata.is_file() {
            return Ok(if self.should_process(path) {
                vec![path.to_path_buf()]
            } else {
                Vec::new()
            });
        }

        let mut files = Vec::new();
        for entry_path in self.sorted_entries(path).await? {
            self.discover_files_recursive(&entry_path, 0, &mut files)
                .await?;
        }

        Ok(files)
    }

    /// Recursive helper for discovering files
    fn discover_files_recursive<'a>(
        &'a self,
        path: &'a Path,
        depth: usize,
        files: &'a mut Vec<PathBuf>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + 'a>> {
        Box::pin(async move {
            if let Some(max_depth) = self.max_depth
                && depth > max_depth
            {
                return Ok(());
            }

            let metadata = fs::metadata(path)
                .await
                .map_err(|e| traversal_error(path, e))?;

            if metadata.is_file() {
                if self.should_process(path) {
                    debug!(path = %path.display(), "found feed file");
                    files.push(path.to_path_buf());
                }
            } else if metadata.is_dir() {
                if let Some(max_depth) = self.max_depth
                    && depth >= max_depth
                {
                    return Ok(());
                }

                for entry_path in self.sorted_entries(path).await? {
                    self.discover_files_recursive(&entry_path, depth + 1, files)
                        .await?;
                }
            }

            Ok(())
        })
    }

    /// Directory entries in lexical order, minus symlinks unless we follow them
    async fn sorted_entries(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut read_dir = fs::read_dir(dir)
            .await
            .map_err(|e| traversal_error(dir, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| traversal_error(dir, e))?
        {
            let entry_path = entry.path();
            if entry_path.is_symlink() && !self.follow_symlinks {
                continue;
            }
            entries.push(entry_path);
        }

        entries.sort();
        Ok(entries)
    }

    /// Check if a file should be processed based on its name and the patterns
    pub fn should_process(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        let matches_extension = self
            .extensions
            .iter()
            .any(|ext| name.ends_with(&format!(".{}", ext)));
        if !matches_extension {
            return false;
        }

        if let Some(exclude_set) = &self.exclude_set
            && exclude_set.is_match(path)
        {
            return false;
        }

        // If any include patterns are given, at least one must match
        if let Some(include_set) = &self.include_set {
            return include_set.is_match(path);
        }

        true
    }
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

fn build_glob_set(patterns: &[String], kind: &str) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = globset::GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                VerifyError::Config(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
        builder.add(glob);
    }

    let set = builder.build().map_err(|e| {
        VerifyError::Config(format!("Failed to build {} glob set: {}", kind, e))
    })?;
    Ok(Some(set))
}

fn traversal_error(path: &Path, error: std::io::Error) -> VerifyError {
    VerifyError::FileSystemTraversal {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}
