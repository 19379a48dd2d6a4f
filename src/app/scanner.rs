use crate::app::error::BuildResult;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use pathdiff::diff_paths;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Traversal switches for a single match.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchOptions {
    /// Let wildcards descend into and match dot-files and dot-directories.
    pub dot: bool,
}

/// Resolves `!`-aware glob lists, relative to a project root, into files.
pub struct Scanner {
    root: PathBuf,
    bases: Vec<PathBuf>,
    include_set: GlobSet,
    exclude_set: GlobSet,
    options: MatchOptions,
}

impl Scanner {
    pub fn new<S: AsRef<str>>(root: &Path, patterns: &[S], options: MatchOptions) -> BuildResult<Self> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match pattern.strip_prefix('!') {
                Some(negated) => exclude.push(negated.to_string()),
                None => include.push(pattern.to_string()),
            }
        }

        let mut bases: Vec<PathBuf> = include.iter().map(|p| root.join(literal_prefix(p))).collect();
        bases.sort();
        bases.dedup();

        Ok(Self {
            root: root.to_path_buf(),
            bases,
            include_set: build_globset(&include)?,
            exclude_set: build_globset(&exclude)?,
            options,
        })
    }

    /// Walks only the literal base of each positive pattern. The result is
    /// sorted so repeated runs over the same tree agree.
    pub fn scan(&self) -> BuildResult<Vec<PathBuf>> {
        let mut found = BTreeSet::new();

        for base in &self.bases {
            if !base.exists() {
                log::debug!("Pattern base {} does not exist", base.display());
                continue;
            }

            let walker = WalkBuilder::new(base)
                .hidden(!self.options.dot)
                .ignore(false)
                .git_ignore(false)
                .git_global(false)
                .git_exclude(false)
                .parents(false)
                .build();

            for result in walker {
                let entry = result?;
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                if self.is_match(entry.path()) {
                    found.insert(entry.path().to_path_buf());
                }
            }
        }

        Ok(found.into_iter().collect())
    }

    fn is_match(&self, path: &Path) -> bool {
        let Some(relative) = diff_paths(path, &self.root) else {
            return false;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");

        // Excludes override everything
        if self.exclude_set.is_match(&relative) {
            return false;
        }
        self.include_set.is_match(&relative)
    }
}

/// Convenience wrapper: build a [`Scanner`] and run it once.
pub fn match_files<S: AsRef<str>>(
    root: &Path,
    patterns: &[S],
    options: MatchOptions,
) -> BuildResult<Vec<PathBuf>> {
    Scanner::new(root, patterns, options)?.scan()
}

/// The leading path segments of `pattern` that contain no glob syntax.
fn literal_prefix(pattern: &str) -> PathBuf {
    pattern
        .split('/')
        .take_while(|segment| !segment.contains(['*', '?', '[', '{']))
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}

/// `*` stays within one path segment; `**` crosses them.
fn build_globset(patterns: &[String]) -> BuildResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(GlobBuilder::new(pat).literal_separator(true).build()?);
    }
    Ok(builder.build()?)
}
