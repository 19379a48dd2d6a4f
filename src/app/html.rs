use crate::app::error::BuildResult;
use crate::app::files::{read_source, write_output};
use crate::app::models::{BuildOptions, BuildPaths, SRC_FOLDER};
use crate::app::scanner::{match_files, MatchOptions};
use regex::Regex;
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::OnceLock;

fn theme_reference() -> &'static Regex {
    static THEME_REFERENCE: OnceLock<Regex> = OnceLock::new();
    THEME_REFERENCE.get_or_init(|| {
        Regex::new(r"assets/s?css/theme/(.*?)\.s?css").expect("theme reference pattern is valid")
    })
}

/// Points every theme stylesheet reference at its built file:
/// `assets/css/theme/<name>.min.css`, or `.purge.css` when purging.
pub fn rewrite_theme_references(content: &str, purge: bool) -> Cow<'_, str> {
    let replacement = if purge {
        "assets/css/theme/${1}.purge.css"
    } else {
        "assets/css/theme/${1}.min.css"
    };
    theme_reference().replace_all(content, replacement)
}

/// Copies `src/**/*.html` into `dist/` with theme references rewritten.
pub fn process_html(paths: &BuildPaths, options: &BuildOptions) -> BuildResult<Vec<PathBuf>> {
    log::info!("📄 Processing HTML files...");

    let files = match_files(
        &paths.root,
        &[format!("{}/**/*.html", SRC_FOLDER)],
        MatchOptions::default(),
    )?;
    let src = paths.src();
    let dist = paths.dist();
    let mut written = Vec::with_capacity(files.len());

    for file in files {
        let Some(dest) = paths.rebase(&file, &src, &dist) else {
            continue;
        };
        let content = read_source(&file)?;
        let rewritten = rewrite_theme_references(&content, options.purge());
        log::debug!("HTML {} -> {}", file.display(), dest.display());
        write_output(&dest, rewritten.as_bytes())?;
        written.push(dest);
    }

    Ok(written)
}
