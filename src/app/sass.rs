use crate::app::css;
use crate::app::error::{BuildError, BuildResult};
use crate::app::files::{read_source, write_output};
use crate::app::models::{BuildConfig, BuildOptions, BuildPaths, SRC_FOLDER};
use crate::app::purge::Purger;
use crate::app::scanner::{match_files, MatchOptions};
use grass::{Options, OutputStyle};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;

/// Compiler settings after folding `sassOptions` over the mode defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SassSettings {
    pub compressed: bool,
    pub charset: bool,
    pub quiet: bool,
    pub load_paths: Vec<PathBuf>,
}

impl SassSettings {
    pub fn resolve(options: &BTreeMap<String, Value>, minify: bool, root: &Path) -> Self {
        let mut settings = SassSettings {
            compressed: minify,
            charset: false,
            quiet: false,
            load_paths: vec![root.join("node_modules")],
        };

        for (key, value) in options {
            match (key.as_str(), value) {
                ("style", Value::String(style)) => match style.as_str() {
                    "compressed" => settings.compressed = true,
                    "expanded" => settings.compressed = false,
                    other => log::warn!("⚠️ Unknown sass style '{}', keeping default", other),
                },
                ("charset", Value::Boolean(charset)) => settings.charset = *charset,
                ("quietDeps", Value::Boolean(quiet)) => settings.quiet |= *quiet,
                ("silenceDeprecations", Value::Array(list)) => settings.quiet |= !list.is_empty(),
                ("loadPaths", Value::Array(list)) => settings
                    .load_paths
                    .extend(list.iter().filter_map(Value::as_str).map(|p| root.join(p))),
                _ => log::debug!("Ignoring sass option {} = {}", key, value),
            }
        }

        settings
    }

    fn compile(&self, entry: &Path) -> BuildResult<String> {
        let style = if self.compressed {
            OutputStyle::Compressed
        } else {
            OutputStyle::Expanded
        };
        let options = Options::default()
            .style(style)
            .load_paths(self.load_paths.as_slice())
            .allows_charset(self.charset)
            .quiet(self.quiet);

        grass::from_path(entry, &options).map_err(|e| BuildError::Sass {
            path: entry.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Builds the purger from every HTML file already written under `dist/`.
fn html_purger(paths: &BuildPaths, config: &BuildConfig) -> BuildResult<Purger> {
    let pages = match_files(&paths.root, &["dist/**/*.html"], MatchOptions::default())?;
    let contents = pages
        .iter()
        .map(|page| read_source(page))
        .collect::<BuildResult<Vec<_>>>()?;
    log::debug!("Purging against {} HTML page(s)", contents.len());
    Ok(Purger::new(contents, &config.purge_css_safe_list))
}

/// Compiles every `src/assets/scss/theme/*.scss` to
/// `dist/assets/css/theme/<name>.min.css`, or to `<name>.purge.css` when
/// purging. Purging reads the generated HTML, so the HTML stage must have
/// finished first.
pub fn compile_themes(
    paths: &BuildPaths,
    config: &BuildConfig,
    options: &BuildOptions,
) -> BuildResult<Vec<PathBuf>> {
    let minify = options.minify();
    log::info!(
        "🎨 Compiling SCSS ({})...",
        if minify { "minified" } else { "beautified" }
    );

    let settings = SassSettings::resolve(&config.sass_options, minify, &paths.root);
    let entries = match_files(
        &paths.root,
        &[format!("{}/assets/scss/theme/*.scss", SRC_FOLDER)],
        MatchOptions::default(),
    )?;
    let theme_out = paths.dist().join("assets/css/theme");

    let purger = if options.purge() && !entries.is_empty() {
        Some(html_purger(paths, config)?)
    } else {
        None
    };

    let mut written = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(stem) = entry.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        log::debug!("Compiling {}", entry.display());

        let compiled = settings.compile(&entry)?;
        let name = entry.display().to_string();
        let styled = css::transform_named(&compiled, minify, &name).map_err(|message| BuildError::Css {
            path: entry.clone(),
            message,
        })?;

        let min_path = theme_out.join(format!("{}.min.css", stem));
        write_output(&min_path, &styled)?;

        let Some(purger) = &purger else {
            written.push(min_path);
            continue;
        };

        let purged = css::transform_named(&purger.purge(&styled), minify, &name).map_err(|message| {
            BuildError::Css {
                path: entry.clone(),
                message,
            }
        })?;
        let purge_path = theme_out.join(format!("{}.purge.css", stem));
        write_output(&purge_path, purged)?;
        fs::remove_file(&min_path).map_err(|e| BuildError::io(&min_path, e))?;
        written.push(purge_path);
    }

    Ok(written)
}
