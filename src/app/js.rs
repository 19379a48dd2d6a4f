use crate::app::css;
use crate::app::error::{BuildError, BuildResult};
use crate::app::files::{read_source, write_output};
use crate::app::models::{AssetClass, BuildConfig, BuildOptions, BuildPaths};
use crate::app::patterns::{self, asset_root};
use crate::app::scanner::{match_files, MatchOptions};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions};
use oxc::minifier::{CompressOptions, MangleOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use std::path::{Path, PathBuf};

/// Suffix marking a bundle that is already optimized.
const PRE_MINIFIED_SUFFIX: &str = ".min.js";

/// How a single script is transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsMode {
    /// Written as-is, comments and structure untouched.
    PassThrough,
    /// Console and debugger statements dropped, locals mangled, no comments.
    Minify,
    /// Re-printed for reading with leading comments kept. Nothing is renamed.
    Beautify,
}

impl JsMode {
    pub fn for_file(path: &Path, minify: bool) -> Self {
        let pre_minified = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(PRE_MINIFIED_SUFFIX));

        if pre_minified {
            JsMode::PassThrough
        } else if minify {
            JsMode::Minify
        } else {
            JsMode::Beautify
        }
    }
}

/// Transforms one script's source according to `mode`.
pub fn transform(source: &str, mode: JsMode) -> Result<String, String> {
    if mode == JsMode::PassThrough {
        return Ok(source.to_string());
    }

    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if let Some(error) = parsed.errors.first() {
        return Err(error.to_string());
    }
    let mut program = parsed.program;

    let code = match mode {
        JsMode::Minify => {
            let options = MinifierOptions {
                mangle: Some(MangleOptions::default()),
                compress: Some(CompressOptions {
                    drop_console: true,
                    drop_debugger: true,
                    ..CompressOptions::default()
                }),
            };
            let minified = Minifier::new(options).build(&allocator, &mut program);
            Codegen::new()
                .with_options(CodegenOptions {
                    minify: true,
                    comments: false,
                    ..CodegenOptions::default()
                })
                .with_scoping(minified.scoping)
                .build(&program)
                .code
        }
        _ => {
            Codegen::new()
                .with_options(CodegenOptions {
                    minify: false,
                    comments: true,
                    ..CodegenOptions::default()
                })
                .build(&program)
                .code
        }
    };

    Ok(code)
}

fn js_patterns(extension: &str, config: &BuildConfig) -> Vec<String> {
    let mut globs = vec![format!("{}/**/*.{}", asset_root(AssetClass::Js), extension)];
    globs.extend(patterns::compile(AssetClass::Js, config));
    globs
}

/// Processes `src/assets/js/**/*.js` and relocates stylesheets that live
/// in the same tree, both into the mirrored `dist/assets/js` paths.
pub fn process_js(
    paths: &BuildPaths,
    config: &BuildConfig,
    options: &BuildOptions,
) -> BuildResult<Vec<PathBuf>> {
    let minify = options.minify();
    log::info!(
        "⚙️  Processing JavaScript files ({})...",
        if minify { "minified" } else { "beautified" }
    );

    let src = paths.src();
    let dist = paths.dist();
    let mut written = Vec::new();

    let scripts = match_files(&paths.root, &js_patterns("js", config), MatchOptions::default())?;
    for file in scripts {
        let Some(dest) = paths.rebase(&file, &src, &dist) else {
            continue;
        };
        let mode = JsMode::for_file(&file, minify);
        log::debug!("JS ({:?}) {} -> {}", mode, file.display(), dest.display());

        let source = read_source(&file)?;
        let code = transform(&source, mode).map_err(|message| BuildError::Js {
            path: file.clone(),
            message,
        })?;
        write_output(&dest, code)?;
        written.push(dest);
    }

    let stylesheets = match_files(&paths.root, &js_patterns("css", config), MatchOptions::default())?;
    for file in stylesheets {
        let Some(dest) = paths.rebase(&file, &src, &dist) else {
            continue;
        };
        css::transform_file(&file, &dest, minify)?;
        written.push(dest);
    }

    Ok(written)
}
