use crate::app::models::BuildOptions;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Build the static site from src/ into a deployable dist/"
)]
pub struct Cli {
    /// Minify CSS, compiled themes and JavaScript
    #[arg(long)]
    pub minify: bool,

    /// Tree-shake compiled theme CSS against the generated HTML
    #[arg(long)]
    pub purge_css: bool,

    /// Build the lite version (implies --minify and --purge-css)
    #[arg(long)]
    pub lite: bool,

    /// Only clean the dist directory
    #[arg(long)]
    pub clean_only: bool,

    /// Skip copying images
    #[arg(long)]
    pub skip_images: bool,
}

impl Cli {
    pub fn options(&self) -> BuildOptions {
        BuildOptions {
            minify: self.minify,
            purge_css: self.purge_css,
            lite: self.lite,
            clean_only: self.clean_only,
            skip_images: self.skip_images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_to_off() {
        let cli = Cli::try_parse_from(["site-build"]).unwrap();
        assert_eq!(cli.options(), BuildOptions::default());
    }

    #[test]
    fn kebab_case_flags_are_accepted() {
        let cli = Cli::try_parse_from(["site-build", "--purge-css", "--skip-images", "--clean-only"])
            .unwrap();
        let options = cli.options();
        assert!(options.purge_css && options.skip_images && options.clean_only);
        assert!(!options.minify());
    }
}
