use crate::app::models::{AssetClass, BuildConfig, SRC_FOLDER};

/// Root pattern prefix for an asset class, e.g. `src/assets/js`.
pub fn asset_root(class: AssetClass) -> String {
    format!("{}/assets/{}", SRC_FOLDER, class.as_str())
}

/// Negated globs for everything blacklisted under `class`: each file name
/// at any depth, then each folder glob directly under the asset root.
pub fn compile(class: AssetClass, config: &BuildConfig) -> Vec<String> {
    let Some(blacklist) = config.blacklist(class) else {
        return Vec::new();
    };
    let root = asset_root(class);

    let files = blacklist
        .files
        .iter()
        .map(|file| format!("!{}/**/{}", root, normalize(file)));
    let folders = blacklist
        .folders
        .iter()
        .map(|folder| format!("!{}/{}", root, normalize(folder)));

    files.chain(folders).collect()
}

fn normalize(segment: &str) -> String {
    segment.replace('\\', "/").trim_start_matches('/').to_string()
}
