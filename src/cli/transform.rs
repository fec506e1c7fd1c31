//! `hotpatch transform`: instrument component files ahead of time.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::HotpatchConfig;
use crate::instrument::{InstrumentOptions, Instrumented, instrument};
use crate::log;

/// Instrument `paths`, printing to stdout or writing below `output`.
pub fn transform_files(
    paths: &[PathBuf],
    output: Option<&Path>,
    config: &HotpatchConfig,
) -> Result<()> {
    let options = config.instrument_options();
    if !options.mode.is_dev() {
        log!("transform"; "{} mode, sources are copied unchanged", options.mode.name());
    }

    let mut stdout = std::io::stdout().lock();
    for path in paths {
        let result = transform_file(path, &options)?;
        match output {
            Some(dir) => {
                let dest = dir.join(output_name(config.get_root(), path));
                write_output(&dest, &result.code)?;
                log!(
                    "transform";
                    "{} -> {} ({} component{})",
                    config.module_id(path),
                    dest.display(),
                    result.components.len(),
                    if result.components.len() == 1 { "" } else { "s" }
                );
            }
            None => stdout.write_all(result.code.as_bytes())?,
        }
    }
    Ok(())
}

fn transform_file(path: &Path, options: &InstrumentOptions) -> Result<Instrumented> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(instrument(&source, path, options)?)
}

/// Root-relative location inside the output directory, or the bare file
/// name for sources outside the root.
fn output_name(root: &Path, path: &Path) -> PathBuf {
    let absolute = crate::utils::path::normalize_path(path);
    match absolute.strip_prefix(root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => path.file_name().map(PathBuf::from).unwrap_or_default(),
    }
}

fn write_output(dest: &Path, code: &str) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(dest, code).with_context(|| format!("failed to write {}", dest.display()))
}
