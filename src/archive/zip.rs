use crate::runtime::Runtime;
use anyhow::{Context, Result};
use log::debug;
use std::io::{Cursor, Write};
use std::path::{Component, Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{PluginLayout, Route};

/// Join path components with `/` so ledger entries read the same on every platform.
fn to_manifest_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Extract the entries of an in-memory zip archive selected by `layout` into
/// `target`, returning the installed file paths relative to `target`.
///
/// Directory entries are created but not returned. Entries whose names would
/// escape the destination are skipped.
#[tracing::instrument(level = "debug", skip(runtime, archive, layout))]
pub fn extract_routed<R: Runtime>(
    runtime: &R,
    archive: &[u8],
    target: &Path,
    layout: &PluginLayout,
) -> Result<Vec<String>> {
    let mut archive =
        ZipArchive::new(Cursor::new(archive)).context("Failed to parse ZIP archive")?;
    let plugins_dir = PathBuf::from(&layout.plugins_subpath);
    let mut installed = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read ZIP entry {}", i))?;

        let name = entry.name().to_string();
        let base = match layout.route(&name) {
            Route::Root => PathBuf::new(),
            Route::Plugins => plugins_dir.clone(),
            Route::Skip => {
                debug!("Skipping {}", name);
                continue;
            }
        };

        let entry_path = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => {
                debug!("Skipping entry with unsafe path {}", name);
                continue;
            }
        };

        let relative = base.join(&entry_path);
        let full_path = target.join(&relative);
        debug!("Installing {} to {:?}", name, full_path);

        if entry.is_dir() {
            runtime.create_dir_all(&full_path)?;
            continue;
        }

        if let Some(parent) = full_path.parent() {
            runtime.create_dir_all(parent)?;
        }
        let mut dest_file = runtime.create_file(&full_path)?;
        std::io::copy(&mut entry, &mut dest_file)
            .with_context(|| format!("Failed to extract file {:?}", full_path))?;

        installed.push(to_manifest_path(&relative));
    }

    Ok(installed)
}

/// Pack the whole contents of `source` into a new zip file at `dest`.
///
/// The archive is assembled in memory and written in one go.
#[tracing::instrument(level = "debug", skip(runtime))]
pub fn write_directory<R: Runtime>(runtime: &R, source: &Path, dest: &Path) -> Result<()> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options: FileOptions<()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in runtime.walk_dir(source)? {
        let relative = path
            .strip_prefix(source)
            .context("Walked outside of the source directory")?;
        let name = to_manifest_path(relative);

        if runtime.is_dir(&path) {
            zip.add_directory(format!("{}/", name), options)?;
        } else {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(&runtime.read(&path)?)
                .with_context(|| format!("Failed to pack {:?}", path))?;
        }
    }

    let archive = zip
        .finish()
        .context("Failed to finish ZIP archive")?
        .into_inner();
    runtime.write(dest, &archive)?;
    debug!("Packed {:?} into {:?}", source, dest);
    Ok(())
}
