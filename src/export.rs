use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    engine::compose::{ComposedImage, CompositionResult},
    foundation::error::{PimgError, PimgResult},
};

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> PimgResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Write one image's bytes verbatim to `dest`.
pub fn export_image(image: &ComposedImage, dest: &Path) -> PimgResult<()> {
    ensure_parent_dir(dest)?;
    std::fs::write(dest, &image.bytes)
        .with_context(|| format!("write png '{}'", dest.display()))?;
    Ok(())
}

/// Write the image named `name` from `result` to `dest`.
pub fn export_one(result: &CompositionResult, name: &str, dest: &Path) -> PimgResult<()> {
    let image = result
        .get(name)
        .ok_or_else(|| PimgError::validation(format!("no image named '{name}'")))?;
    export_image(image, dest)
}

/// File name `{name}.png` for an image, refusing names that would leave the output directory.
pub fn export_file_name(name: &str) -> PimgResult<String> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || Path::new(name).is_absolute();
    if bad {
        return Err(PimgError::validation(format!(
            "image name '{name}' cannot be used as a file name"
        )));
    }
    Ok(format!("{name}.png"))
}

/// Write every image of `result` into `dir` as `{name}.png`. Returns the written paths.
///
/// Every name is checked before anything is written.
pub fn export_all(result: &CompositionResult, dir: &Path) -> PimgResult<Vec<PathBuf>> {
    let files = result
        .iter()
        .map(|image| Ok((image, export_file_name(&image.name)?)))
        .collect::<PimgResult<Vec<_>>>()?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
    let mut written = Vec::with_capacity(result.len());
    for (image, file) in files {
        let dest = dir.join(file);
        export_image(image, &dest)?;
        written.push(dest);
    }
    tracing::info!(count = written.len(), dir = %dir.display(), "exported images");
    Ok(written)
}

#[cfg(test)]
#[path = "../tests/unit/export.rs"]
mod tests;
