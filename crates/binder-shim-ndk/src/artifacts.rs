//! Writing the rendered headers where the generator can find them.

use std::path::{Path, PathBuf};

use serde::Serialize;

use binder_shim_core::IncludeWrapper;
use binder_shim_core::render::{
    SHIM_HEADER_NAME, WRAPPER_HEADER_NAME, render_shim_header, render_wrapper_header,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShimArtifacts {
    pub dir: PathBuf,
    pub shim_header: PathBuf,
    pub wrapper_header: PathBuf,
}

impl ShimArtifacts {
    /// Paths the artifacts have (or would have) inside `dir`.
    #[must_use]
    pub fn locate(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            shim_header: dir.join(SHIM_HEADER_NAME),
            wrapper_header: dir.join(WRAPPER_HEADER_NAME),
        }
    }

    /// Render both headers into `dir`, creating it if needed.
    ///
    /// Existing files are overwritten; the output only depends on `wrapper`.
    pub fn write(dir: &Path, wrapper: &IncludeWrapper) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let artifacts = Self::locate(dir);
        std::fs::write(&artifacts.shim_header, render_shim_header(wrapper.shim()))?;
        std::fs::write(&artifacts.wrapper_header, render_wrapper_header(wrapper))?;
        Ok(artifacts)
    }

    #[must_use]
    pub fn paths(&self) -> [&Path; 2] {
        [&self.shim_header, &self.wrapper_header]
    }
}
