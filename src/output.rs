use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConvertError, Result};

/// Final paths of the three generated artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// `<binary_dir>/<name>.mdl`
    pub binary: PathBuf,
    /// `<source_dir>/draw_<name>.c`
    pub source: PathBuf,
    /// `<header_dir>/draw_<name>.h`
    pub header: PathBuf,
}

impl OutputPaths {
    pub fn new(binary_dir: &Path, source_dir: &Path, header_dir: &Path, name: &str) -> Self {
        Self {
            binary: binary_dir.join(format!("{name}.mdl")),
            source: source_dir.join(format!("draw_{name}.c")),
            header: header_dir.join(format!("draw_{name}.h")),
        }
    }
}

/// Write a file through a temporary sibling and rename it into place.
///
/// Nothing appears at `path` unless `fill` and the flush both succeed; the
/// temporary file is removed on every failure path. I/O errors are reported
/// against `path`.
pub fn write_atomic<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let output_error = |source: io::Error| ConvertError::Output {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    // Request 0o666 so the process umask decides the final mode, as with
    // `File::create`.
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let tmp = builder.tempfile_in(dir).map_err(output_error)?;
    debug!(tmp = %tmp.path().display(), target = %path.display(), "Writing output");

    let mut writer = BufWriter::new(tmp);
    fill(&mut writer).map_err(|e| match e {
        ConvertError::Io(source) => output_error(source),
        other => other,
    })?;
    let tmp = writer
        .into_inner()
        .map_err(|e| output_error(e.into_error()))?;

    tmp.persist(path).map_err(|e| output_error(e.error))?;
    Ok(())
}

/// Atomically write a complete byte buffer.
pub fn write_bytes_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    write_atomic(path, |w| Ok(w.write_all(contents)?))
}
