use std::fs;
use std::io::Write;

use camino::Utf8Path;
use tempfile::Builder;

use crate::error::CatalogError;

/// Filesystem capability the pipeline copies assets and writes manifests through.
pub trait AssetStore {
    /// Creates `path` if needed. An existing directory is not an error.
    fn ensure_dir(&self, path: &Utf8Path) -> Result<(), CatalogError>;
    fn exists(&self, path: &Utf8Path) -> bool;
    fn copy_file(&self, source: &Utf8Path, destination: &Utf8Path) -> Result<(), CatalogError>;
    fn write_manifest(&self, path: &Utf8Path, content: &str) -> Result<(), CatalogError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl AssetStore for LocalStore {
    fn ensure_dir(&self, path: &Utf8Path) -> Result<(), CatalogError> {
        if path.as_std_path().is_dir() {
            return Ok(());
        }
        fs::create_dir_all(path.as_std_path()).map_err(|err| CatalogError::DirectoryCreate {
            path: path.as_std_path().to_path_buf(),
            message: err.to_string(),
        })
    }

    fn exists(&self, path: &Utf8Path) -> bool {
        path.as_std_path().exists()
    }

    fn copy_file(&self, source: &Utf8Path, destination: &Utf8Path) -> Result<(), CatalogError> {
        let copy_error = |message: String| CatalogError::Copy {
            source_path: source.as_std_path().to_path_buf(),
            destination: destination.as_std_path().to_path_buf(),
            message,
        };
        let parent = destination
            .parent()
            .ok_or_else(|| copy_error("invalid destination path".to_string()))?;
        let temp = Builder::new()
            .prefix(".catalog-copy")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| copy_error(err.to_string()))?;
        fs::copy(source.as_std_path(), temp.path()).map_err(|err| copy_error(err.to_string()))?;
        temp.persist(destination.as_std_path())
            .map_err(|err| copy_error(err.to_string()))?;
        Ok(())
    }

    fn write_manifest(&self, path: &Utf8Path, content: &str) -> Result<(), CatalogError> {
        let write_error = |message: String| CatalogError::ManifestWrite {
            path: path.as_std_path().to_path_buf(),
            message,
        };
        let parent = path
            .parent()
            .ok_or_else(|| write_error("invalid manifest path".to_string()))?;
        let mut temp = Builder::new()
            .prefix(".catalog-manifest")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| write_error(err.to_string()))?;
        temp.write_all(content.as_bytes())
            .map_err(|err| write_error(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| write_error(err.to_string()))?;
        Ok(())
    }
}

/// Reports what would be created or copied without touching the output tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunStore;

impl AssetStore for DryRunStore {
    fn ensure_dir(&self, path: &Utf8Path) -> Result<(), CatalogError> {
        tracing::info!(%path, "dry run: would create directory");
        Ok(())
    }

    fn exists(&self, path: &Utf8Path) -> bool {
        path.as_std_path().exists()
    }

    fn copy_file(&self, source: &Utf8Path, destination: &Utf8Path) -> Result<(), CatalogError> {
        if !source.as_std_path().is_file() {
            return Err(CatalogError::Copy {
                source_path: source.as_std_path().to_path_buf(),
                destination: destination.as_std_path().to_path_buf(),
                message: "source file not found".to_string(),
            });
        }
        tracing::info!(%source, %destination, "dry run: would copy");
        Ok(())
    }

    fn write_manifest(&self, path: &Utf8Path, _content: &str) -> Result<(), CatalogError> {
        tracing::info!(%path, "dry run: would write manifest");
        Ok(())
    }
}
