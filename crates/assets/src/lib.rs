//! 圖片資源管理：複製圖片到受管資料夾並產生路徑參照。 /
//! Image asset manager: copies images into a managed folder and hands out quoted path references.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// Extensions (lower-case) treated as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("{0} is not a supported image (png, jpg, jpeg, gif, webp)")]
    UnsupportedType(PathBuf),
    #[error("{0} has no file name")]
    MissingFileName(PathBuf),
    #[error("asset I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AssetError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Returns whether `path` carries one of [`IMAGE_EXTENSIONS`] (ASCII case-insensitive).
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// 受管的圖片資料夾。 / The folder holding copied images.
#[derive(Debug, Clone)]
pub struct AssetManager {
    dir: PathBuf,
}

impl AssetManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> Result<(), AssetError> {
        fs::create_dir_all(&self.dir).map_err(|source| AssetError::io(&self.dir, source))
    }

    /// 複製圖片；若檔名已存在則加上 `_1`、`_2`… 後綴。 /
    /// Copies `source` into the folder, appending `_1`, `_2`, … before the extension on collision.
    pub fn add(&self, source: impl AsRef<Path>) -> Result<PathBuf, AssetError> {
        let source = source.as_ref();
        if !is_image(source) {
            return Err(AssetError::UnsupportedType(source.to_path_buf()));
        }
        let file_name = source
            .file_name()
            .ok_or_else(|| AssetError::MissingFileName(source.to_path_buf()))?;

        let bytes = fs::read(source).map_err(|err| AssetError::io(source, err))?;
        self.ensure_dir()?;
        let dest = self.claim_free_path(Path::new(file_name), &bytes)?;
        info!(source = %source.display(), dest = %dest.display(), "copied asset");
        Ok(dest)
    }

    /// 列出資料夾內的圖片檔名。 / Image file names in the folder, in directory order.
    pub fn list(&self) -> Result<Vec<String>, AssetError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(AssetError::io(&self.dir, err)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| AssetError::io(&self.dir, source))?;
            let path = entry.path();
            if !is_image(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// 產生可直接插入原始碼的雙引號絕對路徑。 / Absolute path of `name`, double-quoted for insertion into source text.
    pub fn reference_for(&self, name: &str) -> String {
        let path = self.path_for(name);
        let absolute = std::path::absolute(&path).unwrap_or(path);
        format!("\"{}\"", absolute.display())
    }

    /// Writes `bytes` to the first free candidate name, creating the file
    /// exclusively so a name is never silently overwritten.
    fn claim_free_path(&self, file_name: &Path, bytes: &[u8]) -> Result<PathBuf, AssetError> {
        let stem = file_name
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = file_name
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut candidate = self.dir.join(file_name);
        let mut suffix = 1usize;
        loop {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(mut file) => {
                    io::Write::write_all(&mut file, bytes)
                        .map_err(|source| AssetError::io(&candidate, source))?;
                    return Ok(candidate);
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    candidate = self.dir.join(format!("{stem}_{suffix}{extension}"));
                    suffix += 1;
                }
                Err(err) => return Err(AssetError::io(&candidate, err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn recognises_image_extensions_case_insensitively() {
        assert!(is_image(Path::new("a.PNG")));
        assert!(is_image(Path::new("b.JpEg")));
        assert!(is_image(Path::new("c.webp")));
        assert!(!is_image(Path::new("d.svg")));
        assert!(!is_image(Path::new("png")));
    }

    #[test]
    fn add_rejects_non_images() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("notes.txt");
        fs::write(&source, "text").unwrap();
        let manager = AssetManager::new(dir.path().join("assets"));
        assert!(matches!(
            manager.add(&source),
            Err(AssetError::UnsupportedType(_))
        ));
        assert!(!manager.dir().exists());
    }

    #[test]
    fn list_of_missing_folder_is_empty() {
        let dir = tempdir().unwrap();
        let manager = AssetManager::new(dir.path().join("nope"));
        assert!(manager.list().unwrap().is_empty());
    }

    #[test]
    fn reference_is_quoted_absolute_path() {
        let dir = tempdir().unwrap();
        let manager = AssetManager::new(dir.path());
        let reference = manager.reference_for("pic.png");
        assert!(reference.starts_with('"') && reference.ends_with('"'));
        let inner = &reference[1..reference.len() - 1];
        assert!(Path::new(inner).is_absolute());
        assert!(inner.ends_with("pic.png"));
    }
}
