//! Upload validation and image storage.
//!
//! Uploaded images are renamed to `<sha256><timestamp>[<owner>].<ext>`
//! so a re-uploaded file never collides and the original filename never
//! reaches disk. Content images live under `images/`, the logo under
//! `logo/`; both directories are served statically.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

/// 3200 * 5000 bytes, reported to clients as "less than 16MB".
const CONTENT_IMAGE_MAX_BYTES: usize = 3200 * 5000;
/// 1000 * 5000 bytes, reported to clients as "less than 5MB".
const LOGO_MAX_BYTES: usize = 1000 * 5000;

const CONTENT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
const PRODUCT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file uploaded.")]
    Missing,

    #[error("Invalid images.")]
    InvalidType,

    #[error("Image must be less than {0}.")]
    TooLarge(&'static str),

    #[error("failed to store image: {0}")]
    Io(#[from] io::Error),
}

/// What the upload is for; decides the extension whitelist, the size
/// ceiling, and the storage subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// Post, category, banner, carousel, about, and contact images.
    Content,
    /// Product images additionally accept `.webp`.
    Product,
    /// The site logo, with a tighter size ceiling.
    Logo,
}

impl UploadKind {
    const fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Content | Self::Logo => CONTENT_EXTENSIONS,
            Self::Product => PRODUCT_EXTENSIONS,
        }
    }

    const fn max_bytes(self) -> usize {
        match self {
            Self::Content | Self::Product => CONTENT_IMAGE_MAX_BYTES,
            Self::Logo => LOGO_MAX_BYTES,
        }
    }

    const fn size_label(self) -> &'static str {
        match self {
            Self::Content | Self::Product => "16MB",
            Self::Logo => "5MB",
        }
    }

    /// Subdirectory under the upload root, also the public URL path
    /// segment.
    const fn subdir(self) -> &'static str {
        match self {
            Self::Content | Self::Product => "images",
            Self::Logo => "logo",
        }
    }
}

/// An upload that passed the type and size checks, carrying its final
/// storage name.
#[derive(Debug)]
pub struct ValidatedUpload {
    file_name: String,
    data: Vec<u8>,
}

impl ValidatedUpload {
    /// Validates an uploaded file and assigns its storage name. `owner`
    /// is folded into the name for author-scoped uploads.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidType` for a disallowed extension and
    /// `UploadError::TooLarge` when the size ceiling is exceeded.
    pub fn new(
        kind: UploadKind,
        original_name: &str,
        data: Vec<u8>,
        owner: Option<&str>,
    ) -> Result<Self, UploadError> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or(UploadError::InvalidType)?;

        if !kind.allowed_extensions().contains(&extension.as_str()) {
            return Err(UploadError::InvalidType);
        }
        if data.len() > kind.max_bytes() {
            return Err(UploadError::TooLarge(kind.size_label()));
        }

        let digest = hex::encode(Sha256::digest(&data));
        let timestamp = Utc::now().format("%Y%m%d%H%M%S");
        let owner = owner.unwrap_or_default();
        let file_name = format!("{digest}{timestamp}{owner}.{extension}");

        Ok(Self { file_name, data })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Local-disk image storage rooted at the configured upload directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a validated upload to disk, creating the subdirectory on
    /// first use. Returns the stored file name.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the write fails.
    pub async fn save(
        &self,
        kind: UploadKind,
        upload: &ValidatedUpload,
    ) -> Result<String, UploadError> {
        let dir = self.root.join(kind.subdir());
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&upload.file_name), &upload.data).await?;
        Ok(upload.file_name.clone())
    }

    /// Removes a stored image. A file that is already gone is not an
    /// error; replacement and deletion stay idempotent.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` for failures other than `NotFound`.
    pub async fn remove(&self, kind: UploadKind, file_name: &str) -> Result<(), UploadError> {
        let path = self.root.join(kind.subdir()).join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(UploadError::Io(e)),
        }
    }

    /// Public URL for a stored image.
    ///
    /// # Panics
    ///
    /// Never panics for the base URLs accepted by configuration, which
    /// are always valid bases.
    #[must_use]
    pub fn public_url(base: &Url, kind: UploadKind, file_name: &str) -> String {
        let mut url = base.clone();
        url.set_path(&format!("{}/{}", kind.subdir(), file_name));
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_disallowed_extension() {
        let result = ValidatedUpload::new(UploadKind::Content, "durian.gif", vec![1, 2, 3], None);
        assert!(matches!(result, Err(UploadError::InvalidType)));
    }

    #[test]
    fn webp_only_for_products() {
        let content = ValidatedUpload::new(UploadKind::Content, "a.webp", vec![1], None);
        assert!(matches!(content, Err(UploadError::InvalidType)));

        let product = ValidatedUpload::new(UploadKind::Product, "a.webp", vec![1], None);
        assert!(product.is_ok());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let upload = ValidatedUpload::new(UploadKind::Content, "DURIAN.JPG", vec![1], None)
            .expect("uppercase extension accepted");
        assert!(upload.file_name().ends_with(".jpg"));
    }

    #[test]
    fn rejects_oversized_logo() {
        let data = vec![0u8; LOGO_MAX_BYTES + 1];
        let result = ValidatedUpload::new(UploadKind::Logo, "logo.png", data, None);
        assert!(matches!(result, Err(UploadError::TooLarge("5MB"))));
    }

    #[test]
    fn owner_is_folded_into_file_name() {
        let upload =
            ValidatedUpload::new(UploadKind::Content, "durian.png", vec![1, 2], Some("abc123"))
                .expect("valid upload");
        assert!(upload.file_name().contains("abc123"));
        assert!(upload.file_name().ends_with(".png"));
    }

    #[tokio::test]
    async fn save_and_remove_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ImageStore::new(dir.path());
        let upload = ValidatedUpload::new(UploadKind::Content, "durian.png", vec![9, 9], None)
            .expect("valid upload");

        let name = store.save(UploadKind::Content, &upload).await.expect("save");
        assert!(dir.path().join("images").join(&name).exists());

        store
            .remove(UploadKind::Content, &name)
            .await
            .expect("remove");
        assert!(!dir.path().join("images").join(&name).exists());

        // already gone: still ok
        store
            .remove(UploadKind::Content, &name)
            .await
            .expect("idempotent remove");
    }

    #[test]
    fn public_url_uses_subdirectory() {
        let base = Url::parse("https://api.durianpakjayus.com").unwrap();
        let url = ImageStore::public_url(&base, UploadKind::Logo, "abc.png");
        assert_eq!(url, "https://api.durianpakjayus.com/logo/abc.png");
    }
}
