use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use rand::distributions::Uniform;
use rand::Rng;

use crate::models::GalleryImage;
use crate::prompt::Prompt;
use crate::store::MediaStore;

pub const GALLERY_LIMIT: usize = 100;
const PLACEHOLDER: &str = ".emptyFolderPlaceholder";
const NAME_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random base-36 object name that keeps the upload's extension.
pub fn random_object_name(file_name: &str) -> String {
    let stem: String = rand::thread_rng()
        .sample_iter(Uniform::from(0..NAME_ALPHABET.len()))
        .take(11)
        .map(|idx| NAME_ALPHABET[idx] as char)
        .collect();
    match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}.{}", stem, ext.to_lowercase()),
        _ => stem,
    }
}

/// Content type of an upload, refusing anything that is not an image.
pub fn image_content_type(path: &Path) -> Result<String> {
    let mime = mime_guess::from_path(path)
        .first()
        .ok_or_else(|| anyhow!("Cannot tell the file type of {}", path.display()))?;
    if mime.type_() != mime_guess::mime::IMAGE {
        bail!("Only image files can be uploaded, {} is {}", path.display(), mime);
    }
    Ok(mime.essence_str().to_string())
}

/// The media tab: what the bucket held at the last refresh.
#[derive(Debug, Default)]
pub struct Gallery {
    images: Vec<GalleryImage>,
}

impl Gallery {
    pub fn images(&self) -> &[GalleryImage] {
        &self.images
    }

    pub async fn refresh<M: MediaStore>(&mut self, store: &M) -> Result<()> {
        let objects = store.list_objects(GALLERY_LIMIT).await.map_err(|err| {
            tracing::error!(error = %err, "Error fetching gallery");
            err
        })?;
        self.images = objects
            .into_iter()
            .filter(|object| object.name != PLACEHOLDER)
            .map(|object| GalleryImage {
                url: store.public_url(&object.name),
                name: object.name,
            })
            .collect();
        tracing::debug!(count = self.images.len(), "Gallery refreshed");
        Ok(())
    }

    /// Uploads a local image and returns its public URL.
    pub async fn upload<M: MediaStore, P: Prompt>(
        &mut self,
        store: &M,
        prompt: &P,
        path: &Path,
    ) -> Result<String> {
        let url = match upload_image(store, path).await {
            Ok(url) => url,
            Err(err) => {
                tracing::error!(error = %err, path = %path.display(), "Error uploading image");
                prompt.alert("Error uploading image!");
                return Err(err);
            }
        };
        self.refresh(store).await?;
        Ok(url)
    }

    /// Renames an object. Returns false when there was nothing to do.
    pub async fn rename<M: MediaStore, P: Prompt>(
        &mut self,
        store: &M,
        prompt: &P,
        old_name: &str,
        new_name: &str,
    ) -> Result<bool> {
        let new_name = new_name.trim();
        if new_name.is_empty() || new_name == old_name {
            return Ok(false);
        }
        if let Err(err) = store.move_object(old_name, new_name).await {
            tracing::error!(error = %err, from = old_name, to = new_name, "Rename failed");
            prompt.alert("Error renaming image. Ensure the name is unique.");
            return Err(err);
        }
        tracing::info!(from = old_name, to = new_name, "Renamed image");
        self.refresh(store).await?;
        Ok(true)
    }

    /// Deletes an object after confirmation. Returns whether it was deleted.
    pub async fn delete<M: MediaStore, P: Prompt>(
        &mut self,
        store: &M,
        prompt: &P,
        name: &str,
    ) -> Result<bool> {
        if !prompt.confirm(
            "Are you sure you want to delete this image? If it is used on the website, the link will break.",
        ) {
            return Ok(false);
        }
        if let Err(err) = store.remove_objects(&[name.to_string()]).await {
            tracing::error!(error = %err, object = name, "Delete failed");
            prompt.alert("Error deleting image");
            return Err(err);
        }
        tracing::info!(object = name, "Deleted image");
        self.refresh(store).await?;
        Ok(true)
    }
}

async fn upload_image<M: MediaStore>(store: &M, path: &Path) -> Result<String> {
    let content_type = image_content_type(path)?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("{} has no file name", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;

    let object_name = random_object_name(file_name);
    store
        .upload_object(&object_name, bytes, &content_type)
        .await?;
    tracing::info!(object = %object_name, "Uploaded image");
    Ok(store.public_url(&object_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::prompt::tests::Scripted;
    use std::io::Write;

    fn image_file(suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(b"\x89PNG fake").unwrap();
        file
    }

    #[test]
    fn object_names_keep_the_extension() {
        let name = random_object_name("Annual Day.JPG");
        let (stem, ext) = name.split_once('.').unwrap();
        assert_eq!(ext, "jpg");
        assert_eq!(stem.len(), 11);
        assert!(stem.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert!(!random_object_name("README").contains('.'));
        assert_ne!(random_object_name("a.png"), random_object_name("a.png"));
    }

    #[test]
    fn only_images_are_accepted() {
        assert_eq!(image_content_type(Path::new("x.png")).unwrap(), "image/png");
        assert!(image_content_type(Path::new("notes.pdf")).is_err());
        assert!(image_content_type(Path::new("no-extension")).is_err());
    }

    #[tokio::test]
    async fn upload_rename_delete_cycle() {
        let db = Database::in_memory("punwarkaschoolBucket").unwrap();
        let prompt = Scripted::replying("unused");
        let mut gallery = Gallery::default();
        let file = image_file(".png");

        let url = gallery.upload(&db, &prompt, file.path()).await.unwrap();
        assert_eq!(gallery.images().len(), 1);
        assert_eq!(gallery.images()[0].url, url);

        let name = gallery.images()[0].name.clone();
        assert!(!gallery.rename(&db, &prompt, &name, "  ").await.unwrap());
        assert!(!gallery.rename(&db, &prompt, &name, &name).await.unwrap());
        assert!(gallery.rename(&db, &prompt, &name, "hero.png").await.unwrap());
        assert_eq!(gallery.images()[0].name, "hero.png");

        assert!(gallery.delete(&db, &prompt, "hero.png").await.unwrap());
        assert!(gallery.images().is_empty());
        assert!(prompt.alerts().is_empty());
    }

    #[tokio::test]
    async fn failures_raise_alerts() {
        let db = Database::in_memory("b").unwrap();
        let prompt = Scripted::answering(true);
        let mut gallery = Gallery::default();

        let pdf = image_file(".pdf");
        assert!(gallery.upload(&db, &prompt, pdf.path()).await.is_err());
        assert!(gallery.rename(&db, &prompt, "missing.png", "x.png").await.is_err());
        assert_eq!(
            prompt.alerts(),
            [
                "Error uploading image!",
                "Error renaming image. Ensure the name is unique."
            ]
        );
    }

    #[tokio::test]
    async fn declined_delete_keeps_the_image() {
        let db = Database::in_memory("b").unwrap();
        db.upload_object("keep.png", vec![1], "image/png").await.unwrap();
        let mut gallery = Gallery::default();
        gallery.refresh(&db).await.unwrap();

        let prompt = Scripted::answering(false);
        assert!(!gallery.delete(&db, &prompt, "keep.png").await.unwrap());
        assert_eq!(gallery.images().len(), 1);
    }

    #[tokio::test]
    async fn placeholder_objects_are_hidden() {
        let db = Database::in_memory("b").unwrap();
        db.upload_object(PLACEHOLDER, Vec::new(), "text/plain").await.unwrap();
        db.upload_object("a.png", vec![1], "image/png").await.unwrap();
        let mut gallery = Gallery::default();
        gallery.refresh(&db).await.unwrap();
        let names: Vec<_> = gallery.images().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["a.png"]);
    }
}
