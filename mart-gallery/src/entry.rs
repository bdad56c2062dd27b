use serde::{Deserialize, Serialize};

/// Where an image's bytes currently live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ImageSource {
    /// Still on the client; `preview` is only meaningful to the uploader.
    LocalPreview { preview: String },
    /// Stored remotely; safe to persist.
    Remote { url: String, path: String },
}

/// One image in a product gallery, as the editor tracks it.
///
/// `order` mirrors the entry's position and `order == 0` marks the main
/// image. `uploading` holds exactly while the source is a local preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    source: ImageSource,
    order: usize,
    uploading: bool,
    #[serde(default)]
    progress: u8,
}

impl ImageEntry {
    pub fn placeholder(preview: impl Into<String>, order: usize) -> Self {
        Self {
            source: ImageSource::LocalPreview {
                preview: preview.into(),
            },
            order,
            uploading: true,
            progress: 0,
        }
    }

    pub fn remote(url: impl Into<String>, path: impl Into<String>, order: usize) -> Self {
        Self {
            source: ImageSource::Remote {
                url: url.into(),
                path: path.into(),
            },
            order,
            uploading: false,
            progress: 100,
        }
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Preview reference while uploading, public URL afterwards.
    pub fn url(&self) -> &str {
        match &self.source {
            ImageSource::LocalPreview { preview } => preview,
            ImageSource::Remote { url, .. } => url,
        }
    }

    /// Storage key; empty until the upload completes.
    pub fn path(&self) -> &str {
        match &self.source {
            ImageSource::LocalPreview { .. } => "",
            ImageSource::Remote { path, .. } => path,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_main(&self) -> bool {
        self.order == 0
    }

    pub(crate) fn is_placeholder_for(&self, preview_ref: &str) -> bool {
        matches!(&self.source, ImageSource::LocalPreview { preview } if preview == preview_ref)
    }

    /// Returns whether the visible percentage changed.
    pub(crate) fn set_progress(&mut self, percent: u8) -> bool {
        let percent = percent.min(100);
        if !self.uploading || percent == self.progress {
            return false;
        }
        self.progress = percent;
        true
    }

    pub(crate) fn finish(&mut self, url: String, path: String) {
        self.source = ImageSource::Remote { url, path };
        self.uploading = false;
        self.progress = 100;
    }

    /// Persistable form; `None` while the image only exists locally.
    pub fn to_persisted(&self) -> Option<GalleryImage> {
        match &self.source {
            ImageSource::Remote { url, path } => Some(GalleryImage {
                url: url.clone(),
                path: path.clone(),
                order: self.order,
            }),
            ImageSource::LocalPreview { .. } => None,
        }
    }
}

/// A gallery image as stored on a product record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub url: String,
    pub path: String,
    pub order: usize,
}

impl From<GalleryImage> for ImageEntry {
    fn from(img: GalleryImage) -> Self {
        ImageEntry::remote(img.url, img.path, img.order)
    }
}

/// Anything whose `order` tracks its position in a list.
pub trait Ordered {
    fn order(&self) -> usize;
    fn set_order(&mut self, order: usize);
}

impl Ordered for ImageEntry {
    fn order(&self) -> usize {
        self.order
    }

    fn set_order(&mut self, order: usize) {
        self.order = order;
    }
}

impl Ordered for GalleryImage {
    fn order(&self) -> usize {
        self.order
    }

    fn set_order(&mut self, order: usize) {
        self.order = order;
    }
}

/// Persistable images of a gallery, skipping entries still uploading.
pub fn persisted_gallery(entries: &[ImageEntry]) -> Vec<GalleryImage> {
    entries.iter().filter_map(ImageEntry::to_persisted).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholder_has_no_path_until_finished() {
        let mut entry = ImageEntry::placeholder("local-preview://abc/a.jpg", 2);
        assert_eq!(entry.url(), "local-preview://abc/a.jpg");
        assert_eq!(entry.path(), "");
        assert!(entry.is_uploading());
        assert!(entry.to_persisted().is_none());

        assert!(entry.set_progress(40));
        assert!(!entry.set_progress(40));

        entry.finish("/media/products/p/1_a.jpg".into(), "products/p/1_a.jpg".into());
        assert!(!entry.is_uploading());
        assert!(!entry.set_progress(10));
        assert_eq!(
            entry.to_persisted(),
            Some(GalleryImage {
                url: "/media/products/p/1_a.jpg".into(),
                path: "products/p/1_a.jpg".into(),
                order: 2,
            })
        );
    }

    #[test]
    fn wire_shape_is_tagged() {
        let entry = ImageEntry::remote("https://x/y.jpg", "products/p/y.jpg", 0);
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            v,
            json!({
                "source": {"kind": "remote", "url": "https://x/y.jpg", "path": "products/p/y.jpg"},
                "order": 0,
                "uploading": false,
                "progress": 100
            })
        );

        let back: ImageEntry = serde_json::from_value(v).unwrap();
        assert_eq!(back, entry);
        assert!(back.is_main());
    }
}
