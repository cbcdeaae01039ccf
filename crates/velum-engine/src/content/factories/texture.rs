use std::path::Path;
use std::rc::Rc;

use crate::content::decode::decode_png;
use crate::content::{ContentError, FileSystem, ResourceFactory, Texture, TextureUploader};

/// Loads PNG files and uploads them as owned textures.
pub struct ImageTextureFactory<U: TextureUploader> {
    file_system: Rc<dyn FileSystem>,
    uploader: U,
}

impl<U: TextureUploader> ImageTextureFactory<U> {
    pub fn new(file_system: Rc<dyn FileSystem>, uploader: U) -> Self {
        Self { file_system, uploader }
    }
}

impl<U: TextureUploader> ResourceFactory<Texture> for ImageTextureFactory<U> {
    fn create(&mut self, path: &str) -> Result<Texture, ContentError> {
        let load = |e: anyhow::Error| ContentError::load("texture", path, e);

        let bytes = self
            .file_system
            .read(path)
            .map_err(|e| load(anyhow::Error::new(e)))?;
        let image = decode_png(&bytes).map_err(load)?;

        let name = file_stem(path);
        let id = self.uploader.upload(&name, &image).map_err(load)?;

        Ok(Texture::new(id, name, path, image.width, image.height))
    }
}

pub(crate) fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_owned()
}
