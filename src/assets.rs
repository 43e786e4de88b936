use std::path::{Path, PathBuf};

use log::{error, info};
use thiserror::Error;

/// Errors raised while loading an image asset.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unable to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{} has zero area", path.display())]
    Empty { path: PathBuf },
}

/// Decoded RGBA8 image ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self, AssetError> {
        let decoded = image::load_from_memory(bytes).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(AssetError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }
}

/// Reads and decodes an image from disk.
pub fn load_texture(path: &Path) -> Result<TextureImage, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    TextureImage::from_bytes(path, &bytes)
}

/// Loads an image, logging and swallowing any failure.
///
/// A missing texture only degrades rendering, so startup carries on.
pub fn load_texture_or_log(path: &Path) -> Option<TextureImage> {
    match load_texture(path) {
        Ok(texture) => {
            info!(
                "loaded texture {} ({}x{})",
                path.display(),
                texture.width,
                texture.height
            );
            Some(texture)
        }
        Err(err) => {
            error!("failed to load texture: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_png_into_rgba() {
        let texture = TextureImage::from_bytes(Path::new("wall.png"), &png_bytes(3, 2)).unwrap();
        assert_eq!((texture.width, texture.height), (3, 2));
        assert_eq!(texture.rgba.len(), 3 * 2 * 4);
        assert_eq!(&texture.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_texture(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, AssetError::Read { .. }));
        assert!(err.to_string().contains("definitely/not/here.png"));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = TextureImage::from_bytes(Path::new("junk.png"), b"not an image").unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn failures_are_swallowed() {
        assert!(load_texture_or_log(Path::new("missing.png")).is_none());
    }
}
