//! PNG decoding into upload-ready pixels.

use anyhow::Context;

use super::{ImageData, PixelFormat};

/// Decodes PNG bytes into premultiplied RGBA8.
pub fn decode_png(bytes: &[u8]) -> anyhow::Result<ImageData> {
    let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .context("decoding png")?
        .to_rgba8();

    let (width, height) = decoded.dimensions();
    let mut pixels = decoded.into_raw();
    premultiply_rgba8(&mut pixels);

    Ok(ImageData::new(width, height, PixelFormat::Rgba8, pixels))
}

/// Multiplies RGB by alpha in place, rounding to nearest.
pub fn premultiply_rgba8(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encodes a `w`×`h` PNG filled with straight-alpha `rgba`.
    pub(crate) fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_dimensions_and_format() {
        let image = decode_png(&png_bytes(3, 2, [255, 0, 0, 255])).unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.format, PixelFormat::Rgba8);
        assert!(image.is_valid());
        assert_eq!(&image.pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn decoded_pixels_are_premultiplied() {
        let image = decode_png(&png_bytes(1, 1, [255, 128, 0, 128])).unwrap();
        assert_eq!(image.pixels, vec![128, 64, 0, 128]);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode_png(b"not a png").is_err());
    }
}
