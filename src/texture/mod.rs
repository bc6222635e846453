pub mod loader;
pub mod material;

pub use crate::cancel::CancelToken;
pub use loader::{
    FilterMode, ImageSource, TextureError, TextureFilter, TextureLoader, TextureResource,
    decode_image,
};
pub use material::{
    Material, SceneDescription, SceneKind, placeholder_scene, resolve_scene, textured_scene,
    untextured_scene,
};

#[cfg(test)]
pub(crate) mod fixtures {
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    /// PNG with a red top-left and blue bottom-left pixel on grey
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut img = RgbaImage::from_pixel(width, height, Rgba([200, 200, 200, 255]));
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(0, height - 1, Rgba([0, 0, 255, 255]));

        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }
}
