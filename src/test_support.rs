use std::io::Cursor;

use image::{DynamicImage, GrayAlphaImage, ImageFormat, LumaA, Rgb, RgbImage, Rgba, RgbaImage};

fn encode(image: DynamicImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Deterministic gradient PNG.
pub fn png_bytes(width: u32, height: u32, alpha: bool) -> Vec<u8> {
    let image = if alpha {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 200])
        }))
    } else {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 64])
        }))
    };
    encode(image)
}

pub fn png_bytes_la(size: u32) -> Vec<u8> {
    encode(DynamicImage::ImageLumaA8(GrayAlphaImage::from_fn(
        size,
        size,
        |x, _| LumaA([(x % 256) as u8, 255]),
    )))
}

/// Widths listed in an `.ico` directory, in file order.
pub fn ico_entry_sizes(bytes: &[u8]) -> Vec<u32> {
    let count = u16::from_le_bytes([bytes[4], bytes[5]]) as usize;
    (0..count)
        .map(|i| match bytes[6 + i * 16] {
            0 => 256,
            w => w as u32,
        })
        .collect()
}

/// 8-bit indexed PNG without a tRNS chunk.
pub fn png_bytes_indexed(size: u32) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, size, size);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_palette(vec![255, 0, 0, 0, 0, 255]);
        let mut writer = encoder.write_header().unwrap();
        let data: Vec<u8> = (0..size * size).map(|i| (i % 2) as u8).collect();
        writer.write_image_data(&data).unwrap();
    }
    out
}
