use crate::errors::ChartError;
use bytes::Bytes;
use image::{
    imageops::{self, FilterType},
    DynamicImage, GrayImage, ImageFormat, RgbImage,
};
use std::io::Cursor;

/// Kindle 4 panel in portrait orientation
pub const DISPLAY_WIDTH: u32 = 600;
pub const DISPLAY_HEIGHT: u32 = 800;

/// Turns a landscape chart into the e-ink panel's native raster: rotated a
/// quarter turn counter-clockwise, stretched to exactly `DISPLAY_WIDTH` x
/// `DISPLAY_HEIGHT` and reduced to 8-bit luma.
pub fn to_display(chart: &RgbImage) -> GrayImage {
    let rotated = imageops::rotate270(chart);
    let resized = imageops::resize(&rotated, DISPLAY_WIDTH, DISPLAY_HEIGHT, FilterType::Lanczos3);
    DynamicImage::ImageRgb8(resized).into_luma8()
}

pub fn encode_png(image: &GrayImage) -> Result<Bytes, ChartError> {
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;
    Ok(Bytes::from(png.into_inner()))
}

pub fn finish(chart: &RgbImage) -> Result<Bytes, ChartError> {
    encode_png(&to_display(chart))
}
