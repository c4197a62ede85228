use coindetect::{Circle, DetectorConfig};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_circle_mut;
use std::path::{Path, PathBuf};

pub const BACKGROUND: u8 = 30;
pub const COIN: u8 = 220;

/// Bright discs on a dark, flat background
pub fn coin_image(width: u32, height: u32, coins: &[Circle]) -> GrayImage {
    let mut img = GrayImage::from_pixel(width, height, Luma([BACKGROUND]));
    for c in coins {
        draw_filled_circle_mut(
            &mut img,
            (c.x.round() as i32, c.y.round() as i32),
            c.radius.round() as i32,
            Luma([COIN]),
        );
    }
    img
}

/// Three well separated coins of different sizes on a 300x200 canvas
pub fn three_coins() -> Vec<Circle> {
    vec![
        Circle::new(60.0, 60.0, 25.0),
        Circle::new(170.0, 90.0, 35.0),
        Circle::new(250.0, 160.0, 20.0),
    ]
}

/// Detector tuning for the synthetic images above
pub fn synthetic_config() -> DetectorConfig {
    DetectorConfig {
        hough_param1: 100.0,
        hough_param2: 20,
        hough_min_dist: 20.0,
        min_radius: 8,
        max_radius: 60,
        ..DetectorConfig::default()
    }
}

/// Save a grayscale image as PNG under `dir`
pub fn write_png(dir: &Path, name: &str, img: &GrayImage) -> PathBuf {
    let path = dir.join(name);
    img.save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test image");
    path
}
