use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::Circle;

const OUTLINE: Rgb<u8> = Rgb([255, 0, 0]);
const CENTER: Rgb<u8> = Rgb([0, 255, 0]);

/// Draw each circle as a 2px red outline with a green center dot
pub fn draw_detections(img: &DynamicImage, circles: &[Circle]) -> RgbImage {
    let mut vis = img.to_rgb8();
    for c in circles {
        let center = (c.x.round() as i32, c.y.round() as i32);
        let radius = c.radius.round() as i32;
        draw_hollow_circle_mut(&mut vis, center, radius, OUTLINE);
        draw_hollow_circle_mut(&mut vis, center, radius + 1, OUTLINE);
        draw_filled_circle_mut(&mut vis, center, 2, CENTER);
    }
    vis
}

pub fn save_visualization(
    path: impl AsRef<Path>,
    img: &DynamicImage,
    circles: &[Circle],
) -> Result<()> {
    let path = path.as_ref();
    draw_detections(img, circles)
        .save(path)
        .map_err(|source| Error::ImageWrite {
            path: path.to_path_buf(),
            source,
        })
}
