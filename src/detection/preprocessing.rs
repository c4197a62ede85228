use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::edges::canny;
use imageproc::filter::separable_filter_equal;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Normalised 1-D Gaussian kernel of odd length `size`.
///
/// A non-positive sigma is derived from the size the usual way,
/// `0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let size = (size | 1).max(3);
    let half = (size / 2) as i32;
    let sigma = if sigma > 0.0 && sigma.is_finite() {
        sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };

    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in kernel.iter_mut() {
        *k /= sum;
    }
    kernel
}

/// Separable Gaussian blur with an explicit kernel size.
///
/// Both passes run in `f32` and the result is rounded once, so a flat region
/// keeps its brightness.
pub fn apply_blur(img: &GrayImage, kernel_size: u32, sigma: f32) -> GrayImage {
    let kernel = gaussian_kernel(kernel_size, sigma);
    let (w, h) = img.dimensions();
    let float: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(w, h, |x, y| Luma([img.get_pixel(x, y)[0] as f32]));
    let blurred = separable_filter_equal(&float, &kernel);
    GrayImage::from_fn(w, h, |x, y| {
        Luma([blurred.get_pixel(x, y)[0].round().clamp(0.0, 255.0) as u8])
    })
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kernel_shape() {
        let k = gaussian_kernel(9, 2.0);
        assert_eq!(k.len(), 9);
        assert_relative_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(k[0], k[8]);
        assert!(k[4] > k[3] && k[3] > k[2]);
    }

    #[test]
    fn test_even_kernel_rounded_up() {
        assert_eq!(gaussian_kernel(4, 1.0).len(), 5);
        assert_eq!(gaussian_kernel(0, 1.0).len(), 3);
    }

    #[test]
    fn test_blur_keeps_flat_image() {
        let img = GrayImage::from_pixel(20, 10, Luma([120u8]));
        let blurred = apply_blur(&img, 9, 2.0);
        assert_eq!(blurred.dimensions(), (20, 10));
        assert!(blurred.pixels().all(|p| p[0] == 120));
    }

    #[test]
    fn test_blur_softens_step() {
        let img = GrayImage::from_fn(20, 20, |x, _| {
            if x < 10 { Luma([0u8]) } else { Luma([255u8]) }
        });
        let blurred = apply_blur(&img, 9, 2.0);
        let left = blurred.get_pixel(9, 10)[0];
        let right = blurred.get_pixel(10, 10)[0];
        assert!(left > 0 && right < 255);
    }

    #[test]
    fn test_blur_keeps_brightness_across_levels() {
        for level in [0u8, 1, 37, 128, 254, 255] {
            let img = GrayImage::from_pixel(15, 15, Luma([level]));
            let blurred = apply_blur(&img, 7, 0.0);
            assert!(blurred.pixels().all(|p| p[0] == level), "level {}", level);
        }
    }
}
