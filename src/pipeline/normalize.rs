use image::{imageops::FilterType, DynamicImage};

use crate::tensor::{FeatureMap, ImageTensor};

/// Converts to RGB, resizes to `size × size`, scales pixels to [0, 1] and
/// adds a batch dimension.  Result shape: `(1, size, size, 3)`.
pub fn normalize(image: &DynamicImage, size: u32) -> ImageTensor {
    if size == 0 {
        return ImageTensor::from_single(FeatureMap::zeros(0, 0, 3));
    }
    let resized = image.resize_exact(size, size, FilterType::Lanczos3);
    let rgb = resized.to_rgb8();
    let data: Vec<f64> = rgb.pixels().flat_map(|p| p.0.iter().map(|&c| c as f64 / 255.0)).collect();
    ImageTensor::from_single(FeatureMap {
        height:   size as usize,
        width:    size as usize,
        channels: 3,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn shape_and_range() {
        let img = RgbImage::from_fn(37, 19, |x, y| Rgb([(x * 7) as u8, (y * 13) as u8, 255]));
        let t = normalize(&DynamicImage::ImageRgb8(img), 24);
        assert_eq!(t.shape(), (1, 24, 24, 3));
        assert!(t.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn grayscale_is_expanded_to_three_channels() {
        let img = GrayImage::from_pixel(8, 8, Luma([51]));
        let t = normalize(&DynamicImage::ImageLuma8(img), 8);
        assert_eq!(t.shape(), (1, 8, 8, 3));
        assert!(t.values().iter().all(|&v| (v - 0.2).abs() < 1e-9));
    }
}
