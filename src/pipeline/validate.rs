use crate::tensor::ImageTensor;

/// Blank-image filter.  Rejects an empty tensor, or one where no channel
/// varies across pixels by at least `threshold` (largest per-channel
/// standard deviation).  Spread between R, G and B within a pixel does not
/// count, so any solid colour is rejected.  Anything else passes and is left
/// to the classifier; this says nothing about whether a leaf is in the
/// picture.
pub fn has_visible_content(tensor: &ImageTensor, threshold: f64) -> bool {
    match tensor.channel_std_devs() {
        Some(sds) => sds.into_iter().fold(0.0, f64::max) >= threshold,
        None      => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(rgb: [f64; 3]) -> ImageTensor {
        ImageTensor::new(1, 4, 4, 3, rgb.repeat(16)).unwrap()
    }

    #[test]
    fn solid_black_and_white_are_rejected() {
        assert!(!has_visible_content(&filled([0.0; 3]), 0.01));
        assert!(!has_visible_content(&filled([1.0; 3]), 0.01));
    }

    #[test]
    fn saturated_solid_colour_is_rejected() {
        assert!(!has_visible_content(&filled([30.0 / 255.0, 160.0 / 255.0, 40.0 / 255.0]), 0.01));
        assert!(!has_visible_content(&filled([1.0, 0.0, 0.0]), 0.01));
    }

    #[test]
    fn empty_is_rejected() {
        let empty = ImageTensor::new(1, 0, 0, 3, vec![]).unwrap();
        assert!(!has_visible_content(&empty, 0.01));
    }

    #[test]
    fn one_varying_channel_is_enough() {
        let data: Vec<f64> = (0..16).flat_map(|px| [if px % 2 == 0 { 0.2 } else { 0.8 }, 0.5, 0.5]).collect();
        let t = ImageTensor::new(1, 4, 4, 3, data).unwrap();
        assert!(has_visible_content(&t, 0.01));
    }

    #[test]
    fn threshold_is_inclusive() {
        // Every channel alternates 0.0 / 0.02 across pixels: std dev 0.01.
        let data: Vec<f64> = (0..48).map(|i| if i % 2 == 0 { 0.0 } else { 0.02 }).collect();
        let t = ImageTensor::new(1, 4, 4, 3, data).unwrap();
        let sd = t.channel_std_devs().unwrap().into_iter().fold(0.0, f64::max);
        assert!(has_visible_content(&t, sd));
        assert!(!has_visible_content(&t, sd + 1e-6));
    }
}
