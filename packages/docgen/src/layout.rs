// ABOUTME: Layout constants per render mode and the image fit-box algorithm

/// Output mode of the synthesizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// The complete multi-page document
    Full,
    /// Compact single-page rendering: smaller type, tighter margins,
    /// abbreviated metric list
    OnePager,
}

/// Maximum display box for embedded images, in layout points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentBox {
    pub max_width: f64,
    pub max_height: f64,
}

/// Minimum readable image size; smaller results are scaled back up
pub const MIN_IMAGE_WIDTH: f64 = 300.0;
pub const MIN_IMAGE_HEIGHT: f64 = 200.0;

/// EMUs per layout point used by the docx renderer
pub const EMU_PER_POINT: u32 = 9525;

/// Run sizes per mode, in half-points (the OOXML run-size unit)
#[derive(Debug, Clone, Copy)]
pub struct TypeScale {
    pub title: usize,
    pub heading: usize,
    pub sub_heading: usize,
    pub body: usize,
}

impl RenderMode {
    pub fn content_box(&self) -> ContentBox {
        match self {
            RenderMode::Full => ContentBox {
                max_width: 580.0,
                max_height: 435.0,
            },
            RenderMode::OnePager => ContentBox {
                max_width: 520.0,
                max_height: 390.0,
            },
        }
    }

    pub fn type_scale(&self) -> TypeScale {
        match self {
            RenderMode::Full => TypeScale {
                title: 56,
                heading: 32,
                sub_heading: 26,
                body: 22,
            },
            RenderMode::OnePager => TypeScale {
                title: 40,
                heading: 26,
                sub_heading: 22,
                body: 18,
            },
        }
    }

    /// Uniform page margin in twips
    pub fn page_margin(&self) -> i32 {
        match self {
            RenderMode::Full => 1440,
            RenderMode::OnePager => 720,
        }
    }

    /// How many custom metrics the metric section lists
    pub fn custom_metric_limit(&self) -> usize {
        match self {
            RenderMode::Full => usize::MAX,
            RenderMode::OnePager => 3,
        }
    }
}

/// Compute target display dimensions for a source image.
///
/// Scales down to fit the mode's content box preserving aspect ratio (never
/// upscaling on the first pass). If the result undershoots the minimum
/// readable size, scales up uniformly and re-clips to the box; an extreme
/// aspect ratio can therefore still end below one minimum axis, which is the
/// intended behavior.
pub fn fit_dimensions(src_width: u32, src_height: u32, content_box: &ContentBox) -> (u32, u32) {
    if src_width == 0 || src_height == 0 {
        return (MIN_IMAGE_WIDTH as u32, MIN_IMAGE_HEIGHT as u32);
    }

    let (w, h) = (src_width as f64, src_height as f64);
    let scale = (content_box.max_width / w)
        .min(content_box.max_height / h)
        .min(1.0);
    let mut target_w = w * scale;
    let mut target_h = h * scale;

    if target_w < MIN_IMAGE_WIDTH || target_h < MIN_IMAGE_HEIGHT {
        let up = (MIN_IMAGE_WIDTH / target_w).max(MIN_IMAGE_HEIGHT / target_h);
        target_w *= up;
        target_h *= up;

        let clip = (content_box.max_width / target_w)
            .min(content_box.max_height / target_h)
            .min(1.0);
        target_w *= clip;
        target_h *= clip;
    }

    (target_w.round() as u32, target_h.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: ContentBox = ContentBox {
        max_width: 580.0,
        max_height: 435.0,
    };

    #[test]
    fn test_large_image_scales_down_to_box() {
        let (w, h) = fit_dimensions(2320, 870, &FULL);
        assert_eq!((w, h), (580, 218)); // width-bound, aspect 8:3 preserved
    }

    #[test]
    fn test_tall_image_is_height_bound() {
        let (w, h) = fit_dimensions(1000, 2000, &FULL);
        assert_eq!((w, h), (218, 435));
    }

    #[test]
    fn test_small_image_not_upscaled_when_above_minimum() {
        let (w, h) = fit_dimensions(400, 300, &FULL);
        assert_eq!((w, h), (400, 300));
    }

    #[test]
    fn test_tiny_image_upscaled_to_minimum() {
        let (w, h) = fit_dimensions(150, 100, &FULL);
        assert_eq!((w, h), (300, 200));
    }

    #[test]
    fn test_minimum_upscale_reclips_to_box() {
        // 100x20 first scales to nothing near the min; upscaling to 200pt
        // height would make it 1000pt wide, so the re-clip wins
        let (w, h) = fit_dimensions(100, 20, &FULL);
        assert_eq!((w, h), (580, 116));
    }

    #[test]
    fn test_zero_dimensions_fall_back_to_minimum() {
        assert_eq!(fit_dimensions(0, 0, &FULL), (300, 200));
    }

    #[test]
    fn test_one_pager_box_is_tighter() {
        let full = RenderMode::Full.content_box();
        let one = RenderMode::OnePager.content_box();
        assert!(one.max_width < full.max_width);
        assert!(one.max_height < full.max_height);
        assert!(RenderMode::OnePager.page_margin() < RenderMode::Full.page_margin());
    }
}
