use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

/// Size of a cover card on the dashboard
pub const COVER_WIDTH: u32 = 300;
pub const COVER_HEIGHT: u32 = 450;

const BLUR_RADIUS: f32 = 10.0;
const BLUR_HEIGHT_RATIO: f32 = 0.2;
const CORNER_RADIUS: u32 = 10;

/// Resize a cover to card size and apply the dashboard's blur and corner treatment
pub fn prepare_cover(image: &DynamicImage) -> RgbaImage {
    let resized = imageops::resize(&image.to_rgba8(), COVER_WIDTH, COVER_HEIGHT, FilterType::Triangle);
    let blurred = add_blur_gradient(&resized, BLUR_RADIUS, BLUR_HEIGHT_RATIO);
    add_rounded_corners(&blurred, CORNER_RADIUS)
}

/// Blend a blurred copy into the image, fully blurred at the bottom and sharp at the top.
///
/// Rows at or below `height * (1 - blur_height_ratio)` take the blurred
/// pixels. Above that row the share of the original falls linearly from the
/// top row (original only) down to the start row.
pub fn add_blur_gradient(image: &RgbaImage, blur_radius: f32, blur_height_ratio: f32) -> RgbaImage {
    let blurred = imageops::blur(image, blur_radius);
    let (width, height) = image.dimensions();
    let blur_start = (height as f32 * (1.0 - blur_height_ratio.clamp(0.0, 1.0))) as u32;

    RgbaImage::from_fn(width, height, |x, y| {
        let mask = if y >= blur_start {
            0
        } else {
            (255.0 * (1.0 - y as f32 / blur_start as f32)) as u8
        };
        blend(image.get_pixel(x, y), blurred.get_pixel(x, y), mask)
    })
}

// `mask` is the weight of `sharp` out of 255
fn blend(sharp: &Rgba<u8>, blurred: &Rgba<u8>, mask: u8) -> Rgba<u8> {
    let mask = mask as u32;
    let mut out = [0u8; 4];
    for (i, channel) in out.iter_mut().enumerate() {
        let value = sharp[i] as u32 * mask + blurred[i] as u32 * (255 - mask);
        *channel = ((value + 127) / 255) as u8;
    }
    Rgba(out)
}

/// Make everything outside a rounded rectangle transparent
pub fn add_rounded_corners(image: &RgbaImage, radius: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let radius = radius.min(width / 2).min(height / 2) as f32;
    let mut rounded = image.clone();

    for (x, y, pixel) in rounded.enumerate_pixels_mut() {
        if outside_corner(x, y, width as f32, height as f32, radius) {
            pixel[3] = 0;
        }
    }

    rounded
}

fn outside_corner(x: u32, y: u32, width: f32, height: f32, radius: f32) -> bool {
    let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);

    let cx = if px < radius {
        radius
    } else if px > width - radius {
        width - radius
    } else {
        return false;
    };
    let cy = if py < radius {
        radius
    } else if py > height - radius {
        height - radius
    } else {
        return false;
    };

    (px - cx).powi(2) + (py - cy).powi(2) > radius.powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn striped(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            if x % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    #[test]
    fn test_blur_gradient_keeps_top_and_blurs_bottom() {
        let image = striped(20, 50);
        let blurred = imageops::blur(&image, 3.0);
        let result = add_blur_gradient(&image, 3.0, 0.2);

        assert_eq!(result.dimensions(), (20, 50));
        for x in 0..20 {
            assert_eq!(result.get_pixel(x, 0), image.get_pixel(x, 0));
            assert_eq!(result.get_pixel(x, 49), blurred.get_pixel(x, 49));
            assert_eq!(result.get_pixel(x, 40), blurred.get_pixel(x, 40));
        }
    }

    #[test]
    fn test_full_ratio_blurs_everything() {
        let image = striped(10, 10);
        let blurred = imageops::blur(&image, 2.0);
        assert_eq!(add_blur_gradient(&image, 2.0, 1.0), blurred);
    }

    #[test]
    fn test_rounded_corners() {
        let image = RgbaImage::from_pixel(40, 40, Rgba([10, 20, 30, 255]));
        let rounded = add_rounded_corners(&image, 10);

        for (x, y) in [(0, 0), (39, 0), (0, 39), (39, 39)] {
            assert_eq!(rounded.get_pixel(x, y)[3], 0);
        }
        for (x, y) in [(20, 20), (0, 20), (20, 0), (39, 20)] {
            assert_eq!(rounded.get_pixel(x, y)[3], 255);
        }
        assert_eq!(&rounded.get_pixel(0, 0).0[..3], &[10, 20, 30]);
    }

    #[test]
    fn test_prepare_cover_size() {
        let image = DynamicImage::ImageRgba8(striped(60, 90));
        let cover = prepare_cover(&image);
        assert_eq!(cover.dimensions(), (COVER_WIDTH, COVER_HEIGHT));
        assert_eq!(cover.get_pixel(0, 0)[3], 0);
    }
}
