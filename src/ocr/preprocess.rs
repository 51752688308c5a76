use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

/// Converts a ticket photo to black text on a white background.
///
/// Tickets are dark ink on light paper, so pixels whose luminance is below
/// `threshold` become black (text) and everything else becomes white.
///
/// Recommended thresholds:
/// - Scans and flat photos: 150
/// - Dim or shaded photos: 110
pub fn binarize_ticket(img: &DynamicImage, threshold: u8) -> GrayImage {
    let gray = img.to_luma8();
    let (width, height) = gray.dimensions();
    let mut output = ImageBuffer::new(width, height);

    for (x, y, pixel) in gray.enumerate_pixels() {
        let value = if pixel[0] < threshold { 0u8 } else { 255u8 };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_binarize_ticket() {
        let mut img = RgbaImage::new(3, 1);

        // Pixel 0: Dark ink (should become black)
        img.put_pixel(0, 0, Rgba([20, 20, 20, 255]));

        // Pixel 1: White paper (should become white)
        img.put_pixel(1, 0, Rgba([250, 250, 250, 255]));

        // Pixel 2: Pink ticket paper (light, should become white)
        img.put_pixel(2, 0, Rgba([250, 200, 210, 255]));

        let result = binarize_ticket(&DynamicImage::ImageRgba8(img), 150);

        assert_eq!(result.get_pixel(0, 0)[0], 0, "Ink should become black");
        assert_eq!(result.get_pixel(1, 0)[0], 255, "Paper should become white");
        assert_eq!(result.get_pixel(2, 0)[0], 255, "Tinted paper should become white");
    }

    #[test]
    fn test_binarize_keeps_dimensions() {
        let img = DynamicImage::new_luma8(40, 25);
        assert_eq!(binarize_ticket(&img, 128).dimensions(), (40, 25));
    }
}
