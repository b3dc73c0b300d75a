use eframe::egui;
use image::RgbaImage;

pub fn texture_from_image(ctx: &egui::Context, image: &RgbaImage, texture_id: &str) -> egui::TextureHandle {
    let size = [image.width() as _, image.height() as _];
    let pixels = image.as_flat_samples();
    ctx.load_texture(
        texture_id,
        egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice()),
        egui::TextureOptions::default(),
    )
}

/// Shorten a title to `max_chars`, ending with "..." when cut
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }
    let kept: String = title.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_title() {
        assert_eq!(truncate_title("Hades", 20), "Hades");
        assert_eq!(truncate_title("Grand Theft Auto V Enhanced", 20), "Grand Theft Auto ...");
        assert_eq!(truncate_title("ÖÖÖÖÖÖ", 5), "ÖÖ...");
    }
}
