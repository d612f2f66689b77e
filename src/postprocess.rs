//! Normalizes raw viewport captures to a fixed 1280x720 PNG.

use anyhow::{bail, Context, Result};
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};
use std::path::Path;

pub const TARGET_WIDTH: u32 = 1280;
pub const TARGET_HEIGHT: u32 = 720;

/// Scaled size and centered crop offset for a cover fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverFit {
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub crop_x: u32,
    pub crop_y: u32,
}

/// Scales `src` uniformly until it covers `dst` on both axes, then centers the
/// crop on the overflowing axis.
pub fn cover_fit(src: (u32, u32), dst: (u32, u32)) -> Result<CoverFit> {
    let (sw, sh) = (u64::from(src.0), u64::from(src.1));
    let (dw, dh) = (u64::from(dst.0), u64::from(dst.1));
    if sw == 0 || sh == 0 || dw == 0 || dh == 0 {
        bail!("cannot fit {}x{} into {}x{}", src.0, src.1, dst.0, dst.1);
    }

    // sw/sh >= dw/dh: source is at least as wide, so height drives the scale.
    let (scaled_w, scaled_h) = if sw * dh >= sh * dw {
        ((sw * dh).div_ceil(sh), dh)
    } else {
        (dw, (sh * dw).div_ceil(sw))
    };
    let scaled_width = u32::try_from(scaled_w).context("scaled width overflow")?;
    let scaled_height = u32::try_from(scaled_h).context("scaled height overflow")?;

    Ok(CoverFit {
        scaled_width,
        scaled_height,
        crop_x: (scaled_width - dst.0) / 2,
        crop_y: (scaled_height - dst.1) / 2,
    })
}

/// Decodes `raw` and returns it cover-fitted to 1280x720.
pub fn normalize(raw: &[u8]) -> Result<DynamicImage> {
    let img = image::load_from_memory(raw).context("decoding capture")?;
    let fit = cover_fit(img.dimensions(), (TARGET_WIDTH, TARGET_HEIGHT))?;
    let scaled = img.resize_exact(fit.scaled_width, fit.scaled_height, FilterType::Lanczos3);
    Ok(scaled.crop_imm(fit.crop_x, fit.crop_y, TARGET_WIDTH, TARGET_HEIGHT))
}

/// Normalizes `raw` and writes it to `path` as PNG, replacing any existing
/// file. The parent directory must exist.
pub fn write_slide(raw: &[u8], path: &Path) -> Result<()> {
    let img = normalize(raw)?;
    img.save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn png(img: RgbImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn portrait_viewport_crops_vertically() {
        let fit = cover_fit((595, 842), (1280, 720)).unwrap();
        assert_eq!(fit.scaled_width, 1280);
        assert_eq!(fit.scaled_height, 1812);
        assert_eq!(fit.crop_x, 0);
        assert_eq!(fit.crop_y, 546);
    }

    #[test]
    fn wide_source_crops_horizontally() {
        let fit = cover_fit((2000, 720), (1280, 720)).unwrap();
        assert_eq!((fit.scaled_width, fit.scaled_height), (2000, 720));
        assert_eq!((fit.crop_x, fit.crop_y), (360, 0));
    }

    #[test]
    fn exact_ratio_needs_no_crop() {
        let fit = cover_fit((640, 360), (1280, 720)).unwrap();
        assert_eq!(
            fit,
            CoverFit {
                scaled_width: 1280,
                scaled_height: 720,
                crop_x: 0,
                crop_y: 0
            }
        );
    }

    #[test]
    fn scaled_size_always_covers_target() {
        for (w, h) in [(1, 1), (3, 1000), (1000, 3), (1279, 719), (1921, 1081), (595, 842)] {
            let fit = cover_fit((w, h), (1280, 720)).unwrap();
            assert!(fit.scaled_width >= 1280, "{w}x{h}");
            assert!(fit.scaled_height >= 720, "{w}x{h}");
            assert!(fit.crop_x + 1280 <= fit.scaled_width);
            assert!(fit.crop_y + 720 <= fit.scaled_height);
        }
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(cover_fit((0, 10), (1280, 720)).is_err());
    }

    #[test]
    fn output_is_always_target_size() {
        for (w, h) in [(595, 842), (1920, 1080), (64, 48), (300, 900)] {
            let out = normalize(&png(RgbImage::new(w, h))).unwrap();
            assert_eq!(out.dimensions(), (TARGET_WIDTH, TARGET_HEIGHT), "{w}x{h}");
        }
    }

    #[test]
    fn crop_is_centered() {
        // Tall source, top half black, bottom half white. After scaling to
        // 1280x5120 the crop window is rows 2200..2920, so the split lands on
        // output row 360.
        let src = RgbImage::from_fn(100, 400, |_, y| {
            if y < 200 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let out = normalize(&png(src)).unwrap().to_rgb8();
        assert_eq!(out.get_pixel(640, 100), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(640, 620), &Rgb([255, 255, 255]));
    }

    #[test]
    fn garbage_buffer_is_an_error() {
        assert!(normalize(b"not an image").is_err());
    }

    #[test]
    fn write_overwrites_existing_file() {
        let path = std::env::temp_dir().join(format!("prezishot_pp_{}.png", std::process::id()));
        std::fs::write(&path, b"stale").unwrap();
        write_slide(&png(RgbImage::new(40, 30)), &path).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!(img.dimensions(), (1280, 720));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_parent_dir_is_an_error() {
        let path = std::env::temp_dir()
            .join("prezishot_no_such_dir")
            .join("nested")
            .join("prezi-0.png");
        assert!(write_slide(&png(RgbImage::new(40, 30)), &path).is_err());
    }
}
