//! Clipped raster primitives over a tightly packed RGBA8 frame.

pub(crate) fn write_pixel_rgba_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    color: [u8; 4],
) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    let offset = (y as usize * width as usize + x as usize) * 4;
    let Some(pixel) = frame.get_mut(offset..offset + 4) else {
        return;
    };
    pixel.copy_from_slice(&color);
}

pub(crate) fn fill(frame: &mut [u8], color: [u8; 4]) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
}

pub(crate) fn draw_filled_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: u32,
    rect_height: u32,
    color: [u8; 4],
) {
    let left = x.max(0);
    let top = y.max(0);
    let right = (x + rect_width as i32).min(width as i32);
    let bottom = (y + rect_height as i32).min(height as i32);
    for py in top..bottom {
        for px in left..right {
            write_pixel_rgba_clipped(frame, width, height, px, py, color);
        }
    }
}

pub(crate) fn draw_rect_outline(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: u32,
    rect_height: u32,
    color: [u8; 4],
) {
    if rect_width == 0 || rect_height == 0 {
        return;
    }
    let right = x + rect_width as i32 - 1;
    let bottom = y + rect_height as i32 - 1;
    for px in x..=right {
        write_pixel_rgba_clipped(frame, width, height, px, y, color);
        write_pixel_rgba_clipped(frame, width, height, px, bottom, color);
    }
    for py in y..=bottom {
        write_pixel_rgba_clipped(frame, width, height, x, py, color);
        write_pixel_rgba_clipped(frame, width, height, right, py, color);
    }
}

/// Darkens every pixel toward black by `alpha` (255 = fully black).
pub(crate) fn apply_fade(frame: &mut [u8], alpha: u8) {
    if alpha == 0 {
        return;
    }
    let keep = 255 - u16::from(alpha);
    for pixel in frame.chunks_exact_mut(4) {
        for channel in &mut pixel[..3] {
            *channel = (u16::from(*channel) * keep / 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 4), (i32::MAX, i32::MAX)] {
            write_pixel_rgba_clipped(&mut frame, 4, 4, x, y, [255; 4]);
        }
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn filled_rect_is_clipped_to_frame() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        draw_filled_rect(&mut frame, 4, 4, -2, -2, 4, 4, [9, 9, 9, 255]);
        let painted = frame.chunks_exact(4).filter(|pixel| pixel[0] == 9).count();
        assert_eq!(painted, 4);
    }

    #[test]
    fn outline_paints_border_only() {
        let mut frame = vec![0u8; 5 * 5 * 4];
        draw_rect_outline(&mut frame, 5, 5, 0, 0, 5, 5, [1, 1, 1, 255]);
        let center = (2 * 5 + 2) * 4;
        assert_eq!(frame[center], 0);
        assert_eq!(frame[0], 1);
        assert_eq!(frame[(4 * 5 + 4) * 4], 1);
    }

    #[test]
    fn fade_scales_color_channels_and_keeps_alpha() {
        let mut frame = vec![200, 100, 50, 255];
        apply_fade(&mut frame, 255);
        assert_eq!(frame, vec![0, 0, 0, 255]);

        let mut frame = vec![200, 100, 50, 255];
        apply_fade(&mut frame, 0);
        assert_eq!(frame, vec![200, 100, 50, 255]);
    }
}
