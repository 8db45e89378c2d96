//! Clipped drawing primitives on RGB frames.
//!
//! Coordinates are signed so shapes may start off-frame; every write is
//! clipped to the image bounds.

use image::{Rgb, RgbImage};

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);

#[inline]
pub fn put_pixel(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u64) < img.width() as u64 && (y as u64) < img.height() as u64 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Clip the half-open rectangle `[x0, x1) x [y0, y1)` to the image.
fn clip(img: &RgbImage, x0: i64, y0: i64, x1: i64, y1: i64) -> Option<(u32, u32, u32, u32)> {
    let x0 = x0.max(0);
    let y0 = y0.max(0);
    let x1 = x1.min(img.width() as i64);
    let y1 = y1.min(img.height() as i64);
    (x0 < x1 && y0 < y1).then_some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

/// Fill `[x0, x1) x [y0, y1)`.
pub fn fill_rect(img: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
    let Some((x0, y0, x1, y1)) = clip(img, x0, y0, x1, y1) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, color);
        }
    }
}

/// Blend `color` over `[x0, x1) x [y0, y1)` with the given opacity.
pub fn blend_rect(
    img: &mut RgbImage,
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
    color: Rgb<u8>,
    opacity: f32,
) {
    let Some((x0, y0, x1, y1)) = clip(img, x0, y0, x1, y1) else {
        return;
    };
    let a = opacity.clamp(0.0, 1.0);
    for y in y0..y1 {
        for x in x0..x1 {
            let px = img.get_pixel_mut(x, y);
            for c in 0..3 {
                let v = px.0[c] as f32 * (1.0 - a) + color.0[c] as f32 * a;
                px.0[c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Rectangle outline with the stroke drawn inward from the edges.
pub fn draw_rect_outline(
    img: &mut RgbImage,
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
    thickness: i64,
    color: Rgb<u8>,
) {
    let t = thickness.max(1);
    fill_rect(img, x0, y0, x1, y0 + t, color);
    fill_rect(img, x0, y1 - t, x1, y1, color);
    fill_rect(img, x0, y0, x0 + t, y1, color);
    fill_rect(img, x1 - t, y0, x1, y1, color);
}

/// Bresenham line with a square brush.
pub fn draw_line(
    img: &mut RgbImage,
    (mut x0, mut y0): (i64, i64),
    (x1, y1): (i64, i64),
    thickness: i64,
    color: Rgb<u8>,
) {
    let r = (thickness.max(1) - 1) / 2;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        fill_rect(img, x0 - r, y0 - r, x0 + r + 1, y0 + r + 1, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Line with a two-stroke head at `to`.
pub fn draw_arrow(
    img: &mut RgbImage,
    from: (i64, i64),
    to: (i64, i64),
    thickness: i64,
    color: Rgb<u8>,
) {
    draw_line(img, from, to, thickness, color);

    let dx = (to.0 - from.0) as f64;
    let dy = (to.1 - from.1) as f64;
    let len = dx.hypot(dy);
    if len < 1.0 {
        return;
    }
    let head = (len * 0.3).max(4.0);
    let angle = dy.atan2(dx);
    for side in [-1.0f64, 1.0] {
        let a = angle + std::f64::consts::PI + side * std::f64::consts::FRAC_PI_6;
        let tip = (
            to.0 + (head * a.cos()).round() as i64,
            to.1 + (head * a.sin()).round() as i64,
        );
        draw_line(img, to, tip, thickness, color);
    }
}

pub fn fill_circle(img: &mut RgbImage, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
    let r2 = radius * radius;
    for y in -radius..=radius {
        for x in -radius..=radius {
            if x * x + y * y <= r2 {
                put_pixel(img, cx + x, cy + y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_clips() {
        let mut img = RgbImage::new(10, 10);
        fill_rect(&mut img, -5, -5, 3, 3, WHITE);
        assert_eq!(*img.get_pixel(0, 0), WHITE);
        assert_eq!(*img.get_pixel(2, 2), WHITE);
        assert_eq!(*img.get_pixel(3, 3), BLACK);

        // Fully off-frame is a no-op
        fill_rect(&mut img, 20, 20, 30, 30, WHITE);
    }

    #[test]
    fn test_blend_rect() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb([100, 200, 50]));
        blend_rect(&mut img, 0, 0, 4, 2, BLACK, 0.6);
        assert_eq!(*img.get_pixel(0, 0), Rgb([40, 80, 20]));
        assert_eq!(*img.get_pixel(0, 3), Rgb([100, 200, 50]));
    }

    #[test]
    fn test_outline_leaves_interior() {
        let mut img = RgbImage::new(20, 20);
        draw_rect_outline(&mut img, 2, 2, 18, 18, 2, GREEN);
        assert_eq!(*img.get_pixel(2, 10), GREEN);
        assert_eq!(*img.get_pixel(3, 10), GREEN);
        assert_eq!(*img.get_pixel(10, 10), BLACK);
    }

    #[test]
    fn test_line_endpoints() {
        let mut img = RgbImage::new(20, 20);
        draw_line(&mut img, (1, 1), (15, 9), 1, YELLOW);
        assert_eq!(*img.get_pixel(1, 1), YELLOW);
        assert_eq!(*img.get_pixel(15, 9), YELLOW);
    }

    #[test]
    fn test_circle() {
        let mut img = RgbImage::new(10, 10);
        fill_circle(&mut img, 5, 5, 2, RED);
        assert_eq!(*img.get_pixel(5, 5), RED);
        assert_eq!(*img.get_pixel(7, 5), RED);
        assert_eq!(*img.get_pixel(7, 7), BLACK);
    }
}
