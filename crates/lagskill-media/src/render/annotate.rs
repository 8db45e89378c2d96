//! Per-frame analysis annotation.

use image::RgbImage;

use super::canvas::{
    draw_arrow, draw_rect_outline, fill_circle, fill_rect, BLACK, GREEN, RED, WHITE, YELLOW,
};
use super::font::{draw_text, text_height, text_width};
use crate::analysis::TrackedBox;

const LABEL_SCALE: u32 = 2;
const INFO_SCALE: u32 = 2;

/// Frame-level values shown in the info bar.
#[derive(Debug, Clone, Copy)]
pub struct FrameStatus {
    pub frame_index: u64,
    pub player_id: Option<u32>,
    pub fps: f64,
}

/// `FRAME n | PLAYER ID k | ENEMIES m | FPS f`
pub fn info_line(status: &FrameStatus, enemies: usize) -> String {
    let player = match status.player_id {
        Some(id) => format!("PLAYER ID {id}"),
        None => "PLAYER DETECTING".to_string(),
    };
    format!(
        "FRAME {} | {} | ENEMIES {} | FPS {:.0}",
        status.frame_index, player, enemies, status.fps
    )
}

/// Draw boxes, labels and the info bar onto `frame`.
pub fn annotate_frame(
    frame: &mut RgbImage,
    boxes: &[TrackedBox],
    status: &FrameStatus,
    arrow_min_speed: f64,
) {
    for b in boxes {
        draw_tracked_box(frame, b, arrow_min_speed);
    }

    let enemies = boxes.iter().filter(|b| !b.is_player).count();
    let line = info_line(status, enemies);
    let pad = 8i64;
    let w = text_width(&line, INFO_SCALE) as i64;
    let h = text_height(INFO_SCALE) as i64;
    fill_rect(frame, 10, 10, 10 + w + 2 * pad, 10 + h + 2 * pad, BLACK);
    draw_text(frame, 10 + pad, 10 + pad, &line, INFO_SCALE, WHITE);
}

fn draw_tracked_box(frame: &mut RgbImage, b: &TrackedBox, arrow_min_speed: f64) {
    let (color, thickness, label) = if b.is_player {
        (GREEN, 3, "YOU")
    } else {
        (RED, 2, "ENEMY")
    };

    let x1 = b.bbox.x1.round() as i64;
    let y1 = b.bbox.y1.round() as i64;
    let x2 = b.bbox.x2.round() as i64;
    let y2 = b.bbox.y2.round() as i64;
    draw_rect_outline(frame, x1, y1, x2, y2, thickness, color);

    // Label tab above the box
    let label_h = text_height(LABEL_SCALE) as i64 + 6;
    let label_w = text_width(label, LABEL_SCALE) as i64 + 6;
    fill_rect(frame, x1, y1 - label_h, x1 + label_w, y1, color);
    draw_text(frame, x1 + 3, y1 - label_h + 3, label, LABEL_SCALE, WHITE);

    let confidence = format!("{:.0}%", b.confidence * 100.0);
    draw_text(frame, x1, y2 + 6, &confidence, LABEL_SCALE, color);

    if !b.is_player {
        let distance = format!("{:.0}M", b.estimated_distance);
        let y = y2 + 6 + text_height(LABEL_SCALE) as i64 + 4;
        draw_text(frame, x1, y, &distance, LABEL_SCALE, YELLOW);
    }

    let cx = b.bbox.cx().round() as i64;
    let cy = b.bbox.cy().round() as i64;
    let (vx, vy) = b.velocity;
    if vx.abs() > arrow_min_speed || vy.abs() > arrow_min_speed {
        let tip = (cx + (vx * 3.0).round() as i64, cy + (vy * 3.0).round() as i64);
        draw_arrow(frame, (cx, cy), tip, 2, YELLOW);
    }

    fill_circle(frame, cx, cy, 3, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use lagskill_models::BoundingBox;

    fn tracked(is_player: bool) -> TrackedBox {
        TrackedBox {
            track_id: 0,
            bbox: BoundingBox::new(40.0, 40.0, 80.0, 120.0),
            confidence: 0.87,
            is_player,
            estimated_distance: 12.3,
            velocity: (5.0, 0.0),
        }
    }

    #[test]
    fn test_info_line() {
        let status = FrameStatus {
            frame_index: 12,
            player_id: Some(3),
            fps: 59.94,
        };
        assert_eq!(info_line(&status, 2), "FRAME 12 | PLAYER ID 3 | ENEMIES 2 | FPS 60");

        let status = FrameStatus {
            player_id: None,
            ..status
        };
        assert!(info_line(&status, 0).contains("PLAYER DETECTING"));
    }

    #[test]
    fn test_player_and_enemy_colors() {
        let mut frame = RgbImage::from_pixel(200, 200, Rgb([50, 50, 50]));
        annotate_frame(
            &mut frame,
            &[tracked(true)],
            &FrameStatus {
                frame_index: 0,
                player_id: Some(0),
                fps: 30.0,
            },
            2.0,
        );
        assert_eq!(*frame.get_pixel(40, 80), GREEN);
        assert_eq!(*frame.get_pixel(50, 60), Rgb([50, 50, 50]));

        let mut frame = RgbImage::from_pixel(200, 200, Rgb([50, 50, 50]));
        annotate_frame(
            &mut frame,
            &[tracked(false)],
            &FrameStatus {
                frame_index: 0,
                player_id: None,
                fps: 30.0,
            },
            2.0,
        );
        assert_eq!(*frame.get_pixel(40, 80), RED);
    }

    #[test]
    fn test_info_bar_background() {
        let mut frame = RgbImage::from_pixel(640, 100, Rgb([200, 200, 200]));
        annotate_frame(
            &mut frame,
            &[],
            &FrameStatus {
                frame_index: 1,
                player_id: None,
                fps: 30.0,
            },
            2.0,
        );
        assert_eq!(*frame.get_pixel(11, 11), BLACK);
        assert_eq!(*frame.get_pixel(5, 5), Rgb([200, 200, 200]));
    }
}
