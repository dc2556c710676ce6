use std::sync::mpsc;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use screenmark::backend::{HeadlessPresenter, PresentError, Presenter};
use screenmark::draw::{BLACK, BLUE, Element, RED, Renderer, Style};
use screenmark::{Bitmap, Canvas, DisplayError, ScreenLocation, ScreenRegion};

// Tests that present share the process-wide presentation slot.
static PRESENTING: Mutex<()> = Mutex::new(());

fn exclusive() -> MutexGuard<'static, ()> {
    PRESENTING.lock().unwrap_or_else(|e| e.into_inner())
}

fn canvas(width: u32, height: u32) -> Canvas<HeadlessPresenter> {
    Canvas::new(HeadlessPresenter::new(width, height))
}

fn is_red(px: [u8; 4]) -> bool {
    px[3] > 200 && px[0] > 180 && px[1] < 80 && px[2] < 80
}

/// Presenter that records what it was asked to show without sleeping.
#[derive(Default)]
struct RecordingPresenter {
    shown: Vec<(Bitmap, Duration)>,
}

impl Presenter for RecordingPresenter {
    fn screen_size(&self) -> (u32, u32) {
        (200, 150)
    }

    fn present(&mut self, frame: &Bitmap, duration: Duration) -> Result<(), PresentError> {
        self.shown.push((frame.clone(), duration));
        Ok(())
    }
}

/// Presenter that holds the overlay until the test releases it.
struct GatedPresenter {
    started: mpsc::Sender<()>,
    release: mpsc::Receiver<()>,
}

impl Presenter for GatedPresenter {
    fn screen_size(&self) -> (u32, u32) {
        (64, 64)
    }

    fn present(&mut self, _frame: &Bitmap, _duration: Duration) -> Result<(), PresentError> {
        let _ = self.started.send(());
        let _ = self.release.recv();
        Ok(())
    }
}

#[test]
fn empty_canvas_is_fully_transparent() {
    let image = canvas(1920, 1080).create_image().unwrap();
    assert_eq!((image.width(), image.height()), (1920, 1080));
    assert!(image.is_fully_transparent());
}

#[test]
fn box_outline_stays_inside_region_with_offset_shadow() {
    let mut canvas = canvas(400, 300);
    canvas
        .add_box(ScreenRegion::new(100, 100, 50, 40))
        .with_line_color(RED)
        .with_line_width(2);
    let image = canvas.create_image().unwrap();

    let mut red = Vec::new();
    for y in 0..300 {
        for x in 0..400 {
            if is_red(image.pixel(x, y).unwrap()) {
                red.push((x, y));
            }
        }
    }
    assert!(!red.is_empty());
    assert!(red.iter().all(|&(x, y)| (100..150).contains(&x) && (100..140).contains(&y)));
    assert!(red.contains(&(100, 120)));
    assert!(red.contains(&(149, 120)));

    // Shadow of the right edge, shifted down-right and blurred.
    let shadow = image.pixel(154, 120).unwrap();
    assert!(shadow[3] > 30, "expected shadow at (154, 120), got {:?}", shadow);
    assert!(shadow[0] < 60 && shadow[1] < 60 && shadow[2] < 60);

    // Nothing beyond blur radius plus offset, nothing in the middle.
    assert_eq!(image.pixel(165, 120).unwrap()[3], 0);
    assert_eq!(image.pixel(125, 120).unwrap()[3], 0);
}

#[test]
fn circle_is_centered_on_its_anchor() {
    let mut canvas = canvas(400, 400);
    canvas.add_circle(ScreenLocation::new(200, 200));
    let image = canvas.create_image().unwrap();

    let (mut sum_x, mut sum_y, mut count) = (0.0, 0.0, 0.0);
    let (mut min_x, mut max_x) = (u32::MAX, 0);
    for y in 170..230 {
        for x in 170..230 {
            if is_red(image.pixel(x, y).unwrap()) {
                sum_x += x as f64 + 0.5;
                sum_y += y as f64 + 0.5;
                count += 1.0;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
            }
        }
    }
    assert!(count > 0.0);
    let (cx, cy) = (sum_x / count, sum_y / count);
    assert!((cx - 200.0).abs() <= 1.0, "center x {}", cx);
    assert!((cy - 200.0).abs() <= 1.0, "center y {}", cy);
    assert!(min_x >= 190 && max_x < 210);
}

#[test]
fn label_draws_text_on_yellow_badge() {
    let mut canvas = canvas(300, 200);
    let element = canvas
        .add_label(ScreenLocation::new(50, 50), "Hi")
        .with_font_size(24.0)
        .with_color(BLACK)
        .element()
        .clone();
    let image = canvas.create_image().unwrap();

    let badge = canvas
        .renderer()
        .label_bounds(&element)
        .unwrap()
        .expect("labels have bounds");
    assert!(badge.height >= 24, "badge height {}", badge.height);

    let corner = image.pixel(badge.x as u32, badge.y as u32).unwrap();
    assert_eq!(corner, [255, 255, 0, 255]);

    let mut dark = 0;
    for y in badge.y..badge.bottom() {
        for x in badge.x..badge.right() {
            let px = image.pixel(x as u32, y as u32).unwrap();
            if px[3] == 255 && px[0] < 80 && px[1] < 80 && px[2] < 80 {
                dark += 1;
            }
        }
    }
    assert!(dark > 0, "expected black text pixels inside the badge");
}

#[test]
fn alignment_does_not_move_boxes_or_circles() {
    let mut plain = canvas(200, 160);
    plain
        .add_box(ScreenRegion::new(40, 30, 60, 50))
        .add_circle(ScreenLocation::new(120, 100));
    let plain = plain.create_image().unwrap();

    let mut aligned = canvas(200, 160);
    aligned
        .add_box(ScreenRegion::new(40, 30, 60, 50))
        .with_horizontal_alignment_right()
        .with_vertical_alignment_bottom()
        .add_circle(ScreenLocation::new(120, 100))
        .with_horizontal_alignment_left()
        .with_vertical_alignment_top();
    let aligned = aligned.create_image().unwrap();

    assert!(!plain.is_fully_transparent());
    assert_eq!(plain, aligned);
}

#[test]
fn top_left_label_starts_at_its_anchor() {
    let mut canvas = canvas(200, 120);
    canvas
        .add_label(ScreenLocation::new(60, 40), "Hi")
        .with_horizontal_alignment_left()
        .with_vertical_alignment_top();
    let image = canvas.create_image().unwrap();

    assert_eq!(image.pixel(60, 40).unwrap(), [255, 255, 0, 255]);
    assert_eq!(image.pixel(59, 40).unwrap()[3], 0);
    assert_eq!(image.pixel(60, 39).unwrap()[3], 0);
}

#[test]
fn image_survives_display_until_clear() {
    let _guard = exclusive();
    let mut canvas = canvas(200, 200);
    let bitmap = Bitmap::filled(32, 32, [0, 0, 255, 255]);

    let start = Instant::now();
    canvas.add_image(ScreenLocation::new(0, 0), &bitmap).display(0.25).unwrap();
    assert!(start.elapsed() >= Duration::from_millis(250));
    assert_eq!(canvas.presenter().presentations(), 1);

    let image = canvas.create_image().unwrap();
    assert_eq!(image.pixel(16, 16).unwrap(), [0, 0, 255, 255]);
    assert_eq!(canvas.presenter().last_frame(), Some(&image));

    canvas.clear();
    assert!(canvas.create_image().unwrap().is_fully_transparent());
}

#[test]
fn later_elements_paint_over_earlier_ones() {
    let region = ScreenRegion::new(100, 100, 50, 40);
    let anchor = ScreenLocation::new(150, 120);

    let mut both = canvas(300, 300);
    both.add_box(region)
        .with_line_color(BLUE)
        .add_circle(anchor)
        .with_line_color(RED);
    let both = both.create_image().unwrap();

    let mut box_only = canvas(300, 300);
    box_only.add_box(region).with_line_color(BLUE);
    let box_only = box_only.create_image().unwrap();

    let mut circle_only = canvas(300, 300);
    circle_only.add_circle(anchor).with_line_color(RED);
    let circle_only = circle_only.create_image().unwrap();

    let mut overlapping = 0;
    for y in 0..300 {
        for x in 0..300 {
            let top = circle_only.pixel(x, y).unwrap();
            if top[3] != 255 {
                continue;
            }
            assert_eq!(both.pixel(x, y).unwrap(), top, "pixel ({}, {})", x, y);
            if box_only.pixel(x, y).unwrap()[3] > 0 {
                overlapping += 1;
            }
        }
    }
    assert!(overlapping > 0, "circle should overlap the box");
}

#[test]
fn shadow_centroid_is_offset_from_content() {
    let renderer = Renderer::default();
    let element = Element::rect(40, 30, 25, 15, Style::default());
    let layers = renderer.render_layers(&element).unwrap().unwrap();
    let shadow = layers.shadow.as_ref().expect("shadow enabled by default");

    let centroid = |bitmap: &Bitmap, origin: (i32, i32)| {
        let (mut sx, mut sy, mut total) = (0.0, 0.0, 0.0);
        for y in 0..bitmap.height() {
            for x in 0..bitmap.width() {
                let a = bitmap.pixel(x, y).unwrap()[3] as f64;
                sx += a * (x as f64 + origin.0 as f64);
                sy += a * (y as f64 + origin.1 as f64);
                total += a;
            }
        }
        (sx / total, sy / total)
    };

    let (cx, cy) = centroid(&layers.content, layers.content_origin);
    let (sx, sy) = centroid(shadow, layers.shadow_origin);
    assert!((sx - cx - 5.0).abs() < 0.5, "dx {}", sx - cx);
    assert!((sy - cy - 5.0).abs() < 0.5, "dy {}", sy - cy);
}

#[test]
fn integer_and_fractional_seconds_present_identically() {
    let _guard = exclusive();
    let mut canvas = Canvas::new(RecordingPresenter::default());
    canvas
        .add_box(ScreenRegion::new(10, 10, 30, 30))
        .add_label(ScreenLocation::new(100, 80), "three");

    canvas.display(3).unwrap();
    canvas.display(3.0).unwrap();

    let shown = &canvas.presenter().shown;
    assert_eq!(shown.len(), 2);
    assert_eq!(shown[0].0, shown[1].0);
    assert_eq!(shown[0].1, Duration::from_secs(3));
    assert_eq!(shown[0].1, shown[1].1);
    assert_eq!((shown[0].0.width(), shown[0].0.height()), (200, 150));
}

#[test]
fn overlapping_display_is_busy_and_keeps_scene() {
    let _guard = exclusive();
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();

    let first = thread::spawn(move || {
        let mut canvas = Canvas::new(GatedPresenter {
            started: started_tx,
            release: release_rx,
        });
        canvas.add_circle(ScreenLocation::new(32, 32));
        canvas.display(1)
    });
    started_rx.recv().unwrap();

    let mut second = canvas(64, 64);
    second.add_box(ScreenRegion::new(5, 5, 10, 10));
    let err = second.display(0).unwrap_err();
    assert!(matches!(err, DisplayError::Present(PresentError::Busy)));
    assert_eq!(second.scene().len(), 1);

    release_tx.send(()).unwrap();
    first.join().unwrap().unwrap();

    second.display(0).unwrap();
    assert_eq!(second.presenter().presentations(), 1);
}
