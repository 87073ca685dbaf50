//! The mosaic canvas.
//!
//! Paints the navigable stage plane and feeds pointer, wheel, key, and
//! file-drop input through the [`MosaicView`] camera, collecting the
//! resulting [`MosaicEvent`]s for the application shell. The crosshair
//! overlay marks the current stage position and keeps a constant on-screen
//! footprint across zoom levels.

use crate::coord::ScenePoint;
use crate::mosaic::{CaptureIntent, Crosshair, MosaicEvent, MosaicView, ZoomDirection};
use eframe::egui::{self, Color32, Key, Pos2, Stroke, Ui};
use log::warn;

/// Scene-space spacing of the background grid at scale 1.0, in pixels.
const GRID_SPACING: f64 = 100.0;

/// Minimum on-screen distance between grid lines; the grid coarsens in
/// powers of two when zooming out so the segment count stays bounded.
const MIN_GRID_PITCH: f64 = 40.0;

fn grid_spacing(scale: f64) -> Option<f64> {
    if !scale.is_finite() || scale <= 0.0 {
        return None;
    }
    let mut spacing = GRID_SPACING;
    while spacing * scale < MIN_GRID_PITCH {
        spacing *= 2.0;
    }
    Some(spacing)
}

const CAPTURE_KEYS: [(Key, char); 8] = [
    (Key::Space, ' '),
    (Key::Num3, '3'),
    (Key::Num5, '5'),
    (Key::Num7, '7'),
    (Key::Num9, '9'),
    (Key::G, 'g'),
    (Key::P, 'p'),
    (Key::S, 's'),
];

pub struct MosaicPanel {
    view: MosaicView,
    crosshair: Crosshair,
    /// Open context menu: the scene point it acts on and its screen anchor.
    menu: Option<(ScenePoint, Pos2)>,
    /// Pending rejected-drop notice, shown modally until dismissed.
    drop_error: Option<String>,
}

impl MosaicPanel {
    pub fn new(zoom_in_ratio: f64, crosshair_size: f64) -> Self {
        Self {
            view: MosaicView::new(zoom_in_ratio),
            crosshair: Crosshair::new(crosshair_size),
            menu: None,
            drop_error: None,
        }
    }

    pub fn view(&self) -> &MosaicView {
        &self.view
    }

    /// Stage-position overlay, for the instrument side to move and show.
    pub fn crosshair_mut(&mut self) -> &mut Crosshair {
        &mut self.crosshair
    }

    pub fn show(&mut self, ui: &mut Ui) -> Vec<MosaicEvent> {
        let mut events = Vec::new();

        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        let viewport = (f64::from(rect.width()), f64::from(rect.height()));
        let relative = |pos: Pos2| (f64::from(pos.x - rect.min.x), f64::from(pos.y - rect.min.y));

        painter.rect_filled(rect, 0.0, Color32::WHITE);
        self.paint_grid(&painter, rect, viewport);
        self.paint_crosshair(&painter, rect, viewport);

        // Wheel zoom, one geometric step per tick.
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let direction = if scroll > 0.0 {
                    ZoomDirection::In
                } else {
                    ZoomDirection::Out
                };
                let event = self.view.zoom(direction);
                self.crosshair.set_scale(self.view.scale());
                events.push(event);
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                events.push(self.view.primary_click(relative(pos), viewport));
            }
            self.menu = None;
        }

        if response.secondary_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                match self.view.secondary_click(relative(pos), viewport) {
                    MosaicEvent::ContextMenu(point) => {
                        self.menu = Some((point, pos));
                        events.push(MosaicEvent::ContextMenu(point));
                    }
                    event => events.push(event),
                }
            }
        }

        // Capture hot-keys act at the hovered scene coordinate.
        if let Some(hover) = response.hover_pos() {
            let cursor = relative(hover);
            for (key, ch) in CAPTURE_KEYS {
                if ui.input(|i| i.key_pressed(key)) {
                    if let Some(intent) = CaptureIntent::from_key(ch) {
                        events.push(self.view.key_press(intent, cursor, viewport));
                    }
                }
            }

            let scene = self.view.to_scene(cursor, viewport);
            painter.text(
                rect.left_bottom() + egui::vec2(6.0, -6.0),
                egui::Align2::LEFT_BOTTOM,
                format!("{}  scale {:.3}", scene, self.view.scale()),
                egui::FontId::monospace(11.0),
                Color32::DARK_GRAY,
            );
        }

        self.handle_drops(ui, &mut events);
        self.context_menu(ui, &mut events);
        self.drop_error_notice(ui.ctx());

        let _ = response.on_hover_text(CaptureIntent::legend());
        events
    }

    fn paint_grid(&self, painter: &egui::Painter, rect: egui::Rect, viewport: (f64, f64)) {
        let Some(spacing) = grid_spacing(self.view.scale()) else {
            return;
        };
        let stroke = Stroke::new(1.0, Color32::from_gray(225));
        let top_left = self.view.to_scene((0.0, 0.0), viewport);
        let bottom_right = self.view.to_scene(viewport, viewport);

        let mut x = (top_left.x / spacing).floor() * spacing;
        while x <= bottom_right.x {
            let (vx, _) = self.view.to_viewport(ScenePoint::pixels(x, 0.0), viewport);
            let vx = rect.min.x + vx as f32;
            painter.line_segment([Pos2::new(vx, rect.min.y), Pos2::new(vx, rect.max.y)], stroke);
            x += spacing;
        }
        let mut y = (top_left.y / spacing).floor() * spacing;
        while y <= bottom_right.y {
            let (_, vy) = self.view.to_viewport(ScenePoint::pixels(0.0, y), viewport);
            let vy = rect.min.y + vy as f32;
            painter.line_segment([Pos2::new(rect.min.x, vy), Pos2::new(rect.max.x, vy)], stroke);
            y += spacing;
        }
    }

    fn paint_crosshair(&self, painter: &egui::Painter, rect: egui::Rect, viewport: (f64, f64)) {
        if !self.crosshair.is_visible() {
            return;
        }
        // Scene radius times view scale is the constant on-screen size.
        let radius = (self.crosshair.size() * self.view.scale()) as f32;
        let (vx, vy) = self.view.to_viewport(self.crosshair.position(), viewport);
        let center = Pos2::new(rect.min.x + vx as f32, rect.min.y + vy as f32);
        if !rect.contains(center) {
            return;
        }
        let stroke = Stroke::new(1.5, Color32::BLUE);
        painter.line_segment(
            [center - egui::vec2(radius, 0.0), center + egui::vec2(radius, 0.0)],
            stroke,
        );
        painter.line_segment(
            [center - egui::vec2(0.0, radius), center + egui::vec2(0.0, radius)],
            stroke,
        );
        painter.circle_stroke(center, radius / 2.0, stroke);
    }

    fn handle_drops(&mut self, ui: &Ui, events: &mut Vec<MosaicEvent>) {
        let dropped = ui.ctx().input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }
        let paths: Vec<_> = dropped.into_iter().filter_map(|f| f.path).collect();
        match self.view.accept_drop(&paths) {
            Ok(accepted) if !accepted.is_empty() => {
                events.push(MosaicEvent::DroppedFiles(accepted));
            }
            Ok(_) => {}
            Err(e) => {
                warn!("file drop rejected: {}", e);
                self.drop_error = Some("Please limit dropped files to a single type".to_string());
            }
        }
    }

    fn context_menu(&mut self, ui: &Ui, events: &mut Vec<MosaicEvent>) {
        let Some((point, anchor)) = self.menu else {
            return;
        };
        let mut close = false;
        egui::Area::new(egui::Id::new("mosaic_context_menu"))
            .fixed_pos(anchor)
            .order(egui::Order::Foreground)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    if ui.button("Start extrapolation").clicked() {
                        self.view.begin_extrapolation(point);
                        close = true;
                    }
                    if ui.button("Mark position").clicked() {
                        events.push(MosaicEvent::Capture {
                            intent: CaptureIntent::MarkPosition,
                            at: point,
                        });
                        close = true;
                    }
                    if ui.button("Mark section").clicked() {
                        events.push(MosaicEvent::Capture {
                            intent: CaptureIntent::MarkSection,
                            at: point,
                        });
                        close = true;
                    }
                });
            });
        if close {
            self.menu = None;
        }
    }

    fn drop_error_notice(&mut self, ctx: &egui::Context) {
        let Some(message) = self.drop_error.clone() else {
            return;
        };
        egui::Window::new("Invalid drop")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("Ok").clicked() {
                    self.drop_error = None;
                }
            });
    }
}
