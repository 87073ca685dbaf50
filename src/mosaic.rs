//! Mosaic view core: zoom, coordinate translation, and navigation intents.
//!
//! [`MosaicView`] is a viewport over the unbounded mosaic plane. It owns the
//! camera (center + geometric scale) and translates pointer, wheel, key, and
//! file-drop input into [`MosaicEvent`]s for the instrument-control side.
//! It performs no capture logic itself: a key press becomes a
//! [`CaptureIntent`] tagged with the cursor's scene coordinate, nothing more.
//!
//! All coordinates cross this boundary as pixel-tagged [`ScenePoint`]s;
//! conversion to stage micrometers happens elsewhere.

use crate::coord::ScenePoint;
use crate::error::{AppResult, ScopeError};
use std::path::{Path, PathBuf};

/// Multiplicative zoom step per wheel tick; zoom-out uses the reciprocal.
pub const DEFAULT_ZOOM_IN_RATIO: f64 = 1.2;

/// On-screen crosshair footprint in viewport pixels at scale 1.0.
pub const DEFAULT_CROSSHAIR_SIZE: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// The fixed hot-key set forwarded to the capture handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureIntent {
    /// Take a single picture (space).
    Single,
    /// Take an n-picture spiral ('3', '5', '7', '9').
    Spiral(u32),
    /// Take a grid of pictures ('g').
    Grid,
    /// Bookmark the cursor position ('p').
    MarkPosition,
    /// Bookmark the cursor position as a section ('s').
    MarkSection,
}

impl CaptureIntent {
    /// Map a pressed key to an intent; unknown keys are ignored.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            ' ' => Some(CaptureIntent::Single),
            '3' => Some(CaptureIntent::Spiral(3)),
            '5' => Some(CaptureIntent::Spiral(5)),
            '7' => Some(CaptureIntent::Spiral(7)),
            '9' => Some(CaptureIntent::Spiral(9)),
            'g' => Some(CaptureIntent::Grid),
            'p' => Some(CaptureIntent::MarkPosition),
            's' => Some(CaptureIntent::MarkSection),
            _ => None,
        }
    }

    /// The user-facing hot-key legend, shown as the canvas tooltip.
    pub fn legend() -> &'static str {
        "Hot keys are 'space','3','5','7','9','g','p','s'"
    }
}

/// Navigation intents emitted towards the instrument-control side.
#[derive(Debug, Clone, PartialEq)]
pub enum MosaicEvent {
    /// The view scale changed; overlays rescale from this.
    ScaleChanged(f64),
    /// The camera recentered on a scene point (pan, not selection).
    Centered(ScenePoint),
    /// Open a context menu at a scene point.
    ContextMenu(ScenePoint),
    /// A completed two-point extrapolation gesture.
    Extrapolate {
        start: ScenePoint,
        end: ScenePoint,
    },
    /// A capture hot-key at the cursor's scene coordinate.
    Capture {
        intent: CaptureIntent,
        at: ScenePoint,
    },
    /// A validated file drop, filenames sorted.
    DroppedFiles(Vec<PathBuf>),
}

/// The mosaic camera and input translator.
#[derive(Debug, Clone)]
pub struct MosaicView {
    scale: f64,
    zoom_in_ratio: f64,
    center_x: f64,
    center_y: f64,
    extrapolate_start: Option<ScenePoint>,
}

impl Default for MosaicView {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM_IN_RATIO)
    }
}

impl MosaicView {
    pub fn new(zoom_in_ratio: f64) -> Self {
        Self {
            scale: 1.0,
            zoom_in_ratio,
            center_x: 0.0,
            center_y: 0.0,
            extrapolate_start: None,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn center(&self) -> ScenePoint {
        ScenePoint::pixels(self.center_x, self.center_y)
    }

    /// Device/viewport position to scene coordinates. `pos` is relative to
    /// the viewport's top-left corner; `viewport` is its size.
    pub fn to_scene(&self, pos: (f64, f64), viewport: (f64, f64)) -> ScenePoint {
        let dx = pos.0 - viewport.0 / 2.0;
        let dy = pos.1 - viewport.1 / 2.0;
        ScenePoint::pixels(self.center_x + dx / self.scale, self.center_y + dy / self.scale)
    }

    /// Scene coordinates back to a viewport position.
    pub fn to_viewport(&self, point: ScenePoint, viewport: (f64, f64)) -> (f64, f64) {
        (
            (point.x - self.center_x) * self.scale + viewport.0 / 2.0,
            (point.y - self.center_y) * self.scale + viewport.1 / 2.0,
        )
    }

    /// One wheel tick. Multiplies (or divides) the scale by the zoom ratio
    /// and republishes the new scale. There are no hard zoom bounds.
    pub fn zoom(&mut self, direction: ZoomDirection) -> MosaicEvent {
        match direction {
            ZoomDirection::In => self.scale *= self.zoom_in_ratio,
            ZoomDirection::Out => self.scale /= self.zoom_in_ratio,
        }
        MosaicEvent::ScaleChanged(self.scale)
    }

    /// Primary click: re-center the camera on the clicked scene point.
    pub fn primary_click(&mut self, pos: (f64, f64), viewport: (f64, f64)) -> MosaicEvent {
        let point = self.to_scene(pos, viewport);
        self.center_x = point.x;
        self.center_y = point.y;
        MosaicEvent::Centered(point)
    }

    /// Secondary click: completes a pending extrapolation gesture, otherwise
    /// requests a context menu at the clicked scene point.
    pub fn secondary_click(&mut self, pos: (f64, f64), viewport: (f64, f64)) -> MosaicEvent {
        let point = self.to_scene(pos, viewport);
        match self.extrapolate_start.take() {
            Some(start) => MosaicEvent::Extrapolate { start, end: point },
            None => MosaicEvent::ContextMenu(point),
        }
    }

    /// Arm the two-point extrapolation gesture (from the context menu).
    pub fn begin_extrapolation(&mut self, start: ScenePoint) {
        self.extrapolate_start = Some(start);
    }

    pub fn extrapolation_pending(&self) -> bool {
        self.extrapolate_start.is_some()
    }

    /// Forward a capture hot-key with the cursor's scene coordinate.
    pub fn key_press(
        &self,
        intent: CaptureIntent,
        cursor: (f64, f64),
        viewport: (f64, f64),
    ) -> MosaicEvent {
        MosaicEvent::Capture {
            intent,
            at: self.to_scene(cursor, viewport),
        }
    }

    /// Validate a file drop: every item must share one extension, otherwise
    /// the whole drop is rejected. Accepted drops come back sorted.
    pub fn accept_drop(&self, dropped: &[PathBuf]) -> AppResult<Vec<PathBuf>> {
        let mut filenames: Vec<PathBuf> = dropped.to_vec();
        filenames.sort();

        let first = match filenames.first() {
            Some(f) => extension_of(f),
            None => return Ok(filenames),
        };
        if filenames.iter().any(|f| extension_of(f) != first) {
            return Err(ScopeError::MixedDropExtensions);
        }
        Ok(filenames)
    }
}

fn extension_of(path: &Path) -> Option<&std::ffi::OsStr> {
    path.extension()
}

/// The stage-position indicator drawn over the mosaic.
///
/// Rescales inversely with the view zoom so its on-screen size stays
/// constant, and renders only when explicitly shown.
#[derive(Debug, Clone)]
pub struct Crosshair {
    base_size: f64,
    size: f64,
    position: ScenePoint,
    visible: bool,
}

impl Default for Crosshair {
    fn default() -> Self {
        Self::new(DEFAULT_CROSSHAIR_SIZE)
    }
}

impl Crosshair {
    pub fn new(base_size: f64) -> Self {
        Self {
            base_size,
            size: base_size,
            position: ScenePoint::pixels(0.0, 0.0),
            visible: false,
        }
    }

    /// Scene-space radius at the current view scale.
    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn position(&self) -> ScenePoint {
        self.position
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_position(&mut self, position: ScenePoint) {
        self.position = position;
    }

    /// Resize against the view scale so the on-screen footprint is constant.
    pub fn set_scale(&mut self, view_scale: f64) {
        self.size = self.base_size / view_scale;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: (f64, f64) = (400.0, 300.0);

    #[test]
    fn zoom_in_then_out_returns_scale_within_tolerance() {
        let mut view = MosaicView::default();
        view.zoom(ZoomDirection::In);
        view.zoom(ZoomDirection::Out);
        assert!((view.scale() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zoom_republishes_the_new_scale() {
        let mut view = MosaicView::default();
        let event = view.zoom(ZoomDirection::In);
        assert_eq!(event, MosaicEvent::ScaleChanged(DEFAULT_ZOOM_IN_RATIO));
        // No hard bounds: keep zooming out well past 1.0.
        for _ in 0..50 {
            view.zoom(ZoomDirection::Out);
        }
        assert!(view.scale() > 0.0);
    }

    #[test]
    fn scene_and_viewport_transforms_round_trip() {
        let mut view = MosaicView::default();
        view.zoom(ZoomDirection::In);
        view.primary_click((250.0, 100.0), VIEWPORT);

        let scene = view.to_scene((37.0, 211.0), VIEWPORT);
        let back = view.to_viewport(scene, VIEWPORT);
        assert!((back.0 - 37.0).abs() < 1e-9);
        assert!((back.1 - 211.0).abs() < 1e-9);
    }

    #[test]
    fn primary_click_recenters_on_the_scene_point() {
        let mut view = MosaicView::default();
        let event = view.primary_click((0.0, 0.0), VIEWPORT);
        // Top-left of the viewport at scale 1 is (-200, -150) from center.
        assert_eq!(event, MosaicEvent::Centered(ScenePoint::pixels(-200.0, -150.0)));
        assert_eq!(view.center(), ScenePoint::pixels(-200.0, -150.0));
        // The clicked point is now the viewport center.
        let back = view.to_viewport(ScenePoint::pixels(-200.0, -150.0), VIEWPORT);
        assert_eq!(back, (200.0, 150.0));
    }

    #[test]
    fn secondary_click_opens_menu_or_completes_extrapolation() {
        let mut view = MosaicView::default();
        let event = view.secondary_click((200.0, 150.0), VIEWPORT);
        assert_eq!(event, MosaicEvent::ContextMenu(ScenePoint::pixels(0.0, 0.0)));

        view.begin_extrapolation(ScenePoint::pixels(10.0, 10.0));
        assert!(view.extrapolation_pending());
        let event = view.secondary_click((200.0, 150.0), VIEWPORT);
        assert_eq!(
            event,
            MosaicEvent::Extrapolate {
                start: ScenePoint::pixels(10.0, 10.0),
                end: ScenePoint::pixels(0.0, 0.0),
            }
        );
        // The gesture consumed its start point.
        assert!(!view.extrapolation_pending());
    }

    #[test]
    fn capture_keys_map_to_intents() {
        assert_eq!(CaptureIntent::from_key(' '), Some(CaptureIntent::Single));
        assert_eq!(CaptureIntent::from_key('3'), Some(CaptureIntent::Spiral(3)));
        assert_eq!(CaptureIntent::from_key('9'), Some(CaptureIntent::Spiral(9)));
        assert_eq!(CaptureIntent::from_key('g'), Some(CaptureIntent::Grid));
        assert_eq!(CaptureIntent::from_key('p'), Some(CaptureIntent::MarkPosition));
        assert_eq!(CaptureIntent::from_key('s'), Some(CaptureIntent::MarkSection));
        assert_eq!(CaptureIntent::from_key('x'), None);
    }

    #[test]
    fn key_press_tags_the_cursor_scene_coordinate() {
        let view = MosaicView::default();
        let event = view.key_press(CaptureIntent::Grid, (200.0, 150.0), VIEWPORT);
        assert_eq!(
            event,
            MosaicEvent::Capture {
                intent: CaptureIntent::Grid,
                at: ScenePoint::pixels(0.0, 0.0),
            }
        );
    }

    #[test]
    fn same_extension_drop_is_accepted_sorted() {
        let view = MosaicView::default();
        let accepted = view
            .accept_drop(&[PathBuf::from("b.csv"), PathBuf::from("a.csv")])
            .unwrap();
        assert_eq!(accepted, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
    }

    #[test]
    fn mixed_extension_drop_is_rejected_whole() {
        let view = MosaicView::default();
        let err = view
            .accept_drop(&[PathBuf::from("a.csv"), PathBuf::from("b.txt")])
            .unwrap_err();
        assert!(matches!(err, ScopeError::MixedDropExtensions));
    }

    #[test]
    fn empty_drop_is_a_noop() {
        let view = MosaicView::default();
        assert!(view.accept_drop(&[]).unwrap().is_empty());
    }

    #[test]
    fn crosshair_rescales_inversely_with_zoom() {
        let mut crosshair = Crosshair::default();
        assert!(!crosshair.is_visible());
        crosshair.set_scale(3.0);
        assert!((crosshair.size() - DEFAULT_CROSSHAIR_SIZE / 3.0).abs() < 1e-12);
        crosshair.set_scale(0.5);
        assert!((crosshair.size() - DEFAULT_CROSSHAIR_SIZE * 2.0).abs() < 1e-12);
        crosshair.set_visible(true);
        assert!(crosshair.is_visible());
    }
}
