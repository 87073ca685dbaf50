//! The eframe/egui implementation for the GUI.
//!
//! Layout: configuration selector on the left, mosaic canvas in the
//! center, captured log records in a bottom panel, and a floating
//! parameter-editor window per editing session. The shell owns the
//! [`ConfigurationList`] and routes panel events: selector switches
//! republish the newly current tree, editor commits are stored back on
//! their entry, and mosaic capture intents are forwarded to the
//! instrument-control side (logged here).

pub mod editor_panel;
pub mod mosaic_panel;
pub mod selector_panel;

mod log_panel;

use crate::config::Settings;
use crate::editor::CloseDecision;
use crate::log_capture::LogBuffer;
use crate::mosaic::MosaicEvent;
use crate::selector::{ConfigurationList, SelectorEvent};
use crate::storage;
use eframe::egui;
use log::{error, info, warn, LevelFilter};
use std::cmp::Ordering;

use self::editor_panel::EditorPanel;
use self::mosaic_panel::MosaicPanel;
use self::selector_panel::{SelectorAction, SelectorPanel};

/// The main GUI struct.
pub struct Gui {
    list: ConfigurationList,
    selector_panel: SelectorPanel,
    mosaic_panel: MosaicPanel,
    editor: Option<EditorPanel>,
    /// Edit request held back while the open editor's changes are
    /// confirmed away.
    pending_edit_switch: Option<usize>,
    /// Directory first offered by the parameter-file choosers.
    parameter_dir: std::path::PathBuf,
    log_buffer: LogBuffer,
    // Log panel state
    log_filter_text: String,
    log_level_filter: LevelFilter,
    scroll_to_bottom: bool,
}

impl Gui {
    /// Creates a new GUI.
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        settings: &Settings,
        list: ConfigurationList,
        log_buffer: LogBuffer,
    ) -> Self {
        Self {
            list,
            selector_panel: SelectorPanel::default(),
            mosaic_panel: MosaicPanel::new(
                settings.mosaic.zoom_in_ratio,
                settings.mosaic.crosshair_size,
            ),
            editor: None,
            pending_edit_switch: None,
            parameter_dir: settings.storage.parameter_dir.clone().into(),
            log_buffer,
            log_filter_text: String::new(),
            log_level_filter: LevelFilter::Info,
            scroll_to_bottom: true,
        }
    }

    fn load_parameter_files(&mut self, paths: &[std::path::PathBuf]) {
        for path in paths {
            match storage::load_tree(path) {
                Ok(tree) => {
                    info!("loaded parameters '{}'", tree.display_name());
                    if let Some(SelectorEvent::ConfigurationChanged(tree)) = self.list.add(tree) {
                        info!("configuration '{}' is now current", tree.display_name());
                    }
                }
                Err(e) => error!("failed to load '{}': {}", path.display(), e),
            }
        }
    }

    fn handle_selector_action(&mut self, action: SelectorAction) {
        match action {
            SelectorAction::Changed(SelectorEvent::ConfigurationChanged(tree)) => {
                info!("configuration '{}' is now current", tree.display_name());
            }
            SelectorAction::Edit(index) => {
                let already_open = self
                    .editor
                    .as_ref()
                    .is_some_and(|editor| editor.entry_index == index);
                if already_open {
                    return;
                }
                let needs_confirmation = self
                    .editor
                    .as_ref()
                    .is_some_and(|editor| switch_discards_pending_edits(editor, index));
                if needs_confirmation {
                    self.pending_edit_switch = Some(index);
                } else {
                    self.open_editor(index);
                }
            }
            SelectorAction::Deleted(index) => {
                if let Some(editor) = self.editor.as_mut() {
                    match editor_index_after_removal(editor.entry_index, index) {
                        Some(shifted) => editor.entry_index = shifted,
                        None => {
                            warn!("closing editor for removed configuration");
                            self.editor = None;
                        }
                    }
                }
                if let Some(target) = self.pending_edit_switch {
                    self.pending_edit_switch = editor_index_after_removal(target, index);
                }
            }
            SelectorAction::SaveRequested { index, path } => {
                let Some(entry) = self.list.entry(index) else {
                    return;
                };
                match storage::save_tree(entry.tree(), &path) {
                    Ok(()) => {
                        let name = storage::config_name(&path);
                        if let Err(e) = self.list.mark_saved(index, name.clone()) {
                            error!("cannot rename saved configuration: {}", e);
                        } else {
                            info!("saved parameters to '{}'", path.display());
                            if let Some(editor) = self.editor.as_mut() {
                                if editor.entry_index == index {
                                    editor.set_display_name(&name);
                                }
                            }
                        }
                    }
                    Err(e) => error!("failed to save '{}': {}", path.display(), e),
                }
            }
        }
    }

    fn open_editor(&mut self, index: usize) {
        if let Some(entry) = self.list.entry(index) {
            self.editor = Some(EditorPanel::new(index, entry.tree().clone()));
        }
    }

    /// Confirm discarding the open editor's pending changes before the
    /// requested editor takes its place.
    fn confirm_editor_switch(&mut self, ctx: &egui::Context) {
        let Some(target) = self.pending_edit_switch else {
            return;
        };
        egui::Window::new("Warning!")
            .id(egui::Id::new("editor_switch_confirm"))
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Parameters have been changed, close anyway?");
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        self.pending_edit_switch = None;
                        self.open_editor(target);
                    }
                    if ui.button("No").clicked() {
                        self.pending_edit_switch = None;
                    }
                });
            });
    }

    fn handle_mosaic_event(&mut self, event: MosaicEvent) {
        match event {
            MosaicEvent::ScaleChanged(scale) => {
                log::debug!("mosaic scale is now {:.3}", scale);
            }
            MosaicEvent::Centered(point) => {
                log::debug!("mosaic centered on {}", point);
            }
            MosaicEvent::ContextMenu(_) => {}
            MosaicEvent::Extrapolate { start, end } => {
                info!("extrapolate capture from {} to {}", start, end);
            }
            MosaicEvent::Capture { intent, at } => {
                info!("capture request {:?} at {}", intent, at);
            }
            MosaicEvent::DroppedFiles(files) => {
                let parameter_drop = files.iter().all(|f| {
                    f.extension()
                        .is_some_and(|ext| ext == storage::PARAMETER_FILE_EXTENSION)
                });
                if parameter_drop {
                    self.load_parameter_files(&files);
                } else {
                    info!("queueing {} dropped mosaic images", files.len());
                }
            }
        }
    }

    fn show_editor(&mut self, ctx: &egui::Context) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let result = editor.show(ctx);
        let index = editor.entry_index;

        if let Some(committed) = result.committed {
            let is_current = self.list.current_index() == Some(index);
            match self.list.store_committed(index, committed.clone()) {
                Ok(()) => {
                    info!("parameters '{}' updated", committed.display_name());
                    if is_current {
                        info!("configuration '{}' is now current", committed.display_name());
                    }
                }
                Err(e) => error!("cannot store committed parameters: {}", e),
            }
        }
        if result.closed {
            self.editor = None;
        }
    }
}

impl eframe::App for Gui {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::bottom("bottom_panel")
            .resizable(true)
            .min_height(150.0)
            .show(ctx, |ui| {
                log_panel::render(ui, self);
            });

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Scope Control");
                ui.separator();

                if ui.button("Load Parameters...").clicked() {
                    if let Some(paths) = rfd::FileDialog::new()
                        .set_title("Load Parameters")
                        .set_directory(&self.parameter_dir)
                        .add_filter("Parameters", &[storage::PARAMETER_FILE_EXTENSION])
                        .pick_files()
                    {
                        self.load_parameter_files(&paths);
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    // Stands in for the capture run that locks selection.
                    let mut locked = self.list.is_locked();
                    if ui.toggle_value(&mut locked, "Lock").changed() {
                        self.list.set_locked(locked);
                        self.mosaic_panel.crosshair_mut().set_visible(locked);
                        info!(
                            "configuration selection {}",
                            if locked { "locked" } else { "unlocked" }
                        );
                    }
                });
            });
        });

        let actions = egui::SidePanel::left("selector_panel")
            .resizable(true)
            .default_width(180.0)
            .show(ctx, |ui| self.selector_panel.show(ui, &mut self.list))
            .inner;
        for action in actions {
            self.handle_selector_action(action);
        }

        let events = egui::CentralPanel::default()
            .show(ctx, |ui| self.mosaic_panel.show(ui))
            .inner;
        for event in events {
            self.handle_mosaic_event(event);
        }

        self.show_editor(ctx);
        self.confirm_editor_switch(ctx);
    }
}

/// Where an open editor's entry index lands after a removal; `None` means
/// the edited entry itself was removed. Mirrors how
/// [`ConfigurationList::remove`] shifts its current index.
fn editor_index_after_removal(editor_index: usize, removed: usize) -> Option<usize> {
    match editor_index.cmp(&removed) {
        Ordering::Less => Some(editor_index),
        Ordering::Equal => None,
        Ordering::Greater => Some(editor_index - 1),
    }
}

/// Opening a different entry's editor would discard this editor's pending
/// changes, which requires confirmation.
fn switch_discards_pending_edits(editor: &EditorPanel, target: usize) -> bool {
    editor.entry_index != target
        && editor.session().close_requested() == CloseDecision::NeedsConfirmation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{Parameter, ParameterKind, ParameterTree, ParameterValue};

    fn tree_with_gain(name: &str) -> ParameterTree {
        let mut tree = ParameterTree::new(name);
        tree.insert(
            "gain",
            Parameter::new("gain", ParameterKind::Float, ParameterValue::Float(1.0)),
        );
        tree
    }

    #[test]
    fn open_editor_follows_its_entry_across_removals() {
        let mut list = ConfigurationList::new();
        for name in ["a", "b", "c", "d", "e"] {
            list.add(ParameterTree::new(name));
        }
        list.select(3).unwrap();

        // Editor open on "d" at index 3; removing an earlier entry shifts
        // everything after it down by one.
        let editor_index = editor_index_after_removal(3, 0).unwrap();
        list.remove(0).unwrap();
        assert_eq!(editor_index, 2);
        assert_eq!(list.entry(editor_index).unwrap().name(), "d");

        // A commit after the shift lands on the edited entry, not on the
        // one that inherited its old index.
        list.store_committed(editor_index, tree_with_gain("d")).unwrap();
        assert!(list.entry(editor_index).unwrap().is_unsaved());
        assert_eq!(list.entry(3).unwrap().name(), "e");
        assert!(!list.entry(3).unwrap().is_unsaved());

        // Removing the edited entry itself closes the session.
        assert_eq!(editor_index_after_removal(2, 2), None);
        // Removals past the editor leave its index alone.
        assert_eq!(editor_index_after_removal(1, 3), Some(1));
    }

    #[test]
    fn switching_editors_with_pending_changes_requires_confirmation() {
        let mut panel = EditorPanel::new(0, tree_with_gain("default"));
        assert!(!switch_discards_pending_edits(&panel, 1));

        panel
            .session_mut()
            .apply_edit("gain", ParameterValue::Float(2.0))
            .unwrap();
        assert!(switch_discards_pending_edits(&panel, 1));
        // Re-opening the same entry never prompts.
        assert!(!switch_discards_pending_edits(&panel, 0));

        // Reverting the edit releases the switch again.
        panel
            .session_mut()
            .apply_edit("gain", ParameterValue::Float(1.0))
            .unwrap();
        assert!(!switch_discards_pending_edits(&panel, 1));
    }
}
