//! The parameter editor dialog.
//!
//! Renders an [`EditorSession`] as a tabbed property grid: one row per
//! mutable parameter with name, description, a type-appropriate input
//! control, and display order. Changed rows are flagged in the accent color
//! until the Update button commits them. Closing the window with pending
//! changes asks for confirmation first.
//!
//! Numeric text fields only emit a change event once the text parses;
//! invalid text is shown in red and never reaches the session. Ranged
//! parameters use clamped drag widgets, set parameters a drop-down over the
//! exact allowed list, and path parameters a modal chooser where cancelling
//! is a no-op.

use crate::editor::{CloseDecision, EditOutcome, EditorControl, EditorRow, EditorSession};
use crate::parameter::{ParameterTree, ParameterValue};
use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// A host-registered renderer for `ParameterKind::Custom` rows. Returns a
/// new value when the user edited it.
pub type CustomRenderer = Box<dyn Fn(&mut Ui, &ParameterValue) -> Option<ParameterValue>>;

/// What the editor did this frame.
#[derive(Default)]
pub struct EditorPanelResult {
    /// A commit happened; the host must store this tree and flag the entry
    /// as unsaved.
    pub committed: Option<ParameterTree>,
    /// The window was closed (confirmed if there were pending changes).
    pub closed: bool,
}

pub struct EditorPanel {
    /// The selector entry this editor is bound to.
    pub entry_index: usize,
    session: EditorSession,
    active_tab: usize,
    /// Text buffers for free-entry numeric/string rows, keyed by path.
    text_buffers: HashMap<String, String>,
    custom_renderers: HashMap<String, CustomRenderer>,
    /// Custom editor names already reported as dispatch misses.
    missed_editors: HashSet<String>,
    confirm_close: bool,
    ok_clicked: bool,
}

impl EditorPanel {
    pub fn new(entry_index: usize, tree: ParameterTree) -> Self {
        Self {
            entry_index,
            session: EditorSession::new(tree),
            active_tab: 0,
            text_buffers: HashMap::new(),
            custom_renderers: HashMap::new(),
            missed_editors: HashSet::new(),
            confirm_close: false,
            ok_clicked: false,
        }
    }

    /// Register a renderer for a named custom editor hook.
    pub fn register_custom_editor(&mut self, name: impl Into<String>, renderer: CustomRenderer) {
        self.custom_renderers.insert(name.into(), renderer);
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    /// Re-pull externally corrected parameters into the rendered rows.
    pub fn refresh_from(&mut self, corrected: &ParameterTree) {
        self.session.refresh_from_original(corrected);
        // Text buffers re-seed from the refreshed working values.
        self.text_buffers.clear();
    }

    pub fn set_display_name(&mut self, name: &str) {
        self.session.set_display_name(name);
    }

    /// Show the editor window for one frame.
    pub fn show(&mut self, ctx: &egui::Context) -> EditorPanelResult {
        let mut result = EditorPanelResult::default();

        let mut open = true;
        egui::Window::new(format!("{} Parameter Editor", self.session.display_name()))
            .id(egui::Id::new(("parameter_editor", self.entry_index)))
            .open(&mut open)
            .default_width(560.0)
            .show(ctx, |ui| {
                self.contents(ui, &mut result);
            });

        if !open || self.ok_clicked {
            self.ok_clicked = false;
            match self.session.close_requested() {
                CloseDecision::Close => result.closed = true,
                CloseDecision::NeedsConfirmation => self.confirm_close = true,
            }
        }

        if self.confirm_close {
            egui::Window::new("Warning!")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Parameters have been changed, close anyway?");
                    ui.horizontal(|ui| {
                        if ui.button("Yes").clicked() {
                            self.confirm_close = false;
                            result.closed = true;
                        }
                        if ui.button("No").clicked() {
                            // Declining cancels the close.
                            self.confirm_close = false;
                        }
                    });
                });
        }

        result
    }

    fn contents(&mut self, ui: &mut Ui, result: &mut EditorPanelResult) {
        // Tab bar: "Main" plus one tab per sub-section with editable rows.
        ui.horizontal(|ui| {
            for (i, tab) in self.session.tabs().iter().enumerate() {
                if ui
                    .selectable_label(self.active_tab == i, &tab.title)
                    .clicked()
                {
                    self.active_tab = i;
                }
            }
        });
        ui.separator();

        let mut rows = self.session.rows(self.active_tab);
        for row in &mut rows {
            let resolved = row
                .control
                .clone()
                .resolve(|name| self.custom_renderers.contains_key(name));
            if resolved != row.control {
                if let EditorControl::Custom(editor) = &row.control {
                    if self.missed_editors.insert(editor.clone()) {
                        warn!(
                            "no editor registered for custom parameter type '{}', showing read-only value",
                            editor
                        );
                    }
                }
                row.control = resolved;
            }
        }
        let mut edits: Vec<(String, ParameterValue)> = Vec::new();

        let text_buffers = &mut self.text_buffers;
        let custom_renderers = &self.custom_renderers;

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto())
            .column(Column::remainder())
            .column(Column::auto().at_least(140.0))
            .column(Column::auto())
            .min_scrolled_height(0.0)
            .header(20.0, |mut header| {
                for title in ["Name", "Description", "Value", "Order"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for row in &rows {
                    body.row(24.0, |mut table_row| {
                        table_row.col(|ui| {
                            let text = if row.changed {
                                RichText::new(&row.name).color(Color32::RED)
                            } else {
                                RichText::new(&row.name)
                            };
                            ui.label(text);
                        });
                        table_row.col(|ui| {
                            ui.label(&row.description);
                        });
                        table_row.col(|ui| {
                            ui.push_id(&row.path, |ui| {
                                value_control(
                                    ui,
                                    row,
                                    text_buffers,
                                    custom_renderers,
                                    &mut edits,
                                );
                            });
                        });
                        table_row.col(|ui| {
                            ui.label(row.order.to_string());
                        });
                    });
                }
            });

        for (path, value) in edits {
            match self.session.apply_edit(&path, value) {
                Ok(EditOutcome::Modified) => debug!("parameter '{}' modified", path),
                Ok(EditOutcome::Reverted) => debug!("parameter '{}' reverted", path),
                Ok(EditOutcome::Unchanged) => {}
                Err(e) => warn!("edit of '{}' rejected: {}", path, e),
            }
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Ok").clicked() {
                self.ok_clicked = true;
            }
            // Enabled exactly when at least one parameter differs.
            if ui
                .add_enabled(self.session.can_apply(), egui::Button::new("Update"))
                .clicked()
            {
                result.committed = Some(self.session.commit());
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("{} changed", self.session.change_count()));
            });
        });
    }
}

/// Render the input control for one row, pushing any resulting edit.
fn value_control(
    ui: &mut Ui,
    row: &EditorRow,
    text_buffers: &mut HashMap<String, String>,
    custom_renderers: &HashMap<String, CustomRenderer>,
    edits: &mut Vec<(String, ParameterValue)>,
) {
    match &row.control {
        EditorControl::FloatField => {
            numeric_field(ui, row, text_buffers, edits, |text| {
                text.parse::<f64>().ok().map(ParameterValue::Float)
            });
        }
        EditorControl::IntField => {
            numeric_field(ui, row, text_buffers, edits, |text| {
                text.parse::<i64>().ok().map(ParameterValue::Int)
            });
        }
        EditorControl::FloatSlider { min, max } => {
            let mut value = row.value.as_f64().unwrap_or(*min);
            let speed = ((max - min) / 250.0).max(1e-6);
            if ui
                .add(
                    egui::DragValue::new(&mut value)
                        .speed(speed)
                        .range(*min..=*max),
                )
                .changed()
            {
                edits.push((row.path.clone(), ParameterValue::Float(value)));
            }
        }
        EditorControl::IntSlider { min, max } => {
            let mut value = row.value.as_i64().unwrap_or(*min);
            if ui
                .add(egui::DragValue::new(&mut value).range(*min..=*max))
                .changed()
            {
                edits.push((row.path.clone(), ParameterValue::Int(value)));
            }
        }
        EditorControl::Choice(allowed) => {
            // The list is rebuilt from the kind each frame, so an external
            // update to the allowed set shows up without emitting a change.
            egui::ComboBox::from_id_salt(&row.path)
                .selected_text(row.value.to_string())
                .show_ui(ui, |ui| {
                    for candidate in allowed {
                        if ui
                            .selectable_label(*candidate == row.value, candidate.to_string())
                            .clicked()
                            && *candidate != row.value
                        {
                            edits.push((row.path.clone(), candidate.clone()));
                        }
                    }
                });
        }
        EditorControl::TextField => {
            let buffer = text_buffers
                .entry(row.path.clone())
                .or_insert_with(|| row.value.to_string());
            if ui.text_edit_singleline(buffer).changed() {
                edits.push((row.path.clone(), ParameterValue::Str(buffer.clone())));
            }
        }
        EditorControl::DirectoryPicker => {
            if ui.button(row.value.to_string()).clicked() {
                // Cancelled chooser returns None: no change event.
                if let Some(dir) = rfd::FileDialog::new()
                    .set_title("Choose Directory")
                    .pick_folder()
                {
                    edits.push((
                        row.path.clone(),
                        ParameterValue::Str(dir.display().to_string()),
                    ));
                }
            }
        }
        EditorControl::FilePicker => {
            if ui.button(row.value.to_string()).clicked() {
                if let Some(file) = rfd::FileDialog::new().set_title("Choose File").save_file() {
                    edits.push((
                        row.path.clone(),
                        ParameterValue::Str(file.display().to_string()),
                    ));
                }
            }
        }
        EditorControl::Custom(editor) => {
            // Unregistered customs were resolved to ReadOnly before the
            // table was built.
            if let Some(renderer) = custom_renderers.get(editor) {
                if let Some(value) = renderer(ui, &row.value) {
                    edits.push((row.path.clone(), value));
                }
            } else {
                ui.label(row.value.to_string());
            }
        }
        EditorControl::ReadOnly => {
            ui.label(row.value.to_string());
        }
    }
}

/// Free text entry that only emits once the text parses as a number.
fn numeric_field(
    ui: &mut Ui,
    row: &EditorRow,
    text_buffers: &mut HashMap<String, String>,
    edits: &mut Vec<(String, ParameterValue)>,
    parse: impl Fn(&str) -> Option<ParameterValue>,
) {
    let buffer = text_buffers
        .entry(row.path.clone())
        .or_insert_with(|| row.value.to_string());
    let valid = parse(buffer).is_some();
    let mut edit = egui::TextEdit::singleline(&mut *buffer);
    if !valid {
        edit = edit.text_color(Color32::RED);
    }
    if ui.add(edit).changed() {
        // Invalid text never reaches the change-event path.
        if let Some(value) = parse(buffer) {
            edits.push((row.path.clone(), value));
        }
    }
}
