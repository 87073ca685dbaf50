//! The captured-log panel at the bottom of the main window.
//!
//! Shows the records collected by `log_capture` as a scrollable,
//! level-colored list. A level cutoff and a case-insensitive text filter
//! narrow the view; only the visible rows are rendered. Capture intents,
//! configuration switches, and rejected edits all surface here, so the
//! panel doubles as the session's activity trail.

use crate::gui::Gui;
use eframe::egui::{self, Color32, ScrollArea, Ui};
use log::LevelFilter;

const LEVEL_CHOICES: [LevelFilter; 6] = [
    LevelFilter::Off,
    LevelFilter::Error,
    LevelFilter::Warn,
    LevelFilter::Info,
    LevelFilter::Debug,
    LevelFilter::Trace,
];

pub fn render(ui: &mut Ui, gui: &mut Gui) {
    ui.horizontal(|ui| {
        ui.heading("Session Log");
        ui.separator();

        egui::ComboBox::from_id_salt("log_level_cutoff")
            .selected_text(format!("{:?}", gui.log_level_filter))
            .show_ui(ui, |ui| {
                for level in LEVEL_CHOICES {
                    ui.selectable_value(&mut gui.log_level_filter, level, format!("{:?}", level));
                }
            });
        ui.add(
            egui::TextEdit::singleline(&mut gui.log_filter_text)
                .hint_text("filter")
                .desired_width(160.0),
        );

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Clear").clicked() {
                gui.log_buffer.clear();
            }
            ui.toggle_value(&mut gui.scroll_to_bottom, "Follow");
        });
    });
    ui.separator();

    let cutoff = gui.log_level_filter.to_level();
    let needle = gui.log_filter_text.to_lowercase();
    let entries = gui.log_buffer.read();
    let visible: Vec<_> = entries
        .iter()
        .filter(|entry| {
            let level_ok = cutoff.is_some_and(|cutoff| entry.level <= cutoff);
            let text_ok = needle.is_empty()
                || entry.message.to_lowercase().contains(&needle)
                || entry.target.to_lowercase().contains(&needle);
            level_ok && text_ok
        })
        .collect();

    let row_height = ui.text_style_height(&egui::TextStyle::Monospace);
    ScrollArea::vertical()
        .auto_shrink([false; 2])
        .stick_to_bottom(gui.scroll_to_bottom)
        .show_rows(ui, row_height, visible.len(), |ui, range| {
            for entry in visible[range.start..range.end].iter() {
                ui.horizontal(|ui| {
                    ui.monospace(entry.timestamp.format("%H:%M:%S%.3f").to_string());
                    ui.colored_label(entry.color(), format!("{:<5}", entry.level));
                    ui.colored_label(Color32::from_gray(150), &entry.target);
                    ui.label(&entry.message);
                });
            }
        });
}
