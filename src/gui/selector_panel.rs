//! Radio-button list of loaded parameter configurations.
//!
//! One entry per loaded configuration, exactly one marked current. Clicking
//! a different entry switches configurations; entries with committed but
//! unsaved changes are drawn in the warning color. The per-entry context
//! menu offers Edit on the current entry, Save when the entry has unsaved
//! changes, and Delete on non-current entries. The whole list greys out
//! while a capture has it locked.

use crate::selector::{ConfigurationList, SelectorEvent};
use eframe::egui::{Color32, RichText, Ui};
use log::{info, warn};
use std::path::PathBuf;

/// Things the panel wants the application shell to do.
#[derive(Debug)]
pub enum SelectorAction {
    /// The current configuration changed; republish to listeners.
    Changed(SelectorEvent),
    /// Open (or focus) the parameter editor for this entry.
    Edit(usize),
    /// An entry was removed; later indices have shifted down by one.
    Deleted(usize),
    /// Persist this entry's tree to the chosen file.
    SaveRequested { index: usize, path: PathBuf },
}

#[derive(Default)]
pub struct SelectorPanel;

impl SelectorPanel {
    pub fn show(&mut self, ui: &mut Ui, list: &mut ConfigurationList) -> Vec<SelectorAction> {
        let mut actions = Vec::new();

        ui.heading("Configurations");
        ui.separator();

        if list.is_empty() {
            ui.weak("No parameter files loaded");
            return actions;
        }

        let mut clicked: Option<usize> = None;
        let mut delete: Option<usize> = None;
        let current = list.current_index();

        ui.add_enabled_ui(!list.is_locked(), |ui| {
            for (index, entry) in list.entries().iter().enumerate() {
                let is_current = current == Some(index);
                let label = if entry.is_unsaved() {
                    RichText::new(entry.name()).color(Color32::YELLOW)
                } else {
                    RichText::new(entry.name())
                };
                let response = ui.radio(is_current, label);
                if response.clicked() && !is_current {
                    clicked = Some(index);
                }
                response.context_menu(|ui| {
                    if is_current {
                        if ui.button("Edit").clicked() {
                            actions.push(SelectorAction::Edit(index));
                            ui.close_menu();
                        }
                    } else if ui.button("Delete").clicked() {
                        delete = Some(index);
                        ui.close_menu();
                    }
                    if entry.is_unsaved() && ui.button("Save").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .set_title("Save Parameters")
                            .add_filter("Parameters", &["toml"])
                            .set_file_name(format!("{}.toml", entry.name()))
                            .save_file()
                        {
                            actions.push(SelectorAction::SaveRequested { index, path });
                        }
                        ui.close_menu();
                    }
                });
            }
        });

        if let Some(index) = clicked {
            match list.select(index) {
                Ok(Some(event)) => actions.push(SelectorAction::Changed(event)),
                Ok(None) => {}
                Err(e) => warn!("configuration switch rejected: {}", e),
            }
        }
        if let Some(index) = delete {
            match list.remove(index) {
                Ok(removed) => {
                    info!("removed configuration '{}'", removed.name());
                    actions.push(SelectorAction::Deleted(index));
                }
                Err(e) => warn!("cannot remove configuration: {}", e),
            }
        }

        actions
    }
}
