//! Parameter editor session: snapshot, change tracking, commit protocol.
//!
//! An [`EditorSession`] owns two trees: the `original` (last committed) and a
//! `working` deep copy that user edits mutate. The changed set holds exactly
//! the paths whose working value differs from the original, so the change
//! counter is `changed.len()` by construction and can never go negative.
//!
//! The session is toolkit independent; `gui::editor_panel` renders it. Rows
//! exist only for mutable, non-container parameters, grouped into a "Main"
//! tab for ungrouped paths plus one tab per sub-section. Widget dispatch is
//! the closed [`EditorControl`] mapping over [`ParameterKind`]; a custom kind
//! with no registered renderer falls back to a read-only display.

use crate::parameter::{Parameter, ParameterKind, ParameterTree, ParameterValue};
use crate::error::AppResult;
use log::warn;
use std::collections::BTreeSet;

/// What a single edit event did to the change counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The path now differs from the original (+1).
    Modified,
    /// The path was changed and now matches the original again (-1).
    Reverted,
    /// No counter movement: still unchanged, or changed differently.
    Unchanged,
}

/// Whether a close request may proceed directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Close,
    /// Pending changes; the user must confirm discarding them.
    NeedsConfirmation,
}

/// The input control a parameter row renders with.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorControl {
    /// Free text entry validated as a float.
    FloatField,
    /// Free text entry validated as an integer.
    IntField,
    /// Bounded numeric widget; the widget itself clamps to the range.
    FloatSlider { min: f64, max: f64 },
    IntSlider { min: i64, max: i64 },
    /// Drop-down over the exact allowed-value list.
    Choice(Vec<ParameterValue>),
    TextField,
    DirectoryPicker,
    FilePicker,
    /// Extension hook; the GUI resolves the named renderer.
    Custom(String),
    /// Dispatch-miss fallback.
    ReadOnly,
}

impl EditorControl {
    /// Map a parameter kind to its input control.
    pub fn for_kind(kind: &ParameterKind) -> Self {
        match kind {
            ParameterKind::Float => EditorControl::FloatField,
            ParameterKind::Int => EditorControl::IntField,
            ParameterKind::RangeFloat { min, max } => EditorControl::FloatSlider {
                min: *min,
                max: *max,
            },
            ParameterKind::RangeInt { min, max } => EditorControl::IntSlider {
                min: *min,
                max: *max,
            },
            ParameterKind::SetBool { .. }
            | ParameterKind::SetFloat { .. }
            | ParameterKind::SetInt { .. }
            | ParameterKind::SetString { .. } => {
                // allowed_values() is Some for every set kind.
                EditorControl::Choice(kind.allowed_values().unwrap_or_default())
            }
            ParameterKind::Text => EditorControl::TextField,
            ParameterKind::Directory => EditorControl::DirectoryPicker,
            ParameterKind::Filename => EditorControl::FilePicker,
            ParameterKind::Custom { editor } => EditorControl::Custom(editor.clone()),
        }
    }

    /// Downgrade a custom control with no registered renderer to the
    /// read-only fallback. The miss is non-fatal; the GUI logs it once.
    pub fn resolve(self, has_renderer: impl Fn(&str) -> bool) -> Self {
        match self {
            EditorControl::Custom(editor) if !has_renderer(&editor) => EditorControl::ReadOnly,
            control => control,
        }
    }
}

/// One rendered parameter row, cloned out for the GUI each frame.
#[derive(Debug, Clone)]
pub struct EditorRow {
    pub path: String,
    pub name: String,
    pub description: String,
    pub order: i32,
    pub control: EditorControl,
    pub value: ParameterValue,
    pub changed: bool,
}

/// A tab in the editor: "Main" or one sub-section.
#[derive(Debug, Clone)]
pub struct EditorTab {
    pub title: String,
    paths: Vec<String>,
}

impl EditorTab {
    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

pub struct EditorSession {
    original: ParameterTree,
    working: ParameterTree,
    changed: BTreeSet<String>,
    tabs: Vec<EditorTab>,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl EditorSession {
    /// Begin editing: deep-copies the tree into a working snapshot and lays
    /// out the tabs. Tabs with no mutable parameters are dropped.
    pub fn new(tree: ParameterTree) -> Self {
        let mut tabs = Vec::new();

        let mutable_only = |tree: &ParameterTree, paths: Vec<String>| -> Vec<String> {
            paths
                .into_iter()
                .filter(|p| tree.get(p).map(|param| param.mutable).unwrap_or(false))
                .collect()
        };

        let main = mutable_only(&tree, tree.main_paths());
        if !main.is_empty() {
            tabs.push(EditorTab {
                title: "Main".to_string(),
                paths: main,
            });
        }
        for section in tree.sections() {
            let paths = mutable_only(&tree, tree.section_paths(&section));
            if !paths.is_empty() {
                tabs.push(EditorTab {
                    title: capitalize(&section),
                    paths,
                });
            }
        }

        Self {
            working: tree.clone(),
            original: tree,
            changed: BTreeSet::new(),
            tabs,
        }
    }

    pub fn tabs(&self) -> &[EditorTab] {
        &self.tabs
    }

    /// The configuration this session edits.
    pub fn display_name(&self) -> &str {
        self.original.display_name()
    }

    pub fn set_display_name(&mut self, name: &str) {
        self.original.set_display_name(name);
        self.working.set_display_name(name);
    }

    /// Exact count of paths whose working value differs from the original.
    pub fn change_count(&self) -> usize {
        self.changed.len()
    }

    pub fn is_changed(&self, path: &str) -> bool {
        self.changed.contains(path)
    }

    pub fn can_apply(&self) -> bool {
        self.change_count() > 0
    }

    pub fn working_value(&self, path: &str) -> Option<&ParameterValue> {
        self.working.value(path)
    }

    /// Apply one user edit to the working snapshot.
    ///
    /// The counter moves by at most one per event: a path flipping from
    /// "changed" to "changed differently" reports [`EditOutcome::Unchanged`].
    pub fn apply_edit(&mut self, path: &str, value: ParameterValue) -> AppResult<EditOutcome> {
        self.working.set_value(path, value)?;
        let differs = self.working.value(path) != self.original.value(path);
        let was_changed = self.changed.contains(path);
        let outcome = match (was_changed, differs) {
            (false, true) => {
                self.changed.insert(path.to_string());
                EditOutcome::Modified
            }
            (true, false) => {
                self.changed.remove(path);
                EditOutcome::Reverted
            }
            _ => EditOutcome::Unchanged,
        };
        Ok(outcome)
    }

    /// Commit: clear every row's changed flag, atomically replace the
    /// original with a deep copy of the working snapshot, and hand the
    /// committed tree back so the host can publish it. Committing with no
    /// changes is a permitted no-op that still clears flags.
    pub fn commit(&mut self) -> ParameterTree {
        self.changed.clear();
        self.original = self.working.clone();
        self.original.clone()
    }

    /// Re-pull externally corrected parameters, path by path, into the
    /// already-rendered rows. Corrections may change kinds (allowed lists)
    /// as well as values. The changed set is recomputed afterwards, and no
    /// change events are produced.
    pub fn refresh_from_original(&mut self, corrected: &ParameterTree) {
        self.original = corrected.clone();
        let paths: Vec<String> = self
            .tabs
            .iter()
            .flat_map(|tab| tab.paths.iter().cloned())
            .collect();
        for path in &paths {
            if let Some(parameter) = self.original.get(path) {
                // Row paths always exist in the working copy.
                let _ = self.working.replace(path, parameter.clone());
            }
        }
        self.changed = self
            .working
            .diff_paths(&self.original)
            .into_iter()
            .collect();
    }

    /// Decide whether a close request may proceed without confirmation.
    pub fn close_requested(&self) -> CloseDecision {
        if self.change_count() > 0 {
            CloseDecision::NeedsConfirmation
        } else {
            CloseDecision::Close
        }
    }

    /// Rows for one tab, resolved against the working snapshot.
    ///
    /// A kind with no matching control (a custom editor the host never
    /// registered resolves in the GUI layer) is reported here; the fallback
    /// row is read-only and the miss is logged, not fatal.
    pub fn rows(&self, tab: usize) -> Vec<EditorRow> {
        let Some(tab) = self.tabs.get(tab) else {
            return Vec::new();
        };
        tab.paths
            .iter()
            .filter_map(|path| {
                let Some(param) = self.working.get(path) else {
                    warn!("no parameter found for editor row '{}'", path);
                    return None;
                };
                Some(EditorRow {
                    path: path.clone(),
                    name: param.name.clone(),
                    description: param.description.clone(),
                    order: param.order,
                    control: EditorControl::for_kind(&param.kind),
                    value: param.value.clone(),
                    changed: self.changed.contains(path),
                })
            })
            .collect()
    }

    /// The parameter backing a row, from the working snapshot.
    pub fn working_parameter(&self, path: &str) -> Option<&Parameter> {
        self.working.get(path)
    }
}
