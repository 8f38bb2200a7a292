//! List editor tab

use eframe::egui;
use std::path::Path;
use tracing::error;

use zapret_core::lists::invalid_lines;
use zapret_core::{ListFile, ListKind};

use crate::dialog::{Confirm, Dialog};

/// Buttons pressed in the editor during a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorAction {
    Add,
    ClearInput,
    Refresh,
    Clear,
    Save,
}

/// State of one list editor tab
pub struct ListEditor {
    kind: ListKind,
    file: ListFile,
    /// New entries to add, one per line
    input: String,
    /// Editable copy of the whole file
    view: String,
}

impl ListEditor {
    /// Open the editor for `kind`, loading its file from `base_dir`
    pub fn new(kind: ListKind, base_dir: &Path) -> (Self, Option<Dialog>) {
        let mut editor = Self {
            kind,
            file: kind.open(base_dir),
            input: String::new(),
            view: String::new(),
        };
        let notice = editor.reload();
        (editor, notice)
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    /// Replace the view with the file contents
    pub fn reload(&mut self) -> Option<Dialog> {
        match self.file.load() {
            Ok(content) => {
                self.view = content;
                None
            }
            Err(e) => {
                error!("Failed to load {}: {}", self.file.path().display(), e);
                Some(Dialog::warning("Error", format!("Could not load the file:\n{e}")))
            }
        }
    }

    /// Add the entries typed into the input box
    pub fn add(&mut self) -> Vec<Dialog> {
        if self.input.trim().is_empty() {
            return vec![Dialog::warning("Warning", "Enter domains to add.")];
        }

        let report = match self.file.add(&self.input) {
            Ok(report) => report,
            Err(e) => {
                error!("Failed to add to {}: {}", self.file.path().display(), e);
                return vec![Dialog::error("Error", format!("Could not save:\n{e}"))];
            }
        };

        let mut notices: Vec<Dialog> = report
            .invalid
            .iter()
            .map(|entry| Dialog::warning("Warning", format!("Invalid format: {entry}")))
            .collect();

        notices.extend(self.reload());
        self.input.clear();

        let mut message = format!("Added: {}", report.added);
        if report.duplicates > 0 {
            message.push_str(&format!("\nDuplicates: {}", report.duplicates));
        }
        notices.push(Dialog::info("Success", message));
        notices
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Save the edited view, asking first if it contains invalid lines
    pub fn request_save(&mut self) -> Dialog {
        let invalid = invalid_lines(&self.view);
        if !invalid.is_empty() {
            return Dialog::confirm(
                "Invalid domains",
                format!(
                    "Invalid domains:\n\n{}\n\nContinue without them?",
                    invalid.join("\n")
                ),
                Confirm::DropInvalid(self.kind),
            );
        }

        match self.file.save(&self.view) {
            Ok(saved) => Dialog::info("Success", format!("Saved.\nDomains: {saved}")),
            Err(e) => {
                error!("Failed to save {}: {}", self.file.path().display(), e);
                Dialog::error("Error", format!("Save failed:\n{e}"))
            }
        }
    }

    /// Save only the valid lines of the view
    pub fn save_dropping_invalid(&mut self) -> Vec<Dialog> {
        match self.file.save_dropping_invalid(&self.view) {
            Ok(report) => {
                let mut notices: Vec<Dialog> = self.reload().into_iter().collect();
                notices.push(Dialog::info(
                    "Success",
                    format!("Saved.\nDomains: {}", report.saved),
                ));
                notices
            }
            Err(e) => {
                error!("Failed to save {}: {}", self.file.path().display(), e);
                vec![Dialog::error("Error", format!("Save failed:\n{e}"))]
            }
        }
    }

    pub fn request_clear(&self) -> Dialog {
        Dialog::confirm(
            "Confirm",
            "Clear the entire list?",
            Confirm::ClearList(self.kind),
        )
    }

    /// Empty the list file
    pub fn clear(&mut self) -> Vec<Dialog> {
        match self.file.clear() {
            Ok(()) => {
                let mut notices: Vec<Dialog> = self.reload().into_iter().collect();
                notices.push(Dialog::info("Success", "List cleared."));
                notices
            }
            Err(e) => {
                error!("Failed to clear {}: {}", self.file.path().display(), e);
                vec![Dialog::error("Error", format!("Error:\n{e}"))]
            }
        }
    }

    /// Draw the tab; returned dialogs are queued by the caller
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Vec<Dialog> {
        let mut action = None;

        ui.vertical_centered(|ui| {
            ui.heading(egui::RichText::new(self.kind.title()).size(20.0).strong());
            ui.label(egui::RichText::new(self.kind.description()).color(egui::Color32::GRAY));
        });
        ui.add_space(10.0);

        ui.group(|ui| {
            ui.label(egui::RichText::new("Add domains").strong());
            ui.add(
                egui::TextEdit::multiline(&mut self.input)
                    .hint_text("example.com\nsub.example.com")
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );
            ui.horizontal(|ui| {
                if ui.add_sized([120.0, 28.0], egui::Button::new("Add")).clicked() {
                    action = Some(EditorAction::Add);
                }
                if ui.add_sized([120.0, 28.0], egui::Button::new("Clear")).clicked() {
                    action = Some(EditorAction::ClearInput);
                }
            });
        });

        ui.add_space(10.0);

        ui.group(|ui| {
            ui.label(egui::RichText::new("Current list").strong());
            egui::ScrollArea::vertical()
                .max_height(ui.available_height() - 50.0)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.view)
                            .code_editor()
                            .desired_rows(16)
                            .desired_width(f32::INFINITY),
                    );
                });
            ui.horizontal(|ui| {
                if ui.add_sized([100.0, 28.0], egui::Button::new("Refresh")).clicked() {
                    action = Some(EditorAction::Refresh);
                }
                if ui.add_sized([100.0, 28.0], egui::Button::new("Clear")).clicked() {
                    action = Some(EditorAction::Clear);
                }
                if ui.add_sized([100.0, 28.0], egui::Button::new("Save")).clicked() {
                    action = Some(EditorAction::Save);
                }
            });
        });

        match action {
            Some(EditorAction::Add) => self.add(),
            Some(EditorAction::ClearInput) => {
                self.clear_input();
                Vec::new()
            }
            Some(EditorAction::Refresh) => self.reload().into_iter().collect(),
            Some(EditorAction::Clear) => vec![self.request_clear()],
            Some(EditorAction::Save) => vec![self.request_save()],
            None => Vec::new(),
        }
    }
}
