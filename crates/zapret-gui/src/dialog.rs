//! Modal notifications and confirmations
//!
//! Dialogs queue up and are shown one at a time in the middle of the
//! window. While one is open the rest of the UI is disabled.

use eframe::egui;
use std::collections::VecDeque;

use zapret_core::ListKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Warning,
    Error,
}

/// Action taken when a confirmation is answered "Yes"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Disconnect,
    Quit,
    ClearList(ListKind),
    DropInvalid(ListKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
    pub kind: DialogKind,
    pub confirm: Option<Confirm>,
}

impl Dialog {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Error, title, message)
    }

    /// A Yes/No question; "No" is the default
    pub fn confirm(title: impl Into<String>, message: impl Into<String>, action: Confirm) -> Self {
        Self {
            confirm: Some(action),
            ..Self::new(DialogKind::Warning, title, message)
        }
    }

    fn new(kind: DialogKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
            confirm: None,
        }
    }

    fn accent(&self) -> egui::Color32 {
        match self.kind {
            DialogKind::Info => egui::Color32::from_rgb(33, 150, 243),
            DialogKind::Warning => egui::Color32::from_rgb(255, 152, 0),
            DialogKind::Error => egui::Color32::from_rgb(244, 67, 54),
        }
    }

    fn icon(&self) -> &'static str {
        match (self.kind, self.confirm) {
            (_, Some(_)) => "?",
            (DialogKind::Info, _) => "ℹ",
            (DialogKind::Warning, _) => "⚠",
            (DialogKind::Error, _) => "✖",
        }
    }
}

/// FIFO of pending dialogs
#[derive(Debug, Default)]
pub struct Dialogs {
    queue: VecDeque<Dialog>,
}

impl Dialogs {
    pub fn push(&mut self, dialog: Dialog) {
        self.queue.push_back(dialog);
    }

    pub fn extend(&mut self, dialogs: impl IntoIterator<Item = Dialog>) {
        self.queue.extend(dialogs);
    }

    pub fn is_open(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn current(&self) -> Option<&Dialog> {
        self.queue.front()
    }

    /// Whether a confirmation for `action` is already queued
    pub fn contains(&self, action: Confirm) -> bool {
        self.queue.iter().any(|d| d.confirm == Some(action))
    }

    /// Close the front dialog; returns the confirmed action if `accepted`
    pub fn answer(&mut self, accepted: bool) -> Option<Confirm> {
        let dialog = self.queue.pop_front()?;
        if accepted {
            dialog.confirm
        } else {
            None
        }
    }

    /// Draw the front dialog; returns an action once the user says "Yes"
    pub fn show(&mut self, ctx: &egui::Context) -> Option<Confirm> {
        let dialog = self.queue.front()?.clone();
        let mut answer = None;

        egui::Window::new(dialog.title.as_str())
            .id(egui::Id::new("zapret_dialog"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_min_width(280.0);
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(dialog.icon())
                            .size(24.0)
                            .color(dialog.accent()),
                    );
                    ui.label(dialog.message.as_str());
                });

                ui.add_space(10.0);
                ui.separator();

                ui.horizontal(|ui| {
                    if dialog.confirm.is_some() {
                        if ui.button("Yes").clicked() {
                            answer = Some(true);
                        }
                        if ui.button("No").clicked() {
                            answer = Some(false);
                        }
                    } else if ui.button("OK").clicked() {
                        answer = Some(true);
                    }
                });
            });

        answer.and_then(|accepted| self.answer(accepted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_order() {
        let mut dialogs = Dialogs::default();
        dialogs.push(Dialog::info("First", "one"));
        dialogs.push(Dialog::warning("Second", "two"));

        assert_eq!(dialogs.current().unwrap().title, "First");
        assert_eq!(dialogs.answer(true), None);
        assert_eq!(dialogs.current().unwrap().title, "Second");
        dialogs.answer(true);
        assert!(!dialogs.is_open());
    }

    #[test]
    fn test_confirmation_answers() {
        let mut dialogs = Dialogs::default();
        dialogs.push(Dialog::confirm("Disconnect", "Sure?", Confirm::Disconnect));
        dialogs.push(Dialog::confirm("Quit", "Sure?", Confirm::Quit));

        assert_eq!(dialogs.answer(true), Some(Confirm::Disconnect));
        assert_eq!(dialogs.answer(false), None);
        assert_eq!(dialogs.answer(true), None);
    }

    #[test]
    fn test_contains_looks_past_the_front() {
        let mut dialogs = Dialogs::default();
        dialogs.push(Dialog::info("Success", "Saved."));
        dialogs.push(Dialog::confirm("Confirm", "Quit?", Confirm::Quit));

        assert!(dialogs.contains(Confirm::Quit));
        assert!(!dialogs.contains(Confirm::Disconnect));
    }
}
