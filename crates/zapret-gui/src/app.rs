//! Main application and GUI window

use crate::config::GuiConfig;
use crate::dialog::{Confirm, Dialog, Dialogs};
use crate::editor::ListEditor;
use crate::service::{ConnectionController, ControllerEvent};
use eframe::egui;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

use zapret_core::layout::ensure_directories;
use zapret_core::{ConnectionState, ListKind, Request, ScriptRegistry};

const GREEN: egui::Color32 = egui::Color32::from_rgb(76, 175, 80);
const ORANGE: egui::Color32 = egui::Color32::from_rgb(255, 152, 0);
const RED: egui::Color32 = egui::Color32::from_rgb(244, 67, 54);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Connection,
    List(ListKind),
}

/// Application state
pub struct ZapretApp {
    /// Persisted settings
    config: GuiConfig,
    config_path: PathBuf,
    registry: ScriptRegistry,
    /// Directory the scripts and lists live in
    base_dir: PathBuf,
    controller: ConnectionController,
    editors: Vec<ListEditor>,
    dialogs: Dialogs,
    tab: Tab,
    /// Set once the user agreed to quit
    allow_close: bool,
}

impl ZapretApp {
    /// Create new application
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_parts(
            GuiConfig::load(),
            GuiConfig::config_path(),
            GuiConfig::base_dir(),
            ConnectionController::default(),
        )
    }

    fn with_parts(
        mut config: GuiConfig,
        config_path: PathBuf,
        base_dir: PathBuf,
        controller: ConnectionController,
    ) -> Self {
        let registry = ScriptRegistry::builtin();
        config.normalize(&registry);

        let mut dialogs = Dialogs::default();

        if let Err(e) = ensure_directories(&base_dir) {
            error!("Failed to create directories: {}", e);
            dialogs.push(Dialog::error("Error", format!("Could not create folders:\n{e}")));
        }

        let missing = registry.missing(&base_dir);
        if !missing.is_empty() {
            let mut msg = String::from("Files not found:\n\n");
            for entry in &missing {
                msg.push_str(&format!("• {} ({})\n", entry.name, entry.file));
            }
            msg.push_str("\nCheck that the files are present.");
            dialogs.push(Dialog::warning("Files not found", msg));
        }

        let mut editors = Vec::with_capacity(ListKind::ALL.len());
        for kind in ListKind::ALL {
            let (editor, notice) = ListEditor::new(kind, &base_dir);
            dialogs.extend(notice);
            editors.push(editor);
        }

        info!("Base directory: {}", base_dir.display());

        Self {
            config,
            config_path,
            registry,
            base_dir,
            controller,
            editors,
            dialogs,
            tab: Tab::Connection,
            allow_close: false,
        }
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save_to(&self.config_path) {
            warn!("Failed to save settings: {}", e);
        }
    }

    fn selected_file(&self) -> &str {
        self.registry
            .get(&self.config.config)
            .map(|e| e.file.as_str())
            .unwrap_or_default()
    }

    /// Connect/disconnect button handler
    fn toggle(&mut self) {
        if !self.controller.controls_enabled() {
            return;
        }

        if self.controller.is_connected() {
            let config = self.controller.active_config().unwrap_or_default();
            self.dialogs.push(Dialog::confirm(
                "Disconnect",
                format!("Disconnect from \"{config}\"?\nAll related processes will be stopped."),
                Confirm::Disconnect,
            ));
        } else {
            self.connect();
        }
    }

    fn connect(&mut self) {
        let name = self.config.config.clone();
        let result = self
            .registry
            .resolve(&name, &self.base_dir)
            .and_then(|script| self.controller.connect(&name, script));

        if let Err(e) = result {
            error!("Failed to connect: {}", e);
            self.dialogs.push(Dialog::error(
                "Error",
                format!("Failed to start the script:\n{e}"),
            ));
        }
    }

    fn disconnect(&mut self) {
        if let Err(e) = self.controller.disconnect() {
            error!("Failed to disconnect: {}", e);
            self.dialogs.push(Dialog::error("Error", e.to_string()));
        }
    }

    fn handle_event(&mut self, event: ControllerEvent) {
        let dialog = match event {
            ControllerEvent::Connected { config } => Dialog::info(
                "Connected",
                format!("✓ Connection established!\nConfiguration: {config}"),
            ),
            ControllerEvent::ConnectFailed { config, error } => {
                warn!("Could not connect '{}'", config);
                Dialog::error("Error", format!("Failed to start the script:\n{error}"))
            }
            ControllerEvent::Disconnected { config, report } if report.success() => Dialog::info(
                "Disconnected",
                format!("✓ Connection closed!\nConfiguration: {config}"),
            ),
            ControllerEvent::Disconnected { .. } => Dialog::warning(
                "Attention",
                "Could not fully stop the process.\nCheck Task Manager.",
            ),
        };
        self.dialogs.push(dialog);
    }

    fn handle_confirm(&mut self, confirm: Confirm) {
        match confirm {
            Confirm::Disconnect => self.disconnect(),
            Confirm::Quit => {
                if let Some(Err(e)) = self.controller.shutdown().map(|r| r.into_result()) {
                    warn!("Closing anyway: {}", e);
                }
                self.save_config();
                self.allow_close = true;
            }
            Confirm::ClearList(kind) => {
                let notices = self.editor_mut(kind).map(|e| e.clear()).unwrap_or_default();
                self.dialogs.extend(notices);
            }
            Confirm::DropInvalid(kind) => {
                let notices = self
                    .editor_mut(kind)
                    .map(|e| e.save_dropping_invalid())
                    .unwrap_or_default();
                self.dialogs.extend(notices);
            }
        }
    }

    fn editor_mut(&mut self, kind: ListKind) -> Option<&mut ListEditor> {
        self.editors.iter_mut().find(|e| e.kind() == kind)
    }

    /// Intercept window close while a configuration is running
    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested()) || self.allow_close {
            return;
        }

        if self.ask_before_quit() {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        } else {
            self.save_config();
        }
    }

    /// Queue a single quit confirmation while connected or busy
    ///
    /// Returns whether the close has to wait for the answer.
    fn ask_before_quit(&mut self) -> bool {
        let busy = self.controller.is_connected() || !self.controller.controls_enabled();
        if !busy {
            return false;
        }

        if !self.dialogs.contains(Confirm::Quit) {
            let config = self.controller.active_config().unwrap_or_default();
            self.dialogs.push(Dialog::confirm(
                "Confirm",
                format!("Close the application?\nConfiguration \"{config}\" will be disconnected."),
                Confirm::Quit,
            ));
        }
        true
    }

    fn status_text(&self) -> String {
        let config = self.controller.active_config().unwrap_or_default();
        match (self.controller.state(), self.controller.pending()) {
            (_, Some(Request::Connect)) => format!("Connecting: {config}..."),
            (_, Some(Request::Disconnect)) => "Disconnecting...".to_string(),
            (ConnectionState::Connected, None) => format!("Connected: {config}"),
            _ => "Waiting for connection...".to_string(),
        }
    }

    fn status_color(&self) -> egui::Color32 {
        match self.controller.state() {
            ConnectionState::Connected => GREEN,
            ConnectionState::Connecting => ORANGE,
            ConnectionState::Disconnected => RED,
        }
    }

    /// Render the connection tab
    fn render_connection(&mut self, ui: &mut egui::Ui) {
        let enabled = self.controller.controls_enabled();

        ui.vertical_centered(|ui| {
            ui.add_space(10.0);
            ui.heading(egui::RichText::new("Zapret Launcher").size(24.0).strong());
            ui.add_space(20.0);

            // Configuration selector
            ui.add_enabled_ui(enabled && !self.controller.is_connected(), |ui| {
                ui.horizontal(|ui| {
                    ui.add_space(ui.available_width() / 2.0 - 120.0);
                    ui.label("Configuration:");
                    let mut changed = false;
                    egui::ComboBox::from_id_salt("config_selector")
                        .selected_text(self.config.config.as_str())
                        .width(160.0)
                        .show_ui(ui, |ui| {
                            for name in self.registry.names() {
                                changed |= ui
                                    .selectable_value(&mut self.config.config, name.to_string(), name)
                                    .changed();
                            }
                        });
                    if changed {
                        info!("Selected configuration: {}", self.config.config);
                        self.save_config();
                    }
                });
            });

            ui.add_space(30.0);

            // Round connect button
            let color = self.status_color();
            let label = match (self.controller.pending(), self.controller.is_connected()) {
                (Some(_), _) => "...",
                (None, true) => "DISCONNECT",
                (None, false) => "CONNECT",
            };
            let sense = if enabled {
                egui::Sense::click()
            } else {
                egui::Sense::hover()
            };
            let (rect, response) = ui.allocate_exact_size(egui::vec2(150.0, 150.0), sense);
            let fill = if response.hovered() && enabled {
                color.gamma_multiply(0.85)
            } else {
                color
            };
            let painter = ui.painter();
            painter.circle_filled(rect.center(), 72.0, fill);
            painter.circle_stroke(rect.center(), 72.0, egui::Stroke::new(3.0, egui::Color32::WHITE));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                label,
                egui::FontId::proportional(18.0),
                egui::Color32::WHITE,
            );
            if response.on_hover_cursor(egui::CursorIcon::PointingHand).clicked() {
                self.toggle();
            }

            ui.add_space(20.0);

            // Status indicator
            ui.horizontal(|ui| {
                ui.add_space(ui.available_width() / 2.0 - 110.0);
                ui.label(egui::RichText::new("●").size(20.0).color(self.status_color()));
                ui.label(egui::RichText::new(self.status_text()).size(16.0));
            });

            ui.add_space(20.0);

            ui.group(|ui| {
                let info = match self.controller.pid() {
                    Some(pid) => format!(
                        "Running: {} (PID: {pid})\nPress the button to disconnect",
                        self.selected_file()
                    ),
                    None => format!(
                        "Selected file: {}\nPress the button to connect",
                        self.selected_file()
                    ),
                };
                ui.label(egui::RichText::new(info).color(egui::Color32::GRAY));
            });

        });
    }
}

impl eframe::App for ZapretApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply finished connect/disconnect work
        while let Some(event) = self.controller.poll() {
            self.handle_event(event);
        }

        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.config.window_size = Some((rect.width(), rect.height()));
        }

        self.handle_close_request(ctx);

        if let Some(confirm) = self.dialogs.show(ctx) {
            self.handle_confirm(confirm);
        }

        if self.allow_close {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        let interactive = !self.dialogs.is_open();

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| {
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.tab, Tab::Connection, "Connection");
                    for kind in ListKind::ALL {
                        ui.selectable_value(&mut self.tab, Tab::List(kind), kind.label());
                    }
                });
            });
        });

        let mut notices = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| match self.tab {
                Tab::Connection => self.render_connection(ui),
                Tab::List(kind) => {
                    if let Some(editor) = self.editor_mut(kind) {
                        notices = editor.ui(ui);
                    }
                }
            });
        });
        self.dialogs.extend(notices);

        // Keep polling the controller
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

/// Run the application
pub fn run() -> anyhow::Result<()> {
    let size = GuiConfig::load().window_size.unwrap_or((480.0, 640.0));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([size.0, size.1])
            .with_min_inner_size([420.0, 560.0])
            .with_icon(load_app_icon())
            .with_title("Zapret Launcher"),
        ..Default::default()
    };

    eframe::run_native(
        "Zapret Launcher",
        options,
        Box::new(|cc| Ok(Box::new(ZapretApp::new(cc)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run GUI: {}", e))
}

/// Load application icon
fn load_app_icon() -> egui::IconData {
    // Ring in the connected colour
    let size = 32u32;
    let center = size as f32 / 2.0;
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);

    for y in 0..size {
        for x in 0..size {
            let dist = ((x as f32 - center).powi(2) + (y as f32 - center).powi(2)).sqrt();
            if dist < center - 2.0 && dist > center - 8.0 {
                rgba.extend_from_slice(&[GREEN.r(), GREEN.g(), GREEN.b(), 255]);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }

    egui::IconData {
        rgba,
        width: size,
        height: size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::mocks::{controller, spawning_control};

    fn app(dir: &tempfile::TempDir) -> ZapretApp {
        ZapretApp::with_parts(
            GuiConfig::default(),
            dir.path().join("gui_config.json"),
            dir.path().to_path_buf(),
            ConnectionController::default(),
        )
    }

    #[test]
    fn test_startup_creates_layout_and_warns() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);

        assert!(dir.path().join("bin").is_dir());
        assert!(dir.path().join("lists/list-general.txt").exists());
        assert!(dir.path().join("lists/list-exclude.txt").exists());

        let warning = app.dialogs.current().unwrap();
        assert_eq!(warning.title, "Files not found");
        assert!(warning.message.contains("• general (ALT) (general (ALT).bat)"));
        assert!(warning.message.contains("• general (ALT11) (general (ALT11).bat)"));
        app.dialogs.answer(true);
        assert!(!app.dialogs.is_open());
    }

    #[test]
    fn test_no_warning_when_scripts_present() {
        let dir = tempfile::tempdir().unwrap();
        for entry in ScriptRegistry::builtin().entries() {
            std::fs::write(dir.path().join(&entry.file), "@echo off").unwrap();
        }

        let app = app(&dir);
        assert!(!app.dialogs.is_open());
    }

    #[test]
    fn test_connect_missing_script_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.dialogs.answer(true);

        app.toggle();
        let event = app.controller.wait(Duration::from_secs(5)).unwrap();
        app.handle_event(event);

        let dialog = app.dialogs.current().unwrap();
        assert!(dialog.message.starts_with("Failed to start the script:"));
        assert_eq!(app.controller.state(), ConnectionState::Disconnected);
        assert_eq!(app.status_text(), "Waiting for connection...");
    }

    #[test]
    fn test_unknown_saved_selection_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let config = GuiConfig {
            config: "removed".to_string(),
            ..GuiConfig::default()
        };
        let app = ZapretApp::with_parts(
            config,
            dir.path().join("gui_config.json"),
            dir.path().to_path_buf(),
            ConnectionController::default(),
        );
        assert_eq!(app.config.config, "general (ALT)");
        assert_eq!(app.selected_file(), "general (ALT).bat");
    }

    #[test]
    fn test_confirmed_clear_empties_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.dialogs.answer(true);
        let path = dir.path().join("lists/list-exclude.txt");
        std::fs::write(&path, "a.com\nb.com").unwrap();

        app.handle_confirm(Confirm::ClearList(ListKind::Exclude));

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
        assert_eq!(app.dialogs.current().unwrap().message, "List cleared.");
    }

    #[test]
    fn test_quit_when_idle_allows_close() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);

        app.handle_confirm(Confirm::Quit);
        assert!(app.allow_close);
        assert!(dir.path().join("gui_config.json").exists());
    }

    fn connected_app(dir: &tempfile::TempDir) -> ZapretApp {
        for entry in ScriptRegistry::builtin().entries() {
            std::fs::write(dir.path().join(&entry.file), "@echo off").unwrap();
        }
        let mut app = ZapretApp::with_parts(
            GuiConfig::default(),
            dir.path().join("gui_config.json"),
            dir.path().to_path_buf(),
            controller(spawning_control()),
        );

        app.toggle();
        let event = app.controller.wait(Duration::from_secs(5)).unwrap();
        app.handle_event(event);
        assert!(app.controller.is_connected());
        app.dialogs.answer(true);
        assert!(!app.dialogs.is_open());
        app
    }

    #[test]
    fn test_disconnect_always_asks_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = connected_app(&dir);

        app.toggle();
        assert!(app.controller.is_connected());
        assert_eq!(app.dialogs.answer(true), Some(Confirm::Disconnect));

        app.handle_confirm(Confirm::Disconnect);
        let event = app.controller.wait(Duration::from_secs(5)).unwrap();
        app.handle_event(event);
        assert_eq!(app.controller.state(), ConnectionState::Disconnected);
        assert!(app.dialogs.current().unwrap().message.starts_with("✓ Connection closed!"));
    }

    #[test]
    fn test_repeated_close_queues_one_quit_question() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = connected_app(&dir);
        app.dialogs.push(Dialog::info("Success", "List cleared."));

        assert!(app.ask_before_quit());
        assert!(app.ask_before_quit());
        assert!(app.ask_before_quit());

        assert_eq!(app.dialogs.answer(true), None);
        assert_eq!(app.dialogs.answer(true), Some(Confirm::Quit));
        assert!(!app.dialogs.is_open());
    }

    #[test]
    fn test_close_when_idle_needs_no_question() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.dialogs.answer(true);

        assert!(!app.ask_before_quit());
        assert!(!app.dialogs.is_open());
    }
}
