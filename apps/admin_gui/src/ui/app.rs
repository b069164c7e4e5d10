use arboard::Clipboard;
use chrono::Local;
use client_core::{ControllerPhase, DEFAULT_BASE_URL};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{reduce, PanelState, StatusBannerSeverity};

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub server_url: String,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

fn server_environment_label(server_url: &str) -> &'static str {
    let server = server_url.to_ascii_lowercase();
    if server.contains("127.0.0.1") || server.contains("localhost") {
        "Local"
    } else if server.contains("staging") {
        "Staging"
    } else if server.contains("dev") {
        "Development"
    } else {
        "Production"
    }
}

fn phase_label(phase: ControllerPhase) -> &'static str {
    match phase {
        ControllerPhase::Idle => "Idle",
        ControllerPhase::Submitting => "Submitting",
        ControllerPhase::Refreshing => "Refreshing",
    }
}

pub struct AdminPanelApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    panel: PanelState,
    server_url: String,
}

impl AdminPanelApp {
    pub fn bootstrap(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            panel: PanelState::default(),
            server_url: startup.server_url,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            reduce(&mut self.panel, event, Local::now());
        }
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.panel.status);
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        let copied = Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_owned()));
        self.panel.status = match copied {
            Ok(()) => format!("Copied {text} to clipboard"),
            Err(err) => format!("Clipboard unavailable: {err}"),
        };
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Short URL admin");
                ui.separator();
                ui.small(format!(
                    "{} ({})",
                    self.server_url,
                    server_environment_label(&self.server_url)
                ));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Refresh").clicked() {
                        self.dispatch(BackendCommand::Refresh);
                    }
                });
            });
        });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.panel.is_busy() {
                    ui.spinner();
                }
                ui.small(phase_label(self.panel.phase));
                ui.separator();
                ui.small(self.panel.status.as_str());
                if let Some(synced_at) = self.panel.last_synced_at {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.small(format!("Last sync {}", synced_at.format("%H:%M:%S")));
                    });
                }
            });
        });
    }

    fn show_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.panel.status_banner.clone() else {
            return;
        };
        let mut dismissed = false;
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let color = match banner.severity {
                        StatusBannerSeverity::Error => ui.visuals().error_fg_color,
                    };
                    ui.colored_label(color, banner.message.as_str());
                    if ui.small_button("Dismiss").clicked() {
                        dismissed = true;
                    }
                });
            });
        if dismissed {
            self.panel.dismiss_banner();
        }
        ui.add_space(6.0);
    }

    fn show_create_form(&mut self, ui: &mut egui::Ui) {
        let mut submit = false;
        ui.group(|ui| {
            ui.label("Shorten a URL");
            ui.horizontal(|ui| {
                let long_url = ui.add(
                    egui::TextEdit::singleline(&mut self.panel.long_url_draft)
                        .hint_text("Enter long URL")
                        .desired_width(420.0),
                );
                let custom_key = ui.add(
                    egui::TextEdit::singleline(&mut self.panel.custom_key_draft)
                        .hint_text("Custom key (optional)")
                        .desired_width(180.0),
                );
                let enter_pressed = (long_url.lost_focus() || custom_key.lost_focus())
                    && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Shorten").clicked() || enter_pressed {
                    submit = true;
                }
            });
        });
        if submit {
            let cmd = self.panel.create_command();
            self.dispatch(cmd);
        }
    }

    fn show_url_table(&mut self, ui: &mut egui::Ui) {
        if let Some((short_key, long_url)) = &self.panel.last_resolved {
            ui.horizontal(|ui| {
                ui.label(format!("{short_key} resolves to"));
                ui.hyperlink(long_url);
            });
            ui.add_space(4.0);
        }

        if self.panel.urls.is_empty() {
            ui.weak("No shortened URLs yet.");
            return;
        }

        let mut commands = Vec::new();
        let mut copy_request = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("short_url_table")
                    .striped(true)
                    .num_columns(5)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        ui.strong("Key");
                        ui.strong("Long URL");
                        ui.strong("Short URL");
                        ui.strong("Created");
                        ui.strong("");
                        ui.end_row();

                        for record in &self.panel.urls {
                            ui.monospace(record.short_key.as_str());
                            ui.add(egui::Label::new(record.long_url.as_str()).truncate());
                            ui.hyperlink(&record.short_url);
                            ui.small(record.created_at.as_str());
                            ui.horizontal(|ui| {
                                if ui.small_button("Copy").clicked() {
                                    copy_request = Some(record.short_url.clone());
                                }
                                if ui.small_button("Resolve").clicked() {
                                    commands.push(BackendCommand::Resolve {
                                        short_key: record.short_key.clone(),
                                    });
                                }
                                if ui.small_button("Delete").clicked() {
                                    commands.push(BackendCommand::SubmitDelete {
                                        short_key: record.short_key.clone(),
                                    });
                                }
                            });
                            ui.end_row();
                        }
                    });
            });

        if let Some(short_url) = copy_request {
            self.copy_to_clipboard(&short_url);
        }
        for cmd in commands {
            self.dispatch(cmd);
        }
    }
}

impl eframe::App for AdminPanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_top_bar(ctx);
        self.show_status_bar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_banner(ui);
            self.show_create_form(ui);
            ui.add_space(8.0);
            self.show_url_table(ui);
        });

        if self.panel.is_busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use shared::{domain::ShortKey, protocol::ShortenedUrlRecord};

    #[test]
    fn labels_server_environment_from_url() {
        assert_eq!(server_environment_label(DEFAULT_BASE_URL), "Local");
        assert_eq!(
            server_environment_label("https://staging.sho.rt/api/shorten"),
            "Staging"
        );
        assert_eq!(
            server_environment_label("https://sho.rt/api/shorten"),
            "Production"
        );
    }

    #[test]
    fn drains_queued_events_into_panel_state() {
        let (cmd_tx, _cmd_rx) = bounded(4);
        let (ui_tx, ui_rx) = bounded(4);
        let mut app = AdminPanelApp::bootstrap(cmd_tx, ui_rx, StartupConfig::default());
        let record = ShortenedUrlRecord {
            short_key: ShortKey::new("abc123"),
            long_url: "https://x.test".to_string(),
            short_url: "http://localhost:8080/abc123".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };

        ui_tx
            .try_send(UiEvent::Info("Backend worker ready".to_string()))
            .expect("send");
        ui_tx.try_send(UiEvent::Created(record)).expect("send");
        app.process_ui_events();

        assert_eq!(
            app.panel.status,
            "Created http://localhost:8080/abc123 -> https://x.test"
        );
    }

    #[test]
    fn dispatch_reports_disconnected_worker_in_status() {
        let (cmd_tx, cmd_rx) = bounded(4);
        let (_ui_tx, ui_rx) = bounded(4);
        drop(cmd_rx);
        let mut app = AdminPanelApp::bootstrap(cmd_tx, ui_rx, StartupConfig::default());

        app.dispatch(BackendCommand::Refresh);

        assert!(app.panel.status.starts_with("Backend worker disconnected"));
    }
}
