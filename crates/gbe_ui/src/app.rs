//! Main application window.
//!
//! One window: format pickers and after-action options at the top, a drop
//! zone in the middle, and the per-file results table below it. Dropping
//! files is the only way to start conversions.

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use egui::{Color32, RichText};

use gbe_core::babel::{discover_formats, Format, GpsBabel, ToolResult};
use gbe_core::config::{push_recent, push_recent_folder, AfterChoice, ConfigManager};
use gbe_core::convert::{
    AfterAction, ConversionQueue, ConversionRequest, ProgressTable, RowState,
};

const SUCCESS_GLYPH: &str = "\u{2714}";
const FAILURE_GLYPH: &str = "\u{2718}";
const SUCCESS_COLOR: Color32 = Color32::from_rgb(20, 128, 20);
const FAILURE_COLOR: Color32 = Color32::from_rgb(128, 20, 20);

type DiscoveryResult = ToolResult<(String, Vec<Format>)>;

/// One entry of the source-file action combo.
#[derive(Clone, PartialEq)]
enum AfterSelection {
    Leave,
    Trash,
    Move(PathBuf),
}

pub struct EasyApp {
    config: ConfigManager,
    queue: ConversionQueue,
    table: Arc<ProgressTable>,

    /// Pending result of the startup `-V` / `-h` probe.
    discovery: Option<mpsc::Receiver<DiscoveryResult>>,
    /// Version banner shown once the probe succeeds.
    version_line: Option<String>,
    formats: Vec<Format>,

    input_code: Option<String>,
    output_code: Option<String>,

    /// Transient message shown above the drop zone.
    notice: Option<String>,
    /// Set when the tool cannot be used at all; the app shows the message
    /// and offers only to quit.
    fatal: Option<String>,
    show_busy_notice: bool,
}

impl EasyApp {
    pub fn new(config: ConfigManager) -> Self {
        let tool_path = config.settings().tool.gpsbabel_path.clone();

        let table = Arc::new(ProgressTable::new());
        let queue = ConversionQueue::new(
            Arc::new(GpsBabel::new(&tool_path)),
            Arc::clone(&table),
        );

        // Probe the tool off the UI thread; the window opens immediately.
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let tool = GpsBabel::new(&tool_path);
            let result = tool
                .version()
                .and_then(|version| discover_formats(&tool).map(|formats| (version, formats)));
            let _ = tx.send(result);
        });

        let input_code = config.settings().formats.recent_inputs.first().cloned();
        let output_code = config.settings().formats.recent_outputs.first().cloned();

        Self {
            config,
            queue,
            table,
            discovery: Some(rx),
            version_line: None,
            formats: Vec::new(),
            input_code,
            output_code,
            notice: None,
            fatal: None,
            show_busy_notice: false,
        }
    }

    fn poll_discovery(&mut self) {
        let Some(rx) = &self.discovery else { return };
        match rx.try_recv() {
            Ok(Ok((version, formats))) => {
                tracing::info!("Found {} ({} formats)", version, formats.len());
                self.version_line = Some(version);
                self.formats = formats;
                self.discovery = None;
                // Drop remembered codes the installed tool no longer offers.
                if let Some(code) = &self.input_code {
                    if !self.knows_format(code) {
                        self.input_code = None;
                    }
                }
                if let Some(code) = &self.output_code {
                    if !self.knows_format(code) {
                        self.output_code = None;
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Tool probe failed: {}", e);
                self.fatal = Some(format!(
                    "gpsbabel could not be run.\n\n{}\n\nInstall gpsbabel or set its \
                     location in {} and start again.",
                    e,
                    self.config.path().display()
                ));
                self.discovery = None;
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                self.fatal = Some("gpsbabel probe thread died unexpectedly".to_string());
                self.discovery = None;
            }
        }
    }

    fn knows_format(&self, code: &str) -> bool {
        self.formats.iter().any(|f| f.code == code)
    }

    /// Build and enqueue requests for a batch of dropped files.
    fn submit_paths(&mut self, paths: Vec<PathBuf>) {
        let Some(input) = self.input_code.clone() else {
            self.notice = Some("Choose an input format first".to_string());
            return;
        };
        let Some(output) = self.output_code.clone() else {
            self.notice = Some("Choose an output format first".to_string());
            return;
        };

        let settings = self.config.settings();
        let after_action = match settings.after.choice {
            AfterChoice::Leave => AfterAction::Leave,
            AfterChoice::Trash => AfterAction::Trash,
            AfterChoice::Move => match &settings.folders.move_folder {
                Some(folder) => AfterAction::MoveTo(folder.clone()),
                None => {
                    self.notice =
                        Some("Choose a folder to move source files to first".to_string());
                    return;
                }
            },
        };
        let output_folder = settings.folders.output_override.clone();

        let requests: Vec<ConversionRequest> = paths
            .into_iter()
            .filter(|p| p.is_file())
            .map(|source| ConversionRequest {
                source,
                input_format: input.clone(),
                output_format: output.clone(),
                after_action: after_action.clone(),
                output_folder: output_folder.clone(),
            })
            .collect();
        if requests.is_empty() {
            return;
        }

        self.notice = None;
        push_recent(&mut self.config.settings_mut().formats.recent_inputs, &input);
        push_recent(&mut self.config.settings_mut().formats.recent_outputs, &output);
        self.save_config();

        self.queue.submit(requests);
    }

    fn save_config(&mut self) {
        if let Err(e) = self.config.save() {
            self.fatal = Some(format!(
                "Could not save settings to {}: {}",
                self.config.path().display(),
                e
            ));
        }
    }

    fn format_combo(
        ui: &mut egui::Ui,
        id: &str,
        formats: &[Format],
        recent: &[String],
        current: &mut Option<String>,
    ) -> bool {
        let selected_text = match current {
            Some(code) => formats
                .iter()
                .find(|f| &f.code == code)
                .map(|f| f.label.clone())
                .unwrap_or_else(|| code.clone()),
            None => "Choose a format".to_string(),
        };

        let mut changed = false;
        egui::ComboBox::from_id_salt(id)
            .width(280.0)
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                // Recently used entries first, then the full list.
                let recent_known: Vec<&Format> = recent
                    .iter()
                    .filter_map(|code| formats.iter().find(|f| &f.code == code))
                    .collect();
                for format in &recent_known {
                    if ui
                        .selectable_value(current, Some(format.code.clone()), &format.label)
                        .changed()
                    {
                        changed = true;
                    }
                }
                if !recent_known.is_empty() {
                    ui.separator();
                }
                for format in formats {
                    if ui
                        .selectable_value(current, Some(format.code.clone()), &format.label)
                        .changed()
                    {
                        changed = true;
                    }
                }
            });
        changed
    }

    fn show_format_section(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("format_section")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Convert from:");
                let changed = Self::format_combo(
                    ui,
                    "input_format",
                    &self.formats,
                    &self.config.settings().formats.recent_inputs,
                    &mut self.input_code,
                );
                if changed {
                    self.notice = None;
                }
                ui.end_row();

                ui.label("Convert to:");
                let changed = Self::format_combo(
                    ui,
                    "output_format",
                    &self.formats,
                    &self.config.settings().formats.recent_outputs,
                    &mut self.output_code,
                );
                if changed {
                    self.notice = None;
                }
                ui.end_row();

                ui.label("Save into:");
                self.show_output_folder_row(ui);
                ui.end_row();

                ui.label("Source file:");
                self.show_after_row(ui);
                ui.end_row();
            });
    }

    /// Output location: "same folder" plus recently chosen folders.
    fn show_output_folder_row(&mut self, ui: &mut egui::Ui) {
        let mut selection = self.config.settings().folders.output_override.clone();
        let before = selection.clone();
        let recent = self.config.settings().folders.recent_output_folders.clone();

        ui.horizontal(|ui| {
            let selected_text = match &selection {
                Some(folder) => folder.display().to_string(),
                None => "Same folder as each source file".to_string(),
            };
            egui::ComboBox::from_id_salt("output_folder")
                .width(280.0)
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut selection, None, "Same folder as each source file");
                    if !recent.is_empty() {
                        ui.separator();
                    }
                    for folder in &recent {
                        ui.selectable_value(
                            &mut selection,
                            Some(folder.clone()),
                            folder.display().to_string(),
                        );
                    }
                });
            if ui.button("Browse\u{2026}").clicked() {
                if let Some(folder) = rfd::FileDialog::new().pick_folder() {
                    selection = Some(folder);
                }
            }
        });

        if selection != before {
            let settings = self.config.settings_mut();
            if let Some(folder) = &selection {
                push_recent_folder(&mut settings.folders.recent_output_folders, folder);
            }
            settings.folders.output_override = selection;
            self.save_config();
        }
    }

    /// What happens to the source file: leave, trash, or a recent folder.
    fn show_after_row(&mut self, ui: &mut egui::Ui) {
        let settings = self.config.settings();
        let mut selection = match settings.after.choice {
            AfterChoice::Leave => AfterSelection::Leave,
            AfterChoice::Trash => AfterSelection::Trash,
            AfterChoice::Move => settings
                .folders
                .move_folder
                .clone()
                .map(AfterSelection::Move)
                .unwrap_or(AfterSelection::Leave),
        };
        let before = selection.clone();
        let recent = settings.folders.recent_move_folders.clone();

        ui.horizontal(|ui| {
            let selected_text = match &selection {
                AfterSelection::Leave => "Leave it alone".to_string(),
                AfterSelection::Trash => "Move it to the trash".to_string(),
                AfterSelection::Move(folder) => format!("Move it into {}", folder.display()),
            };
            egui::ComboBox::from_id_salt("after_action")
                .width(280.0)
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut selection, AfterSelection::Leave, "Leave it alone");
                    ui.selectable_value(
                        &mut selection,
                        AfterSelection::Trash,
                        "Move it to the trash",
                    );
                    if !recent.is_empty() {
                        ui.separator();
                    }
                    for folder in &recent {
                        ui.selectable_value(
                            &mut selection,
                            AfterSelection::Move(folder.clone()),
                            format!("Move it into {}", folder.display()),
                        );
                    }
                });
            if ui.button("Browse\u{2026}").clicked() {
                if let Some(folder) = rfd::FileDialog::new().pick_folder() {
                    selection = AfterSelection::Move(folder);
                }
            }
        });

        if selection != before {
            let settings = self.config.settings_mut();
            match &selection {
                AfterSelection::Leave => settings.after.choice = AfterChoice::Leave,
                AfterSelection::Trash => settings.after.choice = AfterChoice::Trash,
                AfterSelection::Move(folder) => {
                    settings.after.choice = AfterChoice::Move;
                    settings.folders.move_folder = Some(folder.clone());
                    push_recent_folder(&mut settings.folders.recent_move_folders, folder);
                }
            }
            self.save_config();
        }
    }

    fn show_drop_zone(&mut self, ui: &mut egui::Ui) {
        let hovering = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
        let ready = !self.formats.is_empty();

        let text = if !ready {
            "Looking for gpsbabel\u{2026}"
        } else if hovering {
            "Release to convert"
        } else {
            "Drop files here to convert them"
        };
        let color = if hovering {
            ui.visuals().strong_text_color()
        } else {
            ui.visuals().weak_text_color()
        };

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_min_height(60.0);
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(text).heading().color(color));
            });
        });

        if !ready {
            return;
        }
        let dropped: Vec<PathBuf> = ui.ctx().input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if !dropped.is_empty() {
            self.submit_paths(dropped);
        }
    }

    fn show_results(&mut self, ui: &mut egui::Ui) {
        let rows = self.table.snapshot();
        if rows.is_empty() {
            return;
        }

        ui.separator();
        egui::ScrollArea::vertical()
            .auto_shrink([false, true])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                egui::Grid::new("results")
                    .num_columns(3)
                    .striped(true)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for row in &rows {
                            match &row.state {
                                RowState::Pending => {
                                    ui.label("");
                                    ui.label(&row.label);
                                    ui.weak("queued");
                                }
                                RowState::Processing => {
                                    ui.spinner();
                                    ui.label(&row.label);
                                    ui.weak("converting\u{2026}");
                                }
                                RowState::Succeeded(message) => {
                                    ui.label(
                                        RichText::new(SUCCESS_GLYPH).color(SUCCESS_COLOR),
                                    );
                                    ui.label(&row.label);
                                    ui.label(message);
                                }
                                RowState::Failed(message) => {
                                    ui.label(
                                        RichText::new(FAILURE_GLYPH).color(FAILURE_COLOR),
                                    );
                                    ui.label(&row.label);
                                    ui.label(RichText::new(message).color(FAILURE_COLOR));
                                }
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    fn show_fatal(&mut self, ctx: &egui::Context, message: &str) {
        egui::CentralPanel::default().show(ctx, |_ui| {});
        egui::Window::new("GPSBabel Easy")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                if ui.button("Quit").clicked() {
                    std::process::exit(1);
                }
            });
    }

    fn show_busy_dialog(&mut self, ctx: &egui::Context) {
        egui::Window::new("Conversion in progress")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Please wait until all conversions have finished.");
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    self.show_busy_notice = false;
                }
            });
    }
}

impl eframe::App for EasyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_discovery();

        if let Some(message) = self.fatal.clone() {
            self.show_fatal(ctx, &message);
            return;
        }

        // Refuse to close while conversions are outstanding.
        if ctx.input(|i| i.viewport().close_requested()) && self.queue.is_busy() {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.show_busy_notice = true;
        }
        if self.show_busy_notice {
            if !self.queue.is_busy() {
                self.show_busy_notice = false;
            } else {
                self.show_busy_dialog(ctx);
            }
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.queue.is_busy() {
                    ui.spinner();
                }
                match &self.version_line {
                    Some(version) => ui.weak(version.as_str()),
                    None => ui.weak("Looking for gpsbabel\u{2026}"),
                };
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(format!("GPSBabel Easy {}", gbe_core::version()));
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!self.formats.is_empty(), |ui| {
                self.show_format_section(ui);
            });
            ui.add_space(8.0);

            if let Some(notice) = self.notice.clone() {
                ui.colored_label(FAILURE_COLOR, notice);
                ui.add_space(4.0);
            }

            self.show_drop_zone(ui);
            self.show_results(ui);
        });

        // Keep polling while the probe or conversions are in flight.
        if self.discovery.is_some() || self.queue.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
