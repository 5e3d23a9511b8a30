use super::ActionProgress;
use super::OwletUploader;
use crate::content_type::ContentType;
use crate::template;
use crate::upload::TrackedFile;
use crate::utils::color::{accent, notification_color, status_color};
use crate::utils::file_size::format_size;
use eframe::egui::{self, Color32, RichText};
use rfd::FileDialog;
use uuid::Uuid;

impl OwletUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.heading("Guardian Owlet Bulk Upload");
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new("Upload learning content in bulk from CSV files and bundles")
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });

                ui.add_space(20.0);
                self.render_content_type(ui);

                ui.add_space(20.0);
                self.render_drop_zone(ui, hovering);

                if !self.state.files.is_empty() {
                    ui.add_space(10.0);
                    self.render_file_list(ui);
                }

                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.horizontal(|ui| {
                        let button = egui::Button::new("📤 Upload Files")
                            .min_size(egui::vec2(200.0, 40.0));
                        if ui.add_enabled(self.can_upload(), button).clicked() {
                            self.start_upload();
                        }

                        let can_clear = !self.state.files.is_empty() && !self.state.is_uploading;
                        if ui.add_enabled(can_clear, egui::Button::new("🗑 Clear All")).clicked() {
                            self.clear_files();
                        }
                    });
                });

                if !matches!(self.state.progress, ActionProgress::NotStarted) {
                    ui.add_space(10.0);
                    ui.group(|ui| {
                        let progress_bar =
                            egui::ProgressBar::new(self.state.get_progress_percentage())
                                .show_percentage()
                                .animate(self.state.is_uploading)
                                .fill(accent());
                        ui.add(progress_bar);
                        ui.label(self.state.get_status_text());
                    });
                }

                ui.add_space(10.0);
                self.render_notifications(ui);
            });
        });
    }

    fn render_content_type(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            let mut selected = self.content_type();
            ui.horizontal(|ui| {
                ui.add_enabled_ui(!self.state.is_uploading, |ui| {
                    egui::ComboBox::from_label("Content type")
                        .selected_text(selected.display_name())
                        .show_ui(ui, |ui| {
                            for ct in ContentType::ALL {
                                ui.selectable_value(&mut selected, ct, ct.display_name());
                            }
                        });
                });
            });
            self.set_content_type(selected);

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("⬇ Download Format").clicked() {
                    let file_name = template::template_file_name(selected.key());
                    if let Some(path) = FileDialog::new()
                        .set_file_name(&file_name)
                        .add_filter("CSV", &["csv"])
                        .save_file()
                    {
                        self.download_template(&path);
                    }
                }
                if ui.link("View published template").clicked() {
                    let _ = open::that(self.published_template_url());
                }
            });

            let accept = selected.accept_filter();
            ui.label(
                RichText::new(if accept.is_empty() {
                    "Any file type accepted".to_string()
                } else {
                    format!("Accepted: {}", accept)
                })
                .small(),
            );
        });
    }

    fn render_drop_zone(&mut self, ui: &mut egui::Ui, hovering: bool) {
        let stroke_color = if hovering {
            accent()
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        };

        egui::Frame::none()
            .stroke(egui::Stroke::new(2.0, stroke_color))
            .rounding(8.0)
            .inner_margin(24.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label(if hovering {
                        "Drop files to stage them"
                    } else {
                        "Drag and drop files or folders here"
                    });
                    ui.label(
                        RichText::new(format!(
                            "Up to {} files per batch",
                            self.config.upload.max_files
                        ))
                        .small(),
                    );
                    ui.add_space(8.0);

                    let picker = ui.add_enabled(
                        !self.state.is_uploading,
                        egui::Button::new("📁 Select Files"),
                    );
                    if picker.clicked() {
                        let content_type = self.content_type();
                        let mut dialog = FileDialog::new();
                        if !content_type.extensions().is_empty() {
                            dialog = dialog
                                .add_filter(content_type.display_name(), content_type.extensions());
                        }
                        if let Some(paths) = dialog.pick_files() {
                            self.add_paths(paths);
                        }
                    }
                });
            });
    }

    fn render_file_list(&mut self, ui: &mut egui::Ui) {
        let mut to_remove: Option<Uuid> = None;

        egui::ScrollArea::vertical()
            .id_source("staged_files")
            .max_height(240.0)
            .show(ui, |ui| {
                egui::Frame::none()
                    .fill(ui.style().visuals.extreme_bg_color)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        for file in self.state.files.files() {
                            if file_row(ui, file, self.state.is_uploading) {
                                to_remove = Some(file.id);
                            }
                            ui.add_space(4.0);
                        }
                    });
            });

        if let Some(id) = to_remove {
            self.remove_file(id);
        }
    }

    fn render_notifications(&mut self, ui: &mut egui::Ui) {
        let mut dismissed = None;

        for (index, notification) in self.state.notifications.iter().enumerate() {
            egui::Frame::none()
                .stroke(egui::Stroke::new(1.0, notification_color(notification.level)))
                .rounding(4.0)
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.label(
                                RichText::new(&notification.title)
                                    .strong()
                                    .color(notification_color(notification.level)),
                            );
                            ui.label(&notification.message);
                        });
                        if ui.small_button("✕").clicked() {
                            dismissed = Some(index);
                        }
                    });
                });
            ui.add_space(4.0);
        }

        if let Some(index) = dismissed {
            self.dismiss_notification(index);
        }
    }
}

/// Draws one staged file. Returns `true` when its remove button was hit.
fn file_row(ui: &mut egui::Ui, file: &TrackedFile, locked: bool) -> bool {
    let mut remove = false;

    ui.horizontal(|ui| {
        ui.label(&file.name);
        ui.label(
            RichText::new(format_size(file.size)).color(Color32::from_rgb(150, 150, 150)),
        );
        ui.add(
            egui::ProgressBar::new(f32::from(file.progress) / 100.0)
                .desired_width(120.0)
                .fill(status_color(file.status)),
        );
        ui.colored_label(status_color(file.status), file.status.label());
        if ui.add_enabled(!locked, egui::Button::new("✕").small()).clicked() {
            remove = true;
        }
    });

    remove
}
