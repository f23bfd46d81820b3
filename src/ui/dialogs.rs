//! Dialog windows of the panel.

use eframe::egui;

use crate::app_state::CredentialsPanel;

impl CredentialsPanel {
    /// Confirmation before removing an account. Enter confirms.
    pub fn show_remove_dialog(&mut self, ctx: &egui::Context) {
        let Some(id) = self.confirm_remove else {
            return;
        };
        let provider = self
            .accounts
            .get(id)
            .map(|a| a.provider_display_name.clone())
            .unwrap_or_default();

        let mut confirmed = ctx.input(|i| i.key_pressed(egui::Key::Enter));
        let mut cancelled = ctx.input(|i| i.key_pressed(egui::Key::Escape));

        egui::Window::new("Remove account")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("Are you sure that you wish to remove this {provider} account?"));
                ui.label("The account will be removed from this computer only.");
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                    if ui.button("Remove").clicked() {
                        confirmed = true;
                    }
                });
            });

        if cancelled {
            self.confirm_remove = None;
        } else if confirmed {
            self.confirm_removal();
        }
    }

    /// Error banner shown above the main area
    pub fn show_error_banner(&mut self, ui: &mut egui::Ui) {
        let mut dismiss = false;
        if let Some(error) = &self.error_message {
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::RED, format!("⚠ Error: {error}"));
                if ui.small_button("Dismiss").clicked() {
                    dismiss = true;
                }
            });
            ui.separator();
        }
        if dismiss {
            self.error_message = None;
        }
    }
}
