//! "Add account" page: provider filter and provider buttons.

use eframe::egui;

use crate::app_state::CredentialsPanel;

impl CredentialsPanel {
    pub fn add_account_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Add account");
        if let Some(application) = &self.application {
            ui.label(format!("Accounts usable by {application}"));
        }

        let mut new_filter = None;
        ui.horizontal(|ui| {
            ui.label("Show:");
            ui.menu_button(self.provider_filter.label().to_string(), |ui| {
                for option in self.filter_options() {
                    if ui.button(option.label()).clicked() {
                        new_filter = Some(option);
                        ui.close();
                    }
                }
            });
        });
        if let Some(filter) = new_filter {
            self.provider_filter = filter;
        }

        ui.separator();

        let mut chosen = None;
        let providers = self.visible_providers();
        if providers.is_empty() {
            ui.label("No providers match this filter.");
        }
        for provider in providers {
            if ui.button(&provider.display_name).clicked() {
                chosen = Some(provider.name.clone());
            }
        }

        if let Some(name) = chosen {
            self.select_provider(&name);
        }
    }
}
