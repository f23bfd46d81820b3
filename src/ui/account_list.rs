//! Account list sidebar and the account details page.

use eframe::egui;

use crate::app_state::{CredentialsPanel, View};

impl CredentialsPanel {
    /// Sidebar listing every account, followed by the add button
    pub fn account_list_ui(&mut self, ui: &mut egui::Ui) {
        let mut opened = None;

        egui::ScrollArea::vertical().show(ui, |ui| {
            for account in self.accounts.list() {
                let selected = self.view == View::AccountDetails(account.id);
                let response = ui.add(egui::Button::new(account.list_label()).selected(selected));
                if response.clicked() {
                    opened = Some(account.id);
                }
            }
        });

        ui.separator();
        if ui.button("Add account…").clicked() {
            self.open_add_account();
        }

        if let Some(id) = opened {
            self.open_account(id);
        }
    }

    pub fn account_details_ui(&mut self, ui: &mut egui::Ui, id: u32) {
        let Some(account) = self.accounts.get(id).cloned() else {
            ui.label("This account no longer exists.");
            return;
        };

        ui.heading(&account.display_name);
        ui.label(format!("Provider: {}", account.provider_display_name));
        ui.label(format!("Created: {}", account.created_at.format("%Y-%m-%d %H:%M")));
        if account.need_authentication {
            ui.colored_label(egui::Color32::YELLOW, "Credentials need to be updated");
        }
        ui.separator();

        let mut enabled = account.enabled;
        if ui.checkbox(&mut enabled, "Enabled").changed() {
            self.set_account_enabled(id, enabled);
        }

        if !account.services.is_empty() {
            ui.label("Services:");
            for (service, service_enabled) in &account.services {
                let mut checked = *service_enabled;
                if ui.checkbox(&mut checked, service).changed() {
                    self.set_service_enabled(id, service, checked);
                }
            }
        }

        ui.separator();
        if ui.button("Remove Account").clicked() {
            self.request_remove(id);
        }
    }
}
