//! Main application loop for the Online Accounts panel
//!
//! This module contains the eframe::App implementation and the per-frame layout.

use std::time::Duration;

use eframe::egui;

use crate::app_state::{CredentialsPanel, View};

impl eframe::App for CredentialsPanel {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}

impl CredentialsPanel {
    /// Draw one frame. Separate from `update` so it can run without a native window.
    pub fn show(&mut self, ctx: &egui::Context) {
        self.poll_signon();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
            ui.heading(self.title());
        });

        egui::SidePanel::left("accounts_panel")
            .resizable(true)
            .default_width(200.0)
            .show(ctx, |ui| {
                self.account_list_ui(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_error_banner(ui);

            match self.view.clone() {
                View::AccountList => {
                    if self.accounts.is_empty() {
                        ui.label("No accounts configured. Use \"Add account…\" to create one.");
                    } else {
                        ui.label("Select an account to see its details.");
                    }
                }
                View::AddAccount => self.add_account_ui(ui),
                View::Authorizing => self.authorizing_ui(ui),
                View::AccountDetails(id) => self.account_details_ui(ui, id),
            }
        });

        self.show_remove_dialog(ctx);

        // Keep polling the sign-on worker while a login is in flight.
        if self.signon.is_some() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}
