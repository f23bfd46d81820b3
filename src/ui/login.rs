//! Authorization page: the provider's login form rendered as native widgets.

use eframe::egui;

use crate::app_state::CredentialsPanel;
use crate::oauth::FieldKind;

impl CredentialsPanel {
    pub fn authorizing_ui(&mut self, ui: &mut egui::Ui) {
        let mut cancel = false;
        let mut submit = false;

        if let Some(signon) = self.signon.as_mut() {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "Please authorize Ubuntu to access your {} account",
                    signon.provider.display_name
                ));
                if ui.button("Cancel").clicked() {
                    cancel = true;
                }
            });
            ui.separator();

            match &signon.page {
                None => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading…");
                    });
                }
                Some(page) => {
                    ui.heading(&page.title);
                    ui.add_enabled_ui(!signon.submitted, |ui| {
                        egui::Grid::new("login_form").num_columns(2).show(ui, |ui| {
                            for field in page.editable_fields() {
                                let label = ui.label(field.caption());
                                let value = signon.values.entry(field.name.clone()).or_default();
                                let response = ui.add(
                                    egui::TextEdit::singleline(value)
                                        .password(field.kind == FieldKind::Password)
                                        .desired_width(160.0),
                                )
                                .labelled_by(label.id);
                                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                                    submit = true;
                                }
                                ui.end_row();
                            }
                        });

                        if ui.button(page.submit_label()).clicked() {
                            submit = true;
                        }
                    });
                    if signon.submitted {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Signing in…");
                        });
                    }
                }
            }
        }

        if cancel {
            self.cancel_signon();
        } else if submit {
            self.submit_login();
        }
    }
}
