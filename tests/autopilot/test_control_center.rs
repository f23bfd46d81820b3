use std::time::Duration;

use egui::Key;

use credentials_panel::accounts::{AccountManager, Provider};
use credentials_panel::{CredentialsPanel, ServerHandle, StartupAction, View, PANEL_TITLE};

use crate::common::{panel_config, start_server};
use crate::driver::{UiDriver, WidgetKind};

const LOGIN_WAIT: Duration = Duration::from_secs(30);

fn open_panel(server: &ServerHandle) -> UiDriver<'static> {
    open_panel_with(server, AccountManager::in_memory(), StartupAction::Default)
}

fn open_panel_with(server: &ServerHandle, accounts: AccountManager, startup: StartupAction) -> UiDriver<'static> {
    UiDriver::new(CredentialsPanel::new(panel_config(server), accounts, startup))
}

/// Open the provider list filtered to test providers.
fn show_test_providers(driver: &mut UiDriver<'_>) {
    driver.click(WidgetKind::Button, "Add account…").unwrap();
    driver.click(WidgetKind::Button, "all").unwrap();
    driver.wait_select_single(WidgetKind::Button, "IntegrationTests").unwrap();
    driver.click(WidgetKind::Button, "IntegrationTests").unwrap();
}

#[test]
fn test_title() {
    let server = start_server();
    let driver = open_panel(&server);
    assert_eq!(driver.panel().title(), PANEL_TITLE);
    assert!(driver.select_single(WidgetKind::Label, "Online Accounts").is_ok());
}

#[test]
fn test_available_providers() {
    let server = start_server();
    let mut driver = open_panel(&server);

    show_test_providers(&mut driver);

    assert!(driver.wait_select_single(WidgetKind::Button, "FakeOAuth").is_ok());
}

#[test]
fn test_create_oauth2_account() {
    let server = start_server();
    let mut driver = open_panel(&server);

    show_test_providers(&mut driver);
    server.show_login_event().clear();
    server.login_done_event().clear();

    driver.wait_select_single(WidgetKind::Button, "FakeOAuth").unwrap();
    driver.click(WidgetKind::Button, "FakeOAuth").unwrap();
    assert!(server.show_login_event().wait(LOGIN_WAIT), "login page was never requested");

    driver.wait_select_single(WidgetKind::TextField, "Username:").unwrap();
    driver.fill("Username:", "john").unwrap();
    driver.fill("Password:", "loser").unwrap();
    driver.click(WidgetKind::Button, "Login").unwrap();
    assert!(server.login_done_event().wait(LOGIN_WAIT), "credentials were never posted");

    driver.wait_select_single(WidgetKind::Button, "FakeOAuth\njohn").unwrap();
    assert_eq!(driver.panel().accounts.len(), 1);

    driver.click(WidgetKind::Button, "FakeOAuth\njohn").unwrap();
    driver.click(WidgetKind::Button, "Remove Account").unwrap();
    driver.press_and_release(Key::Enter);

    driver.wait_until_gone(WidgetKind::Button, "FakeOAuth\njohn").unwrap();
    assert!(driver.panel().accounts.is_empty());
}

#[test]
fn test_masked_password_field_is_a_text_field() {
    let server = start_server();
    let mut driver = open_panel(&server);

    show_test_providers(&mut driver);
    driver.wait_select_single(WidgetKind::Button, "FakeOAuth").unwrap();
    driver.click(WidgetKind::Button, "FakeOAuth").unwrap();
    assert!(server.show_login_event().wait(LOGIN_WAIT), "login page was never requested");

    driver.wait_select_single(WidgetKind::TextField, "Username:").unwrap();
    assert!(driver.select_single(WidgetKind::TextField, "Password:").is_ok());
    assert!(driver.select_single(WidgetKind::Button, "Password:").is_err());
    driver.fill("Password:", "loser").unwrap();
}

#[test]
fn test_cancel_authorization() {
    let server = start_server();
    let mut driver = open_panel(&server);
    let infobar = "Please authorize Ubuntu to access your FakeOAuth account";

    show_test_providers(&mut driver);
    driver.wait_select_single(WidgetKind::Button, "FakeOAuth").unwrap();
    driver.click(WidgetKind::Button, "FakeOAuth").unwrap();
    driver.wait_select_single(WidgetKind::Label, infobar).unwrap();

    driver.click(WidgetKind::Button, "Cancel").unwrap();
    driver.wait_until_gone(WidgetKind::Label, infobar).unwrap();
    assert_eq!(driver.panel().view, View::AddAccount);
    assert!(driver.panel().signon.is_none());
    assert!(driver.panel().accounts.is_empty());
}

#[test]
fn test_remove_dialog_can_be_cancelled() {
    let server = start_server();
    let mut accounts = AccountManager::in_memory();
    let id = accounts.create(&Provider::fake_oauth(server.port()), "john").unwrap();
    let mut driver = open_panel_with(&server, accounts, StartupAction::AccountDetails(id));

    driver.click(WidgetKind::Button, "Remove Account").unwrap();
    driver.wait_select_single(WidgetKind::Label, "Are you sure that you wish to remove this FakeOAuth account?").unwrap();
    driver.click(WidgetKind::Button, "Cancel").unwrap();

    assert!(driver.select_single(WidgetKind::Button, "FakeOAuth\njohn").is_ok());
    assert_eq!(driver.panel().accounts.len(), 1);
    assert_eq!(driver.panel().confirm_remove, None);
}
