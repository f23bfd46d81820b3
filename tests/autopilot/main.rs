//! Autopilot scenarios: the Online Accounts panel driven through its
//! accessibility tree while the mock login server plays the provider.

#[path = "../common/mod.rs"]
mod common;

mod driver;
mod test_control_center;
