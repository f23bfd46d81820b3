//! UI components of the Online Accounts panel

pub mod account_list;
pub mod dialogs;
pub mod login;
pub mod providers;
