//! Accessibility-driven UI driver
//!
//! Finds widgets in the panel's AccessKit tree by kind and accessible name
//! and feeds pointer and keyboard input through the egui_kittest harness.
//! Every action is followed by a few frames so the panel can react.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use egui::accesskit::Role;
use egui_kittest::kittest::Queryable as _;
use egui_kittest::{Harness, Node};

use credentials_panel::CredentialsPanel;

/// Default time allowed for a widget to show up
pub const DEFAULT_WAIT: Duration = Duration::from_secs(10);

const SETTLE_FRAMES: usize = 4;
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Kind of widget to look for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Button,
    TextField,
    Label,
    Window,
    /// Any widget with the given name
    Any,
}

impl WidgetKind {
    /// AccessKit roles this kind covers; empty matches every role.
    fn roles(&self) -> &'static [Role] {
        match self {
            WidgetKind::Button => &[Role::Button],
            // Masked inputs are exposed as PasswordInput.
            WidgetKind::TextField => &[Role::TextInput, Role::PasswordInput],
            WidgetKind::Label => &[Role::Label],
            WidgetKind::Window => &[Role::Window],
            WidgetKind::Any => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    NotFound { kind: WidgetKind, name: String },
    Ambiguous { kind: WidgetKind, name: String, count: usize },
    StillPresent { kind: WidgetKind, name: String },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::NotFound { kind, name } => write!(f, "no {kind:?} named {name:?}"),
            DriverError::Ambiguous { kind, name, count } => {
                write!(f, "{count} widgets of kind {kind:?} named {name:?}")
            }
            DriverError::StillPresent { kind, name } => write!(f, "{kind:?} named {name:?} did not go away"),
        }
    }
}

impl std::error::Error for DriverError {}

/// Drives a [`CredentialsPanel`] running inside an egui_kittest harness
pub struct UiDriver<'a> {
    harness: Harness<'a, CredentialsPanel>,
}

impl<'a> UiDriver<'a> {
    pub fn new(panel: CredentialsPanel) -> Self {
        let mut harness = Harness::new_eframe(|_| panel);
        harness.step();
        Self { harness }
    }

    pub fn panel(&self) -> &CredentialsPanel {
        self.harness.state()
    }

    /// All widgets of `kind` whose accessible name is exactly `name`
    pub fn select_many<'s>(&'s self, kind: WidgetKind, name: &'s str) -> Vec<Node<'s>> {
        let roles = kind.roles();
        if roles.is_empty() {
            return self.harness.query_all_by_label(name).collect();
        }
        roles
            .iter()
            .flat_map(|role| self.harness.query_all_by_role_and_label(*role, name))
            .collect()
    }

    /// The one widget of `kind` named `name`
    pub fn select_single<'s>(&'s self, kind: WidgetKind, name: &'s str) -> Result<Node<'s>, DriverError> {
        let mut nodes = self.select_many(kind, name);
        match nodes.len() {
            0 => Err(DriverError::NotFound { kind, name: name.to_string() }),
            1 => Ok(nodes.remove(0)),
            count => Err(DriverError::Ambiguous { kind, name: name.to_string(), count }),
        }
    }

    /// Keep rendering frames until exactly one matching widget exists,
    /// giving up after [`DEFAULT_WAIT`].
    pub fn wait_select_single<'s>(&'s mut self, kind: WidgetKind, name: &'s str) -> Result<Node<'s>, DriverError> {
        self.wait_select_single_for(kind, name, DEFAULT_WAIT)
    }

    pub fn wait_select_single_for<'s>(
        &'s mut self,
        kind: WidgetKind,
        name: &'s str,
        timeout: Duration,
    ) -> Result<Node<'s>, DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            self.harness.step();
            let count = self.select_many(kind, name).len();
            if count > 1 {
                return Err(DriverError::Ambiguous { kind, name: name.to_string(), count });
            }
            if count == 1 {
                break;
            }
            if Instant::now() >= deadline {
                return Err(DriverError::NotFound { kind, name: name.to_string() });
            }
            thread::sleep(POLL_INTERVAL);
        }
        self.select_single(kind, name)
    }

    /// Keep rendering frames until no matching widget is left.
    pub fn wait_until_gone(&mut self, kind: WidgetKind, name: &str) -> Result<(), DriverError> {
        self.wait_until_gone_for(kind, name, DEFAULT_WAIT)
    }

    pub fn wait_until_gone_for(&mut self, kind: WidgetKind, name: &str, timeout: Duration) -> Result<(), DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            self.harness.step();
            if self.select_many(kind, name).is_empty() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::StillPresent { kind, name: name.to_string() });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Move the pointer onto the widget and click it.
    pub fn click(&mut self, kind: WidgetKind, name: &str) -> Result<(), DriverError> {
        self.select_single(kind, name)?.click();
        self.settle();
        Ok(())
    }

    /// Press and release `key` on whatever has keyboard focus.
    pub fn press_and_release(&mut self, key: egui::Key) {
        for pressed in [true, false] {
            self.harness.input_mut().events.push(egui::Event::Key {
                key,
                physical_key: None,
                pressed,
                repeat: false,
                modifiers: egui::Modifiers::NONE,
            });
        }
        self.settle();
    }

    /// Type into whatever has keyboard focus.
    pub fn type_text(&mut self, text: &str) {
        self.harness.input_mut().events.push(egui::Event::Text(text.to_string()));
        self.settle();
    }

    /// Focus a text field by clicking it, then type into it.
    pub fn fill(&mut self, name: &str, text: &str) -> Result<(), DriverError> {
        self.click(WidgetKind::TextField, name)?;
        self.type_text(text);
        Ok(())
    }

    pub fn settle(&mut self) {
        for _ in 0..SETTLE_FRAMES {
            self.harness.step();
        }
    }
}
