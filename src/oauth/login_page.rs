//! Extraction of the login form from a provider's HTML page.
//!
//! Providers used here serve simple, hand-written pages, so a few regular
//! expressions over the markup are enough: the page title, the first
//! `<form>` and the `<input>` elements inside it.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::error::{SignonError, SignonResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Password,
    Hidden,
    Submit,
}

impl FieldKind {
    fn from_type(input_type: &str) -> Self {
        match input_type.to_ascii_lowercase().as_str() {
            "password" => FieldKind::Password,
            "hidden" => FieldKind::Hidden,
            "submit" => FieldKind::Submit,
            _ => FieldKind::Text,
        }
    }

    /// Whether the user fills this field in
    pub fn is_editable(&self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub kind: FieldKind,
    /// Empty for unnamed submit buttons
    pub name: String,
    pub value: String,
}

impl FormField {
    /// Caption shown next to the field: `username` becomes `Username:`
    pub fn caption(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => format!("{}{}:", first.to_uppercase(), chars.as_str()),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPage {
    /// Where the page was loaded from
    pub url: String,
    pub title: String,
    /// Absolute URL the form submits to
    pub action: String,
    pub method: String,
    pub fields: Vec<FormField>,
}

fn title_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"))
}

fn form_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<form\b([^>]*)>(.*?)</form>").expect("valid regex"))
}

fn input_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<input\b([^>]*?)/?>").expect("valid regex"))
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)([a-z_:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).expect("valid regex")
    })
}

fn attributes(markup: &str) -> BTreeMap<String, String> {
    attribute_regex()
        .captures_iter(markup)
        .map(|caps| {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            (name, value)
        })
        .collect()
}

impl LoginPage {
    /// Parse `html` served from `url`. Fails when the page has no form.
    pub fn parse(html: &str, url: &str) -> SignonResult<Self> {
        let no_form = || SignonError::NoLoginForm { url: url.to_string() };

        let title = title_regex()
            .captures(html)
            .map(|caps| caps[1].trim().to_string())
            .unwrap_or_default();

        let form = form_regex().captures(html).ok_or_else(no_form)?;
        let form_attributes = attributes(&form[1]);

        let base = Url::parse(url).map_err(|_| no_form())?;
        let action = match form_attributes.get("action").filter(|a| !a.is_empty()) {
            Some(action) => base.join(action).map_err(|_| no_form())?.to_string(),
            None => base.to_string(),
        };
        let method = form_attributes
            .get("method")
            .map(|m| m.to_ascii_uppercase())
            .unwrap_or_else(|| "GET".to_string());

        let fields = input_regex()
            .captures_iter(&form[2])
            .map(|caps| {
                let attrs = attributes(&caps[1]);
                FormField {
                    kind: FieldKind::from_type(attrs.get("type").map(String::as_str).unwrap_or("text")),
                    name: attrs.get("name").cloned().unwrap_or_default(),
                    value: attrs.get("value").cloned().unwrap_or_default(),
                }
            })
            .collect();

        Ok(Self { url: url.to_string(), title, action, method, fields })
    }

    pub fn editable_fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|f| f.kind.is_editable() && !f.name.is_empty())
    }

    /// Label of the submit button, `Submit` when the page gives none
    pub fn submit_label(&self) -> &str {
        self.fields
            .iter()
            .find(|f| f.kind == FieldKind::Submit && !f.value.is_empty())
            .map(|f| f.value.as_str())
            .unwrap_or("Submit")
    }

    /// Name/value pairs to post: user input for editable fields, the page's
    /// own values for hidden ones. Unnamed inputs are not sent.
    pub fn submission(&self, values: &BTreeMap<String, String>) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter(|f| !f.name.is_empty())
            .filter_map(|f| match f.kind {
                FieldKind::Text | FieldKind::Password => {
                    let value = values.get(&f.name).cloned().unwrap_or_else(|| f.value.clone());
                    Some((f.name.clone(), value))
                }
                FieldKind::Hidden => Some((f.name.clone(), f.value.clone())),
                FieldKind::Submit => None,
            })
            .collect()
    }

    /// The login name the user typed, used as the account's display name
    pub fn username<'a>(&self, values: &'a BTreeMap<String, String>) -> Option<&'a str> {
        let field = self
            .editable_fields()
            .find(|f| f.name == "username")
            .or_else(|| self.editable_fields().find(|f| f.kind == FieldKind::Text))?;
        values.get(&field.name).map(String::as_str).filter(|v| !v.is_empty())
    }
}
