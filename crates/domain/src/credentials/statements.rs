//! SQL statement templates attached to a role
//!
//! Templates use `{{name}}` and `{{expiration}}` placeholders. Rendering is
//! plain substitution: the database plugin decides how the rendered text is
//! split and executed.

use serde::{Deserialize, Serialize};

/// Placeholder for the database account name
pub const NAME_PLACEHOLDER: &str = "name";
/// Placeholder for the absolute validity deadline
pub const EXPIRATION_PLACEHOLDER: &str = "expiration";

/// Renew and revoke templates of a role
///
/// An empty template means "use the database plugin's default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statements {
    #[serde(default)]
    pub renew: String,
    #[serde(default)]
    pub revoke: String,
}

impl Statements {
    pub fn new(renew: impl Into<String>, revoke: impl Into<String>) -> Self {
        Self {
            renew: renew.into(),
            revoke: revoke.into(),
        }
    }

    pub fn has_renew(&self) -> bool {
        !self.renew.trim().is_empty()
    }

    pub fn has_revoke(&self) -> bool {
        !self.revoke.trim().is_empty()
    }
}

/// Substitutes every `{{key}}` in `template` with its value
///
/// Unknown placeholders are left untouched.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |rendered, (key, value)| {
            rendered.replace(&format!("{{{{{}}}}}", key), value)
        })
}

/// Splits a rendered template on `;`, dropping blank fragments
pub fn split_statements(rendered: &str) -> impl Iterator<Item = &str> {
    rendered
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
}
