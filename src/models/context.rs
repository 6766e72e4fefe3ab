use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An isolated execution context of the extension. Contexts never share
/// memory, only the storage area and the cookie store.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensionContext {
    #[default]
    Background,
    ContentScript,
    Popup,
    Page,
}

impl ExtensionContext {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtensionContext::Background => "background",
            ExtensionContext::ContentScript => "content-script",
            ExtensionContext::Popup => "popup",
            ExtensionContext::Page => "page",
        }
    }

    /// Only the background context outlives UI surfaces, so only it polls.
    pub fn can_poll(self) -> bool {
        matches!(self, ExtensionContext::Background)
    }
}

impl fmt::Display for ExtensionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
