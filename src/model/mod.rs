//! Typed configuration resources.

pub mod condition;
pub mod form;
pub mod journey;
pub mod template;
pub mod trigger;
pub mod update;

pub use condition::*;
pub use form::*;
pub use journey::*;
pub use template::*;
pub use trigger::*;
pub use update::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every resource type the registry knows how to create and update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Form,
    FormField,
    MessageTemplate,
    CalendarEventTemplate,
    Journey,
    AutomationStep,
    AutomationTrigger,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Form,
        ResourceKind::FormField,
        ResourceKind::MessageTemplate,
        ResourceKind::CalendarEventTemplate,
        ResourceKind::Journey,
        ResourceKind::AutomationStep,
        ResourceKind::AutomationTrigger,
    ];

    /// PascalCase name used in operation names and messages.
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Form => "Form",
            ResourceKind::FormField => "FormField",
            ResourceKind::MessageTemplate => "MessageTemplate",
            ResourceKind::CalendarEventTemplate => "CalendarEventTemplate",
            ResourceKind::Journey => "Journey",
            ResourceKind::AutomationStep => "AutomationStep",
            ResourceKind::AutomationTrigger => "AutomationTrigger",
        }
    }

    /// Prefix used by the in-memory platform when it assigns ids.
    pub fn id_prefix(self) -> &'static str {
        match self {
            ResourceKind::Form => "form",
            ResourceKind::FormField => "field",
            ResourceKind::MessageTemplate => "tmpl",
            ResourceKind::CalendarEventTemplate => "cal",
            ResourceKind::Journey => "journey",
            ResourceKind::AutomationStep => "step",
            ResourceKind::AutomationTrigger => "trigger",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Common accessors shared by every resource struct.
pub trait Resource {
    const KIND: ResourceKind;

    fn id(&self) -> Option<&str>;

    fn archived_at(&self) -> Option<&str>;

    /// A resource is archived when `archivedAt` holds anything but the clear sentinel.
    fn is_archived(&self) -> bool {
        self.archived_at()
            .is_some_and(|at| at != ARCHIVE_CLEAR_SENTINEL)
    }

    /// Id if present, otherwise a readable placeholder for messages.
    fn label(&self) -> String {
        self.id()
            .map(str::to_string)
            .unwrap_or_else(|| format!("<new {}>", Self::KIND))
    }
}

macro_rules! impl_resource {
    ($ty:ty, $kind:expr) => {
        impl Resource for $ty {
            const KIND: ResourceKind = $kind;

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn archived_at(&self) -> Option<&str> {
                self.archived_at.as_deref()
            }
        }
    };
}

impl_resource!(Form, ResourceKind::Form);
impl_resource!(FormField, ResourceKind::FormField);
impl_resource!(MessageTemplate, ResourceKind::MessageTemplate);
impl_resource!(CalendarEventTemplate, ResourceKind::CalendarEventTemplate);
impl_resource!(Journey, ResourceKind::Journey);
impl_resource!(AutomationStep, ResourceKind::AutomationStep);
impl_resource!(AutomationTrigger, ResourceKind::AutomationTrigger);
