//! # Kousei - Configuration Model and Pre-dispatch Validation
//!
//! **Kousei** models the configuration resources of a patient-engagement platform (forms,
//! form fields, message and calendar templates, journeys, automation steps and triggers) and
//! validates every create and update locally before it is sent to the platform.
//!
//! ## Core Workflow
//!
//! 1.  **Pick the platform**: implement [`RemotePlatform`](platform::RemotePlatform) for your
//!     transport, or use the [`InMemoryPlatform`](platform::InMemoryPlatform) for dry runs.
//! 2.  **Open a workspace**: [`Workspace::builder`](workspace::Workspace::builder) takes the
//!     platform and an optional [`ValidatorConfig`](config::ValidatorConfig).
//! 3.  **Invoke operations**: every resource has a `create<Resource>` and an
//!     `update<Resource>` operation taking raw JSON. Inputs are checked against the field
//!     catalog, decoded into typed resources and validated against what the workspace has
//!     already created, so a form's fields and a journey's steps are built strictly in order.
//! 4.  **Finish**: `complete_form` and `complete_journey` run the whole-set checks (single
//!     root field, at least one entry step, no cycles).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kousei::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let mut workspace = Workspace::new(InMemoryPlatform::new());
//!
//!     let form = workspace.invoke("createForm", &json!({ "title": "Intake" }))?;
//!     let form_id = form["id"].as_str().unwrap_or_default().to_string();
//!
//!     let first = workspace.invoke(
//!         "createFormField",
//!         &json!({
//!             "formId": form_id,
//!             "title": "Name",
//!             "type": "string",
//!             "previousFields": [{ "type": "root", "info": {} }]
//!         }),
//!     )?;
//!     workspace.invoke(
//!         "createFormField",
//!         &json!({
//!             "formId": form_id,
//!             "title": "Email",
//!             "type": "email",
//!             "previousFields": [{ "type": "after", "info": { "fieldId": first["id"] } }]
//!         }),
//!     )?;
//!
//!     let graph = workspace.complete_form(&form_id)?;
//!     println!("Display order: {:?}", graph.display_order());
//!
//!     // Objects merge and arrays append unless replaceObjectFields is set.
//!     workspace.invoke(
//!         "updateForm",
//!         &json!({ "id": form_id, "updates": { "tags": ["onboarding"] } }),
//!     )?;
//!     Ok(())
//! }
//! ```

pub mod bundle;
pub mod codec;
pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod platform;
pub mod prelude;
pub mod registry;
pub mod validator;
pub mod workspace;
