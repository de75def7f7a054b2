use super::schema::{Access, FieldSpec};
use super::{OperationDescriptor, OperationKind};
use std::fmt::Write;

/// Formats operation descriptors into human-readable text.
pub struct OperationFormatter;

impl OperationFormatter {
    /// One line per operation: name and the first sentence of its description.
    pub fn format_catalog(descriptors: &[OperationDescriptor]) -> String {
        let width = descriptors.iter().map(|d| d.name.len()).max().unwrap_or(0);
        let mut out = String::new();
        for descriptor in descriptors {
            let summary = descriptor
                .description
                .split_once(". ")
                .map(|(first, _)| first)
                .unwrap_or(&descriptor.description)
                .trim_end_matches('.');
            let _ = writeln!(out, "{:<width$}  {summary}", descriptor.name);
        }
        out
    }

    /// Full description of one operation, including every input field.
    pub fn format_descriptor(descriptor: &OperationDescriptor) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} ({} {})",
            descriptor.name,
            Self::kind_label(descriptor.kind),
            descriptor.resource
        );
        let _ = writeln!(out, "  {}", descriptor.description);
        let _ = writeln!(out);

        let fields: Vec<&FieldSpec> = descriptor
            .schema
            .fields
            .iter()
            .filter(|f| match descriptor.kind {
                OperationKind::Create => f.access != Access::Generated,
                OperationKind::Update => f.access == Access::Writable,
            })
            .collect();

        match descriptor.kind {
            OperationKind::Create => {
                let _ = writeln!(out, "  Input:");
            }
            OperationKind::Update => {
                let _ = writeln!(out, "  Input: {{id, updates, options?: {{replaceObjectFields?}}}}");
                let _ = writeln!(out, "  Updatable fields:");
            }
        }
        let width = fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
        for field in fields {
            let _ = writeln!(
                out,
                "    {:<width$}  {}{}",
                field.name,
                Self::format_field(field, descriptor.kind),
                if field.description.is_empty() {
                    String::new()
                } else {
                    format!(" - {}", field.description)
                }
            );
        }
        let _ = writeln!(out);
        let _ = write!(out, "  Output: {}", descriptor.output);
        out
    }

    fn format_field(field: &FieldSpec, kind: OperationKind) -> String {
        let mut flags = Vec::new();
        if field.required && kind == OperationKind::Create {
            flags.push("required");
        }
        if field.access == Access::CreateOnly {
            flags.push("create-only");
        }
        if field.non_empty {
            flags.push("non-empty");
        }
        if flags.is_empty() {
            field.kind.describe()
        } else {
            format!("{} ({})", field.kind.describe(), flags.join(", "))
        }
    }

    fn kind_label(kind: OperationKind) -> &'static str {
        match kind {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
        }
    }
}
