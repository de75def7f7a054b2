use crate::codec::check_keys;
use crate::error::ValidationError;
use crate::model::{FieldOptions, FormField, FormFieldType, Resource};
use serde_json::Value;

/// Checks that a field's `options` only use keys permitted for its `type` and hold sane values.
pub fn validate_field_options(field: &FormField) -> Result<(), ValidationError> {
    let invalid = |message: String| ValidationError::InvalidOptions {
        field: field.label(),
        field_type: field.field_type.tag().to_string(),
        message,
    };

    let set = match serde_json::to_value(&field.options) {
        Ok(Value::Object(map)) => map,
        Ok(_) => serde_json::Map::new(),
        Err(e) => return Err(invalid(e.to_string())),
    };
    check_keys(field.field_type.option_keys(), &set).map_err(&invalid)?;

    check_values(field.field_type, &field.options).map_err(invalid)
}

fn check_values(field_type: FormFieldType, options: &FieldOptions) -> Result<(), String> {
    if let Some(choices) = &options.choices {
        if choices.is_empty() {
            return Err("'choices' must not be empty".to_string());
        }
        if let Some(blank) = choices.iter().position(|c| c.trim().is_empty()) {
            return Err(format!("choice {blank} is blank"));
        }
    }

    if field_type == FormFieldType::Rating
        && let (Some(from), Some(to)) = (options.from, options.to)
        && from >= to
    {
        return Err(format!("rating range must satisfy from < to, found {from}..{to}"));
    }

    if let (Some(min), Some(max)) = (options.min_length, options.max_length)
        && min > max
    {
        return Err(format!("minLength {min} exceeds maxLength {max}"));
    }

    if let Some(sub_fields) = &options.sub_fields
        && sub_fields.is_empty()
    {
        return Err("'subFields' must list at least one field".to_string());
    }

    if let Some(url) = &options.redirect_url
        && !(url.starts_with("https://") || url.starts_with("http://"))
    {
        return Err(format!("'redirectUrl' must be an http(s) URL, found '{url}'"));
    }

    Ok(())
}
