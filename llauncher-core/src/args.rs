//! Rendering of configuration records into argument vectors.

use crate::error::{LauncherError, Result};
use crate::models::{ConfigRecord, FieldValue};

/// Build the argument vector for a configuration record.
///
/// Options are emitted in the record's declaration order. An option holding
/// its zero value is left out, so an explicit `0`, `""` or `false` cannot be
/// passed through.
pub fn build_args<R: ConfigRecord + ?Sized>(record: &R) -> Result<Vec<String>> {
    let fields = record.fields();
    let values = record.values();

    if fields.len() != values.len() {
        return Err(LauncherError::ConfigFieldError(format!(
            "record has {} values for {} declared fields",
            values.len(),
            fields.len()
        )));
    }

    let mut args = Vec::new();

    for (field, value) in fields.iter().zip(values) {
        if value.kind() != field.kind {
            return Err(LauncherError::ConfigFieldError(format!(
                "unsupported value kind {} for field {} (declared {})",
                value.kind(),
                field.name,
                field.kind
            )));
        }

        if value.is_zero() {
            continue;
        }

        match value {
            FieldValue::Flag(_) => args.push(field.flag.to_string()),
            FieldValue::Text(s) => {
                args.push(field.flag.to_string());
                args.push(s.to_string());
            }
            FieldValue::Integer(n) => {
                args.push(field.flag.to_string());
                args.push(n.to_string());
            }
            FieldValue::Float(x) => {
                args.push(field.flag.to_string());
                args.push(x.to_string());
            }
            FieldValue::TextList(items) => {
                for item in items {
                    args.push(field.flag.to_string());
                    args.push(item.clone());
                }
            }
        }
    }

    Ok(args)
}

/// Format an argument vector for log output, one option per line.
///
/// Values containing whitespace are double-quoted. The result is meant for
/// humans and is not shell-safe.
pub fn format_args_for_display(args: &[String]) -> String {
    let mut lines: Vec<String> = Vec::new();

    for arg in args {
        let token = if arg.chars().any(char::is_whitespace) {
            format!("\"{}\"", arg)
        } else {
            arg.clone()
        };

        if arg.starts_with("--") || lines.is_empty() {
            lines.push(token);
        } else if let Some(line) = lines.last_mut() {
            line.push(' ');
            line.push_str(&token);
        }
    }

    lines.join(" \\\n    ")
}
