//! User-facing error messages for the error modal.
//!
//! Uses typed error matching (PolarsError variants, io::ErrorKind) rather than
//! string parsing. Spreadsheet errors arrive as plain eyre messages and use the fallback.

use polars::prelude::PolarsError;
use std::io;

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::ColumnNotFound(msg) => format!("Column not found: {}", msg),
        PE::Duplicate(msg) => format!("Duplicate column: {}", msg),
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::SchemaMismatch(msg) => format!("Schema mismatch: {}", msg),
        PE::ShapeMismatch(msg) => format!("Rows have different lengths: {}", msg),
        PE::InvalidOperation(msg) => format!("Operation not allowed: {}", msg),
        PE::OutOfBounds(msg) => format!("Out of bounds: {}", msg),
        PE::ComputeError(msg) => first_line(msg),
        PE::Context { error, msg } => {
            let inner = user_message_from_polars(error);
            format!("{}: {}", msg, inner)
        }
        #[allow(unreachable_patterns)]
        _ => err.to_string(),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::OutOfMemory => "Out of memory.".to_string(),
        ErrorKind::Other => {
            let msg = err.to_string();
            if msg.contains("Is a directory") {
                return "Path is a directory, not a file.".to_string();
            }
            return match context {
                Some(_) => format!("I/O error: {}", msg),
                None => msg,
            };
        }
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Format a color_eyre Report by downcasting to known error types.
/// Walks the cause chain to find PolarsError or io::Error.
pub fn user_message_from_report(report: &color_eyre::eyre::Report, file_name: Option<&str>) -> String {
    let msg = report
        .chain()
        .find_map(|cause| {
            if let Some(pe) = cause.downcast_ref::<PolarsError>() {
                return Some(user_message_from_polars(pe));
            }
            cause
                .downcast_ref::<io::Error>()
                .map(|io_err| user_message_from_io(io_err, None))
        })
        // Fallback: first line of the display to avoid long tracebacks
        .unwrap_or_else(|| first_line(&report.to_string()));

    match file_name {
        Some(name) => format!("Failed to load {}: {}", name, msg),
        None => msg,
    }
}

fn first_line(msg: &str) -> String {
    msg.lines()
        .next()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("An error occurred")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::eyre;

    #[test]
    fn test_user_message_from_io_not_found() {
        let err = io::Error::new(io::ErrorKind::NotFound, "No such file");
        let msg = user_message_from_io(&err, None);
        assert!(msg.contains("not found"), "expected 'not found', got: {}", msg);
    }

    #[test]
    fn test_user_message_from_polars_no_data() {
        let err = PolarsError::NoData("empty CSV".into());
        let msg = user_message_from_polars(&err);
        assert_eq!(msg, "No data: empty CSV");
    }

    #[test]
    fn test_report_walks_chain_to_io_error() {
        let report = color_eyre::eyre::Report::new(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let msg = user_message_from_report(&report, Some("store.csv"));
        assert_eq!(
            msg,
            "Failed to load store.csv: Permission denied. Check read access."
        );
    }

    #[test]
    fn test_report_fallback_uses_first_line() {
        let report = eyre!("Excel: invalid zip header\nmore detail");
        assert_eq!(
            user_message_from_report(&report, None),
            "Excel: invalid zip header"
        );
    }
}
