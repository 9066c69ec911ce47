//! Shared helpers for command handlers.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal the prompt cannot be answered, so `--yes` becomes
/// mandatory.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` / `--schedule-file` flags.
pub fn read_json_file<T: DeserializeOwned>(path: &Path, field: &str) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("invalid JSON in {}: {e}", path.display()),
    })
}

/// Comma-joined list, or `-` when empty.
pub fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".into()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use guardly_core::model::Schedule;

    use super::*;

    #[test]
    fn schedule_file_parses() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"time_zone": "Europe/Berlin", "sat": {{"start": 0, "end": 86400000}}}}"#)
            .expect("write");

        let schedule: Schedule = read_json_file(file.path(), "schedule-file").expect("parses");
        assert_eq!(schedule.time_zone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(schedule.sat.expect("saturday").end, 86_400_000);
    }

    #[test]
    fn bad_json_is_a_validation_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write");

        let err = read_json_file::<Schedule>(file.path(), "schedule-file").expect_err("rejects");
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "schedule-file"));
    }

    #[test]
    fn yes_flag_skips_prompt() {
        assert!(confirm("Reset?", "stats reset", true).expect("confirmed"));
    }
}
