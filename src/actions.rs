//! Reporting to the CI runner: workflow commands and step outputs.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::{ArchiveError, Result};

const OUTPUT_DELIMITER: &str = "ghadelimiter_archive_repo";

/// Escape a message so the runner prints it verbatim inside a workflow command.
pub fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Render a workflow command line such as `::error::message`.
pub fn command(name: &str, message: &str) -> String {
    format!("::{}::{}", name, escape_data(message))
}

/// Format one step output in the runner's file-command syntax.
pub fn format_output(name: &str, value: &str) -> Result<String> {
    if !value.contains('\n') && !value.contains('\r') {
        return Ok(format!("{}={}\n", name, value));
    }
    if name.contains(OUTPUT_DELIMITER) || value.contains(OUTPUT_DELIMITER) {
        return Err(ArchiveError::InvalidConfig(format!(
            "output {} contains the output delimiter",
            name
        )));
    }
    Ok(format!(
        "{}<<{}\n{}\n{}\n",
        name, OUTPUT_DELIMITER, value, OUTPUT_DELIMITER
    ))
}

/// Append step outputs to the runner's outputs file.
pub fn write_outputs<V: AsRef<str>>(path: &Path, outputs: &[(&str, V)]) -> Result<()> {
    let mut text = String::new();
    for (name, value) in outputs {
        text.push_str(&format_output(name, value.as_ref())?);
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_escape_data() {
        assert_eq!(escape_data("plain"), "plain");
        assert_eq!(escape_data("50% done\r\nnext"), "50%25 done%0D%0Anext");
    }

    #[test]
    fn test_command() {
        assert_eq!(
            command("error", "Failed to archive repo: Not Found\nsee docs"),
            "::error::Failed to archive repo: Not Found%0Asee docs"
        );
    }

    #[test]
    fn test_format_single_line_output() {
        assert_eq!(format_output("archived", "true").unwrap(), "archived=true\n");
    }

    #[test]
    fn test_format_multiline_output() {
        assert_eq!(
            format_output("notes", "a\nb").unwrap(),
            "notes<<ghadelimiter_archive_repo\na\nb\nghadelimiter_archive_repo\n"
        );
        assert!(format_output("notes", "x\nghadelimiter_archive_repo").is_err());
    }

    #[test]
    fn test_write_outputs_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output");
        fs::write(&path, "earlier=1\n").unwrap();

        write_outputs(&path, &[("archived", "false"), ("repository", "widgets")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "earlier=1\narchived=false\nrepository=widgets\n");
    }
}
