use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::process::ExitCode;

use dctx_lib::error::ErrorPayload;
use dctx_lib::{DctxError, ErrorOutput, OutputFormat};
use serde::Serialize;

/// Write `body` in the requested format to a file or stdout.
pub fn write_output<T: Serialize + ?Sized>(
    body: &T,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), DctxError> {
    let content = format.render(body)?;
    write_content(&content, output)?;
    Ok(())
}

/// Render an error and return the fatal exit code.
pub fn render_error(err: DctxError, format: OutputFormat, output: Option<&Path>) -> ExitCode {
    let payload = ErrorOutput::new(err.to_payload());

    if io::stderr().is_terminal() {
        eprint!("{}", format_error_hint(&payload.error, true));
    }

    let content = format
        .render(&payload)
        .unwrap_or_else(|_| "{\"error\":{\"category\":\"input\"}}".into());
    if let Err(write_err) = write_content(&content, output) {
        eprintln!("Failed to write error output: {}", write_err);
        println!("{content}");
    }

    ExitCode::from(2)
}

fn write_content(content: &str, output: Option<&Path>) -> io::Result<()> {
    match output {
        Some(path) => std::fs::write(path, content),
        None => {
            println!("{}", content.trim_end());
            Ok(())
        }
    }
}

/// Short human-readable error with its remediation hint.
pub fn format_error_hint(error: &ErrorPayload, colorize: bool) -> String {
    let mut buf = String::new();
    let header = color("[ERROR]", "31", colorize);
    writeln!(buf, "{} {}", header, error.message).ok();
    if let Some(remediation) = &error.remediation {
        writeln!(buf, "Hint: {}", remediation).ok();
    }
    buf
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}
