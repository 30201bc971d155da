//! Shared output formatting for acts CLI commands.

use std::io::IsTerminal;

use crossterm::style::{style, Attribute, Stylize};
use serde::Serialize;

use crate::activity::LiveActivity;
use crate::error::{Error, JsonError, Result};

pub const SCHEMA_VERSION: &str = "acts.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let warnings = human.map(|h| h.warnings.clone()).unwrap_or_default();
        let next_steps = human.map(|h| h.next_steps.clone()).unwrap_or_default();

        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            warnings: Vec<String>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings,
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    let hint = next_steps.first().map(|step| step.as_str());
    if json {
        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: JsonError,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: JsonError::from(err),
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());

    push_summary(&mut lines, &output.summary);
    push_section(&mut lines, "Details", &output.details);
    push_section(&mut lines, "Warnings", &output.warnings);
    push_section(&mut lines, "Next steps", &output.next_steps);

    lines.join("\n")
}

/// Whether short ids should be highlighted on stdout.
pub fn use_color(configured: bool) -> bool {
    configured && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// One listing line: `[abc]* 2030-01-01 10:00 body`, id bold when `color`.
pub fn format_activity(item: &LiveActivity, color: bool) -> String {
    if !color {
        return item.to_string();
    }
    let star = if item.activity.has_recurrence() { "*" } else { "" };
    format!(
        "[{}]{} {} {}",
        style(item.short_id()).attribute(Attribute::Bold),
        star,
        item.activity.time_string(),
        item.activity.body
    )
}

/// Warning text for a log line skipped during replay.
pub fn skipped_warning(line: usize, reason: &str) -> String {
    format!("skipped log line {line}: {reason}")
}

pub fn infer_command_name_from_args() -> String {
    let mut args = std::env::args().skip(1);
    let mut command = None;

    while let Some(arg) = args.next() {
        if arg.starts_with('-') {
            // Global flags that take a value
            if matches!(arg.as_str(), "--log-file" | "--config") {
                args.next();
            }
            continue;
        }
        command = Some(arg);
        break;
    }

    let command = match command {
        Some(cmd) => cmd,
        None => return "acts".to_string(),
    };

    if command == "config" {
        if let Some(sub) = args.find(|arg| !arg.starts_with('-')) {
            return format!("{command} {sub}");
        }
    }

    command
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::MalformedTimestamp(_) => vec!["You probably meant to say 'new now'".to_string()],
        Error::AmbiguousIdentifier { .. } => {
            vec!["Nothing has been changed. Retry with a longer id prefix.".to_string()]
        }
        Error::NoSuchActivity(_) => vec!["acts grep <pattern>".to_string()],
        Error::UnknownUnit(_) => {
            vec!["use one of: minute, hour, day, week, month".to_string()]
        }
        Error::InvalidConfig(_) | Error::TomlParse(_) => {
            vec!["fix the config file then retry".to_string()]
        }
        _ => Vec::new(),
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("- {key}"));
        } else {
            lines.push(format!("- {key}: {value}"));
        }
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}
