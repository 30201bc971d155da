//! acts config subcommand implementations.

use serde::Serialize;

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};

use super::activity::{load_context, GlobalOptions};

#[derive(Serialize)]
struct ShowOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_path: Option<String>,
    config_exists: bool,
    log_file: String,
    timezone: String,
    pattern_wrap: String,
    color: bool,
}

pub fn run_show(global: GlobalOptions) -> Result<()> {
    let ctx = load_context(&global)?;
    let config_exists = ctx
        .config_path
        .as_deref()
        .map(|path| path.exists())
        .unwrap_or(false);

    let output = ShowOutput {
        config_path: ctx
            .config_path
            .as_ref()
            .map(|path| path.display().to_string()),
        config_exists,
        log_file: ctx.store.path().display().to_string(),
        timezone: ctx.store.timezone().to_string(),
        pattern_wrap: ctx.config.grep.pattern_wrap.clone(),
        color: ctx.config.output.color,
    };

    let mut human = HumanOutput::new("Configuration");
    match &output.config_path {
        Some(path) if config_exists => human.push_summary("Config file", path.clone()),
        Some(path) => human.push_summary("Config file", format!("{path} (not present, defaults)")),
        None => human.push_summary("Config file", "none (defaults)"),
    }
    human.push_summary("Log file", output.log_file.clone());
    human.push_summary("Timezone", output.timezone.clone());
    human.push_summary("Grep prefix", format!("{:?}", output.pattern_wrap));
    human.push_summary("Color", output.color.to_string());

    emit_success(global.output(), "config show", &output, Some(&human))
}

pub fn run_init(global: GlobalOptions, force: bool) -> Result<()> {
    let path = config::resolve_config_path(global.config.as_deref()).ok_or_else(|| {
        Error::InvalidArgument("no config location available; pass --config".to_string())
    })?;
    if path.exists() && !force {
        return Err(Error::InvalidArgument(format!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    Config::default().save(&path)?;

    #[derive(Serialize)]
    struct InitOutput {
        config_path: String,
    }

    let mut human = HumanOutput::new("Config written");
    human.push_summary("Path", path.display().to_string());
    emit_success(
        global.output(),
        "config init",
        &InitOutput {
            config_path: path.display().to_string(),
        },
        Some(&human),
    )
}
