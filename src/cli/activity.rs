//! acts activity command implementations.

use std::path::PathBuf;

use serde::Serialize;

use crate::activity::LiveActivity;
use crate::config::{self, Config};
use crate::entry;
use crate::error::Result;
use crate::ops;
use crate::output::{
    emit_success, format_activity, skipped_warning, use_color, HumanOutput, OutputOptions,
};
use crate::store::{LogStore, SkippedLine};

/// Flags shared by every subcommand.
pub struct GlobalOptions {
    pub log_file: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    pub(super) fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

pub(super) struct Context {
    pub store: LogStore,
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

pub(super) fn load_context(global: &GlobalOptions) -> Result<Context> {
    let config_path = config::resolve_config_path(global.config.as_deref());
    let config = Config::load_or_default(config_path.as_deref())?;
    let tz = config.timezone()?;
    let log_path = config::resolve_log_path(global.log_file.as_deref(), &config);
    tracing::debug!(log = %log_path.display(), timezone = %tz, "loaded context");

    Ok(Context {
        store: LogStore::new(log_path, tz),
        config,
        config_path,
    })
}

#[derive(Serialize)]
struct ActivityView {
    id: String,
    short_id: String,
    timestamp: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    recurrence_tag: String,
    body: String,
}

impl From<&LiveActivity> for ActivityView {
    fn from(item: &LiveActivity) -> Self {
        Self {
            id: item.id.clone(),
            short_id: item.short_id().to_string(),
            timestamp: item.activity.time_string(),
            recurrence_tag: item.activity.recurrence_tag.clone(),
            body: item.activity.body.clone(),
        }
    }
}

#[derive(Serialize)]
struct ListOutput {
    activities: Vec<ActivityView>,
    total: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<SkippedLine>,
}

#[derive(Serialize)]
struct DelayOutput {
    previous: ActivityView,
    current: ActivityView,
}

pub fn run_new(global: GlobalOptions, words: Vec<String>) -> Result<()> {
    let ctx = load_context(&global)?;
    let activity = entry::parse_words(&words, &ctx.store.now())?;
    let id = ops::add(&ctx.store, &activity)?;
    let item = LiveActivity::new(id, activity);

    if global.json {
        return emit_success(global.output(), "new", &ActivityView::from(&item), None);
    }
    // Bare short id, suitable for scripts.
    if !global.quiet {
        println!("{}", item.short_id());
    }
    Ok(())
}

pub fn run_done(global: GlobalOptions, id: String) -> Result<()> {
    let ctx = load_context(&global)?;
    let done = report_skipped_on_failure(&ctx, ops::mark_done(&ctx.store, &id))?;
    let item = &done.item;

    let mut human = HumanOutput::new("Activity done");
    human.push_summary("ID", item.short_id());
    human.push_summary("Activity", item.activity.to_string());
    push_skipped(&mut human, &done.skipped);
    if !item.id_matches_digest() {
        human.push_warning(format!(
            "stored id {} does not match the activity text; the delete was recorded under {} and may not cancel it",
            item.id,
            item.activity.digest()
        ));
        human.push_next_step("acts check");
    }

    emit_success(global.output(), "done", &ActivityView::from(item), Some(&human))
}

pub fn run_delay(global: GlobalOptions, id: String, count: i64, unit: String) -> Result<()> {
    let ctx = load_context(&global)?;
    let delayed = report_skipped_on_failure(&ctx, ops::delay(&ctx.store, &id, count, &unit))?;

    let mut human = HumanOutput::new("Activity delayed");
    human.push_summary("Was", delayed.previous.to_string());
    human.push_summary("Now", delayed.current.to_string());
    push_skipped(&mut human, &delayed.skipped);

    let output = DelayOutput {
        previous: ActivityView::from(&delayed.previous),
        current: ActivityView::from(&delayed.current),
    };
    emit_success(global.output(), "delay", &output, Some(&human))
}

pub fn run_grep(global: GlobalOptions, pattern: String) -> Result<()> {
    let ctx = load_context(&global)?;
    let result = ops::grep(&ctx.store, &pattern, &ctx.config.grep.pattern_wrap)?;
    tracing::debug!(pattern = %result.pattern, matches = result.matches.len(), "grep");
    emit_listing(&global, &ctx, "grep", &result.matches, &result.skipped)
}

pub fn run_get(global: GlobalOptions) -> Result<()> {
    let ctx = load_context(&global)?;
    let due = ops::due(&ctx.store, &ctx.store.now())?;
    emit_listing(&global, &ctx, "get", &due.items, &due.skipped)
}

pub fn run_check(global: GlobalOptions) -> Result<()> {
    let ctx = load_context(&global)?;
    let report = ctx.store.check()?;

    let mut human = HumanOutput::new("Log check report");
    human.push_summary("Log", report.path.clone());
    if !report.exists {
        human.push_summary("Status", "no log file yet");
    }
    human.push_summary("Lines", report.total_lines.to_string());
    human.push_summary(
        "Events",
        format!(
            "{} ({} added, {} deleted)",
            report.events, report.adds, report.deletes
        ),
    );
    human.push_summary("Live activities", report.live.to_string());
    human.push_summary("Skipped lines", report.skipped.len().to_string());
    human.push_summary("Id mismatches", report.digest_mismatches.len().to_string());

    for skipped in &report.skipped {
        human.push_detail(format!("line {}: {}", skipped.line, skipped.reason));
    }
    for mismatch in &report.digest_mismatches {
        human.push_detail(format!(
            "line {}: stored id {} but activity hashes to {}",
            mismatch.line, mismatch.stored, mismatch.computed
        ));
    }

    emit_success(global.output(), "check", &report, Some(&human))
}

fn push_skipped(human: &mut HumanOutput, skipped: &[SkippedLine]) {
    for line in skipped {
        human.push_warning(skipped_warning(line.line, &line.reason));
    }
}

/// On failure, report the lines the lookup skipped to stderr.
fn report_skipped_on_failure<T>(ctx: &Context, result: Result<T>) -> Result<T> {
    if result.is_err() {
        if let Ok(scan) = ctx.store.scan() {
            for line in &scan.skipped {
                eprintln!("warning: {}", skipped_warning(line.line, &line.reason));
            }
        }
    }
    result
}

fn emit_listing(
    global: &GlobalOptions,
    ctx: &Context,
    command: &str,
    items: &[LiveActivity],
    skipped: &[SkippedLine],
) -> Result<()> {
    if global.json {
        let output = ListOutput {
            activities: items.iter().map(ActivityView::from).collect(),
            total: items.len(),
            skipped: skipped.to_vec(),
        };
        return emit_success(global.output(), command, &output, None);
    }

    for line in skipped {
        eprintln!("warning: {}", skipped_warning(line.line, &line.reason));
    }
    if global.quiet {
        return Ok(());
    }

    let color = use_color(ctx.config.output.color);
    for item in items {
        println!("{}", format_activity(item, color));
    }
    Ok(())
}
