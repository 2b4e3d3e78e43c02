use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use noteable::api::NoteableApi;
use noteable::commands::{CmdMessage, MessageLevel};
use noteable::error::{NoteableError, Result};
use noteable::import::ImportMode;
use noteable::model::{Document, Field, FieldKind};
use noteable::store::fs::FsBackend;
use noteable::store::DocumentStore;
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;

mod args;
use args::{Cli, Commands, FieldAction, TabAction};

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: NoteableApi<FsBackend>,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut ctx = init_context(&cli);

    match cli.command {
        Some(Commands::List) | None => handle_list(&ctx),
        Some(Commands::Tab { action }) => handle_tab(&mut ctx, action),
        Some(Commands::Field { action }) => handle_field(&mut ctx, action),
        Some(Commands::Clear { tab }) => handle_clear(&mut ctx, tab),
        Some(Commands::Run { tab, field }) => handle_run(&ctx, tab, field),
        Some(Commands::Import { path, merge }) => handle_import(&mut ctx, path, merge),
        Some(Commands::Export { dir }) => handle_export(&ctx, dir),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
    }
}

fn init_context(cli: &Cli) -> AppContext {
    let data_dir = cli.data_dir.clone().unwrap_or_else(|| {
        ProjectDirs::from("com", "noteable", "noteable")
            .expect("Could not determine data dir")
            .data_dir()
            .to_path_buf()
    });
    let store = DocumentStore::new(FsBackend::new(data_dir));
    AppContext {
        api: NoteableApi::load(store),
    }
}

fn resolve_tab(ctx: &AppContext, selector: &str) -> Result<String> {
    ctx.api
        .resolve_tab(selector)
        .ok_or_else(|| NoteableError::Api(format!("No tab matches '{}'", selector)))
}

fn resolve_field(ctx: &AppContext, tab_id: &str, selector: &str) -> Result<String> {
    ctx.api
        .resolve_field(tab_id, selector)
        .ok_or_else(|| NoteableError::Api(format!("No field matches '{}'", selector)))
}

fn parse_kind(s: &str) -> Result<FieldKind> {
    match s {
        "label" => Ok(FieldKind::Label),
        "textarea" => Ok(FieldKind::Textarea),
        "image" => Ok(FieldKind::Image),
        "template" => Ok(FieldKind::Template),
        other => Err(NoteableError::Api(format!(
            "Unknown field type '{}': expected label, textarea, image, or template",
            other
        ))),
    }
}

fn handle_list(ctx: &AppContext) -> Result<()> {
    print_document(ctx.api.document());
    Ok(())
}

fn handle_tab(ctx: &mut AppContext, action: TabAction) -> Result<()> {
    match action {
        TabAction::Add { name } => {
            let tab = ctx.api.add_tab(&name);
            println!("{}", format!("Tab created: {} ({})", tab.name, tab.id).green());
        }
        TabAction::Remove { tab } => {
            let id = resolve_tab(ctx, &tab)?;
            ctx.api.remove_tab(&id);
            println!("{}", "Tab removed".green());
        }
        TabAction::Rename { tab, name } => {
            let id = resolve_tab(ctx, &tab)?;
            ctx.api.rename_tab(&id, &name)?;
            println!("{}", format!("Tab renamed to {}", name.trim()).green());
        }
        TabAction::Select { tab } => {
            let id = resolve_tab(ctx, &tab)?;
            ctx.api.select_tab(&id);
        }
        TabAction::Order { tabs } => {
            let ids: Vec<String> = tabs
                .iter()
                .map(|s| resolve_tab(ctx, s))
                .collect::<Result<_>>()?;
            ctx.api.reorder_tabs(&ids);
        }
    }
    Ok(())
}

fn handle_field(ctx: &mut AppContext, action: FieldAction) -> Result<()> {
    match action {
        FieldAction::Add { tab, kind, label } => {
            let tab_id = resolve_tab(ctx, &tab)?;
            let kind = parse_kind(&kind)?;
            if kind == FieldKind::Template && !ctx.api.document().settings.experimental {
                return Err(NoteableError::Api(
                    "Template fields are experimental; enable them with \
                     `noteable config experimental true`"
                        .to_string(),
                ));
            }
            match ctx.api.add_field(&tab_id, kind, &label) {
                Some(field) => println!(
                    "{}",
                    format!("Field created: {} ({})", field.display_label(), field.id).green()
                ),
                None => println!("{}", "Tab disappeared; nothing created".yellow()),
            }
        }
        FieldAction::Remove { tab, field } => {
            let tab_id = resolve_tab(ctx, &tab)?;
            let field_id = resolve_field(ctx, &tab_id, &field)?;
            ctx.api.remove_field(&tab_id, &field_id);
            println!("{}", "Field removed".green());
        }
        FieldAction::Rename { tab, field, label } => {
            let tab_id = resolve_tab(ctx, &tab)?;
            let field_id = resolve_field(ctx, &tab_id, &field)?;
            ctx.api.rename_field(&tab_id, &field_id, &label);
        }
        FieldAction::Set { tab, field, value } => {
            let tab_id = resolve_tab(ctx, &tab)?;
            let field_id = resolve_field(ctx, &tab_id, &field)?;
            ctx.api.set_field_value(&tab_id, &field_id, value);
        }
        FieldAction::Order { tab, fields } => {
            let tab_id = resolve_tab(ctx, &tab)?;
            let ids: Vec<String> = fields
                .iter()
                .map(|s| resolve_field(ctx, &tab_id, s))
                .collect::<Result<_>>()?;
            ctx.api.reorder_fields(&tab_id, &ids);
        }
    }
    Ok(())
}

fn handle_clear(ctx: &mut AppContext, tab: String) -> Result<()> {
    let id = resolve_tab(ctx, &tab)?;
    ctx.api.clear_tab(&id);
    println!("{}", "Tab cleared".green());
    Ok(())
}

fn handle_run(ctx: &AppContext, tab: String, field: String) -> Result<()> {
    let tab_id = resolve_tab(ctx, &tab)?;
    let field_id = resolve_field(ctx, &tab_id, &field)?;
    let output = ctx.api.resolve_template(&field_id)?;
    println!("{}", output);
    Ok(())
}

fn handle_import(ctx: &mut AppContext, path: PathBuf, merge: bool) -> Result<()> {
    let mode = if merge {
        ImportMode::Merge
    } else {
        ImportMode::Replace
    };
    let result = ctx.api.import_file(&path, mode)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(ctx: &AppContext, dir: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let result = ctx.api.export(&dir)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let settings = ctx.api.document().settings.clone();
    match (key.as_deref(), value) {
        (None, _) => {
            println!(
                "clear-tab-deletes-images = {}",
                settings.clear_tab_deletes_images
            );
            println!("experimental = {}", settings.experimental);
        }
        (Some("clear-tab-deletes-images"), None) => {
            println!("{}", settings.clear_tab_deletes_images);
        }
        (Some("experimental"), None) => {
            println!("{}", settings.experimental);
        }
        (Some("clear-tab-deletes-images"), Some(v)) => {
            ctx.api.set_clear_tab_deletes_images(parse_bool(&v)?);
        }
        (Some("experimental"), Some(v)) => {
            ctx.api.set_experimental(parse_bool(&v)?);
        }
        (Some(other), _) => {
            println!("Unknown config key: {}", other);
        }
    }
    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    match s {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        other => Err(NoteableError::Api(format!(
            "Expected true or false, got '{}'",
            other
        ))),
    }
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

const PREVIEW_WIDTH: usize = 50;

fn print_document(doc: &Document) {
    let active = doc.active_tab_id.as_deref().unwrap_or("");
    for tab in &doc.tabs {
        let marker = if tab.id == active { "*" } else { " " };
        println!(
            "{} {} {}",
            marker,
            tab.name.bold(),
            format!("({})", tab.id).dimmed()
        );

        let label_width = tab
            .fields
            .iter()
            .map(|f| f.display_label().width())
            .max()
            .unwrap_or(0);

        for field in &tab.fields {
            let label = field.display_label();
            let padding = " ".repeat(label_width.saturating_sub(label.width()));
            println!(
                "    {}{}  {} {}",
                label,
                padding,
                format!("{:<9}", field.kind.as_str()).dimmed(),
                preview(field)
            );
        }
        if tab.fields.is_empty() {
            println!("    {}", "This tab is empty.".dimmed());
        }
    }
}

fn preview(field: &Field) -> String {
    if field.kind == FieldKind::Image {
        let dims = match (field.width, field.height) {
            (Some(w), Some(h)) => format!(" {}x{}", w.round(), h.round()),
            _ => String::new(),
        };
        return format!("<image{}>", dims);
    }
    let flat: String = field
        .value
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    truncate_to_width(&flat, PREVIEW_WIDTH)
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}
