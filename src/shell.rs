//! Line-oriented interactive session: edit the search form, page through
//! results, stage and upload files, and watch the counters move.

use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::EventApi;
use crate::filters::FilterField;
use crate::results::{format_megabytes, render_files, render_outcomes, render_stats};
use crate::session::Session;

pub const HELP: &str = "\
commands:
  set <field> <value>   edit a search field (page, page_size or a filter)
  unset <field>         empty a filter field
  reset                 clear the whole form
  form                  show the form
  search                submit the form
  page <n> | next | prev
  show                  show the current results
  stage <file>...       select files for upload
  unstage <n>           drop one selected file
  staged                list selected files with their sizes
  clear-staged          drop every selected file
  upload                upload the selected files
  uploads               list upload results
  remove <n>            drop one upload result
  clear-results         drop all upload results
  stats                 show session counters
  sync                  replace counters with the server's numbers
  files                 list files known to the server
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Set { field: String, value: String },
    Unset(String),
    Reset,
    Form,
    Search,
    Page(u32),
    Next,
    Prev,
    Show,
    Stage(Vec<PathBuf>),
    Unstage(usize),
    Staged,
    ClearStaged,
    Upload,
    Uploads,
    Remove(usize),
    ClearResults,
    Stats,
    Sync,
    Files,
    Help,
    Quit,
}

fn index_arg(arg: Option<&str>, usage: &str) -> Result<usize, String> {
    arg.and_then(|a| a.parse().ok())
        .ok_or_else(|| format!("usage: {usage}"))
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let arg = rest.split_whitespace().next();

        let command = match word {
            "set" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .map(|(f, v)| (f, v.trim()))
                    .unwrap_or((rest, ""));
                if field.is_empty() {
                    return Err("usage: set <field> <value>".to_string());
                }
                ShellCommand::Set {
                    field: field.to_string(),
                    value: value.to_string(),
                }
            }
            "unset" => ShellCommand::Unset(
                arg.ok_or_else(|| "usage: unset <field>".to_string())?
                    .to_string(),
            ),
            "reset" => ShellCommand::Reset,
            "form" => ShellCommand::Form,
            "search" => ShellCommand::Search,
            "page" => ShellCommand::Page(
                arg.and_then(|a| a.parse().ok())
                    .ok_or_else(|| "usage: page <n>".to_string())?,
            ),
            "next" => ShellCommand::Next,
            "prev" => ShellCommand::Prev,
            "show" => ShellCommand::Show,
            "stage" if !rest.is_empty() => {
                ShellCommand::Stage(rest.split_whitespace().map(PathBuf::from).collect())
            }
            "stage" => return Err("usage: stage <file>...".to_string()),
            "unstage" => ShellCommand::Unstage(index_arg(arg, "unstage <n>")?),
            "staged" => ShellCommand::Staged,
            "clear-staged" => ShellCommand::ClearStaged,
            "upload" => ShellCommand::Upload,
            "uploads" => ShellCommand::Uploads,
            "remove" => ShellCommand::Remove(index_arg(arg, "remove <n>")?),
            "clear-results" => ShellCommand::ClearResults,
            "stats" => ShellCommand::Stats,
            "sync" => ShellCommand::Sync,
            "files" => ShellCommand::Files,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => return Err(format!("unknown command `{other}` (try `help`)")),
        };
        Ok(command)
    }
}

/// Run one command. Returns `Ok(false)` when the session should end.
pub async fn execute<A: EventApi, W: Write>(
    session: &mut Session<A>,
    command: ShellCommand,
    out: &mut W,
) -> std::io::Result<bool> {
    match command {
        ShellCommand::Set { field, value } => {
            if let Err(e) = session.form_mut().edit(&field, &value) {
                writeln!(out, "{e}")?;
            }
        }
        ShellCommand::Unset(field) => {
            if let Err(e) = session.form_mut().edit(&field, "") {
                writeln!(out, "{e}")?;
            }
        }
        ShellCommand::Reset => session.form_mut().clear(),
        ShellCommand::Form => {
            let form = session.form();
            for field in FilterField::ALL {
                let value = form.value(field);
                if !value.is_empty() {
                    writeln!(out, "{field:<11} {value}")?;
                }
            }
            writeln!(out, "{:<11} {}", "page", form.page())?;
            writeln!(out, "{:<11} {}", "page_size", form.page_size().get())?;
            if form.has_active_filters() {
                writeln!(out, "(active filters)")?;
            }
        }
        ShellCommand::Search => {
            if let Err(e) = session.search().await {
                tracing::debug!("search command failed: {}", e);
            }
            write!(out, "{}", session.results().render())?;
        }
        ShellCommand::Page(page) => go_to_page(session, page, out).await?,
        ShellCommand::Next => {
            if let Some((page, _)) = session.current_page() {
                match page.checked_add(1) {
                    Some(next) => go_to_page(session, next, out).await?,
                    None => writeln!(out, "no page after {page} to show")?,
                }
            }
        }
        ShellCommand::Prev => {
            if let Some((page, _)) = session.current_page() {
                go_to_page(session, page.saturating_sub(1), out).await?;
            }
        }
        ShellCommand::Show => write!(out, "{}", session.results().render())?,
        ShellCommand::Stage(paths) => {
            session.stage_files(paths);
            writeln!(out, "{} file(s) selected", session.selection().len())?;
        }
        ShellCommand::ClearStaged => session.selection_mut().clear(),
        ShellCommand::Unstage(index) => {
            if session.selection_mut().remove(index).is_none() {
                writeln!(out, "no selected file at {index}")?;
            }
        }
        ShellCommand::Staged => {
            for (i, path) in session.selection().files().iter().enumerate() {
                match tokio::fs::metadata(path).await {
                    Ok(meta) => {
                        writeln!(out, "[{i}] {} ({})", path.display(), format_megabytes(meta.len()))?
                    }
                    Err(e) => writeln!(out, "[{i}] {} (unreadable: {e})", path.display())?,
                }
            }
        }
        ShellCommand::Upload => match session.upload().await {
            Ok(outcomes) => write!(out, "{}", render_outcomes(outcomes))?,
            Err(e) => writeln!(out, "{e}")?,
        },
        ShellCommand::Uploads => write!(out, "{}", render_outcomes(session.uploads()))?,
        ShellCommand::Remove(index) => {
            if !session.remove_result(index) {
                writeln!(out, "no upload result at {index}")?;
            }
        }
        ShellCommand::ClearResults => session.clear_results(),
        ShellCommand::Stats => writeln!(out, "{}", render_stats(session.stats()))?,
        ShellCommand::Sync => match session.sync_stats().await {
            Ok(()) => writeln!(out, "{}", render_stats(session.stats()))?,
            Err(e) => writeln!(out, "{}", e.user_message())?,
        },
        ShellCommand::Files => match session.list_files().await {
            Ok(files) => write!(out, "{}", render_files(&files))?,
            Err(e) => writeln!(out, "{}", e.user_message())?,
        },
        ShellCommand::Help => writeln!(out, "{HELP}")?,
        ShellCommand::Quit => return Ok(false),
    }
    Ok(true)
}

async fn go_to_page<A: EventApi, W: Write>(
    session: &mut Session<A>,
    page: u32,
    out: &mut W,
) -> std::io::Result<()> {
    match session.change_page(page).await {
        Ok(true) | Err(_) => write!(out, "{}", session.results().render()),
        Ok(false) => writeln!(out, "no page {page} to show"),
    }
}

/// Read commands from stdin until `quit` or end of input.
pub async fn run<A: EventApi>(session: &mut Session<A>) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    write!(stdout, "> ")?;
    stdout.flush()?;
    while let Some(line) = lines.next_line().await? {
        if !line.trim().is_empty() {
            match ShellCommand::parse(&line) {
                Ok(command) => {
                    if !execute(session, command, &mut stdout).await? {
                        break;
                    }
                }
                Err(message) => writeln!(stdout, "{message}")?,
            }
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    Ok(())
}
