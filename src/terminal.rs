//! Line-oriented terminal front end
//!
//! Each input line is one event. Lines starting with `:` are commands; anything
//! else is question text. A line ending in `\` is Shift+Enter and keeps composing,
//! otherwise the line is Enter and submits. Answers arrive asynchronously, so zoom
//! and language commands keep working while a question is in flight.

use crate::error::Error;
use crate::locale::Language;
use crate::viewer::{CompletedTurn, EnterAction, SubmitRejected, Viewer, ViewerConfig};
use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::{JoinError, JoinHandle};

const HELP: &str = "\
Commands:
  :open <path>          show another PDF
  :zoom in|out          change page zoom
  :lang [zh|en]         switch language (toggles without an argument)
  :page <n> [out.png]   render page n at the current zoom
  :text                 print the extracted resume text
  :ask                  submit the current question again
  :status               show the current view
  :help                 this help
  :quit                 exit
Anything else is a question. End a line with \\ to continue on the next line.";

type PendingHandle = Option<JoinHandle<CompletedTurn>>;

enum Event {
    Line(Option<String>),
    Turn(std::result::Result<CompletedTurn, JoinError>),
}

enum Flow {
    Continue,
    Quit,
}

async fn wait_turn(pending: &mut PendingHandle) -> std::result::Result<CompletedTurn, JoinError> {
    match pending.as_mut() {
        Some(handle) => {
            let done = handle.await;
            *pending = None;
            done
        }
        None => std::future::pending().await,
    }
}

/// Next input line without its line ending. Bytes that are not UTF-8 are
/// replaced rather than ending the session.
///
/// Partial input stays in `buf` if the read is cancelled, so this is safe to
/// use as a `select!` branch.
async fn read_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<String>> {
    let read = reader.read_until(b'\n', buf).await?;
    if read == 0 && buf.is_empty() {
        return Ok(None);
    }

    let mut end = buf.len();
    if buf[..end].ends_with(b"\n") {
        end -= 1;
    }
    if buf[..end].ends_with(b"\r") {
        end -= 1;
    }
    let line = String::from_utf8_lossy(&buf[..end]).into_owned();
    buf.clear();
    Ok(Some(line))
}

async fn say<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

/// Start the viewer on stdin/stdout
pub async fn run_viewer(config: ViewerConfig) -> Result<()> {
    let mut viewer = Viewer::with_defaults(config)?;
    if let Err(e) = viewer.start().await {
        tracing::warn!(error = %e, "default resume unavailable");
    }

    run_session(&mut viewer, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Drive a viewer from line input until `:quit` or end of input
pub async fn run_session<R, W>(viewer: &mut Viewer, input: R, mut out: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(input);
    let mut buf = Vec::new();
    let mut pending: PendingHandle = None;
    let mut composing = false;

    print_view(viewer, &mut out).await?;

    loop {
        let event = tokio::select! {
            line = read_line(&mut reader, &mut buf) => Event::Line(line?),
            done = wait_turn(&mut pending) => Event::Turn(done),
        };

        match event {
            Event::Turn(done) => finish_turn(viewer, done, &mut out).await?,
            Event::Line(None) => {
                if pending.is_some() {
                    let done = wait_turn(&mut pending).await;
                    finish_turn(viewer, done, &mut out).await?;
                }
                break;
            }
            Event::Line(Some(line)) => {
                if let Some(command) = line.strip_prefix(':') {
                    composing = false;
                    match run_command(viewer, command, &mut pending, &mut out).await? {
                        Flow::Continue => {}
                        Flow::Quit => break,
                    }
                    continue;
                }

                let (text, shift) = match line.strip_suffix('\\') {
                    Some(text) => (text, true),
                    None => (line.as_str(), false),
                };

                if composing {
                    let mut question = viewer.question().to_string();
                    question.push_str(text);
                    viewer.set_question(question);
                } else {
                    viewer.set_question(text);
                }

                match viewer.on_enter(shift) {
                    EnterAction::NewLine => composing = true,
                    EnterAction::Submit => {
                        composing = false;
                        submit(viewer, &mut pending, &mut out).await?;
                    }
                }
            }
        }
    }

    if let Some(handle) = pending.take() {
        handle.abort();
    }
    Ok(())
}

async fn submit<W: AsyncWrite + Unpin>(
    viewer: &mut Viewer,
    pending: &mut PendingHandle,
    out: &mut W,
) -> Result<()> {
    match viewer.begin_submit() {
        Ok(turn) => {
            say(out, viewer.view().submit_label).await?;
            *pending = Some(tokio::spawn(turn.run()));
        }
        Err(SubmitRejected::BlankQuestion) => {}
        Err(rejected) => {
            tracing::debug!(%rejected, "submission rejected");
            say(out, &format!("({})", rejected)).await?;
        }
    }
    Ok(())
}

async fn finish_turn<W: AsyncWrite + Unpin>(
    viewer: &mut Viewer,
    done: std::result::Result<CompletedTurn, JoinError>,
    out: &mut W,
) -> Result<()> {
    match done {
        Ok(completed) => viewer.complete_submit(completed),
        Err(e) => {
            // A panicked chat task still has to leave the loading state
            tracing::error!(error = %e, "chat task failed");
            viewer.abandon_submit();
        }
    }

    if let Some((heading, answer)) = viewer.view().answer {
        say(out, heading).await?;
        say(out, &answer).await?;
    }
    Ok(())
}

async fn run_command<W: AsyncWrite + Unpin>(
    viewer: &mut Viewer,
    command: &str,
    pending: &mut PendingHandle,
    out: &mut W,
) -> Result<Flow> {
    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();

    match name {
        "open" => {
            let path = command
                .trim_start()
                .strip_prefix("open")
                .unwrap_or_default()
                .trim();
            if path.is_empty() {
                say(out, viewer.view().upload_prompt.unwrap_or(HELP)).await?;
                return Ok(Flow::Continue);
            }
            if viewer.select_file(path).is_ok() {
                // Text and answer are already cleared at this point
                let _ = viewer.open_active().await;
            }
            print_document(viewer, out).await?;
        }
        "zoom" => {
            let zoom = match parts.next() {
                Some("in") | Some("+") => viewer.zoom_in(),
                Some("out") | Some("-") => viewer.zoom_out(),
                _ => viewer.zoom(),
            };
            say(out, &format!("{}%", zoom.percent())).await?;
        }
        "lang" => {
            match parts.next() {
                Some(code) => match code.parse::<Language>() {
                    Ok(language) => viewer.set_language(language),
                    Err(e) => {
                        say(out, &e.to_string()).await?;
                        return Ok(Flow::Continue);
                    }
                },
                None => {
                    viewer.toggle_language();
                }
            }
            print_view(viewer, out).await?;
        }
        "page" => {
            let Some(page) = parts.next().and_then(|p| p.parse::<u32>().ok()) else {
                say(out, HELP).await?;
                return Ok(Flow::Continue);
            };
            match viewer.render_page(page).await {
                Ok(surface) => match parts.next() {
                    Some(target) => match tokio::fs::write(target, surface.png.as_slice()).await {
                        Ok(()) => say(out, &format!("page {} -> {}", page, target)).await?,
                        Err(e) => {
                            tracing::warn!(error = %e, page, path = %target, "could not save page");
                            let message = Error::Io(e).client_message();
                            say(out, &format!("page {} not saved: {}", page, message)).await?;
                        }
                    },
                    None => {
                        say(
                            out,
                            &format!(
                                "page {} at {}%: {}x{} px",
                                page,
                                viewer.zoom().percent(),
                                surface.width,
                                surface.height
                            ),
                        )
                        .await?;
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, page, "render failed");
                    say(out, &e.client_message()).await?;
                }
            }
        }
        "text" => say(out, viewer.pdf_text()).await?,
        "ask" => submit(viewer, pending, out).await?,
        "status" => print_view(viewer, out).await?,
        "quit" | "q" | "exit" => return Ok(Flow::Quit),
        _ => say(out, HELP).await?,
    }

    Ok(Flow::Continue)
}

async fn print_document<W: AsyncWrite + Unpin>(viewer: &Viewer, out: &mut W) -> Result<()> {
    let view = viewer.view();
    if let Some(notice) = &view.notice {
        say(out, &format!("! {}", notice)).await?;
    }
    match (&view.upload_prompt, &view.source_name) {
        (Some(prompt), _) => say(out, prompt).await?,
        (None, Some(name)) => {
            say(
                out,
                &format!("{} ({} pages, {}%)", name, view.page_count, view.zoom_percent),
            )
            .await?
        }
        (None, None) => {}
    }
    Ok(())
}

async fn print_view<W: AsyncWrite + Unpin>(viewer: &Viewer, out: &mut W) -> Result<()> {
    let view = viewer.view();

    say(out, &format!("{} [{}]", view.title, view.language_badge)).await?;
    say(out, view.disclaimer).await?;
    for (label, value) in &view.header {
        say(out, &format!("{}: {}", label, value)).await?;
    }
    print_document(viewer, out).await?;
    if view.upload_prompt.is_none() {
        say(out, view.scroll_hint).await?;
    }
    if let Some((heading, answer)) = &view.answer {
        say(out, heading).await?;
        say(out, answer).await?;
    }
    say(out, view.question_placeholder).await?;
    Ok(())
}
