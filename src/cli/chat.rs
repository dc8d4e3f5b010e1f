use std::io::{self, Write, stdout};

use anyhow::Result;
use crossterm::style::Stylize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::api::init_tracing;
use crate::client::render::{render_message, render_transcript};
use crate::client::{ChatSession, Phase, RelayClient};
use crate::openai::Role;
use crate::relay::ResponseMode;

/// Prints a submission as it progresses. Streamed text is written as
/// it arrives; every other message is rendered once it lands in the
/// transcript.
struct LiveView {
    shown: usize,
    streamed: String,
    loading_shown: bool,
    error: Option<io::Error>,
}

impl LiveView {
    fn new(shown: usize) -> Self {
        Self {
            shown,
            streamed: String::new(),
            loading_shown: false,
            error: None,
        }
    }

    /// Keeps the first write error so the caller can return it once
    /// the submission settles.
    fn update(&mut self, session: &ChatSession) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.render(&mut stdout(), session) {
            self.error = Some(e);
        }
    }

    fn render(&mut self, out: &mut impl Write, session: &ChatSession) -> io::Result<()> {
        if session.phase() == Phase::Awaiting && !self.loading_shown {
            writeln!(out, "{}", "Loading...".dark_grey())?;
            self.loading_shown = true;
        }

        if let Some(text) = session.in_flight() {
            if let Some(new) = text
                .strip_prefix(self.streamed.as_str())
                .filter(|new| !new.is_empty())
            {
                write!(out, "{}", new)?;
                self.streamed.push_str(new);
            }
        }

        let messages = session.transcript().messages();
        for msg in messages.iter().skip(self.shown) {
            match msg.role {
                // Already on screen from the prompt
                Role::User => {}
                Role::Assistant if !self.streamed.is_empty() && msg.content == self.streamed => {
                    writeln!(out)?;
                }
                Role::Assistant => {
                    if !self.streamed.is_empty() {
                        writeln!(out)?;
                    }
                    writeln!(out, "{}", render_message(msg))?;
                }
            }
        }
        self.shown = messages.len();

        out.flush()
    }
}

pub async fn run(url: String, buffered: bool) -> Result<()> {
    init_tracing("relaychat=warn");

    let mut rl = DefaultEditor::new()?;
    let mode = if buffered {
        ResponseMode::Buffered
    } else {
        ResponseMode::Streaming
    };
    let client = RelayClient::new(&url, mode);
    let mut session = ChatSession::new();

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                match line.trim() {
                    "/quit" => break,
                    "/history" => {
                        println!("{}", render_transcript(session.transcript()));
                        continue;
                    }
                    _ => {}
                }

                rl.add_history_entry(line.as_str())?;
                let mut view = LiveView::new(session.transcript().len());
                client
                    .submit(&mut session, &line, |s| view.update(s))
                    .await;
                if let Some(e) = view.error {
                    return Err(e.into());
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
