#![forbid(unsafe_code)]

//! Interactive terminal player.
//!
//! Keys: `space` play/pause, `←`/`→` step, `r` reset, `1`/`2`/`3` speed,
//! `q`/`Esc` quit. Ticks arrive on the [`ThreadTicker`] channel and are
//! drained between input polls, so all engine mutation stays on this thread.

use std::io::{self, Write};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Stylize};
use crossterm::{cursor, queue, terminal};
use cspdash_core::{PlaybackEngine, Speed, ThreadTicker, Ticker, TimerId, Tone};
use web_time::Instant;

use crate::paint::{self, Line};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

const HELP: &str = "space play/pause  ←/→ step  r reset  1/2/3 speed  q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Redraw,
    Ignored,
    Quit,
}

/// Apply one key press to the engine.
pub fn handle_key<T: Ticker>(engine: &mut PlaybackEngine<T>, key: KeyEvent) -> KeyOutcome {
    if key.kind == KeyEventKind::Release {
        return KeyOutcome::Ignored;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => KeyOutcome::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyOutcome::Quit,
        KeyCode::Char(' ') => {
            engine.toggle_playback();
            KeyOutcome::Redraw
        }
        KeyCode::Right => {
            engine.step_forward();
            KeyOutcome::Redraw
        }
        KeyCode::Left => {
            engine.step_backward();
            KeyOutcome::Redraw
        }
        KeyCode::Char('r') => {
            engine.reset();
            KeyOutcome::Redraw
        }
        KeyCode::Char('1') => {
            engine.set_speed(Speed::Slow);
            KeyOutcome::Redraw
        }
        KeyCode::Char('2') => {
            engine.set_speed(Speed::Normal);
            KeyOutcome::Redraw
        }
        KeyCode::Char('3') => {
            engine.set_speed(Speed::Fast);
            KeyOutcome::Redraw
        }
        _ => KeyOutcome::Ignored,
    }
}

/// Raw mode plus alternate screen, restored on drop.
struct TerminalGuard {
    stdout: io::Stdout,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = crossterm::execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        ) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        tracing::debug!("terminal raw mode enabled");
        Ok(Self { stdout })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(self.stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
        tracing::debug!("terminal restored");
    }
}

fn tone_color(tone: Tone) -> Option<Color> {
    match tone {
        Tone::Primary => Some(Color::Cyan),
        Tone::Secondary => Some(Color::Magenta),
        Tone::Found => Some(Color::Green),
        Tone::Neutral => None,
    }
}

fn draw(out: &mut impl Write, lines: &[Line]) -> io::Result<()> {
    queue!(out, cursor::MoveTo(0, 0), terminal::Clear(terminal::ClearType::All))?;
    for (row, line) in lines.iter().enumerate() {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, cursor::MoveTo(0, row))?;
        for span in line {
            match tone_color(span.tone) {
                Some(color) => queue!(
                    out,
                    crossterm::style::PrintStyledContent(span.text.as_str().with(color).bold())
                )?,
                None => queue!(out, crossterm::style::Print(&span.text))?,
            }
        }
    }
    out.flush()
}

/// Drain every pending tick. Returns `true` if any was accepted.
fn drain_ticks(engine: &mut PlaybackEngine<ThreadTicker>, ticks: &Receiver<TimerId>) -> bool {
    let mut accepted = false;
    loop {
        match ticks.try_recv() {
            Ok(id) => accepted |= engine.on_tick(id),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => return accepted,
        }
    }
}

/// Run the player until the user quits.
pub fn run(
    mut engine: PlaybackEngine<ThreadTicker>,
    ticks: Receiver<TimerId>,
) -> io::Result<()> {
    let started = Instant::now();
    let mut guard = TerminalGuard::enter()?;
    let mut dirty = true;

    loop {
        if drain_ticks(&mut engine, &ticks) {
            dirty = true;
        }
        if dirty {
            let mut lines = paint::paint_frame(&engine.frame());
            lines.push(Vec::new());
            lines.push(vec![paint::Span::plain(HELP)]);
            draw(&mut guard.stdout, &lines)?;
            dirty = false;
        }
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => match handle_key(&mut engine, key) {
                KeyOutcome::Quit => break,
                KeyOutcome::Redraw => dirty = true,
                KeyOutcome::Ignored => {}
            },
            Event::Resize(..) => dirty = true,
            _ => {}
        }
    }

    engine.pause();
    drop(guard);
    tracing::info!(
        scenario = %engine.kind(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "player closed"
    );
    Ok(())
}
