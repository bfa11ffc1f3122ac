use super::{
    runner::{status_line, ChannelClosed, StepCommand, StepControl},
    Process, Snapshot,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    execute,
    terminal::{self, Clear, ClearType},
};
use std::{
    io::{self, Stdout},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread,
    time::Duration,
};
use tracing::warn;
use tui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table},
    Terminal,
};

const POLL_RATE: Duration = Duration::from_millis(200);

/// Terminal UI step controller: draws the process table after every tick and waits for a key.
pub struct DisplayTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    input_rx: Receiver<KeyEvent>,
    stop: Arc<AtomicBool>,
    title: String,
}

/// Forwards key presses from `poll` until `stop` is raised, the receiver hangs up or the
/// terminal fails.
fn forward_keys<F>(stop: &AtomicBool, keys: &Sender<KeyEvent>, mut poll: F)
where
    F: FnMut(Duration) -> io::Result<Option<Event>>,
{
    while !stop.load(Ordering::Relaxed) {
        match poll(POLL_RATE) {
            Ok(Some(Event::Key(key))) => {
                if keys.send(key).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(err) => {
                warn!("failed to read terminal events: {err}");
                break;
            }
        }
    }
}

fn poll_terminal(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

impl DisplayTerminal {
    pub fn new(title: &str) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), Clear(ClearType::All))?;

        // Set up the input handling thread
        let (input_tx, input_rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        thread::spawn(move || forward_keys(&thread_stop, &input_tx, poll_terminal));

        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            input_rx,
            stop,
            title: title.to_owned(),
        })
    }

    fn draw(&mut self, snapshot: &Snapshot, processes: &[Process]) -> Result<(), io::Error> {
        let title = &self.title;

        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(5),
                    Constraint::Length(1),
                ])
                .split(f.size());

            let status = Paragraph::new(status_line(snapshot))
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .fg(Color::LightBlue),
                )
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Current Tick")
                        .border_type(BorderType::Rounded),
                );
            f.render_widget(status, chunks[0]);

            let rows = processes.iter().map(|process| {
                let running = snapshot.running.as_deref() == Some(process.id());
                let state = if running {
                    "running"
                } else if process.is_completed() {
                    "done"
                } else if process.arrival_time() <= snapshot.tick {
                    "ready"
                } else {
                    "pending"
                };
                let style = if running {
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .fg(Color::Yellow)
                } else {
                    Style::default()
                };

                Row::new(vec![
                    Cell::from(process.id().to_owned())
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                    Cell::from(process.priority().to_string()),
                    Cell::from(process.arrival_time().to_string()),
                    Cell::from(process.duration().to_string()),
                    Cell::from(process.remaining_time().to_string()),
                    Cell::from(state),
                ])
                .style(style)
            });

            let table = Table::new(rows)
                .header(
                    Row::new(vec![
                        "ID",
                        "Priority",
                        "Arrival",
                        "Duration",
                        "Remaining",
                        "State",
                    ])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
                )
                .widths(&[
                    Constraint::Length(12),
                    Constraint::Length(8),
                    Constraint::Length(7),
                    Constraint::Length(8),
                    Constraint::Length(9),
                    Constraint::Length(7),
                ])
                .block(Block::default().title(title.as_str()).borders(Borders::ALL))
                .style(Style::default().fg(Color::LightGreen))
                .column_spacing(1);
            f.render_widget(table, chunks[1]);

            let help = Paragraph::new("s/enter: step | r: run to end | q: quit");
            f.render_widget(help, chunks[2]);
        })?;
        Ok(())
    }

    fn wait_for_command(&self) -> Result<StepCommand, ChannelClosed> {
        loop {
            let key = self.input_rx.recv().map_err(|_| ChannelClosed)?;
            if !key.modifiers.is_empty() {
                continue;
            }
            match key.code {
                KeyCode::Char('s') | KeyCode::Enter => return Ok(StepCommand::Continue),
                KeyCode::Char('r') => return Ok(StepCommand::RunToEnd),
                KeyCode::Char('q') | KeyCode::Esc => return Ok(StepCommand::Abort),
                _ => {}
            }
        }
    }
}

impl StepControl for DisplayTerminal {
    fn acknowledge(
        &mut self,
        snapshot: &Snapshot,
        processes: &[Process],
    ) -> Result<StepCommand, ChannelClosed> {
        if let Err(err) = self.draw(snapshot, processes) {
            warn!("failed to draw frame: {err}");
            return Err(ChannelClosed);
        }
        self.wait_for_command()
    }
}

impl Drop for DisplayTerminal {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), Clear(ClearType::All));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn raised_flag_stops_forwarding_without_polling() {
        let (keys, _rx) = mpsc::channel();
        let stop = AtomicBool::new(true);
        let mut polls = 0;

        forward_keys(&stop, &keys, |_| {
            polls += 1;
            Ok(None)
        });
        assert_eq!(polls, 0);
    }

    #[test]
    fn forwarding_ends_once_the_flag_is_raised() {
        let (keys, rx) = mpsc::channel();
        let stop = AtomicBool::new(false);
        let mut pending = vec![Ok(None), Ok(Some(key('s'))), Ok(Some(key('r')))];

        // Raise the flag from inside the source, as `Drop` would from another thread.
        forward_keys(&stop, &keys, |_| {
            let next = pending.remove(0);
            if pending.is_empty() {
                stop.store(true, Ordering::Relaxed);
            }
            next
        });

        let forwarded: Vec<KeyCode> = rx.try_iter().map(|key| key.code).collect();
        assert_eq!(forwarded, vec![KeyCode::Char('s'), KeyCode::Char('r')]);
    }

    #[test]
    fn terminal_error_ends_forwarding() {
        let (keys, rx) = mpsc::channel();
        let stop = AtomicBool::new(false);

        forward_keys(&stop, &keys, |_| Err(io::ErrorKind::Other.into()));
        assert!(rx.try_recv().is_err());
        assert!(!stop.load(Ordering::Relaxed));
    }
}
