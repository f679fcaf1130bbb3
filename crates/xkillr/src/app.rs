use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::{Config, Theme};
use crate::filter::FilteredView;
use crate::process::{ProcessRecord, Snapshot};
use crate::selection::Selection;
use crate::signals::{self, KillOutcome, SignalSender};
use crate::ui::Screen;

/// What the loop should do after a key press.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
    Confirm,
}

/// The state a redraw depends on. The loop only redraws when this changes.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FrameStamp {
    selected: usize,
    scroll_offset: usize,
    pattern_len: usize,
}

pub struct App {
    snapshot: Snapshot,
    pattern: String,
    view: FilteredView,
    selection: Selection,
    theme: Theme,
}

impl App {
    pub fn new(snapshot: Snapshot, config: &Config, height: usize) -> Self {
        let mut app = Self {
            snapshot,
            pattern: config.initial_filter.clone().unwrap_or_default(),
            view: FilteredView::default(),
            selection: Selection::new(height),
            theme: config.theme,
        };
        app.apply_filter();
        app
    }

    pub fn handle_input(&mut self, event: KeyEvent) -> Flow {
        if event.kind != KeyEventKind::Press {
            return Flow::Continue;
        }

        let control = event.modifiers.contains(KeyModifiers::CONTROL);
        let alt = event.modifiers.contains(KeyModifiers::ALT);

        match event.code {
            KeyCode::Char('q') | KeyCode::Char('Q') if control => return Flow::Quit,
            KeyCode::Enter => return Flow::Confirm,
            KeyCode::Up => self.selection.move_up(),
            KeyCode::Down => self.selection.move_down(self.view.len()),
            KeyCode::Backspace => {
                if self.pattern.pop().is_some() {
                    self.apply_filter();
                }
            }
            KeyCode::Char(c) if !control && !alt && is_printable(c) => {
                self.pattern.push(c);
                self.apply_filter();
            }
            _ => {}
        }
        Flow::Continue
    }

    pub fn resize(&mut self, height: usize) {
        self.selection.resize(height, self.view.len());
        log::trace!("viewport is {} rows", self.selection.height());
    }

    pub fn terminate_selected<S: SignalSender>(&self, sender: &mut S) -> KillOutcome {
        signals::terminate(
            sender,
            &self.snapshot,
            &self.view,
            self.selection.selected(),
        )
    }

    pub fn frame_stamp(&self) -> FrameStamp {
        FrameStamp {
            selected: self.selection.selected(),
            scroll_offset: self.selection.scroll_offset(),
            pattern_len: self.pattern.len(),
        }
    }

    /// Rows inside the viewport, paired with their position in the view.
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, &ProcessRecord)> + '_ {
        self.selection
            .visible_range(self.view.len())
            .filter_map(|position| {
                self.view
                    .get(&self.snapshot, position)
                    .map(|record| (position, record))
            })
    }

    pub fn selected_record(&self) -> Option<&ProcessRecord> {
        self.view.get(&self.snapshot, self.selection.selected())
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    fn apply_filter(&mut self) {
        self.view = FilteredView::recompute(&self.snapshot, &self.pattern);
        self.selection.reconcile(self.view.len());
        log::trace!(
            "pattern {:?} keeps {} of {} processes",
            self.pattern,
            self.view_len(),
            self.snapshot.len()
        );
    }
}

/// Drives the interactive session until the user quits or confirms a kill.
///
/// Returns the outcome of the kill, or `None` when the user quit without one.
pub fn run<T: Screen, S: SignalSender>(
    app: &mut App,
    screen: &mut T,
    sender: &mut S,
    poll_interval: Duration,
) -> Result<Option<KillOutcome>> {
    app.resize(screen.viewport_height()?);
    let mut last_drawn: Option<FrameStamp> = None;

    loop {
        let stamp = app.frame_stamp();
        if last_drawn != Some(stamp) {
            screen.draw(app)?;
            last_drawn = Some(stamp);
        }

        let Some(event) = screen.poll_event(poll_interval)? else {
            continue;
        };

        match event {
            Event::Key(key) => match app.handle_input(key) {
                Flow::Continue => {}
                Flow::Quit => return Ok(None),
                Flow::Confirm => {
                    log::debug!("confirmed {:?}", app.selected_record());
                    let outcome = app.terminate_selected(sender);
                    screen.show_outcome(app, &outcome)?;
                    if outcome.needs_acknowledgement() {
                        screen.wait_for_key()?;
                    }
                    return Ok(Some(outcome));
                }
            },
            Event::Resize(..) => {
                app.resize(screen.viewport_height()?);
                last_drawn = None;
            }
            _ => {}
        }
    }
}

fn is_printable(c: char) -> bool {
    c == ' ' || c.is_ascii_graphic()
}
