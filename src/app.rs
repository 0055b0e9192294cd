use std::ffi::{OsStr, OsString};

use ratatui::backend::Backend;

use crate::error::{AppError, Result};
use crate::event::Event;
use crate::fs::listing::{self, Entry};
use crate::fs::navigator::Navigator;
use crate::viewport::Viewport;

/// What the event loop must do after an event has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Keep reading events.
    Continue,
    /// Hand the terminal to the external viewer for this entry, then call
    /// [`App::finish_view`].
    View(OsString),
    /// Leave the loop.
    Quit,
}

/// Browser state: the navigator cursor, the viewport, and the hidden filter.
///
/// Sole owner and writer of both; the event loop feeds it one event at a
/// time. `entries[i]` is the entry drawn as the viewport's line `i`.
pub struct App<B: Backend> {
    navigator: Navigator,
    viewport: Viewport<B>,
    entries: Vec<Entry>,
    show_hidden: bool,
}

impl<B: Backend> App<B> {
    pub fn new(navigator: Navigator, viewport: Viewport<B>, show_hidden: bool) -> Self {
        Self {
            navigator,
            viewport,
            entries: Vec::new(),
            show_hidden,
        }
    }

    /// List the cursor directory and display it with a fresh selection.
    pub fn start(&mut self) -> Result<()> {
        self.entries = self.navigator.list(self.show_hidden)?;
        let preview = self.preview_of(self.entries.first())?;
        let lines = listing::display_lines(&self.entries);
        self.viewport
            .display(self.navigator.header(), lines, preview)
    }

    /// Act on one event to completion.
    pub fn handle(&mut self, event: Event) -> Result<Action> {
        self.viewport.clear_status();
        match event {
            Event::Reselect(direction) => {
                self.viewport.move_selection(direction)?;
                self.refresh()?;
            }
            Event::Select => return self.select(),
            Event::ToggleHidden => {
                self.show_hidden = !self.show_hidden;
                log::debug!("show hidden entries: {}", self.show_hidden);
                self.start()?;
            }
            Event::Resize => self.refresh()?,
            Event::Quit => return Ok(Action::Quit),
            Event::DriverError(msg) => return Err(AppError::Terminal(msg)),
        }
        Ok(Action::Continue)
    }

    /// Run the external viewer on `name`. The caller owns terminal handoff.
    pub fn view(&self, name: &OsStr) -> Result<()> {
        self.navigator.view_externally(name)
    }

    /// Restart the browser at the current directory after the viewer exited.
    ///
    /// Viewer failures are reported in the footer; anything else is returned.
    pub fn finish_view(&mut self, outcome: Result<()>) -> Result<()> {
        self.viewport.clear()?;
        self.start()?;
        match outcome {
            Ok(()) => Ok(()),
            Err(err @ AppError::ExternalProcess(_)) => {
                log::warn!("{err}");
                self.viewport.set_status(err.to_string(), true);
                self.viewport.redraw()
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(test)]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[cfg(test)]
    pub fn viewport(&self) -> &Viewport<B> {
        &self.viewport
    }

    #[cfg(test)]
    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    #[cfg(test)]
    pub fn viewport_mut(&mut self) -> &mut Viewport<B> {
        &mut self.viewport
    }

    fn highlighted(&self) -> Option<&Entry> {
        self.entries.get(self.viewport.selected_index())
    }

    fn select(&mut self) -> Result<Action> {
        let Some(selected) = self.highlighted().cloned() else {
            return Ok(Action::Continue);
        };
        if !selected.is_dir {
            return Ok(Action::View(selected.name));
        }

        match self.navigator.enter(&selected) {
            Ok(()) => {
                log::info!("entered {}", self.navigator.header());
                self.start()?;
            }
            Err(err) if err.is_rejected_move() => {
                log::warn!("move to {} rejected: {err}", selected.display());
                self.viewport.set_status(err.to_string(), true);
                self.viewport.redraw()?;
            }
            Err(err) => return Err(err),
        }
        Ok(Action::Continue)
    }

    /// Regenerate the preview for the highlighted entry and draw.
    fn refresh(&mut self) -> Result<()> {
        let preview = self.preview_of(self.highlighted())?;
        self.viewport.render(preview)
    }

    fn preview_of(&self, highlighted: Option<&Entry>) -> Result<Vec<String>> {
        let Some(entry) = highlighted else {
            return Ok(Vec::new());
        };
        let rows = self.viewport.preview_height()?;
        if entry.is_dir {
            self.navigator
                .list_first_n(entry.name(), rows, self.show_hidden)
        } else {
            self.navigator.read_first_n(entry.name(), rows)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EMPTY_DIRECTORY_LINE;
    use crate::viewport::Direction;
    use ratatui::{backend::TestBackend, Terminal};
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn setup_app(viewer: &str) -> (TempDir, App<TestBackend>) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        File::create(dir.path().join("alpha").join("inner.txt")).unwrap();
        fs::write(dir.path().join("notes.txt"), "first\nsecond\n").unwrap();
        File::create(dir.path().join(".hidden")).unwrap();

        let navigator = Navigator::open(dir.path().to_str().unwrap(), viewer).unwrap();
        let terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let viewport = Viewport::new(terminal, vec!["q quit".to_string()]);
        let mut app = App::new(navigator, viewport, false);
        app.start().unwrap();
        (dir, app)
    }

    /// Move the selection down until `name` is highlighted.
    fn highlight(app: &mut App<TestBackend>, name: &str) {
        while app.viewport().current_selected() != Some(name) {
            let before = app.viewport().selected_index();
            app.handle(Event::Reselect(Direction::Down)).unwrap();
            assert_ne!(before, app.viewport().selected_index(), "{name} not listed");
        }
    }

    fn sorted(lines: &[String]) -> Vec<String> {
        let mut v = lines.to_vec();
        v.sort();
        v
    }

    #[test]
    fn start_lists_cursor_directory() {
        let (dir, app) = setup_app("true");
        assert_eq!(app.viewport().header(), dir.path().to_string_lossy());
        assert_eq!(app.viewport().lines()[0], "../");
        assert_eq!(
            sorted(app.viewport().lines()),
            vec!["../", "alpha/", "empty/", "notes.txt"]
        );
        assert_eq!(app.viewport().selected_index(), 0);
    }

    #[test]
    fn reselect_regenerates_preview() {
        let (_dir, mut app) = setup_app("true");
        highlight(&mut app, "notes.txt");
        assert_eq!(app.viewport().preview(), &["first", "second"]);

        highlight_from_top(&mut app, "alpha/");
        assert_eq!(app.viewport().preview(), &["inner.txt"]);

        highlight_from_top(&mut app, "empty/");
        assert_eq!(app.viewport().preview(), &[EMPTY_DIRECTORY_LINE]);
    }

    fn highlight_from_top(app: &mut App<TestBackend>, name: &str) {
        while app.viewport().selected_index() > 0 {
            app.handle(Event::Reselect(Direction::Up)).unwrap();
        }
        highlight(app, name);
    }

    #[test]
    fn select_directory_enters_it() {
        let (dir, mut app) = setup_app("true");
        highlight(&mut app, "alpha/");
        assert_eq!(app.handle(Event::Select).unwrap(), Action::Continue);
        assert_eq!(app.navigator().current_path(), dir.path().join("alpha"));
        assert_eq!(app.viewport().lines(), &["../", "inner.txt"]);
        assert_eq!(app.viewport().selected_index(), 0);
    }

    #[test]
    fn select_parent_goes_up() {
        let (dir, mut app) = setup_app("true");
        highlight(&mut app, "alpha/");
        app.handle(Event::Select).unwrap();
        // "../" is the first row after entering.
        app.handle(Event::Select).unwrap();
        assert_eq!(app.navigator().current_path(), dir.path());
    }

    #[test]
    fn select_file_requests_viewer() {
        let (_dir, mut app) = setup_app("true");
        highlight(&mut app, "notes.txt");
        assert_eq!(
            app.handle(Event::Select).unwrap(),
            Action::View("notes.txt".into())
        );
    }

    #[test]
    fn select_vanished_directory_reports_and_stays() {
        let (dir, mut app) = setup_app("true");
        highlight(&mut app, "empty/");
        fs::remove_dir(dir.path().join("empty")).unwrap();

        assert_eq!(app.handle(Event::Select).unwrap(), Action::Continue);
        assert_eq!(app.navigator().current_path(), dir.path());
        assert!(app.viewport().status().unwrap().contains("Not found"));

        // The message lasts until the next event.
        app.handle(Event::ToggleHidden).unwrap();
        assert!(app.viewport().status().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn select_unreadable_directory_reports_and_stays() {
        use std::os::unix::fs::PermissionsExt;
        let (dir, mut app) = setup_app("true");
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Running with privileges that bypass permission bits.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }
        app.start().unwrap();
        highlight(&mut app, "locked/");
        let outcome = app.handle(Event::Select);
        let status = app.viewport().status().map(str::to_string);
        let cursor = app.navigator().current_path().to_path_buf();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(outcome.unwrap(), Action::Continue);
        assert_eq!(cursor, dir.path());
        assert!(status.unwrap().starts_with("Permission denied"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_entries_preview_and_open() {
        use std::os::unix::ffi::OsStrExt;
        let (dir, mut app) = setup_app("true");
        let file = OsStr::from_bytes(b"caf\xe9.txt");
        let sub = OsStr::from_bytes(b"d\xff");
        fs::write(dir.path().join(file), "bonjour\n").unwrap();
        fs::create_dir(dir.path().join(sub)).unwrap();
        File::create(dir.path().join(sub).join("inner")).unwrap();
        app.start().unwrap();

        highlight(&mut app, "caf\u{FFFD}.txt");
        assert_eq!(app.viewport().preview(), &["bonjour"]);
        assert_eq!(
            app.handle(Event::Select).unwrap(),
            Action::View(file.to_os_string())
        );

        highlight_from_top(&mut app, "d\u{FFFD}/");
        assert_eq!(app.viewport().preview(), &["inner"]);
        assert_eq!(app.handle(Event::Select).unwrap(), Action::Continue);
        assert_eq!(app.navigator().current_path(), dir.path().join(sub));
        assert!(app.viewport().status().is_none());
    }

    #[test]
    fn toggle_hidden_twice_restores_listing() {
        let (_dir, mut app) = setup_app("true");
        let before = app.viewport().lines().to_vec();

        app.handle(Event::ToggleHidden).unwrap();
        assert!(app.show_hidden());
        assert!(app.viewport().lines().contains(&".hidden".to_string()));

        app.handle(Event::ToggleHidden).unwrap();
        assert!(!app.show_hidden());
        assert_eq!(app.viewport().lines(), before.as_slice());
    }

    #[test]
    fn resize_keeps_selection_and_directory() {
        let (dir, mut app) = setup_app("true");
        app.handle(Event::Reselect(Direction::Down)).unwrap();
        app.viewport_mut().backend_mut().resize(30, 6);
        app.handle(Event::Resize).unwrap();
        assert_eq!(app.viewport().selected_index(), 1);
        assert_eq!(app.navigator().current_path(), dir.path());
    }

    #[test]
    fn quit_ends_loop() {
        let (_dir, mut app) = setup_app("true");
        assert_eq!(app.handle(Event::Quit).unwrap(), Action::Quit);
    }

    #[test]
    fn driver_error_is_fatal() {
        let (_dir, mut app) = setup_app("true");
        let err = app.handle(Event::DriverError("tty lost".into())).unwrap_err();
        assert!(matches!(err, AppError::Terminal(_)));
    }

    #[cfg(unix)]
    #[test]
    fn finish_view_restarts_fresh() {
        let (dir, mut app) = setup_app("true");
        highlight(&mut app, "notes.txt");
        let Action::View(name) = app.handle(Event::Select).unwrap() else {
            panic!("expected a view action");
        };
        let outcome = app.view(&name);
        assert!(outcome.is_ok());
        app.finish_view(outcome).unwrap();
        assert_eq!(app.navigator().current_path(), dir.path());
        assert_eq!(app.viewport().selected_index(), 0);
        assert!(app.viewport().status().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn finish_view_reports_viewer_failure() {
        let (_dir, mut app) = setup_app("false");
        highlight(&mut app, "notes.txt");
        let outcome = app.view(OsStr::new("notes.txt"));
        app.finish_view(outcome).unwrap();
        assert!(app
            .viewport()
            .status()
            .unwrap()
            .starts_with("External viewer failed"));
    }

    #[test]
    fn finish_view_propagates_other_errors() {
        let (_dir, mut app) = setup_app("true");
        let err = app
            .finish_view(Err(AppError::Terminal("gone".into())))
            .unwrap_err();
        assert!(matches!(err, AppError::Terminal(_)));
    }
}
