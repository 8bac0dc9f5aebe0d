use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use crossterm::event::KeyCode;
use log::info;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState, Tabs, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::db::{add_student, schedule_lesson};
use crate::error::StoreError;
use crate::metrics::{calendar_events, CalendarEvent, CalendarOptions, CalendarView, Snapshot};

use super::forms::{LessonField, LessonForm, StudentField, StudentForm};
use super::helpers::{format_amount, surface_error, truncate};
use super::screens::{AgendaScreen, StudentTable};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the metric cards across the top.
const HEADER_HEIGHT: u16 = 4;
/// Height of the tab bar.
const TABS_HEIGHT: u16 = 3;

/// The three areas of the app, in tab-bar order.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Tab {
    Agenda,
    Schedule,
    Students,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Agenda, Tab::Schedule, Tab::Students];

    fn title(self) -> &'static str {
        match self {
            Tab::Agenda => "1 Agenda",
            Tab::Schedule => "2 Schedule",
            Tab::Students => "3 Students",
        }
    }

    fn index(self) -> usize {
        match self {
            Tab::Agenda => 0,
            Tab::Schedule => 1,
            Tab::Students => 2,
        }
    }

    fn step(self, forward: bool) -> Tab {
        let len = Tab::ALL.len();
        let idx = if forward {
            (self.index() + 1) % len
        } else {
            (self.index() + len - 1) % len
        };
        Tab::ALL[idx]
    }
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    snapshot: Snapshot,
    tab: Tab,
    agenda: AgendaScreen,
    lesson_form: LessonForm,
    student_form: StudentForm,
    students: StudentTable,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the app around an open store. `now` seeds the agenda and the
    /// lesson form defaults.
    pub fn new(conn: Connection, snapshot: Snapshot, now: NaiveDateTime) -> Self {
        Self {
            conn,
            snapshot,
            tab: Tab::Agenda,
            agenda: AgendaScreen::new(now.date(), CalendarOptions::default()),
            lesson_form: LessonForm::starting_at(now),
            student_form: StudentForm::default(),
            students: StudentTable::default(),
            status: None,
        }
    }

    /// Process one key press. Returns `true` when the app should exit.
    ///
    /// Validation problems stay inside the forms; storage failures are
    /// returned so the event loop stops.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        if let KeyCode::F(n) = code {
            let tab = n
                .checked_sub(1)
                .and_then(|idx| Tab::ALL.get(idx as usize).copied());
            if let Some(tab) = tab {
                self.switch_tab(tab);
            }
            return Ok(false);
        }

        match self.tab {
            Tab::Agenda => Ok(self.handle_agenda_key(code)),
            Tab::Schedule => {
                self.handle_schedule_key(code)?;
                Ok(false)
            }
            Tab::Students => {
                self.handle_students_key(code)?;
                Ok(false)
            }
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.clear_status();
            self.tab = tab;
        }
    }

    fn handle_agenda_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('1') => self.switch_tab(Tab::Agenda),
            KeyCode::Char('2') => self.switch_tab(Tab::Schedule),
            KeyCode::Char('3') => self.switch_tab(Tab::Students),
            KeyCode::Tab => self.switch_tab(self.tab.step(true)),
            KeyCode::BackTab => self.switch_tab(self.tab.step(false)),
            KeyCode::Left => self.agenda.shift(false),
            KeyCode::Right => self.agenda.shift(true),
            KeyCode::Char('t') | KeyCode::Char('T') => {
                self.agenda.jump_to(Local::now().date_naive());
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                self.agenda.toggle_view();
                let view = self.agenda.view.label();
                self.set_status(format!("{view} view."), StatusKind::Info);
            }
            _ => {}
        }
        false
    }

    fn handle_schedule_key(&mut self, code: KeyCode) -> Result<()> {
        let roster_len = self.snapshot.students.len();
        match code {
            KeyCode::Esc => self.switch_tab(Tab::Agenda),
            KeyCode::Tab | KeyCode::Down => self.lesson_form.cycle_field(true),
            KeyCode::BackTab | KeyCode::Up => self.lesson_form.cycle_field(false),
            KeyCode::Left if self.lesson_form.active == LessonField::Student => {
                self.lesson_form.cycle_student(-1, roster_len);
            }
            KeyCode::Right if self.lesson_form.active == LessonField::Student => {
                self.lesson_form.cycle_student(1, roster_len);
            }
            KeyCode::Backspace => self.lesson_form.backspace(),
            KeyCode::Enter => self.save_lesson()?,
            KeyCode::Char(ch) => {
                if self.lesson_form.push_char(ch) {
                    self.lesson_form.error = None;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_students_key(&mut self, code: KeyCode) -> Result<()> {
        let len = self.snapshot.students.len();
        match code {
            KeyCode::Esc => self.switch_tab(Tab::Agenda),
            KeyCode::Tab | KeyCode::Down => self.student_form.cycle_field(true),
            KeyCode::BackTab | KeyCode::Up => self.student_form.cycle_field(false),
            KeyCode::PageUp => self.students.move_selection(-5, len),
            KeyCode::PageDown => self.students.move_selection(5, len),
            KeyCode::Home => self.students.move_selection(-(len as isize), len),
            KeyCode::End => self.students.select_last(len),
            KeyCode::Backspace => self.student_form.backspace(),
            KeyCode::Enter => self.save_student()?,
            KeyCode::Char(ch) => {
                if self.student_form.push_char(ch) {
                    self.student_form.error = None;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn save_lesson(&mut self) -> Result<()> {
        let roster = self.snapshot.student_names();
        let (student, date, time, description) = match self.lesson_form.parse_inputs(&roster) {
            Ok(inputs) => inputs,
            Err(err) => {
                let message = surface_error(&err);
                self.lesson_form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                return Ok(());
            }
        };

        match schedule_lesson(&self.conn, student.as_deref(), date, time, &description) {
            Ok(lesson) => {
                info!("scheduled lesson {} for {}", lesson.id, lesson.student_name);
                self.reload()?;
                self.lesson_form.reset_after_save();
                self.agenda.jump_to(lesson.start_time.date());
                self.set_status(
                    format!(
                        "Lesson booked for {} on {}.",
                        lesson.student_name,
                        lesson.start_time.format("%d/%m/%Y at %H:%M")
                    ),
                    StatusKind::Info,
                );
                Ok(())
            }
            Err(StoreError::Validation(err)) => {
                let message = err.to_string();
                self.lesson_form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                Ok(())
            }
            Err(err) => Err(err).context("failed to schedule lesson"),
        }
    }

    fn save_student(&mut self) -> Result<()> {
        let (name, email, fee) = match self.student_form.parse_inputs() {
            Ok(inputs) => inputs,
            Err(err) => {
                let message = surface_error(&err);
                self.student_form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                return Ok(());
            }
        };

        match add_student(&self.conn, &name, &email, fee) {
            Ok(student) => {
                info!("registered student {}", student.id);
                self.reload()?;
                self.student_form = StudentForm::default();
                self.students.select_last(self.snapshot.students.len());
                self.set_status(format!("Added {}.", student.name), StatusKind::Info);
                Ok(())
            }
            Err(StoreError::Validation(err)) => {
                let message = err.to_string();
                self.student_form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                Ok(())
            }
            Err(err) => Err(err).context("failed to save student"),
        }
    }

    /// Re-read both tables after a write.
    fn reload(&mut self) -> Result<()> {
        self.snapshot = Snapshot::load(&self.conn).context("failed to reload data")?;
        self.lesson_form.clamp_student(self.snapshot.students.len());
        Ok(())
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Length(TABS_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);
        match self.tab {
            Tab::Agenda => self.draw_agenda(frame, chunks[2]),
            Tab::Schedule => self.draw_schedule(frame, chunks[2]),
            Tab::Students => self.draw_students(frame, chunks[2]),
        }
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let dashboard = &self.snapshot.dashboard;
        let cards = [
            ("Students", dashboard.total_students.to_string()),
            ("Lessons booked", dashboard.total_lessons.to_string()),
            ("Projected revenue", format_amount(dashboard.projected_revenue)),
        ];

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        for ((title, value), column) in cards.into_iter().zip(columns.iter()) {
            let card = Paragraph::new(Line::from(Span::styled(
                value,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(card, *column);
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = Tab::ALL.iter().map(|tab| Line::from(tab.title())).collect();
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_agenda(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({})", self.agenda.title(), self.agenda.view.label()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match self.agenda.view {
            CalendarView::Week => self.draw_week(frame, inner),
            CalendarView::Month => self.draw_month(frame, inner),
        }
    }

    fn draw_week(&self, frame: &mut Frame, area: Rect) {
        let today = Local::now().date_naive();
        let days = self.agenda.week_days();
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(days.iter().map(|_| Constraint::Ratio(1, days.len() as u32)))
            .split(area);

        for (day, column) in days.iter().zip(columns.iter()) {
            let mut block = Block::default()
                .borders(Borders::ALL)
                .title(day.format("%a %d").to_string());
            if *day == today {
                block = block.border_style(Style::default().fg(Color::Yellow));
            }
            let width = column.width.saturating_sub(2) as usize;
            let events = calendar_events(self.agenda.lessons_on(*day, &self.snapshot.lessons));
            let lines: Vec<Line> = events
                .iter()
                .map(|event| {
                    Line::from(Span::styled(
                        truncate(&event.label(), width),
                        event_style(event),
                    ))
                })
                .collect();
            frame.render_widget(Paragraph::new(lines).block(block), *column);
        }
    }

    fn draw_month(&self, frame: &mut Frame, area: Rect) {
        let entries = self.agenda.month_entries(&self.snapshot.lessons);
        if entries.is_empty() {
            let message = Paragraph::new("No lessons this month.").alignment(Alignment::Center);
            frame.render_widget(message, area);
            return;
        }

        let mut lines = Vec::new();
        for (day, lessons) in entries {
            lines.push(Line::from(Span::styled(
                day.format("%A, %d %B").to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for (lesson, event) in lessons.iter().zip(calendar_events(lessons.iter().copied())) {
                let mut spans = vec![
                    Span::raw("  "),
                    Span::styled(event.label(), event_style(&event)),
                ];
                if !lesson.description.is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", lesson.description),
                        Style::default().fg(Color::Gray),
                    ));
                }
                lines.push(Line::from(spans));
            }
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
    }

    fn draw_schedule(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Book a Lesson");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let roster = self.snapshot.student_names();
        let form = &self.lesson_form;
        let mut lines = vec![
            form.build_line("Student", LessonField::Student, &roster),
            form.build_line("Date", LessonField::Date, &roster),
            form.build_line("Time", LessonField::Time, &roster),
            form.build_line("Description", LessonField::Description, &roster),
            Line::from(""),
        ];

        if roster.is_empty() {
            lines.push(Line::from(Span::styled(
                "The roster is empty. Register students on the Students tab first.",
                Style::default().fg(Color::Yellow),
            )));
        }
        lines.push(form_hint(form.error.as_deref()));
        lines.push(Line::from(Span::styled(
            "Lessons last one hour.",
            Style::default().fg(Color::DarkGray),
        )));

        frame.render_widget(Paragraph::new(lines), inner);

        let cursor = match form.active {
            LessonField::Student => None,
            LessonField::Date => Some(("Date: ", LessonField::Date, 1)),
            LessonField::Time => Some(("Time: ", LessonField::Time, 2)),
            LessonField::Description => Some(("Description: ", LessonField::Description, 3)),
        };
        if let Some((prefix, field, row)) = cursor {
            let offset = prefix.len() + form.value_len(field);
            frame.set_cursor_position(cursor_in(inner, offset, row));
        }
    }

    fn draw_students(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area);

        let block = Block::default().borders(Borders::ALL).title("Register Student");
        let inner = block.inner(columns[0]);
        frame.render_widget(block, columns[0]);

        let form = &self.student_form;
        let lines = vec![
            form.build_line("Name", StudentField::Name),
            form.build_line("Email", StudentField::Email),
            form.build_line("Fee", StudentField::Fee),
            Line::from(""),
            form_hint(form.error.as_deref()),
        ];
        frame.render_widget(Paragraph::new(lines), inner);

        let (prefix, row) = match form.active {
            StudentField::Name => ("Name: ", 0),
            StudentField::Email => ("Email: ", 1),
            StudentField::Fee => ("Fee: ", 2),
        };
        let offset = prefix.len() + form.value_len(form.active);
        frame.set_cursor_position(cursor_in(inner, offset, row));

        self.draw_student_table(frame, columns[1]);
    }

    fn draw_student_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Students");
        if self.snapshot.students.is_empty() {
            let message = Paragraph::new("No students yet.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let header = Row::new(vec!["#", "Name", "Email", "Fee"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = self.snapshot.students.iter().map(|student| {
            Row::new(vec![
                student.id.to_string(),
                student.name.clone(),
                student.email.clone(),
                format_amount(student.fee),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Percentage(35),
                Constraint::Percentage(40),
                Constraint::Min(10),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().fg(Color::Yellow));

        let mut state = TableState::default().with_selected(Some(self.students.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match self.tab {
            Tab::Agenda => &[
                ("[←→]", " Previous/Next   "),
                ("[t]", " Today   "),
                ("[v]", " Week/Month   "),
                ("[1-3]", " Tabs   "),
                ("[q]", " Quit"),
            ],
            Tab::Schedule => &[
                ("[Tab]", " Next Field   "),
                ("[←→]", " Pick Student   "),
                ("[Enter]", " Book   "),
                ("[F1-F3]", " Tabs   "),
                ("[Esc]", " Agenda"),
            ],
            Tab::Students => &[
                ("[Tab]", " Next Field   "),
                ("[Enter]", " Add   "),
                ("[PgUp/PgDn]", " Scroll   "),
                ("[F1-F3]", " Tabs   "),
                ("[Esc]", " Agenda"),
            ],
        };
        let spans: Vec<Span<'static>> = keys
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    #[cfg(test)]
    fn current_tab(&self) -> Tab {
        self.tab
    }

    #[cfg(test)]
    fn agenda_anchor(&self) -> chrono::NaiveDate {
        self.agenda.anchor
    }
}

/// Colours an agenda entry with its event palette.
fn event_style(event: &CalendarEvent) -> Style {
    let background = event.background.parse::<Color>().unwrap_or(Color::Blue);
    Style::default().fg(Color::White).bg(background)
}

/// Cursor cell for a form line, pinned to the last column of `area` once the
/// text runs past it.
fn cursor_in(area: Rect, offset: usize, row: u16) -> (u16, u16) {
    let column = u16::try_from(offset).unwrap_or(u16::MAX);
    let x = area
        .x
        .saturating_add(column)
        .min(area.right().saturating_sub(1))
        .max(area.x);
    let y = area
        .y
        .saturating_add(row)
        .min(area.bottom().saturating_sub(1))
        .max(area.y);
    (x, y)
}

fn form_hint(error: Option<&str>) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            "Enter to save • Tab to switch • Esc to leave",
            Style::default().fg(Color::Gray),
        )),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::db::{add_student, list_lessons, list_students, open_in_memory};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn app_with(conn: Connection) -> App {
        let snapshot = Snapshot::load(&conn).unwrap();
        App::new(conn, snapshot, now())
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    #[test]
    fn registers_student_from_form() {
        let mut app = app_with(open_in_memory().unwrap());
        app.handle_key(KeyCode::Char('3')).unwrap();
        assert_eq!(app.current_tab(), Tab::Students);

        type_text(&mut app, "Ana");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "ana@x.com");
        app.handle_key(KeyCode::Enter).unwrap();

        let students = list_students(&app.conn).unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].fee, 100.0);
        assert_eq!(app.snapshot.dashboard.total_students, 1);
        assert_eq!(app.snapshot.dashboard.projected_revenue, 100.0);
        assert!(app.student_form.name.is_empty());
    }

    #[test]
    fn blank_student_stays_in_form() {
        let mut app = app_with(open_in_memory().unwrap());
        app.handle_key(KeyCode::F(3)).unwrap();
        type_text(&mut app, "Ana");
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(list_students(&app.conn).unwrap().is_empty());
        assert_eq!(
            app.student_form.error.as_deref(),
            Some("Student email is required.")
        );
        assert_eq!(app.student_form.name, "Ana");
    }

    #[test]
    fn booking_without_students_is_rejected() {
        let mut app = app_with(open_in_memory().unwrap());
        app.handle_key(KeyCode::Char('2')).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(list_lessons(&app.conn).unwrap().is_empty());
        assert_eq!(
            app.lesson_form.error.as_deref(),
            Some("No students registered yet. Add one on the Students tab.")
        );
    }

    #[test]
    fn storage_failure_stops_the_app() {
        let conn = open_in_memory().unwrap();
        add_student(&conn, "Ana", "ana@x.com", None).unwrap();
        let mut app = app_with(conn);
        app.conn.execute("DROP TABLE lessons", []).unwrap();

        app.handle_key(KeyCode::Char('2')).unwrap();
        let err = app.handle_key(KeyCode::Enter).unwrap_err();

        assert_eq!(err.to_string(), "failed to schedule lesson");
        assert!(err
            .chain()
            .any(|cause| cause.to_string().starts_with("failed to insert lesson")));
        assert!(app.lesson_form.error.is_none());
    }

    #[test]
    fn student_storage_failure_stops_the_app() {
        let mut app = app_with(open_in_memory().unwrap());
        app.conn.execute("DROP TABLE students", []).unwrap();

        app.handle_key(KeyCode::Char('3')).unwrap();
        type_text(&mut app, "Ana");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "ana@x.com");

        assert!(app.handle_key(KeyCode::Enter).is_err());
        assert!(app.student_form.error.is_none());
        assert_eq!(app.student_form.name, "Ana");
    }

    #[test]
    fn long_description_keeps_cursor_inside_form() {
        let conn = open_in_memory().unwrap();
        add_student(&conn, "Ana", "ana@x.com", None).unwrap();
        let mut app = app_with(conn);
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();

        app.handle_key(KeyCode::Char('2')).unwrap();
        for _ in 0..3 {
            app.handle_key(KeyCode::Tab).unwrap();
        }
        type_text(&mut app, &"long notes ".repeat(50));
        terminal.draw(|frame| app.draw(frame)).unwrap();

        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!((cursor.x, cursor.y), (118, 11));
    }

    #[test]
    fn cursor_is_clamped_to_area() {
        let area = Rect::new(1, 8, 40, 10);
        assert_eq!(cursor_in(area, 6, 1), (7, 9));
        assert_eq!(cursor_in(area, 500, 3), (40, 11));
        assert_eq!(cursor_in(area, usize::MAX, 50), (40, 17));
        assert_eq!(cursor_in(Rect::new(u16::MAX - 2, 0, 2, 1), 70_000, 0), (u16::MAX - 1, 0));
    }

    #[test]
    fn books_lesson_for_selected_student() {
        let conn = open_in_memory().unwrap();
        add_student(&conn, "Ana", "ana@x.com", None).unwrap();
        add_student(&conn, "Bruno", "b@x.com", None).unwrap();
        let mut app = app_with(conn);

        app.handle_key(KeyCode::Char('2')).unwrap();
        app.handle_key(KeyCode::Right).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        for _ in 0..10 {
            app.handle_key(KeyCode::Backspace).unwrap();
        }
        type_text(&mut app, "2024-02-05");
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "Geometry");
        app.handle_key(KeyCode::Enter).unwrap();

        let lessons = list_lessons(&app.conn).unwrap();
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].student_name, "Bruno");
        assert_eq!(lessons[0].start_text(), "2024-02-05T09:00:00");
        assert_eq!(lessons[0].end_text(), "2024-02-05T10:00:00");
        assert_eq!(lessons[0].description, "Geometry");
        assert_eq!(app.snapshot.dashboard.total_lessons, 1);
        assert_eq!(app.agenda_anchor(), NaiveDate::from_ymd_opt(2024, 2, 5).unwrap());
    }

    #[test]
    fn agenda_keys_quit_and_navigate() {
        let mut app = app_with(open_in_memory().unwrap());
        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.agenda_anchor(), NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn typing_q_in_a_form_does_not_quit() {
        let mut app = app_with(open_in_memory().unwrap());
        app.handle_key(KeyCode::Char('3')).unwrap();
        assert!(!app.handle_key(KeyCode::Char('q')).unwrap());
        assert_eq!(app.student_form.name, "q");
    }

    #[test]
    fn every_tab_renders() {
        let conn = open_in_memory().unwrap();
        add_student(&conn, "Ana", "ana@x.com", Some(150.0)).unwrap();
        let mut app = app_with(conn);
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();

        for key in [KeyCode::F(1), KeyCode::F(2), KeyCode::F(3)] {
            app.handle_key(key).unwrap();
            terminal.draw(|frame| app.draw(frame)).unwrap();
        }
        app.handle_key(KeyCode::F(1)).unwrap();
        app.handle_key(KeyCode::Char('v')).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
    }
}
