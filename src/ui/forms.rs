use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::DEFAULT_FEE;

/// Internal representation of the student registration form.
#[derive(Clone)]
pub(crate) struct StudentForm {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) fee: String,
    pub(crate) active: StudentField,
    pub(crate) error: Option<String>,
}

/// Fields available within the student form.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum StudentField {
    Name,
    Email,
    Fee,
}

impl Default for StudentForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            fee: format!("{DEFAULT_FEE:.1}"),
            active: StudentField::Name,
            error: None,
        }
    }
}

impl StudentForm {
    /// Move focus forward (or backward) through name → email → fee.
    pub(crate) fn cycle_field(&mut self, forward: bool) {
        self.active = match (self.active, forward) {
            (StudentField::Name, true) => StudentField::Email,
            (StudentField::Email, true) => StudentField::Fee,
            (StudentField::Fee, true) => StudentField::Name,
            (StudentField::Name, false) => StudentField::Fee,
            (StudentField::Email, false) => StudentField::Name,
            (StudentField::Fee, false) => StudentField::Email,
        };
    }

    /// Append a character to the active field. The fee only takes digits and
    /// a single decimal point.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            StudentField::Name => self.name.push(ch),
            StudentField::Email => self.email.push(ch),
            StudentField::Fee => {
                let is_point = ch == '.' || ch == ',';
                if ch.is_ascii_digit() {
                    self.fee.push(ch);
                } else if is_point && !self.fee.contains('.') {
                    self.fee.push('.');
                } else {
                    return false;
                }
            }
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            StudentField::Name => {
                self.name.pop();
            }
            StudentField::Email => {
                self.email.pop();
            }
            StudentField::Fee => {
                self.fee.pop();
            }
        }
    }

    /// Trim the text fields and parse the fee. Blank name/email are left for
    /// the store to reject; an empty fee means "use the default".
    pub(crate) fn parse_inputs(&self) -> Result<(String, String, Option<f64>)> {
        let fee_raw = self.fee.trim();
        let fee = if fee_raw.is_empty() {
            None
        } else {
            Some(
                fee_raw
                    .parse::<f64>()
                    .map_err(|_| anyhow!("Fee must be a number."))?,
            )
        };
        Ok((
            self.name.trim().to_string(),
            self.email.trim().to_string(),
            fee,
        ))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: StudentField) -> Line<'static> {
        let value = match field {
            StudentField::Name => &self.name,
            StudentField::Email => &self.email,
            StudentField::Fee => &self.fee,
        };
        let placeholder = match field {
            StudentField::Fee => "<default>",
            _ => "<required>",
        };
        field_line(field_name, value, placeholder, self.active == field)
    }

    pub(crate) fn value_len(&self, field: StudentField) -> usize {
        match field {
            StudentField::Name => self.name.chars().count(),
            StudentField::Email => self.email.chars().count(),
            StudentField::Fee => self.fee.chars().count(),
        }
    }
}

/// Form state for booking a lesson.
#[derive(Clone)]
pub(crate) struct LessonForm {
    /// Index into the roster; meaningless while the roster is empty.
    pub(crate) student: usize,
    pub(crate) date: String,
    pub(crate) time: String,
    pub(crate) description: String,
    pub(crate) active: LessonField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum LessonField {
    Student,
    Date,
    Time,
    Description,
}

impl LessonForm {
    /// Start with today's date and the current hour.
    pub(crate) fn starting_at(now: NaiveDateTime) -> Self {
        Self {
            student: 0,
            date: now.date().format("%Y-%m-%d").to_string(),
            time: format!("{:02}:00", now.time().hour()),
            description: String::new(),
            active: LessonField::Student,
            error: None,
        }
    }

    /// Clear the per-lesson fields after a successful booking while keeping
    /// the selected student and date for the next one.
    pub(crate) fn reset_after_save(&mut self) {
        self.description.clear();
        self.error = None;
        self.active = LessonField::Student;
    }

    pub(crate) fn cycle_field(&mut self, forward: bool) {
        self.active = match (self.active, forward) {
            (LessonField::Student, true) => LessonField::Date,
            (LessonField::Date, true) => LessonField::Time,
            (LessonField::Time, true) => LessonField::Description,
            (LessonField::Description, true) => LessonField::Student,
            (LessonField::Student, false) => LessonField::Description,
            (LessonField::Date, false) => LessonField::Student,
            (LessonField::Time, false) => LessonField::Date,
            (LessonField::Description, false) => LessonField::Time,
        };
    }

    /// Step through the roster, wrapping at both ends.
    pub(crate) fn cycle_student(&mut self, delta: isize, roster_len: usize) {
        if roster_len == 0 {
            self.student = 0;
            return;
        }
        let len = roster_len as isize;
        let current = (self.student.min(roster_len - 1)) as isize;
        self.student = (current + delta).rem_euclid(len) as usize;
    }

    /// Keep the selection valid after the roster was reloaded.
    pub(crate) fn clamp_student(&mut self, roster_len: usize) {
        if roster_len == 0 {
            self.student = 0;
        } else if self.student >= roster_len {
            self.student = roster_len - 1;
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            LessonField::Student => false,
            LessonField::Date => push_if(&mut self.date, ch, |c| c.is_ascii_digit() || c == '-'),
            LessonField::Time => push_if(&mut self.time, ch, |c| c.is_ascii_digit() || c == ':'),
            LessonField::Description => push_if(&mut self.description, ch, |c| !c.is_control()),
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            LessonField::Student => {}
            LessonField::Date => {
                self.date.pop();
            }
            LessonField::Time => {
                self.time.pop();
            }
            LessonField::Description => {
                self.description.pop();
            }
        }
    }

    /// Resolve the selected student and parse the date and time. A missing
    /// selection comes back as `None` so the store can reject it.
    pub(crate) fn parse_inputs(
        &self,
        roster: &[String],
    ) -> Result<(Option<String>, NaiveDate, NaiveTime, String)> {
        let student = roster.get(self.student).cloned();
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .context("Date must look like YYYY-MM-DD.")?;
        let time_raw = self.time.trim();
        let time = NaiveTime::parse_from_str(time_raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time_raw, "%H:%M:%S"))
            .context("Time must look like HH:MM.")?;
        Ok((student, date, time, self.description.trim().to_string()))
    }

    /// Render one form line. The student line shows the current selection
    /// from `roster` or a warning when nobody is registered.
    pub(crate) fn build_line(
        &self,
        field_name: &str,
        field: LessonField,
        roster: &[String],
    ) -> Line<'static> {
        let is_active = self.active == field;
        match field {
            LessonField::Student => {
                let Some(name) = roster.get(self.student) else {
                    return Line::from(vec![
                        Span::raw(format!("{field_name}: ")),
                        Span::styled(
                            "<no students registered>".to_string(),
                            Style::default().fg(Color::Red),
                        ),
                    ]);
                };
                let style = if is_active {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::raw(format!("{field_name}: ")),
                    Span::styled(format!("◀ {name} ▶"), style),
                ])
            }
            LessonField::Date => field_line(field_name, &self.date, "YYYY-MM-DD", is_active),
            LessonField::Time => field_line(field_name, &self.time, "HH:MM", is_active),
            LessonField::Description => {
                field_line(field_name, &self.description, "<optional>", is_active)
            }
        }
    }

    pub(crate) fn value_len(&self, field: LessonField) -> usize {
        match field {
            LessonField::Student => 0,
            LessonField::Date => self.date.chars().count(),
            LessonField::Time => self.time.chars().count(),
            LessonField::Description => self.description.chars().count(),
        }
    }
}

fn push_if(target: &mut String, ch: char, allowed: impl Fn(char) -> bool) -> bool {
    if allowed(ch) {
        target.push(ch);
        true
    } else {
        false
    }
}

fn field_line(field_name: &str, value: &str, placeholder: &str, is_active: bool) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(9, 41, 0)
            .unwrap()
    }

    #[test]
    fn student_form_prefills_default_fee() {
        let form = StudentForm::default();
        assert_eq!(form.fee, "100.0");
        let (_, _, fee) = form.parse_inputs().unwrap();
        assert_eq!(fee, Some(100.0));
    }

    #[test]
    fn fee_field_accepts_one_decimal_point() {
        let mut form = StudentForm::default();
        form.fee.clear();
        form.active = StudentField::Fee;
        for ch in "12a.5,0".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.fee, "12.50");
    }

    #[test]
    fn empty_fee_means_default() {
        let mut form = StudentForm::default();
        form.fee.clear();
        assert_eq!(form.parse_inputs().unwrap().2, None);
    }

    #[test]
    fn lone_point_fee_is_an_error() {
        let mut form = StudentForm::default();
        form.fee = ".".into();
        assert!(form.parse_inputs().is_err());
    }

    #[test]
    fn student_form_trims_text() {
        let mut form = StudentForm::default();
        form.name = "  Ana ".into();
        form.email = " ana@x.com".into();
        let (name, email, _) = form.parse_inputs().unwrap();
        assert_eq!((name.as_str(), email.as_str()), ("Ana", "ana@x.com"));
    }

    #[test]
    fn student_fields_cycle_both_ways() {
        let mut form = StudentForm::default();
        form.cycle_field(true);
        assert_eq!(form.active, StudentField::Email);
        form.cycle_field(false);
        form.cycle_field(false);
        assert_eq!(form.active, StudentField::Fee);
    }

    #[test]
    fn lesson_form_starts_on_the_hour() {
        let form = LessonForm::starting_at(now());
        assert_eq!(form.date, "2024-01-10");
        assert_eq!(form.time, "09:00");
    }

    #[test]
    fn lesson_form_parses_selection_and_slot() {
        let mut form = LessonForm::starting_at(now());
        form.description = " Fractions ".into();
        let roster = vec!["Ana".to_string(), "Bruno".to_string()];
        form.cycle_student(1, roster.len());

        let (student, date, time, description) = form.parse_inputs(&roster).unwrap();
        assert_eq!(student.as_deref(), Some("Bruno"));
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(description, "Fractions");
    }

    #[test]
    fn empty_roster_yields_no_selection() {
        let form = LessonForm::starting_at(now());
        let (student, ..) = form.parse_inputs(&[]).unwrap();
        assert!(student.is_none());
    }

    #[test]
    fn student_selection_wraps() {
        let mut form = LessonForm::starting_at(now());
        form.cycle_student(-1, 3);
        assert_eq!(form.student, 2);
        form.cycle_student(1, 3);
        assert_eq!(form.student, 0);
        form.cycle_student(1, 0);
        assert_eq!(form.student, 0);
    }

    #[test]
    fn bad_date_or_time_is_reported() {
        let roster = vec!["Ana".to_string()];
        let mut form = LessonForm::starting_at(now());
        form.date = "2024-13-01".into();
        assert!(form.parse_inputs(&roster).is_err());

        let mut form = LessonForm::starting_at(now());
        form.time = "25:00".into();
        assert!(form.parse_inputs(&roster).is_err());
    }

    #[test]
    fn date_and_time_fields_filter_characters() {
        let mut form = LessonForm::starting_at(now());
        form.active = LessonField::Date;
        assert!(!form.push_char('x'));
        form.active = LessonField::Time;
        assert!(form.push_char(':'));
        form.active = LessonField::Student;
        assert!(!form.push_char('a'));
    }
}
