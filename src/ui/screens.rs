use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::metrics::{CalendarOptions, CalendarView};
use crate::models::Lesson;

/// State behind the agenda tab: which period is on screen and how it is cut.
pub(crate) struct AgendaScreen {
    pub(crate) view: CalendarView,
    /// Any day inside the period being shown.
    pub(crate) anchor: NaiveDate,
    pub(crate) options: CalendarOptions,
}

impl AgendaScreen {
    pub(crate) fn new(today: NaiveDate, options: CalendarOptions) -> Self {
        Self {
            view: options.initial_view,
            anchor: today,
            options,
        }
    }

    pub(crate) fn toggle_view(&mut self) {
        self.view = self.view.toggled();
    }

    pub(crate) fn jump_to(&mut self, today: NaiveDate) {
        self.anchor = today;
    }

    /// Move one period forward or back.
    pub(crate) fn shift(&mut self, forward: bool) {
        let next = match (self.view, forward) {
            (CalendarView::Week, true) => self.anchor.checked_add_signed(Duration::days(7)),
            (CalendarView::Week, false) => self.anchor.checked_sub_signed(Duration::days(7)),
            (CalendarView::Month, true) => self.anchor.checked_add_months(Months::new(1)),
            (CalendarView::Month, false) => self.anchor.checked_sub_months(Months::new(1)),
        };
        if let Some(next) = next {
            self.anchor = next;
        }
    }

    /// Monday through Sunday of the anchored week.
    pub(crate) fn week_days(&self) -> Vec<NaiveDate> {
        let offset = self.anchor.weekday().num_days_from_monday() as i64;
        let monday = self.anchor - Duration::days(offset);
        monday.iter_days().take(7).collect()
    }

    fn month_bounds(&self) -> (NaiveDate, NaiveDate) {
        let first = self.anchor.with_day(1).unwrap_or(self.anchor);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first);
        (first, last)
    }

    /// Heading shown above the agenda.
    pub(crate) fn title(&self) -> String {
        match self.view {
            CalendarView::Week => {
                let days = self.week_days();
                format!(
                    "Week of {} – {}",
                    days[0].format("%d %b %Y"),
                    days[6].format("%d %b %Y")
                )
            }
            CalendarView::Month => self.anchor.format("%B %Y").to_string(),
        }
    }

    /// Lessons starting on `day` within the visible hours, earliest first.
    pub(crate) fn lessons_on<'a>(&self, day: NaiveDate, lessons: &'a [Lesson]) -> Vec<&'a Lesson> {
        let mut found: Vec<&Lesson> = lessons
            .iter()
            .filter(|lesson| lesson.start_time.date() == day && self.options.shows(lesson))
            .collect();
        found.sort_by_key(|lesson| lesson.start_time);
        found
    }

    /// Days of the anchored month that have at least one lesson, in date
    /// order. The month list ignores the visible-hours window.
    pub(crate) fn month_entries<'a>(
        &self,
        lessons: &'a [Lesson],
    ) -> Vec<(NaiveDate, Vec<&'a Lesson>)> {
        let (first, last) = self.month_bounds();
        let mut days: BTreeMap<NaiveDate, Vec<&Lesson>> = BTreeMap::new();
        for lesson in lessons {
            let day = lesson.start_time.date();
            if day >= first && day <= last {
                days.entry(day).or_default().push(lesson);
            }
        }
        days.into_iter()
            .map(|(day, mut entries)| {
                entries.sort_by_key(|lesson| lesson.start_time);
                (day, entries)
            })
            .collect()
    }
}

/// Selection over the student table.
#[derive(Default)]
pub(crate) struct StudentTable {
    pub(crate) selected: usize,
}

impl StudentTable {
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len as isize {
            new = len as isize - 1;
        }
        self.selected = new as usize;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }
}
