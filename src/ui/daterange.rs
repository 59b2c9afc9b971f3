use chrono::{Datelike, Duration, Local, NaiveDate};
use dioxus::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPhase {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetRange {
    Today,
    Last7Days,
    Last30Days,
    ThisMonth,
}

impl PresetRange {
    pub const ALL: [PresetRange; 4] = [
        PresetRange::Today,
        PresetRange::Last7Days,
        PresetRange::Last30Days,
        PresetRange::ThisMonth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PresetRange::Today => "Today",
            PresetRange::Last7Days => "Last 7 Days",
            PresetRange::Last30Days => "Last 30 Days",
            PresetRange::ThisMonth => "This Month",
        }
    }

    pub fn resolve(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            PresetRange::Today => (today, today),
            PresetRange::Last7Days => (today - Duration::days(6), today),
            PresetRange::Last30Days => (today - Duration::days(29), today),
            PresetRange::ThisMonth => (today.with_day(1).unwrap_or(today), today),
        }
    }
}

/// Calendar picker state. Drafting is free while the popup is open; the
/// committed range only changes on apply or a preset click, and cancel
/// restores whatever was active when the popup opened.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRangePicker {
    pub open: bool,
    pub phase: PickPhase,
    pub draft_start: Option<NaiveDate>,
    pub draft_end: Option<NaiveDate>,
    pub committed: (Option<NaiveDate>, Option<NaiveDate>),
    snapshot: (Option<NaiveDate>, Option<NaiveDate>),
    pub visible_month: NaiveDate,
}

impl DateRangePicker {
    pub fn new(today: NaiveDate) -> Self {
        DateRangePicker {
            open: false,
            phase: PickPhase::Start,
            draft_start: None,
            draft_end: None,
            committed: (None, None),
            snapshot: (None, None),
            visible_month: today.with_day(1).unwrap_or(today),
        }
    }

    pub fn open_with(&mut self, range: (Option<NaiveDate>, Option<NaiveDate>), today: NaiveDate) {
        self.committed = range;
        self.snapshot = range;
        self.draft_start = range.0;
        self.draft_end = range.1;
        self.phase = PickPhase::Start;
        self.visible_month = range.0.unwrap_or(today).with_day(1).unwrap_or(today);
        self.open = true;
    }

    /// Free-form drafting. A fresh click begins a range, the second click
    /// closes it with the bounds ordered whatever the click order was, and a
    /// third click starts over.
    pub fn click_day(&mut self, day: NaiveDate) {
        match self.phase {
            PickPhase::Start => {
                self.draft_start = Some(day);
                self.draft_end = None;
                self.phase = PickPhase::End;
            }
            PickPhase::End => match self.draft_start {
                Some(start) if self.draft_end.is_none() => {
                    if day < start {
                        self.draft_start = Some(day);
                        self.draft_end = Some(start);
                    } else {
                        self.draft_end = Some(day);
                    }
                }
                _ => {
                    self.draft_start = Some(day);
                    self.draft_end = None;
                }
            },
        }
    }

    /// Commits the draft and closes. The returned range is what the filter
    /// should now carry.
    pub fn apply(&mut self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let mut range = (self.draft_start, self.draft_end);
        if let (Some(start), Some(end)) = range {
            if start > end {
                range = (Some(end), Some(start));
            }
        }
        self.committed = range;
        self.open = false;
        range
    }

    /// Closes without committing; the active range stays what it was when
    /// the popup opened.
    pub fn cancel(&mut self) {
        self.committed = self.snapshot;
        self.draft_start = self.snapshot.0;
        self.draft_end = self.snapshot.1;
        self.phase = PickPhase::Start;
        self.open = false;
    }

    /// Preset shortcut: commits and closes in one step.
    pub fn preset(&mut self, preset: PresetRange, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let (start, end) = preset.resolve(today);
        self.committed = (Some(start), Some(end));
        self.draft_start = Some(start);
        self.draft_end = Some(end);
        self.open = false;
        (start, end)
    }

    pub fn prev_month(&mut self) {
        let first = self.visible_month;
        self.visible_month = (first - Duration::days(1)).with_day(1).unwrap_or(first);
    }

    pub fn next_month(&mut self) {
        let first = self.visible_month;
        self.visible_month = (first + Duration::days(32)).with_day(1).unwrap_or(first);
    }
}

/// Cells for a Monday-first month grid: leading blanks, then every day of
/// the visible month.
pub fn month_grid(month_first: NaiveDate) -> Vec<Option<NaiveDate>> {
    let offset = month_first.weekday().num_days_from_monday() as usize;
    let mut cells: Vec<Option<NaiveDate>> = vec![None; offset];
    let mut day = month_first;
    while day.month() == month_first.month() {
        cells.push(Some(day));
        day += Duration::days(1);
    }
    cells
}

fn format_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    match (start, end) {
        (None, None) => "Any time".to_string(),
        (Some(start), None) => format!("{} onward", start.format("%Y-%m-%d")),
        (None, Some(end)) => format!("up to {}", end.format("%Y-%m-%d")),
        (Some(start), Some(end)) => {
            format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
        }
    }
}

#[component]
pub fn DateRangeField(
    label: String,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    on_change: EventHandler<(Option<NaiveDate>, Option<NaiveDate>)>,
) -> Element {
    let today = Local::now().date_naive();
    let mut picker = use_signal(|| DateRangePicker::new(today));

    let state = picker();
    let grid = month_grid(state.visible_month);
    let month_label = state.visible_month.format("%B %Y").to_string();
    let summary = format_range(start, end);
    let draft_start = state.draft_start;
    let draft_end = state.draft_end;

    rsx! {
        div {
            style: "position: relative; display: inline-flex; align-items: center; gap: 6px;",
            span { "{label}" }
            button {
                style: "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;",
                onclick: move |event| {
                    event.stop_propagation();
                    if picker().open {
                        picker.write().cancel();
                    } else {
                        picker.write().open_with((start, end), today);
                    }
                },
                "{summary}"
            }
            button {
                style: "border: none; background: transparent; cursor: pointer;",
                onclick: move |_| {
                    picker.write().cancel();
                    on_change.call((None, None));
                },
                "✕"
            }
        }

        if state.open {
            div {
                style: "position: absolute; margin-top: 28px; background: #fff; border: 1px solid #bbb; border-radius: 8px; box-shadow: 0 10px 24px rgba(0,0,0,0.15); z-index: 1200; padding: 10px; min-width: 260px;",
                onclick: move |event| event.stop_propagation(),

                div {
                    style: "display: flex; gap: 6px; flex-wrap: wrap; margin-bottom: 8px;",
                    for preset in PresetRange::ALL {
                        button {
                            style: "border: 1px solid #bbb; background: #f7f7f7; padding: 2px 8px; border-radius: 6px; cursor: pointer;",
                            onclick: move |_| {
                                let (from, to) = picker.write().preset(preset, today);
                                on_change.call((Some(from), Some(to)));
                            },
                            "{preset.label()}"
                        }
                    }
                }

                div {
                    style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 6px;",
                    button {
                        style: "border: none; background: transparent; cursor: pointer;",
                        onclick: move |_| picker.write().prev_month(),
                        "<"
                    }
                    span { "{month_label}" }
                    button {
                        style: "border: none; background: transparent; cursor: pointer;",
                        onclick: move |_| picker.write().next_month(),
                        ">"
                    }
                }

                div {
                    style: "display: grid; grid-template-columns: repeat(7, 1fr); gap: 2px;",
                    for weekday in ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"] {
                        span {
                            style: "text-align: center; font-size: 11px; color: #888;",
                            "{weekday}"
                        }
                    }
                    {grid.iter().map(|cell| {
                        match cell {
                            Some(day) => {
                                let day = *day;
                                let selected = Some(day) == draft_start
                                    || Some(day) == draft_end
                                    || matches!(
                                        (draft_start, draft_end),
                                        (Some(a), Some(b)) if day > a && day < b
                                    );
                                let background = if selected { "#dbe7ff" } else { "transparent" };
                                let day_label = day.day().to_string();
                                rsx!(
                                    button {
                                        style: "border: none; background: {background}; padding: 4px; border-radius: 4px; cursor: pointer;",
                                        onclick: move |_| picker.write().click_day(day),
                                        "{day_label}"
                                    }
                                )
                            }
                            None => rsx!(span { "" }),
                        }
                    })}
                }

                div {
                    style: "display: flex; justify-content: flex-end; gap: 6px; margin-top: 8px;",
                    button {
                        style: "border: 1px solid #bbb; background: #fff; padding: 3px 10px; border-radius: 6px; cursor: pointer;",
                        onclick: move |_| picker.write().cancel(),
                        "Cancel"
                    }
                    button {
                        style: "border: 1px solid #4a7; background: #e9f7ef; padding: 3px 10px; border-radius: 6px; cursor: pointer;",
                        onclick: move |_| {
                            let range = picker.write().apply();
                            on_change.call(range);
                        },
                        "Apply"
                    }
                }
            }
        }
    }
}
