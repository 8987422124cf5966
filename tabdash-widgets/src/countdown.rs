// tabdash-widgets/src/countdown.rs
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, TimeDelta};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    prelude::Widget as RatatuiWidget,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Gauge, Paragraph},
};
use std::time::Duration;
use tabdash_plugin_sdk::{Size, Widget, WidgetFeatures, WidgetManifest, export_widget};

use crate::common::{format_countdown, format_percentage};

pub const COUNTDOWN_MANIFEST: WidgetManifest = WidgetManifest {
    id: "countdown",
    name: "Countdown",
    description: "End of year countdown",
    enabled: false,
    category: "time",
    icon: "⏱️",
    version: "1.0.0",
    features: WidgetFeatures::FLOATING,
};

fn start_of_year(year: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)
}

/// Time left until January 1st of the next year
pub fn until_year_end(now: NaiveDateTime) -> TimeDelta {
    start_of_year(now.year() + 1)
        .map(|end| end - now)
        .unwrap_or_else(TimeDelta::zero)
}

/// Fraction of the current year already elapsed, in [0, 1]
pub fn year_progress(now: NaiveDateTime) -> f64 {
    let (Some(start), Some(end)) = (start_of_year(now.year()), start_of_year(now.year() + 1)) else {
        return 0.0;
    };

    let total = (end - start).num_seconds() as f64;
    let elapsed = (now - start).num_seconds() as f64;
    (elapsed / total).clamp(0.0, 1.0)
}

/// Counts down to the end of the year with a progress bar
#[derive(Default)]
pub struct Countdown {
    now: Option<NaiveDateTime>,
    since_refresh: Duration,
}

impl Countdown {
    fn refresh(&mut self) {
        self.now = Some(Local::now().naive_local());
        self.since_refresh = Duration::ZERO;
    }
}

impl Widget for Countdown {
    fn on_mount(&mut self) {
        self.refresh();
    }

    fn on_update(&mut self, delta: Duration) {
        self.since_refresh += delta;
        if self.since_refresh >= Duration::from_secs(1) {
            self.refresh();
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let Some(now) = self.now else {
            return;
        };

        let [label_area, time_area, gauge_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let label = format!("Until {}", now.year() + 1);
        RatatuiWidget::render(
            Paragraph::new(Line::from(label).centered()).style(Style::default().fg(Color::Gray)),
            label_area,
            buf,
        );

        RatatuiWidget::render(
            Paragraph::new(Line::from(format_countdown(until_year_end(now))).centered()).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            time_area,
            buf,
        );

        let progress = year_progress(now);
        RatatuiWidget::render(
            Gauge::default()
                .gauge_style(Style::default().fg(Color::Cyan))
                .label(format_percentage(progress * 100.0))
                .ratio(progress),
            gauge_area,
            buf,
        );
    }

    fn preferred_size(&self) -> Option<Size> {
        Some(Size::new(30, 5))
    }

    fn needs_update(&self) -> bool {
        true
    }
}

export_widget!("countdown", COUNTDOWN_MANIFEST, Countdown);
