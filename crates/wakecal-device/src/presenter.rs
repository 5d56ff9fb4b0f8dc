//! Pushes formatted strings into the screen's label slots.

use chrono::{DateTime, FixedOffset, Utc};
use tracing::debug;
use wakecal_core::{
    CalendarEvent, format_clock, format_event_start, format_header, to_display, wrap_title,
};

use crate::render::{Label, Renderer};

/// Owns the renderer and knows the screen layout.
pub struct Presenter {
    renderer: Box<dyn Renderer>,
    offset: FixedOffset,
    slots: usize,
    title_width: usize,
}

impl std::fmt::Debug for Presenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presenter")
            .field("offset", &self.offset)
            .field("slots", &self.slots)
            .field("title_width", &self.title_width)
            .finish_non_exhaustive()
    }
}

impl Presenter {
    /// `slots` is the fixed number of event rows on screen.
    pub fn new(
        renderer: Box<dyn Renderer>,
        offset: FixedOffset,
        slots: usize,
        title_width: usize,
    ) -> Self {
        Self {
            renderer,
            offset,
            slots,
            title_width,
        }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn render_header(&mut self, now: DateTime<Utc>) {
        let text = format_header(&to_display(now, &self.offset));
        self.renderer.set_text(Label::Header, &text);
    }

    pub fn render_clock(&mut self, now: DateTime<Utc>) {
        let text = format_clock(&to_display(now, &self.offset));
        self.renderer.set_text(Label::Clock, &text);
    }

    /// Fills one row per event and blanks the remaining rows.
    ///
    /// Events past the slot count are not shown.
    pub fn render_events(&mut self, events: &[CalendarEvent]) {
        for index in 0..self.slots {
            match events.get(index) {
                Some(event) => {
                    let time = format_event_start(event.start.as_ref(), &self.offset);
                    let title = wrap_title(&event.summary, self.title_width);
                    debug!(slot = index, %time, title = %title.replace('\n', " "), "rendering event");
                    self.renderer.set_text(Label::EventTime(index), &time);
                    self.renderer.set_text(Label::EventTitle(index), &title);
                }
                None => self.clear_slot(index),
            }
        }
    }

    /// Blanks both labels of a row.
    pub fn clear_slot(&mut self, index: usize) {
        self.renderer.set_text(Label::EventTime(index), "");
        self.renderer.set_text(Label::EventTitle(index), "");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRenderer;
    use crate::config::offset_from_minutes;
    use chrono::TimeZone;
    use wakecal_core::EventTime;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    fn presenter(renderer: &RecordingRenderer, offset_minutes: i32) -> Presenter {
        Presenter::new(
            Box::new(renderer.clone()),
            offset_from_minutes(offset_minutes).unwrap(),
            5,
            25,
        )
    }

    #[test]
    fn header_and_clock_use_offset() {
        let renderer = RecordingRenderer::new();
        let mut presenter = presenter(&renderer, -8 * 60);

        presenter.render_header(utc(2, 5));
        presenter.render_clock(utc(2, 5));

        assert_eq!(renderer.text(Label::Header), "Thursday Feb. 29, 2024");
        assert_eq!(renderer.text(Label::Clock), "18:05");
    }

    #[test]
    fn unused_slots_are_cleared() {
        let renderer = RecordingRenderer::new();
        let mut presenter = presenter(&renderer, 0);

        let five: Vec<_> = (0..5)
            .map(|i| CalendarEvent::at(format!("Event {i}"), utc(9 + i, 0)))
            .collect();
        presenter.render_events(&five);
        assert_eq!(renderer.text(Label::EventTitle(4)), "Event 4");

        presenter.render_events(&five[..2]);
        assert_eq!(renderer.text(Label::EventTime(1)), "10:00am");
        assert_eq!(renderer.text(Label::EventTitle(1)), "Event 1");
        for slot in 2..5 {
            assert_eq!(renderer.text(Label::EventTime(slot)), "");
            assert_eq!(renderer.text(Label::EventTitle(slot)), "");
        }

        presenter.render_events(&[]);
        assert_eq!(renderer.text(Label::EventTitle(0)), "");
    }

    #[test]
    fn events_beyond_capacity_are_dropped() {
        let renderer = RecordingRenderer::new();
        let mut presenter = Presenter::new(
            Box::new(renderer.clone()),
            offset_from_minutes(0).unwrap(),
            2,
            25,
        );

        let events: Vec<_> = (0..4)
            .map(|i| CalendarEvent::at(format!("Event {i}"), utc(9 + i, 0)))
            .collect();
        presenter.render_events(&events);

        assert_eq!(renderer.text(Label::EventTitle(1)), "Event 1");
        assert!(!renderer.snapshot().contains_key(&Label::EventTitle(2)));
    }

    #[test]
    fn screen_snapshot() {
        let renderer = RecordingRenderer::new();
        let mut presenter = presenter(&renderer, 0);

        presenter.render_header(utc(7, 0));
        presenter.render_clock(utc(7, 0));
        presenter.render_events(&[
            CalendarEvent::at("Standup", utc(9, 0)),
            CalendarEvent::at(
                "Design review for the new onboarding flow with the mobile team",
                utc(13, 5),
            ),
            CalendarEvent::new(
                "Company holiday",
                Some(EventTime::from_date(
                    chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                )),
            ),
            CalendarEvent::new("", None),
        ]);

        insta::assert_snapshot!(renderer.screen(), @r"
        header: Friday Mar. 01, 2024
        clock: 07:00
        event[0].time: 9:00am
        event[1].time: 1:05pm
        event[2].time: All day
        event[3].time:
        event[4].time:
        event[0].title: Standup
        event[1].title: Design review for the new | onboarding flow with the
        event[2].title: Company holiday
        event[3].title:
        event[4].title:
        ");
    }
}
