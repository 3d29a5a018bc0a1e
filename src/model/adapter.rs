// File: ./src/model/adapter.rs
// Handles ICS serialization of generated events
use crate::model::item::EventRequest;
use chrono::Utc;
use icalendar::{Calendar, Component, Event};

const FLOATING_FORMAT: &str = "%Y%m%dT%H%M%S";

impl EventRequest {
    /// Name of the resource this event is stored under.
    pub fn filename(&self) -> String {
        format!("{}.ics", self.uid)
    }

    /// Serializes to a VCALENDAR holding a single VEVENT.
    /// Start and end are written as floating local times.
    pub fn to_ics(&self) -> String {
        let mut event = Event::new();
        event.uid(&self.uid);
        event.summary(&self.title);
        event.timestamp(Utc::now());
        event.add_property("DTSTART", &self.start.format(FLOATING_FORMAT).to_string());
        event.add_property("DTEND", &self.end.format(FLOATING_FORMAT).to_string());

        let mut calendar = Calendar::new();
        calendar.push(event);
        calendar.to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::item::{EventRequest, ExtractedDate};
    use chrono::NaiveDate;

    fn request() -> EventRequest {
        let date = ExtractedDate {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            token: "5/1/2024".to_string(),
            offset: 0,
        };
        EventRequest::new("Dentist", &date)
    }

    #[test]
    fn test_end_is_one_hour_after_start() {
        let req = request();
        assert_eq!((req.end - req.start).num_seconds(), 3600);
        assert_eq!(req.start.to_string(), "2024-05-01 00:00:00");
    }

    #[test]
    fn test_ics_contains_vevent_fields() {
        let req = request();
        let ics = req.to_ics();
        assert!(ics.contains("BEGIN:VEVENT"));
        assert!(ics.contains("SUMMARY:Dentist"));
        assert!(ics.contains(&format!("UID:{}", req.uid)));
        assert!(ics.contains("DTSTART:20240501T000000"));
        assert!(ics.contains("DTEND:20240501T010000"));
        assert!(ics.contains("END:VCALENDAR"));
    }

    #[test]
    fn test_uids_are_unique() {
        assert_ne!(request().uid, request().uid);
        assert!(request().filename().ends_with(".ics"));
    }
}
