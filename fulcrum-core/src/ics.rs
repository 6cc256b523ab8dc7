//! ICS export of a submitted series.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, EventLike, Property};
use uuid::Uuid;

use crate::error::{FulcrumError, FulcrumResult};
use crate::submission::Submission;

/// What every occurrence of a series shares.
#[derive(Debug, Clone)]
pub struct Series {
    /// Random per-series component of each occurrence's UID.
    pub id: String,
    pub title: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl Series {
    pub fn new(title: impl Into<String>) -> Self {
        Series {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            location: None,
            description: None,
        }
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location.filter(|l| !l.is_empty());
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.is_empty());
        self
    }

    /// `<slug>-<n>-<series id>@fulcrum`, with `n` counted from 1.
    fn occurrence_uid(&self, n: usize) -> String {
        format!("{}-{}-{}@fulcrum", slug::slugify(&self.title), n, self.id)
    }
}

/// Render one VEVENT per occurrence inside a single VCALENDAR.
pub fn generate_ics(series: &Series, submission: &Submission) -> FulcrumResult<String> {
    if series.title.trim().is_empty() {
        return Err(FulcrumError::IcsGenerate("Event title is required".into()));
    }

    let dtstamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    let mut cal = Calendar::new();

    for (i, occurrence) in submission.occurrences.iter().enumerate() {
        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&series.occurrence_uid(i + 1));
        ics_event.summary(&series.title);
        ics_event.add_property("DTSTAMP", &dtstamp);

        add_zoned_property(&mut ics_event, "DTSTART", &occurrence.start);
        if let Some(ref end) = occurrence.end {
            add_zoned_property(&mut ics_event, "DTEND", end);
        }

        if let Some(ref loc) = series.location {
            ics_event.location(loc);
        }
        if let Some(ref desc) = series.description {
            ics_event.description(desc);
        }

        cal.push(ics_event.done());
    }

    tracing::debug!(occurrences = submission.len(), "generated ics");
    Ok(strip_ics_bloat(&cal.done().to_string()))
}

/// Wall-clock time with a TZID parameter.
fn add_zoned_property(ics_event: &mut icalendar::Event, name: &str, time: &DateTime<Tz>) {
    let mut prop = Property::new(name, time.naive_local().format("%Y%m%dT%H%M%S").to_string());
    prop.add_parameter("TZID", time.timezone().name());
    ics_event.append_property(prop);
}

/// Fix up the icalendar crate's output: our own PRODID, no default CALSCALE.
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:FULCRUM\r\n");
            continue;
        }
        if line == "CALSCALE:GREGORIAN" {
            continue;
        }
        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::London;

    fn weekly_submission() -> Submission {
        Submission::from_form(
            &["2024-01-01T18:00", "2024-01-08T18:00", "2024-07-01T18:00"],
            &[],
            "00:02:00",
            London,
        )
        .unwrap()
    }

    #[test]
    fn one_vevent_per_occurrence() {
        let series = Series::new("Games Night");
        let ics = generate_ics(&series, &weekly_submission()).unwrap();

        let count = ics.lines().filter(|l| *l == "BEGIN:VEVENT").count();
        assert_eq!(count, 3, "Should have 3 VEVENTs. ICS:\n{}", ics);
        assert!(ics.contains("SUMMARY:Games Night"));
    }

    #[test]
    fn times_carry_tzid() {
        let ics = generate_ics(&Series::new("Games Night"), &weekly_submission()).unwrap();

        assert!(
            ics.contains("DTSTART;TZID=Europe/London:20240101T180000"),
            "DTSTART should carry TZID. ICS:\n{}",
            ics
        );
        // Summer occurrence keeps its wall-clock time.
        assert!(ics.contains("DTEND;TZID=Europe/London:20240701T200000"));
    }

    #[test]
    fn uids_are_distinct_and_slugged() {
        let series = Series::new("Games Night");
        let ics = generate_ics(&series, &weekly_submission()).unwrap();

        let uids: Vec<&str> = ics.lines().filter(|l| l.starts_with("UID:")).collect();
        assert_eq!(uids.len(), 3);
        assert!(uids[0].starts_with("UID:games-night-1-"));
        assert_ne!(uids[0], uids[1]);
    }

    #[test]
    fn open_ended_occurrence_has_no_dtend() {
        let submission = Submission::from_form(&["2024-01-01T18:00"], &[], "", London).unwrap();
        let ics = generate_ics(&Series::new("Talk"), &submission).unwrap();

        assert!(!ics.contains("DTEND"));
    }

    #[test]
    fn optional_fields_only_when_present() {
        let series = Series::new("Talk")
            .with_location(Some("CS0.07".into()))
            .with_description(Some(String::new()));
        let ics = generate_ics(&series, &weekly_submission()).unwrap();

        assert!(ics.contains("LOCATION:CS0.07"));
        assert!(!ics.contains("DESCRIPTION"));
    }

    #[test]
    fn prodid_replaced_and_calscale_dropped() {
        let ics = generate_ics(&Series::new("Talk"), &weekly_submission()).unwrap();

        assert!(ics.contains("PRODID:FULCRUM"));
        assert!(!ics.contains("CALSCALE"));
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(generate_ics(&Series::new("  "), &weekly_submission()).is_err());
    }
}
