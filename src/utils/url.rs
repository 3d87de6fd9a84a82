/// Extracts the meeting key from a betting-page URL
use chrono::NaiveDate;

/// Pull `(date, venue)` out of a URL like
/// `https://bet.example.com/racing/wp/2025-09-21/ST`. The path is scanned
/// for a date segment immediately followed by a two-letter venue code, so
/// trailing segments (race number, query noise) don't matter.
pub fn parse_meeting_url(url: &str) -> Option<(String, String)> {
    let path = url.split(['?', '#']).next()?;
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    for pair in segments.windows(2) {
        let (date, venue) = (pair[0], pair[1]);
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok() && is_venue_code(venue) {
            return Some((date.to_string(), venue.to_uppercase()));
        }
    }
    None
}

fn is_venue_code(segment: &str) -> bool {
    segment.len() == 2 && segment.chars().all(|c| c.is_ascii_alphabetic())
}
