/// Projects the latest stored odds onto a race meeting snapshot
use crate::types::{MeetingOddsHistory, RaceMeeting};

/// Build a new snapshot from `meeting` with each runner's win/place odds
/// overwritten by the last point of its series. Runners (or whole races)
/// absent from the history pass through unchanged. The input meeting is
/// never mutated, and history is only read.
pub fn merge_history_into_meeting(
    meeting: &RaceMeeting,
    history: &MeetingOddsHistory,
) -> RaceMeeting {
    let mut merged = meeting.clone();
    for race in &mut merged.races {
        let Some(race_history) = history.race(race.no) else {
            continue;
        };
        for runner in &mut race.runners {
            if let Some(last) = race_history.get(&runner.horse.id).and_then(|s| s.last()) {
                runner.win_odds = last.win_odds;
                runner.place_odds = last.place_odds;
            }
        }
    }
    merged
}
