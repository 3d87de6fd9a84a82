/// GraphQL client for the racing information endpoint
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::OddsSource;
use crate::error::{OddsError, Result};
use crate::types::{RaceMeeting, RaceOddsUpdate, RunnerOdds};

const ODDS_QUERY: &str = r#"query racing($date: String, $venueCode: String, $oddsTypes: [OddsType], $raceNo: Int) {
  raceMeetings(date: $date, venueCode: $venueCode) {
    pmPools(oddsTypes: $oddsTypes, raceNo: $raceNo) {
      oddsType
      oddsNodes {
        combString
        oddsValue
      }
    }
  }
}"#;

const RACE_CARD_QUERY: &str = r#"query raceMeetings($date: String, $venueCode: String) {
  raceMeetings(date: $date, venueCode: $venueCode) {
    id
    venueCode
    date
    totalNumberOfRace
    races {
      id
      no
      raceName_en
      raceName_ch
      distance
      go_en
      go_ch
      runners {
        id
        no
        name_ch
        name_en
        barrierDrawNumber
        handicapWeight
        currentWeight
        currentRating
        last6run
        gearInfo
        winOdds
        horse { id code }
        jockey { code name_en name_ch }
        trainer { code name_en name_ch }
      }
    }
  }
}"#;

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
}

#[derive(Deserialize)]
struct MeetingsEnvelope {
    #[serde(rename = "raceMeetings", default)]
    race_meetings: Vec<RaceMeeting>,
}

#[derive(Deserialize)]
struct PoolsEnvelope {
    #[serde(rename = "raceMeetings", default)]
    race_meetings: Vec<PoolsMeeting>,
}

#[derive(Deserialize)]
struct PoolsMeeting {
    #[serde(rename = "pmPools")]
    pm_pools: Option<Vec<Pool>>,
}

#[derive(Deserialize)]
struct Pool {
    #[serde(rename = "oddsType", default)]
    odds_type: String,
    #[serde(rename = "oddsNodes")]
    odds_nodes: Option<Vec<OddsNode>>,
}

#[derive(Deserialize)]
struct OddsNode {
    #[serde(rename = "combString")]
    comb_string: String,
    #[serde(rename = "oddsValue")]
    odds_value: f64,
}

fn collect_update(pools: Vec<Pool>) -> RaceOddsUpdate {
    let mut update = RaceOddsUpdate::new();
    for pool in pools {
        let Some(nodes) = pool.odds_nodes else {
            continue;
        };
        for node in nodes {
            // Composite selections carry non-numeric comb strings; only
            // plain runner numbers belong in a win/place update
            let Ok(runner_no) = node.comb_string.parse::<u32>() else {
                continue;
            };
            let entry: &mut RunnerOdds = update.entry(runner_no).or_default();
            match pool.odds_type.as_str() {
                "WIN" => entry.win_odds = Some(node.odds_value),
                "PLA" => entry.place_odds = Some(node.odds_value),
                _ => {}
            }
        }
    }
    update
}

pub struct RacingApiClient {
    http: Client,
    api_url: String,
}

impl RacingApiClient {
    pub fn new(api_url: String, timeout_sec: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;
        Ok(RacingApiClient { http, api_url })
    }

    async fn post_query<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T> {
        let payload = json!({
            "operationName": operation,
            "variables": variables,
            "query": query,
        });

        let response = self.http.post(&self.api_url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OddsError::ApiError {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: GraphQlResponse<T> = response.json().await?;
        envelope
            .data
            .ok_or_else(|| OddsError::InvalidOddsPayload("response carried no data".to_string()))
    }
}

#[async_trait]
impl OddsSource for RacingApiClient {
    async fn fetch_race_card(&self, date: &str, venue: &str) -> Result<RaceMeeting> {
        let variables = json!({ "date": date, "venueCode": venue });
        let envelope: MeetingsEnvelope = self
            .post_query("raceMeetings", RACE_CARD_QUERY, variables)
            .await?;

        envelope
            .race_meetings
            .into_iter()
            .next()
            .ok_or_else(|| OddsError::MeetingNotFound(format!("{date} {venue}")))
    }

    async fn fetch_race_odds(
        &self,
        date: &str,
        venue: &str,
        race_no: u32,
    ) -> Result<RaceOddsUpdate> {
        let variables = json!({
            "date": date,
            "venueCode": venue,
            "raceNo": race_no,
            "oddsTypes": ["WIN", "PLA"],
        });
        let envelope: PoolsEnvelope = self.post_query("racing", ODDS_QUERY, variables).await?;

        let pools = envelope
            .race_meetings
            .into_iter()
            .next()
            .and_then(|meeting| meeting.pm_pools)
            .unwrap_or_default();
        let update = collect_update(pools);

        debug!(
            "Fetched odds for {} {} race {}: {} runners",
            date,
            venue,
            race_no,
            update.len()
        );
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_parsing_merges_win_and_place() {
        let raw = r#"{
            "data": {
                "raceMeetings": [{
                    "pmPools": [
                        { "oddsType": "WIN", "oddsNodes": [
                            { "combString": "1", "oddsValue": 4.5 },
                            { "combString": "2", "oddsValue": 12.0 }
                        ]},
                        { "oddsType": "PLA", "oddsNodes": [
                            { "combString": "1", "oddsValue": 1.6 }
                        ]},
                        { "oddsType": "QIN", "oddsNodes": [
                            { "combString": "1,2", "oddsValue": 33.0 }
                        ]}
                    ]
                }]
            }
        }"#;

        let envelope: GraphQlResponse<PoolsEnvelope> = serde_json::from_str(raw).unwrap();
        let pools = envelope
            .data
            .unwrap()
            .race_meetings
            .into_iter()
            .next()
            .unwrap()
            .pm_pools
            .unwrap();
        let update = collect_update(pools);

        assert_eq!(update.len(), 2);
        assert_eq!(update[&1].win_odds, Some(4.5));
        assert_eq!(update[&1].place_odds, Some(1.6));
        // Runner 2 had no place quote this cycle
        assert_eq!(update[&2].win_odds, Some(12.0));
        assert_eq!(update[&2].place_odds, None);
    }

    #[test]
    fn test_null_pools_tolerated() {
        let raw = r#"{ "data": { "raceMeetings": [{ "pmPools": null }] } }"#;
        let envelope: GraphQlResponse<PoolsEnvelope> = serde_json::from_str(raw).unwrap();
        let meeting = envelope.data.unwrap().race_meetings.into_iter().next().unwrap();
        assert!(meeting.pm_pools.is_none());
    }
}
