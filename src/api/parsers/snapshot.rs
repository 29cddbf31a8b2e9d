use serde_json::Value;

use super::games::normalize_games;
use crate::domain::{validate_snapshot, TournamentSnapshot};
use crate::errors::{TournamentError, TournamentResult};

/// Normalizes loose match payloads, then deserializes and validates the snapshot
pub fn parse_snapshot(mut value: Value) -> TournamentResult<TournamentSnapshot> {
    if let Some(matches) = value.get_mut("matches").and_then(Value::as_array_mut) {
        for m in matches.iter_mut() {
            let match_id = m.get("id").and_then(Value::as_i64).unwrap_or_default();
            let Some(games) = m.get_mut("games") else {
                continue;
            };
            let normalized = normalize_games(match_id, games)?;
            *games = serde_json::to_value(normalized)
                .map_err(|e| TournamentError::InvalidSnapshot(e.to_string()))?;
        }
    }

    let snapshot: TournamentSnapshot =
        serde_json::from_value(value).map_err(|e| TournamentError::InvalidSnapshot(e.to_string()))?;
    validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

pub fn parse_snapshot_str(json: &str) -> TournamentResult<TournamentSnapshot> {
    let value: Value = serde_json::from_str(json).map_err(|e| TournamentError::InvalidSnapshot(e.to_string()))?;
    parse_snapshot(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(games: Value) -> Value {
        json!({
            "tournament_id": 4,
            "couples": [
                {"id": 1, "tournament_id": 4, "first_player_id": 10, "second_player_id": 11, "name": "A"},
                {"id": 2, "tournament_id": 4, "first_player_id": 20, "second_player_id": 21, "name": "B"}
            ],
            "matches": [{
                "id": 9, "tournament_id": 4, "stage_id": 1, "group_id": 3,
                "couple1_id": 1, "couple2_id": 2, "winner_couple_id": 1,
                "match_result_status": "completed",
                "scheduled_start": "2024-05-01T10:00:00Z",
                "scheduled_end": "2024-05-01T11:00:00",
                "court_id": 1,
                "games": games
            }]
        })
    }

    #[test]
    fn test_normalizes_games_before_deserializing() {
        let snapshot = parse_snapshot(payload(json!({"sets": [
            {"couple1_score": 6, "couple2_score": 4, "winner_id": 1}
        ]})))
        .unwrap();
        let m = &snapshot.matches[0];
        assert_eq!(m.games.len(), 1);
        assert_eq!(m.games[0].game_number, 1);
        assert!(m.slot().is_some());
    }

    #[test]
    fn test_validation_runs() {
        let err = parse_snapshot(payload(json!([
            {"couple1_score": 6, "couple2_score": 4, "winner_id": 5}
        ])))
        .unwrap_err();
        assert!(matches!(err, TournamentError::InvalidMatch { match_id: 9, .. }));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(parse_snapshot_str("{"), Err(TournamentError::InvalidSnapshot(_))));
        assert!(matches!(
            parse_snapshot_str(r#"{"matches": []}"#),
            Err(TournamentError::InvalidSnapshot(_))
        ));
    }
}
