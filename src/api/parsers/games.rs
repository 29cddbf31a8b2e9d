use serde::Deserialize;
use serde_json::Value;

use crate::domain::{CoupleId, Game, MatchId};
use crate::errors::{TournamentError, TournamentResult};

#[derive(Deserialize)]
struct RawGame {
    #[serde(default)]
    game_number: Option<u32>,
    couple1_score: u32,
    couple2_score: u32,
    #[serde(default)]
    winner_id: Option<CoupleId>,
    #[serde(default)]
    duration_minutes: Option<u32>,
}

/// Canonical game list from any of the accepted `games` shapes:
/// an array, `{ "sets": [...] }`, `{ "games": [...] }` or an object keyed by game number.
pub fn normalize_games(match_id: MatchId, value: &Value) -> TournamentResult<Vec<Game>> {
    let entries: Vec<(Option<u32>, &Value)> = match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(|item| (None, item)).collect(),
        Value::Object(map) => match map.get("sets").or_else(|| map.get("games")) {
            Some(Value::Array(items)) => items.iter().map(|item| (None, item)).collect(),
            Some(Value::Null) => Vec::new(),
            Some(_) => {
                return Err(TournamentError::invalid_match(match_id, "games list must be an array"));
            }
            None => {
                let mut keyed = Vec::with_capacity(map.len());
                for (key, item) in map {
                    let number = key.trim().parse::<u32>().map_err(|_| {
                        TournamentError::invalid_match(match_id, format!("unexpected games key '{}'", key))
                    })?;
                    keyed.push((Some(number), item));
                }
                keyed
            }
        },
        _ => return Err(TournamentError::invalid_match(match_id, "unsupported games format")),
    };

    let mut games = Vec::with_capacity(entries.len());
    for (position, (key, item)) in entries.into_iter().enumerate() {
        let raw: RawGame = serde_json::from_value(item.clone())
            .map_err(|e| TournamentError::invalid_match(match_id, format!("malformed game: {}", e)))?;
        games.push(Game {
            game_number: raw.game_number.or(key).unwrap_or(position as u32 + 1),
            couple1_score: raw.couple1_score,
            couple2_score: raw.couple2_score,
            winner_id: raw.winner_id,
            duration_minutes: raw.duration_minutes,
        });
    }

    games.sort_by_key(|g| g.game_number);
    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn numbers(games: &[Game]) -> Vec<u32> {
        games.iter().map(|g| g.game_number).collect()
    }

    #[test]
    fn test_plain_array_gets_numbers() {
        let games = normalize_games(
            1,
            &json!([
                {"couple1_score": 6, "couple2_score": 3},
                {"couple1_score": 4, "couple2_score": 6, "winner_id": 8}
            ]),
        )
        .unwrap();
        assert_eq!(numbers(&games), vec![1, 2]);
        assert_eq!(games[1].winner_id, Some(8));
    }

    #[test]
    fn test_sets_wrapper_is_sorted() {
        let games = normalize_games(
            1,
            &json!({"sets": [
                {"game_number": 2, "couple1_score": 1, "couple2_score": 6},
                {"game_number": 1, "couple1_score": 6, "couple2_score": 1}
            ]}),
        )
        .unwrap();
        assert_eq!(numbers(&games), vec![1, 2]);
        assert_eq!(games[0].couple1_score, 6);
    }

    #[test]
    fn test_keyed_object() {
        let games = normalize_games(
            1,
            &json!({
                "2": {"couple1_score": 7, "couple2_score": 5},
                "1": {"couple1_score": 2, "couple2_score": 6}
            }),
        )
        .unwrap();
        assert_eq!(numbers(&games), vec![1, 2]);
        assert_eq!(games[1].couple1_score, 7);
    }

    #[test]
    fn test_empty_shapes() {
        assert!(normalize_games(1, &Value::Null).unwrap().is_empty());
        assert!(normalize_games(1, &json!({"games": []})).unwrap().is_empty());
        assert!(normalize_games(1, &json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(normalize_games(3, &json!("6-4")).is_err());
        assert!(normalize_games(3, &json!({"first": {"couple1_score": 1, "couple2_score": 2}})).is_err());
        assert!(matches!(
            normalize_games(3, &json!([{"couple1_score": 1}])),
            Err(TournamentError::InvalidMatch { match_id: 3, .. })
        ));
    }
}
