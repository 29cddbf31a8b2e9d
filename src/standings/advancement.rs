use serde::Serialize;

use crate::domain::{AdvancementRules, BracketType, CoupleId, CoupleStats};

/// A couple advancing out of a group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Qualifier {
    pub couple_id: CoupleId,
    pub position: u32,
    pub to_bracket: Option<BracketType>,
}

/// Couples placed within the top `top_n` of already ranked standings
pub fn qualifiers(standings: &[CoupleStats], rules: &AdvancementRules) -> Vec<Qualifier> {
    let mut ranked: Vec<&CoupleStats> = standings.iter().filter(|s| s.position > 0).collect();
    ranked.sort_by_key(|s| s.position);

    ranked
        .into_iter()
        .take(rules.top_n as usize)
        .map(|s| Qualifier {
            couple_id: s.couple_id,
            position: s.position,
            to_bracket: rules.to_bracket,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_n_by_position() {
        let standings: Vec<CoupleStats> = [(10, 3), (11, 1), (12, 2)]
            .into_iter()
            .map(|(couple_id, position)| CoupleStats {
                couple_id,
                position,
                ..CoupleStats::default()
            })
            .collect();
        let rules = AdvancementRules {
            top_n: 2,
            to_bracket: Some(BracketType::Main),
            tiebreaker: Vec::new(),
        };

        let advancing = qualifiers(&standings, &rules);
        assert_eq!(advancing.iter().map(|q| q.couple_id).collect::<Vec<_>>(), vec![11, 12]);
        assert!(advancing.iter().all(|q| q.to_bracket == Some(BracketType::Main)));
    }

    #[test]
    fn test_unranked_rows_never_qualify() {
        let standings = vec![CoupleStats::new(1)];
        assert!(qualifiers(&standings, &AdvancementRules::default()).is_empty());
    }
}
