//! Builders shared by tests that need match records.

use proptest::prelude::*;
use proptest::sample::subsequence;

use super::{Lineup, MatchId, MatchRecordWide};
use crate::domain::ChampionId;

/// Champions drawn on by generated matches.
pub(crate) const CHAMPION_POOL: [&str; 16] = [
    "Ahri", "Garen", "LeeSin", "Jinx", "Thresh", "Darius", "Vi", "Syndra", "Caitlyn", "Lulu",
    "Ornn", "Elise", "Orianna", "Ezreal", "Nami", "Sejuani",
];

pub(crate) fn champion(name: &str) -> ChampionId {
    ChampionId::new(name).expect("fixture champion names are valid")
}

pub(crate) fn lineup(names: [&str; 5]) -> Lineup {
    let [top, jungle, middle, bottom, utility] = names.map(champion);
    Lineup::new(top, jungle, middle, bottom, utility)
}

pub(crate) fn wide(
    match_id: &str,
    blue: [&str; 5],
    red: [&str; 5],
    blue_win: bool,
) -> MatchRecordWide {
    MatchRecordWide::new(
        MatchId::new(match_id).expect("fixture match ids are valid"),
        lineup(blue),
        lineup(red),
        blue_win,
    )
    .expect("fixture lineups are distinct")
}

/// Three matches in which Ahri wins twice (once per side) and loses once.
pub(crate) fn ahri_matches() -> Vec<MatchRecordWide> {
    vec![
        wide(
            "NA1_1",
            ["Garen", "LeeSin", "Ahri", "Jinx", "Thresh"],
            ["Darius", "Vi", "Syndra", "Caitlyn", "Lulu"],
            true,
        ),
        wide(
            "NA1_2",
            ["Ornn", "Elise", "Orianna", "Ezreal", "Nami"],
            ["Garen", "Sejuani", "Ahri", "Jinx", "Thresh"],
            false,
        ),
        wide(
            "NA1_3",
            ["Darius", "Vi", "Syndra", "Caitlyn", "Lulu"],
            ["Ahri", "LeeSin", "Orianna", "Ezreal", "Nami"],
            true,
        ),
    ]
}

/// Strategy producing a wide record with ten distinct champions from the pool.
pub(crate) fn arb_wide(match_id: String) -> impl Strategy<Value = MatchRecordWide> {
    (
        subsequence(CHAMPION_POOL.to_vec(), 10).prop_shuffle(),
        any::<bool>(),
    )
        .prop_map(move |(names, blue_win)| {
            let mut names = names.into_iter();
            let mut next = || names.next().expect("subsequence yields ten names");
            let blue = [next(), next(), next(), next(), next()];
            let red = [next(), next(), next(), next(), next()];
            wide(&match_id, blue, red, blue_win)
        })
}

/// Strategy producing a table of uniquely keyed wide records.
pub(crate) fn arb_table(max_matches: usize) -> impl Strategy<Value = Vec<MatchRecordWide>> {
    (0..=max_matches).prop_flat_map(|count| {
        (0..count)
            .map(|index| arb_wide(format!("GEN_{index}")))
            .collect::<Vec<_>>()
    })
}
