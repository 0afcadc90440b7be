use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which target was fastest and by how much it beat the next fastest.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Comparison {
    pub winner: String,
    pub percent: f64,
}

/// Compare named timings.  The lowest time wins, with ties going to the later entry; the
/// percentage is relative to the next-lowest time.  Returns `None` for fewer than two
/// timings.
#[must_use]
pub fn compare<S: AsRef<str>>(timings: &[(S, Duration)]) -> Option<Comparison> {
    if timings.len() < 2 {
        return None;
    }

    let mut winner = 0;
    for (index, (_, time)) in timings.iter().enumerate() {
        if *time <= timings[winner].1 {
            winner = index;
        }
    }
    let runner_up = timings
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != winner)
        .map(|(_, (_, time))| *time)
        .min()?;

    let winner_time = timings[winner].1.as_secs_f64();
    let runner_up_time = runner_up.as_secs_f64();
    let percent = if runner_up_time > 0.0 {
        (runner_up_time - winner_time) / runner_up_time * 100.0
    } else {
        0.0
    };

    Some(Comparison {
        winner: timings[winner].0.as_ref().to_string(),
        percent,
    })
}
