/// One of the three full-time outcomes of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Home => "Home",
            Outcome::Draw => "Draw",
            Outcome::Away => "Away",
        }
    }
}

/// How a stored prediction fared against the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    Correct,
    MissedDraw,
    Wrong,
}

/// Highest of the three probabilities. Ties go to the earlier of
/// Home, Draw, Away; NaN never wins.
pub fn argmax(home: f64, draw: f64, away: f64) -> Outcome {
    let mut best = Outcome::Home;
    let mut best_p = home;
    for (outcome, p) in [(Outcome::Draw, draw), (Outcome::Away, away)] {
        if p > best_p || (best_p.is_nan() && !p.is_nan()) {
            best = outcome;
            best_p = p;
        }
    }
    best
}

pub fn actual_outcome(home_goals: u32, away_goals: u32) -> Outcome {
    match home_goals.cmp(&away_goals) {
        std::cmp::Ordering::Greater => Outcome::Home,
        std::cmp::Ordering::Equal => Outcome::Draw,
        std::cmp::Ordering::Less => Outcome::Away,
    }
}

pub fn accuracy(predicted: Outcome, actual: Outcome) -> Accuracy {
    if predicted == actual {
        Accuracy::Correct
    } else if actual == Outcome::Draw {
        Accuracy::MissedDraw
    } else {
        Accuracy::Wrong
    }
}
