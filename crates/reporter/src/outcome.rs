//! Terminal outcome classification and win-ratio summaries.

use std::collections::BTreeMap;
use std::fmt;

use run_table::RunRecord;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Deceptive agents wiped out, honest agents remain
    HonestWin,
    /// Honest agents wiped out, deceptive agents remain
    DeceptiveWin,
    /// Both populations survive, or both vanished
    Draw,
}

impl Outcome {
    pub fn classify(honest: f64, deceptive: f64) -> Self {
        if honest > 0.0 && deceptive == 0.0 {
            Outcome::HonestWin
        } else if deceptive > 0.0 && honest == 0.0 {
            Outcome::DeceptiveWin
        } else {
            Outcome::Draw
        }
    }

    pub fn of_record(record: &RunRecord) -> Self {
        Self::classify(record.honest, record.deceptive)
    }
}

/// Final record of every run, keyed by run identifier.
///
/// The final record is the one with the highest step. When several records
/// share that step, the last one in file order wins.
pub fn terminal_records(records: &[RunRecord]) -> BTreeMap<u64, &RunRecord> {
    let mut terminal: BTreeMap<u64, &RunRecord> = BTreeMap::new();
    for record in records {
        terminal
            .entry(record.run)
            .and_modify(|current| {
                if record.step >= current.step {
                    *current = record;
                }
            })
            .or_insert(record);
    }
    terminal
}

/// Outcome counts over a set of runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    pub honest_wins: usize,
    pub deceptive_wins: usize,
    pub draws: usize,
}

impl OutcomeTally {
    /// Classifies the terminal record of every run in `records`.
    pub fn from_records(records: &[RunRecord]) -> Self {
        let mut tally = Self::default();
        for record in terminal_records(records).values() {
            tally.record(Outcome::of_record(record));
        }
        tally
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::HonestWin => self.honest_wins += 1,
            Outcome::DeceptiveWin => self.deceptive_wins += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    /// Number of runs counted.
    pub fn total(&self) -> usize {
        self.honest_wins + self.deceptive_wins + self.draws
    }

    /// Share of `count` in the total, rounded half-to-even.
    ///
    /// Shares are rounded independently and need not add up to 100.
    pub fn percentage(&self, count: usize) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        (count as f64 / total as f64 * 100.0).round_ties_even() as u32
    }

    /// Win-ratio summary shown in chart subtitles.
    ///
    /// `WRH: h%/d%/x% (h/d/x)` when there are draws, `WRH: h%/d% (h/d)`
    /// otherwise.
    pub fn summary(&self) -> String {
        let honest = self.percentage(self.honest_wins);
        let deceptive = self.percentage(self.deceptive_wins);
        if self.draws > 0 {
            format!(
                "WRH: {}%/{}%/{}% ({}/{}/{})",
                honest,
                deceptive,
                self.percentage(self.draws),
                self.honest_wins,
                self.deceptive_wins,
                self.draws
            )
        } else {
            format!(
                "WRH: {}%/{}% ({}/{})",
                honest, deceptive, self.honest_wins, self.deceptive_wins
            )
        }
    }
}

impl fmt::Display for OutcomeTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
