//! Gotoh global alignment: a gap of length `L` costs `gap_open + (L - 1) * gap_extend`.

use serde::{Deserialize, Serialize};

use crate::error::KiraError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceAlignment {
    pub pairs: Vec<(usize, usize)>,
    pub score: i32,
    pub gapped: (String, String),
}

impl SequenceAlignment {
    pub fn identity(&self) -> f64 {
        if self.pairs.is_empty() {
            return 0.0;
        }
        let matches = self
            .gapped
            .0
            .chars()
            .zip(self.gapped.1.chars())
            .filter(|(a, b)| a == b && *a != '-' && *a != 'X')
            .count();
        matches as f64 / self.pairs.len() as f64
    }
}

pub trait SequenceAligner {
    fn align(&self, first: &str, second: &str) -> Result<SequenceAlignment, KiraError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceScoring {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for SequenceScoring {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_score: -1,
            gap_open: -4,
            gap_extend: -1,
        }
    }
}

impl SequenceScoring {
    fn pair(&self, a: u8, b: u8) -> i32 {
        if a == b && a != b'X' {
            self.match_score
        } else {
            self.mismatch_score
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeedlemanWunsch {
    pub scoring: SequenceScoring,
}

impl NeedlemanWunsch {
    pub fn new(scoring: SequenceScoring) -> Self {
        Self { scoring }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Diagonal,
    GapFirst,
    GapSecond,
}

const NEG: i32 = i32::MIN / 4;

impl SequenceAligner for NeedlemanWunsch {
    fn align(&self, first: &str, second: &str) -> Result<SequenceAlignment, KiraError> {
        let a = first.as_bytes();
        let b = second.as_bytes();
        if a.is_empty() || b.is_empty() {
            return Err(KiraError::InvalidInput(
                "cannot align an empty sequence".to_string(),
            ));
        }

        let scoring = &self.scoring;
        let (m, n) = (a.len(), b.len());
        let cols = n + 1;
        let idx = |i: usize, j: usize| i * cols + j;

        let mut h = vec![NEG; (m + 1) * cols];
        let mut e = vec![NEG; (m + 1) * cols];
        let mut f = vec![NEG; (m + 1) * cols];

        h[idx(0, 0)] = 0;
        for i in 1..=m {
            f[idx(i, 0)] = scoring.gap_open + (i as i32 - 1) * scoring.gap_extend;
            h[idx(i, 0)] = f[idx(i, 0)];
        }
        for j in 1..=n {
            e[idx(0, j)] = scoring.gap_open + (j as i32 - 1) * scoring.gap_extend;
            h[idx(0, j)] = e[idx(0, j)];
        }

        for i in 1..=m {
            for j in 1..=n {
                e[idx(i, j)] = (h[idx(i, j - 1)] + scoring.gap_open)
                    .max(e[idx(i, j - 1)] + scoring.gap_extend);
                f[idx(i, j)] = (h[idx(i - 1, j)] + scoring.gap_open)
                    .max(f[idx(i - 1, j)] + scoring.gap_extend);
                let diagonal = h[idx(i - 1, j - 1)] + scoring.pair(a[i - 1], b[j - 1]);
                h[idx(i, j)] = diagonal.max(e[idx(i, j)]).max(f[idx(i, j)]);
            }
        }

        let mut pairs = Vec::new();
        let mut gapped_a = Vec::with_capacity(m + n);
        let mut gapped_b = Vec::with_capacity(m + n);
        let (mut i, mut j) = (m, n);
        let mut state = State::Diagonal;

        while i > 0 || j > 0 {
            match state {
                State::Diagonal => {
                    if i > 0
                        && j > 0
                        && h[idx(i, j)] == h[idx(i - 1, j - 1)] + scoring.pair(a[i - 1], b[j - 1])
                    {
                        pairs.push((i - 1, j - 1));
                        gapped_a.push(a[i - 1]);
                        gapped_b.push(b[j - 1]);
                        i -= 1;
                        j -= 1;
                    } else if j > 0 && (i == 0 || h[idx(i, j)] == e[idx(i, j)]) {
                        state = State::GapFirst;
                    } else {
                        state = State::GapSecond;
                    }
                }
                State::GapFirst => {
                    gapped_a.push(b'-');
                    gapped_b.push(b[j - 1]);
                    let extended = j > 1 && e[idx(i, j)] == e[idx(i, j - 1)] + scoring.gap_extend;
                    if !extended {
                        state = State::Diagonal;
                    }
                    j -= 1;
                }
                State::GapSecond => {
                    gapped_a.push(a[i - 1]);
                    gapped_b.push(b'-');
                    let extended = i > 1 && f[idx(i, j)] == f[idx(i - 1, j)] + scoring.gap_extend;
                    if !extended {
                        state = State::Diagonal;
                    }
                    i -= 1;
                }
            }
        }

        pairs.reverse();
        gapped_a.reverse();
        gapped_b.reverse();

        Ok(SequenceAlignment {
            pairs,
            score: h[idx(m, n)],
            gapped: (
                String::from_utf8_lossy(&gapped_a).into_owned(),
                String::from_utf8_lossy(&gapped_b).into_owned(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn identical_sequences_align_diagonally() {
        let alignment = NeedlemanWunsch::default().align("KLVEAG", "KLVEAG").unwrap();
        assert_eq!(alignment.pairs, (0..6).map(|i| (i, i)).collect::<Vec<_>>());
        assert_eq!(alignment.score, 12);
        assert!((alignment.identity() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn deletion_opens_single_gap() {
        let alignment = NeedlemanWunsch::default().align("KLVEAGHW", "KLVGHW").unwrap();
        assert_eq!(alignment.gapped.0, "KLVEAGHW");
        assert_eq!(alignment.gapped.1.matches('-').count(), 2);
        assert_eq!(alignment.pairs.len(), 6);
        // 6 matches, one gap of length 2
        assert_eq!(alignment.score, 6 * 2 - 4 - 1);
    }

    #[test]
    fn gapped_strings_have_equal_length() {
        let alignment = NeedlemanWunsch::default().align("MKV", "AMKVLL").unwrap();
        assert_eq!(alignment.gapped.0.len(), alignment.gapped.1.len());
        assert_eq!(alignment.gapped.0.replace('-', ""), "MKV");
        assert_eq!(alignment.gapped.1.replace('-', ""), "AMKVLL");
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let err = NeedlemanWunsch::default().align("", "KLV").unwrap_err();
        assert_matches!(err, KiraError::InvalidInput(_));
    }
}
