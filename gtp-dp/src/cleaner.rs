//! Career sequence cleaning
//!
//! Turns one player's raw transfer log into the list of senior-club
//! stints the game actually asks about. Youth and reserve entries are
//! removed, loan round-trips are folded into the moves they really
//! were, and repeated consecutive clubs collapse to one stint.

use gtp_common::model::Stint;

/// One raw transfer row as scraped, oldest first by the time it
/// reaches the cleaner.
#[derive(Debug, Clone)]
pub struct RawTransfer {
    pub club: String,
    pub logo: Option<String>,
    pub season: String,
    pub fee: String,
}

/// A cleaned stint before the loan bookkeeping is stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct CareerStint {
    pub club: String,
    pub logo: Option<String>,
    pub season: String,
    pub fee: String,
    pub is_loan: bool,
}

impl CareerStint {
    /// Public stint shape; fee and loan flags stay inside the pipeline.
    pub fn into_stint(self) -> Stint {
        Stint {
            club: self.club,
            logo: self.logo,
            season: self.season,
        }
    }
}

/// How a fee descriptor reads for cleaning purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeeKind {
    Loan,
    EndOfLoan,
    Permanent,
}

fn classify_fee(fee: &str) -> FeeKind {
    let fee = fee.to_lowercase();
    if fee.contains("end of loan") {
        FeeKind::EndOfLoan
    } else if fee.contains("loan") && !fee.contains("end of") {
        FeeKind::Loan
    } else {
        // Monetary amounts, "free transfer", empty or unrecognized text
        FeeKind::Permanent
    }
}

/// Substrings that mark a youth, reserve or otherwise non-senior squad.
/// Matched against the lowercased, trimmed club name.
const YOUTH_KEYWORDS: &[&str] = &[
    "u16", "u17", "u18", "u19", "u20", "u21", "u22", "u23",
    "u15", "sub-15", "sub-17", "sub-19", "sub-20", "sub-21",
    "youth", "reserve", "reserves", "yth.", "yth", "you.",
    "b team", "b-team", "acad.", "academy", "ii",
    "ii team", "ii-team", "jgd.", "jong", "jrs.",
    "under 18", "under 19", "under 21", "under 23",
    "u-18", "u-19", "u-21", "u-23",
    "juvenil", "juvenile", "without club",
];

/// Check whether a destination club is a youth/reserve side rather than
/// a senior squad. The single-letter reserve suffix check stays
/// case-sensitive on the raw name so it only catches the "Barcelona B"
/// naming convention, not club names that happen to end in a lowercase
/// letter.
pub fn is_youth_or_reserve(club: &str) -> bool {
    let clean = club.trim().to_lowercase();
    if clean.is_empty() {
        return false;
    }
    if YOUTH_KEYWORDS.iter().any(|kw| clean.contains(kw)) {
        return true;
    }
    club.ends_with(" B") || club.ends_with(" C") || club.ends_with(" D")
}

/// Clean one player's transfer list (oldest first) into career stints.
///
/// Youth and reserve records are filtered out first, so every lookahead
/// below operates on surviving senior-club records only.
///
/// The loan rules, in pass order over the survivors:
/// - an end-of-loan record immediately followed by another loan is
///   transit noise between consecutive loans and is dropped; a lone
///   return to the parent club counts as a stint there
/// - a loan later answered by a permanent move to the same club merges
///   into one permanent stint, keeping the loan's club and logo but the
///   permanent move's season and fee
/// - any other record is emitted as-is
pub fn clean_transfers(raw: &[RawTransfer]) -> Vec<CareerStint> {
    let survivors: Vec<&RawTransfer> = raw
        .iter()
        .filter(|t| !is_youth_or_reserve(&t.club))
        .collect();

    let mut cleaned: Vec<CareerStint> = Vec::new();
    let mut i = 0;

    while i < survivors.len() {
        let t = survivors[i];

        match classify_fee(&t.fee) {
            FeeKind::EndOfLoan => {
                if let Some(next) = survivors.get(i + 1) {
                    if classify_fee(&next.fee) == FeeKind::Loan {
                        i += 1;
                        continue;
                    }
                }
                cleaned.push(stint_from(t, &t.season, &t.fee, false));
                i += 1;
            }
            FeeKind::Loan => {
                // Scan forward past end-of-loan records to find the next
                // substantive move.
                let mut j = i + 1;
                let mut resolved = false;
                while j < survivors.len() {
                    let next = survivors[j];
                    match classify_fee(&next.fee) {
                        FeeKind::EndOfLoan => {
                            j += 1;
                        }
                        kind => {
                            if next.club == t.club && kind != FeeKind::Loan {
                                // Loan converted to a permanent move; the
                                // intervening end-of-loan records are consumed
                                cleaned.push(stint_from(t, &next.season, &next.fee, false));
                                i = j + 1;
                            } else {
                                cleaned.push(stint_from(t, &t.season, &t.fee, true));
                                i += 1;
                            }
                            resolved = true;
                            break;
                        }
                    }
                }
                if !resolved {
                    // Loan is the last substantive record of the career
                    cleaned.push(stint_from(t, &t.season, &t.fee, true));
                    i += 1;
                }
            }
            FeeKind::Permanent => {
                cleaned.push(stint_from(t, &t.season, &t.fee, false));
                i += 1;
            }
        }
    }

    collapse_adjacent(cleaned)
}

fn stint_from(t: &RawTransfer, season: &str, fee: &str, is_loan: bool) -> CareerStint {
    CareerStint {
        club: t.club.clone(),
        logo: t.logo.clone(),
        season: season.to_string(),
        fee: fee.to_string(),
        is_loan,
    }
}

/// Collapse adjacent stints at the same club into one, keeping the
/// first (earliest season) of each run.
fn collapse_adjacent(stints: Vec<CareerStint>) -> Vec<CareerStint> {
    let mut out: Vec<CareerStint> = Vec::with_capacity(stints.len());
    for stint in stints {
        match out.last() {
            Some(prev) if prev.club == stint.club => {}
            _ => out.push(stint),
        }
    }
    out
}
