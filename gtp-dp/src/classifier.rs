//! Sequence classification
//!
//! Pure batch computation over cleaned careers: derives the canonical
//! sequence key, counts how many players share each key, and assigns a
//! difficulty tier from the stint count.

use std::collections::HashMap;

use gtp_common::model::{sequence_key, Difficulty, QuestionRecord, Stint};

use crate::cleaner::CareerStint;

/// One player's cleaned career, ready for classification.
#[derive(Debug, Clone)]
pub struct PlayerCareer {
    pub player_id: String,
    pub player_name: String,
    pub market_value: f64,
    pub stints: Vec<CareerStint>,
}

/// Build question records for a whole batch of cleaned careers.
///
/// Sharing counts are multiset frequencies over the full batch, never
/// computed incrementally, so two players with byte-identical sequences
/// always carry the same count. Input order is preserved and rerunning
/// on identical input yields identical output.
pub fn build_question_records(careers: Vec<PlayerCareer>) -> Vec<QuestionRecord> {
    let mut records: Vec<QuestionRecord> = careers
        .into_iter()
        .map(|career| {
            let stints: Vec<Stint> = career
                .stints
                .into_iter()
                .map(CareerStint::into_stint)
                .collect();
            let key = sequence_key(&stints);
            QuestionRecord {
                player_id: career.player_id,
                player_name: career.player_name,
                market_value: career.market_value,
                stint_count: stints.len(),
                shared_by: 0,
                difficulty: Difficulty::from_stint_count(stints.len()),
                sequence_key: key,
                stints,
            }
        })
        .collect();

    let mut counts: HashMap<String, i64> = HashMap::new();
    for record in &records {
        *counts.entry(record.sequence_key.clone()).or_insert(0) += 1;
    }

    for record in &mut records {
        record.shared_by = counts[&record.sequence_key];
    }

    records
}
