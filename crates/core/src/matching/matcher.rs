//! Greedy one-pass auto-matcher.

use std::collections::HashSet;

use uuid::Uuid;

use super::similarity::description_similarity;
use super::types::{CandidateView, MatchPair, MatchParams, TransactionView};

/// Pair statement transactions with ledger line candidates.
///
/// Transactions are visited in statement order (`row_index`, then id) and
/// each greedily takes its best eligible candidate. Eligibility requires an
/// exact signed amount match and a date within the inclusive tolerance.
/// Ties are broken by description similarity (when enabled), then by date
/// proximity, then by lowest candidate id. Each candidate is consumed at
/// most once per pass; a transaction with no eligible candidate is skipped.
#[must_use]
pub fn auto_match(
    transactions: &[TransactionView],
    candidates: &[CandidateView],
    params: &MatchParams,
) -> Vec<MatchPair> {
    let mut ordered: Vec<&TransactionView> = transactions.iter().collect();
    ordered.sort_by_key(|tx| (tx.row_index, tx.id));

    let mut used: HashSet<Uuid> = HashSet::new();
    let mut pairs = Vec::new();

    for tx in ordered {
        let best = candidates
            .iter()
            .filter(|c| !used.contains(&c.id))
            .filter(|c| c.amount == tx.amount)
            .filter_map(|c| {
                let distance = (c.date - tx.date).num_days().abs();
                (distance <= params.date_tolerance_days).then_some((c, distance))
            })
            .min_by_key(|(c, distance)| {
                let similarity = if params.description_match {
                    description_similarity(&tx.description, &c.description)
                } else {
                    0
                };
                // min_by_key, so invert similarity to prefer the highest.
                (1000 - similarity, *distance, c.id)
            });

        if let Some((candidate, _)) = best {
            used.insert(candidate.id);
            pairs.push(MatchPair {
                transaction_id: tx.id,
                ledger_line_id: candidate.id,
            });
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn tx(row_index: i32, day: u32, description: &str, amount: Decimal) -> TransactionView {
        TransactionView {
            id: Uuid::new_v4(),
            row_index,
            date: date(day),
            description: description.to_string(),
            amount,
        }
    }

    fn candidate(day: u32, description: &str, amount: Decimal) -> CandidateView {
        CandidateView {
            id: Uuid::new_v4(),
            date: date(day),
            description: description.to_string(),
            amount,
        }
    }

    #[test]
    fn test_statement_fully_matched() {
        // Statement moves 1000 -> 1500 via +200, -50, +350; the books hold
        // the same three entries, with the fee recorded one day later.
        let transactions = vec![
            tx(0, 5, "Deposit A", dec!(200.00)),
            tx(1, 10, "Fee B", dec!(-50.00)),
            tx(2, 15, "Deposit C", dec!(350.00)),
        ];
        let candidates = vec![
            candidate(5, "Deposit A", dec!(200.00)),
            candidate(11, "Fee B", dec!(-50.00)),
            candidate(15, "Deposit C", dec!(350.00)),
        ];

        let params = MatchParams {
            date_tolerance_days: 1,
            description_match: true,
        };
        let pairs = auto_match(&transactions, &candidates, &params);

        assert_eq!(pairs.len(), 3);
        for (pair, (tx, cand)) in pairs.iter().zip(transactions.iter().zip(&candidates)) {
            assert_eq!(pair.transaction_id, tx.id);
            assert_eq!(pair.ledger_line_id, cand.id);
        }
    }

    #[test]
    fn test_amount_must_match_sign() {
        let transactions = vec![tx(0, 5, "Refund", dec!(50.00))];
        let candidates = vec![candidate(5, "Fee", dec!(-50.00))];
        let pairs = auto_match(&transactions, &candidates, &MatchParams::default());
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_date_tolerance_is_inclusive() {
        let transactions = vec![tx(0, 10, "Payment", dec!(75.00))];

        let at_limit = vec![candidate(13, "Payment", dec!(75.00))];
        let params = MatchParams {
            date_tolerance_days: 3,
            description_match: false,
        };
        assert_eq!(auto_match(&transactions, &at_limit, &params).len(), 1);

        let past_limit = vec![candidate(14, "Payment", dec!(75.00))];
        assert!(auto_match(&transactions, &past_limit, &params).is_empty());
    }

    #[test]
    fn test_candidate_consumed_once() {
        // Two identical transactions, one candidate: the earlier row wins.
        let transactions = vec![
            tx(0, 5, "Deposit", dec!(100.00)),
            tx(1, 5, "Deposit", dec!(100.00)),
        ];
        let candidates = vec![candidate(5, "Deposit", dec!(100.00))];

        let pairs = auto_match(&transactions, &candidates, &MatchParams::default());
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].transaction_id, transactions[0].id);
    }

    #[test]
    fn test_description_breaks_amount_tie() {
        let transactions = vec![tx(0, 5, "ACME invoice 42", dec!(100.00))];
        let candidates = vec![
            candidate(5, "Unrelated vendor", dec!(100.00)),
            candidate(5, "ACME invoice 42", dec!(100.00)),
        ];

        let params = MatchParams {
            date_tolerance_days: 3,
            description_match: true,
        };
        let pairs = auto_match(&transactions, &candidates, &params);
        assert_eq!(pairs[0].ledger_line_id, candidates[1].id);
    }

    #[test]
    fn test_nearest_date_breaks_tie_without_descriptions() {
        let transactions = vec![tx(0, 10, "Payment", dec!(100.00))];
        let candidates = vec![
            candidate(13, "Payment", dec!(100.00)),
            candidate(11, "Payment", dec!(100.00)),
        ];

        let pairs = auto_match(&transactions, &candidates, &MatchParams::default());
        assert_eq!(pairs[0].ledger_line_id, candidates[1].id);
    }

    #[test]
    fn test_lowest_id_breaks_full_tie() {
        let transactions = vec![tx(0, 10, "Payment", dec!(100.00))];
        let mut candidates = vec![
            candidate(10, "Payment", dec!(100.00)),
            candidate(10, "Payment", dec!(100.00)),
        ];
        candidates.sort_by_key(|c| c.id);

        let pairs = auto_match(&transactions, &candidates, &MatchParams::default());
        assert_eq!(pairs[0].ledger_line_id, candidates[0].id);
    }

    #[test]
    fn test_no_candidates_yields_no_pairs() {
        let transactions = vec![tx(0, 5, "Deposit", dec!(100.00))];
        let pairs = auto_match(&transactions, &[], &MatchParams::default());
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_candidate_order_does_not_change_result() {
        let transactions = vec![
            tx(0, 5, "Deposit A", dec!(200.00)),
            tx(1, 10, "Fee B", dec!(-50.00)),
        ];
        let candidates = vec![
            candidate(5, "Deposit A", dec!(200.00)),
            candidate(10, "Fee B", dec!(-50.00)),
        ];
        let mut reversed = candidates.clone();
        reversed.reverse();

        let params = MatchParams {
            date_tolerance_days: 1,
            description_match: true,
        };
        let forward = auto_match(&transactions, &candidates, &params);
        let backward = auto_match(&transactions, &reversed, &params);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_transaction_order_follows_row_index() {
        // Row 0 listed second in the slice still matches first.
        let later = tx(1, 5, "Deposit", dec!(100.00));
        let earlier = tx(0, 5, "Deposit", dec!(100.00));
        let transactions = vec![later, earlier.clone()];
        let candidates = vec![candidate(5, "Deposit", dec!(100.00))];

        let pairs = auto_match(&transactions, &candidates, &MatchParams::default());
        assert_eq!(pairs[0].transaction_id, earlier.id);
    }

    proptest! {
        #[test]
        fn prop_no_candidate_matched_twice(
            amounts in prop::collection::vec(0i64..5, 1..20),
            cand_amounts in prop::collection::vec(0i64..5, 1..20),
        ) {
            let transactions: Vec<TransactionView> = amounts
                .iter()
                .enumerate()
                .map(|(i, a)| tx(i32::try_from(i).unwrap(), 10, "x", Decimal::from(*a)))
                .collect();
            let candidates: Vec<CandidateView> = cand_amounts
                .iter()
                .map(|a| candidate(10, "x", Decimal::from(*a)))
                .collect();

            let pairs = auto_match(&transactions, &candidates, &MatchParams::default());

            let mut seen_tx = HashSet::new();
            let mut seen_line = HashSet::new();
            for pair in &pairs {
                prop_assert!(seen_tx.insert(pair.transaction_id));
                prop_assert!(seen_line.insert(pair.ledger_line_id));
            }
        }
    }
}
