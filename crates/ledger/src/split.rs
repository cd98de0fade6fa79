//! Split engine: total + policy → exact per-member shares.
//!
//! Every successful split conserves money exactly: the returned shares sum to
//! the total, whatever rounding the policy needs.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use tabsplit_core::{MemberId, Money};

use crate::error::{LedgerError, LedgerResult};

/// Per-member shares of one expense.
pub type Shares = BTreeMap<MemberId, Money>;

/// Percentage sums within this distance of 100 are accepted.
pub const PERCENTAGE_TOLERANCE: f64 = 1e-6;

/// An explicit amount owed by one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactShare {
    pub member: MemberId,
    pub amount: Money,
}

/// A percentage of the total owed by one member.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentageShare {
    pub member: MemberId,
    pub percentage: f64,
}

/// How an expense total is divided among its participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entries", rename_all = "lowercase")]
pub enum SplitPolicy {
    Equal,
    Exact(Vec<ExactShare>),
    Percentage(Vec<PercentageShare>),
}

/// Divide `total` among `participants` according to `policy`.
///
/// `participants` order matters: it decides who receives leftover cents of an
/// equal split. Repeated participants are counted once.
pub fn split(policy: &SplitPolicy, total: Money, participants: &[MemberId]) -> LedgerResult<Shares> {
    if total.is_negative() {
        return Err(LedgerError::InvalidAmount {
            amount: total,
            reason: "split total must not be negative",
        });
    }

    let participants = distinct_in_order(participants);
    match policy {
        SplitPolicy::Equal => split_equal(total, &participants),
        SplitPolicy::Exact(entries) => split_exact(total, &participants, entries),
        SplitPolicy::Percentage(entries) => split_percentage(total, &participants, entries),
    }
}

fn distinct_in_order(participants: &[MemberId]) -> Vec<MemberId> {
    let mut seen = HashSet::with_capacity(participants.len());
    participants
        .iter()
        .copied()
        .filter(|member| seen.insert(*member))
        .collect()
}

fn ensure_participant(participants: &[MemberId], member: MemberId) -> LedgerResult<()> {
    if participants.contains(&member) {
        Ok(())
    } else {
        Err(LedgerError::NotAParticipant { member })
    }
}

fn split_equal(total: Money, participants: &[MemberId]) -> LedgerResult<Shares> {
    if participants.is_empty() {
        return Err(LedgerError::EmptyParticipantSet);
    }

    let count = participants.len() as i64;
    let base = total.cents() / count;
    let remainder = (total.cents() % count) as usize;

    Ok(participants
        .iter()
        .enumerate()
        .map(|(idx, member)| {
            let extra = i64::from(idx < remainder);
            (*member, Money::from_cents(base + extra))
        })
        .collect())
}

fn split_exact(total: Money, participants: &[MemberId], entries: &[ExactShare]) -> LedgerResult<Shares> {
    let mut shares = Shares::new();
    let mut sum = Money::ZERO;

    for entry in entries {
        ensure_participant(participants, entry.member)?;
        if entry.amount.is_negative() {
            return Err(LedgerError::NegativeShare { member: entry.member });
        }

        sum = sum.checked_add(entry.amount).ok_or(LedgerError::AmountOverflow)?;
        *shares.entry(entry.member).or_default() += entry.amount;
    }

    if sum != total {
        return Err(LedgerError::SplitSumMismatch {
            expected: total,
            actual: sum,
        });
    }

    Ok(shares)
}

fn split_percentage(
    total: Money,
    participants: &[MemberId],
    entries: &[PercentageShare],
) -> LedgerResult<Shares> {
    // Merge repeated members, keeping first-seen order for tie breaks.
    let mut merged: Vec<PercentageShare> = Vec::with_capacity(entries.len());
    for entry in entries {
        ensure_participant(participants, entry.member)?;
        if !entry.percentage.is_finite() || entry.percentage < 0.0 {
            return Err(LedgerError::NegativeShare { member: entry.member });
        }

        match merged.iter_mut().find(|m| m.member == entry.member) {
            Some(existing) => existing.percentage += entry.percentage,
            None => merged.push(*entry),
        }
    }

    let sum: f64 = merged.iter().map(|e| e.percentage).sum();
    if (sum - 100.0).abs() > PERCENTAGE_TOLERANCE {
        return Err(LedgerError::PercentageSumInvalid { sum });
    }

    let mut cents = Vec::with_capacity(merged.len());
    let mut fractions = Vec::with_capacity(merged.len());
    for entry in &merged {
        let raw = total.cents() as f64 * entry.percentage / 100.0;
        let floor = raw.floor();
        cents.push(floor as i64);
        fractions.push(raw - floor);
    }

    // Largest fractional part first; stable sort keeps input order on ties.
    let mut order: Vec<usize> = (0..merged.len()).collect();
    order.sort_by(|&a, &b| fractions[b].total_cmp(&fractions[a]));

    // Floors of a total near i64::MAX can add up past it; sum wide.
    let floors: i128 = cents.iter().map(|&c| i128::from(c)).sum();
    let remainder = i64::try_from(i128::from(total.cents()) - floors)
        .map_err(|_| LedgerError::AmountOverflow)?;
    if remainder >= 0 {
        let len = order.len() as i64;
        for (rank, &idx) in order.iter().enumerate() {
            cents[idx] += remainder / len + i64::from((rank as i64) < remainder % len);
        }
    } else {
        // Float error pushed the floors past the total: take cents back from
        // the smallest fractions, never below zero.
        let mut deficit = -remainder;
        while deficit > 0 {
            for &idx in order.iter().rev() {
                if deficit == 0 {
                    break;
                }
                if cents[idx] > 0 {
                    cents[idx] -= 1;
                    deficit -= 1;
                }
            }
        }
    }

    Ok(merged
        .iter()
        .zip(cents)
        .map(|(entry, amount)| (entry.member, Money::from_cents(amount)))
        .collect())
}
