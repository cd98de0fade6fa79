use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;
use tabsplit_core::{ExpenseId, GroupId, MemberId, Money, SettlementId};
use tabsplit_ledger::{
    net_balances, simplify, split, Expense, ExpenseDraft, NetBalances, Settlement, SplitPolicy,
};
use uuid::Uuid;

fn members(n: usize) -> Vec<MemberId> {
    (1..=n as u128)
        .map(|i| MemberId::from_uuid(Uuid::from_u128(i)))
        .collect()
}

/// A deterministic, zero-sum balance vector with alternating signs.
fn balances(n: usize) -> NetBalances {
    let members = members(n);
    let mut balances = NetBalances::new();
    let mut sum = 0i64;
    for (i, m) in members.iter().enumerate().skip(1) {
        let amount = ((i as i64 * 7_919) % 50_000 + 1) * if i % 2 == 0 { 1 } else { -1 };
        sum += amount;
        balances.insert(*m, Money::from_cents(amount));
    }
    balances.insert(members[0], Money::from_cents(-sum));
    balances
}

/// `count` equal-split expenses rotating the payer, plus a settlement per expense.
fn history(group: GroupId, members: &[MemberId], count: usize) -> (Vec<Expense>, Vec<Settlement>) {
    let now = Utc::now();
    let mut expenses = Vec::with_capacity(count);
    let mut settlements = Vec::with_capacity(count);
    for i in 0..count {
        let payer = members[i % members.len()];
        let debtor = members[(i + 1) % members.len()];
        let total = Money::from_cents(1_000 + i as i64);
        let shares = split(&SplitPolicy::Equal, total, members).expect("equal split");
        expenses.push(
            Expense::new(ExpenseDraft {
                id: ExpenseId::new(),
                group_id: group,
                paid_by: payer,
                total,
                participants: members.to_vec(),
                shares,
                description: None,
                occurred_at: now,
            })
            .expect("valid expense"),
        );
        settlements.push(
            Settlement::new(SettlementId::new(), group, debtor, payer, Money::from_cents(10), now)
                .expect("valid settlement"),
        );
    }
    (expenses, settlements)
}

fn bench_simplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplify");
    for size in [10usize, 100, 1_000] {
        let input = balances(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| simplify(black_box(input)))
        });
    }
    group.finish();
}

fn bench_net_balances(c: &mut Criterion) {
    let group_id = GroupId::new();
    let members = members(8);

    let mut group = c.benchmark_group("net_balances");
    for count in [100usize, 1_000, 10_000] {
        let (expenses, settlements) = history(group_id, &members, count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &(expenses, settlements),
            |b, (expenses, settlements)| {
                b.iter(|| {
                    net_balances(
                        members.iter().copied(),
                        black_box(expenses),
                        black_box(settlements),
                    )
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_simplify, bench_net_balances);
criterion_main!(benches);
