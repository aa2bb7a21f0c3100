//! Property-based tests for the ordering engine
//!
//! Random operation sequences run against a real database and a plain
//! `Vec` model side by side. After every step the stored positions must be
//! exactly 1..=N and match the model's order.

mod test_helpers;

use encore_core::{is_contiguous, MemberRef, QueueMember};
use encore_storage::positions::PlayQueue;
use encore_storage::{Coordinator, OrderingConfig, OrderingEngine, SqlPositionStore};
use proptest::prelude::*;
use test_helpers::*;

#[derive(Debug, Clone)]
enum Op {
    Append(usize),
    InsertAtHead(usize),
    /// Index into the current entries, modulo their count
    Remove(usize),
    /// Rotate the current order left by this many places
    Rotate(usize),
    Reverse,
    Clear,
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..4).prop_map(Op::Append),
        3 => (0usize..4).prop_map(Op::InsertAtHead),
        3 => any::<usize>().prop_map(Op::Remove),
        2 => any::<usize>().prop_map(Op::Rotate),
        1 => Just(Op::Reverse),
        1 => Just(Op::Clear),
    ]
}

async fn run_sequence(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let user = create_test_user(pool, "listener").await;
    let songs = create_test_songs(pool, 4).await;
    let engine = OrderingEngine::new(
        SqlPositionStore::<PlayQueue>::new(),
        Coordinator::new(pool.clone(), OrderingConfig::default()),
    );

    // Entry ids in expected position order
    let mut model: Vec<i64> = Vec::new();

    for op in ops {
        match op {
            Op::Append(song) => {
                let placement = engine
                    .append(user, &QueueMember::Song(songs[song]))
                    .await
                    .unwrap();
                prop_assert_eq!(placement.position, model.len() as i64 + 1);
                model.push(placement.entry_id);
            }
            Op::InsertAtHead(song) => {
                let placement = engine
                    .insert_at_head(user, &QueueMember::Song(songs[song]))
                    .await
                    .unwrap();
                prop_assert_eq!(placement.position, 1);
                model.insert(0, placement.entry_id);
            }
            Op::Remove(index) => {
                if model.is_empty() {
                    continue;
                }
                let entry = model.remove(index % model.len());
                engine.remove(user, &MemberRef::Entry(entry)).await.unwrap();
            }
            Op::Rotate(by) => {
                if !model.is_empty() {
                    let by = by % model.len();
                    model.rotate_left(by);
                }
                engine.bulk_reorder_entries(user, &model).await.unwrap();
            }
            Op::Reverse => {
                model.reverse();
                engine.bulk_reorder_entries(user, &model).await.unwrap();
            }
            Op::Clear => {
                let removed = engine.clear(user).await.unwrap();
                prop_assert_eq!(removed, model.len() as u64);
                model.clear();
            }
        }

        let rows = engine.list(user).await.unwrap();
        prop_assert!(is_contiguous(&rows), "positions not contiguous: {:?}", rows);
        let stored: Vec<i64> = rows.iter().map(|row| row.entry_id).collect();
        prop_assert_eq!(&stored, &model);
    }

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: positions stay exactly 1..=N and follow the model order
    #[test]
    fn positions_stay_contiguous(ops in prop::collection::vec(arbitrary_op(), 1..30)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(run_sequence(ops))?;
    }
}
