// =========================================================================
// KFold partition contract
//
// Every row lands in exactly one test fold, train and test never overlap,
// and together they cover all rows, shuffled or not.
//
// References:
//   - Stone (1974) "Cross-Validatory Choice and Assessment of Predictions"
// =========================================================================

use super::*;
use std::collections::HashSet;

#[test]
fn kfold_produces_k_splits() {
    let splits = KFold::new(5).split(100).expect("valid folds");
    assert_eq!(splits.len(), 5);
}

#[test]
fn kfold_every_sample_in_one_test_fold() {
    let splits = KFold::new(5).split(20).expect("valid folds");

    let mut test_counts = vec![0usize; 20];
    for (_train, test) in &splits {
        for &idx in test {
            test_counts[idx] += 1;
        }
    }
    for (i, &count) in test_counts.iter().enumerate() {
        assert_eq!(count, 1, "sample {i} appeared in {count} test folds");
    }
}

#[test]
fn kfold_remainder_goes_to_first_folds() {
    let splits = KFold::new(4).split(17).expect("valid folds");
    let sizes: Vec<usize> = splits.iter().map(|(_, test)| test.len()).collect();
    assert_eq!(sizes, vec![5, 4, 4, 4]);

    for (fold_idx, (train, test)) in splits.iter().enumerate() {
        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 17, "fold {fold_idx} does not cover every row");
    }
}

#[test]
fn kfold_train_test_disjoint() {
    let splits = KFold::new(3).with_shuffle(11).split(30).expect("valid folds");
    for (fold_idx, (train, test)) in splits.iter().enumerate() {
        let train_set: HashSet<usize> = train.iter().copied().collect();
        assert!(
            test.iter().all(|idx| !train_set.contains(idx)),
            "fold {fold_idx} leaks test rows into train"
        );
    }
}

#[test]
fn kfold_unshuffled_folds_are_contiguous() {
    let splits = KFold::new(3).split(6).expect("valid folds");
    assert_eq!(splits[0], (vec![2, 3, 4, 5], vec![0, 1]));
    assert_eq!(splits[1], (vec![0, 1, 4, 5], vec![2, 3]));
    assert_eq!(splits[2], (vec![0, 1, 2, 3], vec![4, 5]));
}

#[test]
fn kfold_shuffle_is_seeded() {
    let a = KFold::new(4).with_shuffle(7).split(40).expect("valid folds");
    let b = KFold::new(4).with_shuffle(7).split(40).expect("valid folds");
    let plain = KFold::new(4).split(40).expect("valid folds");
    assert_eq!(a, b);
    assert_ne!(a, plain);
}

#[test]
fn kfold_rejects_bad_fold_counts() {
    assert!(matches!(
        KFold::new(1).split(10),
        Err(AdspendError::InvalidHyperparameter { .. })
    ));
    assert!(KFold::new(11).split(10).is_err());
    assert!(KFold::new(10).split(10).is_ok());
}

mod kfold_proptest {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn prop_k_splits(k in 2..=10usize, n in 10..=50usize) {
            let splits = KFold::new(k).split(n).expect("k <= n");
            prop_assert_eq!(splits.len(), k);
        }

        #[test]
        fn prop_sample_coverage(k in 2..=5usize, n in 10..=30usize, seed in any::<u64>()) {
            let splits = KFold::new(k).with_shuffle(seed).split(n).expect("k <= n");

            let mut test_counts = vec![0usize; n];
            for (train, test) in &splits {
                prop_assert_eq!(train.len() + test.len(), n);
                for &idx in test {
                    test_counts[idx] += 1;
                }
            }
            prop_assert!(test_counts.iter().all(|&c| c == 1));
        }
    }
}
