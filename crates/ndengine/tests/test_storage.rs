//! Tests for backend selection and storage behaviour.
//!
//! Covers:
//! - Default size heuristics
//! - Injected selectors, including user-defined ones
//! - Identical observable values across backends
//! - The copy-on-write flag

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ndengine::storage::{
    BackendKind, BackendSelector, DefaultSelector, DenseBackend, FixedSelector, InitialData,
    StorageBackend,
};
use ndengine::{ArrayConfig, NdArray, Result, Shape, SliceSpec, s};

/// Selector that counts how often it is consulted.
#[derive(Debug, Default)]
struct CountingSelector {
    calls: AtomicUsize,
}

impl BackendSelector<i64> for CountingSelector {
    fn select_backend(
        &self,
        shape: Shape,
        initial: InitialData<i64>,
    ) -> Result<Box<dyn StorageBackend<i64>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let backend = match initial {
            InitialData::Fill(value) => DenseBackend::filled(shape, value),
            InitialData::Values(values) => DenseBackend::from_vec(shape, values)?,
        };
        Ok(Box::new(backend))
    }
}

fn config(kind: BackendKind) -> ArrayConfig<i64> {
    ArrayConfig::default().with_selector(Arc::new(FixedSelector::new(kind).with_block_len(7)))
}

/// Default heuristics pick a backend by size and initial data.
#[test]
fn test_default_selector_thresholds() {
    let selector = DefaultSelector::new()
        .with_sparse_threshold(100)
        .with_chunk_threshold(1000);
    let small = Shape::new(&[5, 5]);
    let medium = Shape::new(&[10, 10]);
    let large = Shape::new(&[40, 40]);

    assert_eq!(selector.choose(&small, &InitialData::Fill(0.0)), BackendKind::Dense);
    assert_eq!(selector.choose(&medium, &InitialData::Fill(0.0)), BackendKind::Sparse);
    assert_eq!(
        selector.choose(&medium, &InitialData::Values(vec![0.0; 100])),
        BackendKind::Dense
    );
    assert_eq!(
        selector.choose(&large, &InitialData::Values(vec![0.0; 1600])),
        BackendKind::Chunked
    );
}

/// Every construction path goes through the injected selector.
#[test]
fn test_injected_selector_is_used() {
    let selector = Arc::new(CountingSelector::default());
    let config = ArrayConfig::new(selector.clone());

    let a = NdArray::from_flat_with_config(vec![1, 2, 3, 4], &[2, 2], config.clone()).unwrap();
    let b = NdArray::filled_with_config(&[3], 9, config).unwrap();
    assert_eq!(selector.calls.load(Ordering::SeqCst), 2);

    // Derived arrays reuse the config they were built with.
    let _ = a.map(|x| x * 2).unwrap();
    let _ = b.slice(&s![0..2]).unwrap();
    assert!(selector.calls.load(Ordering::SeqCst) >= 3);
}

/// The same operations give the same values on every backend.
#[test]
fn test_backends_agree() {
    let data: Vec<i64> = (0..60).collect();
    let dense = NdArray::from_flat_with_config(data.clone(), &[3, 4, 5], config(BackendKind::Dense)).unwrap();
    for kind in [BackendKind::Chunked, BackendKind::Sparse] {
        let mut other = NdArray::from_flat_with_config(data.clone(), &[3, 4, 5], config(kind)).unwrap();
        assert_eq!(other.backend_kind(), kind);
        assert_eq!(other, dense);

        let specs = [SliceSpec::from(1..), SliceSpec::Single(1), SliceSpec::stepped(0, 5, 2)];
        let a = dense.slice(&specs).unwrap().into_array().unwrap();
        let b = other.slice(&specs).unwrap().into_array().unwrap();
        assert_eq!(a.dims(), &[2, 3]);
        assert_eq!(a, b);

        other.set(&[2, 3, 4], -1).unwrap();
        assert_eq!(other.get(&[2, 3, 4]).unwrap(), -1);
        assert_eq!(other.get(&[2, 3, 3]).unwrap(), 58);
    }
}

/// Sparse storage stays small for a mostly constant array.
#[test]
fn test_sparse_memory_usage() {
    let cfg = config(BackendKind::Sparse);
    let mut a: NdArray<i64> = NdArray::zeros_with_config(&[1000, 1000], cfg).unwrap();
    a.set(&[10, 10], 5).unwrap();
    assert!(a.memory_usage() < 1024);
    assert_eq!(a.sum(), 5);

    let dense: NdArray<i64> = NdArray::zeros(&[100, 100]).unwrap();
    assert_eq!(dense.memory_usage(), 100 * 100 * 8);
}

/// With copy-on-write off, reshape always copies.
#[test]
fn test_copy_on_write_disabled() {
    let cfg = ArrayConfig::default().with_copy_on_write(false);
    let a = NdArray::from_flat_with_config(vec![1, 2, 3, 4], &[2, 2], cfg).unwrap();
    assert!(!a.config().copy_on_write());
    let r = a.reshape(&[4]).unwrap();
    assert!(!r.shares_storage_with(&a));
    assert_eq!(r.to_flat_vec(), a.to_flat_vec());
}
