//! Tests for the eager array API.
//!
//! Covers:
//! - Construction from flat data, nested lists and generators
//! - Row-major scan order of filters
//! - Slicing and the rank-tagged result
//! - Reshape aliasing and copy-on-write
//! - Attributes carried by derived arrays

use approx::assert_relative_eq;
use ndengine::{ArrayError, ErrorKind, NdArray, Nested, SliceResult, SliceSpec, Value, nested, s};

fn grid() -> NdArray<i32> {
    NdArray::from_nested(nested![[1, 2, 3], [4, 5, 6], [7, 8, 9]]).unwrap()
}

/// `[[1,2],[3,4]].where(x > 1)` scans in row-major order.
#[test]
fn test_where_row_major_order() {
    let a = NdArray::from_nested(nested![[1, 2], [3, 4]]).unwrap();
    let r = a.where_(|&x| x > 1).unwrap();
    assert_eq!(r.dims(), &[3]);
    assert_eq!(r.to_flat_vec(), vec![2, 3, 4]);
    assert_eq!(a.where_indices(|&x| x > 1), vec![1, 2, 3]);
}

/// Selecting a single row drops the first axis.
#[test]
fn test_slice_drops_dimension() {
    let row = grid().slice(&s![1]).unwrap();
    let SliceResult::Vector(row) = row else {
        panic!("expected a vector, got {row:?}");
    };
    assert_eq!(row.to_flat_vec(), vec![4, 5, 6]);
}

/// A slice of single positions on every axis is a bare element.
#[test]
fn test_slice_all_single_is_scalar() {
    assert_eq!(grid().slice(&s![2, -1]).unwrap(), SliceResult::Scalar(9));
}

/// Result variants follow the rank of the selection.
#[test]
fn test_slice_result_classification() {
    let a = NdArray::from_fn(&[2, 3, 4, 5], |idx| idx.iter().sum::<usize>()).unwrap();
    assert!(matches!(a.slice(&[]).unwrap(), SliceResult::NdArray(_)));
    assert!(matches!(a.slice(&s![0]).unwrap(), SliceResult::Cube(_)));
    assert!(matches!(a.slice(&s![0, 1]).unwrap(), SliceResult::Matrix(_)));
    assert!(matches!(a.slice(&s![0, 1, 2]).unwrap(), SliceResult::Vector(_)));
    assert_eq!(a.slice(&s![1, 2, 3, 4]).unwrap().into_scalar(), Some(10));
}

/// Stepped and negative ranges select the expected positions.
#[test]
fn test_slice_stepped_columns() {
    let a = NdArray::from_flat((0..20).collect::<Vec<i32>>(), &[4, 5]).unwrap();
    let r = a
        .slice(&[SliceSpec::All, SliceSpec::stepped(0, 5, 2)])
        .unwrap()
        .into_array()
        .unwrap();
    assert_eq!(r.dims(), &[4, 3]);
    assert_eq!(r.get(&[3, 2]).unwrap(), 19);

    let tail = a.slice(&s![-1, -2..]).unwrap().into_array().unwrap();
    assert_eq!(tail.to_flat_vec(), vec![18, 19]);
}

#[test]
fn test_slice_errors() {
    let a = grid();
    assert_eq!(a.slice(&s![3]).unwrap_err().kind(), ErrorKind::IndexOutOfRange);
    assert_eq!(a.slice(&s![0, 0, 0]).unwrap_err().kind(), ErrorKind::InvalidSliceSpec);
}

/// `from_flat([1..6], [2, 3]).reshape([3, 2])`.
#[test]
fn test_reshape_literal() {
    let a = NdArray::from_flat(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
    let r = a.reshape(&[3, 2]).unwrap();
    assert_eq!(r.to_nested(), nested![[1, 2], [3, 4], [5, 6]]);
}

/// Reshape aliases until one side is written.
#[test]
fn test_reshape_copy_on_write() {
    let a = NdArray::from_flat(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
    let mut r = a.reshape(&[4]).unwrap();
    assert!(r.shares_storage_with(&a));

    r.set(&[0], 10.0).unwrap();
    assert!(!r.shares_storage_with(&a));
    assert_eq!(a.get(&[0, 0]).unwrap(), 1.0);
    assert_eq!(r.get(&[0]).unwrap(), 10.0);
}

#[test]
fn test_reshape_size_mismatch() {
    let a = NdArray::from_flat(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
    assert_eq!(
        a.reshape(&[4]).unwrap_err(),
        ArrayError::ShapeMismatch {
            expected: vec![2, 3],
            actual: vec![4]
        }
    );
}

#[test]
fn test_nested_round_trip() {
    let n = nested![[[1.5, 2.5]], [[3.5, 4.5]]];
    let a = NdArray::from_nested(n.clone()).unwrap();
    assert_eq!(a.dims(), &[2, 1, 2]);
    assert_eq!(a.to_nested(), n);
}

#[test]
fn test_nested_jagged_rejected() {
    let e = NdArray::from_nested(nested![[1, 2], [3]]).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::ShapeMismatch);
    let e = NdArray::<i32>::from_nested(Nested::List(vec![])).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_generators_reject_empty_shapes() {
    assert_eq!(NdArray::<f64>::zeros(&[]).unwrap_err().kind(), ErrorKind::InvalidArgument);
    assert_eq!(NdArray::filled(&[3, 0], 1u8).unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_arange_and_reductions() {
    let a = NdArray::<f64>::arange(10).unwrap().reshape(&[2, 5]).unwrap();
    assert_relative_eq!(a.sum(), 45.0);
    assert_relative_eq!(a.mean().unwrap(), 4.5);
    assert_eq!(a.min(), Some(0.0));
    assert_eq!(a.max(), Some(9.0));
    assert_eq!(a.sum_axis(0).unwrap().to_flat_vec(), vec![5.0, 7.0, 9.0, 11.0, 13.0]);
}

#[test]
fn test_find_and_put() {
    let mut a = grid();
    assert_eq!(a.find_first(|&x| x % 4 == 0), Some((vec![1, 0], 4)));
    assert_eq!(a.find_last(|&x| x % 4 == 0), Some((vec![2, 1], 8)));

    a.put_at(&[vec![0, 0], vec![2, 2]], &[-1, -9]).unwrap();
    assert_eq!(a.take(&[0, 4, 8]).unwrap().to_flat_vec(), vec![-1, 5, -9]);

    let e = a.put(&[0, 1], &[1]).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::ShapeMismatch);
}

#[test]
fn test_transpose_and_concatenate() {
    let a = NdArray::from_flat((0..6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
    let t = a.t().unwrap();
    assert_eq!(t.dims(), &[3, 2]);
    assert_eq!(t.get(&[2, 1]).unwrap(), a.get(&[1, 2]).unwrap());

    let joined = ndengine::concatenate(&[&a, &a], 0).unwrap();
    assert_eq!(joined.dims(), &[4, 3]);
    assert_eq!(joined.get(&[3, 2]).unwrap(), 5);
}

/// Derived arrays keep attributes; filtered ones start clean.
#[test]
fn test_attrs_propagation() {
    let a = grid().with_attr("units", "K").with_attr("scale", 2.0);
    assert_eq!(a.attrs().get("units"), Some(&Value::from("K")));

    let mapped = a.map(|x| x + 1).unwrap();
    assert_eq!(mapped.attrs(), a.attrs());
    let reshaped = a.reshape(&[9]).unwrap();
    assert_eq!(reshaped.attrs().len(), 2);
    let filtered = a.where_(|&x| x > 3).unwrap();
    assert!(filtered.attrs().is_empty());
}

#[test]
fn test_streaming_fold() {
    let a = NdArray::from_flat((1..=12).collect::<Vec<i64>>(), &[6, 2]).unwrap();
    let total = a
        .fold_chunks(0, 4, 0i64, |acc, chunk| Ok(acc + chunk.array.sum()))
        .unwrap();
    assert_eq!(total, 78);
}

/// Arrays of dynamic values support the generic API.
#[test]
fn test_dynamic_value_array() {
    let a = NdArray::from_flat(
        vec![Value::from(1), Value::Null, Value::from("x"), Value::from(2.5)],
        &[2, 2],
    )
    .unwrap();
    assert_eq!(a.count_where(|v| v.is_null()), 1);
    let numbers = a.where_(|v| v.as_f64().is_some()).unwrap();
    assert_eq!(numbers.to_flat_vec(), vec![Value::Int(1), Value::Float(2.5)]);
    assert_eq!(a.slice(&s![1, 0]).unwrap().into_scalar(), Some(Value::from("x")));
}
