use super::*;
use crate::algebra::CscMatrix;

fn test_matrix_4x4() -> CscMatrix<f64> {
    // A =
    //[ 8.0  -3.0   2.0    ⋅ ]
    //[  ⋅    8.0  -1.0    ⋅ ]
    //[  ⋅     ⋅    8.0  -1.0]
    //[  ⋅     ⋅     ⋅    1.0]
    CscMatrix::new(
        4,
        4,
        vec![0, 1, 3, 6, 8],
        vec![0, 0, 1, 0, 1, 2, 2, 3],
        vec![8., -3., 8., 2., -1., 8., -1., 1.],
    )
}

fn test_kkt_3x3() -> CscMatrix<f64> {
    // K =
    //[ 2.0   ⋅    1.0]
    //[  ⋅   2.0   1.0]
    //[  ⋅    ⋅     ⋅ ]   (structural zero on the last diagonal)
    CscMatrix::new(3, 3, vec![0, 1, 2, 5], vec![0, 1, 0, 1, 2], vec![2., 2., 1., 1., 0.])
}

fn natural_order(n: usize) -> QDLDLSettings<f64> {
    QDLDLSettingsBuilder::default()
        .perm((0..n).collect())
        .build()
        .unwrap()
}

#[test]
fn test_invperm() {
    assert_eq!(_invperm(&[3, 0, 2, 1]).unwrap(), vec![1, 3, 2, 0]);
    assert_eq!(_invperm(&[3, 0, 2, 0]), Err(QDLDLError::InvalidPermutation));
    assert_eq!(_invperm(&[4, 0, 2, 1]), Err(QDLDLError::InvalidPermutation));
}

#[test]
fn test_permute() {
    let perm = vec![3, 0, 2, 1];
    let b = vec![1., 2., 3., 4.];
    let mut x = vec![0.; 4];
    let mut y = vec![0.; 4];

    _permute(&mut x, &b, &perm);
    assert_eq!(x, vec![4., 1., 3., 2.]);

    _ipermute(&mut y, &x, &perm);
    assert_eq!(y, b);
}

#[test]
fn test_solve_from_factors() {
    //L =
    //[ ⋅    ⋅     ⋅    ⋅ ]
    //[1.0   ⋅     ⋅    ⋅ ]
    //[2.0  1.0    ⋅    ⋅ ]
    //[ ⋅   7.0  -3.0   ⋅ ]
    let Lp = vec![0, 2, 4, 5, 5];
    let Li = vec![1, 2, 2, 3, 3];
    let Lx = vec![1., 2., 1., 7., -3.];
    let dinv = [0.25, -1.0, -0.5, 1.0];
    let x = vec![-3., 2., 1., 4.];

    let mut b = vec![-3., -1., -3., 15.];
    _lsolve(&Lp, &Li, &Lx, &mut b);
    assert_eq!(b, x);

    let mut b = vec![1., 31., -11., 4.];
    _ltsolve(&Lp, &Li, &Lx, &mut b);
    assert_eq!(b, x);

    let mut b = vec![4., -27., -1., -279.];
    _solve(&Lp, &Li, &Lx, &dinv, &mut b);
    assert_eq!(b, x);
}

#[test]
fn test_etree() {
    let A = test_matrix_4x4();
    let n = 4;
    let mut Lnz = vec![0; n];
    let mut iwork = vec![0; 3 * n];
    let mut etree = vec![0; n];

    _etree(n, &A.colptr, &A.rowval, &mut iwork, &mut Lnz, &mut etree);
    assert_eq!(etree, vec![1, 2, 3, QDLDL_UNKNOWN]);
    assert_eq!(Lnz, vec![2, 1, 1, 0]);
}

#[test]
fn test_permute_symmetric() {
    let mut A = test_matrix_4x4();
    let (P, AtoPAPt) = _permute_symmetric(&A, &[0, 1, 2, 3]);
    assert_eq!(&A.colptr, &P.colptr);
    assert_eq!(&A.rowval, &P.rowval);
    assert_eq!(AtoPAPt, (0..A.nnz()).collect::<Vec<_>>());

    // rows within a column of PAPt are not sorted
    for i in 0..A.nzval.len() {
        A.nzval[i] = i as f64 + 1.;
    }
    let iperm = _invperm(&[2, 3, 0, 1]).unwrap();
    let (P, _) = _permute_symmetric(&A, &iperm);

    assert_eq!(&P.colptr, &vec![0, 1, 3, 5, 8]);
    assert_eq!(&P.rowval, &vec![0, 0, 1, 2, 0, 2, 3, 0]);
    assert_eq!(&P.nzval, &vec![6.0, 7.0, 8.0, 1.0, 4.0, 2.0, 3.0, 5.0]);
}

#[test]
fn test_settings_builder() {
    let opts = QDLDLSettings::<f64>::default();
    assert_eq!(opts.zero_pivot_tol, 0.0);
    assert!(opts.perm.is_none());

    let opts = QDLDLSettingsBuilder::default()
        .perm(vec![0, 1, 2, 3])
        .logical(true)
        .zero_pivot_tol(1e-10)
        .build()
        .unwrap();
    assert_eq!(opts.zero_pivot_tol, 1e-10);
    assert!(opts.logical);
}

#[test]
fn test_solve_basic() {
    let A = test_matrix_4x4();
    let x = [1., -2., 3., -4.];

    for opts in [Some(natural_order(4)), None] {
        let mut factors = QDLDLFactorisation::new(&A, opts).unwrap();
        let mut b = [20.0, -22.0, 32.0, -7.0];
        factors.solve(&mut b);
        assert!(x.norm_inf_diff(&b) <= 1e-12);
        assert_eq!(factors.positive_inertia(), 4);
        assert_eq!(factors.negative_inertia(), 0);
    }
}

#[test]
#[should_panic]
fn test_solve_logical() {
    let A = test_matrix_4x4();
    let opts = QDLDLSettingsBuilder::default().logical(true).build().unwrap();

    let mut factors = QDLDLFactorisation::new(&A, Some(opts)).unwrap();
    let mut b = [20.0, -22.0, 32.0, -7.0];
    factors.solve(&mut b);
}

#[test]
fn test_update_and_refactor() {
    let A = test_matrix_4x4();
    let opts = QDLDLSettingsBuilder::default().logical(true).build().unwrap();
    let mut factors = QDLDLFactorisation::new(&A, Some(opts)).unwrap();
    assert!(factors.refactor().is_ok());

    // scaling every entry by 2 halves the solution
    let doubled: Vec<f64> = A.nzval.iter().map(|v| 2. * v).collect();
    factors.update_all_values(&doubled);
    assert!(factors.refactor().is_ok());

    let mut b = [20.0, -22.0, 32.0, -7.0];
    factors.solve(&mut b);
    assert!([0.5, -1., 1.5, -2.].norm_inf_diff(&b) <= 1e-12);

    // make the last diagonal strongly negative.  Index 7 is the (3,3) entry
    factors.update_values(&[7], &[-10.]);
    assert!(factors.refactor().is_ok());
    assert_eq!(factors.positive_inertia(), 3);
    assert_eq!(factors.negative_inertia(), 1);
}

#[test]
fn test_indefinite_inertia() {
    let K = test_kkt_3x3();
    let mut factors = QDLDLFactorisation::new(&K, Some(natural_order(3))).unwrap();
    assert_eq!(factors.positive_inertia(), 2);
    assert_eq!(factors.negative_inertia(), 1);

    // K * [1, 1, -1] = [1, 1, 2]
    let mut b = [1., 1., 2.];
    factors.solve(&mut b);
    assert!([1., 1., -1.].norm_inf_diff(&b) <= 1e-12);
}

#[test]
fn test_zero_pivot() {
    // exact zero in the leading position
    let mut A = test_matrix_4x4();
    A.nzval[0] = 0.;
    let err = QDLDLFactorisation::new(&A, Some(natural_order(4))).unwrap_err();
    assert_eq!(err, QDLDLError::ZeroPivot);

    // singular 2x2 with a zero appearing during elimination
    let S = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![1., 1., 1.]);
    let err = QDLDLFactorisation::new(&S, Some(natural_order(2))).unwrap_err();
    assert_eq!(err, QDLDLError::ZeroPivot);
}

#[test]
fn test_zero_pivot_tolerance() {
    let S = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![1., 1., 1. + 1e-14]);
    assert!(QDLDLFactorisation::new(&S, Some(natural_order(2))).is_ok());

    let opts = QDLDLSettingsBuilder::default()
        .perm(vec![0, 1])
        .zero_pivot_tol(1e-12)
        .build()
        .unwrap();
    let err = QDLDLFactorisation::new(&S, Some(opts)).unwrap_err();
    assert_eq!(err, QDLDLError::ZeroPivot);
}

#[test]
fn test_structure_errors() {
    // lower triangular entry
    let A = CscMatrix::new(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![1., 1., 1.]);
    assert_eq!(
        QDLDLFactorisation::new(&A, None).unwrap_err(),
        QDLDLError::NotUpperTriangular
    );

    // empty column
    let A = CscMatrix::new(2, 2, vec![0, 1, 1], vec![0], vec![1.]);
    assert_eq!(
        QDLDLFactorisation::new(&A, None).unwrap_err(),
        QDLDLError::EmptyColumn
    );

    // not square
    let A = CscMatrix::<f64>::spalloc(2, 3, 0);
    assert_eq!(
        QDLDLFactorisation::new(&A, None).unwrap_err(),
        QDLDLError::IncompatibleDimension
    );
}
