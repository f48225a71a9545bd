#![allow(non_snake_case)]
use crate::algebra::*;
use core::cmp::{max, min};
use derive_builder::Builder;
use std::iter::zip;
use thiserror::Error;

/// Error codes returnable from [`QDLDLFactorisation`](QDLDLFactorisation) factor operations

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QDLDLError {
    #[error("Matrix dimension fields are incompatible")]
    IncompatibleDimension,
    #[error("Matrix has a zero column")]
    EmptyColumn,
    #[error("Matrix is not upper triangular")]
    NotUpperTriangular,
    #[error("Matrix factorization produced a zero pivot")]
    ZeroPivot,
    #[error("Invalid permutation vector")]
    InvalidPermutation,
    #[error("Fill reducing ordering failed")]
    OrderingFailed,
}

/// Required settings for [`QDLDLFactorisation`](QDLDLFactorisation)

#[derive(Builder, Debug, Clone)]
pub struct QDLDLSettings<T: FloatT> {
    /// scaling applied to the AMD dense row threshold
    #[builder(default = "1.0")]
    amd_dense_scale: f64,
    /// user supplied ordering.  AMD is used if none is given
    #[builder(default = "None", setter(strip_option))]
    perm: Option<Vec<usize>>,
    /// compute the symbolic factorization only
    #[builder(default = "false")]
    logical: bool,
    /// pivots with magnitude at or below this value are treated as zero
    #[builder(default = "T::zero()")]
    zero_pivot_tol: T,
}

impl<T> Default for QDLDLSettings<T>
where
    T: FloatT,
{
    fn default() -> QDLDLSettings<T> {
        QDLDLSettingsBuilder::<T>::default().build().unwrap()
    }
}

/// Performs $LDL^T$ factorization of a symmetric matrix
/// supplied in upper triangular form.

#[derive(Debug)]
pub struct QDLDLFactorisation<T = f64> {
    // permutation vector
    pub perm: Vec<usize>,
    // lower triangular factor
    pub L: CscMatrix<T>,
    // D and is inverse for A = LDL^T
    pub D: Vec<T>,
    pub Dinv: Vec<T>,
    // workspace data
    workspace: QDLDLWorkspace<T>,
    // is it logical factorisation only?
    is_logical: bool,
}

impl<T> QDLDLFactorisation<T>
where
    T: FloatT,
{
    pub fn new(
        Ain: &CscMatrix<T>,
        opts: Option<QDLDLSettings<T>>,
    ) -> Result<QDLDLFactorisation<T>, QDLDLError> {
        check_structure(Ain)?;
        _qdldl_new(Ain, opts)
    }

    /// number of positive pivots in the most recent numeric factorization
    pub fn positive_inertia(&self) -> usize {
        self.workspace.positive_inertia
    }

    /// number of negative pivots in the most recent numeric factorization
    pub fn negative_inertia(&self) -> usize {
        self.workspace.negative_inertia
    }

    // Solves Ax = b using LDL factors for A.
    // Solves in place (x replaces b)
    pub fn solve(&mut self, b: &mut [T]) {
        assert!(!self.is_logical);
        assert_eq!(b.len(), self.D.len());

        let tmp = &mut self.workspace.fwork;
        _permute(tmp, b, &self.perm);
        _solve(&self.L.colptr, &self.L.rowval, &self.L.nzval, &self.Dinv, tmp);
        _ipermute(b, tmp, &self.perm);
    }

    /// Overwrite entries of the factored matrix.  `indices` address
    /// entries of the upper triangular matrix originally passed to
    /// [`new`](QDLDLFactorisation::new).
    pub fn update_values(&mut self, indices: &[usize], values: &[T]) {
        assert_eq!(indices.len(), values.len());
        let nzval = &mut self.workspace.triuA.nzval;
        let AtoPAPt = &self.workspace.AtoPAPt;

        for (&idx, &v) in zip(indices, values) {
            nzval[AtoPAPt[idx]] = v;
        }
    }

    /// Overwrite every entry of the factored matrix, in the order of
    /// the `nzval` field of the matrix originally passed to
    /// [`new`](QDLDLFactorisation::new).
    pub fn update_all_values(&mut self, values: &[T]) {
        assert_eq!(values.len(), self.workspace.AtoPAPt.len());
        let nzval = &mut self.workspace.triuA.nzval;

        for (&dest, &v) in zip(&self.workspace.AtoPAPt, values) {
            nzval[dest] = v;
        }
    }

    pub fn refactor(&mut self) -> Result<(), QDLDLError> {
        // a refactor always implies a numerical factorization
        self.is_logical = false;
        _factor(
            &mut self.L,
            &mut self.D,
            &mut self.Dinv,
            &mut self.workspace,
            self.is_logical,
        )
    }
}

fn check_structure<T: FloatT>(A: &CscMatrix<T>) -> Result<(), QDLDLError> {
    if !A.is_square() {
        return Err(QDLDLError::IncompatibleDimension);
    }

    if !A.is_triu() {
        return Err(QDLDLError::NotUpperTriangular);
    }

    //every column needs at least one entry
    if !A.colptr.windows(2).all(|c| c[0] < c[1]) {
        return Err(QDLDLError::EmptyColumn);
    }

    Ok(())
}

fn _qdldl_new<T: FloatT>(
    Ain: &CscMatrix<T>,
    opts: Option<QDLDLSettings<T>>,
) -> Result<QDLDLFactorisation<T>, QDLDLError> {
    let n = Ain.nrows();
    let opts = opts.unwrap_or_default();

    //AMD ordering unless the user supplies one.  For no ordering
    //at all, pass (0..n).collect() explicitly
    let (perm, iperm) = match opts.perm {
        Some(perm) => {
            let iperm = _invperm(&perm)?;
            (perm, iperm)
        }
        None => _get_amd_ordering(Ain, opts.amd_dense_scale)?,
    };

    //permute to (another) upper triangular matrix and store the
    //index mapping the input's entries to the permutation's entries
    let (A, AtoPAPt) = _permute_symmetric(Ain, &iperm);

    let mut workspace = QDLDLWorkspace::<T>::new(A, AtoPAPt, opts.zero_pivot_tol);

    let sumLnz = workspace.Lnz.iter().sum();
    let mut L = CscMatrix::spalloc(n, n, sumLnz);
    let mut D = vec![T::zero(); n];
    let mut Dinv = vec![T::zero(); n];

    _factor(&mut L, &mut D, &mut Dinv, &mut workspace, opts.logical)?;

    Ok(QDLDLFactorisation {
        perm,
        L,
        D,
        Dinv,
        workspace,
        is_logical: opts.logical,
    })
}

#[derive(Debug)]
struct QDLDLWorkspace<T> {
    etree: Vec<usize>,
    Lnz: Vec<usize>,
    iwork: Vec<usize>,
    bwork: Vec<bool>,
    fwork: Vec<T>,

    // pivot sign counts from the last numeric factorization
    positive_inertia: usize,
    negative_inertia: usize,

    // The upper triangular factorisation target, i.e. the
    // post ordering PAPt of the original data
    triuA: CscMatrix<T>,

    // mapping from entries of the input matrix to entries of triuA.
    // Used when modifying values before a refactor
    AtoPAPt: Vec<usize>,

    zero_pivot_tol: T,
}

impl<T> QDLDLWorkspace<T>
where
    T: FloatT,
{
    fn new(triuA: CscMatrix<T>, AtoPAPt: Vec<usize>, zero_pivot_tol: T) -> Self {
        let n = triuA.ncols();
        let mut etree = vec![0; n];
        let mut Lnz = vec![0; n];
        let mut iwork = vec![0; n * 3];

        _etree(n, &triuA.colptr, &triuA.rowval, &mut iwork, &mut Lnz, &mut etree);

        Self {
            etree,
            Lnz,
            iwork,
            bwork: vec![false; n],
            fwork: vec![T::zero(); n],
            positive_inertia: 0,
            negative_inertia: 0,
            triuA,
            AtoPAPt,
            zero_pivot_tol,
        }
    }
}

fn _factor<T: FloatT>(
    L: &mut CscMatrix<T>,
    D: &mut [T],
    Dinv: &mut [T],
    workspace: &mut QDLDLWorkspace<T>,
    logical: bool,
) -> Result<(), QDLDLError> {
    if logical {
        L.nzval.fill(T::zero());
        D.fill(T::zero());
        Dinv.fill(T::zero());
    }

    // counts are meaningless after a failed factorization
    workspace.positive_inertia = 0;
    workspace.negative_inertia = 0;

    let A = &workspace.triuA;

    let npos = _factor_inner(
        A.n,
        &A.colptr,
        &A.rowval,
        &A.nzval,
        &mut L.colptr,
        &mut L.rowval,
        &mut L.nzval,
        D,
        Dinv,
        &workspace.Lnz,
        &workspace.etree,
        &mut workspace.bwork,
        &mut workspace.iwork,
        &mut workspace.fwork,
        logical,
        workspace.zero_pivot_tol,
    )?;

    if !logical {
        workspace.positive_inertia = npos;
        workspace.negative_inertia = A.n - npos;
    }

    Ok(())
}

const QDLDL_UNKNOWN: usize = usize::MAX;
const QDLDL_USED: bool = true;
const QDLDL_UNUSED: bool = false;

// Elimination tree for a symmetric matrix stored as triu CSC.
// Also counts the nonzeros in each column of L.
fn _etree(
    n: usize,
    Ap: &[usize],
    Ai: &[usize],
    work: &mut [usize],
    Lnz: &mut [usize],
    etree: &mut [usize],
) {
    work.fill(0);
    Lnz.fill(0);
    etree.fill(QDLDL_UNKNOWN);

    for j in 0..n {
        work[j] = j;
        for &istart in &Ai[Ap[j]..Ap[j + 1]] {
            let mut i = istart;
            while work[i] != j {
                if etree[i] == QDLDL_UNKNOWN {
                    etree[i] = j;
                }
                Lnz[i] += 1;
                work[i] = j;
                i = etree[i];
            }
        }
    }
}

// Up-looking numeric factorization.  Returns the number of positive
// pivots in D, or ZeroPivot as soon as a pivot with |d| <= zero_pivot_tol
// appears.
#[allow(clippy::too_many_arguments)]
fn _factor_inner<T: FloatT>(
    n: usize,
    Ap: &[usize],
    Ai: &[usize],
    Ax: &[T],
    Lp: &mut [usize],
    Li: &mut [usize],
    Lx: &mut [T],
    D: &mut [T],
    Dinv: &mut [T],
    Lnz: &[usize],
    etree: &[usize],
    bwork: &mut [bool],
    iwork: &mut [usize],
    fwork: &mut [T],
    logical_factor: bool,
    zero_pivot_tol: T,
) -> Result<usize, QDLDLError> {
    let mut npositive = 0;

    // partition working memory into pieces
    let y_markers = bwork;
    let (y_idx, iwork) = iwork.split_at_mut(n);
    let (elim_buffer, next_colspace) = iwork.split_at_mut(n);
    let y_vals = fwork;

    //Lp = cumsum(Lnz), starting from zero
    Lp[0] = 0;
    for k in 0..n {
        Lp[k + 1] = Lp[k] + Lnz[k];
    }

    y_markers.fill(QDLDL_UNUSED);
    y_vals.fill(T::zero());
    D.fill(T::zero());
    next_colspace.copy_from_slice(&Lp[0..n]);

    let mut check_pivot = |k: usize, D: &mut [T], Dinv: &mut [T]| {
        if T::abs(D[k]) <= zero_pivot_tol {
            return Err(QDLDLError::ZeroPivot);
        }
        if D[k] > T::zero() {
            npositive += 1;
        }
        Dinv[k] = T::recip(D[k]);
        Ok(())
    };

    if n == 0 {
        return Ok(0);
    }

    if !logical_factor {
        // column 0 of a triu matrix holds only the diagonal
        D[0] = Ax[0];
        check_pivot(0, &mut *D, &mut *Dinv)?;
    }

    for k in 1..n {
        // Solve y = L(0:k-1,0:k-1) \ b with b the part of column
        // k of A above the diagonal.  y is then row k of L.

        let mut nnz_y = 0;

        // find the nonzero pattern of row k of L
        for i in Ap[k]..Ap[k + 1] {
            let bidx = Ai[i];

            if bidx == k {
                D[k] = Ax[i];
                continue;
            }

            y_vals[bidx] = Ax[i];

            if y_markers[bidx] == QDLDL_UNUSED {
                y_markers[bidx] = QDLDL_USED;
                elim_buffer[0] = bidx;
                let mut nnz_e = 1;

                // walk the elimination tree upwards from bidx
                let mut next_idx = etree[bidx];
                while next_idx != QDLDL_UNKNOWN && next_idx < k {
                    if y_markers[next_idx] == QDLDL_USED {
                        break;
                    }
                    y_markers[next_idx] = QDLDL_USED;
                    elim_buffer[nnz_e] = next_idx;
                    next_idx = etree[next_idx];
                    nnz_e += 1;
                }

                // append the path in reverse (topological) order
                while nnz_e != 0 {
                    nnz_e -= 1;
                    y_idx[nnz_y] = elim_buffer[nnz_e];
                    nnz_y += 1;
                }
            }
        }

        // numeric values of row k of L
        for i in (0..nnz_y).rev() {
            let cidx = y_idx[i];
            let tmp_idx = next_colspace[cidx];

            if !logical_factor {
                let y_vals_cidx = y_vals[cidx];

                for j in Lp[cidx]..tmp_idx {
                    y_vals[Li[j]] -= Lx[j] * y_vals_cidx;
                }

                Lx[tmp_idx] = y_vals_cidx * Dinv[cidx];
                D[k] -= y_vals_cidx * Lx[tmp_idx];
            }

            Li[tmp_idx] = k;
            next_colspace[cidx] += 1;

            y_vals[cidx] = T::zero();
            y_markers[cidx] = QDLDL_UNUSED;
        }

        if !logical_factor {
            check_pivot(k, &mut *D, &mut *Dinv)?;
        }
    }

    Ok(npositive)
}

// Solves (L+I)x = b, with x replacing b
fn _lsolve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    for i in 0..x.len() {
        let xi = x[i];
        let rng = Lp[i]..Lp[i + 1];
        for (&Lij, &Lxj) in zip(&Li[rng.clone()], &Lx[rng]) {
            x[Lij] -= Lxj * xi;
        }
    }
}

// Solves (L+I)'x = b, with x replacing b
fn _ltsolve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    for i in (0..x.len()).rev() {
        let rng = Lp[i]..Lp[i + 1];
        let s = zip(&Li[rng.clone()], &Lx[rng]).fold(T::zero(), |s, (&Lij, &Lxj)| s + Lxj * x[Lij]);
        x[i] -= s;
    }
}

// Solves Ax = b where A has given LDL factors, with x replacing b
fn _solve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], Dinv: &[T], b: &mut [T]) {
    _lsolve(Lp, Li, Lx, b);
    b.hadamard(Dinv);
    _ltsolve(Lp, Li, Lx, b);
}

// Construct an inverse permutation from a permutation
fn _invperm(p: &[usize]) -> Result<Vec<usize>, QDLDLError> {
    let n = p.len();
    let mut b = vec![QDLDL_UNKNOWN; n];

    for (i, &j) in p.iter().enumerate() {
        if j >= n || b[j] != QDLDL_UNKNOWN {
            return Err(QDLDLError::InvalidPermutation);
        }
        b[j] = i;
    }
    Ok(b)
}

// allocation free permutation and inverse permutation
fn _permute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, x).for_each(|(p, x)| *x = b[*p]);
}

fn _ipermute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, b).for_each(|(p, b)| x[*p] = *b);
}

// Given a symmetric matrix `A` stored as triu, return the triu
// form of PAPt for inverse permutation `iperm`, together with
// the index map from entries of A to entries of PAPt.
// Follows T. Davis, Direct Methods for Sparse Linear Systems.
fn _permute_symmetric<T: FloatT>(A: &CscMatrix<T>, iperm: &[usize]) -> (CscMatrix<T>, Vec<usize>) {
    let n = A.nrows();
    let mut P = CscMatrix::<T>::spalloc(n, n, A.nnz());
    let mut AtoPAPt = vec![0; A.nnz()];

    // count entries in each column of P
    let mut num_entries = vec![0; n];
    for colA in 0..n {
        let colP = iperm[colA];
        for &rowA in &A.rowval[A.colptr[colA]..A.colptr[colA + 1]] {
            if rowA <= colA {
                num_entries[max(iperm[rowA], colP)] += 1;
            }
        }
    }

    P.colptr[0] = 0;
    for k in 0..n {
        P.colptr[k + 1] = P.colptr[k] + num_entries[k];
    }

    // next free slot in each column of P
    let mut row_starts = P.colptr[0..n].to_vec();

    for colA in 0..n {
        let colP = iperm[colA];
        for idxA in A.colptr[colA]..A.colptr[colA + 1] {
            let rowA = A.rowval[idxA];
            if rowA <= colA {
                let rowP = iperm[rowA];
                let colidx = max(colP, rowP);
                let idxP = row_starts[colidx];

                P.rowval[idxP] = min(colP, rowP);
                P.nzval[idxP] = A.nzval[idxA];
                AtoPAPt[idxA] = idxP;
                row_starts[colidx] += 1;
            }
        }
    }
    (P, AtoPAPt)
}

fn _get_amd_ordering<T: FloatT>(
    A: &CscMatrix<T>,
    amd_dense_scale: f64,
) -> Result<(Vec<usize>, Vec<usize>), QDLDLError> {
    let mut control = amd::Control::default();
    control.dense *= amd_dense_scale;
    let (perm, iperm, _info) = amd::order(A.nrows(), &A.colptr, &A.rowval, &control)
        .map_err(|_| QDLDLError::OrderingFailed)?;
    Ok((perm, iperm))
}

//configure tests of internals
#[path = "test.rs"]
#[cfg(test)]
mod test;
