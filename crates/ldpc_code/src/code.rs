//! Sparse parity-check code descriptor.
//!
//! A code is stored as the two adjacency lists of its Tanner graph:
//! checks to variables and variables to checks. Codes are loaded from
//! MacKay's alist format or built from a dense 0/1 matrix.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read-only view of a code's dimensions and parity structure.
///
/// The simulator only needs the block length to normalise the bit-error
/// rate and the checks to produce syndrome diagnostics.
pub trait CodeDescriptor: Send + Sync {
    /// Number of code bits (variable nodes).
    fn block_length(&self) -> usize;

    /// Number of parity checks (check nodes).
    fn check_count(&self) -> usize;

    /// Returns the indices of the checks not satisfied by `hard_bits`.
    ///
    /// `hard_bits[i]` is `true` when bit `i` was decided as a one.
    fn syndrome(&self, hard_bits: &[bool]) -> Vec<usize>;
}

/// LDPC code defined by a sparse parity-check matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LdpcCode {
    num_vars: usize,
    num_checks: usize,
    check_to_var: Vec<Vec<usize>>,
    var_to_check: Vec<Vec<usize>>,
}

impl LdpcCode {
    /// Builds a code from a dense row-major 0/1 matrix (`checks x bits`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invalid`] when the matrix is empty or ragged.
    pub fn from_dense(matrix: &[Vec<u8>]) -> Result<Self> {
        let num_checks = matrix.len();
        let num_vars = matrix.first().map_or(0, Vec::len);
        if num_checks == 0 || num_vars == 0 {
            return Err(Error::Invalid("parity-check matrix is empty".to_string()));
        }

        let mut check_to_var = vec![Vec::new(); num_checks];
        let mut var_to_check = vec![Vec::new(); num_vars];

        for (r, row) in matrix.iter().enumerate() {
            if row.len() != num_vars {
                return Err(Error::Invalid(format!(
                    "row {r} has {} columns, expected {num_vars}",
                    row.len()
                )));
            }
            for (c, &val) in row.iter().enumerate() {
                if val != 0 {
                    check_to_var[r].push(c);
                    var_to_check[c].push(r);
                }
            }
        }

        Ok(Self {
            num_vars,
            num_checks,
            check_to_var,
            var_to_check,
        })
    }

    /// Parses a code in alist format.
    ///
    /// Layout: `N M`, the maximum column and row weights, the N column
    /// weights, the M row weights, then N lines of 1-based check indices per
    /// column followed by M lines of 1-based bit indices per row. Zero
    /// entries are padding and are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] on malformed input and [`Error::Invalid`] when
    /// the column and row sections disagree.
    pub fn from_alist(input: &str) -> Result<Self> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

        let mut next_numbers = |what: &str| -> Result<(usize, Vec<usize>)> {
            let (line_no, line) = lines
                .next()
                .ok_or_else(|| Error::parse(0, format!("unexpected end of input, expected {what}")))?;
            let numbers = line
                .split_whitespace()
                .map(|tok| {
                    tok.parse::<usize>()
                        .map_err(|_| Error::parse(line_no, format!("'{tok}' is not a non-negative integer")))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok((line_no, numbers))
        };

        let (line_no, dims) = next_numbers("dimensions")?;
        let &[num_vars, num_checks] = dims.as_slice() else {
            return Err(Error::parse(line_no, "expected 'N M'"));
        };
        if num_vars == 0 || num_checks == 0 {
            return Err(Error::parse(line_no, "dimensions must be positive"));
        }

        // Maximum weights are informational only.
        next_numbers("maximum weights")?;

        let (line_no, col_weights) = next_numbers("column weights")?;
        if col_weights.len() != num_vars {
            return Err(Error::parse(
                line_no,
                format!("expected {num_vars} column weights, found {}", col_weights.len()),
            ));
        }
        let (line_no, row_weights) = next_numbers("row weights")?;
        if row_weights.len() != num_checks {
            return Err(Error::parse(
                line_no,
                format!("expected {num_checks} row weights, found {}", row_weights.len()),
            ));
        }

        let mut var_to_check = Vec::with_capacity(num_vars);
        for (v, &weight) in col_weights.iter().enumerate() {
            let (line_no, entries) = next_numbers("column entries")?;
            let checks = one_based_entries(&entries, num_checks, line_no)?;
            if checks.len() != weight {
                return Err(Error::parse(
                    line_no,
                    format!("column {v} lists {} checks, weight says {weight}", checks.len()),
                ));
            }
            var_to_check.push(checks);
        }

        let mut check_to_var = Vec::with_capacity(num_checks);
        for (c, &weight) in row_weights.iter().enumerate() {
            let (line_no, entries) = next_numbers("row entries")?;
            let vars = one_based_entries(&entries, num_vars, line_no)?;
            if vars.len() != weight {
                return Err(Error::parse(
                    line_no,
                    format!("row {c} lists {} bits, weight says {weight}", vars.len()),
                ));
            }
            check_to_var.push(vars);
        }

        let code = Self {
            num_vars,
            num_checks,
            check_to_var,
            var_to_check,
        };
        code.verify_adjacency()?;

        debug!(n = num_vars, m = num_checks, "parsed alist code");
        Ok(code)
    }

    /// Loads an alist file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_alist(&content)
    }

    /// Bits connected to check `c`.
    pub fn check_neighbors(&self, c: usize) -> &[usize] {
        &self.check_to_var[c]
    }

    /// Checks connected to bit `v`.
    pub fn var_neighbors(&self, v: usize) -> &[usize] {
        &self.var_to_check[v]
    }

    /// Total number of edges in the Tanner graph.
    pub fn edge_count(&self) -> usize {
        self.check_to_var.iter().map(Vec::len).sum()
    }

    /// Returns true if `hard_bits` satisfies every parity check.
    pub fn is_codeword(&self, hard_bits: &[bool]) -> bool {
        self.check_to_var
            .iter()
            .all(|vars| !vars.iter().fold(false, |acc, &v| acc ^ hard_bits[v]))
    }

    fn verify_adjacency(&self) -> Result<()> {
        for (c, vars) in self.check_to_var.iter().enumerate() {
            for &v in vars {
                if !self.var_to_check[v].contains(&c) {
                    return Err(Error::Invalid(format!(
                        "row {c} references bit {v} but column {v} does not reference check {c}"
                    )));
                }
            }
        }
        let col_edges: usize = self.var_to_check.iter().map(Vec::len).sum();
        if col_edges != self.edge_count() {
            return Err(Error::Invalid(format!(
                "column section has {col_edges} edges, row section has {}",
                self.edge_count()
            )));
        }
        Ok(())
    }
}

impl CodeDescriptor for LdpcCode {
    fn block_length(&self) -> usize {
        self.num_vars
    }

    fn check_count(&self) -> usize {
        self.num_checks
    }

    fn syndrome(&self, hard_bits: &[bool]) -> Vec<usize> {
        self.check_to_var
            .iter()
            .enumerate()
            .filter(|(_, vars)| vars.iter().fold(false, |acc, &v| acc ^ hard_bits[v]))
            .map(|(c, _)| c)
            .collect()
    }
}

fn one_based_entries(entries: &[usize], bound: usize, line_no: usize) -> Result<Vec<usize>> {
    entries
        .iter()
        .filter(|&&e| e != 0)
        .map(|&e| {
            if e > bound {
                Err(Error::parse(line_no, format!("index {e} out of range 1..={bound}")))
            } else {
                Ok(e - 1)
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// (7,4) Hamming code in alist form.
    pub(crate) const HAMMING_ALIST: &str = "\
7 3
3 4
3 2 2 2 1 1 1
4 4 4
1 2 3
1 2 0
1 3 0
2 3 0
1 0 0
2 0 0
3 0 0
1 2 3 5
1 2 4 6
1 3 4 7
";

    pub(crate) fn hamming() -> LdpcCode {
        LdpcCode::from_alist(HAMMING_ALIST).unwrap()
    }

    #[test]
    fn alist_matches_dense() {
        let dense = LdpcCode::from_dense(&[
            vec![1, 1, 1, 0, 1, 0, 0],
            vec![1, 1, 0, 1, 0, 1, 0],
            vec![1, 0, 1, 1, 0, 0, 1],
        ])
        .unwrap();
        assert_eq!(hamming(), dense);
    }

    #[test]
    fn dimensions() {
        let code = hamming();
        assert_eq!(code.block_length(), 7);
        assert_eq!(code.check_count(), 3);
        assert_eq!(code.edge_count(), 12);
        assert_eq!(code.var_neighbors(0), &[0, 1, 2]);
        assert_eq!(code.check_neighbors(2), &[0, 2, 3, 6]);
    }

    #[test]
    fn zero_word_is_codeword() {
        let code = hamming();
        assert!(code.is_codeword(&[false; 7]));
        assert!(code.syndrome(&[false; 7]).is_empty());
    }

    #[test]
    fn single_flip_breaks_checks() {
        let code = hamming();
        let mut bits = [false; 7];
        bits[0] = true;
        assert!(!code.is_codeword(&bits));
        assert_eq!(code.syndrome(&bits), vec![0, 1, 2]);

        bits[0] = false;
        bits[6] = true;
        assert_eq!(code.syndrome(&bits), vec![2]);
    }

    #[test]
    fn rejects_bad_token() {
        let err = LdpcCode::from_alist("7 x\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }), "{err}");
    }

    #[test]
    fn rejects_truncated_input() {
        let truncated: String = HAMMING_ALIST.lines().take(8).collect::<Vec<_>>().join("\n");
        assert!(LdpcCode::from_alist(&truncated).is_err());
    }

    #[test]
    fn rejects_inconsistent_sections() {
        let broken = HAMMING_ALIST.replace("1 2 3 5\n", "1 2 3 6\n");
        assert!(matches!(
            LdpcCode::from_alist(&broken),
            Err(Error::Invalid(_))
        ));
    }

    #[test]
    fn rejects_ragged_dense() {
        assert!(LdpcCode::from_dense(&[vec![1, 0], vec![1]]).is_err());
        assert!(LdpcCode::from_dense(&[]).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hamming.alist");
        std::fs::write(&path, HAMMING_ALIST).unwrap();
        assert_eq!(LdpcCode::load(&path).unwrap(), hamming());
    }

    proptest! {
        #[test]
        fn empty_syndrome_iff_codeword(bits in proptest::collection::vec(any::<bool>(), 7)) {
            let code = hamming();
            prop_assert_eq!(code.syndrome(&bits).is_empty(), code.is_codeword(&bits));
        }

        #[test]
        fn codewords_are_closed_under_xor(
            a in proptest::collection::vec(any::<bool>(), 7),
            b in proptest::collection::vec(any::<bool>(), 7),
        ) {
            let code = hamming();
            let sum: Vec<bool> = a.iter().zip(&b).map(|(&x, &y)| x ^ y).collect();
            if code.is_codeword(&a) && code.is_codeword(&b) {
                prop_assert!(code.is_codeword(&sum));
            }
        }
    }
}
