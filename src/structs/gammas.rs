use ndarray::Array2;

use crate::routines::evaluation::errors::{NewtonError, NewtonResult};

/// The per-document variational Dirichlet parameters.
///
/// Row `d` holds the k-dimensional parameter vector of document `d`, so the
/// matrix has one row per document and one column per topic. The collection is
/// produced by the expectation step and is read-only input to the
/// Newton-Raphson routines.
#[derive(Debug, Clone, PartialEq)]
pub struct Gammas {
    matrix: Array2<f64>,
}

impl Gammas {
    pub fn new(matrix: Array2<f64>) -> Self {
        Gammas { matrix }
    }

    /// Build the collection from one vector per document.
    ///
    /// Every document must carry the same number of topics; a ragged
    /// collection is rejected before any matrix is built.
    pub fn from_rows(rows: &[Vec<f64>]) -> NewtonResult<Self> {
        if rows.is_empty() {
            return Err(NewtonError::NoDocuments);
        }
        let n_topics = rows[0].len();
        for (document, row) in rows.iter().enumerate() {
            if row.len() != n_topics {
                return Err(NewtonError::RaggedGamma {
                    document,
                    expected: n_topics,
                    found: row.len(),
                });
            }
        }

        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let matrix = Array2::from_shape_vec((rows.len(), n_topics), flat)
            .expect("Failed to create gamma Array2");

        Ok(Gammas { matrix })
    }

    /// Get the matrix containing the parameter values
    ///
    /// The matrix is a 2D array where each row represents a document, and each column a topic
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Get the number of documents, equal to the number of rows in the matrix
    pub fn n_documents(&self) -> usize {
        self.matrix.nrows()
    }

    /// Get the number of topics, equal to the number of columns in the matrix
    pub fn n_topics(&self) -> usize {
        self.matrix.ncols()
    }
}

impl From<Array2<f64>> for Gammas {
    fn from(matrix: Array2<f64>) -> Self {
        Gammas { matrix }
    }
}

impl From<&Array2<f64>> for Gammas {
    fn from(matrix: &Array2<f64>) -> Self {
        Gammas {
            matrix: matrix.to_owned(),
        }
    }
}
