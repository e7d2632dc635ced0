use crate::routines::evaluation::errors::{NewtonError, NewtonResult};
use crate::routines::evaluation::special::{digamma, trigamma};
use crate::routines::settings::Settings;
use crate::structs::alpha::Alpha;
use crate::structs::gammas::Gammas;
use ndarray::{Array, Array1};
use ndarray_stats::DeviationExt;
use serde::{Deserialize, Serialize};

/// Expansion point used for the gradient and Hessian on each iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linearization {
    /// Re-linearize at the latest alpha estimate, the standard Newton-Raphson
    /// recurrence.
    #[default]
    Current,
    /// Hold the expansion point at the call's initial alpha for every
    /// iteration, so only the accumulated update changes. With a fixed
    /// expansion point the update is constant across iterations.
    Initial,
}

/// Represents the status of an alpha re-estimation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Estimation is currently running
    InProgress,
    /// The update norm dropped below the change threshold
    Converged,
    /// Estimation stopped after reaching the maximum number of iterations
    MaxIterations,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::InProgress => write!(f, "In progress"),
            Status::Converged => write!(f, "Converged"),
            Status::MaxIterations => write!(f, "Maximum iterations reached"),
        }
    }
}

/// Outcome of a full alpha re-estimation.
///
/// Carries the re-estimated alpha together with the number of applied updates
/// and the terminal [Status]. Reaching the iteration cap is not an error; the
/// caller decides whether the last estimate is acceptable.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaResult {
    alpha: Alpha,
    iterations: usize,
    status: Status,
}

impl AlphaResult {
    /// Get the re-estimated alpha.
    pub fn alpha(&self) -> &Alpha {
        &self.alpha
    }

    /// Consume the result, returning the re-estimated alpha.
    pub fn into_alpha(self) -> Alpha {
        self.alpha
    }

    /// Get the number of updates that were applied.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Get the terminal status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn converged(&self) -> bool {
        self.status == Status::Converged
    }
}

/// Computes the gradient of the variational lower bound with respect to alpha.
///
/// For each topic `i`, with `n` documents:
///
/// ```text
/// gradient[i] = n·(Ψ(Σ_j α_j) − Ψ(α_i)) + Σ_d (Ψ(γ_d[i]) − Ψ(Σ_j γ_d[j]))
/// ```
///
/// where Ψ is the digamma function. `Ψ(Σ_j γ_d[j])` depends on the document
/// only and `Ψ(Σ_j α_j)` on nothing, so both are evaluated once and reused
/// across all topic components.
///
/// # Errors
///
/// Fails before any computation if the gamma collection width does not match
/// the alpha dimension, or if any alpha entry lies outside the digamma domain.
pub fn gradient(alpha: &Alpha, gammas: &Gammas) -> NewtonResult<Array1<f64>> {
    let n_topics = alpha.len();
    if gammas.n_topics() != n_topics {
        return Err(NewtonError::GammaDimMismatch {
            expected: n_topics,
            found: gammas.n_topics(),
        });
    }
    check_alpha_domain(alpha)?;

    let n_documents = gammas.n_documents();
    let matrix = gammas.matrix();

    let digamma_alpha_sum = digamma(alpha.vector().sum());
    let digamma_doc_sums: Vec<f64> = matrix
        .rows()
        .into_iter()
        .map(|row| digamma(row.sum()))
        .collect();

    let gradient = Array1::from_shape_fn(n_topics, |i| {
        let document_term: f64 = (0..n_documents)
            .map(|d| digamma(matrix[[d, i]]) - digamma_doc_sums[d])
            .sum();
        n_documents as f64 * (digamma_alpha_sum - digamma(alpha[i])) + document_term
    });

    Ok(gradient)
}

/// Diagonal part of the structured Hessian: `diagonal[i] = n · Ψ'(α_i)`.
pub fn hessian_diagonal(alpha: &Alpha, n_documents: usize) -> Array1<f64> {
    Array1::from_shape_fn(alpha.len(), |i| n_documents as f64 * trigamma(alpha[i]))
}

/// Rank-one coefficient of the structured Hessian: `−Ψ'(Σ_j α_j)`.
pub fn hessian_constant(alpha: &Alpha) -> f64 {
    -trigamma(alpha.vector().sum())
}

/// Applies the inverse of the structured Hessian to the gradient in O(k).
///
/// The Hessian has the form `H = diag(h) + 1·z·1ᵗ`, which admits the
/// Sherman-Morrison closed form
///
/// ```text
/// (H⁻¹ g)_i = (g_i − c) / h_i
/// c         = (Σ_j g_j/h_j) / (1/z + Σ_j 1/h_j)
/// ```
///
/// so the k×k matrix is never materialized. The returned vector is the raw
/// product `H⁻¹ g`; the driver applies the update sign.
///
/// # Errors
///
/// Fails if gradient and diagonal lengths differ (checked first), if any
/// diagonal entry or the rank-one coefficient is zero, if the rank-one
/// denominator vanishes, or if the result carries a non-finite entry.
pub fn newton_step(
    diagonal: &Array1<f64>,
    constant: f64,
    gradient: &Array1<f64>,
) -> NewtonResult<Array1<f64>> {
    let dimensions = diagonal.len();
    if gradient.len() != dimensions {
        return Err(NewtonError::GradientDimMismatch {
            expected: dimensions,
            found: gradient.len(),
        });
    }
    if constant == 0.0 {
        return Err(NewtonError::DegenerateConstant);
    }

    let mut numerator = 0.0;
    let mut denominator = 1.0 / constant;
    for (index, (&g, &h)) in gradient.iter().zip(diagonal.iter()).enumerate() {
        if h == 0.0 {
            return Err(NewtonError::DegenerateDiagonal { index });
        }
        numerator += g / h;
        denominator += 1.0 / h;
    }
    if denominator == 0.0 {
        return Err(NewtonError::DegenerateDenominator);
    }
    let correction = numerator / denominator;

    let step = Array1::from_shape_fn(dimensions, |i| (gradient[i] - correction) / diagonal[i]);
    if let Some((index, &value)) = step.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(NewtonError::NonFiniteStep { index, value });
    }

    Ok(step)
}

/// Re-estimates alpha from the per-document gamma vectors.
///
/// Iterates the structured Newton-Raphson update: gradient, Hessian diagonal
/// and rank-one coefficient are evaluated at the expansion point selected by
/// [Linearization], the update is obtained from [newton_step], and the loop
/// stops once the Euclidean norm of the update drops below the configured
/// change threshold or the iteration cap is reached. A converging update is
/// not applied. The diagonal and rank-one coefficient describe the negated
/// curvature of the bound, so ascending it adds the raw solve to alpha.
///
/// # Arguments
///
/// * `settings` - convergence criteria and the expansion point policy.
/// * `initial_alpha` - the current estimate, k ≥ 1 positive finite entries.
/// * `gammas` - one k-dimensional vector of positive finite entries per
///   document, at least one document.
///
/// # Returns
///
/// On success, an [AlphaResult] with the re-estimated alpha, the number of
/// applied updates, and whether the loop converged or exhausted its cap.
/// Inputs are never mutated; the caller's alpha and gammas are untouched on
/// both success and failure.
///
/// # Errors
///
/// All validation happens before the first iteration: dimension mismatch
/// between alpha and the gamma collection, an empty alpha or collection, and
/// entries outside (0, ∞). During iteration, a degenerate Hessian or an alpha
/// excursion out of the digamma domain fails the call instead of propagating
/// non-finite values into the estimate.
pub fn estimate_alpha(
    settings: &Settings,
    initial_alpha: &Alpha,
    gammas: &Gammas,
) -> NewtonResult<AlphaResult> {
    if initial_alpha.is_empty() {
        return Err(NewtonError::NoTopics);
    }
    if gammas.n_documents() == 0 {
        return Err(NewtonError::NoDocuments);
    }
    if gammas.n_topics() != initial_alpha.len() {
        return Err(NewtonError::GammaDimMismatch {
            expected: initial_alpha.len(),
            found: gammas.n_topics(),
        });
    }
    check_alpha_domain(initial_alpha)?;
    check_gamma_domain(gammas)?;

    let max_iterations = settings.convergence.max_iterations;
    let change_threshold = settings.convergence.change_threshold;
    let linearization = settings.advanced.linearization;

    let n_documents = gammas.n_documents();
    let mut alpha = initial_alpha.clone();
    let mut status = Status::InProgress;
    let mut iterations = 0;

    while iterations < max_iterations {
        let basis = match linearization {
            Linearization::Current => &alpha,
            Linearization::Initial => initial_alpha,
        };

        let grad = gradient(basis, gammas)?;
        let diagonal = hessian_diagonal(basis, n_documents);
        let constant = hessian_constant(basis);
        let step = newton_step(&diagonal, constant, &grad)?;

        if norm_zero(&step) < change_threshold {
            status = Status::Converged;
            break;
        }

        alpha = Alpha::new(alpha.vector() + &step);
        iterations += 1;
    }

    if status == Status::Converged {
        tracing::info!("Newton-Raphson converged after {} steps", iterations);
    } else {
        status = Status::MaxIterations;
        tracing::info!("Maximum number of iterations reached ({})", max_iterations);
    }

    Ok(AlphaResult {
        alpha,
        iterations,
        status,
    })
}

fn check_alpha_domain(alpha: &Alpha) -> NewtonResult<()> {
    for (index, value) in alpha.iter().enumerate() {
        if !value.is_finite() || value <= 0.0 {
            return Err(NewtonError::NonPositiveAlpha { index, value });
        }
    }
    Ok(())
}

fn check_gamma_domain(gammas: &Gammas) -> NewtonResult<()> {
    for ((document, index), &value) in gammas.matrix().indexed_iter() {
        if !value.is_finite() || value <= 0.0 {
            return Err(NewtonError::NonPositiveGamma {
                document,
                index,
                value,
            });
        }
    }
    Ok(())
}

fn norm_zero(a: &Array1<f64>) -> f64 {
    let zeros: Array1<f64> = Array::zeros(a.len());
    a.l2_dist(&zeros).unwrap()
}
