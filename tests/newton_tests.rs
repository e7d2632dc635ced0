use anyhow::Result;
use ldacore::prelude::*;
use ndarray::{arr1, arr2, Array2};

fn quick_settings(max_iterations: usize, change_threshold: f64) -> Settings {
    let mut settings = Settings::new();
    settings.convergence.max_iterations = max_iterations;
    settings.convergence.change_threshold = change_threshold;
    settings.log.write = false;
    settings
}

#[test]
fn dimension_mismatch_fails_before_solving() {
    let settings = quick_settings(100, 1e-5);
    let alpha = Alpha::from_vec(vec![1.0, 1.0]);
    let gammas = Gammas::from(arr2(&[[1.0, 2.0, 3.0], [2.0, 2.0, 2.0]]));

    let err = estimate_alpha(&settings, &alpha, &gammas).unwrap_err();
    assert!(err.is_dimension_mismatch());
    assert_eq!(
        err,
        NewtonError::GammaDimMismatch {
            expected: 2,
            found: 3
        }
    );

    // The caller's estimate is untouched
    assert_eq!(alpha.to_vec(), vec![1.0, 1.0]);
}

#[test]
fn gradient_checks_dimensions_first() {
    let alpha = Alpha::from_vec(vec![1.0, 1.0, 1.0, 1.0]);
    let gammas = Gammas::from(arr2(&[[2.0, 3.0, 5.0]]));

    let err = gradient(&alpha, &gammas).unwrap_err();
    assert!(err.is_dimension_mismatch());
}

#[test]
fn structured_solve_checks_dimensions() {
    let diagonal = arr1(&[2.0, 3.0]);
    let grad = arr1(&[1.0, 1.0, 1.0]);

    let err = newton_step(&diagonal, 0.5, &grad).unwrap_err();
    assert_eq!(
        err,
        NewtonError::GradientDimMismatch {
            expected: 2,
            found: 3
        }
    );
}

#[test]
fn structured_solve_surfaces_degeneracies() {
    // Zero diagonal entry
    let err = newton_step(&arr1(&[2.0, 0.0]), 0.5, &arr1(&[1.0, 1.0])).unwrap_err();
    assert_eq!(err, NewtonError::DegenerateDiagonal { index: 1 });
    assert!(err.is_numeric_degeneracy());

    // Zero rank-one coefficient
    let err = newton_step(&arr1(&[2.0]), 0.0, &arr1(&[1.0])).unwrap_err();
    assert_eq!(err, NewtonError::DegenerateConstant);

    // 1/z + sum(1/h) == 0
    let err = newton_step(&arr1(&[2.0]), -2.0, &arr1(&[1.0])).unwrap_err();
    assert_eq!(err, NewtonError::DegenerateDenominator);
}

#[test]
fn single_topic_matches_scalar_newton_step() -> Result<()> {
    // With k = 1 the structured inverse collapses to division by the full
    // Hessian h + z
    for (h, z, g) in [(2.0, 0.5, 1.2), (3.0, -0.7, 2.0), (6.58, -0.39, -1.5)] {
        let step = newton_step(&arr1(&[h]), z, &arr1(&[g]))?;
        let direct = g / (h + z);
        assert!(
            (step[0] - direct).abs() < 1e-12,
            "structured {} vs scalar {}",
            step[0],
            direct
        );
    }
    Ok(())
}

#[test]
fn estimation_scenario_terminates_with_positive_alpha() -> Result<()> {
    let settings = quick_settings(100, 1e-5);
    let alpha = Alpha::from_vec(vec![1.0, 1.0, 1.0]);
    let gammas = Gammas::from(arr2(&[[2.0, 3.0, 5.0], [1.0, 1.0, 8.0]]));

    let result = estimate_alpha(&settings, &alpha, &gammas)?;

    assert!(result.converged(), "status: {}", result.status());
    assert!(result.iterations() < 100);
    for value in result.alpha().iter() {
        assert!(value.is_finite() && value > 0.0, "entry: {}", value);
    }
    Ok(())
}

#[test]
fn reestimation_from_converged_alpha_is_a_fixed_point() -> Result<()> {
    let settings = quick_settings(100, 1e-5);
    let alpha = Alpha::from_vec(vec![1.0, 1.0, 1.0]);
    let gammas = Gammas::from(arr2(&[[2.0, 3.0, 5.0], [1.0, 1.0, 8.0]]));

    let first = estimate_alpha(&settings, &alpha, &gammas)?;
    let second = estimate_alpha(&settings, first.alpha(), &gammas)?;

    assert!(second.converged());
    assert!(
        second.iterations() <= 1,
        "took {} further updates",
        second.iterations()
    );
    Ok(())
}

#[test]
fn permuting_topics_permutes_the_estimate() -> Result<()> {
    let settings = quick_settings(200, 1e-7);
    let alpha = Alpha::from_vec(vec![0.8, 1.3, 2.1]);
    let gammas = Gammas::from(arr2(&[
        [2.0, 3.0, 5.0],
        [1.5, 1.0, 8.0],
        [4.0, 2.5, 3.0],
    ]));

    // Reverse the topic order in both alpha and every document
    let permutation = [2, 1, 0];
    let alpha_p = Alpha::from_vec(permutation.iter().map(|&p| alpha[p]).collect());
    let gammas_p = Gammas::from(Array2::from_shape_fn((3, 3), |(d, i)| {
        gammas.matrix()[[d, permutation[i]]]
    }));

    let result = estimate_alpha(&settings, &alpha, &gammas)?;
    let result_p = estimate_alpha(&settings, &alpha_p, &gammas_p)?;

    assert_eq!(result.status(), result_p.status());
    for (i, &p) in permutation.iter().enumerate() {
        let diff = (result.alpha()[p] - result_p.alpha()[i]).abs();
        assert!(diff < 1e-10, "topic {}: diff {}", i, diff);
    }
    Ok(())
}

#[test]
fn step_norms_shrink_on_well_conditioned_input() -> Result<()> {
    // Tightly clustered documents, entries near 10.0
    let alpha = Alpha::from_vec(vec![5.0, 5.0, 5.0]);
    let gammas = Gammas::from(arr2(&[
        [10.0, 10.2, 9.9],
        [9.8, 10.1, 10.0],
        [10.05, 9.95, 10.1],
        [10.2, 9.9, 9.85],
    ]));
    let n_documents = gammas.n_documents();

    // Replicate the recurrence through the public components to observe the
    // norm of every update
    let mut current = alpha;
    let mut norms: Vec<f64> = Vec::new();
    for _ in 0..500 {
        let grad = gradient(&current, &gammas)?;
        let diagonal = hessian_diagonal(&current, n_documents);
        let constant = hessian_constant(&current);
        let step = newton_step(&diagonal, constant, &grad)?;

        let norm = step.dot(&step).sqrt();
        norms.push(norm);
        if norm < 1e-5 {
            break;
        }
        current = Alpha::new(current.vector() + &step);
    }

    assert!(
        *norms.last().unwrap() < 1e-5,
        "did not terminate within 500 iterations"
    );
    for (i, pair) in norms.windows(2).enumerate().skip(1) {
        assert!(
            pair[1] <= pair[0] * (1.0 + 1e-9),
            "norm grew at iteration {}: {} -> {}",
            i,
            pair[0],
            pair[1]
        );
    }
    Ok(())
}

#[test]
fn degenerate_gamma_entries_are_rejected() {
    let settings = quick_settings(100, 1e-5);
    let alpha = Alpha::from_vec(vec![1.0, 1.0, 1.0]);

    for bad in [0.0, -0.5, f64::NAN, f64::INFINITY] {
        let gammas = Gammas::from(arr2(&[[2.0, 3.0, 5.0], [1.0, bad, 8.0]]));
        let err = estimate_alpha(&settings, &alpha, &gammas).unwrap_err();
        assert!(err.is_numeric_degeneracy(), "value {}: {}", bad, err);
    }
}

#[test]
fn degenerate_alpha_entries_are_rejected() {
    let settings = quick_settings(100, 1e-5);
    let gammas = Gammas::from(arr2(&[[2.0, 3.0, 5.0]]));

    for bad in [0.0, -1.0, f64::NAN] {
        let alpha = Alpha::from_vec(vec![1.0, bad, 1.0]);
        let err = estimate_alpha(&settings, &alpha, &gammas).unwrap_err();
        assert!(matches!(
            err,
            NewtonError::NonPositiveAlpha { index: 1, .. }
        ));
    }
}

#[test]
fn empty_inputs_are_rejected() {
    let settings = quick_settings(100, 1e-5);

    let err = estimate_alpha(
        &settings,
        &Alpha::from_vec(vec![]),
        &Gammas::from(arr2(&[[1.0]])),
    )
    .unwrap_err();
    assert_eq!(err, NewtonError::NoTopics);

    let err = estimate_alpha(
        &settings,
        &Alpha::from_vec(vec![1.0]),
        &Gammas::from(Array2::zeros((0, 1))),
    )
    .unwrap_err();
    assert_eq!(err, NewtonError::NoDocuments);
}

#[test]
fn fixed_expansion_point_applies_a_constant_update() -> Result<()> {
    let mut settings = quick_settings(50, 1e-5);
    settings.advanced.linearization = Linearization::Initial;

    let alpha = Alpha::from_vec(vec![1.0, 1.0, 1.0]);
    let gammas = Gammas::from(arr2(&[[2.0, 3.0, 5.0], [1.0, 1.0, 8.0]]));

    // The update evaluated at the initial estimate never changes, so the loop
    // accumulates the same vector until the cap
    let grad = gradient(&alpha, &gammas)?;
    let diagonal = hessian_diagonal(&alpha, gammas.n_documents());
    let constant = hessian_constant(&alpha);
    let step = newton_step(&diagonal, constant, &grad)?;

    let result = estimate_alpha(&settings, &alpha, &gammas)?;
    assert_eq!(*result.status(), Status::MaxIterations);
    assert_eq!(result.iterations(), 50);
    for i in 0..3 {
        let expected = alpha[i] + 50.0 * step[i];
        assert!((result.alpha()[i] - expected).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn converged_start_takes_no_updates_under_either_policy() -> Result<()> {
    let settings = quick_settings(100, 1e-5);
    let alpha = Alpha::from_vec(vec![1.0, 1.0, 1.0]);
    let gammas = Gammas::from(arr2(&[[2.0, 3.0, 5.0], [1.0, 1.0, 8.0]]));
    let converged = estimate_alpha(&settings, &alpha, &gammas)?.into_alpha();

    for linearization in [Linearization::Current, Linearization::Initial] {
        let mut settings = quick_settings(100, 1e-5);
        settings.advanced.linearization = linearization;
        let result = estimate_alpha(&settings, &converged, &gammas)?;
        assert!(result.converged());
        assert!(result.iterations() <= 1);
    }
    Ok(())
}

#[test]
fn inputs_are_not_mutated() -> Result<()> {
    let settings = quick_settings(100, 1e-5);
    let alpha = Alpha::from_vec(vec![1.0, 1.0, 1.0]);
    let gammas = Gammas::from(arr2(&[[2.0, 3.0, 5.0], [1.0, 1.0, 8.0]]));
    let alpha_before = alpha.clone();
    let gammas_before = gammas.clone();

    let _ = estimate_alpha(&settings, &alpha, &gammas)?;

    assert_eq!(alpha, alpha_before);
    assert_eq!(gammas, gammas_before);
    Ok(())
}
