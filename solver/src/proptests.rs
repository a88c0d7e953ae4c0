use crate::{
    system::{random_diagonally_dominant, LinearSystem},
    IterativeSolver, SolverConfig, VecN,
};
use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

fn random_system(n: usize, seed: u64) -> (LinearSystem, Pcg64) {
    let mut rng = Pcg64::seed_from_u64(seed);
    let system = random_diagonally_dominant(n, &mut rng).unwrap();
    (system, rng)
}

proptest! {
    #[test]
    fn decomposition_is_exact_and_repeatable(n in 1usize..12, seed in any::<u64>()) {
        let (system, _) = random_system(n, seed);
        let first = system.decompose().unwrap();
        let second = system.decompose().unwrap();
        prop_assert_eq!(&first, &second);
        for i in 0..n {
            prop_assert_eq!(first.alpha.get(i, i), 0.0);
            prop_assert_eq!(first.beta[i], system.b()[i] / system.a().get(i, i));
            for j in (0..n).filter(|&j| j != i) {
                prop_assert_eq!(first.alpha.get(i, j), -system.a().get(i, j) / system.a().get(i, i));
            }
        }
    }

    #[test]
    fn true_solution_is_a_fixed_point(n in 1usize..12, seed in any::<u64>()) {
        let (system, mut rng) = random_system(n, seed);
        let x_star = VecN::from((0..n).map(|_| rng.gen_range(-5.0..5.0)).collect::<Vec<f64>>());
        let b = system.a() * &x_star;
        let system = LinearSystem::new(system.a().clone(), b).unwrap();
        let step = system.decompose().unwrap().step(&x_star);
        for i in 0..n {
            assert_abs_diff_eq!(step[i], x_star[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn residual_matches_definition(n in 1usize..12, seed in any::<u64>()) {
        let (system, _) = random_system(n, seed);
        let report = system.solve(1e-10, &SolverConfig::default()).unwrap();
        let x = &report.solution.x;
        for i in 0..n {
            let ax: f64 = (0..n).map(|j| system.a().get(i, j) * x[j]).sum();
            assert_abs_diff_eq!(report.residual[i], system.b()[i] - ax, epsilon = 1e-12);
        }
        prop_assert!(report.residual.max_abs() < 1e-6);
    }

    #[test]
    fn step_norm_is_non_increasing(n in 1usize..12, seed in any::<u64>()) {
        let (system, _) = random_system(n, seed);
        let decomposition = system.decompose().unwrap();
        prop_assert!(decomposition.alpha_norm() < 1.0);
        let mut deltas = Vec::new();
        IterativeSolver::default()
            .solve_with(&decomposition, 1e-8, |it| deltas.push(it.delta))
            .unwrap();
        for w in deltas.windows(2) {
            prop_assert!(w[1] <= w[0], "{:?}", deltas);
        }
    }
}
