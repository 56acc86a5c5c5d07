pub(crate) use super::*;
use crate::graph::{Citation, CitationGraph, Paper, FEATURE_DIM};
use rand::SeedableRng;

fn paper(id: &str, year: i32, citations: u32) -> Paper {
    Paper {
        id: id.to_string(),
        year: Some(year),
        citation_count: citations,
        has_artifact: false,
    }
}

fn citation(source: &str, target: &str) -> Citation {
    Citation {
        source: source.to_string(),
        target: target.to_string(),
        predicted: false,
    }
}

/// Six papers forming two loosely connected triangles.
pub(super) fn six_node_graph() -> CitationGraph {
    let papers = vec![
        paper("p0", 2016, 3),
        paper("p1", 2017, 30),
        paper("p2", 2018, 300),
        paper("p3", 2019, 12),
        paper("p4", 2020, 120),
        paper("p5", 2021, 1200),
    ];
    let citations = vec![
        citation("p0", "p1"),
        citation("p1", "p2"),
        citation("p2", "p0"),
        citation("p3", "p4"),
        citation("p4", "p5"),
        citation("p5", "p3"),
        citation("p2", "p3"),
    ];
    CitationGraph::build(&papers, &citations)
}

/// Four papers on a path with edges (0,1) and (1,2); node 3 is isolated.
pub(super) fn four_node_graph() -> CitationGraph {
    let papers = vec![
        paper("p0", 2018, 1),
        paper("p1", 2019, 2),
        paper("p2", 2020, 3),
        paper("p3", 2021, 4),
    ];
    let citations = vec![citation("p0", "p1"), citation("p1", "p2")];
    CitationGraph::build(&papers, &citations)
}

fn options(epochs: usize) -> TrainOptions {
    TrainOptions {
        epochs,
        learning_rate: 0.01,
        yield_every: 10,
    }
}

#[test]
fn test_state_machine_transitions() {
    let g = four_node_graph();
    let mut rng = StdRng::seed_from_u64(42);
    let mut trainer = Trainer::new(&g, options(25), 8, 4, &mut rng).expect("trainable graph");

    assert_eq!(trainer.state(), TrainerState::Uninitialized);

    let outcome = trainer.step().expect("epochs run");
    assert!(matches!(outcome, StepOutcome::Yielded { epoch: 9, .. }));
    assert_eq!(trainer.state(), TrainerState::Training { epoch: 10 });

    let outcome = trainer.step().expect("epochs run");
    assert!(matches!(outcome, StepOutcome::Yielded { epoch: 19, .. }));

    let outcome = trainer.step().expect("epochs run");
    assert!(matches!(outcome, StepOutcome::Finished { .. }));
    assert_eq!(trainer.state(), TrainerState::Converged);
    assert_eq!(trainer.loss_history().len(), 25);
    assert!(trainer.embeddings().is_some());
}

#[test]
fn test_step_after_convergence_is_idempotent() {
    let g = four_node_graph();
    let mut rng = StdRng::seed_from_u64(42);
    let mut trainer = Trainer::new(&g, options(5), 8, 4, &mut rng).expect("trainable graph");

    let final_loss = trainer.run().expect("epochs run");
    let again = trainer.step().expect("no-op on converged trainer");

    assert_eq!(trainer.loss_history().len(), 5);
    assert!(matches!(again, StepOutcome::Finished { loss } if loss == final_loss));
}

#[test]
fn test_loss_finite_every_epoch() {
    let g = six_node_graph();
    let mut rng = StdRng::seed_from_u64(42);
    let mut trainer = Trainer::new(&g, options(100), 32, 16, &mut rng).expect("trainable graph");

    trainer.run().expect("stable run");

    assert_eq!(trainer.loss_history().len(), 100);
    assert!(trainer.loss_history().iter().all(|l| l.is_finite()));
}

#[test]
fn test_loss_decreases_over_100_epochs() {
    let g = six_node_graph();
    let mut rng = StdRng::seed_from_u64(42);
    let mut trainer = Trainer::new(&g, options(100), 32, 16, &mut rng).expect("trainable graph");

    let final_loss = trainer.run().expect("stable run");
    let first_loss = trainer.loss_history()[0];

    assert!(
        final_loss < first_loss,
        "loss should fall on average: first = {first_loss}, final = {final_loss}"
    );
}

#[test]
fn test_fixed_seed_runs_are_bit_identical() {
    let g = four_node_graph();

    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut trainer =
            Trainer::new(&g, options(40), 8, 4, &mut rng).expect("trainable graph");
        trainer.run().expect("stable run");
        trainer.embeddings().expect("converged").clone()
    };

    let a = run(1234);
    let b = run(1234);
    assert_eq!(a.as_slice(), b.as_slice(), "same seed must be bit-identical");

    let c = run(4321);
    assert_ne!(a.as_slice(), c.as_slice(), "different seed should differ");
}

#[test]
fn test_empty_graph_rejected() {
    let g = CitationGraph::build(&[], &[]);
    let mut rng = StdRng::seed_from_u64(42);

    let err = Trainer::new(&g, options(10), 8, 4, &mut rng).expect_err("nothing to train on");
    assert!(matches!(err, EnlazarError::EmptyGraph { nodes: 0, edges: 0 }));
}

#[test]
fn test_edgeless_graph_rejected() {
    let papers = vec![paper("a", 2020, 1), paper("b", 2021, 2)];
    let g = CitationGraph::build(&papers, &[]);
    let mut rng = StdRng::seed_from_u64(42);

    let err = Trainer::new(&g, options(10), 8, 4, &mut rng).expect_err("no positive edges");
    assert!(matches!(err, EnlazarError::EmptyGraph { nodes: 2, edges: 0 }));
}

#[test]
fn test_invalid_options_rejected() {
    let g = four_node_graph();

    for (opts, param) in [
        (options(0), "epochs"),
        (
            TrainOptions {
                learning_rate: 0.0,
                ..options(10)
            },
            "learning_rate",
        ),
        (
            TrainOptions {
                learning_rate: f64::NAN,
                ..options(10)
            },
            "learning_rate",
        ),
        (
            TrainOptions {
                yield_every: 0,
                ..options(10)
            },
            "yield_every",
        ),
    ] {
        let mut rng = StdRng::seed_from_u64(42);
        let err = Trainer::new(&g, opts, 8, 4, &mut rng).expect_err("degenerate options");
        match err {
            EnlazarError::InvalidHyperparameter { param: p, .. } => assert_eq!(p, param),
            other => panic!("expected InvalidHyperparameter, got {other:?}"),
        }
    }
}

#[test]
fn test_negative_shortfall_on_dense_graph() {
    // Triangle: all three possible pairs are edges, so no negatives exist.
    let papers = vec![paper("a", 2019, 1), paper("b", 2020, 2), paper("c", 2021, 3)];
    let citations = vec![citation("a", "b"), citation("b", "c"), citation("c", "a")];
    let g = CitationGraph::build(&papers, &citations);
    let mut rng = StdRng::seed_from_u64(42);

    let mut trainer = Trainer::new(&g, options(10), 8, 4, &mut rng).expect("trainable graph");
    assert_eq!(trainer.negatives_drawn(), 0);
    assert_eq!(trainer.negative_shortfall(), 3);

    // Training still proceeds on positives alone.
    trainer.run().expect("positives-only training is valid");
    assert!(trainer.loss_history().iter().all(|l| l.is_finite()));
}

#[test]
fn test_resume_from_weights_continues() {
    let g = four_node_graph();

    let mut rng = StdRng::seed_from_u64(42);
    let mut first = Trainer::new(&g, options(20), 8, 4, &mut rng).expect("trainable graph");
    first.run().expect("stable run");
    let carried = first.into_weights();

    let mut rng2 = StdRng::seed_from_u64(43);
    let mut second = Trainer::with_weights(&g, options(20), carried.clone(), &mut rng2)
        .expect("trainable graph");
    assert_eq!(second.weights(), &carried);

    second.run().expect("stable run");
    assert_ne!(second.weights(), &carried, "training must update weights");
}

/// Constant-filled weights shaped for [`four_node_graph`].
fn constant_weights(w1_value: f64, w2_value: f64) -> GcnWeights {
    GcnWeights {
        w1: Matrix::from_vec(FEATURE_DIM, 8, vec![w1_value; FEATURE_DIM * 8])
            .expect("data length matches shape"),
        w2: Matrix::from_vec(8, 4, vec![w2_value; 8 * 4]).expect("data length matches shape"),
    }
}

#[test]
fn test_non_finite_weights_fail_on_first_epoch() {
    // NaN weights poison the first layer; relu would zero the NaN and
    // training would report a constant ln(2) loss if this went unchecked.
    let g = four_node_graph();
    let mut rng = StdRng::seed_from_u64(42);
    let mut trainer =
        Trainer::with_weights(&g, options(10), constant_weights(f64::NAN, f64::NAN), &mut rng)
            .expect("trainable graph");

    let err = trainer.step().expect_err("NaN weights cannot train");
    match err {
        EnlazarError::NumericalInstability { epoch, last_loss } => {
            assert_eq!(epoch, 0);
            assert!(last_loss.is_nan(), "no finite loss was ever recorded");
        }
        other => panic!("expected NumericalInstability, got {other:?}"),
    }
    assert!(trainer.loss_history().is_empty());
    assert!(trainer.embeddings().is_none());
}

#[test]
fn test_overflow_mid_run_carries_last_finite_loss() {
    // These magnitudes keep the epoch-0 forward pass finite (products
    // around 1e260) while the gradient products overflow (around 1e320),
    // corrupting the weights. Epoch 1 must then fail while still
    // reporting epoch 0's finite loss.
    let g = four_node_graph();
    let mut rng = StdRng::seed_from_u64(42);
    let mut trainer = Trainer::with_weights(&g, options(10), constant_weights(1e60, 1e200), &mut rng)
        .expect("trainable graph");

    let err = trainer.run().expect_err("overflow must surface as an error");
    match err {
        EnlazarError::NumericalInstability { epoch, last_loss } => {
            assert_eq!(epoch, 1);
            assert_eq!(trainer.loss_history().len(), 1);
            assert!(last_loss.is_finite());
            assert_eq!(last_loss, trainer.loss_history()[0]);
        }
        other => panic!("expected NumericalInstability, got {other:?}"),
    }
}

#[test]
fn test_final_forward_overflow_is_fatal() {
    // With a single epoch the corrupted update lands on the final forward
    // pass, which has no successor epoch to expose it.
    let g = four_node_graph();
    let mut rng = StdRng::seed_from_u64(42);
    let opts = TrainOptions {
        epochs: 1,
        learning_rate: 0.01,
        yield_every: 1,
    };
    let mut trainer = Trainer::with_weights(&g, opts, constant_weights(1e60, 1e200), &mut rng)
        .expect("trainable graph");

    let err = trainer.run().expect_err("final embeddings must be finite");
    match err {
        EnlazarError::NumericalInstability { epoch, last_loss } => {
            assert_eq!(epoch, 0);
            assert_eq!(last_loss, trainer.loss_history()[0]);
        }
        other => panic!("expected NumericalInstability, got {other:?}"),
    }
    assert!(trainer.embeddings().is_none());
}

#[test]
fn test_weights_change_every_epoch() {
    let g = four_node_graph();
    let mut rng = StdRng::seed_from_u64(42);
    let mut trainer = Trainer::new(
        &g,
        TrainOptions {
            epochs: 2,
            learning_rate: 0.01,
            yield_every: 1,
        },
        8,
        4,
        &mut rng,
    )
    .expect("trainable graph");

    let w0 = trainer.weights().clone();
    trainer.step().expect("one epoch");
    let w1 = trainer.weights().clone();
    assert_ne!(w0, w1);

    trainer.step().expect("one epoch");
    assert_ne!(&w1, trainer.weights());
}
