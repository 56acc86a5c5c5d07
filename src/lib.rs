//! Enlazar: link prediction on citation graphs, in pure Rust.
//!
//! Enlazar learns low-dimensional node embeddings for a citation graph
//! with a two-layer graph convolutional network (GCN) trained from
//! scratch — dense matrix primitives and manual backpropagation, no
//! tensor or autodiff framework — and uses the embeddings to score and
//! rank plausible missing edges.
//!
//! # Architecture
//!
//! ```text
//! Papers + Citations
//!        │
//!        ▼ preprocess
//! Â (normalized adjacency) + X (node features)
//!        │
//!        ▼ train (epoch loop, cooperative yields)
//! H (node embeddings)
//!        │
//!        ▼ predict
//! ranked candidate edges
//! ```
//!
//! The engine is single-threaded and cooperative: the trainer suspends
//! every few epochs so a host scheduler can interleave other work and
//! check for cancellation. Graphs are assumed small enough for dense
//! O(n²) adjacency operations.
//!
//! # Quick Start
//!
//! ```
//! use enlazar::prelude::*;
//!
//! let papers = vec![
//!     Paper { id: "gcn".into(), year: Some(2017), citation_count: 9000, has_artifact: true },
//!     Paper { id: "gat".into(), year: Some(2018), citation_count: 5000, has_artifact: true },
//!     Paper { id: "sage".into(), year: Some(2017), citation_count: 7000, has_artifact: false },
//!     Paper { id: "dw".into(), year: Some(2014), citation_count: 6000, has_artifact: false },
//! ];
//! let citations = vec![
//!     Citation { source: "gat".into(), target: "gcn".into(), predicted: false },
//!     Citation { source: "sage".into(), target: "gcn".into(), predicted: false },
//!     Citation { source: "sage".into(), target: "dw".into(), predicted: false },
//! ];
//!
//! let config = PipelineConfig::new()
//!     .with_epochs(50)
//!     .with_hidden_dim(16)
//!     .with_embedding_dim(8)
//!     .with_random_state(42);
//!
//! let pipeline = Pipeline::new(config).expect("valid configuration");
//! let outcome = pipeline
//!     .run(&papers, &citations, &mut NullObserver)
//!     .expect("small graphs train stably");
//!
//! assert!(outcome.final_loss.expect("training ran").is_finite());
//! for link in &outcome.predictions {
//!     println!("{} -> {} ({:.3})", link.source, link.target, link.confidence);
//! }
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: dense `Matrix`/`Vector` types, activations, Xavier init
//! - [`graph`]: adjacency normalization and node featurization
//! - [`gcn`]: the two-layer convolutional forward pass
//! - [`train`]: epoch loop, BCE loss, manual backpropagation, sampling
//! - [`predict`]: candidate scoring and ranking
//! - [`pipeline`]: orchestration, configuration, progress observation

pub mod error;
pub mod gcn;
pub mod graph;
pub mod pipeline;
pub mod predict;
pub mod prelude;
pub mod primitives;
pub mod train;

pub use error::{EnlazarError, Result};
pub use primitives::{Matrix, Vector};
