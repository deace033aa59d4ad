//! UCI engine client
//!
//! Drives an external analysis engine (Stockfish or any UCI-speaking binary)
//! as a managed child process: discovery, handshake, strength configuration,
//! multi-candidate analysis and bounded shutdown.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use uci_engine::EngineClient;
//!
//! let mut engine = EngineClient::initialize(None, Some(2000)).await?;
//! let lines = engine
//!     .analyse("4k3/8/8/8/4P3/8/8/4K3 b KQkq - 0 1", Duration::from_millis(100), 5)
//!     .await?;
//! for line in &lines {
//!     println!("{} {}", line.mv, line.evaluation);
//! }
//! engine.shutdown(Duration::from_secs(2)).await?;
//! ```

pub mod client;
pub mod discovery;
pub mod error;
pub mod evaluation;
pub mod process;
pub mod protocol;
pub mod strength;

pub use client::{EngineClient, EngineSettings};
pub use discovery::EngineLocator;
pub use error::{EngineError, EngineResult};
pub use evaluation::{Evaluation, RankedMove, Side, UciMove, MATE_SCORE};
pub use strength::{clamp_elo, skill_level_for_elo};
