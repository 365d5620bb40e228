// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod pruner;
pub mod search;
pub mod variants;
pub mod worker;

pub use pruner::{dominates, prune_dominated};
pub use search::{is_exclusivity_compatible, optimize, optimize_with_progress};
pub use variants::card_variants;
pub use worker::{OptimizeHandle, WorkerMessage, WorkerRequest, run_worker, spawn_optimize};
