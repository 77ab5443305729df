//! End-to-end suite for plyboard.
//!
//! Each module drives the public facade the way a host application would:
//! text in, graphs and replays out, game trees grown tick by tick.
//!
//! ```bash
//! cargo test --test end_to_end
//! ```

mod adversarial_scenarios;
mod notation_scenarios;
mod replay_scenarios;
