// ─── Blocklaunch Core ───
// Account store, preferences and the launch/supervision pipeline behind the
// terminal menus.
//
// Architecture:
//   core/
//     accounts/   — Credential model + multi-account store
//     state/      — Paths, preferences, per-run application state
//     version/    — Supported versions + installed version JSON + OS rules
//     java/       — Runtime directory layout and Java lookup
//     installer/  — Provisioning trait + offline adapter over .minecraft
//     auth/       — Device-code sign-in seam + Microsoft implementation
//     launch/     — Orchestrator + session model
//     supervisor  — Running-process state machine

pub mod accounts;
pub mod auth;
pub mod error;
pub mod installer;
pub mod java;
pub mod launch;
pub mod state;
pub mod storage;
pub mod supervisor;
pub mod version;
