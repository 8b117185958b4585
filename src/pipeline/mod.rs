//! Pipeline - the host surface a reconciler drives.
//!
//! ```text
//! reconciler ── create/insert/remove/set ──> Scene ── create/set/destroy ──> Renderer
//!                                             ^                                │
//!                                             └──────── handle_event ──────────┘
//! ```

mod universal;
