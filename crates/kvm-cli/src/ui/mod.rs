//! Terminal output.
//!
//! ```text
//! ┌─────────────┐
//! │  Commands   │  (install, activate, list, ...)
//! └──────┬──────┘
//!        │ uses
//!        ▼
//! ┌─────────────┐
//! │   Output    │  stderr messages, implements kvm_core::Reporter
//! └──────┬──────┘
//!        │ styles with
//!        ▼
//! ┌─────────────┐
//! │    Theme    │  Colors, icons, column widths
//! └─────────────┘
//! ```
//!
//! Data a script might consume (versions, listings) goes to stdout through
//! [`list`]; everything else goes to stderr.

pub mod list;
pub mod output;
pub mod progress;
pub mod theme;

pub use output::Output;
pub use theme::Theme;
