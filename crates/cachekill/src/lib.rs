//! cachekill: fingerprint static assets for cache-busting.
//!
//! The engine lives in `cachekill-core`; this crate adds the command-line
//! front door and its reporting.

pub mod cli;
