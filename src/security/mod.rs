// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Security gates that run before a request reaches a backend pool.
//!
//! The only gate shipped today is HTTP basic authentication with a single
//! global credential pair; when no credential is configured the gate is
//! absent entirely and requests flow straight to the pool.

mod basic;

#[cfg(test)]
mod tests;

pub use basic::BasicAuthGate;
