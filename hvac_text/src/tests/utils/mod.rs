// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod asserts;
mod env;
mod host;

pub(crate) use asserts::assert_text_invariants;
pub(crate) use env::{FixedMeasurer, RecordingSink, SinkItem, TestEnv};
pub(crate) use host::{Recorded, RecordingChecker, RecordingHost};
