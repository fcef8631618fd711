// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-place editing of a [`RuntimeText`](crate::RuntimeText).

mod blink;
mod editor;
mod event;
mod mirror;
mod selection;

pub use self::editor::*;
pub use self::event::*;
pub use self::selection::*;
