// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod bootstrap;
pub mod editor;
pub mod google;
pub mod profile;
pub mod records;
pub mod session;

pub use editor::{EditorState, RecordEditor, SaveTarget};
pub use google::GoogleIdentity;
pub use records::{ListPresenter, ListView};
pub use session::{SessionChange, SessionProvider, Subscription};
