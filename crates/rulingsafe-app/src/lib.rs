// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod cache;
pub mod coordinator;
pub mod forms;
pub mod host;
pub mod ids;
pub mod model;
pub mod pipeline;
pub mod popover;
pub mod screen;
pub mod search;
pub mod state;

pub use cache::*;
pub use coordinator::*;
pub use forms::*;
pub use host::*;
pub use ids::*;
pub use model::*;
pub use popover::*;
pub use screen::*;
pub use state::*;
