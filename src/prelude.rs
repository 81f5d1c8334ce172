//! A single import for declaring layouts.
//!
//! ```rust
//! use ply_layout::prelude::*;
//! ```

// Core types
pub use crate::{Declaration, LayoutContext, LayoutScope, LayoutSettings};
pub use crate::color::Color;
pub use crate::id::Id;
pub use crate::math::{BoundingBox, Dimensions, Vector2};
pub use crate::errors::{ErrorData, ErrorType};
pub use crate::engine::{PointerDataInteractionState, ScrollContainerData};
pub use crate::render_commands::{RenderCommand, RenderCommandConfig, RenderCommands};
pub use crate::layout::{Padding, Sizing};
pub use crate::text::TextConfig;

// Macros
pub use crate::{fit, fixed, grow, percent};

// Alignment, globbed
pub use crate::align::AlignX::{self, *};
pub use crate::align::AlignY::{self, *};

// LayoutDirection, globbed
pub use crate::layout::LayoutDirection::{self, *};

// WrapMode, type only: its `None` would shadow `Option::None`
pub use crate::text::WrapMode;
