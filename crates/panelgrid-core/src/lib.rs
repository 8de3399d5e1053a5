#![forbid(unsafe_code)]

//! Core: pixel geometry and normalized pointer input.
//!
//! # Role in panelgrid
//! `panelgrid-core` is the input layer. It owns the pixel-space geometry
//! types shared by every other crate and the canonical pointer event that
//! hosts translate their native mouse and touch events into.
//!
//! # How it fits in the system
//! The layout crate (`panelgrid-layout`) converts [`PixelRect`] previews
//! into grid cells, and the runtime (`panelgrid-runtime`) consumes
//! [`PointerEvent`] values to drive drag and resize interactions.

pub mod event;
pub mod geometry;

pub use event::{
    Buttons, MouseButton, MouseEvent, MousePhase, PointerError, PointerEvent, TouchEvent,
    TouchPhase,
};
pub use geometry::{PixelRect, Point, PointerOffsets};
