//! Software-rendered decorations for a portfolio page: a tumbling wireframe cube
//! drawn with a hand-rolled projection, and a layered, draggable globe rendered by
//! a small rasterizer.

pub mod app;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod scene;
pub mod ui;
pub mod widgets;
