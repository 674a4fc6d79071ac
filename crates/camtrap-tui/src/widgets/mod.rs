//! Small reusable widgets shared by the screens.

pub mod choice_bar;
pub mod toggle_line;
