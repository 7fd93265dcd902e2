mod render;
mod state;

pub use render::{render_html, render_text};
pub use state::{reduce, Action, ViewState};
