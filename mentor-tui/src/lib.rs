mod catalog;
mod command;
mod feeders;
mod styles;
mod transcript;
mod transport;
mod tui;
mod view;

pub use catalog::{catalog, find, Panel};
pub use feeders::spawn_tui_feeders;
pub use tui::{TuiActor, TuiMsg, UiTuning};
