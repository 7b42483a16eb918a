mod input;
mod keybinds;

pub use input::InputBuffer;
pub use keybinds::{Action, Keybinds};
