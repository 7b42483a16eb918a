pub mod chat;
pub mod layout;
pub mod widgets;
