//! Pure projection of session state into something a front-end can draw.

mod format;
mod view;

pub use format::{
    format_agent_name, format_message, format_time, format_timestamp, parse_markup,
    short_address, MarkupLine, MarkupSpan,
};
pub use view::{project, Banner, Bubble, ChatView, CONNECT_ACTION_LABEL};
