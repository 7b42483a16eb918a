mod footer;
mod header;
mod spinner;
mod toast;

pub use footer::Footer;
pub use header::Header;
pub use spinner::Spinner;
pub use toast::{Toast, ToastLevel, ToastManager};
