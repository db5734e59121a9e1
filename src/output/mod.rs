mod format;
mod session;
mod statusline;
mod windows;

pub(crate) use session::{SessionTableOptions, output_session_json, print_session_table};
pub(crate) use statusline::{output_statusline_json, print_statusline};
pub(crate) use windows::{WindowTableOptions, output_windows_json, print_windows_table};
