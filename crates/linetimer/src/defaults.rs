use std::{env, ffi::OsString};

pub(crate) const READ_BUFFER_CAPACITY: usize = 32 * 1024;
pub(crate) const LOG_FILTER_ENV: &str = "LINETIMER_LOG";

pub(crate) fn log_filter_value() -> Option<OsString> {
    env::var_os(LOG_FILTER_ENV).filter(|value| !value.is_empty())
}
