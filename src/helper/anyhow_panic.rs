use log::error;

/// Unwraps an [`anyhow::Result`] like normal except it calls [`anyhow_panic`] to log the error chain
#[inline]
#[track_caller]
pub fn anyhow_unwrap<T>(result: anyhow::Result<T>, failed_to: &str) -> T {
    match result {
        Ok(x) => x,
        Err(e) => anyhow_panic(&e, failed_to),
    }
}

/// Logs the error and source(s) then panics
#[inline]
#[track_caller]
pub fn anyhow_panic(error: &anyhow::Error, failed_to: &str) -> ! {
    log_anyhow_error_and_sources(error, failed_to);
    panic!("failed to {} while: {error:?}", failed_to);
}

/// Logs the top level error followed by each context/source in the chain, one per line
pub fn log_anyhow_error_and_sources(error: &anyhow::Error, failed_to: &str) {
    error!("failed to {}: {}", failed_to, error);
    let mut sources = error.chain().skip(1).peekable();
    if sources.peek().is_some() {
        error!("error message stack:");
        for (depth, source) in sources.enumerate() {
            error!("\t{}: {}", depth, source);
        }
    }
}
