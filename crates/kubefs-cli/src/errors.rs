use std::error::Error;

/// Print an error and its source chain to stderr.
pub fn print_error(err: &(dyn Error + 'static)) {
    eprintln!("Error: {}", err);

    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}
