/// Runs API and storage work inline on the UI thread. Handlers flip the busy
/// flag around each call so controls stay disabled while a request is in
/// flight.
pub fn run_blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    f()
}
