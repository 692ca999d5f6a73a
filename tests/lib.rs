mod properties;
mod syntax;
mod threads;

/// Routes engine logs to the test output when built with `--features logging`.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
