// Runs in its own binary so nothing has touched the default logger yet.

#[test]
fn sync_without_a_logger_is_a_no_op() {
    assert!(!rollog::is_initialized());
    rollog::sync().unwrap();
    rollog::sync().unwrap();
    assert!(!rollog::is_initialized());
}
