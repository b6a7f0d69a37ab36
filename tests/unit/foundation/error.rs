use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FlowError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(FlowError::config("x").to_string().contains("config error:"));
    assert!(FlowError::asset("x").to_string().contains("asset error:"));
    assert!(FlowError::gpu("x").to_string().contains("gpu error:"));
    assert!(FlowError::window("x").to_string().contains("window error:"));
}

#[test]
fn index_out_of_range_names_axis_and_bound() {
    let msg = FlowError::out_of_range("y", 50, 50).to_string();
    assert_eq!(msg, "index out of range: y=50 not in [0, 50)");
}

#[test]
fn truncated_reports_counts() {
    let err = FlowError::DataTruncated {
        expected: 16,
        actual: 3,
    };
    assert!(err.to_string().contains("expected 16 floats, read 3"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FlowError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
