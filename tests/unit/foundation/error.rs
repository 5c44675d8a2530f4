use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SkeletorError::asset_load("x")
            .to_string()
            .contains("asset load error:")
    );
    assert!(
        SkeletorError::source_acquisition("x")
            .to_string()
            .contains("source acquisition error:")
    );
    assert!(
        SkeletorError::estimation("x")
            .to_string()
            .contains("estimation error:")
    );
    assert!(
        SkeletorError::dimension("x")
            .to_string()
            .contains("dimension error:")
    );
    assert!(
        SkeletorError::media("x")
            .to_string()
            .contains("media error:")
    );
    assert!(
        SkeletorError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SkeletorError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_per_frame_errors_are_transient() {
    assert!(SkeletorError::estimation("x").is_transient());
    assert!(SkeletorError::dimension("x").is_transient());
    assert!(!SkeletorError::asset_load("x").is_transient());
    assert!(!SkeletorError::source_acquisition("x").is_transient());
    assert!(!SkeletorError::media("x").is_transient());
}
