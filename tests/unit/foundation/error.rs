use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PinwarpError::config("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(PinwarpError::meta("x").to_string().contains("metadata error:"));
    assert!(PinwarpError::media("x").to_string().contains("media error:"));
    assert!(PinwarpError::render("x").to_string().contains("render error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PinwarpError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
