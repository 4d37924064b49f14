//! Platform detection tests

use super::*;

#[test]
fn test_supported_pairs_map_to_enumerated_targets() {
    let table = [
        ("macos", "aarch64", "aarch64-apple-darwin"),
        ("macos", "x86_64", "x86_64-apple-darwin"),
        ("linux", "aarch64", "aarch64-unknown-linux-musl"),
        ("linux", "x86_64", "x86_64-unknown-linux-musl"),
    ];

    for (os, arch, expected) in table {
        let target = detect(os, arch).unwrap();
        assert_eq!(target.to_string(), expected, "{os}/{arch}");
    }
}

#[test]
fn test_detection_is_stable() {
    let first = detect("linux", "x86_64").unwrap();
    let second = detect("linux", "x86_64").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_aliases_and_case_are_normalized() {
    assert_eq!(
        detect("Darwin", "arm64").unwrap().to_string(),
        "aarch64-apple-darwin"
    );
    assert_eq!(
        detect("LINUX", "amd64").unwrap().to_string(),
        "x86_64-unknown-linux-musl"
    );
    assert_eq!(
        detect(" linux\n", "AArch64").unwrap().to_string(),
        "aarch64-unknown-linux-musl"
    );
}

#[test]
fn test_unknown_architecture_on_known_os_is_rejected() {
    let err = detect("linux", "riscv64").unwrap_err();
    assert!(matches!(
        err,
        KindlingError::UnsupportedPlatform { ref os, ref arch } if os == "linux" && arch == "riscv64"
    ));
}

#[test]
fn test_unknown_os_is_rejected() {
    for (os, arch) in [("windows", "x86_64"), ("freebsd", "aarch64"), ("", "")] {
        assert!(
            matches!(
                detect(os, arch),
                Err(KindlingError::UnsupportedPlatform { .. })
            ),
            "{os}/{arch} should be unsupported"
        );
    }
}

#[test]
fn test_nix_system_double() {
    assert_eq!(detect("macos", "arm64").unwrap().nix_system(), "aarch64-darwin");
    assert_eq!(detect("linux", "x86_64").unwrap().nix_system(), "x86_64-linux");
}

#[test]
fn test_family() {
    assert_eq!(detect("macos", "x86_64").unwrap().family(), OsFamily::Apple);
    assert_eq!(detect("linux", "aarch64").unwrap().family(), OsFamily::Linux);
}

#[test]
fn test_family_from_str() {
    assert_eq!("apple".parse::<OsFamily>().unwrap(), OsFamily::Apple);
    assert_eq!("macOS".parse::<OsFamily>().unwrap(), OsFamily::Apple);
    assert_eq!("linux".parse::<OsFamily>().unwrap(), OsFamily::Linux);
    assert!("plan9".parse::<OsFamily>().is_err());
}
