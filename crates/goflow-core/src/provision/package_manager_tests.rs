//! Tests for package-manager detection and command tables.

use super::*;
use std::os::unix::fs::PermissionsExt;

mod probe_tests {
    use super::*;

    /// apt-get is probed before yum, which is probed before dnf.
    #[test]
    fn test_probe_order() {
        assert_eq!(
            PackageManager::PROBE_ORDER,
            [
                PackageManager::AptGet,
                PackageManager::Yum,
                PackageManager::Dnf
            ]
        );
    }

    /// `look_path_in` finds an executable file and skips non-executables
    /// and directories.
    #[test]
    fn test_look_path_in_finds_executables() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("apt-get");
        std::fs::write(&exe, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let plain = dir.path().join("yum");
        std::fs::write(&plain, "not executable").unwrap();
        std::fs::set_permissions(&plain, std::fs::Permissions::from_mode(0o644)).unwrap();

        std::fs::create_dir(dir.path().join("dnf")).unwrap();

        let path_var = std::env::join_paths([dir.path()]).unwrap();
        assert_eq!(look_path_in(&path_var, "apt-get"), Some(exe));
        assert_eq!(look_path_in(&path_var, "yum"), None);
        assert_eq!(look_path_in(&path_var, "dnf"), None);
        assert_eq!(look_path_in(&path_var, "missing"), None);
    }

    /// The first directory on PATH holding the binary wins.
    #[test]
    fn test_look_path_in_respects_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        for dir in [&first, &second] {
            let exe = dir.path().join("yum");
            std::fs::write(&exe, "#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let path_var = std::env::join_paths([first.path(), second.path()]).unwrap();
        assert_eq!(
            look_path_in(&path_var, "yum"),
            Some(first.path().join("yum"))
        );
    }
}

mod table_tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(PackageManager::AptGet.name(), "apt-get");
        assert_eq!(PackageManager::Yum.name(), "yum");
        assert_eq!(PackageManager::Dnf.name(), "dnf");
    }

    #[test]
    fn test_families() {
        assert_eq!(PackageManager::AptGet.family(), DistroFamily::Debian);
        assert_eq!(PackageManager::Yum.family(), DistroFamily::RedHat);
        assert_eq!(PackageManager::Dnf.family(), DistroFamily::RedHat);
    }
}
