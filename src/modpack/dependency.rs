use log::warn;

use crate::registry::DependencyId;

use super::Modpack;

/// Dependencies from `identifiers` that the modpack does not contain yet, in
/// request order and without duplicates.
///
/// Only the package part of each identifier is compared. The requested version
/// is carried along for logging but never checked against what is installed.
pub fn missing_dependencies(modpack: &Modpack, identifiers: &[String]) -> Vec<DependencyId> {
    let mut missing: Vec<DependencyId> = Vec::new();

    for identifier in identifiers {
        let dependency = match identifier.parse::<DependencyId>() {
            Ok(d) => d,
            Err(e) => {
                warn!("Ignoring dependency: {}", e);
                continue;
            }
        };

        if modpack.lookup(&dependency.full_name).is_some()
            || missing.iter().any(|d| d.full_name == dependency.full_name)
        {
            continue;
        }
        missing.push(dependency);
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modpack::modfile::tests::installed;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_dependencies_skips_installed() {
        let mut modpack = Modpack::new("/modpack/current");
        modpack
            .insert(installed("BepInExPack", "BepInEx-BepInExPack"))
            .unwrap();

        let missing = missing_dependencies(
            &modpack,
            &ids(&["BepInEx-BepInExPack-5.4.2100", "Evaisa-LethalLib-0.16.0"]),
        );

        assert_eq!(
            missing,
            vec![DependencyId {
                full_name: "Evaisa-LethalLib".into(),
                version: "0.16.0".into(),
            }]
        );
    }

    #[test]
    fn test_missing_dependencies_ignores_installed_version() {
        // Installed 1.0.0, requested 9.9.9: still counts as present
        let mut modpack = Modpack::new("/modpack/current");
        modpack.insert(installed("Tool", "Acme-Tool")).unwrap();

        assert!(missing_dependencies(&modpack, &ids(&["Acme-Tool-9.9.9"])).is_empty());
    }

    #[test]
    fn test_missing_dependencies_dedups_and_keeps_order() {
        let modpack = Modpack::new("/modpack/current");
        let missing = missing_dependencies(
            &modpack,
            &ids(&["Foo-Bar-1.0.0", "Acme-Tool-2.0.0", "Foo-Bar-1.1.0", "garbage"]),
        );

        let names: Vec<&str> = missing.iter().map(|d| d.full_name.as_str()).collect();
        assert_eq!(names, vec!["Foo-Bar", "Acme-Tool"]);
        assert_eq!(missing[0].version, "1.0.0");
    }
}
