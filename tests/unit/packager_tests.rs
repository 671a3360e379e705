/*!
 * Tests for language pack archives
 */

use anyhow::Result;
use std::fs;
use langpack::packager::Packager;
use crate::common;

/// Test that every metadata file and compiled catalog ends up in the archive unchanged
#[test]
fn test_build_archives_withLocaleTree_shouldContainMetadataAndCatalogs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let locale_root = temp_dir.path().join("locale");
    common::create_test_file(&locale_root, "es/es_metadata.json", r#"{"code":"es"}"#)?;
    common::create_test_file(&locale_root, "es/LC_MESSAGES/django.mo", "\u{0}binary django")?;
    common::create_test_file(&locale_root, "es/LC_MESSAGES/djangojs.mo", "binary djangojs")?;
    common::create_test_file(&locale_root, "es/LC_MESSAGES/django.po", "source, not packed")?;
    common::create_test_file(&locale_root, "es/notes.txt", "not packed")?;
    common::create_test_file(&locale_root, "pt_BR/pt_BR_metadata.json", r#"{"code":"pt-BR"}"#)?;
    common::create_test_file(&locale_root, "stray.json", "not a locale")?;

    let packager = Packager::new(&locale_root, temp_dir.path().join("packs"));
    let archives = packager.build_archives("0.11.1")?;

    let version_dir = temp_dir.path().join("packs").join("0.11.1");
    assert_eq!(archives, vec![version_dir.join("es.zip"), version_dir.join("pt_BR.zip")]);

    let es = common::read_zip(&archives[0])?;
    let names: Vec<&str> = es.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["LC_MESSAGES/django.mo", "LC_MESSAGES/djangojs.mo", "es_metadata.json"]);
    for (name, content) in &es {
        let original = fs::read(locale_root.join("es").join(name))?;
        assert_eq!(&original, content, "{} differs", name);
    }

    let pt = common::read_zip(&archives[1])?;
    assert_eq!(pt.len(), 1);
    assert_eq!(pt[0].0, "pt_BR_metadata.json");
    Ok(())
}

/// Test that an existing archive is replaced rather than appended to
#[test]
fn test_build_archives_withExistingArchive_shouldReplaceIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let locale_root = temp_dir.path().join("locale");
    common::create_test_file(&locale_root, "de/de_metadata.json", "{}")?;
    common::create_test_file(&locale_root, "de/LC_MESSAGES/django.mo", "old")?;
    let packager = Packager::new(&locale_root, temp_dir.path().join("packs"));
    packager.build_archives("1.0")?;

    fs::remove_file(locale_root.join("de/LC_MESSAGES/django.mo"))?;
    let archives = packager.build_archives("1.0")?;

    let files = common::read_zip(&archives[0])?;
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].0, "de_metadata.json");
    Ok(())
}

/// Test that archives of different versions live side by side
#[test]
fn test_build_archives_withTwoVersions_shouldKeepBoth() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let locale_root = temp_dir.path().join("locale");
    common::create_test_file(&locale_root, "fr/fr_metadata.json", "{}")?;
    let packager = Packager::new(&locale_root, temp_dir.path().join("packs"));

    packager.build_archives("1.0")?;
    packager.build_archives("1.1")?;

    assert!(packager.version_dir("1.0").join("fr.zip").exists());
    assert!(packager.version_dir("1.1").join("fr.zip").exists());
    Ok(())
}
