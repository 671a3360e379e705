/*!
 * Tests for the metadata merge, including the version policy scenarios
 */

use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use langpack::merger::MetadataMerger;
use langpack::metadata::{AvailabilityIndex, LocaleMetadata, RemoteTranslationStatus};
use langpack::subtitles::SubtitleCountIndex;
use langpack::version::DottedVersionComparator;
use crate::common;

fn write_metadata(locale_root: &Path, locale: &str, value: &Value) -> Result<()> {
    common::create_test_file(
        locale_root,
        &format!("{}/{}_metadata.json", locale, locale),
        &value.to_string(),
    )?;
    Ok(())
}

fn read_metadata(locale_root: &Path, locale: &str) -> Result<Value> {
    let path = locale_root.join(locale).join(format!("{}_metadata.json", locale));
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn run_merge(
    root: &Path,
    software_version: &str,
    statuses: &[RemoteTranslationStatus],
    counts: &SubtitleCountIndex,
) -> Result<AvailabilityIndex> {
    let comparator = DottedVersionComparator;
    let merger = MetadataMerger::new(
        root.join("locale"),
        root.join("packs").join("language_pack_availability.json"),
        software_version,
        &comparator,
    );
    Ok(merger.generate_metadata(statuses, counts)?)
}

fn spanish_prior() -> Value {
    json!({
        "code": "es",
        "name": "Spanish",
        "total_translated": 80,
        "crowdin_version": 3,
        "software_version": "1.0"
    })
}

/// Unchanged approved count keeps the version
#[test]
fn test_merge_withUnchangedCount_shouldKeepCrowdinVersion() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let locale_root = temp_dir.path().join("locale");
    write_metadata(&locale_root, "es", &spanish_prior())?;

    let statuses = vec![common::remote_status("es", "Spanish", 100, 80, 80)];
    let index = run_merge(temp_dir.path(), "1.0", &statuses, &SubtitleCountIndex::default())?;

    let merged = read_metadata(&locale_root, "es")?;
    assert_eq!(merged["crowdin_version"], 3);
    assert_eq!(merged["percent_translated"], 80);
    assert_eq!(merged["phrases"], 100);
    assert_eq!(merged["approved_translations"], 80);
    assert_eq!(index.len(), 1);
    Ok(())
}

/// A changed approved count advances the version by one
#[test]
fn test_merge_withChangedCount_shouldIncrementCrowdinVersion() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let locale_root = temp_dir.path().join("locale");
    write_metadata(&locale_root, "es", &spanish_prior())?;

    let statuses = vec![common::remote_status("es", "Spanish", 100, 95, 95)];
    run_merge(temp_dir.path(), "1.0", &statuses, &SubtitleCountIndex::default())?;

    let merged = read_metadata(&locale_root, "es")?;
    assert_eq!(merged["crowdin_version"], 4);
    assert_eq!(merged["total_translated"], 95);
    Ok(())
}

/// A newer software version resets the counter
#[test]
fn test_merge_withNewerSoftware_shouldResetCrowdinVersion() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let locale_root = temp_dir.path().join("locale");

    for approved in [80, 95] {
        write_metadata(&locale_root, "es", &spanish_prior())?;
        let statuses = vec![common::remote_status("es", "Spanish", 100, approved, approved)];
        run_merge(temp_dir.path(), "1.1", &statuses, &SubtitleCountIndex::default())?;

        let merged = read_metadata(&locale_root, "es")?;
        assert_eq!(merged["crowdin_version"], 1);
        assert_eq!(merged["software_version"], "1.1");
    }
    Ok(())
}

/// Running twice without translation progress is idempotent for the version
#[test]
fn test_merge_twiceWithoutProgress_shouldKeepVersion() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let locale_root = temp_dir.path().join("locale");
    fs::create_dir_all(locale_root.join("fr"))?;
    let statuses = vec![common::remote_status("fr", "French", 50, 20, 40)];

    run_merge(temp_dir.path(), "1.0", &statuses, &SubtitleCountIndex::default())?;
    assert_eq!(read_metadata(&locale_root, "fr")?["crowdin_version"], 1);

    run_merge(temp_dir.path(), "1.0", &statuses, &SubtitleCountIndex::default())?;
    assert_eq!(read_metadata(&locale_root, "fr")?["crowdin_version"], 1);

    let progressed = vec![common::remote_status("fr", "French", 50, 30, 60)];
    run_merge(temp_dir.path(), "1.0", &progressed, &SubtitleCountIndex::default())?;
    assert_eq!(read_metadata(&locale_root, "fr")?["crowdin_version"], 2);
    Ok(())
}

/// Fields outside the updated set are preserved
#[test]
fn test_merge_withExtraFields_shouldPreserveThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let locale_root = temp_dir.path().join("locale");
    let mut prior = spanish_prior();
    prior["native_name"] = json!("Español");
    prior["rtl"] = json!(false);
    prior["name"] = json!("Español (local)");
    write_metadata(&locale_root, "es", &prior)?;

    let statuses = vec![common::remote_status("es", "Spanish", 100, 95, 95)];
    run_merge(temp_dir.path(), "1.0", &statuses, &SubtitleCountIndex::default())?;

    let merged = read_metadata(&locale_root, "es")?;
    assert_eq!(merged["native_name"], "Español");
    assert_eq!(merged["rtl"], false);
    assert_eq!(merged["name"], "Español (local)");
    assert_eq!(merged["code"], "es");
    Ok(())
}

/// Malformed prior metadata is replaced by a fresh record
#[test]
fn test_merge_withMalformedMetadata_shouldSynthesizeRecord() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let locale_root = temp_dir.path().join("locale");
    common::create_test_file(&locale_root, "pt_BR/pt_BR_metadata.json", "{ broken")?;

    let statuses = vec![common::remote_status("pt-BR", "Portuguese, Brazilian", 100, 10, 10)];
    run_merge(temp_dir.path(), "1.0", &statuses, &SubtitleCountIndex::default())?;

    let merged = read_metadata(&locale_root, "pt_BR")?;
    assert_eq!(merged["code"], "pt-BR");
    assert_eq!(merged["name"], "Portuguese, Brazilian");
    assert_eq!(merged["crowdin_version"], 1);
    Ok(())
}

/// Subtitle counts are looked up by language name, missing names count zero
#[test]
fn test_merge_withSubtitleCounts_shouldLookUpByLanguageName() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let locale_root = temp_dir.path().join("locale");
    fs::create_dir_all(locale_root.join("es"))?;
    fs::create_dir_all(locale_root.join("de"))?;

    let statuses = vec![
        common::remote_status("es", "Spanish", 100, 10, 10),
        common::remote_status("de", "German", 100, 10, 10),
    ];
    let counts = SubtitleCountIndex::from_counts([("Spanish", 42)]);
    run_merge(temp_dir.path(), "1.0", &statuses, &counts)?;

    assert_eq!(read_metadata(&locale_root, "es")?["subtitle_count"], 42);
    assert_eq!(read_metadata(&locale_root, "de")?["subtitle_count"], 0);
    Ok(())
}

/// Qualified reference names fall back to the plain language name
#[test]
fn test_merge_withQualifiedReferenceName_shouldUsePlainName() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let locale_root = temp_dir.path().join("locale");
    fs::create_dir_all(locale_root.join("el"))?;

    let statuses = vec![common::remote_status("el", "Greek", 100, 10, 10)];
    let counts = SubtitleCountIndex::from_counts([("Greek", 42)]);
    let index = run_merge(temp_dir.path(), "1.0", &statuses, &counts)?;

    assert_eq!(read_metadata(&locale_root, "el")?["subtitle_count"], 42);
    assert_eq!(index.get("el").and_then(|m| m.subtitle_count), Some(42));
    Ok(())
}

/// An upper-case region-less directory still finds its regional remote entry
#[test]
fn test_merge_withUpperCaseLocaleDir_shouldMatchRegionalStatus() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let locale_root = temp_dir.path().join("locale");
    fs::create_dir_all(locale_root.join("ES"))?;

    let statuses = vec![common::remote_status("es-ES", "Spanish", 100, 60, 60)];
    run_merge(temp_dir.path(), "1.0", &statuses, &SubtitleCountIndex::default())?;

    let es = read_metadata(&locale_root, "ES")?;
    assert_eq!(es["code"], "es-ES");
    assert_eq!(es["percent_translated"], 60);
    assert_eq!(es["approved_translations"], 60);
    Ok(())
}

/// A locale without remote status keeps its translation fields and stays in the index
#[test]
fn test_merge_withUnmatchedLocale_shouldWritePartialRecord() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let locale_root = temp_dir.path().join("locale");
    write_metadata(&locale_root, "es", &spanish_prior())?;
    fs::create_dir_all(locale_root.join("it"))?;

    let counts = SubtitleCountIndex::from_counts([("Spanish", 7)]);
    let index = run_merge(temp_dir.path(), "2.0", &[], &counts)?;

    let es = read_metadata(&locale_root, "es")?;
    assert_eq!(es["crowdin_version"], 3);
    assert_eq!(es["software_version"], "1.0");
    assert_eq!(es["subtitle_count"], 7);

    let it = read_metadata(&locale_root, "it")?;
    assert_eq!(it["code"], "it");
    assert_eq!(it["name"], "Italian");
    assert_eq!(it["crowdin_version"], 1);
    assert!(it.get("percent_translated").is_none());

    assert_eq!(index.len(), 2);
    Ok(())
}

/// The availability index lists every locale in directory order and ignores files
#[test]
fn test_merge_shouldWriteAvailabilityIndex() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let locale_root = temp_dir.path().join("locale");
    fs::create_dir_all(locale_root.join("pt_BR"))?;
    fs::create_dir_all(locale_root.join("es"))?;
    common::create_test_file(&locale_root, "notes.txt", "not a locale")?;

    let statuses = vec![
        common::remote_status("es", "Spanish", 100, 10, 10),
        common::remote_status("pt-BR", "Portuguese, Brazilian", 100, 20, 20),
    ];
    let returned = run_merge(temp_dir.path(), "1.0", &statuses, &SubtitleCountIndex::default())?;

    let path = temp_dir.path().join("packs").join("language_pack_availability.json");
    let stored = AvailabilityIndex::load(&path)?;
    assert_eq!(stored, returned);

    let codes: Vec<&str> = stored.entries().iter().map(|m| m.code.as_str()).collect();
    assert_eq!(codes, vec!["es", "pt-BR"]);
    let pt: &LocaleMetadata = stored.get("pt-BR").unwrap();
    assert_eq!(pt.approved_translations, Some(20));
    Ok(())
}

/// A missing locale root is fatal
#[test]
fn test_merge_withMissingLocaleRoot_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = run_merge(temp_dir.path(), "1.0", &[], &SubtitleCountIndex::default());
    assert!(result.is_err());
    Ok(())
}
