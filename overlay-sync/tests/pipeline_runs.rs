use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use overlay_core::Config;
use overlay_sync::{
    pipeline::{run, Stage},
    project_dir, promote_dir, seed_dir, sync_dir, FileOutcome, SyncError, WriteResult,
};
use tempfile::TempDir;

const ITEMS: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<LanguageData>\n\t<Entry>\n\t\t<zType>A</zType>\n\t\t<en-US>Apple</en-US>\n\t\t<ja>x</ja>\n\t</Entry>\n\t<Entry>\n\t\t<zType>B</zType>\n\t\t<en-US>Banana</en-US>\n\t\t<ja>y</ja>\n\t</Entry>\n</LanguageData>\n";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn workspace() -> (TempDir, Config) {
    init_logging();
    let root = TempDir::new().expect("root");
    let config = Config::default().rooted_at(root.path());
    fs::create_dir_all(&config.source_dir).expect("source dir");
    (root, config)
}

fn write(dir: &Path, name: &str, content: impl AsRef<[u8]>) {
    fs::create_dir_all(dir).expect("mkdir");
    fs::write(dir.join(name), content).expect("write");
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).expect("read")
}

#[test]
fn first_sync_creates_seeded_overlays() {
    let (_root, config) = workspace();
    write(&config.source_dir, "text-items.xml", ITEMS);

    let report = sync_dir(&config, false).expect("sync");
    assert!(report.created_dir);
    assert_eq!(report.created(), 1);
    assert_eq!(
        report.files[0].outcome,
        FileOutcome::Created { entries: 2 }
    );

    let overlay = read(&config.overlay_dir, "text-items.xml");
    assert!(overlay.contains("\t\t<ja>x</ja>\n\t\t<fixja>x</fixja>"));
    assert!(overlay.contains("\t\t<ja>y</ja>\n\t\t<fixja>y</fixja>"));
}

#[test]
fn second_sync_leaves_mtime_untouched() {
    let (_root, config) = workspace();
    write(&config.source_dir, "text-items.xml", ITEMS);
    sync_dir(&config, false).expect("first sync");

    let target = config.overlay_dir.join("text-items.xml");
    let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(24 * 60 * 60));
    set_file_mtime(&target, old).expect("set old mtime");

    let report = sync_dir(&config, false).expect("second sync");
    assert_eq!(report.files[0].outcome, FileOutcome::Unchanged);
    assert_eq!(report.written(), 0);

    let mtime = FileTime::from_last_modification_time(&fs::metadata(&target).expect("meta"));
    assert_eq!(mtime, old, "idempotent sync must not touch the overlay");
}

#[test]
fn edited_corrections_survive_source_changes() {
    let (_root, config) = workspace();
    write(
        &config.source_dir,
        "text-items.xml",
        "<LanguageData>\n\t<Entry>\n\t\t<zType>A</zType>\n\t\t<ja>x</ja>\n\t</Entry>\n\t<Entry>\n\t\t<zType>Old</zType>\n\t\t<ja>o</ja>\n\t</Entry>\n</LanguageData>\n",
    );
    sync_dir(&config, false).expect("first sync");

    let overlay = read(&config.overlay_dir, "text-items.xml")
        .replace("<fixja>x</fixja>", "<fixja>x-edited</fixja>");
    write(&config.overlay_dir, "text-items.xml", &overlay);

    write(&config.source_dir, "text-items.xml", ITEMS);
    let report = sync_dir(&config, false).expect("second sync");
    assert_eq!(
        report.files[0].outcome,
        FileOutcome::Updated {
            added: 1,
            removed: 1
        }
    );
    assert_eq!(report.added(), 1);
    assert_eq!(report.removed(), 1);

    let overlay = read(&config.overlay_dir, "text-items.xml");
    assert!(overlay.contains("<fixja>x-edited</fixja>"));
    assert!(overlay.contains("<fixja>y</fixja>"));
    assert!(!overlay.contains("<zType>Old</zType>"));
}

#[test]
fn orphans_are_deleted_only_with_prefix() {
    let (_root, config) = workspace();
    write(&config.source_dir, "text-items.xml", ITEMS);
    write(&config.overlay_dir, "text-retired.xml", "<LanguageData>\n</LanguageData>\n");
    write(&config.overlay_dir, "glossary.xml", "<LanguageData>\n</LanguageData>\n");

    let report = sync_dir(&config, false).expect("sync");
    assert_eq!(
        report.orphans.removed,
        vec![config.overlay_dir.join("text-retired.xml")]
    );
    assert!(!config.overlay_dir.join("text-retired.xml").exists());
    assert!(config.overlay_dir.join("glossary.xml").exists());
}

#[test]
fn failing_file_does_not_stop_the_batch() {
    let (_root, config) = workspace();
    write(&config.source_dir, "text-a.xml", ITEMS);
    write(&config.source_dir, "text-b.xml", [0xff_u8, 0xfe, 0x00, 0x3c]);
    write(&config.source_dir, "text-c.xml", ITEMS);

    let report = sync_dir(&config, false).expect("sync");
    assert_eq!(report.files.len(), 3);
    assert_eq!(report.failed(), 1);
    assert!(report.has_failures());
    assert!(matches!(report.files[1].outcome, FileOutcome::Failed { .. }));
    assert!(config.overlay_dir.join("text-a.xml").exists());
    assert!(config.overlay_dir.join("text-c.xml").exists());
    assert!(!config.overlay_dir.join("text-b.xml").exists());
}

#[test]
fn record_free_source_is_copied() {
    let (_root, config) = workspace();
    let empty = "<?xml version=\"1.0\"?>\n<LanguageData>\n</LanguageData>\n";
    write(&config.source_dir, "text-empty.xml", empty);

    let report = sync_dir(&config, false).expect("sync");
    assert_eq!(report.files[0].outcome, FileOutcome::Copied);
    assert_eq!(read(&config.overlay_dir, "text-empty.xml"), empty);
}

#[test]
fn missing_source_dir_is_a_config_error() {
    init_logging();
    let root = TempDir::new().expect("root");
    let config = Config::default().rooted_at(root.path());
    for stage in [Stage::Sync, Stage::Project, Stage::Seed, Stage::Promote] {
        let err = run(&config, stage, false).expect_err("missing input dir");
        assert!(matches!(err, SyncError::SourceDirMissing { .. }), "{stage}");
    }
    assert!(!config.overlay_dir.exists());
}

#[test]
fn dry_run_touches_nothing() {
    let (_root, config) = workspace();
    write(&config.source_dir, "text-items.xml", ITEMS);
    write(&config.overlay_dir, "text-retired.xml", "<L>\n</L>\n");

    let report = sync_dir(&config, true).expect("dry run");
    assert_eq!(report.orphans.removed.len(), 1);
    assert!(matches!(
        report.files[0].write,
        Some(WriteResult::WouldWrite { .. })
    ));
    assert!(config.overlay_dir.join("text-retired.xml").exists());
    assert!(!config.overlay_dir.join("text-items.xml").exists());
}

#[test]
fn projection_strips_corrections_and_sweeps_orphans() {
    let (_root, config) = workspace();
    write(
        &config.source_dir,
        "text-items.xml",
        "<LanguageData>\n\t<Entry>\n\t\t<zType>A</zType>\n\t\t<ja>x</ja>\n\t\t<fixja>z</fixja>\n\t</Entry>\n</LanguageData>\n",
    );
    write(&config.projection_dir, "text-stale.xml", "<L>\n</L>\n");

    let report = project_dir(&config, false).expect("project");
    assert_eq!(
        report.files[0].outcome,
        FileOutcome::Projected { entries: 1 }
    );
    let projected = read(&config.projection_dir, "text-items.xml");
    assert!(!projected.contains("fixja"));
    assert!(projected.contains("\t\t<ja>x</ja>"));
    assert!(!config.projection_dir.join("text-stale.xml").exists());
}

#[test]
fn promotion_writes_only_documents_with_differences() {
    let (root, config) = workspace();
    let config = Config {
        patch_dir: root.path().join("patch"),
        ..config
    };
    write(&config.source_dir, "text-a.xml", ITEMS);
    write(&config.source_dir, "text-b.xml", ITEMS);
    sync_dir(&config, false).expect("sync");

    let edited = read(&config.overlay_dir, "text-a.xml")
        .replace("<fixja>x</fixja>", "<fixja>x-edited</fixja>");
    write(&config.overlay_dir, "text-a.xml", &edited);

    let report = promote_dir(&config, false).expect("promote");
    assert_eq!(
        report.files[0].outcome,
        FileOutcome::Promoted { entries: 1 }
    );
    assert_eq!(report.files[1].outcome, FileOutcome::NoDifferences);

    let patch = read(&config.patch_dir, "text-a.xml");
    assert!(patch.contains("<ja>x-edited</ja>"));
    assert!(!patch.contains("fixja"));
    assert!(!patch.contains("<zType>B</zType>"));
    assert!(!config.patch_dir.join("text-b.xml").exists());
}

#[test]
fn seeding_writes_copies_with_corrections() {
    let (root, config) = workspace();
    let config = Config {
        seed_dir: root.path().join("seeded"),
        ..config
    };
    write(&config.source_dir, "text-items.xml", ITEMS);

    let report = seed_dir(&config, false).expect("seed");
    assert_eq!(report.files[0].outcome, FileOutcome::Seeded { entries: 2 });
    let seeded = read(&config.seed_dir, "text-items.xml");
    assert!(seeded.contains("\t\t<ja>x</ja>\n\t\t<fixja>x</fixja>\n\t</Entry>"));
    assert_eq!(read(&config.source_dir, "text-items.xml"), ITEMS);
}
