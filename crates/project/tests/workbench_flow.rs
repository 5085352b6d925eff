use std::fs;
use std::path::Path;

use rpide_core::Indentation;
use rpide_project::{
    Command, DirtyTransition, MenuAction, NewEntryKind, NoticeKind, Outcome, Project,
    ProjectError, RecordingShell, Workbench,
};
use tempfile::tempdir;

fn demo_pack(root: &Path) {
    fs::create_dir_all(root.join("assets/minecraft/lang")).unwrap();
    fs::write(root.join("assets/minecraft/lang/en_us.json"), "{\n    \"a\": \"b\"\n}\n").unwrap();
    fs::write(root.join("pack.mcmeta"), r#"{"pack":{"pack_format":6,"description":"demo"}}"#)
        .unwrap();
    fs::write(root.join(".DS_Store"), b"").unwrap();
}

fn workbench(root: &Path) -> Workbench<RecordingShell> {
    let project = Project::from_directory(root).unwrap();
    Workbench::new(project, Indentation::Spaces(4), RecordingShell::default()).unwrap()
}

fn visible(bench: &Workbench<RecordingShell>) -> Vec<String> {
    bench
        .tree()
        .rows()
        .into_iter()
        .map(|row| format!("{}{}", "  ".repeat(row.depth - 1), row.name))
        .collect()
}

#[test]
fn browse_edit_and_save() {
    let tmp = tempdir().unwrap();
    demo_pack(tmp.path());
    let mut bench = workbench(tmp.path());
    assert_eq!(visible(&bench), vec!["assets", "pack.mcmeta"]);

    for dir in ["assets", "assets/minecraft", "assets/minecraft/lang"] {
        assert_eq!(
            bench.dispatch(Command::Expand(dir.into())).unwrap(),
            Outcome::TreeUpdated
        );
    }
    assert_eq!(
        visible(&bench),
        vec!["assets", "  minecraft", "    lang", "      en_us.json", "pack.mcmeta"]
    );

    let opened = bench
        .dispatch(Command::OpenFile("assets/minecraft/lang/en_us.json".into()))
        .unwrap();
    let Outcome::TabOpened(tab) = opened else {
        panic!("expected a tab");
    };
    let again = bench
        .dispatch(Command::OpenFile(tmp.path().join("assets/./minecraft/lang/en_us.json")))
        .unwrap();
    assert_eq!(again, Outcome::TabOpened(tab));
    assert_eq!(bench.tabs().len(), 1);

    let summary = &bench.tabs().summaries()[0];
    assert_eq!(summary.indentation.as_deref(), Some("Spaces: 4"));
    assert_eq!(summary.line_ending, Some("LF"));

    let edit = |text: &str| Command::Edit {
        tab,
        text: text.to_string(),
    };
    assert_eq!(
        bench.dispatch(edit("{}\n")).unwrap(),
        Outcome::TabDirty(DirtyTransition::BecameDirty)
    );
    assert_eq!(
        bench.dispatch(edit("{ }\n")).unwrap(),
        Outcome::TabDirty(DirtyTransition::AlreadyDirty)
    );

    let saved = bench.dispatch(Command::Save(tab)).unwrap();
    let lang = tmp.path().join("assets/minecraft/lang/en_us.json");
    assert_eq!(saved, Outcome::Saved(lang.clone()));
    assert_eq!(fs::read_to_string(&lang).unwrap(), "{ }\n");
    assert!(!bench.tabs().summaries()[0].dirty);
}

#[test]
fn create_file_conflict_is_a_notice_and_keeps_content() {
    let tmp = tempdir().unwrap();
    demo_pack(tmp.path());
    let mut bench = workbench(tmp.path());

    let outcome = bench
        .dispatch(Command::CreateEntry {
            parent: tmp.path().to_path_buf(),
            name: "pack.mcmeta".to_string(),
            kind: NewEntryKind::File,
        })
        .unwrap();

    let Outcome::Notice(notice) = outcome else {
        panic!("expected a notice");
    };
    assert_eq!(notice.kind, NoticeKind::AlreadyExists);
    assert_eq!(notice.path, tmp.path().join("pack.mcmeta"));
    assert!(notice.message.contains("already exists"));
    assert_eq!(bench.shell().beeps, 1);
    assert!(fs::read_to_string(tmp.path().join("pack.mcmeta"))
        .unwrap()
        .contains("demo"));
}

#[test]
fn create_folder_over_existing_file_changes_nothing() {
    let tmp = tempdir().unwrap();
    demo_pack(tmp.path());
    fs::write(tmp.path().join("sub"), "file").unwrap();
    let mut bench = workbench(tmp.path());

    let outcome = bench
        .dispatch(Command::CreateEntry {
            parent: ".".into(),
            name: "sub".to_string(),
            kind: NewEntryKind::Folder,
        })
        .unwrap();

    assert!(matches!(outcome, Outcome::Notice(_)));
    assert!(tmp.path().join("sub").is_file());
    assert_eq!(fs::read_to_string(tmp.path().join("sub")).unwrap(), "file");
}

#[test]
fn menu_driven_create_and_trash_refresh_the_tree() {
    let tmp = tempdir().unwrap();
    demo_pack(tmp.path());
    let mut bench = workbench(tmp.path());
    bench.dispatch(Command::Expand("assets".into())).unwrap();

    let menu = bench.context_menu(Path::new("assets")).unwrap();
    let new_folder = menu
        .entries()
        .find(|entry| entry.action == MenuAction::NewFolder)
        .unwrap();
    let command = Command::from_menu(new_folder, Some("textures")).unwrap();
    assert_eq!(bench.dispatch(command).unwrap(), Outcome::TreeRefreshed);
    assert!(tmp.path().join("assets/textures").is_dir());
    assert_eq!(
        visible(&bench),
        vec!["assets", "  minecraft", "  textures", "pack.mcmeta"]
    );

    let menu = bench.context_menu(Path::new("assets/textures")).unwrap();
    let trash = menu
        .entries()
        .find(|entry| entry.action == MenuAction::MoveToTrash)
        .unwrap();
    let command = Command::from_menu(trash, None).unwrap();
    assert_eq!(bench.dispatch(command).unwrap(), Outcome::TreeRefreshed);
    assert!(!tmp.path().join("assets/textures").exists());
    assert_eq!(visible(&bench), vec!["assets", "  minecraft", "pack.mcmeta"]);
    assert_eq!(bench.shell().trashed, vec![tmp.path().join("assets/textures")]);
}

#[test]
fn failed_trash_leaves_filesystem_unchanged() {
    let tmp = tempdir().unwrap();
    demo_pack(tmp.path());
    let project = Project::from_directory(tmp.path()).unwrap();
    let shell = RecordingShell {
        fail_trash: true,
        ..RecordingShell::default()
    };
    let mut bench = Workbench::new(project, Indentation::Spaces(4), shell).unwrap();

    let err = bench
        .dispatch(Command::DeleteEntry("pack.mcmeta".into()))
        .unwrap_err();
    assert!(matches!(err, ProjectError::Shell { .. }));
    assert!(tmp.path().join("pack.mcmeta").is_file());
}

#[test]
fn reveal_and_open_are_delegated() {
    let tmp = tempdir().unwrap();
    demo_pack(tmp.path());
    let mut bench = workbench(tmp.path());

    assert_eq!(
        bench.dispatch(Command::Reveal("assets".into())).unwrap(),
        Outcome::Delegated
    );
    assert_eq!(
        bench
            .dispatch(Command::OpenExternal("pack.mcmeta".into()))
            .unwrap(),
        Outcome::Delegated
    );
    assert_eq!(bench.shell().revealed, vec![tmp.path().join("assets")]);
    assert_eq!(bench.shell().opened, vec![tmp.path().join("pack.mcmeta")]);
}

#[test]
fn bad_names_are_rejected_before_touching_disk() {
    let tmp = tempdir().unwrap();
    demo_pack(tmp.path());
    let mut bench = workbench(tmp.path());

    let err = bench
        .dispatch(Command::CreateEntry {
            parent: ".".into(),
            name: "../escape".to_string(),
            kind: NewEntryKind::File,
        })
        .unwrap_err();
    assert!(matches!(err, ProjectError::InvalidName(_)));
    assert!(!tmp.path().parent().unwrap().join("escape").exists());
}

#[cfg(unix)]
#[test]
fn unreadable_tree_after_create_still_reports_the_new_file() {
    let tmp = tempdir().unwrap();
    demo_pack(tmp.path());
    let mut bench = workbench(tmp.path());
    let assets = bench.project().root().join("assets");
    bench.dispatch(Command::Expand(assets.clone())).unwrap();
    let before = visible(&bench);

    std::os::unix::fs::symlink(tmp.path().join("missing"), tmp.path().join("assets/dangling"))
        .unwrap();
    let outcome = bench
        .dispatch(Command::CreateEntry {
            parent: ".".into(),
            name: "new.txt".to_string(),
            kind: NewEntryKind::File,
        })
        .unwrap();

    assert_eq!(outcome, Outcome::TreeStale);
    assert!(tmp.path().join("new.txt").is_file());
    assert_eq!(visible(&bench), before);
    let node = bench.tree().find(&assets).unwrap();
    assert!(bench.tree().is_expanded(node));

    fs::remove_file(tmp.path().join("assets/dangling")).unwrap();
    let outcome = bench
        .dispatch(Command::DeleteEntry("new.txt".into()))
        .unwrap();
    assert_eq!(outcome, Outcome::TreeRefreshed);
    let node = bench.tree().find(&assets).unwrap();
    assert!(bench.tree().is_expanded(node));
    assert!(!visible(&bench).contains(&"new.txt".to_string()));
}
