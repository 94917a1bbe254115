use notes_core::{
    Category, InMemoryNotesRepository, Note, NotesRepository, RepoError, RepositoryConfig,
};

#[test]
fn seed_sample_data_replaces_existing_contents() {
    let mut repo = InMemoryNotesRepository::new(RepositoryConfig::debug());
    repo.create_note("Throwaway", "", None).unwrap();

    repo.seed_sample_data();

    let mut names: Vec<String> = repo
        .fetch_categories()
        .unwrap()
        .into_iter()
        .map(|category| category.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["Personal", "Work"]);

    let notes = repo.fetch_notes().unwrap();
    assert_eq!(notes.len(), 3);
    assert!(notes.iter().all(|note| note.title != "Throwaway"));
    let uncategorized: Vec<&Note> = notes
        .iter()
        .filter(|note| note.category_id.is_none())
        .collect();
    assert_eq!(uncategorized.len(), 1);
    assert_eq!(uncategorized[0].title, "Note 3");
}

#[test]
fn with_fixtures_keeps_given_data() {
    let work = Category::new("Work").unwrap();
    let note = Note::new("Report", "draft", Some(&work)).unwrap();

    let repo = InMemoryNotesRepository::with_fixtures(
        RepositoryConfig::default(),
        vec![work.clone()],
        vec![note.clone()],
    )
    .unwrap();

    assert_eq!(repo.fetch_categories().unwrap(), vec![work.clone()]);
    assert_eq!(repo.fetch_notes_for_category(&work).unwrap(), vec![note]);
}

#[test]
fn with_fixtures_rejects_inconsistent_data() {
    let work = Category::new("Work").unwrap();
    let orphan = Note::new("Orphan", "", Some(&work)).unwrap();
    let err = InMemoryNotesRepository::with_fixtures(
        RepositoryConfig::default(),
        Vec::new(),
        vec![orphan],
    )
    .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));

    let err = InMemoryNotesRepository::with_fixtures(
        RepositoryConfig::default(),
        vec![work.clone(), work.clone()],
        Vec::new(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("duplicate"));

    let mut blank = Category::new("Blank").unwrap();
    blank.name = "  ".to_string();
    let err =
        InMemoryNotesRepository::with_fixtures(RepositoryConfig::default(), vec![blank], Vec::new())
            .unwrap_err();
    assert_eq!(err.code(), "invalid_data");
}

#[test]
fn with_fixtures_rejects_states_storage_would_refuse() {
    let mut padded = Category::new("Work").unwrap();
    padded.name = " Work ".to_string();
    let err =
        InMemoryNotesRepository::with_fixtures(RepositoryConfig::default(), vec![padded], Vec::new())
            .unwrap_err();
    assert!(err.to_string().contains("untrimmed"));

    let mut padded_note = Note::new("Report", "", None).unwrap();
    padded_note.title = "Report\n".to_string();
    let err = InMemoryNotesRepository::with_fixtures(
        RepositoryConfig::default(),
        Vec::new(),
        vec![padded_note],
    )
    .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));

    let mut reversed = Category::new("Work").unwrap();
    reversed.updated_at = reversed.created_at - 1;
    let err = InMemoryNotesRepository::with_fixtures(
        RepositoryConfig::default(),
        vec![reversed],
        Vec::new(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("after updated_at"));

    let mut reversed_note = Note::new("Report", "", None).unwrap();
    reversed_note.created_at = reversed_note.updated_at + 1;
    assert!(InMemoryNotesRepository::with_fixtures(
        RepositoryConfig::default(),
        Vec::new(),
        vec![reversed_note],
    )
    .is_err());
}

#[test]
fn failing_writes_leave_data_unchanged() {
    let mut repo = InMemoryNotesRepository::new(RepositoryConfig::default());
    repo.seed_sample_data();
    let categories = repo.fetch_categories().unwrap();
    let notes = repo.fetch_notes().unwrap();
    repo.fail_writes(true);

    assert!(matches!(
        repo.create_category("New"),
        Err(RepoError::SaveFailed(_))
    ));
    assert!(matches!(
        repo.update_category(&categories[0], "Renamed"),
        Err(RepoError::SaveFailed(_))
    ));
    assert!(matches!(
        repo.create_note("New", "", None),
        Err(RepoError::SaveFailed(_))
    ));
    assert!(matches!(
        repo.update_note(&notes[0], "Renamed", "", None),
        Err(RepoError::SaveFailed(_))
    ));
    assert!(matches!(
        repo.delete_category(&categories[0]),
        Err(RepoError::DeleteFailed(_))
    ));
    assert!(matches!(
        repo.delete_note(&notes[0]),
        Err(RepoError::DeleteFailed(_))
    ));
    assert!(matches!(
        repo.delete_all_categories(),
        Err(RepoError::DeleteFailed(_))
    ));
    assert!(matches!(
        repo.delete_all_notes(),
        Err(RepoError::DeleteFailed(_))
    ));
    assert!(matches!(
        repo.delete_all_data(),
        Err(RepoError::DeleteFailed(_))
    ));

    assert_eq!(repo.fetch_categories().unwrap(), categories);
    assert_eq!(repo.fetch_notes().unwrap(), notes);
}

#[test]
fn validation_wins_over_simulated_failure() {
    let mut repo = InMemoryNotesRepository::new(RepositoryConfig::default());
    repo.fail_writes(true);

    assert!(matches!(
        repo.create_category("   "),
        Err(RepoError::InvalidData(_))
    ));
    let stranger = Note::new("Stranger", "", None).unwrap();
    assert!(matches!(
        repo.delete_note(&stranger),
        Err(RepoError::NotFound(_))
    ));

    repo.fail_writes(false);
    assert!(repo.create_category("Works again").is_ok());
}

#[test]
fn reads_keep_working_while_writes_fail() {
    let mut repo = InMemoryNotesRepository::new(RepositoryConfig::default());
    repo.seed_sample_data();
    repo.fail_writes(true);

    assert_eq!(repo.search_notes("content").unwrap().len(), 3);
    assert_eq!(repo.search_notes("work").unwrap().len(), 1);
}
