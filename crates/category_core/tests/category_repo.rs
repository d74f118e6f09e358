use category_core::{
    CategoryRepository, CategoryRow, CategoryValidationError, Mapped, RepoError, SessionFactory,
    SqliteSessionFactory,
};
use rusqlite::types::Value;
use std::rc::Rc;

fn repository() -> (SqliteSessionFactory, CategoryRepository) {
    let factory = SqliteSessionFactory::in_memory().unwrap();
    let session = factory.open_session().unwrap();
    let repo = CategoryRepository::new(Rc::new(session));
    (factory, repo)
}

#[test]
fn add_and_get_by_primary_key() {
    let (_factory, repo) = repository();

    repo.add(&CategoryRow::new("Test Category")).unwrap();

    let loaded = repo.get_by_primary_key("Test Category").unwrap();
    assert_eq!(loaded.name, "Test Category");
    assert_eq!(loaded.primary_key(), "Test Category");
}

#[test]
fn get_missing_returns_not_found() {
    let (_factory, repo) = repository();

    let err = repo
        .get_by_primary_key("This category doesn't exist")
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { entity: "Category", ref key } if key == "This category doesn't exist"
    ));
}

#[test]
fn add_duplicate_returns_integrity_error() {
    let (_factory, repo) = repository();

    repo.add(&CategoryRow::new("Books")).unwrap();
    let err = repo.add(&CategoryRow::new("Books")).unwrap_err();

    assert!(matches!(err, RepoError::Integrity { .. }));
    assert!(err.is_integrity_violation());
}

#[test]
fn add_rejects_invalid_name() {
    let (_factory, repo) = repository();

    let err = repo.add(&CategoryRow::new("")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation { entity: "Category", .. }
    ));
    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(
        source.downcast_ref::<CategoryValidationError>(),
        Some(&CategoryValidationError::EmptyName)
    );
    assert!(repo.list().unwrap().is_empty());
}

#[test]
fn names_with_whitespace_and_control_characters_are_stored_verbatim() {
    let (_factory, repo) = repository();

    for name in [" ", "Food\tDrink", "Line\nBreak"] {
        repo.add(&CategoryRow::new(name)).unwrap();
        assert_eq!(repo.get_by_primary_key(name).unwrap().name, name);
    }

    let mut names = repo
        .list()
        .unwrap()
        .into_iter()
        .map(|row| row.name)
        .collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, vec![" ", "Food\tDrink", "Line\nBreak"]);
}

#[test]
fn list_returns_every_row() {
    let (_factory, repo) = repository();
    assert!(repo.list().unwrap().is_empty());

    for name in ["Travel", "Books", "Music"] {
        repo.add(&CategoryRow::new(name)).unwrap();
    }

    let mut names = repo
        .list()
        .unwrap()
        .into_iter()
        .map(|row| row.name)
        .collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, vec!["Books", "Music", "Travel"]);
}

#[test]
fn update_primary_key_rekeys_row() {
    let (_factory, repo) = repository();
    repo.add(&CategoryRow::new("Original Name")).unwrap();

    repo.update_by_primary_key(
        "Original Name",
        [("name", Value::Text("Updated Name".to_string()))],
    )
    .unwrap();

    let updated = repo.get_by_primary_key("Updated Name").unwrap();
    assert_eq!(updated.name, "Updated Name");
    let err = repo.get_by_primary_key("Original Name").unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn update_unknown_field_returns_invalid_attribute_and_keeps_row() {
    let (_factory, repo) = repository();
    repo.add(&CategoryRow::new("Stable")).unwrap();

    let err = repo
        .update_by_primary_key(
            "Stable",
            [
                ("name", Value::Text("Changed".to_string())),
                ("colour", Value::Text("red".to_string())),
            ],
        )
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::InvalidAttribute { entity: "Category", ref attribute } if attribute == "colour"
    ));
    assert_eq!(repo.get_by_primary_key("Stable").unwrap().name, "Stable");
    assert!(repo.get_by_primary_key("Changed").is_err());
}

#[test]
fn update_missing_row_returns_not_found() {
    let (_factory, repo) = repository();

    let err = repo
        .update_by_primary_key("Ghost", [("name", Value::Text("Other".to_string()))])
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn update_rejects_invalid_and_colliding_values() {
    let (_factory, repo) = repository();
    repo.add(&CategoryRow::new("Books")).unwrap();
    repo.add(&CategoryRow::new("Music")).unwrap();

    let invalid = repo
        .update_by_primary_key("Books", [("name", Value::Text(String::new()))])
        .unwrap_err();
    assert!(matches!(invalid, RepoError::Validation { .. }));

    let non_text = repo
        .update_by_primary_key("Books", [("name", Value::Integer(7))])
        .unwrap_err();
    assert!(matches!(non_text, RepoError::InvalidData(_)));

    let collision = repo
        .update_by_primary_key("Books", [("name", Value::Text("Music".to_string()))])
        .unwrap_err();
    assert!(collision.is_integrity_violation());
}

#[test]
fn update_with_no_fields_is_noop() {
    let (_factory, repo) = repository();
    repo.add(&CategoryRow::new("Books")).unwrap();

    repo.update_by_primary_key("Books", Vec::<(&str, Value)>::new())
        .unwrap();
    assert_eq!(repo.get_by_primary_key("Books").unwrap().name, "Books");
}

#[test]
fn delete_then_get_returns_not_found() {
    let (_factory, repo) = repository();
    repo.add(&CategoryRow::new("To Be Deleted")).unwrap();

    repo.delete_by_primary_key("To Be Deleted").unwrap();

    let err = repo.get_by_primary_key("To Be Deleted").unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
    let err = repo.delete_by_primary_key("To Be Deleted").unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn rows_written_outside_the_repository_are_read_verbatim() {
    let factory = SqliteSessionFactory::in_memory().unwrap();
    let session = Rc::new(factory.open_session().unwrap());
    session
        .connection()
        .execute("INSERT INTO categories (name) VALUES ('Line\nBreak');", [])
        .unwrap();
    let repo = CategoryRepository::new(Rc::clone(&session));

    assert_eq!(
        repo.get_by_primary_key("Line\nBreak").unwrap().name,
        "Line\nBreak"
    );
    assert_eq!(repo.list().unwrap(), vec![CategoryRow::new("Line\nBreak")]);
}

#[test]
fn non_text_persisted_name_is_invalid_data() {
    let factory = SqliteSessionFactory::in_memory().unwrap();
    let session = Rc::new(factory.open_session().unwrap());
    session
        .connection()
        .execute("INSERT INTO categories (name) VALUES (X'00ff');", [])
        .unwrap();
    let repo = CategoryRepository::new(Rc::clone(&session));

    let err = repo.list().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
