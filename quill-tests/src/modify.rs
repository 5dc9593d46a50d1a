use crate::recreate_table;
use quill::{
    CompileOptions, DbEnum, Driver, Entity, Executor, expr, insert_commands, update_commands,
};
use time::{Date, Month, PrimitiveDateTime, Time};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, DbEnum)]
enum NoteKind {
    Text = 1,
    Todo = 2,
    Link = 5,
}

#[derive(Debug, Clone, PartialEq, Entity)]
#[quill(table = "notes")]
struct Note {
    #[quill(primary_key, auto_increment)]
    id: i64,
    title: String,
    body: Option<String>,
    created: PrimitiveDateTime,
    pinned: bool,
    kind: NoteKind,
    tag: Uuid,
    #[quill(ignore)]
    dirty: bool,
}

fn note(title: &str, day: u8, kind: NoteKind) -> Note {
    Note {
        id: 0,
        title: title.into(),
        body: None,
        created: PrimitiveDateTime::new(
            Date::from_calendar_date(2025, Month::March, day).expect("Invalid date"),
            Time::from_hms_milli(10, 30, 15, 250).expect("Invalid time"),
        ),
        pinned: false,
        kind,
        tag: Uuid::new_v4(),
        dirty: true,
    }
}

pub async fn modify<E: Executor>(executor: &mut E) {
    recreate_table::<Note, _>(executor).await;

    // Insert
    let mut first = note("draft: groceries", 1, NoteKind::Todo);
    first.body = Some("milk, eggs".into());
    let returning = !cfg!(feature = "disable-returning");
    let inserted = executor
        .insert(&first, returning)
        .await
        .expect("Failed to insert the first note");
    assert_eq!(inserted.rows_affected, 1);
    first.id = inserted
        .last_affected_id
        .expect("The identity of the first note was not returned");
    assert_eq!(first.id, 1);
    let second = note("reading list", 2, NoteKind::Link);
    let inserted = executor
        .insert(&second, false)
        .await
        .expect("Failed to insert the second note");
    assert_eq!(inserted.rows_affected, 1);

    let loaded = executor
        .query_first(&Note::query().filter(expr!(|n: Note| n.id == 1)))
        .await
        .expect("Failed to query the first note")
        .expect("The first note was not found");
    assert_eq!(loaded.title, first.title);
    assert_eq!(loaded.body, first.body);
    assert_eq!(loaded.created, first.created);
    assert_eq!(loaded.kind, NoteKind::Todo);
    assert_eq!(loaded.tag, first.tag);
    assert!(!loaded.pinned);
    // Not stored
    assert!(!loaded.dirty);

    let links = executor
        .query_all(&Note::query().filter(expr!(|n: Note| n.kind == NoteKind::Link)))
        .await
        .expect("Failed to query the notes by kind");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].title, "reading list");
    assert_eq!(links[0].id, 2);

    // Update
    first.title = "draft: groceries and more".into();
    first.pinned = true;
    first.body = None;
    let updated = executor
        .update(&first)
        .await
        .expect("Failed to update the first note");
    assert_eq!(updated.rows_affected, 1);
    let loaded = executor
        .query_first(&Note::query().filter(expr!(|n: Note| n.pinned == true)))
        .await
        .expect("Failed to query the pinned note")
        .expect("The pinned note was not found");
    assert_eq!(loaded.id, 1);
    assert_eq!(loaded.title, "draft: groceries and more");
    assert_eq!(loaded.body, None);

    let mut all = executor
        .query_all(&Note::query().order_by(expr!(|n: Note| n.id)))
        .await
        .expect("Failed to query all the notes");
    for note in &mut all {
        note.kind = NoteKind::Text;
    }
    let updated = executor
        .update_many(&all)
        .await
        .expect("Failed to update all the notes");
    assert_eq!(updated.rows_affected, 2);
    let texts = executor
        .query_all(&Note::query().filter(expr!(|n: Note| n.kind == NoteKind::Text)))
        .await
        .expect("Failed to query the text notes");
    assert_eq!(texts.len(), 2);

    // Delete
    let deleted = executor
        .delete(&first)
        .await
        .expect("Failed to delete the first note");
    assert_eq!(deleted.rows_affected, 1);
    let deleted = executor
        .delete(&first)
        .await
        .expect("Failed to delete the first note again");
    assert_eq!(deleted.rows_affected, 0);
    executor
        .insert_many(&[
            note("draft: one", 3, NoteKind::Text),
            note("draft: two", 4, NoteKind::Text),
            note("final", 5, NoteKind::Text),
        ])
        .await
        .expect("Failed to insert the drafts");
    let deleted = executor
        .delete_where::<Note>(&expr!(|n: Note| n.title.starts_with("draft:")))
        .await
        .expect("Failed to delete the drafts");
    assert_eq!(deleted.rows_affected, 2);
    let left = executor
        .query_all(&Note::query().order_by(expr!(|n: Note| n.id)))
        .await
        .expect("Failed to query the remaining notes")
        .into_iter()
        .map(|v| v.title)
        .collect::<Vec<_>>();
    assert_eq!(left, ["reading list", "final"]);
}

pub async fn batches<E: Executor>(executor: &mut E) {
    recreate_table::<Note, _>(executor).await;
    let notes = (1..=30)
        .map(|i| note(&format!("note {}", i), (i % 28 + 1) as u8, NoteKind::Text))
        .collect::<Vec<_>>();

    // Six parameters per row, three rows per command
    let writer = executor.driver().sql_writer();
    let options = CompileOptions::default().max_parameters(20);
    let commands = insert_commands(&writer, &options, &notes).expect("Failed to build the batches");
    assert_eq!(commands.len(), 10);
    assert!(commands.iter().all(|v| v.params.len() <= 20));
    assert!(commands[0].param("title_2").is_some());
    assert!(commands[0].param("title_3").is_none());
    let inserted = executor
        .execute_all(Ok(commands))
        .await
        .expect("Failed to execute the batches");
    assert_eq!(inserted.rows_affected, 30);

    let count = executor
        .query_first(
            &Note::query().select::<i64>(expr!(|n: Note| Sql::count(n.id))),
        )
        .await
        .expect("Failed to count the notes");
    assert_eq!(count, Some(30));

    let mut notes = executor
        .query_all(&Note::query().order_by(expr!(|n: Note| n.id)))
        .await
        .expect("Failed to query the batched notes");
    for note in &mut notes {
        note.pinned = note.id % 3 == 0;
    }
    let commands = update_commands(&writer, &options, &notes).expect("Failed to build the updates");
    assert!(commands.len() > 1);
    executor
        .execute_all(Ok(commands))
        .await
        .expect("Failed to execute the update batches");
    let pinned = executor
        .query_all(&Note::query().filter(expr!(|n: Note| n.pinned == true)))
        .await
        .expect("Failed to query the pinned notes");
    assert_eq!(pinned.len(), 10);
}
