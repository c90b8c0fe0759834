//! Note command handlers

use anyhow::{bail, Context, Result};

use memo_core::markdown::{self, excerpt};
use memo_core::{Config, Criteria, DateRange, Note, NoteType, Store};

use crate::editor::{confirm, edit_content};
use crate::output::{short_id, Output};
use crate::ListArgs;

/// Fields collected by `memo add`
pub struct NewNote {
    pub title: String,
    pub content: Option<String>,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub note_type: Option<NoteType>,
    pub pinned: bool,
}

/// Create a new note
pub fn add(store: &mut Store, new: NewNote, output: &Output) -> Result<()> {
    let title = new.title.trim();
    if title.is_empty() {
        bail!("Note title cannot be empty");
    }

    let content = match new.content {
        Some(c) => c,
        None => edit_content(&format!("Writing: {}", title), "").context("Failed to edit note")?,
    };

    let mut note = Note::new(title);
    note.set_content(content);
    note.set_tags(new.tags);
    for image in new.images {
        note.add_image(image);
    }
    if let Some(note_type) = new.note_type {
        note.set_type(note_type);
    }
    note.set_pinned(new.pinned);

    let id = note.id.clone();
    store.add_note(note).context("Failed to add note")?;

    if output.is_quiet() {
        println!("{}", id);
    } else {
        output.success(&format!("Added note: {}", short_id(&id)));
    }
    Ok(())
}

/// List notes through the query engine
pub fn list(store: &Store, args: &ListArgs, output: &Output) -> Result<()> {
    let criteria = criteria_from_args(args, store.config());
    let notes = store.query(&criteria)?;
    output.print_notes(&notes);
    Ok(())
}

/// Build query criteria from `memo list` flags, falling back to configured sorting
fn criteria_from_args(args: &ListArgs, config: &Config) -> Criteria {
    let mut criteria = config.default_criteria();

    if let Some(search) = &args.search {
        criteria = criteria.with_search(search.clone());
    }
    for tag in &args.tag {
        criteria = criteria.with_tag(tag.clone());
    }
    for note_type in &args.note_type {
        criteria = criteria.with_type(*note_type);
    }
    if args.images {
        criteria = criteria.with_images(true);
    } else if args.no_images {
        criteria = criteria.with_images(false);
    }
    if args.from.is_some() || args.to.is_some() {
        criteria = criteria.with_date_range(DateRange::new(args.from.as_deref(), args.to.as_deref()));
    }

    let field = args.sort.unwrap_or(criteria.sort_field);
    let order = args.order.unwrap_or(criteria.sort_order);
    criteria.sorted_by(field, order)
}

/// Show a single note, optionally rendered
pub fn show(store: &Store, id: &str, html: bool, output: &Output) -> Result<()> {
    let note = resolve_note(store, id)?;
    let rendered = html.then(|| markdown::render(&note.content));
    output.print_note(&note, rendered.as_deref());
    Ok(())
}

/// Edit a note's fields, or its content in $EDITOR when no field is given
pub fn edit(
    store: &mut Store,
    id: &str,
    title: Option<String>,
    content: Option<String>,
    tags: Vec<String>,
    note_type: Option<NoteType>,
    output: &Output,
) -> Result<()> {
    let mut note = resolve_note(store, id)?;
    let interactive = title.is_none() && content.is_none() && tags.is_empty() && note_type.is_none();

    if interactive {
        let edited = edit_content(&format!("Editing: {}", note.title), &note.content)
            .context("Failed to edit note")?;
        if edited == note.content {
            output.message("No changes made.");
            return Ok(());
        }
        note.set_content(edited);
    } else {
        if let Some(title) = title {
            let title = title.trim();
            if title.is_empty() {
                bail!("Note title cannot be empty");
            }
            note.set_title(title);
        }
        if let Some(content) = content {
            note.set_content(content);
        }
        if !tags.is_empty() {
            note.set_tags(tags);
        }
        if let Some(note_type) = note_type {
            note.set_type(note_type);
        }
    }

    let id = note.id.clone();
    store.update_note(note).context("Failed to update note")?;
    output.success(&format!("Updated note: {}", short_id(&id)));
    Ok(())
}

/// Delete a note
pub fn delete(store: &mut Store, id: &str, yes: bool, output: &Output) -> Result<()> {
    let note = resolve_note(store, id)?;

    if !yes && output.should_prompt() {
        println!("Delete note: {} - {}", short_id(&note.id), note.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete_note(&note.id).context("Failed to delete note")?;
    output.success(&format!("Deleted note: {}", short_id(&note.id)));
    Ok(())
}

/// Toggle the pinned flag
pub fn pin(store: &mut Store, id: &str, output: &Output) -> Result<()> {
    let note = resolve_note(store, id)?;
    let pinned = store.toggle_pin(&note.id)?;

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({"id": note.id, "isPinned": pinned})
        );
    } else if pinned {
        output.success(&format!("Pinned: {}", note.title));
    } else {
        output.success(&format!("Unpinned: {}", note.title));
    }
    Ok(())
}

/// Print the heading outline of a note
pub fn toc(store: &Store, id: &str, output: &Output) -> Result<()> {
    let note = resolve_note(store, id)?;
    output.print_headings(&markdown::extract_headings(&note.content));
    Ok(())
}

/// Resolve a note by full id or unique prefix
fn resolve_note(store: &Store, id: &str) -> Result<Note> {
    let id = id.trim();
    if id.is_empty() {
        bail!("Note ID cannot be empty");
    }

    let mut matches = store.find_by_prefix(id)?;

    match matches.len() {
        0 => bail!("No note found matching: {}", id),
        1 => Ok(matches.remove(0)),
        _ => {
            eprintln!("Multiple notes match '{}':", id);
            for note in &matches {
                eprintln!("  {} - {}", short_id(&note.id), excerpt(&note.title, 40));
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
