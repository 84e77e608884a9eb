//! Applies intents to a payload tree and its validation state.

use crate::codec::flatten;
use crate::error::SubmissionError;
use crate::intent::{Intent, ReplacePayload, ResetPayload};
use crate::path::{get_value, remove_value, set_value};
use crate::serialization::serialize;
use crate::state::{StateNode, SubmissionState};
use serde_json::{Map, Value};

/// A single-element edit of an ordered list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEdit<T> {
    /// Insert `value` at `index` (default: the end).
    Insert { index: Option<usize>, value: T },
    Remove { index: usize },
    /// Move the element at `from` so that it ends up at `to`.
    Reorder { from: usize, to: usize },
}

impl<T> ListEdit<T> {
    /// The same edit carrying a different inserted value.
    pub fn map_value<U, F>(&self, f: F) -> ListEdit<U>
    where
        F: FnOnce(&T) -> U,
    {
        match self {
            ListEdit::Insert { index, value } => ListEdit::Insert {
                index: *index,
                value: f(value),
            },
            ListEdit::Remove { index } => ListEdit::Remove { index: *index },
            ListEdit::Reorder { from, to } => ListEdit::Reorder {
                from: *from,
                to: *to,
            },
        }
    }
}

/// Extracts the target path and the edit described by a list intent.
///
/// # Errors
/// Returns [`SubmissionError::UnknownListIntent`] for `validate`, `reset` and
/// `replace`.
pub fn list_edit(intent: &Intent) -> Result<(&str, ListEdit<Value>), SubmissionError> {
    match intent {
        Intent::Insert(payload) => Ok((
            payload.path.as_str(),
            ListEdit::Insert {
                index: payload.index,
                value: payload
                    .default_value
                    .as_ref()
                    .and_then(serialize)
                    .unwrap_or(Value::Null),
            },
        )),
        Intent::Remove(payload) => Ok((payload.path.as_str(), ListEdit::Remove { index: payload.index })),
        Intent::Reorder(payload) => Ok((
            payload.path.as_str(),
            ListEdit::Reorder {
                from: payload.from,
                to: payload.to,
            },
        )),
        other => Err(SubmissionError::UnknownListIntent {
            intent: other.kind().to_string(),
        }),
    }
}

/// Applies `edit` to `list`, rejecting indices outside the list.
///
/// `Reorder` is a remove-then-insert move, not a swap: moving `0` to `2` in
/// `[a, b, c]` gives `[b, c, a]`.
pub fn update_list<T>(path: &str, list: &mut Vec<T>, edit: ListEdit<T>) -> Result<(), SubmissionError> {
    let len = list.len();
    let out_of_bounds = |index: usize| SubmissionError::IndexOutOfBounds {
        path: path.to_string(),
        index,
        len,
    };

    match edit {
        ListEdit::Insert { index, value } => {
            let index = index.unwrap_or(len);
            if index > len {
                return Err(out_of_bounds(index));
            }
            list.insert(index, value);
        }
        ListEdit::Remove { index } => {
            if index >= len {
                return Err(out_of_bounds(index));
            }
            list.remove(index);
        }
        ListEdit::Reorder { from, to } => {
            if from >= len {
                return Err(out_of_bounds(from));
            }
            if to >= len {
                return Err(out_of_bounds(to));
            }
            let item = list.remove(from);
            list.insert(to, item);
        }
    }
    Ok(())
}

/// Applies one intent to the payload tree and the validation state.
pub fn apply_intent(
    payload: &mut Value,
    state: &mut SubmissionState,
    intent: &Intent,
) -> Result<(), SubmissionError> {
    log::debug!("Applying `{}` intent at {:?}", intent.kind(), intent.path());

    match intent {
        Intent::Validate(path) => state.validate(path.as_str()),
        Intent::Replace(replace) => apply_replace(payload, state, replace)?,
        Intent::Reset(reset) => apply_reset(payload, state, reset),
        Intent::Insert(_) | Intent::Remove(_) | Intent::Reorder(_) => {
            apply_list_edit(payload, state, intent)?;
        }
    }
    Ok(())
}

fn apply_replace(
    payload: &mut Value,
    state: &mut SubmissionState,
    replace: &ReplacePayload,
) -> Result<(), SubmissionError> {
    let ReplacePayload {
        path,
        value,
        validated,
    } = replace;

    match path {
        Some(path) => set_value(payload, path, |_| Some(value.clone())),
        None if value.is_object() => *payload = value.clone(),
        None => return Err(SubmissionError::InvalidRootValue),
    }

    let path = path.as_deref().unwrap_or("");
    state.update(path, StateNode::clear);
    if validated.unwrap_or(false) {
        if value.is_object() || value.is_array() {
            state.validated.extend(flatten(value, path, |_| Some(true)));
        }
        state.validate(path);
    } else {
        state.invalidate(path);
    }
    Ok(())
}

fn apply_reset(payload: &mut Value, state: &mut SubmissionState, reset: &ResetPayload) {
    let path = reset.path.as_deref();

    if reset.value.unwrap_or(true) {
        match path {
            Some(path) => {
                remove_value(payload, path);
            }
            None => *payload = Value::Object(Map::new()),
        }
    }

    if reset.validated.unwrap_or(true) {
        match path {
            Some(path) => {
                state.update(path, StateNode::clear);
                state.invalidate(path);
            }
            None => state.clear(),
        }
    }
}

fn apply_list_edit(
    payload: &mut Value,
    state: &mut SubmissionState,
    intent: &Intent,
) -> Result<(), SubmissionError> {
    let (path, edit) = list_edit(intent)?;

    let mut list = match get_value(payload, path) {
        None => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => {
            return Err(SubmissionError::NotAList {
                path: path.to_string(),
            })
        }
    };
    let len = list.len();
    let edit = match edit {
        ListEdit::Insert { index, value } => ListEdit::Insert {
            index: Some(index.unwrap_or(len)),
            value,
        },
        edit => edit,
    };
    let state_edit = edit.map_value(|_| None);

    update_list(path, &mut list, edit)?;
    log::trace!("List at `{path}` now has {} items", list.len());
    set_value(payload, path, |_| Some(Value::Array(list)));

    state.update(path, |node| {
        let mut flags = node.take_list(len);
        let result = update_list(path, &mut flags, state_edit);
        node.put_list(flags);
        result
    })?;
    state.validate(path);
    Ok(())
}
